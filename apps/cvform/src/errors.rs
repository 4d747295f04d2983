use thiserror::Error;

use crate::draft::SlotError;
use crate::models::FieldId;
use crate::ui::Notice;
use crate::upload::UploadError;

/// Engine-level error type.
/// Every variant is recoverable; `to_notice` turns it into what the user sees.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("At most {max} {what} allowed")]
    Capacity { what: String, max: usize },

    #[error("No {section} entry at position {index} (section holds {len})")]
    EntryIndex {
        section: String,
        index: usize,
        len: usize,
    },

    #[error("Photo rejected: {0}")]
    Upload(#[from] UploadError),

    #[error("Corrupt draft discarded: {0}")]
    CorruptDraft(String),

    #[error("Missing required fields: {}", labels(.fields))]
    MissingFields { fields: Vec<FieldId> },

    #[error("Consent not granted")]
    MissingConsent,

    #[error("Photo upload still in progress")]
    PhotoPending,

    #[error("Invalid or missing fields: {}", labels(.fields))]
    InvalidFields { fields: Vec<FieldId> },

    #[error("Storage error: {0}")]
    Storage(#[from] SlotError),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),
}

fn labels(fields: &[FieldId]) -> String {
    fields
        .iter()
        .map(|f| f.label())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FormError {
    /// The notification shown for this error. Internal failures are logged here and
    /// surfaced with a generic message.
    pub fn to_notice(&self) -> Notice {
        match self {
            FormError::Capacity { what, max } => {
                Notice::warning(format!("At most {max} {what}."))
            }
            FormError::EntryIndex { section, .. } => {
                Notice::warning(format!("That {section} entry no longer exists."))
            }
            FormError::Upload(e) => Notice::danger(e.user_message()),
            FormError::CorruptDraft(reason) => {
                tracing::warn!("Discarded corrupt draft: {reason}");
                Notice::danger("Could not load the saved draft. It has been deleted.")
            }
            FormError::MissingFields { fields } => Notice::warning(format!(
                "The following required fields are missing: {}",
                labels(fields)
            )),
            FormError::MissingConsent => {
                Notice::danger("You must accept the consent to generate the PDF.")
            }
            FormError::PhotoPending => {
                Notice::warning("Wait for the photo upload to finish before generating the PDF.")
            }
            FormError::InvalidFields { .. } => {
                Notice::warning("Complete the required fields first.")
            }
            FormError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                Notice::danger("The draft could not be stored locally.")
            }
            FormError::Serialize(e) => {
                tracing::error!("Serialization error: {e}");
                Notice::danger("The form could not be serialized.")
            }
            FormError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                Notice::danger("The document could not be generated.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::NoticeLevel;

    #[test]
    fn test_missing_fields_lists_labels() {
        let err = FormError::MissingFields {
            fields: vec![FieldId::Name, FieldId::TaxId],
        };
        assert_eq!(err.to_string(), "Missing required fields: Full name, CUIL");
        let notice = err.to_notice();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.ends_with("Full name, CUIL"));
    }

    #[test]
    fn test_consent_and_missing_fields_messages_differ() {
        let consent = FormError::MissingConsent.to_notice();
        let missing = FormError::MissingFields { fields: vec![] }.to_notice();
        assert_ne!(consent.message, missing.message);
        assert_eq!(consent.level, NoticeLevel::Danger);
    }

    #[test]
    fn test_capacity_notice() {
        let notice = FormError::Capacity {
            what: "experience entries".to_string(),
            max: 10,
        }
        .to_notice();
        assert_eq!(notice.message, "At most 10 experience entries.");
    }
}
