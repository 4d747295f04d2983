//! Draft persistence: envelope → JSON → obfuscation → slot, and back.
//!
//! Loading never fails hard. Anything that cannot be turned back into a form is deleted
//! from the slot and reported as `DraftLoad::Corrupt` so the session starts empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::draft::obfuscation::{deobfuscate, obfuscate};
use crate::draft::slot::{DraftSlot, SlotError};
use crate::errors::FormError;
use crate::models::FormState;

/// Slot key the draft lives under.
pub const DRAFT_KEY: &str = "cvDraft";

/// Bumped whenever the stored layout changes incompatibly.
pub const DRAFT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub form: FormState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftLoad {
    Empty,
    Loaded(Draft),
    /// The stored value was unreadable and has been removed.
    Corrupt { reason: String },
}

pub struct DraftStore<S: DraftSlot> {
    slot: S,
}

impl<S: DraftSlot> DraftStore<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Persists the form. Placeholder entries without an institution or employer are
    /// left out. Returns the stored envelope.
    pub fn save(&mut self, state: &FormState) -> Result<Draft, FormError> {
        let draft = Draft {
            version: DRAFT_VERSION,
            saved_at: Utc::now(),
            form: state.filled_entries_only(),
        };
        let json = serde_json::to_string(&draft)?;
        self.slot.set(DRAFT_KEY, &obfuscate(&json))?;
        info!(
            "Draft saved ({} education, {} experience entries)",
            draft.form.education.len(),
            draft.form.experience.len()
        );
        Ok(draft)
    }

    /// A failing slot is propagated; a stored value that cannot be decoded, including one
    /// that is not even text, is corrupt.
    pub fn load(&mut self) -> Result<DraftLoad, SlotError> {
        let decoded = match self.slot.get(DRAFT_KEY) {
            Ok(None) => return Ok(DraftLoad::Empty),
            Ok(Some(stored)) => decode(&stored),
            Err(e @ SlotError::NotText { .. }) => Err(e.to_string()),
            Err(e) => return Err(e),
        };

        match decoded {
            Ok(draft) => {
                info!("Draft from {} restored", draft.saved_at);
                Ok(DraftLoad::Loaded(draft))
            }
            Err(reason) => {
                warn!("Draft unreadable, removing it: {reason}");
                self.slot.remove(DRAFT_KEY)?;
                Ok(DraftLoad::Corrupt { reason })
            }
        }
    }

    pub fn clear(&mut self) -> Result<(), SlotError> {
        self.slot.remove(DRAFT_KEY)
    }
}

fn decode(stored: &str) -> Result<Draft, String> {
    let json = deobfuscate(stored).map_err(|e| e.to_string())?;
    let draft: Draft = serde_json::from_str(&json).map_err(|e| format!("invalid JSON: {e}"))?;
    if draft.version != DRAFT_VERSION {
        return Err(format!("unsupported draft version {}", draft.version));
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::slot::{FileSlot, MemorySlot};
    use crate::models::{EducationEntry, EmbeddedPhoto, ExperienceEntry, FieldId};

    fn sample_form() -> FormState {
        let mut form = FormState::default();
        form.set(FieldId::Name, "Ana Lopez");
        form.set(FieldId::Skills, "Rust, SQL");
        form.education.push(EducationEntry {
            institution: "UBA".to_string(),
            title: "Lic. Sistemas".to_string(),
            end_date: "2018".to_string(),
            ..Default::default()
        });
        form.education.push(EducationEntry {
            institution: "ORT".to_string(),
            title: "Técnica".to_string(),
            end_date: "2012".to_string(),
            ..Default::default()
        });
        form.experience.push(ExperienceEntry {
            employer: "Acme".to_string(),
            role: "Developer".to_string(),
            start_date: "2020-02-01".to_string(),
            end_date: None,
            description: "Built things".to_string(),
        });
        form.photo = Some(EmbeddedPhoto::new("data:image/png;base64,iVBORw0KGgo="));
        form
    }

    #[test]
    fn test_round_trip_preserves_entries_and_photo() {
        let mut store = DraftStore::new(MemorySlot::default());
        let form = sample_form();
        store.save(&form).unwrap();

        let DraftLoad::Loaded(draft) = store.load().unwrap() else {
            panic!("expected a loaded draft");
        };
        assert_eq!(draft.form, form);
        assert_eq!(draft.form.education.len(), 2);
        assert!(draft.form.experience[0].is_current());
        assert_eq!(draft.version, DRAFT_VERSION);
    }

    #[test]
    fn test_placeholder_entries_not_saved() {
        let mut store = DraftStore::new(MemorySlot::default());
        let mut form = sample_form();
        form.education.push(EducationEntry::default());
        form.experience.push(ExperienceEntry {
            employer: "   ".to_string(),
            ..Default::default()
        });

        let saved = store.save(&form).unwrap();
        assert_eq!(saved.form.education.len(), 2);
        assert_eq!(saved.form.experience.len(), 1);
    }

    #[test]
    fn test_stored_value_is_not_plain_json() {
        let mut store = DraftStore::new(MemorySlot::default());
        store.save(&sample_form()).unwrap();
        let raw = store.slot().get(DRAFT_KEY).unwrap().unwrap();
        assert!(!raw.contains("Ana Lopez"));
        assert!(serde_json::from_str::<serde_json::Value>(&raw).is_err());
    }

    #[test]
    fn test_empty_slot() {
        let mut store = DraftStore::new(MemorySlot::default());
        assert_eq!(store.load().unwrap(), DraftLoad::Empty);
    }

    #[test]
    fn test_corrupt_value_is_removed() {
        let mut slot = MemorySlot::default();
        slot.set(DRAFT_KEY, "definitely not a draft").unwrap();
        let mut store = DraftStore::new(slot);

        assert!(matches!(store.load().unwrap(), DraftLoad::Corrupt { .. }));
        assert_eq!(store.slot().get(DRAFT_KEY).unwrap(), None);
        assert_eq!(store.load().unwrap(), DraftLoad::Empty);
    }

    #[test]
    fn test_valid_encoding_with_bad_json_is_corrupt() {
        let mut slot = MemorySlot::default();
        slot.set(DRAFT_KEY, &obfuscate("{\"version\":1")).unwrap();
        let mut store = DraftStore::new(slot);

        let DraftLoad::Corrupt { reason } = store.load().unwrap() else {
            panic!("expected corruption");
        };
        assert!(reason.starts_with("invalid JSON"), "{reason}");
    }

    #[test]
    fn test_binary_draft_file_is_corrupt_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let slot = FileSlot::open(dir.path()).unwrap();
        let path = dir.path().join(DRAFT_KEY);
        std::fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let mut store = DraftStore::new(slot);

        let DraftLoad::Corrupt { reason } = store.load().unwrap() else {
            panic!("expected corruption");
        };
        assert!(reason.contains("UTF-8"), "{reason}");
        assert!(!path.exists());
        assert_eq!(store.load().unwrap(), DraftLoad::Empty);
    }

    #[test]
    fn test_unknown_version_is_corrupt() {
        let draft = Draft {
            version: 99,
            saved_at: Utc::now(),
            form: FormState::default(),
        };
        let mut slot = MemorySlot::default();
        slot.set(DRAFT_KEY, &obfuscate(&serde_json::to_string(&draft).unwrap()))
            .unwrap();
        let mut store = DraftStore::new(slot);
        assert!(matches!(store.load().unwrap(), DraftLoad::Corrupt { .. }));
    }

    #[test]
    fn test_clear_removes_draft() {
        let mut store = DraftStore::new(MemorySlot::default());
        store.save(&sample_form()).unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), DraftLoad::Empty);
    }
}
