//! Reversible scrambling of the stored draft.
//!
//! This is obfuscation, not encryption: anyone holding the stored string can recover
//! the full form, photo included, with a base64 decoder. It only keeps the draft from
//! being readable at a glance in a storage inspector.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Fixed, public suffix appended before encoding. Not a secret.
pub const DRAFT_MARKER: &str = "::cvform-draft";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeobfuscateError {
    #[error("not base64: {0}")]
    Encoding(String),

    #[error("not UTF-8 text")]
    Utf8,

    #[error("draft marker missing")]
    MissingMarker,
}

pub fn obfuscate(plain: &str) -> String {
    STANDARD.encode(format!("{plain}{DRAFT_MARKER}"))
}

pub fn deobfuscate(stored: &str) -> Result<String, DeobfuscateError> {
    let bytes = STANDARD
        .decode(stored.trim())
        .map_err(|e| DeobfuscateError::Encoding(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|_| DeobfuscateError::Utf8)?;
    text.strip_suffix(DRAFT_MARKER)
        .map(str::to_string)
        .ok_or(DeobfuscateError::MissingMarker)
}
