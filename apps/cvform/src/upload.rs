//! Profile photo intake: type and size gate, then inline `data:` URL encoding.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::models::EmbeddedPhoto;

/// 2 MiB.
pub const MAX_PHOTO_BYTES: u64 = 2 * 1024 * 1024;
pub const ACCEPTED_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error("photo is {size} bytes, limit is 2 MiB")]
    TooLarge { size: u64 },

    #[error("unsupported image type '{0}'")]
    UnsupportedType(String),

    #[error("could not read photo: {0}")]
    Read(String),
}

impl UploadError {
    pub fn user_message(&self) -> &'static str {
        match self {
            UploadError::TooLarge { .. } => "Photo too large. Maximum 2MB.",
            UploadError::UnsupportedType(_) => "Only JPG or PNG.",
            UploadError::Read(_) => "The photo could not be read.",
        }
    }
}

/// Image bytes as handed over by the file picker.
#[derive(Debug, Clone)]
pub struct RawPhoto {
    pub bytes: Bytes,
    pub mime: String,
}

/// Size is checked before type, so an oversized file of the wrong type reports its size.
pub fn accept_photo(photo: &RawPhoto) -> Result<EmbeddedPhoto, UploadError> {
    let size = photo.bytes.len() as u64;
    if size > MAX_PHOTO_BYTES {
        return Err(UploadError::TooLarge { size });
    }
    let mime = photo.mime.trim().to_ascii_lowercase();
    if !ACCEPTED_TYPES.contains(&mime.as_str()) {
        return Err(UploadError::UnsupportedType(photo.mime.clone()));
    }
    let encoded = STANDARD.encode(&photo.bytes);
    Ok(EmbeddedPhoto::new(format!("data:{mime};base64,{encoded}")))
}

pub fn mime_from_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

/// Asynchronous origin of an uploaded photo.
#[async_trait]
pub trait PhotoSource: Send + Sync {
    async fn read(&self) -> Result<RawPhoto, UploadError>;
}

/// Photo on the local filesystem. The size limit is enforced from metadata before the
/// file is read.
#[derive(Debug, Clone)]
pub struct FilePhoto {
    path: PathBuf,
}

impl FilePhoto {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PhotoSource for FilePhoto {
    async fn read(&self) -> Result<RawPhoto, UploadError> {
        let meta = tokio::fs::metadata(&self.path)
            .await
            .map_err(|e| UploadError::Read(format!("{}: {e}", self.path.display())))?;
        if meta.len() > MAX_PHOTO_BYTES {
            return Err(UploadError::TooLarge { size: meta.len() });
        }
        let mime = mime_from_extension(&self.path).ok_or_else(|| {
            UploadError::UnsupportedType(
                self.path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string(),
            )
        })?;
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| UploadError::Read(format!("{}: {e}", self.path.display())))?;
        debug!("Read photo {} ({} bytes)", self.path.display(), bytes.len());
        Ok(RawPhoto {
            bytes: Bytes::from(bytes),
            mime: mime.to_string(),
        })
    }
}
