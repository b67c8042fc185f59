//! Avatar picking and upload preparation
//!
//! Everything here runs before any request is made: an oversized or
//! non-image file is rejected locally and the user is warned instead.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;

/// Largest avatar accepted, in MiB
pub const MAX_AVATAR_MB: u64 = 5;

/// Avatar file ready to be sent as the `avatar` multipart field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    /// Upload name: `{user name}.{ext}`, lower-cased
    pub file_name: String,
    /// MIME type, e.g. `image/png`
    pub mime: String,
    /// File contents
    pub bytes: Vec<u8>,
}

/// Reasons a picked file cannot be uploaded
#[derive(Debug, Error)]
pub enum AvatarError {
    /// Nothing at that path
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Over the size limit
    #[error("This image is too large, choose one up to {MAX_AVATAR_MB}MB.")]
    TooLarge {
        /// Actual size in bytes
        size: u64,
    },

    /// Not a format we can upload
    #[error("This file is not a supported image.")]
    NotAnImage,

    /// Reading the file failed
    #[error("Could not read the image: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether `size` bytes is over the upload limit
pub const fn exceeds_limit(size: u64) -> bool {
    size > MAX_AVATAR_MB * 1024 * 1024
}

/// Check and load the picked file for upload
pub fn prepare_avatar(path: &Path, user_name: &str) -> Result<AvatarUpload, AvatarError> {
    let metadata = match fs::metadata(path) {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(AvatarError::NotFound(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AvatarError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    if exceeds_limit(metadata.len()) {
        tracing::info!(size = metadata.len(), "avatar rejected: too large");
        return Err(AvatarError::TooLarge {
            size: metadata.len(),
        });
    }

    let bytes = fs::read(path)?;
    let format = image::guess_format(&bytes).map_err(|_| AvatarError::NotAnImage)?;
    let extension = extension_for(path, format);

    Ok(AvatarUpload {
        file_name: format!("{user_name}.{extension}").to_lowercase(),
        mime: format!("image/{extension}"),
        bytes,
    })
}

/// Extension from the path when it names the same format, else the canonical one
fn extension_for(path: &Path, format: ImageFormat) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ImageFormat::from_extension(ext) == Some(format))
        .map(str::to_lowercase)
        .or_else(|| format.extensions_str().first().map(|ext| (*ext).to_string()))
        .unwrap_or_else(|| "png".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // Smallest valid PNG header + IHDR is enough for format sniffing
    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01\x08\x02\0\0\0";

    #[test]
    fn test_size_limit_boundary() {
        assert!(!exceeds_limit(MAX_AVATAR_MB * 1024 * 1024));
        assert!(exceeds_limit(MAX_AVATAR_MB * 1024 * 1024 + 1));
        assert!(!exceeds_limit(1024));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("big.png");
        let mut bytes = PNG_MAGIC.to_vec();
        bytes.resize(6 * 1024 * 1024, 0);
        fs::write(&path, bytes).unwrap();

        let err = prepare_avatar(&path, "Ana").unwrap_err();
        assert!(matches!(err, AvatarError::TooLarge { .. }));
        assert_eq!(
            err.to_string(),
            "This image is too large, choose one up to 5MB."
        );
    }

    #[test]
    fn test_upload_named_after_user() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Me.PNG");
        fs::write(&path, PNG_MAGIC).unwrap();

        let upload = prepare_avatar(&path, "Ana Souza").unwrap();
        assert_eq!(upload.file_name, "ana souza.png");
        assert_eq!(upload.mime, "image/png");
        assert_eq!(upload.bytes, PNG_MAGIC);
    }

    #[test]
    fn test_non_image_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.png");
        fs::write(&path, b"just some text").unwrap();
        assert!(matches!(
            prepare_avatar(&path, "Ana"),
            Err(AvatarError::NotAnImage)
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            prepare_avatar(&dir.path().join("nope.jpg"), "Ana"),
            Err(AvatarError::NotFound(_))
        ));
    }
}
