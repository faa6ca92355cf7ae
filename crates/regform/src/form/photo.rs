//! Acceptance checks for picked photos.

use thiserror::Error;

use crate::backend::ImageAsset;
use crate::config::PhotoConfig;

const MIB: u64 = 1024 * 1024;

/// Why a picked photo was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PhotoRejection {
    /// The file is larger than the configured limit.
    #[error("Please select an image smaller than {}", format_limit(.max))]
    TooLarge {
        /// Reported size in bytes.
        size: u64,
        /// Configured limit in bytes.
        max: u64,
    },

    /// The declared MIME type is not accepted.
    #[error("Please select a JPEG or PNG image (got {0})")]
    UnsupportedType(String),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn format_limit(bytes: &u64) -> String {
    let bytes = *bytes;
    if bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}

/// Check a picked asset against the photo limits.
///
/// Metadata the picker did not report is not checked.
///
/// # Errors
///
/// Returns the first limit the asset violates.
pub fn check_asset(asset: &ImageAsset, config: &PhotoConfig) -> Result<(), PhotoRejection> {
    if let Some(size) = asset.file_size {
        if size > config.max_bytes {
            return Err(PhotoRejection::TooLarge {
                size,
                max: config.max_bytes,
            });
        }
    }

    if let Some(mime) = asset.mime_type.as_deref() {
        if !config.allows_type(mime) {
            return Err(PhotoRejection::UnsupportedType(mime.to_string()));
        }
    }

    Ok(())
}
