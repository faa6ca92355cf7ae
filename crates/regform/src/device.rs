//! Desktop stand-ins for device capabilities.
//!
//! A desktop has no permission prompts and no camera, so [`AlwaysGranted`]
//! grants everything and [`FilePicker`] "picks" a file chosen up front
//! (for example from a command-line argument).

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::backend::{
    Capability, ImageAsset, ImagePicker, PermissionGate, PermissionStatus, PhotoSource,
    PickResult, PickerOptions,
};

/// Grants every capability without prompting.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysGranted;

#[async_trait::async_trait]
impl PermissionGate for AlwaysGranted {
    async fn request(&self, capability: Capability) -> PermissionStatus {
        debug!(capability = %capability, "No permission model, granting");
        PermissionStatus::Granted
    }
}

/// Picks a pre-selected file from disk.
#[derive(Debug, Clone, Default)]
pub struct FilePicker {
    path: Option<PathBuf>,
}

impl FilePicker {
    /// A picker that returns `path` from the gallery.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A picker with nothing to pick; every pick is cancelled.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// MIME type implied by a file extension.
#[must_use]
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_string_lossy().to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

#[async_trait::async_trait]
impl ImagePicker for FilePicker {
    async fn pick(&self, source: PhotoSource, _options: &PickerOptions) -> PickResult {
        if source == PhotoSource::Camera {
            return PickResult::Error("camera capture is not available on this device".to_string());
        }

        let Some(path) = &self.path else {
            return PickResult::Cancelled;
        };

        let metadata = match tokio::fs::metadata(path).await {
            Ok(metadata) => metadata,
            Err(e) => return PickResult::Error(format!("cannot read {}: {e}", path.display())),
        };
        if !metadata.is_file() {
            return PickResult::Error(format!("{} is not a file", path.display()));
        }

        let mut asset = ImageAsset::from_path(path);
        asset.file_size = Some(metadata.len());
        asset.mime_type = mime_for_path(path).map(str::to_string);
        debug!(uri = %asset.uri, size = metadata.len(), "Picked file");
        PickResult::Asset(asset)
    }
}
