//! Collaborator interfaces for the form controller.
//!
//! The controller never talks to a database, a file system, a camera or a
//! permission prompt directly. It goes through the traits defined here, so
//! a mobile shell, a desktop CLI and a test harness can each plug in their
//! own implementations.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use crate::error::Result;
use crate::record::{RecordId, StoredRecord, SubmissionRecord};

/// Where a photo should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoSource {
    /// Take a new photo with the device camera.
    Camera,
    /// Pick an existing image from the gallery.
    Gallery,
}

impl std::fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
            Self::Gallery => write!(f, "gallery"),
        }
    }
}

/// Options handed to the image picker.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerOptions {
    /// JPEG quality between 0 and 1.
    pub quality: f32,
    /// Maximum width in pixels of the returned image.
    pub max_width: u32,
    /// Maximum height in pixels of the returned image.
    pub max_height: u32,
    /// Maximum number of images to return.
    pub selection_limit: u32,
    /// Whether a camera capture should also be saved to the gallery.
    pub save_to_photos: bool,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            quality: 0.8,
            max_width: 1000,
            max_height: 1000,
            selection_limit: 1,
            save_to_photos: false,
        }
    }
}

/// An image returned by the picker, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Location of the image, usually a `file://` URI.
    pub uri: String,
    /// Original file name, when the platform reports one.
    pub file_name: Option<String>,
    /// Size in bytes, when the platform reports it.
    pub file_size: Option<u64>,
    /// Declared MIME type, when the platform reports it.
    pub mime_type: Option<String>,
}

impl ImageAsset {
    /// The asset's location as a local file system path.
    #[must_use]
    pub fn local_path(&self) -> PathBuf {
        PathBuf::from(self.uri.strip_prefix("file://").unwrap_or(&self.uri))
    }

    /// Build an asset describing a local file, with no metadata filled in.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        Self {
            uri: format!("file://{}", path.display()),
            file_name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            file_size: None,
            mime_type: None,
        }
    }
}

/// What the picker produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickResult {
    /// The user backed out.
    Cancelled,
    /// The picker failed.
    Error(String),
    /// An image was chosen.
    Asset(ImageAsset),
}

/// A device capability that may need the user's consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Camera capture.
    Camera,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Camera => write!(f, "camera"),
        }
    }
}

/// Answer to a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The capability may be used.
    Granted,
    /// The user (or platform) refused.
    Denied,
}

impl PermissionStatus {
    /// Whether the capability may be used.
    #[must_use]
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Shared, cloneable view of an upload's progress.
///
/// The percentage only ever increases until [`UploadProgress::clear`] is
/// called, so a UI polling it never sees the bar jump backwards.
#[derive(Debug, Clone, Default)]
pub struct UploadProgress {
    percent: Arc<AtomicU8>,
    active: Arc<AtomicBool>,
}

impl UploadProgress {
    /// Create an idle progress handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `transferred` of `total` bytes have been sent.
    pub fn report(&self, transferred: u64, total: u64) {
        let percent = if total == 0 {
            100
        } else {
            u8::try_from(transferred.min(total) * 100 / total).unwrap_or(100)
        };
        self.active.store(true, Ordering::SeqCst);
        self.percent.fetch_max(percent, Ordering::SeqCst);
    }

    /// Current completion percentage, 0 to 100.
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::SeqCst)
    }

    /// Whether an upload has reported progress since the last clear.
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Mark the upload as over, keeping the last percentage visible.
    pub fn finish(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    /// Reset to idle.
    pub fn clear(&self) {
        self.active.store(false, Ordering::SeqCst);
        self.percent.store(0, Ordering::SeqCst);
    }
}

/// A schemaless document store holding one record per registrant.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Create a new record and return its generated id.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn create(&self, collection: &str, record: &SubmissionRecord) -> Result<RecordId>;

    /// Overwrite the fields of an existing record.
    ///
    /// Timestamps that are `None` on `record` keep their stored value.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist or the write fails.
    async fn update(&self, collection: &str, id: &RecordId, record: &SubmissionRecord)
        -> Result<()>;

    /// Fetch one record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RecordNotFound`] if there is no such record.
    async fn get(&self, collection: &str, id: &RecordId) -> Result<StoredRecord>;

    /// Fetch every record in a collection, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn list(&self, collection: &str) -> Result<Vec<StoredRecord>>;

    /// Remove a record. Removing a missing record is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn delete(&self, collection: &str, id: &RecordId) -> Result<()>;
}

/// Storage for profile photos.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist the asset and return a URL or path that refers to it.
    ///
    /// Progress is reported through `progress` as bytes are written.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset cannot be read or stored.
    async fn store(&self, asset: &ImageAsset, progress: &UploadProgress) -> Result<String>;
}

/// Platform permission prompts.
#[async_trait::async_trait]
pub trait PermissionGate: Send + Sync {
    /// Ask for a capability, prompting the user if the platform requires it.
    async fn request(&self, capability: Capability) -> PermissionStatus;
}

/// Camera and gallery access.
#[async_trait::async_trait]
pub trait ImagePicker: Send + Sync {
    /// Let the user choose or capture one image.
    async fn pick(&self, source: PhotoSource, options: &PickerOptions) -> PickResult;
}

/// The full set of collaborators a form controller needs.
#[derive(Clone)]
pub struct Collaborators {
    /// Where records are written.
    pub records: Arc<dyn RecordStore>,
    /// Where photos are written.
    pub blobs: Arc<dyn BlobStore>,
    /// Permission prompts.
    pub permissions: Arc<dyn PermissionGate>,
    /// Camera and gallery.
    pub picker: Arc<dyn ImagePicker>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_progress_is_monotonic() {
        let progress = UploadProgress::new();
        assert!(!progress.is_uploading());

        progress.report(50, 100);
        assert_eq!(progress.percent(), 50);
        assert!(progress.is_uploading());

        progress.report(20, 100);
        assert_eq!(progress.percent(), 50);

        progress.report(100, 100);
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_upload_progress_clones_share_state() {
        let progress = UploadProgress::new();
        let view = progress.clone();

        progress.report(3, 4);
        assert_eq!(view.percent(), 75);

        view.clear();
        assert_eq!(progress.percent(), 0);
        assert!(!progress.is_uploading());
    }

    #[test]
    fn test_upload_progress_finish_keeps_percent() {
        let progress = UploadProgress::new();
        progress.report(100, 100);
        progress.finish();
        assert!(!progress.is_uploading());
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_upload_progress_empty_file_is_complete() {
        let progress = UploadProgress::new();
        progress.report(0, 0);
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_upload_progress_overshoot_is_capped() {
        let progress = UploadProgress::new();
        progress.report(300, 100);
        assert_eq!(progress.percent(), 100);
    }

    #[test]
    fn test_image_asset_local_path() {
        let asset = ImageAsset {
            uri: "file:///tmp/photo.jpg".to_string(),
            file_name: None,
            file_size: None,
            mime_type: None,
        };
        assert_eq!(asset.local_path(), PathBuf::from("/tmp/photo.jpg"));

        let bare = ImageAsset {
            uri: "/tmp/other.png".to_string(),
            ..asset
        };
        assert_eq!(bare.local_path(), PathBuf::from("/tmp/other.png"));
    }

    #[test]
    fn test_image_asset_from_path() {
        let asset = ImageAsset::from_path(Path::new("/data/me.png"));
        assert_eq!(asset.uri, "file:///data/me.png");
        assert_eq!(asset.file_name.as_deref(), Some("me.png"));
    }

    #[test]
    fn test_picker_options_default() {
        let options = PickerOptions::default();
        assert!((options.quality - 0.8).abs() < f32::EPSILON);
        assert_eq!(options.max_width, 1000);
        assert_eq!(options.selection_limit, 1);
    }

    #[test]
    fn test_permission_status() {
        assert!(PermissionStatus::Granted.is_granted());
        assert!(!PermissionStatus::Denied.is_granted());
        assert_eq!(Capability::Camera.to_string(), "camera");
        assert_eq!(PhotoSource::Gallery.to_string(), "gallery");
    }
}
