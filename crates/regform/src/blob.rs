//! Local file system blob store.
//!
//! Photos are copied into a directory under a content-addressed name, so
//! storing the same image twice yields the same path.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info};

use crate::backend::{BlobStore, ImageAsset, UploadProgress};
use crate::error::{Error, Result};

/// Bytes copied per read.
const CHUNK_SIZE: usize = 64 * 1024;

/// Hex digits of the content hash kept in file names.
const HASH_PREFIX_LEN: usize = 16;

/// Extension used when the asset gives no hint.
const DEFAULT_EXTENSION: &str = "jpg";

/// Copies photos into a local directory.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    directory: PathBuf,
}

impl LocalBlobStore {
    /// Store photos under `directory`, creating it on first use.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// The target directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    async fn copy_into(
        &self,
        source: &Path,
        temp: &Path,
        progress: &UploadProgress,
    ) -> std::io::Result<blake3::Hash> {
        let mut input = fs::File::open(source).await?;
        let total = input.metadata().await?.len();
        let mut output = fs::File::create(temp).await?;

        let mut hasher = blake3::Hasher::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        let mut transferred: u64 = 0;
        progress.report(0, total.max(1));

        loop {
            let n = input.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
            output.write_all(&buf[..n]).await?;
            transferred += n as u64;
            progress.report(transferred, total);
        }

        output.flush().await?;
        output.sync_all().await?;
        progress.report(total, total);
        Ok(hasher.finalize())
    }
}

fn path_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// Pick a file extension from the asset's name, path or MIME type.
fn extension_for(asset: &ImageAsset) -> String {
    asset
        .file_name
        .as_deref()
        .map(Path::new)
        .and_then(path_extension)
        .or_else(|| path_extension(&asset.local_path()))
        .or_else(|| {
            asset
                .mime_type
                .as_deref()
                .and_then(|mime| mime.strip_prefix("image/"))
                .map(str::to_ascii_lowercase)
        })
        .map(|ext| if ext == "jpeg" { "jpg".to_string() } else { ext })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

#[async_trait::async_trait]
impl BlobStore for LocalBlobStore {
    async fn store(&self, asset: &ImageAsset, progress: &UploadProgress) -> Result<String> {
        let source = asset.local_path();
        debug!(source = %source.display(), "Storing photo");

        fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| Error::DirectoryCreate {
                path: self.directory.clone(),
                source: e,
            })?;

        let temp = self
            .directory
            .join(format!(".upload-{}.tmp", uuid::Uuid::new_v4().simple()));

        let hash = match self.copy_into(&source, &temp, progress).await {
            Ok(hash) => hash,
            Err(e) => {
                let _ = fs::remove_file(&temp).await;
                return Err(Error::blob_store(&asset.uri, e.to_string()));
            }
        };

        let hex = hash.to_hex();
        let file_name = format!(
            "user_photo_{}.{}",
            &hex.as_str()[..HASH_PREFIX_LEN],
            extension_for(asset)
        );
        let target = self.directory.join(file_name);

        if fs::try_exists(&target).await.unwrap_or(false) {
            let _ = fs::remove_file(&temp).await;
            debug!(target = %target.display(), "Photo already stored");
        } else if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(Error::blob_store(&asset.uri, e.to_string()));
        }

        info!(target = %target.display(), "Photo stored");
        Ok(target.to_string_lossy().into_owned())
    }
}
