//! On-disk store for uploaded item photos.
//!
//! Photos live in one flat directory and are addressed by generated
//! filenames, so nothing the client sends ever becomes a path component.
//! Uploads are buffered and validated before the first byte hits disk;
//! accepted payloads are written to a temporary sibling, fsynced, then
//! renamed into place.

use crate::services::inventory_service::{InventoryError, InventoryResult};
use bytes::Bytes;
use chrono::Utc;
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

/// Hard cap on a single uploaded photo.
pub const MAX_PHOTO_BYTES: usize = 10 * 1024 * 1024;

const MAX_EXTENSION_LEN: usize = 8;

/// A photo payload pulled out of a multipart request.
#[derive(Clone, Debug)]
pub struct PhotoUpload {
    pub data: Bytes,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// Flat-directory photo storage.
#[derive(Clone, Debug)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute path of a stored photo file.
    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Reject uploads that are not images or exceed [`MAX_PHOTO_BYTES`].
    ///
    /// A missing content type counts as `application/octet-stream` and is
    /// rejected. Callers that need to drop an old file before saving a new
    /// one run this first so a bad upload never destroys existing state.
    pub fn ensure_acceptable(&self, upload: &PhotoUpload) -> InventoryResult<()> {
        let mime = upload
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");
        if !mime.starts_with("image/") {
            return Err(InventoryError::NotAnImage(mime.to_string()));
        }
        if upload.data.len() > MAX_PHOTO_BYTES {
            return Err(InventoryError::PayloadTooLarge {
                size: upload.data.len(),
                limit: MAX_PHOTO_BYTES,
            });
        }
        Ok(())
    }

    /// Validate and persist an upload, returning the generated filename.
    ///
    /// The name combines a millisecond timestamp with a random component and
    /// keeps the sanitized original extension, so concurrent saves cannot
    /// collide. Rejected uploads leave the directory untouched.
    pub async fn save(&self, upload: &PhotoUpload) -> InventoryResult<String> {
        self.ensure_acceptable(upload)?;

        fs::create_dir_all(&self.dir).await?;

        let filename = generate_filename(upload.file_name.as_deref());
        let final_path = self.path_for(&filename);
        let tmp_path = self.dir.join(format!(".tmp-{}", Uuid::new_v4()));

        let mut file = File::create(&tmp_path).await?;
        if let Err(err) = write_all_durable(&mut file, &upload.data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(InventoryError::Io(err));
        }
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &final_path).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(InventoryError::Io(err));
        }

        debug!("stored photo {}", final_path.display());
        Ok(filename)
    }

    /// Remove a stored photo. A file that is already gone is not an error.
    pub async fn delete(&self, filename: &str) -> InventoryResult<()> {
        let path = self.path_for(filename);
        match fs::remove_file(&path).await {
            Ok(_) => {
                debug!("removed photo file {}", path.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("photo file {} already missing", path.display());
                Ok(())
            }
            Err(err) => Err(InventoryError::Io(err)),
        }
    }

    pub async fn exists(&self, filename: &str) -> bool {
        fs::try_exists(self.path_for(filename)).await.unwrap_or(false)
    }

    /// Open a stored photo for streaming, returning the handle and its size.
    pub async fn open(&self, filename: &str) -> io::Result<(File, u64)> {
        let file = File::open(self.path_for(filename)).await?;
        let len = file.metadata().await?.len();
        Ok((file, len))
    }
}

async fn write_all_durable(file: &mut File, data: &[u8]) -> io::Result<()> {
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Serve-time MIME type, derived from the stored filename's extension.
///
/// Unknown or missing extensions fall back to `image/jpeg`; only images are
/// ever accepted, so the fallback is always in-family.
pub fn mime_type_for(filename: &str) -> &'static str {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "image/jpeg",
    }
}

/// Build `photo_{millis}_{uuid}[.ext]` from the client's original filename.
fn generate_filename(original: Option<&str>) -> String {
    let stamp = Utc::now().timestamp_millis();
    let token = Uuid::new_v4().simple();
    match original.and_then(sanitized_extension) {
        Some(ext) => format!("photo_{stamp}_{token}.{ext}"),
        None => format!("photo_{stamp}_{token}"),
    }
}

/// Extension of the original upload, reduced to lowercase ASCII
/// alphanumerics and capped at [`MAX_EXTENSION_LEN`] characters.
fn sanitized_extension(original: &str) -> Option<String> {
    let ext: String = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())?
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(MAX_EXTENSION_LEN)
        .collect::<String>()
        .to_ascii_lowercase();

    if ext.is_empty() { None } else { Some(ext) }
}
