//! Image upload collaborator.
//!
//! Product handlers hand the received file to an `ImageStore` and persist the
//! returned reference as `imageUrl`. What the reference points at is up to
//! the implementation.

pub mod form;

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::AppError;

pub use form::{read_product_form, ProductForm};

/// A file received in the `image` part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    /// Lower-cased extension of the client-side filename, if it has a usable one.
    pub fn extension(&self) -> Option<String> {
        let name = self.filename.as_deref()?;
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists the image and returns the reference stored as `imageUrl`.
    async fn save(&self, image: UploadedImage) -> Result<String, AppError>;
}

/// Writes images into a local directory under generated names.
pub struct DiskImageStore {
    dir: PathBuf,
}

impl DiskImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_name(image: &UploadedImage) -> String {
        let stem = format!("{}-{}", chrono::Utc::now().timestamp_millis(), Uuid::new_v4());
        match image.extension() {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem,
        }
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn save(&self, image: UploadedImage) -> Result<String, AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name(&image));
        tokio::fs::write(&path, &image.bytes).await?;
        log::debug!("stored {} byte image at {}", image.bytes.len(), path.display());
        Ok(path.to_string_lossy().replace('\\', "/"))
    }
}

/// Keeps images in memory. References look like `memory://images/<n>`.
#[derive(Default)]
pub struct MemoryImageStore {
    saved: Mutex<Vec<UploadedImage>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved_count(&self) -> usize {
        self.saved.lock().map(|saved| saved.len()).unwrap_or(0)
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn save(&self, image: UploadedImage) -> Result<String, AppError> {
        let mut saved = self
            .saved
            .lock()
            .map_err(|_| AppError::InternalServerError("image store lock poisoned".into()))?;
        saved.push(image);
        Ok(format!("memory://images/{}", saved.len()))
    }
}
