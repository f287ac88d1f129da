//! Filesystem-backed collaborators.
//!
//! `FileImageProvider` reads source images from disk and
//! `DirectoryInpaintService` spools each submission as a pair of PNGs plus
//! a JSON manifest for an offline inpainting worker.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use maskpaint_renderer::{ImageProvider, InpaintRequest, InpaintService, ServiceError};
use serde::Serialize;

/// Reads image bytes from local paths or `file://` URLs.
#[derive(Debug, Clone, Default)]
pub struct FileImageProvider;

impl FileImageProvider {
    fn resolve(url: &str) -> PathBuf {
        PathBuf::from(url.strip_prefix("file://").unwrap_or(url))
    }
}

#[async_trait]
impl ImageProvider for FileImageProvider {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let path = Self::resolve(url);
        tracing::debug!("Reading source image {:?}", path);
        tokio::fs::read(&path)
            .await
            .map_err(|e| ServiceError::new(format!("{}: {e}", path.display())))
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    cover_id: &'a str,
    width: u32,
    height: u32,
    mask: String,
    image: String,
}

/// Writes submissions into a spool directory.
///
/// Each request becomes `<cover>-<n>-mask.png`, `<cover>-<n>-image.png`
/// and `<cover>-<n>.json`. The returned URL points at the manifest.
#[derive(Debug)]
pub struct DirectoryInpaintService {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl DirectoryInpaintService {
    /// Spool into `dir`, which must already exist.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            sequence: AtomicU64::new(0),
        }
    }

    /// The spool directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of requests spooled so far.
    #[must_use]
    pub fn spooled(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

/// Keep identifiers safe for use in file names.
fn file_stem(cover_id: &str) -> String {
    let stem: String = cover_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() {
        "cover".to_string()
    } else {
        stem
    }
}

async fn write(path: &Path, bytes: &[u8]) -> Result<(), ServiceError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| ServiceError::new(format!("{}: {e}", path.display())))
}

#[async_trait]
impl InpaintService for DirectoryInpaintService {
    async fn inpaint(&self, request: InpaintRequest) -> Result<String, ServiceError> {
        let n = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let stem = format!("{}-{n}", file_stem(&request.cover_id));

        let mask_name = format!("{stem}-mask.png");
        let image_name = format!("{stem}-image.png");
        write(&self.dir.join(&mask_name), &request.mask).await?;
        write(&self.dir.join(&image_name), &request.image).await?;

        let manifest = Manifest {
            cover_id: &request.cover_id,
            width: request.width,
            height: request.height,
            mask: mask_name,
            image: image_name,
        };
        let json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| ServiceError::new(format!("manifest: {e}")))?;
        let manifest_path = self.dir.join(format!("{stem}.json"));
        write(&manifest_path, &json).await?;

        tracing::info!("Spooled {}x{} request to {:?}", request.width, request.height, manifest_path);
        Ok(format!("file://{}", manifest_path.display()))
    }
}
