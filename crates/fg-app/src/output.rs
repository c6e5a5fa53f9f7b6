use std::path::{Path, PathBuf};

use anyhow::Context;
use fg_core::{ImageUpload, ResultImage};
use tokio::fs;
use tracing::info;

use crate::error::AppError;

/// Read an image from disk for upload.
pub async fn load_upload(path: &Path) -> anyhow::Result<ImageUpload> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    ImageUpload::new(bytes, filename).map_err(|e| {
        AppError::UnreadableImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Write a result to `path`, or to a timestamped file under `dir`.
pub async fn save_result(image: &ResultImage, dir: &Path, path: Option<&Path>) -> anyhow::Result<PathBuf> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => dir.join(image.suggested_filename()),
    };

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(&target, image.bytes())
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;

    info!("Saved result {} ({} bytes) to {}", image.id(), image.len(), target.display());
    Ok(target)
}
