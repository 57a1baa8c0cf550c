use image::imageops::FilterType;
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::error::ThumbnailError;

/// A downscale waiting to be written into the cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailJob {
    pub source: PathBuf,
    pub width: u32,
    pub target: PathBuf,
}

/// Get the thumbnail cache directory, creating it if needed.
/// Returns ~/.cache/folio/thumbnails on Linux
pub fn cache_dir() -> Option<PathBuf> {
    let mut path = dirs_next::cache_dir().or_else(dirs_next::home_dir)?;

    path.push("folio");
    path.push("thumbnails");

    if let Err(err) = fs::create_dir_all(&path) {
        log::warn!("Failed to create thumbnail cache {}: {err}", path.display());
        return None;
    }

    Some(path)
}

/// Where the `width`-wide version of `source` lives in `cache_dir`.
/// Doesn't generate anything.
pub fn cached_path(cache_dir: &Path, source: &Path, width: u32) -> PathBuf {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    cache_dir.join(format!("{:016x}-{width}.png", hasher.finish()))
}

/// Write one thumbnail. Images already narrower than the target width are
/// re-encoded at their own size.
pub fn generate(job: &ThumbnailJob) -> Result<PathBuf, ThumbnailError> {
    let img = image::open(&job.source).map_err(|source| ThumbnailError::Decode {
        path: job.source.clone(),
        source,
    })?;

    let resized = if img.width() > job.width {
        img.resize(job.width, u32::MAX, FilterType::Lanczos3)
    } else {
        img
    };

    resized
        .save(&job.target)
        .map_err(|source| ThumbnailError::Write {
            path: job.target.clone(),
            source,
        })?;

    log::debug!("📸 Generated thumbnail: {}", job.target.display());
    Ok(job.target.clone())
}

/// Run every job on a blocking worker. Returns how many were written;
/// failures are logged and skipped.
pub async fn generate_all(jobs: Vec<ThumbnailJob>) -> usize {
    let total = jobs.len();
    let result = tokio::task::spawn_blocking(move || {
        jobs.iter()
            .filter(|job| match generate(job) {
                Ok(_) => true,
                Err(err) => {
                    log::warn!("⚠️  {err}");
                    false
                }
            })
            .count()
    })
    .await;

    match result {
        Ok(written) => {
            log::info!("Thumbnails ready: {written}/{total}");
            written
        }
        Err(err) => {
            log::error!("{}", ThumbnailError::Join(err.to_string()));
            0
        }
    }
}
