use std::path::{Path, PathBuf};

use super::thumbnail::{self, ThumbnailJob};
use crate::config::DisplaySettings;
use crate::state::data::{MediaItem, MediaKind};
use crate::state::library::Library;

/// Resolves item paths against the assets root, and substitutes cached
/// downscaled copies when transforms are enabled.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    root: PathBuf,
    transform: Option<Transform>,
}

#[derive(Debug, Clone)]
struct Transform {
    cache_dir: PathBuf,
    thumb_width: u32,
    full_width: u32,
}

impl AssetResolver {
    /// Resolver that always hands out original files
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            transform: None,
        }
    }

    pub fn with_transform(mut self, cache_dir: PathBuf, settings: &DisplaySettings) -> Self {
        self.transform = Some(Transform {
            cache_dir,
            thumb_width: settings.thumb_width,
            full_width: settings.full_width,
        });
        self
    }

    /// Resolver for a loaded library. Transforms are silently dropped when
    /// no cache directory is available.
    pub fn for_library(library: &Library, settings: &DisplaySettings) -> Self {
        let resolver = Self::new(library.assets_root());
        if !settings.use_transform {
            return resolver;
        }
        match thumbnail::cache_dir() {
            Some(cache_dir) => resolver.with_transform(cache_dir, settings),
            None => {
                log::warn!("No cache directory; serving original images");
                resolver
            }
        }
    }

    /// Location of an asset relative to the assets root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    /// Source for the card presentation
    pub fn card_source(&self, item: &MediaItem) -> PathBuf {
        self.sized_source(item, |t| t.thumb_width)
    }

    /// Source for the lightbox presentation
    pub fn full_source(&self, item: &MediaItem) -> PathBuf {
        self.sized_source(item, |t| t.full_width)
    }

    fn sized_source(&self, item: &MediaItem, width: impl Fn(&Transform) -> u32) -> PathBuf {
        let original = self.resolve(&item.path);

        match (&item.kind, &self.transform) {
            (MediaKind::Image, Some(transform)) => {
                let cached = thumbnail::cached_path(&transform.cache_dir, &original, width(transform));
                if cached.exists() {
                    cached
                } else {
                    original
                }
            }
            _ => original,
        }
    }

    /// Downscales not yet in the cache. Only still images are transformed;
    /// GIFs would lose their animation.
    pub fn pending_thumbnails(&self, items: &[MediaItem]) -> Vec<ThumbnailJob> {
        let Some(transform) = &self.transform else {
            return Vec::new();
        };

        let mut jobs = Vec::new();
        for item in items.iter().filter(|i| i.kind == MediaKind::Image) {
            let source = self.resolve(&item.path);
            for width in [transform.thumb_width, transform.full_width] {
                let target = thumbnail::cached_path(&transform.cache_dir, &source, width);
                let queued = jobs.iter().any(|j: &ThumbnailJob| j.target == target);
                if !queued && !target.exists() {
                    jobs.push(ThumbnailJob {
                        source: source.clone(),
                        width,
                        target,
                    });
                }
            }
        }
        jobs
    }
}
