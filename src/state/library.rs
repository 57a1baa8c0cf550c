use std::path::{Path, PathBuf};

use super::data::{Category, MediaItem};
use super::filter::ALL;
use crate::config::GalleryConfig;
use crate::error::GalleryError;

/// The Library holds the validated gallery: items in configuration order
/// and the categories offered as filters.
///
/// It is built once at start-up and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Library {
    items: Vec<MediaItem>,
    categories: Vec<Category>,
    assets_root: PathBuf,
}

impl Library {
    /// Build a Library from a gallery configuration.
    ///
    /// Fails on the first invalid item, and on a declared category whose
    /// id is the reserved `all`. A category declared twice keeps its first
    /// declaration. Categories used by items but not declared are appended
    /// in first-appearance order.
    pub fn from_config(config: GalleryConfig) -> Result<Self, GalleryError> {
        let items = config
            .items
            .into_iter()
            .enumerate()
            .map(|(index, record)| MediaItem::from_record(index, record))
            .collect::<Result<Vec<_>, _>>()?;

        let mut categories: Vec<Category> = Vec::with_capacity(config.categories.len());
        for category in config.categories {
            if category.id == ALL {
                return Err(GalleryError::ReservedCategory(category.id));
            }
            if category.id.is_empty() || categories.iter().any(|c| c.id == category.id) {
                log::warn!("Ignoring duplicate or empty category `{}`", category.id);
                continue;
            }
            categories.push(category);
        }

        for item in &items {
            if item.category.is_empty()
                || item.category == ALL
                || categories.iter().any(|c| c.id == item.category)
            {
                continue;
            }
            categories.push(Category::undeclared(&item.category));
        }

        let assets_root = config.assets_root.unwrap_or_else(|| PathBuf::from("."));

        log::info!(
            "📁 Gallery loaded: {} items in {} categories",
            items.len(),
            categories.len()
        );

        Ok(Self {
            items,
            categories,
            assets_root,
        })
    }

    /// All items in configuration order
    pub fn items(&self) -> &[MediaItem] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&MediaItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Categories in filter-bar order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn has_category(&self, id: &str) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    /// Number of items in a category
    pub fn count_in(&self, category: &str) -> usize {
        self.items.iter().filter(|i| i.category == category).count()
    }

    /// Directory item paths are relative to
    pub fn assets_root(&self) -> &Path {
        &self.assets_root
    }
}
