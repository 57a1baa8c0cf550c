//! Category filtering
//!
//! Filtering is a pure function of the item list and the active category,
//! so it is tested here without any display surface.

use super::data::MediaItem;
use super::library::Library;

/// Category id that matches every item
pub const ALL: &str = "all";

/// The single active category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    active: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(ALL)
    }
}

impl FilterState {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            active: category.into(),
        }
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn is_all(&self) -> bool {
        self.active == ALL
    }

    pub fn matches(&self, item: &MediaItem) -> bool {
        self.is_all() || item.category == self.active
    }

    pub(crate) fn set(&mut self, category: &str) {
        self.active = category.to_string();
    }
}

/// The ordered subsequence of `items` that passes `filter`, paired with
/// each item's index in the full list. Never reorders or deduplicates.
pub fn visible_items<'a>(items: &'a [MediaItem], filter: &FilterState) -> Vec<(usize, &'a MediaItem)> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| filter.matches(item))
        .collect()
}

/// One button in the filter bar
#[derive(Debug, Clone, PartialEq)]
pub struct FilterControl {
    pub category: String,
    pub label: String,
    pub icon: String,
    pub count: usize,
    pub active: bool,
}

/// The "all" control followed by one control per category.
///
/// The active indicator is derived from `filter`, so exactly one control
/// carries it whenever the active category is one the library offers.
pub fn filter_controls(library: &Library, filter: &FilterState) -> Vec<FilterControl> {
    let all = FilterControl {
        category: ALL.to_string(),
        label: "All".to_string(),
        icon: "🎯".to_string(),
        count: library.len(),
        active: filter.is_all(),
    };

    std::iter::once(all)
        .chain(library.categories().iter().map(|category| FilterControl {
            category: category.id.clone(),
            label: category.name.clone(),
            icon: category.icon.clone(),
            count: library.count_in(&category.id),
            active: filter.active() == category.id,
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::state::data::MediaKind;
    use std::path::PathBuf;

    fn item(category: &str, caption: &str) -> MediaItem {
        MediaItem {
            path: PathBuf::from(format!("{caption}.png")),
            caption: caption.to_string(),
            alt: caption.to_string(),
            kind: MediaKind::Image,
            category: category.to_string(),
            link: None,
            collab: None,
        }
    }

    fn captions(visible: &[(usize, &MediaItem)]) -> Vec<String> {
        visible.iter().map(|(_, i)| i.caption.clone()).collect()
    }

    #[test]
    fn test_all_yields_everything_in_order() {
        let items = vec![item("b", "1"), item("a", "2"), item("b", "3")];
        let visible = visible_items(&items, &FilterState::default());
        assert_eq!(captions(&visible), vec!["1", "2", "3"]);
        assert_eq!(visible.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_category_yields_exact_subsequence() {
        let items = vec![
            item("b", "1"),
            item("a", "2"),
            item("b", "3"),
            item("b", "3"),
            item("c", "4"),
        ];
        let visible = visible_items(&items, &FilterState::new("b"));
        assert_eq!(captions(&visible), vec!["1", "3", "3"]);
        assert_eq!(visible.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 2, 3]);
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let items = vec![item("a", "1"), item("b", "2"), item("a", "3")];
        let filter = FilterState::new("a");
        let once = visible_items(&items, &filter);
        let twice = visible_items(&items, &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_unknown_category_is_empty() {
        let items = vec![item("a", "1")];
        assert!(visible_items(&items, &FilterState::new("zzz")).is_empty());
    }

    #[test]
    fn test_controls_mark_exactly_one_active() {
        let library = crate::state::library::Library::from_config(
            GalleryConfig::bundled().unwrap(),
        )
        .unwrap();

        let mut filter = FilterState::default();
        for category in ["video", "game", ALL, "research", "research"] {
            filter.set(category);
            let controls = filter_controls(&library, &filter);
            let active: Vec<_> = controls.iter().filter(|c| c.active).collect();
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].category, category);
        }
    }

    #[test]
    fn test_duplicate_declarations_keep_one_active_control() {
        let library = crate::state::library::Library::from_config(
            GalleryConfig::from_json(
                r#"{
                    "categories": [{ "id": "game", "name": "Games" }, { "id": "game", "name": "Games" }],
                    "items": [{ "path": "a.png", "caption": "A", "category": "game" }]
                }"#,
            )
            .unwrap(),
        )
        .unwrap();

        let controls = filter_controls(&library, &FilterState::new("game"));
        let active: Vec<_> = controls.iter().filter(|c| c.active).map(|c| c.category.as_str()).collect();
        assert_eq!(active, vec!["game"]);
        assert_eq!(controls.len(), 2);

        // An "all" declaration never reaches the filter bar
        let reserved = GalleryConfig::from_json(
            r#"{
                "categories": [
                    { "id": "game", "name": "Games" },
                    { "id": "game", "name": "Games" },
                    { "id": "all", "name": "All" }
                ],
                "items": []
            }"#,
        )
        .unwrap();
        assert!(crate::state::library::Library::from_config(reserved).is_err());
    }

    #[test]
    fn test_control_counts() {
        let library = crate::state::library::Library::from_config(
            GalleryConfig::bundled().unwrap(),
        )
        .unwrap();
        let controls = filter_controls(&library, &FilterState::default());

        assert_eq!(controls[0].count, library.len());
        let total: usize = controls[1..].iter().map(|c| c.count).sum();
        assert_eq!(total, library.len());
    }
}
