//! Gallery renderer
//!
//! Owns the active filter and turns the library into cards on the surface.
//! Document previews, video posters and GIF frames are requested
//! asynchronously; every render bumps a generation counter so previews
//! resolving after a re-render are dropped.

use iced::widget::image::Handle;
use std::path::PathBuf;
use std::time::Duration;

use super::animation::Animation;
use super::data::{MediaItem, MediaKind};
use super::filter::{self, FilterState, ALL};
use super::library::Library;
use super::playback::Playback;
use super::surface::{Badge, Card, CardGrid, DocumentPreview, Presentation, Surface};
use crate::error::GalleryError;
use crate::media::assets::AssetResolver;
use crate::media::preview::{PreviewKind, PreviewRequest, PreviewResult, Rendered};

/// Category whose items carry the solo / collab badge
const BADGE_CATEGORY: &str = "video";

/// What activating a card does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Open this URL in the system browser
    External(String),
    /// Open the raw document with the system handler
    Document(PathBuf),
    /// Show the item at this index in the lightbox
    Lightbox(usize),
}

/// Decide what activating `item` does. Links always win.
pub fn activation(index: usize, item: &MediaItem, assets: &AssetResolver) -> Activation {
    if let Some(url) = item.external_link() {
        return Activation::External(url.to_string());
    }
    if item.kind.is_document() {
        return Activation::Document(assets.resolve(&item.path));
    }
    Activation::Lightbox(index)
}

#[derive(Debug, Default)]
pub struct GalleryRenderer {
    filter: FilterState,
    generation: u64,
}

impl GalleryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the card grid with the items passing the current filter.
    ///
    /// Returns the previews that need rendering. When the grid slot is not
    /// mounted this logs and leaves everything untouched.
    pub fn render(
        &mut self,
        library: &Library,
        assets: &AssetResolver,
        surface: &mut Surface,
    ) -> Vec<PreviewRequest> {
        let Some(grid) = surface.grid_mut() else {
            log::error!("{}", GalleryError::SlotMissing("card grid"));
            return Vec::new();
        };

        self.generation += 1;
        let visible = filter::visible_items(library.items(), &self.filter);

        if visible.is_empty() {
            *grid = CardGrid::Placeholder;
            log::info!("No items in `{}`", self.filter.active());
            return Vec::new();
        }

        let mut requests = Vec::new();
        let cards = visible
            .iter()
            .map(|&(index, item)| {
                let card = build_card(index, item, assets);
                let request = |source: PathBuf, kind| PreviewRequest {
                    index,
                    source,
                    kind,
                    generation: self.generation,
                };
                match &card.presentation {
                    Presentation::Document(DocumentPreview::Loading) => {
                        requests.push(request(assets.resolve(&item.path), PreviewKind::Document));
                    }
                    Presentation::Video { source, .. } => {
                        requests.push(request(source.clone(), PreviewKind::Poster));
                    }
                    Presentation::Animated { source, .. } => {
                        requests.push(request(source.clone(), PreviewKind::Animation));
                    }
                    _ => {}
                }
                card
            })
            .collect::<Vec<_>>();

        log::info!("Showing {} items (filter `{}`)", cards.len(), self.filter.active());
        *grid = CardGrid::Cards(cards);
        requests
    }

    /// Switch the active category and re-render.
    ///
    /// Categories the library does not offer are rejected so that exactly
    /// one filter control stays active.
    pub fn set_filter(
        &mut self,
        category: &str,
        library: &Library,
        assets: &AssetResolver,
        surface: &mut Surface,
    ) -> Vec<PreviewRequest> {
        if category != ALL && !library.has_category(category) {
            log::warn!("{}", GalleryError::UnknownCategory(category.to_string()));
            return Vec::new();
        }

        self.filter.set(category);
        self.render(library, assets, surface)
    }

    /// Commit a finished preview into its card.
    ///
    /// Returns `false` when the result is stale or its card is gone.
    /// Failed documents show the unavailable fallback; failed posters and
    /// animations keep their static fallback.
    pub fn apply_preview(&self, surface: &mut Surface, result: PreviewResult) -> bool {
        if result.generation != self.generation {
            log::debug!(
                "Dropping stale preview for item {} (generation {} != {})",
                result.index,
                result.generation,
                self.generation
            );
            return false;
        }

        let Some(card) = surface.grid_mut().and_then(|g| g.card_mut(result.index)) else {
            return false;
        };

        match (&mut card.presentation, result.outcome) {
            (Presentation::Document(preview), Ok(Rendered::Still(image))) => {
                *preview = DocumentPreview::Ready(Handle::from_rgba(image.width, image.height, image.rgba));
            }
            (Presentation::Document(preview), Err(err)) => {
                log::error!("Preview failed for item {}: {err}", result.index);
                *preview = DocumentPreview::Unavailable;
            }
            (Presentation::Video { playback, .. }, Ok(Rendered::Still(image))) => {
                playback.set_poster(Handle::from_rgba(image.width, image.height, image.rgba));
            }
            (Presentation::Animated { animation, .. }, Ok(Rendered::Frames(frames))) => {
                *animation = Animation::new(frames);
            }
            (_, Err(err)) => {
                log::warn!("Preview failed for item {}: {err}", result.index);
            }
            _ => return false,
        }
        true
    }

    /// Pointer entered or left a card. Only video cards react.
    pub fn hover(&self, surface: &mut Surface, index: usize, entered: bool) {
        let Some(card) = surface.grid_mut().and_then(|g| g.card_mut(index)) else {
            return;
        };
        let Presentation::Video { source, playback } = &mut card.presentation else {
            return;
        };

        if entered {
            if let Err(err) = playback.play(source) {
                log::warn!("Card preview playback failed: {err}");
            }
        } else {
            playback.rewind_and_pause();
        }
    }

    /// Whether any card needs the frame clock: a playing video or a GIF
    /// with frames to cycle
    pub fn needs_tick(&self, surface: &Surface) -> bool {
        surface.grid().is_some_and(|grid| {
            grid.cards().iter().any(|card| match &card.presentation {
                Presentation::Video { playback, .. } => playback.is_playing(),
                Presentation::Animated { animation, .. } => animation.is_animating(),
                _ => false,
            })
        })
    }

    /// Pull decoded video frames and advance GIFs
    pub fn tick(&self, surface: &mut Surface, elapsed: Duration) {
        if let Some(grid) = surface.grid_mut() {
            for card in grid.cards_mut() {
                match &mut card.presentation {
                    Presentation::Video { playback, .. } => playback.advance(),
                    Presentation::Animated { animation, .. } => animation.advance(elapsed),
                    _ => {}
                }
            }
        }
    }
}

fn build_card(index: usize, item: &MediaItem, assets: &AssetResolver) -> Card {
    let presentation = match &item.kind {
        MediaKind::Image => Presentation::Still {
            source: assets.card_source(item),
        },
        MediaKind::Gif => Presentation::Animated {
            source: assets.card_source(item),
            animation: Animation::default(),
        },
        MediaKind::Video => Presentation::Video {
            source: assets.card_source(item),
            playback: Playback::preview(),
        },
        MediaKind::Document { thumbnail: Some(thumb) } => {
            Presentation::Document(DocumentPreview::Thumbnail(assets.resolve(thumb)))
        }
        MediaKind::Document { thumbnail: None } => Presentation::Document(DocumentPreview::Loading),
    };

    let badge = match item.collab {
        Some(collab) if item.category == BADGE_CATEGORY => {
            Some(if collab { Badge::Collab } else { Badge::Solo })
        }
        _ => None,
    };

    Card {
        index,
        caption: item.caption.clone(),
        alt: item.alt.clone(),
        presentation,
        external_link: item.external_link().is_some(),
        badge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GalleryConfig;
    use crate::error::PreviewError;
    use crate::media::preview::{self, RasterPreview};
    use crate::media::{animation, video};
    use crate::state::data::PreviewImage;
    use crate::state::playback::PlaybackStatus;
    use std::sync::Arc;

    fn library(json: &str) -> Library {
        Library::from_config(GalleryConfig::from_json(json).unwrap()).unwrap()
    }

    fn card_indices(surface: &Surface) -> Vec<usize> {
        surface.grid().unwrap().cards().iter().map(|c| c.index).collect()
    }

    const MIXED: &str = r#"{ "items": [
        { "path": "a.mp4", "caption": "A", "type": "video", "category": "video", "isCollab": true },
        { "path": "b.png", "caption": "B", "type": "image", "category": "game", "link": "https://x" },
        { "path": "c.pdf", "caption": "C", "type": "document", "category": "research" },
        { "path": "d.pdf", "caption": "D", "type": "doc", "category": "research", "thumbnailPath": "d.png" },
        { "path": "e.gif", "caption": "E", "type": "gif", "category": "game" }
    ] }"#;

    #[test]
    fn test_video_filter_scenario() {
        let library = library(
            r#"{ "items": [
                { "path": "a.mp4", "caption": "A", "category": "video" },
                { "path": "b.png", "caption": "B", "category": "game", "link": "https://x" }
            ] }"#,
        );
        let assets = AssetResolver::new(".");
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();

        renderer.set_filter("video", &library, &assets, &mut surface);
        assert_eq!(card_indices(&surface), vec![0]);
    }

    #[test]
    fn test_render_all_preserves_order_and_requests_previews() {
        let library = library(MIXED);
        let assets = AssetResolver::new("/site");
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();

        let requests = renderer.render(&library, &assets, &mut surface);
        assert_eq!(card_indices(&surface), vec![0, 1, 2, 3, 4]);
        let request = |index, source: &str, kind| PreviewRequest {
            index,
            source: PathBuf::from(source),
            kind,
            generation: 1,
        };
        assert_eq!(
            requests,
            vec![
                request(0, "/site/a.mp4", PreviewKind::Poster),
                request(2, "/site/c.pdf", PreviewKind::Document),
                request(4, "/site/e.gif", PreviewKind::Animation),
            ]
        );

        let cards = surface.grid().unwrap().cards();
        assert!(matches!(cards[0].presentation, Presentation::Video { .. }));
        assert_eq!(cards[0].badge, Some(Badge::Collab));
        assert!(cards[1].external_link);
        assert!(!cards[0].external_link);
        assert!(matches!(
            &cards[3].presentation,
            Presentation::Document(DocumentPreview::Thumbnail(p)) if p == &PathBuf::from("/site/d.png")
        ));
        assert!(matches!(cards[4].presentation, Presentation::Animated { .. }));
    }

    #[test]
    fn test_empty_result_shows_placeholder() {
        let library = library(MIXED);
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();
        renderer.filter.set("tools");

        renderer.render(&library, &AssetResolver::new("."), &mut surface);
        assert!(matches!(surface.grid(), Some(CardGrid::Placeholder)));
    }

    #[test]
    fn test_set_filter_twice_is_idempotent() {
        let library = library(MIXED);
        let assets = AssetResolver::new(".");
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();

        renderer.set_filter("game", &library, &assets, &mut surface);
        let first = card_indices(&surface);
        renderer.set_filter("game", &library, &assets, &mut surface);
        assert_eq!(card_indices(&surface), first);
        assert_eq!(first, vec![1, 4]);
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        let library = library(MIXED);
        let assets = AssetResolver::new(".");
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();

        renderer.set_filter("game", &library, &assets, &mut surface);
        renderer.set_filter("nope", &library, &assets, &mut surface);
        assert_eq!(renderer.filter().active(), "game");
        assert_eq!(card_indices(&surface), vec![1, 4]);
    }

    #[test]
    fn test_missing_grid_is_noop() {
        let library = library(MIXED);
        let mut surface = Surface::default();
        let mut renderer = GalleryRenderer::new();

        let requests = renderer.render(&library, &AssetResolver::new("."), &mut surface);
        assert!(requests.is_empty());
        assert_eq!(renderer.generation(), 0);
        assert!(surface.grid().is_none());
    }

    #[test]
    fn test_failed_preview_shows_fallback() {
        let library = library(MIXED);
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();
        renderer.render(&library, &AssetResolver::new("."), &mut surface);

        let applied = renderer.apply_preview(
            &mut surface,
            PreviewResult {
                index: 2,
                generation: renderer.generation(),
                outcome: Err(PreviewError::Unsupported("c.pdf".to_string())),
            },
        );
        assert!(applied);
        let card = &surface.grid().unwrap().cards()[2];
        assert!(matches!(card.presentation, Presentation::Document(DocumentPreview::Unavailable)));
    }

    #[test]
    fn test_successful_preview_is_committed() {
        let library = library(MIXED);
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();
        renderer.render(&library, &AssetResolver::new("."), &mut surface);

        renderer.apply_preview(
            &mut surface,
            PreviewResult {
                index: 2,
                generation: renderer.generation(),
                outcome: Ok(Rendered::Still(PreviewImage {
                    width: 1,
                    height: 1,
                    rgba: vec![0, 0, 0, 255],
                })),
            },
        );
        let card = &surface.grid().unwrap().cards()[2];
        assert!(matches!(card.presentation, Presentation::Document(DocumentPreview::Ready(_))));
    }

    #[test]
    fn test_stale_preview_is_dropped() {
        let library = library(MIXED);
        let assets = AssetResolver::new(".");
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();

        let requests = renderer.render(&library, &assets, &mut surface);
        let stale = requests[0].generation;
        renderer.set_filter(ALL, &library, &assets, &mut surface);

        let applied = renderer.apply_preview(
            &mut surface,
            PreviewResult {
                index: 2,
                generation: stale,
                outcome: Err(PreviewError::Unsupported("c.pdf".to_string())),
            },
        );
        assert!(!applied);
        let card = &surface.grid().unwrap().cards()[2];
        assert!(matches!(card.presentation, Presentation::Document(DocumentPreview::Loading)));
    }

    #[test]
    fn test_activation_policy() {
        let library = library(
            r#"{ "items": [
                { "path": "a.png", "caption": "A", "type": "image", "link": "https://a" },
                { "path": "b.pdf", "caption": "B", "type": "document", "link": "https://b" },
                { "path": "c.pdf", "caption": "C", "type": "document" },
                { "path": "d.mp4", "caption": "D", "type": "video" }
            ] }"#,
        );
        let assets = AssetResolver::new("/site");
        let acts: Vec<_> = library
            .items()
            .iter()
            .enumerate()
            .map(|(i, item)| activation(i, item, &assets))
            .collect();

        assert_eq!(
            acts,
            vec![
                Activation::External("https://a".to_string()),
                Activation::External("https://b".to_string()),
                Activation::Document(PathBuf::from("/site/c.pdf")),
                Activation::Lightbox(3),
            ]
        );
    }

    #[test]
    fn test_cards_carry_alt_text() {
        let library = library(
            r#"{ "items": [
                { "path": "a.png", "caption": "Edit", "alt": "Timeline of the edit" },
                { "path": "b.png", "caption": "Shot" }
            ] }"#,
        );
        let mut surface = Surface::mounted(true);
        GalleryRenderer::new().render(&library, &AssetResolver::new("."), &mut surface);

        let alts: Vec<_> = surface.grid().unwrap().cards().iter().map(|c| c.alt.as_str()).collect();
        assert_eq!(alts, vec!["Timeline of the edit", "Shot"]);
    }

    #[test]
    fn test_video_card_hover() {
        let dir = tempfile::tempdir().unwrap();
        video::write_clip(&dir.path().join("a.y4m"), 10);
        let library = library(r#"{ "items": [ { "path": "a.y4m", "caption": "A", "type": "video" } ] }"#);
        let assets = AssetResolver::new(dir.path());
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();
        renderer.render(&library, &assets, &mut surface);

        renderer.hover(&mut surface, 0, true);
        assert!(renderer.needs_tick(&surface));
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        loop {
            renderer.tick(&mut surface, Duration::from_millis(40));
            let Presentation::Video { playback, .. } = &surface.grid().unwrap().cards()[0].presentation else {
                panic!("expected a video card");
            };
            if playback.position() > Duration::ZERO {
                break;
            }
            assert!(std::time::Instant::now() < deadline, "no frames decoded");
            std::thread::sleep(Duration::from_millis(20));
        }

        renderer.hover(&mut surface, 0, false);
        assert!(!renderer.needs_tick(&surface));
        let Presentation::Video { playback, .. } = &surface.grid().unwrap().cards()[0].presentation else {
            panic!("expected a video card");
        };
        assert_eq!(playback.status(), PlaybackStatus::Paused);
        assert_eq!(playback.position(), Duration::ZERO);
    }

    #[test]
    fn test_undecodable_video_hover_stays_stopped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.mp4"), b"this is not a video").unwrap();
        let library = library(MIXED);
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();
        renderer.render(&library, &AssetResolver::new(dir.path()), &mut surface);

        renderer.hover(&mut surface, 0, true);
        assert!(!renderer.needs_tick(&surface));
        let Presentation::Video { playback, .. } = &surface.grid().unwrap().cards()[0].presentation else {
            panic!("expected a video card");
        };
        assert_eq!(playback.status(), PlaybackStatus::Stopped);
    }

    #[tokio::test]
    async fn test_video_card_gets_poster() {
        let dir = tempfile::tempdir().unwrap();
        video::write_clip(&dir.path().join("a.y4m"), 2);
        let library = library(r#"{ "items": [ { "path": "a.y4m", "caption": "A" } ] }"#);
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();

        let requests = renderer.render(&library, &AssetResolver::new(dir.path()), &mut surface);
        let result = preview::render(Arc::new(RasterPreview::default()), requests[0].clone()).await;
        assert!(renderer.apply_preview(&mut surface, result));

        let Presentation::Video { playback, .. } = &surface.grid().unwrap().cards()[0].presentation else {
            panic!("expected a video card");
        };
        assert!(playback.frame().is_some());
        assert!(!playback.is_playing());
    }

    #[tokio::test]
    async fn test_gif_card_advances_on_tick() {
        let dir = tempfile::tempdir().unwrap();
        animation::write_gif(&dir.path().join("run.gif"), &[[255, 0, 0, 255], [0, 0, 255, 255]], 100);
        let library = library(r#"{ "items": [ { "path": "run.gif", "caption": "Run", "type": "gif" } ] }"#);
        let mut surface = Surface::mounted(true);
        let mut renderer = GalleryRenderer::new();

        let requests = renderer.render(&library, &AssetResolver::new(dir.path()), &mut surface);
        assert!(!renderer.needs_tick(&surface));
        let result = preview::render(Arc::new(RasterPreview::default()), requests[0].clone()).await;
        assert!(renderer.apply_preview(&mut surface, result));
        assert!(renderer.needs_tick(&surface));

        let current = |surface: &Surface| match &surface.grid().unwrap().cards()[0].presentation {
            Presentation::Animated { animation, .. } => animation.current(),
            _ => panic!("expected an animated card"),
        };
        assert_eq!(current(&surface), 0);
        renderer.tick(&mut surface, Duration::from_millis(100));
        assert_eq!(current(&surface), 1);
        renderer.tick(&mut surface, Duration::from_millis(100));
        assert_eq!(current(&surface), 0);
    }
}
