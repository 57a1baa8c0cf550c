use std::path::PathBuf;
use std::time::Duration;

use super::data::{MediaItem, MediaKind};
use super::playback::Playback;
use super::surface::{LightboxMedia, Presentation, Surface};
use crate::error::GalleryError;

/// What closed the lightbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dismissal {
    Escape,
    Backdrop,
    CloseButton,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightboxState {
    Closed,
    Open { index: usize, item: MediaItem },
}

/// Lightbox controller
///
/// Only one item is shown at a time. Opening while open swaps the item in
/// place; there is no intermediate `Closed`.
#[derive(Debug)]
pub struct Lightbox {
    state: LightboxState,
}

impl Default for Lightbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Lightbox {
    pub fn new() -> Self {
        Self {
            state: LightboxState::Closed,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &LightboxState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    /// The Escape listener lives exactly as long as one Open period
    pub fn listens_for_escape(&self) -> bool {
        self.is_open()
    }

    /// Show `item` full-size. `source` is the resolved full-size asset.
    ///
    /// GIFs reuse the frames their card decoded. Returns `false` when the
    /// overlay slot is not mounted.
    pub fn open(&mut self, surface: &mut Surface, index: usize, item: &MediaItem, source: PathBuf) -> bool {
        let card_animation = surface
            .grid()
            .and_then(|grid| grid.card(index))
            .and_then(|card| match &card.presentation {
                Presentation::Animated { animation, .. } => Some(animation.clone()),
                _ => None,
            });

        let Some(overlay) = surface.overlay_mut() else {
            log::error!("{}", GalleryError::SlotMissing("lightbox overlay"));
            return false;
        };

        let media = match item.kind {
            MediaKind::Video => {
                let mut playback = Playback::full();
                if let Err(err) = playback.play(&source) {
                    log::warn!("Lightbox autoplay failed: {err}");
                }
                LightboxMedia::Video { source, playback }
            }
            MediaKind::Gif => LightboxMedia::Animated {
                source,
                alt: item.alt.clone(),
                animation: card_animation.unwrap_or_default(),
            },
            _ => LightboxMedia::Picture {
                source,
                alt: item.alt.clone(),
            },
        };

        overlay.media = Some(media);
        overlay.caption = item.caption.clone();
        overlay.visible = true;

        self.state = LightboxState::Open {
            index,
            item: item.clone(),
        };
        log::info!("🔍 Lightbox opened: {}", item.caption);
        true
    }

    /// Hide the overlay and stop any playback.
    ///
    /// Returns `false` when the overlay slot is not mounted.
    pub fn close(&mut self, surface: &mut Surface, reason: Dismissal) -> bool {
        let Some(overlay) = surface.overlay_mut() else {
            log::error!("{}", GalleryError::SlotMissing("lightbox overlay"));
            return false;
        };

        if let Some(LightboxMedia::Video { playback, .. }) = overlay.media.as_mut() {
            playback.stop();
        }
        overlay.media = None;
        overlay.caption.clear();
        overlay.visible = false;

        if self.is_open() {
            log::debug!("Lightbox closed ({reason:?})");
        }
        self.state = LightboxState::Closed;
        true
    }

    /// Play/pause control
    pub fn toggle_play(&mut self, surface: &mut Surface) {
        if let Some(LightboxMedia::Video { source, playback }) =
            surface.overlay_mut().and_then(|o| o.media.as_mut())
        {
            if let Err(err) = playback.toggle(source) {
                log::warn!("Lightbox playback failed: {err}");
            }
        }
    }

    pub fn toggle_mute(&mut self, surface: &mut Surface) {
        if let Some(LightboxMedia::Video { playback, .. }) =
            surface.overlay_mut().and_then(|o| o.media.as_mut())
        {
            playback.toggle_mute();
        }
    }

    #[cfg(test)]
    pub fn is_playing(&self, surface: &Surface) -> bool {
        surface
            .overlay()
            .and_then(|o| o.media.as_ref())
            .and_then(LightboxMedia::playback)
            .is_some_and(Playback::is_playing)
    }

    /// Whether the shown item needs the frame clock
    pub fn needs_tick(&self, surface: &Surface) -> bool {
        match surface.overlay().and_then(|o| o.media.as_ref()) {
            Some(LightboxMedia::Video { playback, .. }) => playback.is_playing(),
            Some(LightboxMedia::Animated { animation, .. }) => animation.is_animating(),
            _ => false,
        }
    }

    pub fn tick(&self, surface: &mut Surface, elapsed: Duration) {
        match surface.overlay_mut().and_then(|o| o.media.as_mut()) {
            Some(LightboxMedia::Video { playback, .. }) => playback.advance(),
            Some(LightboxMedia::Animated { animation, .. }) => animation.advance(elapsed),
            _ => {}
        }
    }
}
