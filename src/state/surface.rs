//! Display surface
//!
//! The controllers never touch widgets. They write cards and the lightbox
//! overlay into slots on a `Surface`, and the view reads those slots back.
//! A slot that is not mounted turns writes into logged no-ops.

use iced::widget::image::Handle;
use std::path::PathBuf;

use super::animation::Animation;
use super::playback::Playback;

/// Everything the window shows, by slot
#[derive(Debug, Default)]
pub struct Surface {
    grid: Option<CardGrid>,
    overlay: Option<Overlay>,
}

impl Surface {
    /// Surface with the card grid mounted, and the overlay when `lightbox`
    pub fn mounted(lightbox: bool) -> Self {
        Self {
            grid: Some(CardGrid::default()),
            overlay: lightbox.then(Overlay::default),
        }
    }

    pub fn grid(&self) -> Option<&CardGrid> {
        self.grid.as_ref()
    }

    pub fn grid_mut(&mut self) -> Option<&mut CardGrid> {
        self.grid.as_mut()
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn overlay_mut(&mut self) -> Option<&mut Overlay> {
        self.overlay.as_mut()
    }

    /// Background scrolling is suppressed while the overlay is shown
    pub fn scroll_locked(&self) -> bool {
        self.overlay.as_ref().is_some_and(|o| o.visible)
    }
}

/// The card grid slot
#[derive(Debug, Default)]
pub enum CardGrid {
    /// Nothing rendered yet
    #[default]
    Blank,
    /// "No items" placeholder for an empty filter result
    Placeholder,
    Cards(Vec<Card>),
}

impl CardGrid {
    pub fn cards(&self) -> &[Card] {
        match self {
            CardGrid::Cards(cards) => cards,
            _ => &[],
        }
    }

    pub fn card(&self, index: usize) -> Option<&Card> {
        self.cards().iter().find(|c| c.index == index)
    }

    pub fn card_mut(&mut self, index: usize) -> Option<&mut Card> {
        match self {
            CardGrid::Cards(cards) => cards.iter_mut().find(|c| c.index == index),
            _ => None,
        }
    }

    pub fn cards_mut(&mut self) -> impl Iterator<Item = &mut Card> {
        let cards: &mut [Card] = match self {
            CardGrid::Cards(cards) => cards,
            _ => &mut [],
        };
        cards.iter_mut()
    }
}

/// One rendered media item
#[derive(Debug)]
pub struct Card {
    /// Index of the item in the full gallery list
    pub index: usize,
    pub caption: String,
    /// Accessibility text, shown as the media tooltip
    pub alt: String,
    pub presentation: Presentation,
    /// Show the external-link indicator
    pub external_link: bool,
    pub badge: Option<Badge>,
}

/// Solo / collab marker on video work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Solo,
    Collab,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::Solo => "Solo",
            Badge::Collab => "Collab",
        }
    }
}

#[derive(Debug)]
pub enum Presentation {
    Still { source: PathBuf },
    Animated { source: PathBuf, animation: Animation },
    /// The poster frame lives in `playback`
    Video { source: PathBuf, playback: Playback },
    Document(DocumentPreview),
}

#[derive(Debug, Clone)]
pub enum DocumentPreview {
    /// Supplied thumbnail image
    Thumbnail(PathBuf),
    /// Waiting on the preview renderer
    Loading,
    Ready(Handle),
    Unavailable,
}

/// The lightbox overlay slot
#[derive(Debug, Default)]
pub struct Overlay {
    pub visible: bool,
    pub media: Option<LightboxMedia>,
    pub caption: String,
}

#[derive(Debug)]
pub enum LightboxMedia {
    Picture { source: PathBuf, alt: String },
    /// GIF, cycling the frames its card already decoded
    Animated { source: PathBuf, alt: String, animation: Animation },
    Video { source: PathBuf, playback: Playback },
}

impl LightboxMedia {
    pub fn playback(&self) -> Option<&Playback> {
        match self {
            LightboxMedia::Video { playback, .. } => Some(playback),
            _ => None,
        }
    }
}
