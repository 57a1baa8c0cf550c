//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the gallery file, the controllers and the UI layer.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::GalleryError;

/// File extensions treated as video when an item has no usable `type`
const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "webm", "mov", "avi", "mkv", "y4m"];

/// How a media item is presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    /// Static picture
    Image,
    /// Muted, looping card preview; full playback in the lightbox
    Video,
    /// Always-animating picture
    Gif,
    /// Document with a rendered first-page preview, or a supplied thumbnail
    Document { thumbnail: Option<PathBuf> },
}

impl MediaKind {
    /// Resolve a `type` tag into a kind.
    ///
    /// Unknown or missing tags fall back to the file extension of `path`.
    /// `thumbnail` is only kept for documents.
    pub fn from_tag(tag: Option<&str>, path: &Path, thumbnail: Option<PathBuf>) -> Self {
        match tag.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
            Some("image") => MediaKind::Image,
            Some("video") => MediaKind::Video,
            Some("gif") => MediaKind::Gif,
            Some("document") | Some("doc") => MediaKind::Document { thumbnail },
            _ => Self::infer(path),
        }
    }

    /// Guess the kind from a file extension
    pub fn infer(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            MediaKind::Video
        } else if ext == "gif" {
            MediaKind::Gif
        } else {
            MediaKind::Image
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, MediaKind::Document { .. })
    }
}

/// One entry in the gallery, as written in the gallery file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    pub path: String,
    pub caption: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub thumbnail_path: Option<String>,
    #[serde(default)]
    pub is_collab: Option<bool>,
}

/// Represents a single, validated media item
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    /// Location of the primary asset, relative to the assets root
    pub path: PathBuf,
    /// Display text
    pub caption: String,
    /// Accessibility text
    pub alt: String,
    /// Presentation strategy
    pub kind: MediaKind,
    /// Grouping key used for filtering
    pub category: String,
    /// External URL; never empty when set
    pub link: Option<String>,
    /// Solo / collab badge for video work
    pub collab: Option<bool>,
}

impl MediaItem {
    /// Validate a record. `index` is only used for error reporting.
    pub fn from_record(index: usize, record: MediaRecord) -> Result<Self, GalleryError> {
        if record.path.trim().is_empty() {
            return Err(GalleryError::MissingField { index, field: "path" });
        }
        if record.caption.trim().is_empty() {
            return Err(GalleryError::MissingField { index, field: "caption" });
        }

        let path = PathBuf::from(record.path);
        let thumbnail = record
            .thumbnail_path
            .filter(|t| !t.trim().is_empty())
            .map(PathBuf::from);
        let kind = MediaKind::from_tag(record.kind.as_deref(), &path, thumbnail);
        let alt = record
            .alt
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| record.caption.clone());

        Ok(Self {
            path,
            caption: record.caption,
            alt,
            kind,
            category: record.category,
            link: record.link.filter(|l| !l.trim().is_empty()),
            collab: record.is_collab,
        })
    }

    /// The external URL this item navigates to, if any
    pub fn external_link(&self) -> Option<&str> {
        self.link.as_deref()
    }
}

/// A filter category declared in the gallery file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

impl Category {
    /// Category for an id that was only seen on items
    pub fn undeclared(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            icon: String::new(),
        }
    }
}

/// A decoded RGBA raster: document first page, video frame or GIF frame
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    /// RGBA pixel data (4 bytes per pixel)
    pub rgba: Vec<u8>,
}

/// One frame of an animated picture and how long it stays up
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationFrame {
    pub image: PreviewImage,
    pub delay: Duration,
}
