//! Error types
//!
//! Every failure in the gallery degrades to a logged message or a visible
//! fallback state. Nothing here is ever allowed to take the window down.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading the gallery or driving the display surface
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The gallery file could not be read from disk
    #[error("failed to read gallery file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The gallery file is not valid JSON or has the wrong shape
    #[error("invalid gallery file: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required item field was empty
    #[error("gallery item {index} has an empty `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// A declared category uses the id of the built-in "all" control
    #[error("category id `{0}` is reserved")]
    ReservedCategory(String),

    /// A filter was requested for a category no control exists for
    #[error("unknown category `{0}`")]
    UnknownCategory(String),

    /// A display slot the operation writes into is not mounted
    #[error("display slot `{0}` is not mounted")]
    SlotMissing(&'static str),

    /// The system browser or file handler could not be launched
    #[error("failed to open {target}: {source}")]
    Launch {
        target: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the document preview collaborator
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PreviewError {
    /// No renderer understands this asset format
    #[error("no preview renderer for {0}")]
    Unsupported(String),

    /// The asset exists but could not be decoded
    #[error("failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    /// The background task died before producing a result
    #[error("preview task failed: {0}")]
    Join(String),
}

/// Errors from decoding and playing video
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PlaybackError {
    /// The media asset is not on disk
    #[error("media asset not found: {}", .0.display())]
    Missing(PathBuf),

    /// FFmpeg could not open or decode the asset
    #[error("failed to decode video {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// The decoder thread could not be started or died
    #[error("video decoder failed: {0}")]
    Decoder(String),
}

/// Errors from generating cached thumbnails
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write thumbnail {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("thumbnail task failed: {0}")]
    Join(String),
}
