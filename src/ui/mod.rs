//! User interface views
//!
//! - Filter bar and card grid (gallery.rs)
//! - Lightbox overlay (lightbox.rs)

pub mod gallery;
pub mod lightbox;
