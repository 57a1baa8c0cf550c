//! State management module
//!
//! This module handles all application state, including:
//! - The validated gallery (library.rs)
//! - Shared data structures (data.rs)
//! - Category filtering (filter.rs)
//! - The gallery renderer and activation policy (gallery.rs)
//! - The lightbox controller (lightbox.rs)
//! - Video playback state (playback.rs) and GIF frame cycling (animation.rs)
//! - The display surface the view reads from (surface.rs)

pub mod animation;
pub mod data;
pub mod filter;
pub mod gallery;
pub mod library;
pub mod lightbox;
pub mod playback;
pub mod surface;
