//! Media asset handling
//!
//! This module handles:
//! - Resolving item paths against the assets root
//! - Generating and caching downscaled thumbnails
//! - Rendering document previews, video posters and GIF frames
//! - Decoding and pacing video playback
//! - Opening links and raw documents externally

pub mod animation;
pub mod assets;
pub mod launch;
pub mod preview;
pub mod thumbnail;
pub mod video;
