//! Gallery configuration
//!
//! The gallery is a static, ordered list of media items plus a handful of
//! display settings. It is read once at start-up from, in order:
//! - the `--gallery <path>` flag
//! - `<config dir>/folio/gallery.json`
//!   (Linux: ~/.config/folio/gallery.json)
//! - the gallery bundled into the binary, whose sample media lives in
//!   `assets/` next to the executable or in the source tree

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::GalleryError;
use crate::state::data::{Category, MediaRecord};

/// Gallery shipped with the binary
const BUNDLED_GALLERY: &str = include_str!("../assets/gallery.json");

/// Sample media for the bundled gallery, in the source tree
const SOURCE_ASSETS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");

/// Default card thumbnail width when transforms are enabled
const THUMB_WIDTH: u32 = 800;
/// Default lightbox image width when transforms are enabled
const FULL_WIDTH: u32 = 1800;

/// Where the active gallery came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Bundled,
    Empty,
}

/// Display settings that sit next to the item list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
    /// Downscale images into the thumbnail cache instead of using originals
    pub use_transform: bool,
    pub thumb_width: u32,
    pub full_width: u32,
    /// Mount the lightbox overlay. When off, activations that would open it
    /// are logged and ignored.
    pub lightbox: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            use_transform: false,
            thumb_width: THUMB_WIDTH,
            full_width: FULL_WIDTH,
            lightbox: true,
        }
    }
}

/// The gallery file, as deserialized
#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Directory item paths are relative to. Defaults to the directory the
    /// gallery file lives in.
    #[serde(default)]
    pub assets_root: Option<PathBuf>,
    #[serde(default)]
    pub use_transform: bool,
    #[serde(default = "default_thumb_width")]
    pub thumb_width: u32,
    #[serde(default = "default_full_width")]
    pub full_width: u32,
    #[serde(default = "default_true")]
    pub lightbox: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub items: Vec<MediaRecord>,
}

fn default_title() -> String {
    "Portfolio".to_string()
}

fn default_thumb_width() -> u32 {
    THUMB_WIDTH
}

fn default_full_width() -> u32 {
    FULL_WIDTH
}

fn default_true() -> bool {
    true
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            assets_root: None,
            use_transform: false,
            thumb_width: THUMB_WIDTH,
            full_width: FULL_WIDTH,
            lightbox: true,
            categories: Vec::new(),
            items: Vec::new(),
        }
    }
}

impl GalleryConfig {
    /// Parse a gallery from JSON text
    pub fn from_json(json: &str) -> Result<Self, GalleryError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a gallery file. A missing `assets_root` becomes the file's
    /// directory; a relative one is taken relative to that directory.
    pub fn from_file(path: &Path) -> Result<Self, GalleryError> {
        let json = std::fs::read_to_string(path).map_err(|source| GalleryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json(&json)?;

        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        config.assets_root = Some(match config.assets_root.take() {
            Some(root) if root.is_absolute() => root,
            Some(root) => base.join(root),
            None => base,
        });

        Ok(config)
    }

    /// The gallery bundled into the binary, rooted at its sample media
    pub fn bundled() -> Result<Self, GalleryError> {
        let mut config = Self::from_json(BUNDLED_GALLERY)?;
        config.assets_root = Some(bundled_assets_root());
        Ok(config)
    }

    /// Load the gallery following the lookup order.
    ///
    /// An explicit path that fails is an error; the caller decides whether
    /// to fall back. The user config file is only used when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, ConfigSource), GalleryError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, ConfigSource::File(path.to_path_buf())));
        }

        if let Some(path) = Self::user_config_path().filter(|p| p.exists()) {
            let config = Self::from_file(&path)?;
            return Ok((config, ConfigSource::File(path)));
        }

        Ok((Self::bundled()?, ConfigSource::Bundled))
    }

    /// Load, falling back to the bundled gallery and finally to an empty one
    pub fn load_or_fallback(explicit: Option<&Path>) -> (Self, ConfigSource) {
        match Self::load(explicit) {
            Ok(loaded) => loaded,
            Err(err) => {
                log::error!("{err}; using the bundled gallery");
                match Self::bundled() {
                    Ok(config) => (config, ConfigSource::Bundled),
                    Err(err) => {
                        log::error!("bundled gallery is unusable: {err}");
                        (Self::default(), ConfigSource::Empty)
                    }
                }
            }
        }
    }

    /// Get the path where the user's gallery file is looked up
    pub fn user_config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("folio");
        path.push("gallery.json");
        Some(path)
    }

    pub fn settings(&self) -> DisplaySettings {
        DisplaySettings {
            use_transform: self.use_transform,
            thumb_width: self.thumb_width.max(1),
            full_width: self.full_width.max(1),
            lightbox: self.lightbox,
        }
    }
}

/// `assets/` beside the executable when installed that way, else the
/// source tree's copy
fn bundled_assets_root() -> PathBuf {
    let installed = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("assets")))
        .filter(|dir| dir.join("gallery.json").is_file());

    installed.unwrap_or_else(|| PathBuf::from(SOURCE_ASSETS))
}
