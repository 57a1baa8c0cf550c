//! Hand-off to the system browser and file handlers

use std::ffi::OsStr;

use crate::error::GalleryError;

/// Open `target` (a URL or a file path) with the system handler, in its
/// own window. Returns once the handler has been spawned.
pub fn open_external(target: impl AsRef<OsStr>) -> Result<(), GalleryError> {
    let target = target.as_ref();
    open::that_detached(target).map_err(|source| GalleryError::Launch {
        target: target.to_string_lossy().into_owned(),
        source,
    })?;
    log::info!("🔗 Opened {}", target.to_string_lossy());
    Ok(())
}
