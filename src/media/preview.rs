//! Card previews rendered off the UI thread
//!
//! Three kinds of preview travel through the same request pipeline:
//! first pages of documents without a thumbnail, poster frames of videos,
//! and the frames of animated GIFs.

use image::imageops::FilterType;
use image::ImageFormat;
use pdfium_render::prelude::{PdfRenderConfig, Pdfium};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use super::{animation, video};
use crate::error::PreviewError;
use crate::state::data::{AnimationFrame, PreviewImage};

/// Height of rendered document previews, in pixels
pub const PREVIEW_HEIGHT: u32 = 200;

/// pdfium is not reentrant; one binding is live at a time process-wide
static PDFIUM: Mutex<()> = Mutex::new(());

/// Renders the first page of a document into a raster.
///
/// Implementations run on a blocking worker thread.
pub trait PreviewRenderer: Send + Sync {
    fn render_first_page(&self, source: &Path) -> Result<PreviewImage, PreviewError>;
}

/// Renderer for documents that are themselves raster images.
/// Everything else (PDF included) reports `Unsupported`.
#[derive(Debug, Clone, Copy)]
pub struct RasterPreview {
    pub height: u32,
}

impl Default for RasterPreview {
    fn default() -> Self {
        Self {
            height: PREVIEW_HEIGHT,
        }
    }
}

impl PreviewRenderer for RasterPreview {
    fn render_first_page(&self, source: &Path) -> Result<PreviewImage, PreviewError> {
        if ImageFormat::from_path(source).is_err() {
            return Err(PreviewError::Unsupported(source.display().to_string()));
        }

        let img = image::open(source).map_err(|e| PreviewError::Decode {
            path: source.display().to_string(),
            reason: e.to_string(),
        })?;

        // Scale to a fixed height, keeping the aspect ratio
        let scale = self.height as f32 / img.height().max(1) as f32;
        let width = ((img.width() as f32 * scale).round() as u32).max(1);
        let rgba = img.resize_exact(width, self.height, FilterType::Lanczos3).to_rgba8();

        Ok(PreviewImage {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        })
    }
}

/// PDF renderer backed by the system pdfium library.
///
/// pdfium is bound per call, so a missing library only fails the previews
/// that need it (as `Unsupported`).
#[derive(Debug, Clone, Copy)]
pub struct PdfPreview {
    pub height: u32,
}

impl Default for PdfPreview {
    fn default() -> Self {
        Self {
            height: PREVIEW_HEIGHT,
        }
    }
}

impl PdfPreview {
    /// Whether a pdfium library can be found on this system
    pub fn available() -> bool {
        let _guard = PDFIUM.lock().unwrap_or_else(PoisonError::into_inner);
        Pdfium::bind_to_system_library().is_ok()
    }
}

impl PreviewRenderer for PdfPreview {
    fn render_first_page(&self, source: &Path) -> Result<PreviewImage, PreviewError> {
        if !is_pdf(source) {
            return Err(PreviewError::Unsupported(source.display().to_string()));
        }
        let decode_error = |reason: String| PreviewError::Decode {
            path: source.display().to_string(),
            reason,
        };

        let _guard = PDFIUM.lock().unwrap_or_else(PoisonError::into_inner);
        let bindings = Pdfium::bind_to_system_library().map_err(|e| {
            PreviewError::Unsupported(format!("{} (pdfium unavailable: {e})", source.display()))
        })?;
        let pdfium = Pdfium::new(bindings);

        let document = pdfium
            .load_pdf_from_file(source, None)
            .map_err(|e| decode_error(e.to_string()))?;
        let page = document.pages().first().map_err(|e| decode_error(e.to_string()))?;
        let config = PdfRenderConfig::new().set_target_height(self.height as i32);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| decode_error(e.to_string()))?;

        Ok(PreviewImage {
            width: bitmap.width().max(0) as u32,
            height: bitmap.height().max(0) as u32,
            rgba: bitmap.as_rgba_bytes(),
        })
    }
}

fn is_pdf(source: &Path) -> bool {
    source
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// The document renderer the app uses: PDFs go to pdfium, everything
/// else is tried as a raster image.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentPreviews {
    pdf: PdfPreview,
    raster: RasterPreview,
}

impl PreviewRenderer for DocumentPreviews {
    fn render_first_page(&self, source: &Path) -> Result<PreviewImage, PreviewError> {
        if is_pdf(source) {
            self.pdf.render_first_page(source)
        } else {
            self.raster.render_first_page(source)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// First page of a document without a thumbnail
    Document,
    /// First frame of a video
    Poster,
    /// Every frame of an animated picture
    Animation,
}

/// A preview the gallery asked for
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewRequest {
    /// Index of the item in the full gallery list
    pub index: usize,
    pub source: PathBuf,
    pub kind: PreviewKind,
    /// Render generation the request was issued under
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum Rendered {
    Still(PreviewImage),
    Frames(Vec<AnimationFrame>),
}

/// Outcome of a preview request, routed back to the gallery
#[derive(Debug, Clone)]
pub struct PreviewResult {
    pub index: usize,
    pub generation: u64,
    pub outcome: Result<Rendered, PreviewError>,
}

/// Render a preview on a blocking worker.
///
/// Never fails: errors travel inside the result.
pub async fn render(renderer: Arc<dyn PreviewRenderer>, request: PreviewRequest) -> PreviewResult {
    let PreviewRequest {
        index,
        source,
        kind,
        generation,
    } = request;

    let outcome = tokio::task::spawn_blocking(move || match kind {
        PreviewKind::Document => renderer.render_first_page(&source).map(Rendered::Still),
        PreviewKind::Poster => video::extract_poster(&source)
            .map(|frame| Rendered::Still(frame.image))
            .map_err(|e| PreviewError::Decode {
                path: source.display().to_string(),
                reason: e.to_string(),
            }),
        PreviewKind::Animation => animation::decode_frames(&source).map(Rendered::Frames),
    })
    .await
    .unwrap_or_else(|e| Err(PreviewError::Join(e.to_string())));

    PreviewResult {
        index,
        generation,
        outcome,
    }
}
