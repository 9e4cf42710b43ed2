//! PDF rasterisation: render every page of a PDF to a `DynamicImage` via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and does CPU-heavy work. `tokio::task::spawn_blocking` moves rendering
//! onto the blocking pool so Tokio worker threads keep serving other requests.
//!
//! ## DPI and the pixel cap
//!
//! Pages are rendered at `dpi / 72` times their point size (300 DPI by
//! default, what tesseract is tuned for). `max_rendered_pixels` then caps the
//! longest edge, so an A0 poster cannot allocate a 10,000 px bitmap.

use crate::error::OcrConvertError;
use async_trait::async_trait;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// PDF points per inch.
const POINTS_PER_INCH: f32 = 72.0;

/// Turns PDF bytes into one bitmap per page, in page order.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    async fn rasterize(
        &self,
        pdf: &[u8],
        dpi: u32,
        max_pixels: u32,
    ) -> Result<Vec<DynamicImage>, OcrConvertError>;
}

/// The pdfium-backed rasterizer.
#[derive(Debug, Clone, Default)]
pub struct PdfiumRasterizer {
    library_dir: Option<PathBuf>,
}

impl PdfiumRasterizer {
    /// `library_dir` is the directory holding the pdfium shared library;
    /// `None` binds the system library.
    pub fn new(library_dir: Option<PathBuf>) -> Self {
        Self { library_dir }
    }
}

#[async_trait]
impl Rasterizer for PdfiumRasterizer {
    async fn rasterize(
        &self,
        pdf: &[u8],
        dpi: u32,
        max_pixels: u32,
    ) -> Result<Vec<DynamicImage>, OcrConvertError> {
        let bytes = pdf.to_vec();
        let library_dir = self.library_dir.clone();

        tokio::task::spawn_blocking(move || {
            render_pages_blocking(&bytes, library_dir.as_deref(), dpi, max_pixels)
        })
        .await
        .map_err(|e| OcrConvertError::Internal(format!("Render task panicked: {}", e)))?
    }
}

/// Bind to pdfium: the configured directory first, otherwise the system library.
fn bind_pdfium(library_dir: Option<&Path>) -> Result<Pdfium, OcrConvertError> {
    let bindings = match library_dir {
        Some(dir) => {
            let dir = dir.to_string_lossy().into_owned();
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        }
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| OcrConvertError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of page rendering.
fn render_pages_blocking(
    pdf: &[u8],
    library_dir: Option<&Path>,
    dpi: u32,
    max_pixels: u32,
) -> Result<Vec<DynamicImage>, OcrConvertError> {
    let pdfium = bind_pdfium(library_dir)?;

    let document = pdfium
        .load_pdf_from_byte_slice(pdf, None)
        .map_err(|e| OcrConvertError::RasterisationFailed {
            page: 0,
            detail: format!("could not open PDF: {:?}", e),
        })?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(dpi as f32 / POINTS_PER_INCH)
        .set_maximum_width(max_pixels as i32)
        .set_maximum_height(max_pixels as i32);

    let mut images = Vec::with_capacity(total_pages);
    for (idx, page) in pages.iter().enumerate() {
        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            OcrConvertError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{:?}", e),
            }
        })?;

        let image = bitmap.as_image();
        debug!(
            "Rendered page {} → {}x{} px",
            idx + 1,
            image.width(),
            image.height()
        );
        images.push(image);
    }

    Ok(images)
}
