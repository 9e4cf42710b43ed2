//! The Recognition Adapter: document bytes in, ordered per-page text out.
//!
//! [`RecognitionAdapter::process`] is the primary entry point of the library.
//! It classifies the document by extension, turns it into page bitmaps (one
//! decoded image, or every PDF page rasterised), runs the OCR engine on each
//! page and returns a [`RecognitionResult`].
//!
//! ## Failure rules
//!
//! * An unsupported extension fails before any engine work.
//! * A PDF that rasterises to zero pages fails with `EmptyDocument`.
//! * The engine failing on one page records that page as empty (with a
//!   [`PageError`]) and processing continues.
//! * If the engine failed on every page the request fails with `EngineFailure`.
//! * Otherwise, if every page is empty, the request fails with `EmptyDocument`.
//!
//! No retries: one engine invocation per page is final.

use crate::config::RecognitionConfig;
use crate::document::{extension_of, Document, DocumentKind};
use crate::error::{OcrConvertError, PageError};
use crate::output::{PageText, RecognitionResult};
use crate::pipeline::clean::clean_page_text;
use crate::pipeline::decode::decode_image;
use crate::pipeline::engine::{OcrEngine, TesseractEngine};
use crate::pipeline::render::{PdfiumRasterizer, Rasterizer};
use futures::stream::{self, StreamExt};
use image::DynamicImage;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs documents through the rasterizer and OCR engine.
///
/// Cheap to clone: the engine and rasterizer are shared behind `Arc`s.
#[derive(Clone)]
pub struct RecognitionAdapter {
    config: RecognitionConfig,
    engine: Arc<dyn OcrEngine>,
    rasterizer: Arc<dyn Rasterizer>,
}

impl RecognitionAdapter {
    /// An adapter backed by tesseract and pdfium as described by `config`.
    pub fn new(config: RecognitionConfig) -> Self {
        let engine = Arc::new(TesseractEngine::new(&config));
        let rasterizer = Arc::new(PdfiumRasterizer::new(config.pdfium_library_path.clone()));
        Self {
            config,
            engine,
            rasterizer,
        }
    }

    /// Replace the OCR engine.
    pub fn with_engine(mut self, engine: Arc<dyn OcrEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the PDF rasterizer.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn Rasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Whether the OCR engine can be invoked.
    pub async fn is_engine_available(&self) -> bool {
        self.engine.is_available().await
    }

    /// Recognise `bytes`, declared as a file with `extension`.
    pub async fn process(
        &self,
        bytes: &[u8],
        extension: &str,
    ) -> Result<RecognitionResult, OcrConvertError> {
        let document = Document::new(bytes, extension)?;
        self.process_document(&document).await
    }

    /// Read a file from disk and recognise it; the extension comes from the path.
    pub async fn process_file(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<RecognitionResult, OcrConvertError> {
        let path = path.as_ref();
        let extension = extension_of(&path.to_string_lossy());
        // Validate before touching the disk.
        DocumentKind::from_extension(&extension)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| OcrConvertError::io(path, e))?;
        self.process(&bytes, &extension).await
    }

    /// Recognise an already validated document.
    pub async fn process_document(
        &self,
        document: &Document,
    ) -> Result<RecognitionResult, OcrConvertError> {
        let start = Instant::now();
        info!(
            "Recognising {:?} document ({} bytes, .{})",
            document.kind(),
            document.bytes().len(),
            document.extension()
        );

        // ── Step 1: Page bitmaps ─────────────────────────────────────────
        let images = match document.kind() {
            DocumentKind::Image => vec![decode_image(document.bytes(), document.extension())?],
            DocumentKind::Pdf => {
                let pages = self
                    .rasterizer
                    .rasterize(
                        document.bytes(),
                        self.config.dpi,
                        self.config.max_rendered_pixels,
                    )
                    .await?;
                if pages.is_empty() {
                    return Err(OcrConvertError::EmptyDocument { pages: 0 });
                }
                pages
            }
        };
        let total_pages = images.len();
        debug!("{} page(s) to recognise", total_pages);

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_document_start(total_pages);
        }

        // ── Step 2: Per-page recognition ─────────────────────────────────
        let pages = self.recognise_pages(images).await?;
        let result = RecognitionResult::new(pages);

        let pages_with_text = result.pages().iter().filter(|p| !p.is_empty()).count();
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_document_complete(total_pages, pages_with_text);
        }

        // ── Step 3: Whole-document failure rules ─────────────────────────
        let failed = result.failed_pages().count();
        if failed == total_pages {
            let first = result
                .failed_pages()
                .find_map(|p| p.error.clone())
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown engine error".to_string());
            error!("OCR engine failed on all {} page(s): {}", total_pages, first);
            return Err(OcrConvertError::EngineFailure {
                page: 1,
                detail: first,
            });
        }
        if result.is_blank() {
            warn!("No text found on any of {} page(s)", total_pages);
            return Err(OcrConvertError::EmptyDocument { pages: total_pages });
        }

        let stats = result.stats();
        info!(
            "Recognised {}/{} pages: {} words, {:.1}% mean confidence, {}ms",
            pages_with_text,
            total_pages,
            stats.word_count,
            stats.mean_confidence,
            start.elapsed().as_millis()
        );
        Ok(result)
    }

    /// Run the engine over every page, at most `concurrency` at a time.
    ///
    /// Only an engine that cannot be started at all is fatal here; any other
    /// engine error becomes an empty page.
    async fn recognise_pages(
        &self,
        images: Vec<DynamicImage>,
    ) -> Result<Vec<PageText>, OcrConvertError> {
        let total_pages = images.len();
        let results: Vec<Result<PageText, OcrConvertError>> =
            stream::iter(images.into_iter().enumerate().map(|(idx, image)| {
                let engine = Arc::clone(&self.engine);
                let progress = self.config.progress_callback.clone();
                let page = idx + 1;
                async move {
                    if let Some(ref cb) = progress {
                        cb.on_page_start(page, total_pages);
                    }
                    match engine.recognize(page, &image).await {
                        Ok(output) => {
                            let text = clean_page_text(&output.text);
                            debug!("Page {}: {} chars after cleanup", page, text.len());
                            if let Some(ref cb) = progress {
                                cb.on_page_complete(page, total_pages, text.chars().count());
                            }
                            Ok(PageText::new(page, text, output.confidence))
                        }
                        Err(e @ OcrConvertError::EngineUnavailable { .. }) => Err(e),
                        Err(e) => {
                            warn!("Page {}: {} engine error: {}", page, engine.name(), e);
                            if let Some(ref cb) = progress {
                                cb.on_page_error(page, total_pages, &e.to_string());
                            }
                            Ok(PageText::failed(
                                page,
                                PageError::EngineFailed {
                                    page,
                                    detail: engine_detail(e),
                                },
                            ))
                        }
                    }
                }
            }))
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        results.into_iter().collect()
    }
}

fn engine_detail(err: OcrConvertError) -> String {
    match err {
        OcrConvertError::EngineFailure { detail, .. } => detail,
        other => other.to_string(),
    }
}
