//! # ocr-convert
//!
//! Upload a scanned PDF or an image, read it with an OCR engine, and get the
//! text back as JSON, CSV or plain text.
//!
//! The crate is orchestration glue around two external collaborators: pdfium
//! rasterises PDF pages, tesseract recognises text. What it owns is the shape
//! of the data in between: ordered per-page text, aggregate statistics, and
//! three serializations of the same document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (bytes + extension)
//!  │
//!  ├─ 1. Validate  extension ∈ {pdf, png, jpg, jpeg, tiff, bmp}, format ∈ {json, csv, txt}
//!  ├─ 2. Pages     decode the image, or rasterise every PDF page at 300 DPI (spawn_blocking)
//!  ├─ 3. OCR       tesseract per page (--psm 6, --oem 3), concurrent, TSV → text + confidence
//!  ├─ 4. Clean     whitespace normalisation per page
//!  ├─ 5. Serialize full text with page markers, paragraphs, sentences → json / csv / txt
//!  └─ 6. Store     `<uuid>.<ext>` in the output directory, served by /download
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocr_convert::{convert, OutputFormat, RecognitionAdapter, RecognitionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = RecognitionAdapter::new(RecognitionConfig::default());
//!     let bytes = std::fs::read("scan.pdf")?;
//!     let result = adapter.process(&bytes, "pdf").await?;
//!     let output = convert(&result, OutputFormat::Json)?;
//!     std::fs::write(output.file_name(), output.bytes())?;
//!     eprintln!("{} pages, {} words", result.stats().page_count, result.stats().word_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr-convert` binary (clap + anyhow + dotenvy + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ocr-convert = { version = "0.3", default-features = false }
//! ```
//!
//! ## Runtime Requirements
//!
//! - `tesseract` on `PATH` (or pass its location via
//!   [`RecognitionConfigBuilder::tesseract_cmd`]) with the language data you need.
//! - The pdfium shared library, either installed system-wide or in the directory
//!   given by [`RecognitionConfigBuilder::pdfium_library_path`]. Only needed for PDFs.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod document;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod recognize;
pub mod serialize;
pub mod server;
pub mod service;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{RecognitionConfig, RecognitionConfigBuilder, ServerConfig};
pub use document::{Document, DocumentKind, SUPPORTED_EXTENSIONS};
pub use error::{ErrorKind, OcrConvertError, PageError};
pub use output::{PageText, RecognitionResult, RecognitionStats};
pub use pipeline::engine::{EngineOutput, OcrEngine, TesseractEngine};
pub use pipeline::render::{PdfiumRasterizer, Rasterizer};
pub use pipeline::segment::{PunctuationSegmenter, Segmenter};
pub use progress::{NoopProgress, ProgressCallback, RecognitionProgress};
pub use recognize::RecognitionAdapter;
pub use serialize::{convert, convert_named, ConversionOutput, DocumentText, OutputFormat};
pub use service::{ConversionReceipt, ConversionService};
pub use store::FileStore;
