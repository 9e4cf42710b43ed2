//! Error types for the ocr-convert library.
//!
//! Two error types reflect two failure scopes:
//!
//! * [`OcrConvertError`]: **Fatal** for the current request: the upload has
//!   the wrong extension, the output format is unknown, nothing could be
//!   extracted, or the disk refused a write. Returned as `Err` from
//!   [`crate::recognize::RecognitionAdapter::process`],
//!   [`crate::serialize::convert`] and the service layer.
//!
//! * [`PageError`]: **Non-fatal**: the OCR engine failed on one page. The page
//!   is kept as an empty entry inside [`crate::output::PageText`] so the page
//!   count stays accurate, and the rest of the document still converts.
//!
//! Every fatal variant maps onto one [`ErrorKind`], the small taxonomy the HTTP
//! layer and the CLI use to pick a status code and a user-facing message.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ocr-convert library.
#[derive(Debug, Error)]
pub enum OcrConvertError {
    // ── Validation ────────────────────────────────────────────────────────
    /// The declared extension is not one of the supported document kinds.
    #[error("File type '.{extension}' is not supported. Allowed types: {allowed}")]
    UnsupportedInputFormat { extension: String, allowed: String },

    /// The requested output format is not json, csv or txt.
    #[error("Output format '{format}' is not supported. Allowed formats: json, csv, txt")]
    UnsupportedOutputFormat { format: String },

    // ── Engine ────────────────────────────────────────────────────────────
    /// The OCR executable could not be started at all.
    #[error("OCR engine '{command}' could not be started: {detail}\nInstall tesseract-ocr or set --tesseract-cmd.")]
    EngineUnavailable { command: String, detail: String },

    /// The OCR engine ran but failed or produced output we could not parse.
    #[error("OCR engine failed on page {page}: {detail}")]
    EngineFailure { page: usize, detail: String },

    /// Uploaded image bytes could not be decoded.
    #[error("Could not decode .{extension} image: {detail}")]
    DecodeFailed { extension: String, detail: String },

    /// pdfium could not open the document or render one of its pages.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set --pdfium-lib to the directory holding libpdfium, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Content ───────────────────────────────────────────────────────────
    /// No page yielded any text.
    #[error("No text could be extracted from the document ({pages} page(s) scanned). Please ensure the document contains readable text.")]
    EmptyDocument { pages: usize },

    // ── I/O ───────────────────────────────────────────────────────────────
    /// Could not read an upload or write an output file.
    #[error("I/O failure on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A requested output file does not exist (or its name is not one we issue).
    #[error("File not found: '{name}'")]
    NotFound { name: String },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (panicked task, serialiser bug).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OcrConvertError {
    /// Wrap an `io::Error` with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedInputFormat { .. } => ErrorKind::UnsupportedInputFormat,
            Self::UnsupportedOutputFormat { .. } => ErrorKind::UnsupportedOutputFormat,
            Self::EngineUnavailable { .. }
            | Self::EngineFailure { .. }
            | Self::DecodeFailed { .. }
            | Self::RasterisationFailed { .. }
            | Self::PdfiumBindingFailed(_) => ErrorKind::EngineFailure,
            Self::EmptyDocument { .. } => ErrorKind::EmptyDocument,
            Self::Io { .. } => ErrorKind::IoFailure,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidConfig(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Coarse error taxonomy shared by the service, the HTTP layer and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    UnsupportedInputFormat,
    UnsupportedOutputFormat,
    EngineFailure,
    EmptyDocument,
    IoFailure,
    NotFound,
    Internal,
}

impl ErrorKind {
    /// Stable machine-readable code, used in JSON error bodies.
    pub fn code(self) -> &'static str {
        match self {
            Self::UnsupportedInputFormat => "UNSUPPORTED_INPUT_FORMAT",
            Self::UnsupportedOutputFormat => "UNSUPPORTED_OUTPUT_FORMAT",
            Self::EngineFailure => "ENGINE_FAILURE",
            Self::EmptyDocument => "EMPTY_DOCUMENT",
            Self::IoFailure => "IO_FAILURE",
            Self::NotFound => "NOT_FOUND",
            Self::Internal => "INTERNAL",
        }
    }

    /// Pure validation rejections need no diagnostic logging.
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::UnsupportedInputFormat | Self::UnsupportedOutputFormat
        )
    }
}

/// A non-fatal error for a single page.
///
/// Stored inside [`crate::output::PageText`] when the engine fails on that
/// page. The document continues unless every page failed.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PageError {
    /// The engine process exited with an error or produced malformed output.
    #[error("Page {page}: OCR engine failed: {detail}")]
    EngineFailed { page: usize, detail: String },
}
