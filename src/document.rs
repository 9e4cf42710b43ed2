//! Uploaded documents and the extensions we accept.

use crate::error::OcrConvertError;
use serde::Serialize;

/// Extensions accepted for recognition, without the leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "jpeg", "tiff", "bmp"];

/// What kind of input a document is, derived from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// A single raster image: one page.
    Image,
    /// A PDF: rasterised page by page.
    Pdf,
}

impl DocumentKind {
    /// Classify a declared extension (case-insensitive, leading dot optional).
    pub fn from_extension(extension: &str) -> Result<Self, OcrConvertError> {
        let ext = normalise_extension(extension);
        match ext.as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" | "jpg" | "jpeg" | "tiff" | "bmp" => Ok(Self::Image),
            _ => Err(OcrConvertError::UnsupportedInputFormat {
                extension: ext,
                allowed: allowed_list(),
            }),
        }
    }
}

/// Raw upload bytes plus their declared extension.
///
/// Lives for the duration of one request only.
#[derive(Debug, Clone)]
pub struct Document {
    bytes: Vec<u8>,
    extension: String,
    kind: DocumentKind,
}

impl Document {
    /// Validate the extension and wrap the bytes.
    ///
    /// Fails with [`OcrConvertError::UnsupportedInputFormat`] before any
    /// engine work happens.
    pub fn new(bytes: impl Into<Vec<u8>>, extension: &str) -> Result<Self, OcrConvertError> {
        let kind = DocumentKind::from_extension(extension)?;
        Ok(Self {
            bytes: bytes.into(),
            extension: normalise_extension(extension),
            kind,
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lower-case extension without the leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }
}

/// Lower-case an extension and strip a leading dot.
pub fn normalise_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

/// Extract the extension from an uploaded file name (`scan.PDF` → `pdf`).
pub fn extension_of(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(normalise_extension)
        .unwrap_or_default()
}

fn allowed_list() -> String {
    SUPPORTED_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}
