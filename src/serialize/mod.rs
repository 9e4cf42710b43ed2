//! The Format Serializer: a [`RecognitionResult`] in, a file payload out.
//!
//! All three writers share one preprocessing step, [`DocumentText`]: the
//! per-page text joined with page markers into `full_text`, plus the paragraph
//! and sentence lists. Paragraphs are split page by page, so a page marker
//! never shows up as a paragraph and a paragraph never spans two pages.
//!
//! Payloads are a pure function of the result and the format. The only
//! per-request value, the generated file name, lives outside the payload.

mod csv;
mod json;
mod txt;

use crate::error::OcrConvertError;
use crate::output::RecognitionResult;
use crate::pipeline::segment::{PunctuationSegmenter, Segmenter};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use uuid::Uuid;

/// Value of the `extraction_method` metadata field.
pub const EXTRACTION_METHOD: &str = "OCR";

/// The output formats. Closed: adding one means adding a writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Structured data.
    Json,
    /// Tabular.
    Csv,
    /// Plain text.
    Txt,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [Self::Json, Self::Csv, Self::Txt];

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Txt => "text/plain; charset=utf-8",
        }
    }

    /// The format a generated file name belongs to, by extension.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl FromStr for OutputFormat {
    type Err = OcrConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "txt" => Ok(Self::Txt),
            _ => Err(OcrConvertError::UnsupportedOutputFormat {
                format: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A serialized document ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOutput {
    format: OutputFormat,
    file_name: String,
    bytes: Vec<u8>,
}

impl ConversionOutput {
    /// `stem` gets the format's extension appended, so the two cannot disagree.
    fn new(format: OutputFormat, stem: &str, bytes: Vec<u8>) -> Self {
        Self {
            format,
            file_name: format!("{}.{}", stem, format.extension()),
            bytes,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Text views shared by every writer.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentText {
    /// Page texts joined with [`page_marker`] lines.
    pub full_text: String,
    pub paragraphs: Vec<String>,
    pub sentences: Vec<String>,
}

impl DocumentText {
    pub fn from_result(result: &RecognitionResult, segmenter: &dyn Segmenter) -> Self {
        let mut blocks: Vec<String> = Vec::new();
        let mut paragraphs = Vec::new();

        for (i, page) in result.pages().iter().enumerate() {
            if i > 0 {
                blocks.push(page_marker(page.page));
            }
            if !page.text.is_empty() {
                blocks.push(page.text.clone());
            }
            paragraphs.extend(segmenter.paragraphs(&page.text));
        }

        let sentences = paragraphs
            .iter()
            .flat_map(|p| segmenter.sentences(p))
            .collect();

        Self {
            full_text: blocks.join("\n\n"),
            paragraphs,
            sentences,
        }
    }
}

/// Metadata block common to every format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentMetadata {
    pub page_count: usize,
    pub word_count: usize,
    pub character_count: usize,
    pub paragraph_count: usize,
    pub sentence_count: usize,
    /// Rounded to two decimals.
    pub mean_confidence: f64,
    pub extraction_method: &'static str,
}

impl DocumentMetadata {
    fn new(result: &RecognitionResult, text: &DocumentText) -> Self {
        let stats = result.stats();
        Self {
            page_count: stats.page_count,
            word_count: stats.word_count,
            character_count: stats.character_count,
            paragraph_count: text.paragraphs.len(),
            sentence_count: text.sentences.len(),
            mean_confidence: (stats.mean_confidence * 100.0).round() / 100.0,
            extraction_method: EXTRACTION_METHOD,
        }
    }

    /// `(key, value)` pairs in display order, for the tabular and text writers.
    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page_count", self.page_count.to_string()),
            ("word_count", self.word_count.to_string()),
            ("character_count", self.character_count.to_string()),
            ("paragraph_count", self.paragraph_count.to_string()),
            ("sentence_count", self.sentence_count.to_string()),
            ("mean_confidence", format!("{:.2}", self.mean_confidence)),
            ("extraction_method", self.extraction_method.to_string()),
        ]
    }
}

/// The separator line placed before every page after the first.
pub fn page_marker(page: usize) -> String {
    format!("--- Page {} ---", page)
}

/// Serialize `result` under a fresh `<uuid>.<ext>` file name.
pub fn convert(
    result: &RecognitionResult,
    format: OutputFormat,
) -> Result<ConversionOutput, OcrConvertError> {
    convert_named(result, format, &Uuid::new_v4().to_string())
}

/// Serialize `result` under `<stem>.<ext>`.
pub fn convert_named(
    result: &RecognitionResult,
    format: OutputFormat,
    stem: &str,
) -> Result<ConversionOutput, OcrConvertError> {
    let bytes = render(result, format, &PunctuationSegmenter)?;
    debug!("Serialized {} → {} bytes", format, bytes.len());
    Ok(ConversionOutput::new(format, stem, bytes))
}

/// Produce the payload for `format` with a caller-chosen segmenter.
pub fn render(
    result: &RecognitionResult,
    format: OutputFormat,
    segmenter: &dyn Segmenter,
) -> Result<Vec<u8>, OcrConvertError> {
    let text = DocumentText::from_result(result, segmenter);
    let metadata = DocumentMetadata::new(result, &text);
    match format {
        OutputFormat::Json => json::write(result, &text, &metadata),
        OutputFormat::Csv => csv::write(&text, &metadata),
        OutputFormat::Txt => Ok(txt::write(&text, &metadata)),
    }
}
