//! Recognition output: per-page text and document aggregates.
//!
//! [`RecognitionResult`] owns its pages and computes [`RecognitionStats`] once
//! at construction. The fields are private, so the aggregates can never drift
//! from the page list they were derived from.

use crate::error::PageError;
use serde::Serialize;

/// Recognised text for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageText {
    /// 1-indexed page number, matching the source order.
    pub page: usize,
    /// Cleaned text; empty when the engine found nothing (or failed).
    pub text: String,
    /// Engine-reported confidence, 0–100. Always 0 for empty pages.
    pub confidence: f64,
    /// Set when the engine failed on this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<PageError>,
}

impl PageText {
    /// A successfully recognised page. Confidence is clamped to 0–100 and
    /// forced to 0 when `text` is empty.
    pub fn new(page: usize, text: impl Into<String>, confidence: f64) -> Self {
        let text = text.into();
        let confidence = if text.is_empty() || !confidence.is_finite() {
            0.0
        } else {
            confidence.clamp(0.0, 100.0)
        };
        Self {
            page,
            text,
            confidence,
            error: None,
        }
    }

    /// A page the engine failed on, kept as an empty entry.
    pub fn failed(page: usize, error: PageError) -> Self {
        Self {
            page,
            text: String::new(),
            confidence: 0.0,
            error: Some(error),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Unicode scalar values, not bytes.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Aggregates over every page of a document.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RecognitionStats {
    pub page_count: usize,
    pub word_count: usize,
    pub character_count: usize,
    /// Arithmetic mean of per-page confidences; empty pages count as 0.
    pub mean_confidence: f64,
}

impl RecognitionStats {
    /// Derive the aggregates from a page list.
    pub fn from_pages(pages: &[PageText]) -> Self {
        let page_count = pages.len();
        let word_count = pages.iter().map(PageText::word_count).sum();
        let character_count = pages.iter().map(PageText::char_count).sum();
        let mean_confidence = if page_count == 0 {
            0.0
        } else {
            pages.iter().map(|p| p.confidence).sum::<f64>() / page_count as f64
        };
        Self {
            page_count,
            word_count,
            character_count,
            mean_confidence,
        }
    }
}

/// Ordered per-page text plus aggregates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionResult {
    pages: Vec<PageText>,
    stats: RecognitionStats,
}

impl RecognitionResult {
    /// Build a result; pages are sorted by page number.
    pub fn new(mut pages: Vec<PageText>) -> Self {
        pages.sort_by_key(|p| p.page);
        let stats = RecognitionStats::from_pages(&pages);
        Self { pages, stats }
    }

    pub fn pages(&self) -> &[PageText] {
        &self.pages
    }

    pub fn stats(&self) -> &RecognitionStats {
        &self.stats
    }

    /// Pages the engine failed on.
    pub fn failed_pages(&self) -> impl Iterator<Item = &PageText> {
        self.pages.iter().filter(|p| p.error.is_some())
    }

    /// True when no page has any text.
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(PageText::is_empty)
    }

    pub fn into_pages(self) -> Vec<PageText> {
        self.pages
    }
}
