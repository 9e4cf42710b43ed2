//! Structured-data writer.

use super::{DocumentMetadata, DocumentText};
use crate::error::OcrConvertError;
use crate::output::RecognitionResult;
use serde::Serialize;

#[derive(Serialize)]
struct JsonDocument<'a> {
    metadata: &'a DocumentMetadata,
    full_text: &'a str,
    paragraphs: &'a [String],
    sentences: &'a [String],
    pages: Vec<JsonPage<'a>>,
}

#[derive(Serialize)]
struct JsonPage<'a> {
    page: usize,
    text: &'a str,
    confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Pretty-printed JSON, non-ASCII kept as UTF-8.
pub(super) fn write(
    result: &RecognitionResult,
    text: &DocumentText,
    metadata: &DocumentMetadata,
) -> Result<Vec<u8>, OcrConvertError> {
    let doc = JsonDocument {
        metadata,
        full_text: &text.full_text,
        paragraphs: &text.paragraphs,
        sentences: &text.sentences,
        pages: result
            .pages()
            .iter()
            .map(|p| JsonPage {
                page: p.page,
                text: &p.text,
                confidence: p.confidence,
                error: p.error.as_ref().map(ToString::to_string),
            })
            .collect(),
    };
    serde_json::to_vec_pretty(&doc)
        .map_err(|e| OcrConvertError::Internal(format!("JSON serialization failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::super::{render, OutputFormat};
    use crate::error::PageError;
    use crate::output::{PageText, RecognitionResult};
    use crate::pipeline::segment::PunctuationSegmenter;
    use serde_json::Value;

    #[test]
    fn json_layout() {
        let result = RecognitionResult::new(vec![
            PageText::new(1, "Grüße aus Köln.", 80.0),
            PageText::failed(
                2,
                PageError::EngineFailed {
                    page: 2,
                    detail: "exit 1".into(),
                },
            ),
        ]);
        let bytes = render(&result, OutputFormat::Json, &PunctuationSegmenter).unwrap();
        let raw = String::from_utf8(bytes).unwrap();
        assert!(raw.contains("Grüße"), "non-ASCII must not be escaped");

        let v: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(v["metadata"]["page_count"], 2);
        assert_eq!(v["metadata"]["word_count"], 3);
        assert_eq!(v["metadata"]["extraction_method"], "OCR");
        assert_eq!(v["metadata"]["mean_confidence"], 40.0);
        assert_eq!(v["paragraphs"].as_array().unwrap().len(), 1);
        assert_eq!(v["pages"][0]["text"], "Grüße aus Köln.");
        assert!(v["pages"][0].get("error").is_none());
        assert_eq!(v["pages"][1]["text"], "");
        assert!(v["pages"][1]["error"].as_str().unwrap().contains("exit 1"));
        assert_eq!(
            v["full_text"],
            "Grüße aus Köln.\n\n--- Page 2 ---"
        );
    }
}
