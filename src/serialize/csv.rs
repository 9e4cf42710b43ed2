//! Tabular writer.
//!
//! Spreadsheet-friendly: UTF-8 BOM, CRLF rows, every field quoted with inner
//! quotes doubled. Two columns throughout; sections are separated by an
//! empty row.

use super::{DocumentMetadata, DocumentText};
use crate::error::OcrConvertError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub(super) fn write(
    text: &DocumentText,
    metadata: &DocumentMetadata,
) -> Result<Vec<u8>, OcrConvertError> {
    let mut writer = ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Always)
        .terminator(::csv::Terminator::CRLF)
        .from_writer(UTF8_BOM.to_vec());

    let mut rows: Vec<[String; 2]> = Vec::new();

    rows.push(section("Document Summary"));
    for (key, value) in metadata.fields() {
        rows.push([key.to_string(), value]);
    }
    rows.push(blank());

    rows.push(section("Paragraphs"));
    for (i, paragraph) in text.paragraphs.iter().enumerate() {
        rows.push([format!("Paragraph {}", i + 1), paragraph.clone()]);
    }
    rows.push(blank());

    rows.push(section("Sentences"));
    for (i, sentence) in text.sentences.iter().enumerate() {
        rows.push([format!("Sentence {}", i + 1), sentence.clone()]);
    }
    rows.push(blank());

    rows.push(section("Full Text"));
    rows.push(["Content".to_string(), text.full_text.clone()]);

    for row in &rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    writer
        .into_inner()
        .map_err(|e| OcrConvertError::Internal(format!("CSV flush failed: {}", e.error())))
}

fn section(title: &str) -> [String; 2] {
    [title.to_string(), String::new()]
}

fn blank() -> [String; 2] {
    [String::new(), String::new()]
}

fn csv_error(e: ::csv::Error) -> OcrConvertError {
    OcrConvertError::Internal(format!("CSV serialization failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::super::{render, OutputFormat};
    use super::UTF8_BOM;
    use crate::output::{PageText, RecognitionResult};
    use crate::pipeline::segment::PunctuationSegmenter;

    fn csv_for(pages: Vec<PageText>) -> Vec<u8> {
        render(
            &RecognitionResult::new(pages),
            OutputFormat::Csv,
            &PunctuationSegmenter,
        )
        .unwrap()
    }

    #[test]
    fn bom_crlf_and_quoted_fields() {
        let bytes = csv_for(vec![PageText::new(1, "One.", 50.0)]);
        assert!(bytes.starts_with(UTF8_BOM));
        let body = std::str::from_utf8(&bytes[UTF8_BOM.len()..]).unwrap();
        let mut lines = body.split("\r\n");
        assert_eq!(lines.next(), Some(r#""Document Summary","""#));
        assert_eq!(lines.next(), Some(r#""page_count","1""#));
        assert!(body.contains("\"Paragraph 1\",\"One.\"\r\n"));
        assert!(body.contains("\"Sentence 1\",\"One.\"\r\n"));
        assert!(body.ends_with("\"Content\",\"One.\"\r\n"));
    }

    #[test]
    fn quotes_and_delimiters_stay_in_one_cell() {
        let paragraph = r#"He said, "ok, fine""#;
        let bytes = csv_for(vec![PageText::new(1, paragraph, 70.0)]);

        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(&bytes[UTF8_BOM.len()..]);
        let rows: Vec<::csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        let para = rows
            .iter()
            .find(|r| &r[0] == "Paragraph 1")
            .expect("paragraph row");
        assert_eq!(para.len(), 2);
        assert_eq!(&para[1], paragraph);
        assert!(std::str::from_utf8(&bytes)
            .unwrap()
            .contains(r#""He said, ""ok, fine""""#));
    }

    #[test]
    fn multi_line_full_text_is_one_record() {
        let bytes = csv_for(vec![
            PageText::new(1, "A.\n\nB.", 50.0),
            PageText::new(2, "C.", 50.0),
        ]);
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(&bytes[UTF8_BOM.len()..]);
        let last = reader.records().map(Result::unwrap).last().unwrap();
        assert_eq!(&last[0], "Content");
        assert_eq!(&last[1], "A.\n\nB.\n\n--- Page 2 ---\n\nC.");
    }
}
