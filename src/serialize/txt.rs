//! Plain-text writer: banner, `key: value` metadata, the text, footer.

use super::{DocumentMetadata, DocumentText};

const RULE_WIDTH: usize = 50;

pub(super) fn write(text: &DocumentText, metadata: &DocumentMetadata) -> Vec<u8> {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::with_capacity(text.full_text.len() + 512);

    out.push_str(&rule);
    out.push_str("\nEXTRACTED DOCUMENT TEXT\n");
    out.push_str(&rule);
    out.push_str("\n\n");

    for (key, value) in metadata.fields() {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(&value);
        out.push('\n');
    }
    out.push('\n');

    out.push_str(&text.full_text);

    out.push_str("\n\n");
    out.push_str(&rule);
    out.push_str("\nEnd of Document\n");
    out.push_str(&rule);
    out.push('\n');

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::super::{render, OutputFormat};
    use crate::output::{PageText, RecognitionResult};
    use crate::pipeline::segment::PunctuationSegmenter;

    #[test]
    fn plain_text_layout() {
        let result = RecognitionResult::new(vec![
            PageText::new(1, "Hello world.", 90.0),
            PageText::new(2, "Goodbye.", 80.0),
        ]);
        let bytes = render(&result, OutputFormat::Txt, &PunctuationSegmenter).unwrap();
        let txt = String::from_utf8(bytes).unwrap();
        let rule = "=".repeat(50);

        assert!(txt.starts_with(&format!("{rule}\nEXTRACTED DOCUMENT TEXT\n{rule}\n\n")));
        assert!(txt.contains("page_count: 2\n"));
        assert!(txt.contains("word_count: 3\n"));
        assert!(txt.contains("mean_confidence: 85.00\n"));
        assert!(txt.contains(
            "extraction_method: OCR\n\nHello world.\n\n--- Page 2 ---\n\nGoodbye.\n\n"
        ));
        assert!(txt.ends_with(&format!("{rule}\nEnd of Document\n{rule}\n")));
    }
}
