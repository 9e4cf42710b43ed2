//! Recognition → serialization → storage, with fake engine and rasterizer.

mod common;

use common::{adapter, file_count, png_bytes, service, FakeEngine, Script};
use ocr_convert::{
    convert, convert_named, DocumentText, ErrorKind, OcrConvertError, OutputFormat,
    PunctuationSegmenter, RecognitionResult,
};
use serde_json::Value;

// ── Recognition scenarios ────────────────────────────────────────────────────

#[tokio::test]
async fn blank_image_fails_without_writing_output() {
    let engine = FakeEngine::new(vec![Script::Text("   \n", 0.0)]);
    let (svc, _tmp) = service(engine.clone(), 0).await;

    let err = svc
        .handle_upload("blank.png", &png_bytes(), "json")
        .await
        .unwrap_err();

    assert!(matches!(err, OcrConvertError::EmptyDocument { pages: 1 }));
    assert_eq!(engine.calls(), 1);
    assert_eq!(file_count(svc.store().output_dir()), 0);
    assert_eq!(file_count(svc.store().upload_dir()), 0, "upload must be removed");
}

#[tokio::test]
async fn pdf_with_one_blank_page_succeeds() {
    let engine = FakeEngine::new(vec![Script::Text("Hello world.", 92.0), Script::Text("", 0.0)]);
    let result = adapter(engine, 2).process(b"%PDF-1.7", "pdf").await.unwrap();

    let stats = result.stats();
    assert_eq!(stats.page_count, 2);
    assert_eq!(stats.word_count, 2);
    assert_eq!(result.pages()[1].page, 2);
    assert_eq!(result.pages()[1].text, "");
    assert!((stats.mean_confidence - 46.0).abs() < 1e-9);
}

#[tokio::test]
async fn xml_format_is_rejected_before_any_engine_call() {
    let engine = FakeEngine::new(vec![Script::Text("Hello", 90.0)]);
    let (svc, _tmp) = service(engine.clone(), 1).await;

    let err = svc
        .handle_upload("scan.pdf", b"%PDF-1.7", "xml")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedOutputFormat);
    assert_eq!(engine.calls(), 0);
    assert_eq!(file_count(svc.store().upload_dir()), 0, "nothing parked");
}

#[tokio::test]
async fn unsupported_input_is_rejected_before_any_engine_call() {
    let engine = FakeEngine::new(vec![Script::Text("Hello", 90.0)]);
    let (svc, _tmp) = service(engine.clone(), 1).await;

    let err = svc
        .handle_upload("notes.docx", b"PK", "txt")
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::UnsupportedInputFormat);
    assert!(err.to_string().contains(".pdf, .png, .jpg, .jpeg, .tiff, .bmp"));
    assert_eq!(engine.calls(), 0);
}

#[tokio::test]
async fn page_count_matches_rasterized_pages() {
    for pages in 1..=4 {
        let script = (0..pages).map(|_| Script::Text("word", 50.0)).collect();
        let result = adapter(FakeEngine::new(script), pages)
            .process(b"%PDF", "pdf")
            .await
            .unwrap();
        assert_eq!(result.stats().page_count, pages);
        assert_eq!(result.pages().len(), pages);
    }
}

#[tokio::test]
async fn aggregates_are_sums_over_pages() {
    let engine = FakeEngine::new(vec![
        Script::Text("One two three.", 90.0),
        Script::Text("", 0.0),
        Script::Text("Vier  fünf\n\nsechs", 60.0),
    ]);
    let result = adapter(engine, 3).process(b"%PDF", "pdf").await.unwrap();

    let words: usize = result.pages().iter().map(|p| p.word_count()).sum();
    let chars: usize = result.pages().iter().map(|p| p.char_count()).sum();
    assert_eq!(result.stats().word_count, words);
    assert_eq!(result.stats().character_count, chars);
    assert_eq!(words, 6);
    assert_eq!(result.pages()[2].text, "Vier fünf\n\nsechs");
}

#[tokio::test]
async fn engine_failure_on_every_page_is_fatal() {
    let engine = FakeEngine::new(vec![Script::Fail("exit status 1")]);
    let (svc, _tmp) = service(engine, 0).await;

    let err = svc
        .handle_upload("photo.jpg", &jpeg_bytes(), "txt")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EngineFailure);
    assert_eq!(file_count(svc.store().output_dir()), 0);
}

fn jpeg_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::new_rgb8(16, 16)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

// ── Serialization properties ─────────────────────────────────────────────────

async fn sample_result() -> RecognitionResult {
    let engine = FakeEngine::new(vec![
        Script::Text("Invoice 42.\nDue today!\n\nThanks, team.", 88.0),
        Script::Text("", 0.0),
        Script::Text("Terms: net 30. Late fees apply?", 71.5),
    ]);
    adapter(engine, 3).process(b"%PDF", "pdf").await.unwrap()
}

#[tokio::test]
async fn serialization_is_deterministic() {
    let result = sample_result().await;
    for format in OutputFormat::ALL {
        let a = convert_named(&result, format, "fixed").unwrap();
        let b = convert_named(&result, format, "fixed").unwrap();
        assert_eq!(a, b, "{format}");
        assert_eq!(a.file_name(), format!("fixed.{}", format.extension()));
    }
}

#[tokio::test]
async fn json_paragraphs_rebuild_full_text_without_markers() {
    let result = sample_result().await;
    let output = convert(&result, OutputFormat::Json).unwrap();
    let v: Value = serde_json::from_slice(output.bytes()).unwrap();

    let full_text = v["full_text"].as_str().unwrap();
    let paragraphs: Vec<&str> = v["paragraphs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();

    let without_markers: Vec<&str> = full_text
        .split("\n\n")
        .filter(|block| !(block.starts_with("--- Page ") && block.ends_with(" ---")))
        .collect();
    assert_eq!(without_markers.join("\n\n"), paragraphs.join("\n\n"));
    assert_eq!(v["metadata"]["paragraph_count"], paragraphs.len());
    assert_eq!(v["pages"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn shared_text_view_matches_every_format() {
    let result = sample_result().await;
    let text = DocumentText::from_result(&result, &PunctuationSegmenter);
    assert_eq!(
        text.sentences,
        vec![
            "Invoice 42.",
            "Due today!",
            "Thanks, team.",
            "Terms: net 30.",
            "Late fees apply?"
        ]
    );

    let txt = String::from_utf8(convert(&result, OutputFormat::Txt).unwrap().into_bytes()).unwrap();
    assert!(txt.contains(&text.full_text));
    assert!(txt.contains("\n--- Page 2 ---\n\n--- Page 3 ---\n"));
}

#[tokio::test]
async fn csv_keeps_delimiters_and_quotes_in_one_cell() {
    let engine = FakeEngine::new(vec![Script::Text(r#"He said, "ok, fine""#, 80.0)]);
    let result = adapter(engine, 0).process(&png_bytes(), "png").await.unwrap();
    let output = convert(&result, OutputFormat::Csv).unwrap();

    let body = output.bytes().strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap();
    let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(body);
    let paragraph_rows: Vec<csv::StringRecord> = reader
        .records()
        .map(Result::unwrap)
        .filter(|r| r[0].starts_with("Paragraph "))
        .collect();

    assert_eq!(paragraph_rows.len(), 1);
    assert_eq!(paragraph_rows[0].len(), 2);
    assert_eq!(&paragraph_rows[0][1], r#"He said, "ok, fine""#);
}

// ── Service round trip ───────────────────────────────────────────────────────

#[tokio::test]
async fn upload_produces_downloadable_file() {
    let engine = FakeEngine::new(vec![Script::Text("Hello world.", 92.0), Script::Text("", 0.0)]);
    let (svc, _tmp) = service(engine, 2).await;

    let receipt = svc
        .handle_upload("Scan.PDF", b"%PDF-1.7", "CSV")
        .await
        .unwrap();

    assert_eq!(receipt.output_format, OutputFormat::Csv);
    assert_eq!(receipt.file_name, format!("{}.csv", receipt.file_id));
    assert_eq!(receipt.download_url, format!("/download/{}", receipt.file_name));
    assert_eq!(receipt.stats.page_count, 2);
    assert_eq!(file_count(svc.store().upload_dir()), 0);

    let (format, bytes) = svc.store().read_output(&receipt.file_name).await.unwrap();
    assert_eq!(format, OutputFormat::Csv);
    assert!(bytes.starts_with(b"\xEF\xBB\xBF\"Document Summary\""));
}
