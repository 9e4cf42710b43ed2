//! End-to-end tests against a real tesseract (and, for PDFs, a real pdfium).
//!
//! Gated behind `OCR_E2E=1` so they do not run in CI unless explicitly
//! requested. Point `OCR_E2E_SAMPLE` at a scanned PDF or image with readable
//! text to also exercise a full conversion.
//!
//! Run with:
//!   OCR_E2E=1 cargo test --test e2e -- --nocapture

use image::{DynamicImage, Rgb, RgbImage};
use ocr_convert::{
    convert, ErrorKind, OutputFormat, RecognitionAdapter, RecognitionConfig, TesseractEngine,
};
use std::io::Cursor;
use std::path::PathBuf;

macro_rules! e2e_skip_unless_enabled {
    () => {
        if std::env::var("OCR_E2E").is_err() {
            println!("SKIP: set OCR_E2E=1 to run e2e tests");
            return;
        }
    };
}

fn white_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([255, 255, 255])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[tokio::test]
async fn test_tesseract_is_installed() {
    e2e_skip_unless_enabled!();
    let engine = TesseractEngine::new(&RecognitionConfig::default());
    let version = engine.version().await.expect("tesseract --version");
    println!("engine: {version}");
    assert!(version.to_lowercase().contains("tesseract"));
}

#[tokio::test]
async fn test_blank_page_is_empty_document() {
    e2e_skip_unless_enabled!();
    let adapter = RecognitionAdapter::new(RecognitionConfig::default());
    let err = adapter
        .process(&white_png(400, 300), "png")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyDocument, "{err}");
}

#[tokio::test]
async fn test_convert_sample_document() {
    e2e_skip_unless_enabled!();
    let Ok(sample) = std::env::var("OCR_E2E_SAMPLE") else {
        println!("SKIP: set OCR_E2E_SAMPLE=/path/to/scan.pdf");
        return;
    };
    let sample = PathBuf::from(sample);

    let adapter = RecognitionAdapter::new(RecognitionConfig::default());
    let result = adapter.process_file(&sample).await.expect("recognition");
    let stats = result.stats();
    println!(
        "{}: {} pages, {} words, {:.1}% confidence",
        sample.display(),
        stats.page_count,
        stats.word_count,
        stats.mean_confidence
    );
    assert!(stats.word_count > 0);
    assert!(stats.mean_confidence > 0.0);

    for format in OutputFormat::ALL {
        let output = convert(&result, format).expect("serialization");
        assert!(!output.bytes().is_empty(), "{format}");
    }
}
