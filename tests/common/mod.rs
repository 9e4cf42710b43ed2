//! Deterministic stand-ins for tesseract and pdfium.

#![allow(dead_code)]

use async_trait::async_trait;
use image::DynamicImage;
use ocr_convert::{
    ConversionService, EngineOutput, FileStore, OcrConvertError, OcrEngine, Rasterizer,
    RecognitionAdapter, RecognitionConfig,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// What the fake engine answers for one page.
#[derive(Clone, Debug)]
pub enum Script {
    Text(&'static str, f64),
    Fail(&'static str),
}

/// Engine that replays a script, one entry per page, and counts calls.
pub struct FakeEngine {
    script: Vec<Script>,
    pub calls: AtomicUsize,
}

impl FakeEngine {
    pub fn new(script: Vec<Script>) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FakeEngine {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(
        &self,
        page: usize,
        _image: &DynamicImage,
    ) -> Result<EngineOutput, OcrConvertError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.script.get(page - 1).cloned() {
            Some(Script::Text(text, confidence)) => Ok(EngineOutput {
                text: text.to_string(),
                confidence,
            }),
            Some(Script::Fail(detail)) => Err(OcrConvertError::EngineFailure {
                page,
                detail: detail.to_string(),
            }),
            None => Ok(EngineOutput {
                text: String::new(),
                confidence: 0.0,
            }),
        }
    }
}

/// Rasterizer that "renders" a fixed number of blank pages.
pub struct FakeRasterizer {
    pub pages: usize,
}

#[async_trait]
impl Rasterizer for FakeRasterizer {
    async fn rasterize(
        &self,
        _pdf: &[u8],
        _dpi: u32,
        _max_pixels: u32,
    ) -> Result<Vec<DynamicImage>, OcrConvertError> {
        Ok((0..self.pages)
            .map(|_| DynamicImage::new_rgb8(16, 16))
            .collect())
    }
}

pub fn adapter(engine: Arc<FakeEngine>, pdf_pages: usize) -> RecognitionAdapter {
    RecognitionAdapter::new(RecognitionConfig::default())
        .with_engine(engine)
        .with_rasterizer(Arc::new(FakeRasterizer { pages: pdf_pages }))
}

/// A service over temporary directories. Keep the `TempDir` alive.
pub async fn service(engine: Arc<FakeEngine>, pdf_pages: usize) -> (ConversionService, TempDir) {
    let tmp = TempDir::new().expect("tempdir");
    let store = FileStore::open(tmp.path().join("uploads"), tmp.path().join("outputs"))
        .await
        .expect("store");
    (ConversionService::new(adapter(engine, pdf_pages), store), tmp)
}

/// A small, valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::new_rgb8(16, 16)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    buf
}

pub fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}
