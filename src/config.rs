//! Configuration types for recognition and for the HTTP service.
//!
//! All recognition behaviour is controlled through [`RecognitionConfig`], built
//! via its [`RecognitionConfigBuilder`]. The engine executable and the pdfium
//! library location live here too, so two adapters in the same process can
//! point at different installations.

use crate::error::OcrConvertError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Tesseract page segmentation mode 6: "assume a single uniform block of text".
pub const PSM_UNIFORM_BLOCK: u8 = 6;

/// Tesseract OCR engine mode 3: "default, based on what is available".
pub const OEM_DEFAULT: u8 = 3;

/// Configuration for the Recognition Adapter.
///
/// # Example
/// ```rust
/// use ocr_convert::RecognitionConfig;
///
/// let config = RecognitionConfig::builder()
///     .dpi(300)
///     .language("eng+deu")
///     .tesseract_cmd("/usr/local/bin/tesseract")
///     .build()
///     .unwrap();
/// assert_eq!(config.page_seg_mode, 6);
/// ```
#[derive(Clone)]
pub struct RecognitionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 300.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 6000.
    ///
    /// Caps oversized pages (posters, blueprints) that would otherwise exhaust
    /// memory at 300 DPI. An A4 page at 300 DPI is 2480 × 3508 and is unaffected.
    pub max_rendered_pixels: u32,

    /// Path or name of the tesseract executable. Default: `tesseract` (from `PATH`).
    pub tesseract_cmd: PathBuf,

    /// Tesseract language code(s), e.g. `eng` or `eng+fra`. Default: `eng`.
    pub language: String,

    /// Tesseract `--psm`. Default: [`PSM_UNIFORM_BLOCK`].
    pub page_seg_mode: u8,

    /// Tesseract `--oem`. Default: [`OEM_DEFAULT`].
    pub engine_mode: u8,

    /// Directory holding the pdfium shared library. `None` binds the system library.
    pub pdfium_library_path: Option<PathBuf>,

    /// Number of pages recognised at once. Default: 2.
    pub concurrency: usize,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            dpi: 300,
            max_rendered_pixels: 6000,
            tesseract_cmd: PathBuf::from("tesseract"),
            language: "eng".to_string(),
            page_seg_mode: PSM_UNIFORM_BLOCK,
            engine_mode: OEM_DEFAULT,
            pdfium_library_path: None,
            concurrency: 2,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for RecognitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecognitionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("tesseract_cmd", &self.tesseract_cmd)
            .field("language", &self.language)
            .field("page_seg_mode", &self.page_seg_mode)
            .field("engine_mode", &self.engine_mode)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("concurrency", &self.concurrency)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn RecognitionProgress>"),
            )
            .finish()
    }
}

impl RecognitionConfig {
    /// Create a new builder for `RecognitionConfig`.
    pub fn builder() -> RecognitionConfigBuilder {
        RecognitionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`RecognitionConfig`].
#[derive(Debug)]
pub struct RecognitionConfigBuilder {
    config: RecognitionConfig,
}

impl RecognitionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn tesseract_cmd(mut self, cmd: impl Into<PathBuf>) -> Self {
        self.config.tesseract_cmd = cmd.into();
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    pub fn page_seg_mode(mut self, psm: u8) -> Self {
        self.config.page_seg_mode = psm;
        self
    }

    pub fn engine_mode(mut self, oem: u8) -> Self {
        self.config.engine_mode = oem;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RecognitionConfig, OcrConvertError> {
        let c = &self.config;
        if c.language.trim().is_empty() {
            return Err(OcrConvertError::InvalidConfig(
                "language must not be empty".into(),
            ));
        }
        if c.page_seg_mode > 13 {
            return Err(OcrConvertError::InvalidConfig(format!(
                "page segmentation mode must be 0–13, got {}",
                c.page_seg_mode
            )));
        }
        if c.engine_mode > 3 {
            return Err(OcrConvertError::InvalidConfig(format!(
                "engine mode must be 0–3, got {}",
                c.engine_mode
            )));
        }
        if c.tesseract_cmd.as_os_str().is_empty() {
            return Err(OcrConvertError::InvalidConfig(
                "tesseract command must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Settings for the HTTP service and its two working directories.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Where uploads are parked while they are processed.
    pub upload_dir: PathBuf,
    /// Where converted files wait to be downloaded.
    pub output_dir: PathBuf,
    /// Request body limit for `POST /upload`.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            upload_dir: PathBuf::from("uploads"),
            output_dir: PathBuf::from("outputs"),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}
