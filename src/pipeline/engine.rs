//! OCR engine boundary: page bitmap in, recognised text and confidence out.
//!
//! The engine is a black box behind [`OcrEngine`]. The production
//! implementation, [`TesseractEngine`], drives the `tesseract` executable as a
//! child process: the page PNG goes in on stdin and TSV comes back on stdout.
//! TSV rather than plain text because it carries per-word confidences, which
//! is where the page confidence comes from.
//!
//! Running tesseract as a process (instead of linking libtesseract) keeps the
//! build free of native toolchains and lets the executable path be plain
//! configuration.

use crate::config::RecognitionConfig;
use crate::error::OcrConvertError;
use crate::pipeline::decode::encode_png;
use async_trait::async_trait;
use image::DynamicImage;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// What the engine returns for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    /// Raw recognised text, before whitespace cleanup.
    pub text: String,
    /// Mean word confidence, 0–100.
    pub confidence: f64,
}

/// An OCR engine.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Whether the engine can be invoked at all.
    async fn is_available(&self) -> bool;

    /// Recognise one page. `page` is 1-indexed and only used for diagnostics.
    async fn recognize(&self, page: usize, image: &DynamicImage)
        -> Result<EngineOutput, OcrConvertError>;
}

/// Tesseract driven through its command-line interface.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: PathBuf,
    language: String,
    page_seg_mode: u8,
    engine_mode: u8,
}

impl TesseractEngine {
    pub fn new(config: &RecognitionConfig) -> Self {
        Self {
            command: config.tesseract_cmd.clone(),
            language: config.language.clone(),
            page_seg_mode: config.page_seg_mode,
            engine_mode: config.engine_mode,
        }
    }

    /// Arguments after the executable: read stdin, write TSV to stdout.
    fn args(&self) -> Vec<String> {
        vec![
            "stdin".to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            self.language.clone(),
            "--oem".to_string(),
            self.engine_mode.to_string(),
            "--psm".to_string(),
            self.page_seg_mode.to_string(),
            "tsv".to_string(),
        ]
    }

    /// `tesseract --version`, first line. `None` when the binary is missing.
    pub async fn version(&self) -> Option<String> {
        let output = Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await
            .ok()?;
        // Older releases print the banner on stderr.
        let banner = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        String::from_utf8_lossy(&banner)
            .lines()
            .next()
            .map(|l| l.trim().to_string())
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        self.version().await.is_some()
    }

    async fn recognize(
        &self,
        page: usize,
        image: &DynamicImage,
    ) -> Result<EngineOutput, OcrConvertError> {
        let png = encode_png(image).map_err(|e| OcrConvertError::EngineFailure {
            page,
            detail: format!("PNG encoding failed: {e}"),
        })?;

        let mut child = Command::new(&self.command)
            .args(self.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OcrConvertError::EngineUnavailable {
                command: self.command.display().to_string(),
                detail: e.to_string(),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .await
                .map_err(|e| OcrConvertError::EngineFailure {
                    page,
                    detail: format!("writing page to engine stdin: {e}"),
                })?;
            // Dropping stdin closes the pipe so tesseract sees EOF.
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OcrConvertError::EngineFailure {
                page,
                detail: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Page {}: tesseract exited with {}", page, output.status);
            return Err(OcrConvertError::EngineFailure {
                page,
                detail: format!("tesseract exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let parsed = parse_tsv(&tsv).map_err(|detail| OcrConvertError::EngineFailure { page, detail })?;
        debug!(
            "Page {}: {} chars at {:.1}% confidence",
            page,
            parsed.text.len(),
            parsed.confidence
        );
        Ok(parsed)
    }
}

// ── TSV parsing ──────────────────────────────────────────────────────────────

/// Word rows are level 5 in tesseract's TSV.
const LEVEL_WORD: u32 = 5;
const TSV_COLUMNS: usize = 12;

/// Rebuild page text from tesseract TSV.
///
/// Words on the same line are joined by a space, lines by a newline, and a
/// change of block or paragraph by a blank line. Confidence is the mean of the
/// non-negative word confidences, 0 when there are no words.
pub fn parse_tsv(tsv: &str) -> Result<EngineOutput, String> {
    let mut text = String::new();
    let mut conf_sum = 0.0;
    let mut conf_count = 0usize;
    let mut prev: Option<(u32, u32, u32, u32)> = None;

    let mut lines = tsv.lines();
    match lines.next() {
        Some(header) if header.starts_with("level") => {}
        Some(other) => return Err(format!("unexpected TSV header: {other:?}")),
        None => {
            return Ok(EngineOutput {
                text: String::new(),
                confidence: 0.0,
            })
        }
    }

    for (n, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.splitn(TSV_COLUMNS, '\t').collect();
        if cols.len() < TSV_COLUMNS - 1 {
            return Err(format!("TSV row {} has {} columns", n + 2, cols.len()));
        }
        let num = |i: usize| -> Result<u32, String> {
            cols[i]
                .trim()
                .parse::<u32>()
                .map_err(|_| format!("TSV row {}: bad number {:?}", n + 2, cols[i]))
        };
        if num(0)? != LEVEL_WORD {
            continue;
        }
        let word = cols.get(11).map(|w| w.trim()).unwrap_or("");
        if word.is_empty() {
            continue;
        }
        let key = (num(1)?, num(2)?, num(3)?, num(4)?);
        let conf: f64 = cols[10]
            .trim()
            .parse()
            .map_err(|_| format!("TSV row {}: bad confidence {:?}", n + 2, cols[10]))?;

        if let Some((page, block, par, line_no)) = prev {
            if (page, block, par) != (key.0, key.1, key.2) {
                text.push_str("\n\n");
            } else if line_no != key.3 {
                text.push('\n');
            } else {
                text.push(' ');
            }
        }
        text.push_str(word);
        prev = Some(key);

        if conf >= 0.0 {
            conf_sum += conf;
            conf_count += 1;
        }
    }

    let confidence = if conf_count == 0 {
        0.0
    } else {
        conf_sum / conf_count as f64
    };
    Ok(EngineOutput { text, confidence })
}
