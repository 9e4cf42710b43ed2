//! Upload handling: validate → park → recognise → serialize → store.
//!
//! This is the orchestration the HTTP handler and the CLI share. Validation of
//! both the input extension and the output format happens before anything is
//! written to disk or handed to the engine.

use crate::document::{extension_of, DocumentKind};
use crate::error::OcrConvertError;
use crate::output::RecognitionStats;
use crate::recognize::RecognitionAdapter;
use crate::serialize::{self, OutputFormat};
use crate::store::FileStore;
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info};
use uuid::Uuid;

/// What a successful upload returns to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReceipt {
    pub message: String,
    pub file_id: String,
    pub output_format: OutputFormat,
    /// Generated output name, `<file_id>.<ext>`.
    pub file_name: String,
    pub download_url: String,
    pub stats: RecognitionStats,
}

/// Shared, cheap-to-clone conversion service.
#[derive(Clone)]
pub struct ConversionService {
    adapter: RecognitionAdapter,
    store: FileStore,
}

impl ConversionService {
    pub fn new(adapter: RecognitionAdapter, store: FileStore) -> Self {
        Self { adapter, store }
    }

    pub fn adapter(&self) -> &RecognitionAdapter {
        &self.adapter
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Convert one uploaded file.
    ///
    /// `file_name` is the client's name for the upload; only its extension is
    /// used. `format` is the raw format selector from the request.
    pub async fn handle_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        format: &str,
    ) -> Result<ConversionReceipt, OcrConvertError> {
        let extension = extension_of(file_name);
        DocumentKind::from_extension(&extension)?;
        let format: OutputFormat = format.parse()?;

        let file_id = Uuid::new_v4();
        let start = Instant::now();
        info!(%file_id, "Upload received: {} bytes, .{} → {}", bytes.len(), extension, format);

        let upload_path = self.store.save_upload(file_id, &extension, bytes).await?;
        let outcome = self.convert_upload(file_id, bytes, &extension, format).await;
        // The upload is removed whatever happened; a failed removal is only logged.
        let _ = self.store.remove_upload(&upload_path).await;

        let (file_name, stats) = match outcome {
            Ok(done) => done,
            Err(e) => {
                if !e.kind().is_validation() {
                    error!(%file_id, "Conversion failed: {}", e);
                }
                return Err(e);
            }
        };

        info!(
            %file_id,
            "Converted in {}ms → {}",
            start.elapsed().as_millis(),
            file_name
        );
        Ok(ConversionReceipt {
            message: "File processed successfully".to_string(),
            file_id: file_id.to_string(),
            output_format: format,
            download_url: format!("/download/{}", file_name),
            file_name,
            stats,
        })
    }

    async fn convert_upload(
        &self,
        file_id: Uuid,
        bytes: &[u8],
        extension: &str,
        format: OutputFormat,
    ) -> Result<(String, RecognitionStats), OcrConvertError> {
        let result = self.adapter.process(bytes, extension).await?;
        let output = serialize::convert_named(&result, format, &file_id.to_string())?;
        self.store.write_output(&output).await?;
        Ok((output.file_name().to_string(), *result.stats()))
    }
}
