//! Upload and output directories.
//!
//! Every request works under its own generated identifier, so concurrent
//! requests never touch the same file. Outputs are written to a temp file in
//! the output directory and renamed into place: a download never observes a
//! half-written file.

use crate::error::OcrConvertError;
use crate::serialize::{ConversionOutput, OutputFormat};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// The only names [`FileStore::resolve_download`] accepts: `<uuid>.<format>`.
static RE_OUTPUT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}\.(json|csv|txt)$")
        .unwrap()
});

/// True for names this service hands out as download links.
pub fn is_output_name(name: &str) -> bool {
    RE_OUTPUT_NAME.is_match(name)
}

/// The two working directories.
#[derive(Debug, Clone)]
pub struct FileStore {
    upload_dir: PathBuf,
    output_dir: PathBuf,
}

impl FileStore {
    /// Create both directories if needed.
    pub async fn open(
        upload_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, OcrConvertError> {
        let store = Self {
            upload_dir: upload_dir.into(),
            output_dir: output_dir.into(),
        };
        for dir in [&store.upload_dir, &store.output_dir] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| OcrConvertError::io(dir, e))?;
        }
        Ok(store)
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Park an upload as `<file_id>.<extension>`.
    pub async fn save_upload(
        &self,
        file_id: Uuid,
        extension: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, OcrConvertError> {
        let path = self.upload_dir.join(format!("{}.{}", file_id, extension));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| OcrConvertError::io(&path, e))?;
        debug!("Saved upload {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }

    /// Delete a parked upload. A file that is already gone is not an error.
    pub async fn remove_upload(&self, path: &Path) -> Result<(), OcrConvertError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Could not remove upload {}: {}", path.display(), e);
                Err(OcrConvertError::io(path, e))
            }
        }
    }

    /// Write a converted document under its file name, atomically.
    pub async fn write_output(&self, output: &ConversionOutput) -> Result<PathBuf, OcrConvertError> {
        let dir = self.output_dir.clone();
        let path = self.output_dir.join(output.file_name());
        let bytes = output.bytes().to_vec();
        let target = path.clone();

        tokio::task::spawn_blocking(move || -> Result<(), OcrConvertError> {
            let mut tmp =
                tempfile::NamedTempFile::new_in(&dir).map_err(|e| OcrConvertError::io(&dir, e))?;
            tmp.write_all(&bytes)
                .and_then(|_| tmp.flush())
                .map_err(|e| OcrConvertError::io(tmp.path(), e))?;
            tmp.persist(&target)
                .map_err(|e| OcrConvertError::io(&target, e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| OcrConvertError::Internal(format!("Output write task panicked: {}", e)))??;

        debug!("Wrote {} ({} bytes)", path.display(), output.bytes().len());
        Ok(path)
    }

    /// Map a requested download name to a path, refusing anything that is not
    /// a name we issued or that does not exist.
    pub async fn resolve_download(&self, name: &str) -> Result<PathBuf, OcrConvertError> {
        if !is_output_name(name) {
            return Err(OcrConvertError::NotFound {
                name: name.to_string(),
            });
        }
        let path = self.output_dir.join(name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(OcrConvertError::NotFound {
                name: name.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OcrConvertError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(OcrConvertError::io(&path, e)),
        }
    }

    /// Read back a converted document.
    pub async fn read_output(&self, name: &str) -> Result<(OutputFormat, Vec<u8>), OcrConvertError> {
        let path = self.resolve_download(name).await?;
        let format = OutputFormat::from_file_name(name).ok_or_else(|| OcrConvertError::NotFound {
            name: name.to_string(),
        })?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| OcrConvertError::io(&path, e))?;
        Ok((format, bytes))
    }
}
