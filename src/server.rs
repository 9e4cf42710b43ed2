//! HTTP surface.
//!
//! Endpoints:
//! - GET  /                      - minimal upload form
//! - POST /upload                - multipart `file` + `output_format`, returns a receipt
//! - GET  /download/{file_name}  - converted file as an attachment
//! - GET  /health                - liveness plus OCR engine availability
//! - GET  /formats               - supported input and output formats

use crate::config::ServerConfig;
use crate::document::SUPPORTED_EXTENSIONS;
use crate::error::{ErrorKind, OcrConvertError};
use crate::serialize::OutputFormat;
use crate::service::{ConversionReceipt, ConversionService};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

/// Router state.
#[derive(Clone)]
pub struct AppState {
    service: ConversionService,
}

// ============================================================================
// Error Response
// ============================================================================

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
    code: &'static str,
}

/// An error on its way to becoming an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            detail: detail.into(),
        }
    }
}

/// Status code for each error kind.
pub fn status_code(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UnsupportedInputFormat
        | ErrorKind::UnsupportedOutputFormat
        | ErrorKind::EmptyDocument => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::EngineFailure | ErrorKind::IoFailure | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<OcrConvertError> for ApiError {
    fn from(e: OcrConvertError) -> Self {
        let kind = e.kind();
        let status = status_code(kind);
        let detail = if status.is_server_error() {
            format!("Error processing file: {}", e)
        } else {
            e.to_string()
        };
        Self {
            status,
            code: kind.code(),
            detail,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            detail: self.detail,
            code: self.code,
        });
        (self.status, body).into_response()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Build the application router.
pub fn router(service: ConversionService, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/download/{file_name}", get(download))
        .route("/health", get(health))
        .route("/formats", get(formats))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { service })
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve(
    config: &ServerConfig,
    service: ConversionService,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), OcrConvertError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| OcrConvertError::io(&addr, e))?;
    info!("OCR converter listening on http://{}", addr);

    axum::serve(listener, router(service, config.max_upload_bytes))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| OcrConvertError::io(&addr, e))?;

    info!("Server shutdown complete");
    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /
async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /upload
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ConversionReceipt>, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut output_format: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        debug!("Received field: name='{}', filename={:?}", name, field.file_name());

        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            "output_format" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read form: {}", e)))?;
                output_format = Some(value);
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let output_format =
        output_format.ok_or_else(|| ApiError::bad_request("Missing form field 'output_format'"))?;

    let receipt = state
        .service
        .handle_upload(&file_name, &bytes, &output_format)
        .await?;
    Ok(Json(receipt))
}

/// GET /download/{file_name}
async fn download(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<Response, ApiError> {
    let (_format, bytes) = state.service.store().read_output(&file_name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    version: &'static str,
    engine_available: bool,
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "OCR Converter API is running",
        version: env!("CARGO_PKG_VERSION"),
        engine_available: state.service.adapter().is_engine_available().await,
    })
}

#[derive(Serialize)]
struct FormatsResponse {
    input_formats: Vec<String>,
    output_formats: Vec<&'static str>,
}

/// GET /formats
async fn formats() -> Json<FormatsResponse> {
    Json(FormatsResponse {
        input_formats: SUPPORTED_EXTENSIONS.iter().map(|e| format!(".{e}")).collect(),
        output_formats: OutputFormat::ALL.iter().map(|f| f.extension()).collect(),
    })
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Document OCR Converter</title>
</head>
<body>
<h1>Document OCR Converter</h1>
<form action="/upload" method="post" enctype="multipart/form-data">
  <p><input type="file" name="file" accept=".pdf,.png,.jpg,.jpeg,.tiff,.bmp" required></p>
  <p>
    <select name="output_format">
      <option value="json">JSON</option>
      <option value="csv">CSV</option>
      <option value="txt">TXT</option>
    </select>
  </p>
  <p><button type="submit">Convert</button></p>
</form>
</body>
</html>
"#;
