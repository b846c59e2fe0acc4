//! HTTP request handlers for the conversion API.
//!
//! # Endpoints
//!
//! - `POST /convert` - Upload a media file, receive it back as compressed audio
//! - `GET /health` - Health check endpoint

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, error, info, warn};

use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use crate::error::{ConvertError, StorageError, TranscodeError};
use crate::storage::{JobFiles, ScratchStream, Workspace};
use crate::transcode::{ConversionJob, OutputFormat, Transcoder, DEFAULT_AUDIO_BITRATE_KBPS};

/// Message returned for storage failures; details stay in the logs.
const STORAGE_FAILURE_MESSAGE: &str = "Erro interno ao processar o arquivo";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state for the conversion handlers.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<T: Transcoder> {
    /// Engine used for every conversion
    pub transcoder: Arc<T>,

    /// Upload and output directories
    pub workspace: Arc<Workspace>,

    /// Target container
    pub output_format: OutputFormat,

    /// Target audio bitrate in kbps
    pub audio_bitrate_kbps: u32,

    /// Largest accepted upload in bytes
    pub max_upload_bytes: u64,
}

impl<T: Transcoder> AppState<T> {
    /// Create a new application state with default conversion settings.
    pub fn new(transcoder: T, workspace: Workspace) -> Self {
        Self {
            transcoder: Arc::new(transcoder),
            workspace: Arc::new(workspace),
            output_format: OutputFormat::default(),
            audio_bitrate_kbps: DEFAULT_AUDIO_BITRATE_KBPS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_audio_bitrate(mut self, kbps: u32) -> Self {
        self.audio_bitrate_kbps = kbps;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}

impl<T: Transcoder> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self {
            transcoder: Arc::clone(&self.transcoder),
            workspace: Arc::clone(&self.workspace),
            output_format: self.output_format,
            audio_bitrate_kbps: self.audio_bitrate_kbps,
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert ConvertError to HTTP response.
///
/// 5xx errors are logged at ERROR level, 4xx at WARN or DEBUG.
impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ConvertError::NoFile => (StatusCode::BAD_REQUEST, self.to_string()),
            ConvertError::Multipart(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ConvertError::PayloadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, self.to_string())
            }
            ConvertError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                STORAGE_FAILURE_MESSAGE.to_string(),
            ),
            // Engine output goes back verbatim
            ConvertError::Transcode(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), "Conversion failed: {}", self);
        } else if status == StatusCode::BAD_REQUEST {
            debug!(status = status.as_u16(), "Rejected upload: {}", self);
        } else {
            warn!(status = status.as_u16(), "Rejected upload: {}", self);
        }

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Map a multipart read failure, recognising body-limit overruns.
fn multipart_error(err: MultipartError, limit: u64) -> ConvertError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ConvertError::PayloadTooLarge { limit }
    } else {
        ConvertError::Multipart(err.body_text())
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle conversion requests.
///
/// # Endpoint
///
/// `POST /convert` with a `multipart/form-data` body. The first part that
/// carries a filename is converted; the field name is not checked.
///
/// # Response
///
/// - `200 OK`: audio stream with `Content-Disposition: attachment`
/// - `400 Bad Request`: no file part
/// - `401 Unauthorized`: missing or wrong bearer token (auth middleware)
/// - `413 Payload Too Large`: upload over the configured limit
/// - `500 Internal Server Error`: transcoder or storage failure
///
/// Upload and output are removed once the response body is dropped, and on
/// every error path.
pub async fn convert_handler<T: Transcoder>(
    State(state): State<AppState<T>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ConvertError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "Request body is not multipart");
        ConvertError::NoFile
    })?;

    let limit = state.max_upload_bytes;
    let mut upload: Option<JobFiles> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };

        state.workspace.ensure_dirs().await?;
        let files = state
            .workspace
            .allocate(&file_name, state.output_format.extension());

        let size = persist_field(field, files.input.path(), limit).await?;
        info!(
            job_id = %files.id,
            file_name = %file_name,
            bytes = size,
            "Upload persisted"
        );

        upload = Some(files);
        break;
    }

    let files = upload.ok_or(ConvertError::NoFile)?;

    let job = ConversionJob::new(
        files.input.path(),
        files.output.path(),
        state.output_format,
        state.audio_bitrate_kbps,
    );
    debug!(job_id = %files.id, engine = state.transcoder.name(), "Starting conversion");
    state.transcoder.transcode(&job).await?;

    stream_output(files, state.output_format).await
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0"
/// }
/// ```
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// Helpers
// =============================================================================

/// Write one multipart field to `path` chunk by chunk, enforcing `limit`.
async fn persist_field(
    mut field: Field<'_>,
    path: &Path,
    limit: u64,
) -> Result<u64, ConvertError> {
    let write_error = |e: std::io::Error| StorageError::Write {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    let mut file = tokio::fs::File::create(path).await.map_err(write_error)?;
    let mut written: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        written += chunk.len() as u64;
        if written > limit {
            return Err(ConvertError::PayloadTooLarge { limit });
        }
        file.write_all(&chunk).await.map_err(write_error)?;
    }

    file.flush().await.map_err(write_error)?;
    Ok(written)
}

/// Build the streaming response for a finished conversion.
///
/// The scratch files move into the body stream and are removed when it is
/// dropped.
async fn stream_output(files: JobFiles, format: OutputFormat) -> Result<Response, ConvertError> {
    let output_path = files.output.path().to_path_buf();
    let open_error = |e: std::io::Error| StorageError::Open {
        path: output_path.clone(),
        message: e.to_string(),
    };

    let file = tokio::fs::File::open(&output_path)
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConvertError::Transcode(TranscodeError::MissingOutput {
                path: output_path.clone(),
            }),
            _ => ConvertError::Storage(open_error(e)),
        })?;
    let size = file.metadata().await.map_err(open_error)?.len();

    let download_name = files.output.file_name();
    info!(job_id = %files.id, bytes = size, file = %download_name, "Streaming converted file");

    let stream = ScratchStream::new(ReaderStream::new(file), vec![files.input, files.output]);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download_name),
            ),
            (header::CONTENT_LENGTH, size.to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

// =============================================================================
// Tests
// =============================================================================
