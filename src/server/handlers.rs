//! Route handlers.
//!
//! - `GET /` - Upload form
//! - `POST /upload` - Multipart upload run through the pipeline
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics export

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::AppState;
use crate::constants::{UPLOAD_FIELD_NAME, WIDTH_FIELD_NAME};
use crate::imaging::ImageError;
use crate::pipeline::{PipelineError, ProcessedOutput, ProcessingRequest, Stage};
use crate::storage::sanitize_file_name;

/// JSON body returned for a stored upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub path: String,
    pub format: &'static str,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

impl From<&ProcessedOutput> for UploadResponse {
    fn from(output: &ProcessedOutput) -> Self {
        Self {
            path: output.stored.clone(),
            format: output.format.as_str(),
            width: output.width,
            height: output.height,
            bytes: output.bytes,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    stage: Option<&'static str>,
}

/// Error response: status plus `{error, stage}` JSON
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    stage: Option<Stage>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            stage: None,
        }
    }

    /// 413 for a body cut off by the size limit before its length was known
    pub fn payload_too_large(max_size: usize) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: format!("Upload exceeds maximum {} bytes", max_size),
            stage: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            stage: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ImageError> for ApiError {
    fn from(err: ImageError) -> Self {
        Self {
            status: StatusCode::from_u16(err.to_http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: err.to_string(),
            stage: None,
        }
    }
}

impl From<&PipelineError> for ApiError {
    fn from(err: &PipelineError) -> Self {
        Self {
            status: StatusCode::from_u16(err.to_http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: err.to_string(),
            stage: Some(err.stage()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            stage: self.stage.map(|s| s.as_str()),
        };
        (self.status, Json(body)).into_response()
    }
}

/// The parts of an upload form the pipeline needs
struct UploadForm {
    file_name: String,
    data: Bytes,
    width: Option<u32>,
}

async fn read_form(multipart: &mut Multipart, max_upload_size: usize) -> Result<UploadForm, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut width = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(multipart_error(e, max_upload_size)),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            UPLOAD_FIELD_NAME => {
                let raw_name = field.file_name().unwrap_or_default().to_string();
                let file_name = sanitize_file_name(&raw_name)
                    .map_err(|_| ApiError::bad_request("upload has no usable file name"))?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(e, max_upload_size))?;
                file = Some((file_name, data));
            }
            WIDTH_FIELD_NAME => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(e, max_upload_size))?;
                let text = text.trim();
                if !text.is_empty() {
                    let parsed = text.parse::<u32>().map_err(|_| {
                        ApiError::bad_request(format!("invalid width '{}'", text))
                    })?;
                    width = Some(parsed);
                }
            }
            _ => {}
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| ApiError::bad_request("no file provided in field 'file'"))?;

    if data.len() > max_upload_size {
        return Err(ImageError::FileTooLarge {
            size: data.len(),
            max_size: max_upload_size,
        }
        .into());
    }
    if data.is_empty() {
        return Err(ApiError::bad_request("uploaded file is empty"));
    }

    Ok(UploadForm {
        file_name,
        data,
        width,
    })
}

fn multipart_error(err: axum::extract::multipart::MultipartError, max_upload_size: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::payload_too_large(max_upload_size);
    }
    ApiError::bad_request(format!("malformed multipart body: {}", err.body_text()))
}

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let form = match read_form(&mut multipart, state.server.max_upload_size).await {
        Ok(form) => form,
        Err(e) => {
            state.metrics.record_rejected();
            state.metrics.increment_status_count(e.status().as_u16());
            tracing::warn!(status = e.status().as_u16(), error = %e.message, "Upload rejected");
            return Err(e);
        }
    };
    state.metrics.record_upload(form.data.len());

    let cancel = CancellationToken::new();
    let mut handle = {
        let pipeline = state.pipeline.clone();
        let sink = state.sink.clone();
        let cancel = cancel.clone();
        let file_name = form.file_name.clone();
        let data = form.data;
        let width = form.width;

        tokio::task::spawn_blocking(move || {
            let mut request = ProcessingRequest::new(&data, &file_name);
            request.target_width = width;
            pipeline.process(&request, &*sink, &cancel)
        })
    };

    let joined = match tokio::time::timeout(state.server.request_timeout(), &mut handle).await {
        Ok(joined) => joined,
        Err(_) => {
            tracing::warn!(
                file = %form.file_name,
                timeout_secs = state.server.request_timeout,
                "Upload deadline passed, cancelling"
            );
            cancel.cancel();
            handle.await
        }
    };

    let result = joined.map_err(|e| {
        tracing::error!(file = %form.file_name, error = %e, "Upload worker failed");
        state.metrics.increment_status_count(500);
        ApiError::internal("upload worker failed")
    })?;

    match result {
        Ok(output) => {
            state
                .metrics
                .record_success(output.bytes, output.elapsed.as_secs_f64() * 1000.0);
            state.metrics.increment_status_count(200);
            tracing::info!(
                file = %form.file_name,
                path = %output.stored,
                format = %output.format,
                original_width = output.original_width,
                original_height = output.original_height,
                width = output.width,
                height = output.height,
                bytes = output.bytes,
                elapsed_ms = output.elapsed.as_millis() as u64,
                "Upload processed"
            );
            Ok(Json(UploadResponse::from(&output)))
        }
        Err(err) => {
            match &err {
                PipelineError::Cancelled { .. } => state.metrics.record_cancelled(),
                PipelineError::Stage { stage, .. } => state.metrics.record_stage_failure(*stage),
            }
            let status = err.to_http_status();
            state.metrics.increment_status_count(status);

            if err.is_client_error() {
                tracing::warn!(file = %form.file_name, stage = %err.stage(), status, error = %err, "Upload failed");
            } else {
                tracing::error!(file = %form.file_name, stage = %err.stage(), status, error = %err, "Upload failed");
            }
            Err(ApiError::from(&err))
        }
    }
}

/// GET /
pub async fn index(State(state): State<AppState>) -> Response {
    match tokio::fs::read_to_string(&state.server.index_file).await {
        Ok(page) => Html(page).into_response(),
        Err(e) => {
            tracing::warn!(path = %state.server.index_file, error = %e, "Index page unavailable");
            (StatusCode::NOT_FOUND, "index page not found").into_response()
        }
    }
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "uptime_seconds": state.start_time.elapsed().as_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.export_prometheus(),
    )
}
