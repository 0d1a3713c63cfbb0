//! HTTP surface for Docdigest.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /summarize` – Multipart upload (`file`, optional `style`). Extracts, chunks,
//!   summarizes, and renders the document; returns `{ "summary": [sections], "pdf_url": ... }`.
//! - `GET /download/:filename` – Stream a rendered summary PDF.
//! - `GET /health` – Liveness probe with the current timestamp.
//! - `GET /metrics` – Summarization counters.
//!
//! Failures return `{ "error": <reason tag>, "message": <text> }`.

use crate::config::Config;
use crate::processing::{PipelineError, Section, SummaryApi};
use crate::render::RenderStyle;
use crate::storage::{StorageError, validate_name};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tower_http::cors::{Any, CorsLayer};

/// Public prefix under which the frontend proxies download links.
const DOWNLOAD_URL_PREFIX: &str = "/api/download";

/// Options applied to the router beyond the service itself.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Browser origin allowed by CORS.
    pub cors_allowed_origin: String,
    /// Maximum accepted request body size.
    pub max_upload_bytes: usize,
}

impl From<&Config> for RouterOptions {
    fn from(config: &Config) -> Self {
        Self {
            cors_allowed_origin: config.cors_allowed_origin.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Build the HTTP router exposing the summary API surface.
pub fn create_router<S>(service: Arc<S>, options: &RouterOptions) -> Router
where
    S: SummaryApi + 'static,
{
    let router = Router::new()
        .route("/summarize", post(summarize::<S>))
        .route("/download/:filename", get(download::<S>))
        .route("/health", get(health))
        .route("/metrics", get(get_metrics::<S>))
        .layer(DefaultBodyLimit::max(options.max_upload_bytes))
        .with_state(service);

    match cors_layer(&options.cors_allowed_origin) {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    match HeaderValue::from_str(origin) {
        Ok(origin) => Some(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        ),
        Err(error) => {
            tracing::warn!(origin, error = %error, "Ignoring invalid CORS origin");
            None
        }
    }
}

/// Success response for `POST /summarize`.
#[derive(Serialize)]
struct SummarizeResponse {
    summary: Vec<Section>,
    pdf_url: String,
}

/// Summarize an uploaded document and render it with the requested style.
async fn summarize<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummaryApi,
{
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut style = RenderStyle::Minimal;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::bad_request(format!("Malformed multipart body: {error}")))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|error| {
                    AppError::bad_request(format!("Failed to read upload: {error}"))
                })?;
                upload = Some((file_name, bytes.to_vec()));
            }
            Some("style") => {
                let value = field.text().await.map_err(|error| {
                    AppError::bad_request(format!("Failed to read style: {error}"))
                })?;
                style = RenderStyle::parse(&value);
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = upload else {
        return Err(AppError::bad_request("Missing `file` field".to_string()));
    };

    let outcome = service.summarize_document(&file_name, bytes, style).await?;
    tracing::info!(
        file = %file_name,
        %style,
        chunks = outcome.chunk_count,
        sections = outcome.sections.len(),
        "Summarize request completed"
    );

    Ok(Json(SummarizeResponse {
        summary: outcome.sections,
        pdf_url: format!("{DOWNLOAD_URL_PREFIX}/{}", outcome.document_name),
    }))
}

/// Return a rendered summary document.
async fn download<S>(
    State(service): State<Arc<S>>,
    Path(filename): Path<String>,
) -> Result<Response, AppError>
where
    S: SummaryApi,
{
    validate_name(&filename)?;
    let bytes = service.open_document(&filename).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

async fn health() -> Json<serde_json::Value> {
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();
    Json(json!({ "status": "ok", "timestamp": timestamp }))
}

async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: SummaryApi,
{
    Json(service.metrics_snapshot())
}

struct AppError {
    status: StatusCode,
    reason: &'static str,
    message: String,
}

impl AppError {
    fn bad_request(message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            reason: "bad_request",
            message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.reason, "message": self.message })),
        )
            .into_response()
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        let status = match &inner {
            PipelineError::UnsupportedFormat(_) | PipelineError::EmptyContent => {
                StatusCode::BAD_REQUEST
            }
            PipelineError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PipelineError::Adapter { .. } => StatusCode::SERVICE_UNAVAILABLE,
            PipelineError::Render(_) | PipelineError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::warn!(reason = inner.reason(), error = %inner, "Summarize request failed");
        }
        Self {
            status,
            reason: inner.reason(),
            message: inner.to_string(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(inner: StorageError) -> Self {
        let (status, reason) = match &inner {
            StorageError::InvalidName(_) => (StatusCode::BAD_REQUEST, "invalid_name"),
            StorageError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            StorageError::Io { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_failure"),
        };
        Self {
            status,
            reason,
            message: inner.to_string(),
        }
    }
}
