use axum::{
    Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{ErrorRes, ExportRes, ExportedFile, ExtractRes, HealthRes, HealthService, SummaryRes};
use hc_core::{
    BillingSummary, DocumentCache, DocumentExtractor, ExportFormat, ExtractionConfig,
    ExtractionError, PlainTextSource, ProcessedDocument, TextSource,
    constants::MAX_SOURCE_BYTES,
    config::{
        ai_timeout_from_env_value, cache_capacity_from_env_value, extraction_mode_from_env_value,
        max_pages_from_env_value, satellite_window_from_env_value,
    },
    process_bytes, render,
};

type ApiError = (StatusCode, Json<ErrorRes>);

/// Application state shared across REST API handlers
///
/// Holds the configured extractor, the text source used to decode uploads and the
/// content-hash cache of processed documents.
#[derive(Clone)]
struct AppState {
    extractor: Arc<DocumentExtractor>,
    source: Arc<dyn TextSource>,
    cache: Arc<DocumentCache>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, extract, summary, export),
    components(schemas(HealthRes, ExtractRes, SummaryRes, ExportRes, ExportedFile, ErrorRes))
)]
struct ApiDoc;

/// Main entry point for the HC extraction server
///
/// Starts the REST server (configurable via HC_REST_ADDR).
///
/// # Environment Variables
/// - `HC_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `HC_EXTRACTION_MODE`: `pattern_based` (default) or `ai_assisted`
/// - `HC_SATELLITE_WINDOW`: look-ahead lines for satellite attributes (default: 5)
/// - `HC_AI_TIMEOUT_SECS`: timeout for text-generation calls (default: 120)
/// - `HC_MAX_PAGES`: pages kept from an upload (default: 500)
/// - `HC_CACHE_CAPACITY`: processed documents kept in memory (default: 32)
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hc=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("HC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    let mode = extraction_mode_from_env_value(std::env::var("HC_EXTRACTION_MODE").ok())?;
    let window = satellite_window_from_env_value(std::env::var("HC_SATELLITE_WINDOW").ok())?;
    let timeout = ai_timeout_from_env_value(std::env::var("HC_AI_TIMEOUT_SECS").ok())?;
    let max_pages = max_pages_from_env_value(std::env::var("HC_MAX_PAGES").ok())?;
    let capacity = cache_capacity_from_env_value(std::env::var("HC_CACHE_CAPACITY").ok())?;

    let config = ExtractionConfig::new(mode, window, timeout)?.with_max_pages(max_pages)?;
    tracing::info!("++ Extraction mode {} (window {})", config.mode(), config.satellite_window());

    let state = AppState {
        source: Arc::new(PlainTextSource::new(config.max_pages())),
        extractor: Arc::new(DocumentExtractor::new(config)),
        cache: Arc::new(DocumentCache::new(capacity)?),
    };

    tracing::info!("++ Starting HC REST on {}", rest_addr);
    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract))
        .route("/summary", post(summary))
        .route("/export/:format", post(export))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(MAX_SOURCE_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_response(err: ExtractionError) -> ApiError {
    let status = match &err {
        ExtractionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ExtractionError::Source(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {:?}", err);
    }
    (status, Json(ErrorRes::new(err.to_string())))
}

fn internal_error(message: &str) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorRes::new(message)),
    )
}

/// Runs the blocking pipeline off the async runtime.
async fn process(state: AppState, body: Bytes) -> Result<Arc<ProcessedDocument>, ApiError> {
    tokio::task::spawn_blocking(move || {
        process_bytes(
            state.source.as_ref(),
            &body,
            &state.extractor,
            Some(&state.cache),
        )
    })
    .await
    .map_err(|e| {
        tracing::error!("Extraction task failed: {:?}", e);
        internal_error("Internal error")
    })?
    .map_err(error_response)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(value).map_err(|e| error_response(ExtractionError::Serialization(e)))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/extract",
    request_body(content = String, description = "Plain-text clinical record", content_type = "text/plain"),
    responses(
        (status = 200, description = "Extracted document", body = ExtractRes),
        (status = 400, description = "Upload too large", body = ErrorRes),
        (status = 422, description = "Upload could not be read as text", body = ErrorRes)
    )
)]
/// Extract the billing document from an uploaded clinical record
///
/// Identical uploads are served from the content-hash cache.
async fn extract(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ExtractRes>, ApiError> {
    let processed = process(state, body).await?;
    Ok(Json(ExtractRes {
        content_hash: processed.content_hash.clone(),
        page_count: processed.page_count,
        document: to_json(&processed.document)?,
    }))
}

#[utoipa::path(
    post,
    path = "/summary",
    request_body(content = String, description = "Plain-text clinical record", content_type = "text/plain"),
    responses(
        (status = 200, description = "Billing summary", body = SummaryRes),
        (status = 400, description = "Upload too large", body = ErrorRes),
        (status = 422, description = "Upload could not be read as text", body = ErrorRes)
    )
)]
/// Quantitative billing summary of an uploaded clinical record
async fn summary(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SummaryRes>, ApiError> {
    let processed = process(state, body).await?;
    let summary = BillingSummary::from_document(&processed.document);
    Ok(Json(SummaryRes {
        content_hash: processed.content_hash.clone(),
        summary: to_json(&summary)?,
    }))
}

#[utoipa::path(
    post,
    path = "/export/{format}",
    params(("format" = String, Path, description = "json, yaml or csv")),
    request_body(content = String, description = "Plain-text clinical record", content_type = "text/plain"),
    responses(
        (status = 200, description = "Rendered export files", body = ExportRes),
        (status = 400, description = "Unknown format or upload too large", body = ErrorRes)
    )
)]
/// Render the extracted document as JSON, YAML or one CSV file per section
async fn export(
    State(state): State<AppState>,
    Path(format): Path<String>,
    body: Bytes,
) -> Result<Json<ExportRes>, ApiError> {
    let format: ExportFormat = format.parse().map_err(error_response)?;
    let processed = process(state, body).await?;
    let files = render(&processed.document, format).map_err(error_response)?;

    Ok(Json(ExportRes {
        content_hash: processed.content_hash.clone(),
        format: format.extension().into(),
        files: files
            .into_iter()
            .map(|file| ExportedFile {
                file_name: file.file_name,
                content_type: format.content_type().into(),
                content: String::from_utf8_lossy(&file.bytes).into_owned(),
            })
            .collect(),
    }))
}
