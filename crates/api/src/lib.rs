//! Aircraft Maintenance Prediction API
//!
//! REST surface over the inference engine: single and batch risk
//! assessment, model info and reload, prediction history and metrics.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use inference_engine::{ArtifactPaths, InferenceEngine, ModelRegistry};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod config;
pub mod error;
mod routes;

pub use crate::config::AppConfig;
pub use error::ApiError;

use storage::Repository;

/// Service name reported by the health check
pub const SERVICE_NAME: &str = "aircraft-maintenance-predictor";

/// Application state shared across handlers
pub struct AppState {
    pub engine: InferenceEngine,
    /// Prediction history
    pub repository: Repository,
    /// Where reloads read the artifact from
    pub artifact_paths: ArtifactPaths,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Present when the Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state from configuration; the model is not loaded here
    pub fn from_config(config: &AppConfig) -> Self {
        let engine = InferenceEngine::new(
            Arc::new(ModelRegistry::empty()),
            data_validator::Validator::new(config.validation.clone()),
            alerting::AlertClassifier::new(config.alerting.clone()),
            config.inference.clone(),
        );
        Self::new(
            engine,
            Repository::with_capacity(config.storage.capacity),
            config.artifact.clone(),
        )
    }

    /// Create new application state
    pub fn new(engine: InferenceEngine, repository: Repository, artifact_paths: ArtifactPaths) -> Self {
        Self {
            engine,
            repository,
            artifact_paths,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the /metrics route
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: DateTime<Utc>,
    pub model_loaded: bool,
    pub version: String,
    pub uptime_seconds: u64,
    pub prediction_count: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/model/info", get(routes::model::get_info))
        .route("/api/model/reload", post(routes::model::reload))
        .route("/api/predict", post(routes::predictions::predict))
        .route("/api/predict/batch", post(routes::predictions::predict_batch))
        .route("/api/analyze", post(routes::predictions::analyze))
        .route("/api/predictions", get(routes::history::get_predictions))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now(),
        model_loaded: state.engine.registry().is_loaded(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        prediction_count: state.repository.prediction_count(),
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics exporter not installed".to_string(),
        ),
    }
}

/// Initialize logging
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &crate::config::LoggingConfig) -> Result<(), ApiError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ApiError::Internal(format!("Invalid log filter: {}", e)))?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };
    result.map_err(|e| ApiError::Internal(format!("Failed to set tracing subscriber: {}", e)))
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> Result<PrometheusHandle, ApiError> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| ApiError::Internal(format!("Failed to install metrics recorder: {}", e)))
}

/// Run the server
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    let mut state = AppState::from_config(&config);

    if config.server.metrics {
        state = state.with_metrics(install_metrics()?);
    }

    match state.engine.registry().load_from(&state.artifact_paths) {
        Ok(artifact) => info!("Serving model {}", artifact.metadata().model_type),
        Err(e) => warn!(
            "Starting without a model ({}); POST /api/model/reload once artifacts are in place",
            e
        ),
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.server.bind);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
