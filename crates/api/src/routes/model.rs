//! Model Routes

use axum::{extract::State, Json};
use inference_engine::ModelInfo;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::routes::predictions::DataResponse;
use crate::{ApiError, AppState};

/// Response for a successful reload
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub message: String,
    pub data: ModelInfo,
}

/// Summary of the installed model
pub async fn get_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<ModelInfo>>, ApiError> {
    let artifact = state.engine.registry().current()?;
    Ok(Json(DataResponse {
        success: true,
        data: artifact.info(),
    }))
}

/// Reload the artifact from the configured paths
///
/// A failed reload leaves the serving model in place.
pub async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<ReloadResponse>, ApiError> {
    let registry = state.engine.registry().clone();
    let paths = state.artifact_paths.clone();

    let artifact = tokio::task::spawn_blocking(move || registry.load_from(&paths))
        .await
        .map_err(|e| ApiError::Internal(format!("Reload worker failed: {}", e)))??;

    info!(
        "Model reloaded: {} (generation {})",
        artifact.metadata().model_type,
        state.engine.registry().generation()
    );
    metrics::counter!("model_reloads_total").increment(1);

    Ok(Json(ReloadResponse {
        success: true,
        message: "Model reloaded successfully".to_string(),
        data: artifact.info(),
    }))
}
