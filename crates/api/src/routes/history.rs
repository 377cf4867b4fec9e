//! Prediction History Routes

use alerting::AlertTier;
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiError, AppState};
use storage::{PredictionFilter, PredictionRecord};

/// Query parameters for predictions endpoint
#[derive(Debug, Deserialize)]
pub struct PredictionQuery {
    /// Filter by alert level
    pub alert_level: Option<AlertTier>,
    /// Filter by aircraft
    pub aircraft_id: Option<String>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for predictions endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub success: bool,
    pub data: Vec<PredictionRecord>,
    pub count: usize,
}

/// Get predictions, newest first
pub async fn get_predictions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PredictionQuery>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let limit = params.limit.min(500);
    let filter = PredictionFilter {
        alert_level: params.alert_level,
        aircraft_id: params.aircraft_id,
    };

    let data = state
        .repository
        .get_predictions(&filter, limit)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(PredictionResponse {
        success: true,
        count: data.len(),
        data,
    }))
}
