//! Prediction Routes

use axum::{body::Bytes, extract::State, Json};
use data_validator::RawSensorReading;
use inference_engine::{BatchOutcome, BatchSummary, ErrorRecord, InferenceError, RiskAssessment};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use alerting::{HealthAssessment, MaintenancePriority};

use crate::{ApiError, AppState};

/// Envelope for single-result responses
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Response for the batch endpoint
#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub summary: BatchSummary,
    pub data: Vec<BatchOutcome>,
}

/// Payload of the analyze endpoint
#[derive(Debug, Serialize)]
pub struct Analysis {
    pub prediction: RiskAssessment,
    pub health_assessment: HealthAssessment,
    pub maintenance_priority: MaintenancePriority,
}

fn parse_body(body: &Bytes) -> Result<Value, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest("No data provided".into()));
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("Invalid JSON: {}", e)))
}

fn parse_reading(value: Value) -> Result<RawSensorReading, ApiError> {
    if !value.is_object() {
        return Err(ApiError::BadRequest("Reading must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| ApiError::BadRequest(format!("Invalid reading: {}", e)))
}

fn record(state: &AppState, assessment: &RiskAssessment) {
    metrics::counter!("predictions_total", "alert_level" => assessment.alert_level.as_str())
        .increment(1);
    if let Err(e) = state.repository.record(assessment) {
        warn!("Failed to record prediction for {}: {}", assessment.aircraft_id, e);
    }
}

fn assess_one(state: &Arc<AppState>, body: &Bytes) -> Result<RiskAssessment, ApiError> {
    let raw = parse_reading(parse_body(body)?)?;
    let assessment = state.engine.predict_raw(&raw)?;
    record(state, &assessment);
    Ok(assessment)
}

/// Assess one reading
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<DataResponse<RiskAssessment>>, ApiError> {
    let data = assess_one(&state, &body)?;
    Ok(Json(DataResponse {
        success: true,
        data,
    }))
}

/// Assess one reading with health assessment and maintenance priority
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<DataResponse<Analysis>>, ApiError> {
    let prediction = assess_one(&state, &body)?;
    let health_assessment = HealthAssessment::assess(prediction.health_score);
    let maintenance_priority = MaintenancePriority::from_tier(
        prediction.alert_level,
        prediction.confidence,
        prediction.days_to_failure,
    );

    Ok(Json(DataResponse {
        success: true,
        data: Analysis {
            prediction,
            health_assessment,
            maintenance_priority,
        },
    }))
}

/// Assess a list of readings
///
/// Elements that are not readings at all become error records in place,
/// alongside those the engine rejects.
pub async fn predict_batch(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<BatchResponse>, ApiError> {
    let items = match parse_body(&body)? {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(ApiError::BadRequest("Data must be a list".into())),
            None => return Err(ApiError::BadRequest("No data provided".into())),
        },
        _ => return Err(ApiError::BadRequest("No data provided".into())),
    };

    // Count every element, including ones that will not parse
    let max = state.engine.batch_config().max_batch_size;
    if items.len() > max {
        return Err(InferenceError::BatchTooLarge {
            size: items.len(),
            max,
        }
        .into());
    }

    // Fail the whole call up front rather than after parsing
    state.engine.registry().current()?;
    metrics::histogram!("batch_size").record(items.len() as f64);

    let mut slots: Vec<Result<usize, ErrorRecord>> = Vec::with_capacity(items.len());
    let mut readings = Vec::with_capacity(items.len());
    for item in items {
        let aircraft_id = item
            .get("aircraft_id")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        match parse_reading(item) {
            Ok(raw) => {
                slots.push(Ok(readings.len()));
                readings.push(raw);
            }
            Err(e) => slots.push(Err(ErrorRecord {
                aircraft_id,
                error: e.to_string(),
                missing_fields: Vec::new(),
            })),
        }
    }

    let engine = state.engine.clone();
    let mut assessed = tokio::task::spawn_blocking(move || engine.predict_batch(&readings))
        .await
        .map_err(|e| ApiError::Internal(format!("Batch worker failed: {}", e)))??
        .into_iter()
        .map(Some)
        .collect::<Vec<_>>();

    let mut data = Vec::with_capacity(slots.len());
    for slot in slots {
        let outcome = match slot {
            Ok(i) => assessed[i]
                .take()
                .ok_or_else(|| ApiError::Internal("Batch result misaligned".into()))?,
            Err(rejected) => BatchOutcome::Error(rejected),
        };
        match &outcome {
            BatchOutcome::Assessment(a) => record(&state, a),
            BatchOutcome::Error(_) => {
                metrics::counter!("prediction_errors_total", "kind" => "batch_element").increment(1)
            }
        }
        data.push(outcome);
    }

    let summary = BatchSummary::from_outcomes(&data);
    debug!("Batch summary: {:?}", summary);

    Ok(Json(BatchResponse {
        success: true,
        summary,
        data,
    }))
}
