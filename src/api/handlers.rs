// ============================================================
// Layer 1 — HTTP Handlers
// ============================================================
// Thin adapters between axum and the PredictionService.
// Each handler extracts, delegates, and wraps the result in
// JSON; no business logic lives here.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::application::prediction_service::{
    FormOptions, HealthReport, PredictionService, APP_NAME,
};
use crate::domain::house::HouseFeaturesInput;
use crate::domain::prediction::{ModelInfo, PredictionResult};

pub type SharedService = Arc<PredictionService>;

/// POST /predict
///
/// A body that is not valid JSON, or misses/mistypes a field, is
/// reported as a 400 like any other validation failure.
pub async fn predict(
    State(service): State<SharedService>,
    payload:        Result<Json<HouseFeaturesInput>, JsonRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let debug = service.config().debug;

    let Json(input) = payload.map_err(|rejection| ApiError::invalid(rejection.body_text()))?;
    let features    = input
        .validate()
        .map_err(|e| ApiError::from_service(e.into(), debug))?;

    let result = service
        .predict(features)
        .map_err(|e| ApiError::from_service(e, debug))?;
    Ok(Json(result))
}

/// GET /health
pub async fn health(State(service): State<SharedService>) -> Json<HealthReport> {
    Json(service.health())
}

/// GET /model-info
pub async fn model_info(State(service): State<SharedService>) -> Json<ModelInfo> {
    Json(service.model_info())
}

/// GET /options
pub async fn options(State(service): State<SharedService>) -> Json<FormOptions> {
    Json(service.options().clone())
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "app":    APP_NAME,
        "status": "active",
        "health": "/api/v1/health",
    }))
}
