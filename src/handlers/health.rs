use axum::extract::State;
use serde::Serialize;

use crate::extract::Json;
use crate::model::ModelInfo;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model: ModelInfo,
}

/// Liveness plus a description of the loaded model
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.model.info(),
    })
}
