//! Service identity and health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use crate::model::EngineStatus;

#[derive(Serialize)]
pub struct HomeResponse {
    message: &'static str,
    service: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    model: EngineStatus,
}

pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        message: "HealthAI Guardian – Live for Chronic Disease Prediction",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        model: state.model.status(),
    })
}
