//! Risk prediction handler

use axum::{extract::State, Json};

use crate::{AppState, AppResult};
use crate::middleware::clinical::ClinicalPayload;
use crate::models::RiskAssessment;

/// Score one patient. Inference runs on the blocking pool and is never
/// retried; the same input against the same artifact fails the same way.
pub async fn predict(
    State(state): State<AppState>,
    ClinicalPayload(input): ClinicalPayload,
) -> AppResult<Json<RiskAssessment>> {
    let features = input.to_features();

    let model = state.model.clone();
    let distribution = tokio::task::spawn_blocking(move || model.score_risk(&features)).await??;

    let assessment = RiskAssessment::from_distribution(
        &input,
        &distribution,
        &state.thresholds,
        state.config.include_mock_wearable,
    );

    tracing::debug!(
        "Assessed {} (p={:.3})",
        assessment.risk_level,
        distribution.positive
    );

    Ok(Json(assessment))
}
