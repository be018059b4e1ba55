//! Clinical input extractor
//!
//! Fails closed: a body with any absent or non-numeric field never reaches
//! the model.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde_json::Value;

use crate::{AppState, AppError};
use crate::models::ClinicalInput;

/// Validated `ClinicalInput` taken from a JSON body
#[derive(Debug, Clone)]
pub struct ClinicalPayload(pub ClinicalInput);

#[async_trait]
impl FromRequest<AppState> for ClinicalPayload {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::InvalidBody {
                status: rejection.status(),
                message: rejection.body_text(),
            })?;

        let input = ClinicalInput::from_json(&body)?;

        if state.config.strict_ranges {
            input.check_ranges()?;
        }

        Ok(Self(input))
    }
}
