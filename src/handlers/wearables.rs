//! Mock wearables handler

use axum::Json;

use crate::models::MockWearableData;

pub async fn mock() -> Json<MockWearableData> {
    Json(MockWearableData::sample())
}
