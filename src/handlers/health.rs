use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::crypto::MessageResponse;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub timestamp: i64,
}

pub async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the API!".to_string(),
    })
}

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Server is running".to_string(),
        timestamp: Utc::now().timestamp_millis(),
    })
}
