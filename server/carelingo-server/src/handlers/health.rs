use std::collections::HashMap;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub checks: HashMap<String, String>,
}

/// Version information response.
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
    pub features: Vec<String>,
}

/// Health check handler.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthResponse>>, ApiError> {
    let mut checks = HashMap::new();
    checks.insert(
        "secure_store".to_string(),
        if state.store.has_key() {
            "ready".to_string()
        } else {
            "keyless".to_string()
        },
    );
    checks.insert("pipeline".to_string(), "ready".to_string());

    let response = HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        checks,
    };

    Ok(Json(api_success(response)))
}

/// Version information handler.
pub async fn version_info(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<VersionResponse>>, ApiError> {
    let response = VersionResponse {
        name: state.config.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        features: vec![
            "sealed-artifacts".to_string(),
            "medical-terminology-enhancement".to_string(),
            "translation".to_string(),
            "speech-synthesis".to_string(),
        ],
    };

    Ok(Json(api_success(response)))
}
