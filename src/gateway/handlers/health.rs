//! Health check handler

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Json, extract::State};
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::ApiResponse;

/// Build hash stamped by build.rs
pub const BUILD_HASH: &str = env!("WALLET_BUILD_HASH");

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(example = "a1b2c3d")]
    pub build: String,
    pub uptime_secs: u64,
    pub accounts: usize,
}

/// Health check endpoint
///
/// Liveness only: the wallet has no external dependency to probe.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
    ),
    tag = "System"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthResponse>> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    Json(ApiResponse::success(HealthResponse {
        timestamp_ms: now_ms,
        version: env!("CARGO_PKG_VERSION").to_string(),
        build: BUILD_HASH.to_string(),
        uptime_secs: state.uptime_secs(),
        accounts: state.wallet.accounts().len(),
    }))
}
