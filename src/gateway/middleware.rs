//! Caller identity middleware
//!
//! The wallet does no authentication itself. An upstream session layer
//! resolves the caller and forwards the identity in `X-Wallet-Account`;
//! this middleware lifts it into an `Extension<CallerIdentity>` for the
//! private routes.

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use super::types::ApiError;
use crate::account::validate_identity;
use crate::core_types::AccountId;

pub const CALLER_HEADER: &str = "x-wallet-account";

/// Already-authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(pub AccountId);

pub async fn caller_identity_middleware(
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identity = request
        .headers()
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Missing X-Wallet-Account header"))?;

    validate_identity(&identity).map_err(|e| ApiError::unauthorized(e.to_string()))?;

    request.extensions_mut().insert(CallerIdentity(identity));
    Ok(next.run(request).await)
}
