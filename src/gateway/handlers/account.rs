//! Account handlers (open, summary)

use std::sync::Arc;

use axum::{Extension, extract::State};
use tracing::debug;

use super::super::middleware::CallerIdentity;
use super::super::state::AppState;
use super::super::types::{
    AccountOpenedData, AccountSummaryData, ApiResult, OpenAccountRequest, ValidatedJson, ok,
};

/// Open an account
///
/// POST /api/v1/accounts
///
/// Creates the account with the configured starting balance and issues its
/// first card. Called by the registration flow.
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = OpenAccountRequest,
    responses(
        (status = 200, description = "Account opened", body = AccountOpenedData, content_type = "application/json"),
        (status = 400, description = "Invalid identity"),
        (status = 409, description = "Identity already taken"),
        (status = 503, description = "Storage unavailable")
    ),
    tag = "Account"
)]
pub async fn open_account(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<OpenAccountRequest>,
) -> ApiResult<AccountOpenedData> {
    let minor_units = state.minor_units();
    let opened = state
        .run_blocking(move |wallet| wallet.open_account(&req.identity))
        .await?;
    ok(AccountOpenedData::new(opened, minor_units))
}

/// Caller's account summary
///
/// GET /api/v1/private/account
#[utoipa::path(
    get,
    path = "/api/v1/private/account",
    responses(
        (status = 200, description = "Account summary", body = AccountSummaryData, content_type = "application/json"),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Account not found")
    ),
    security(("wallet_account" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<AccountSummaryData> {
    debug!(identity = %caller.0, "Account summary");
    let summary = state.wallet.account_summary(&caller.0)?;
    ok(AccountSummaryData::new(summary, state.minor_units()))
}
