//! Transfer and history handlers

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Query, State},
};
use validator::Validate;

use super::super::middleware::CallerIdentity;
use super::super::state::AppState;
use super::super::types::{
    ApiError, ApiResult, HistoryPageData, HistoryQuery, TransferData, TransferRequest,
    ValidatedJson, ok,
};

/// Transfer from the caller to another account
///
/// POST /api/v1/private/transfer
///
/// The receiver is an account identity or a card number. The sender pays
/// a commission on top of the amount at their tier's rate.
#[utoipa::path(
    post,
    path = "/api/v1/private/transfer",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer committed", body = TransferData, content_type = "application/json"),
        (status = 400, description = "Invalid amount or self-transfer"),
        (status = 401, description = "Missing or unknown caller identity"),
        (status = 404, description = "Receiver not found"),
        (status = 422, description = "Insufficient funds"),
        (status = 503, description = "Storage unavailable")
    ),
    security(("wallet_account" = [])),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    ValidatedJson(req): ValidatedJson<TransferRequest>,
) -> ApiResult<TransferData> {
    let amount = req.amount.as_text();
    let receiver = req.receiver;
    let result = state
        .run_blocking(move |wallet| wallet.transfer(&caller.0, &receiver, &amount))
        .await?;
    ok(TransferData::new(result, state.minor_units()))
}

/// Caller's transfer history, newest first
///
/// GET /api/v1/private/history?cursor=&limit=
#[utoipa::path(
    get,
    path = "/api/v1/private/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "History page", body = HistoryPageData, content_type = "application/json"),
        (status = 400, description = "Invalid cursor or limit"),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Account not found")
    ),
    security(("wallet_account" = [])),
    tag = "Transfer"
)]
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<HistoryPageData> {
    query
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let page = state
        .wallet
        .history_page(&caller.0, query.cursor, query.limit())?;
    ok(HistoryPageData::new(page, state.minor_units()))
}
