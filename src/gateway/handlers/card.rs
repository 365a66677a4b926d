//! Card handlers (public lookup, issue)

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, State},
};

use super::super::middleware::CallerIdentity;
use super::super::state::AppState;
use super::super::types::{ApiResult, CardData, CardViewData, ok};

/// Resolve a card number to its owner and tier
///
/// GET /api/v1/public/card/{number}
///
/// No caller identity needed: a card number is semi-public, like a
/// loyalty-card barcode.
#[utoipa::path(
    get,
    path = "/api/v1/public/card/{number}",
    params(
        ("number" = String, Path, description = "Card number, e.g. VY-4821-0937")
    ),
    responses(
        (status = 200, description = "Card owner and tier", body = CardViewData, content_type = "application/json"),
        (status = 404, description = "Card not found")
    ),
    tag = "Card"
)]
pub async fn resolve_card(
    State(state): State<Arc<AppState>>,
    Path(number): Path<String>,
) -> ApiResult<CardViewData> {
    let view = state.wallet.resolve_card(&number)?;
    ok(view.into())
}

/// Issue an additional card to the caller
///
/// POST /api/v1/private/cards
#[utoipa::path(
    post,
    path = "/api/v1/private/cards",
    responses(
        (status = 200, description = "Card issued", body = CardData, content_type = "application/json"),
        (status = 401, description = "Missing caller identity"),
        (status = 404, description = "Account not found"),
        (status = 500, description = "Card number space exhausted"),
        (status = 503, description = "Storage unavailable")
    ),
    security(("wallet_account" = [])),
    tag = "Card"
)]
pub async fn issue_card(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<CardData> {
    let card = state
        .run_blocking(move |wallet| wallet.issue_card(&caller.0))
        .await?;
    ok(card.into())
}
