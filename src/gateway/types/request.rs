//! Request DTOs and the validating JSON extractor

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::money::AmountInput;
use super::response::ApiError;

/// Largest history page a client may ask for
pub const MAX_HISTORY_LIMIT: usize = 100;
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Open account request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OpenAccountRequest {
    /// Unique account identity
    #[validate(length(min = 3, max = 32))]
    #[schema(example = "alice")]
    pub identity: String,
}

/// Transfer request
///
/// `receiver` is an account identity or a card number.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferRequest {
    #[validate(length(min = 1, max = 64))]
    #[schema(example = "VY-4821-0937")]
    pub receiver: String,
    /// Face amount, string or number, at most two decimal places
    #[schema(value_type = String, example = "10.00")]
    pub amount: AmountInput,
}

/// History query
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// `next_cursor` from the previous page
    pub cursor: Option<u64>,
    /// Page size (1-100, default 20)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

impl HistoryQuery {
    pub fn limit(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT)
    }
}

// ============================================================================
// ValidatedJson: Axum Framework Integration
// ============================================================================

/// JSON body that has passed its `validator` rules.
///
/// Rejections use the unified response envelope, so handlers never see
/// malformed or out-of-range input.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value): Json<T> = Json::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;

        value
            .validate()
            .map_err(|e| ApiError::bad_request(e.to_string()))?;

        Ok(ValidatedJson(value))
    }
}
