//! Gateway types module
//!
//! ## Input Types
//! - [`AmountInput`]: client amount as string or number
//! - [`ValidatedJson`]: Axum extractor running `validator` rules
//!
//! ## Output Types
//! - [`DisplayAmount`]: Type-safe formatted amount for API responses
//! - [`ApiResponse<T>`]: Unified API response wrapper
//!
//! ## Submodules
//! - [`money`]: Money types (AmountInput, DisplayAmount)
//! - [`request`]: Request DTOs
//! - [`response`]: Response envelope, errors and error codes
//! - [`wallet`]: Wallet response DTOs

pub mod money;
pub mod request;
pub mod response;
pub mod wallet;

// Re-export commonly used types at module root
pub use money::{AmountInput, DisplayAmount};
pub use request::{HistoryQuery, OpenAccountRequest, TransferRequest, ValidatedJson};
pub use response::{ApiError, ApiResponse, ApiResult, error_codes, ok};
pub use wallet::{
    AccountOpenedData, AccountSummaryData, CardData, CardViewData, HistoryEntryData,
    HistoryPageData, TransferData,
};
