//! Transfer Error Types

use rust_decimal::Decimal;
use thiserror::Error;

use crate::core_types::AccountId;
use crate::money::MoneyError;

/// Transfer error types
///
/// Every variant is raised before any state is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] MoneyError),

    #[error("Sender and receiver cannot be the same account")]
    SelfTransfer,

    #[error("Amount would cause overflow")]
    Overflow,

    // === Account Errors ===
    #[error("Sender not found: {0}")]
    SenderNotFound(AccountId),

    #[error("Receiver not found: {0}")]
    ReceiverNotFound(String),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    // === System Errors ===
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Internal system error: {0}")]
    SystemError(String),
}

impl TransferError {
    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            TransferError::InvalidAmount(_) => "INVALID_AMOUNT",
            TransferError::SelfTransfer => "SAME_ACCOUNT",
            TransferError::Overflow => "OVERFLOW",
            TransferError::SenderNotFound(_) => "SENDER_NOT_FOUND",
            TransferError::ReceiverNotFound(_) => "RECEIVER_NOT_FOUND",
            TransferError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            TransferError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            TransferError::SystemError(_) => "SYSTEM_ERROR",
        }
    }

    /// Get HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            TransferError::InvalidAmount(_)
            | TransferError::SelfTransfer
            | TransferError::Overflow => 400,
            TransferError::SenderNotFound(_) => 401,
            TransferError::ReceiverNotFound(_) => 404,
            TransferError::InsufficientFunds { .. } => 422,
            TransferError::SystemError(_) => 500,
            TransferError::StorageUnavailable(_) => 503,
        }
    }
}
