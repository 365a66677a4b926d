//! Account store errors

use rust_decimal::Decimal;
use thiserror::Error;

use super::validation::ValidationError;
use crate::core_types::AccountId;
use crate::journal::JournalError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    #[error("Account already exists: {0}")]
    AlreadyExists(AccountId),

    #[error("Invalid identity: {0}")]
    InvalidIdentity(#[from] ValidationError),

    #[error("Starting balance must not be negative: {0}")]
    NegativeStartingBalance(Decimal),

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Points would go negative: {points} + ({delta})")]
    PointsUnderflow { points: u64, delta: i64 },

    #[error("Cannot lock account {0} twice")]
    SameAccount(AccountId),

    #[error("Amount would cause overflow")]
    Overflow,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "ACCOUNT_NOT_FOUND",
            StoreError::AlreadyExists(_) => "ACCOUNT_EXISTS",
            StoreError::InvalidIdentity(_) => "INVALID_IDENTITY",
            StoreError::NegativeStartingBalance(_) => "INVALID_AMOUNT",
            StoreError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            StoreError::PointsUnderflow { .. } => "POINTS_UNDERFLOW",
            StoreError::SameAccount(_) => "SAME_ACCOUNT",
            StoreError::Overflow => "OVERFLOW",
            StoreError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 404,
            StoreError::AlreadyExists(_) => 409,
            StoreError::InvalidIdentity(_)
            | StoreError::NegativeStartingBalance(_)
            | StoreError::SameAccount(_)
            | StoreError::Overflow => 400,
            StoreError::InsufficientFunds { .. } | StoreError::PointsUnderflow { .. } => 422,
            StoreError::StorageUnavailable(_) => 503,
        }
    }
}

impl From<JournalError> for StoreError {
    fn from(e: JournalError) -> Self {
        StoreError::StorageUnavailable(e.to_string())
    }
}
