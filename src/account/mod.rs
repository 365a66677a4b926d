//! Account Store module
//!
//! Accounts keyed by identity, each behind its own lock. This is the only
//! place balances, points and tiers live.

pub mod error;
pub mod models;
pub mod store;
pub mod validation;

pub use error::StoreError;
pub use models::Account;
pub use store::{AccountHandle, AccountStore, lock_pair};
pub use validation::{ValidationError, validate_card_number, validate_identity};
