//! Loyalty Wallet - balance-transfer ledger for loyalty cards
//!
//! Accounts hold a balance, loyalty points and a tier. Transfers between
//! accounts charge the sender a tier-dependent commission, earn the sender
//! points, and are recorded as paired ledger entries.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (AccountId, TransferId, Tier, etc.)
//! - [`money`] - Amount parsing, rounding and display
//! - [`tier`] - Points → tier → commission rate
//! - [`account`] - Account store with per-account locks
//! - [`card`] - Card registry (unique card numbers)
//! - [`ledger`] - Append-only transfer audit log
//! - [`transfer`] - Transfer executor (the only path that moves money)
//! - [`journal`] - Write-ahead journal and replay
//! - [`wallet`] - Facade over all of the above
//! - [`gateway`] - HTTP binding (axum)

// Core types - must be first!
pub mod core_types;

// Ambient
pub mod config;
pub mod logging;

// Domain
pub mod account;
pub mod card;
pub mod journal;
pub mod ledger;
pub mod money;
pub mod tier;
pub mod transfer;
pub mod wallet;

// Outer surface
pub mod gateway;

// Convenient re-exports at crate root
pub use account::{Account, AccountStore, StoreError};
pub use card::{Card, CardError, CardRegistry};
pub use core_types::{AccountId, CardNumber, Direction, SeqNum, Tier, TransferId};
pub use ledger::{HistoryPage, Ledger, LedgerEntry, LedgerError};
pub use tier::TierPolicy;
pub use transfer::{TransferError, TransferExecutor, TransferResult};
pub use wallet::{AccountOpened, AccountSummary, CardView, Wallet, WalletError};
