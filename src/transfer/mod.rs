//! Transfer Executor
//!
//! The only path that moves money between accounts.
//!
//! # Commit sequence
//!
//! ```text
//! validate amount → resolve sender/receiver → lock pair (ascending identity)
//!   → commission, sufficiency check → successor states → ledger pair check
//!   → journal TransferCommitted → assign successors → append ledger pair
//! ```
//!
//! # Safety Invariants
//!
//! 1. **Check-and-debit under one lock**: the sufficiency check and the debit
//!    happen while both account locks are held.
//! 2. **Persist-before-apply**: the journal record is written before any
//!    in-memory state changes; a failed append aborts with no visible effect.
//! 3. **Nothing fails after the journal**: every fallible step runs before
//!    the append, so a journaled transfer is always fully applied.

pub mod error;
pub mod executor;
pub mod types;

pub use error::TransferError;
pub use executor::TransferExecutor;
pub use types::TransferResult;
