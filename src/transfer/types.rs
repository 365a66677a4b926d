//! Transfer result types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::core_types::{AccountId, Tier, TransferId};

/// Outcome of a committed transfer, as seen by the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferResult {
    pub transfer_id: TransferId,
    pub sender: AccountId,
    pub receiver: AccountId,
    /// Face amount credited to the receiver
    pub sent: Decimal,
    pub commission: Decimal,
    /// `sent + commission`, debited from the sender
    pub total_spent: Decimal,
    /// Sender's balance after the transfer
    pub new_balance: Decimal,
    pub earned_points: u64,
    /// Sender's tier after the transfer
    pub new_tier: Tier,
    pub timestamp: DateTime<Utc>,
}
