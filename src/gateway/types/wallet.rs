//! Response DTOs for wallet operations
//!
//! Monetary fields are `DisplayAmount` strings, tiers are their upper-case
//! names, timestamps are RFC 3339.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::money::DisplayAmount;
use crate::card::Card;
use crate::core_types::SeqNum;
use crate::ledger::{HistoryPage, LedgerEntry};
use crate::transfer::TransferResult;
use crate::wallet::{AccountOpened, AccountSummary, CardView};

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountSummaryData {
    #[schema(example = "alice")]
    pub identity: String,
    #[schema(value_type = String, example = "20.00")]
    pub balance: DisplayAmount,
    pub points: u64,
    #[schema(example = "BASE")]
    pub tier: String,
    pub cards: Vec<String>,
    #[schema(example = "V$")]
    pub currency: String,
}

impl AccountSummaryData {
    pub fn new(summary: AccountSummary, minor_units: u32) -> Self {
        Self {
            identity: summary.identity,
            balance: DisplayAmount::new(summary.balance, minor_units),
            points: summary.points,
            tier: summary.tier.as_str().to_string(),
            cards: summary.cards,
            currency: summary.currency,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CardData {
    #[schema(example = "VY-4821-0937")]
    pub number: String,
    pub owner: String,
    pub issued_at: DateTime<Utc>,
}

impl From<Card> for CardData {
    fn from(card: Card) -> Self {
        Self {
            number: card.number,
            owner: card.owner,
            issued_at: card.issued_at,
        }
    }
}

/// Public card lookup result
#[derive(Debug, Serialize, ToSchema)]
pub struct CardViewData {
    pub number: String,
    pub owner: String,
    #[schema(example = "MID")]
    pub tier: String,
}

impl From<CardView> for CardViewData {
    fn from(view: CardView) -> Self {
        Self {
            number: view.number,
            owner: view.owner,
            tier: view.tier.as_str().to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccountOpenedData {
    pub account: AccountSummaryData,
    pub card: CardData,
}

impl AccountOpenedData {
    pub fn new(opened: AccountOpened, minor_units: u32) -> Self {
        Self {
            account: AccountSummaryData::new(opened.summary, minor_units),
            card: opened.card.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferData {
    #[schema(example = "01JD3ZK5R8X0Q4M9V7T2N6B1WC")]
    pub transfer_id: String,
    pub sender: String,
    pub receiver: String,
    #[schema(value_type = String, example = "10.00")]
    pub sent: DisplayAmount,
    #[schema(value_type = String, example = "0.20")]
    pub commission: DisplayAmount,
    #[schema(value_type = String, example = "10.20")]
    pub total_spent: DisplayAmount,
    #[schema(value_type = String, example = "9.80")]
    pub new_balance: DisplayAmount,
    pub earned_points: u64,
    #[schema(example = "BASE")]
    pub new_tier: String,
    pub timestamp: DateTime<Utc>,
}

impl TransferData {
    pub fn new(result: TransferResult, minor_units: u32) -> Self {
        Self {
            transfer_id: result.transfer_id.to_string(),
            sender: result.sender,
            receiver: result.receiver,
            sent: DisplayAmount::new(result.sent, minor_units),
            commission: DisplayAmount::new(result.commission, minor_units),
            total_spent: DisplayAmount::new(result.total_spent, minor_units),
            new_balance: DisplayAmount::new(result.new_balance, minor_units),
            earned_points: result.earned_points,
            new_tier: result.new_tier.as_str().to_string(),
            timestamp: result.timestamp,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntryData {
    pub seq: SeqNum,
    pub transfer_id: String,
    #[schema(example = "outgoing")]
    pub direction: String,
    pub counterparty: String,
    #[schema(value_type = String, example = "10.00")]
    pub amount: DisplayAmount,
    #[schema(value_type = String, example = "0.20")]
    pub commission: DisplayAmount,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntryData {
    pub fn new(entry: LedgerEntry, minor_units: u32) -> Self {
        Self {
            seq: entry.seq,
            transfer_id: entry.transfer_id.to_string(),
            direction: entry.direction.as_str().to_string(),
            counterparty: entry.counterparty,
            amount: DisplayAmount::new(entry.amount, minor_units),
            commission: DisplayAmount::new(entry.commission, minor_units),
            timestamp: entry.timestamp,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryPageData {
    pub entries: Vec<HistoryEntryData>,
    /// Pass back as `cursor` for the next page; absent on the last page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<SeqNum>,
}

impl HistoryPageData {
    pub fn new(page: HistoryPage, minor_units: u32) -> Self {
        Self {
            entries: page
                .entries
                .into_iter()
                .map(|e| HistoryEntryData::new(e, minor_units))
                .collect(),
            next_cursor: page.next_cursor,
        }
    }
}
