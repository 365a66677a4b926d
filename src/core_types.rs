//! Core types used throughout the wallet
//!
//! Identity aliases plus the small enums shared by the account store,
//! the ledger and the gateway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account identity - unique, immutable after the account is opened.
///
/// The session layer resolves the caller to one of these before any
/// wallet operation runs.
pub type AccountId = String;

/// Public card number, e.g. `VY-4821-0937`.
pub type CardNumber = String;

/// Global ledger insertion sequence
pub type SeqNum = u64;

/// Transfer ID - ULID shared by the two ledger rows of one transfer.
///
/// Sortable by creation time, no coordination needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransferId(ulid::Ulid);

impl TransferId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Raw 128-bit value, used by the journal encoding
    pub fn as_u128(&self) -> u128 {
        self.0.0
    }

    pub fn from_u128(raw: u128) -> Self {
        Self(ulid::Ulid(raw))
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TransferId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Loyalty tier, derived from accumulated points.
///
/// Ordered: `Base < Mid < Top`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Tier {
    Base = 0,
    Mid = 1,
    Top = 2,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Base => "BASE",
            Tier::Mid => "MID",
            Tier::Top => "TOP",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side of a transfer as seen by one account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outgoing => "outgoing",
            Direction::Incoming => "incoming",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
