//! Money types for API boundary enforcement
//!
//! - `AmountInput`: client amount, accepted as a JSON string or number
//! - `DisplayAmount`: Type-safe output formatting

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::format_amount;

// ============================================================================
// AmountInput: string or number, parsed later by the wallet
// ============================================================================

/// Client amount.
///
/// Strings are passed through verbatim. Numbers are rendered with their
/// shortest exact representation, so `10.5` and `"10.5"` are equivalent.
/// All format and precision checks happen in `money::parse_amount`, never
/// here, so both shapes are held to the same rules.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    pub fn as_text(&self) -> String {
        match self {
            AmountInput::Text(s) => s.clone(),
            AmountInput::Number(n) => n.to_string(),
        }
    }
}

// ============================================================================
// DisplayAmount: Type-Safe Output for API Responses
// ============================================================================

/// Display amount for API responses - every monetary output goes through
/// `money::format_amount`, so it always carries exactly `minor_units`
/// decimal places.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayAmount(String);

impl DisplayAmount {
    pub(crate) fn new(value: Decimal, minor_units: u32) -> Self {
        Self(format_amount(value, minor_units))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for DisplayAmount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Always a string to preserve precision
        serializer.serialize_str(&self.0)
    }
}
