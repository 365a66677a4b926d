//! Card Registry
//!
//! Maps public card numbers (`VY-4821-0937`) to their owning account.
//! A card number is semi-public, like a loyalty-card barcode: anyone may
//! resolve it, and transfers may address a receiver by card.
//!
//! Numbers come from a bounded random space, so issuance is
//! generate → format check → insert-if-absent, retried up to
//! `max_attempts` times before giving up with `AllocationExhausted`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::account::validation::{ValidationError, looks_like_card_number, validate_card_number};
use crate::account::AccountStore;
use crate::config::CardConfig;
use crate::core_types::{AccountId, CardNumber};
use crate::journal::{CardIssuedPayload, Journal, JournalError, JournalRecord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("Card not found: {0}")]
    NotFound(CardNumber),

    #[error("Card owner not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Card number rejected: {0}")]
    InvalidNumber(#[from] ValidationError),

    #[error("Card number already issued: {0}")]
    DuplicateNumber(CardNumber),

    #[error("Could not allocate a unique card number after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl CardError {
    pub fn code(&self) -> &'static str {
        match self {
            CardError::NotFound(_) => "CARD_NOT_FOUND",
            CardError::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            CardError::InvalidNumber(_) => "INVALID_CARD_NUMBER",
            CardError::DuplicateNumber(_) => "DUPLICATE_CARD",
            CardError::AllocationExhausted { .. } => "ALLOCATION_EXHAUSTED",
            CardError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            CardError::NotFound(_) | CardError::AccountNotFound(_) => 404,
            CardError::InvalidNumber(_) => 400,
            CardError::DuplicateNumber(_) | CardError::AllocationExhausted { .. } => 500,
            CardError::StorageUnavailable(_) => 503,
        }
    }
}

impl From<JournalError> for CardError {
    fn from(e: JournalError) -> Self {
        CardError::StorageUnavailable(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub number: CardNumber,
    pub owner: AccountId,
    pub issued_at: DateTime<Utc>,
}

/// Candidate number generator. Candidates are checked, so a generator may
/// repeat itself or even produce malformed numbers.
pub trait CardNumberSource: Send + Sync {
    fn next_number(&self, prefix: &str) -> CardNumber;
}

/// `<PREFIX>-dddd-dddd` with both groups in 1000..=9999
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCardNumbers;

impl CardNumberSource for RandomCardNumbers {
    fn next_number(&self, prefix: &str) -> CardNumber {
        let mut rng = rand::thread_rng();
        format!(
            "{}-{}-{}",
            prefix,
            rng.gen_range(1000..=9999),
            rng.gen_range(1000..=9999)
        )
    }
}

pub struct CardRegistry {
    accounts: Arc<AccountStore>,
    by_number: DashMap<CardNumber, Card>,
    by_owner: DashMap<AccountId, Vec<CardNumber>>,
    source: Box<dyn CardNumberSource>,
    prefix: String,
    max_attempts: u32,
    journal: Arc<dyn Journal>,
}

impl CardRegistry {
    pub fn new(accounts: Arc<AccountStore>, config: &CardConfig, journal: Arc<dyn Journal>) -> Self {
        Self::with_source(accounts, config, journal, Box::new(RandomCardNumbers))
    }

    pub fn with_source(
        accounts: Arc<AccountStore>,
        config: &CardConfig,
        journal: Arc<dyn Journal>,
        source: Box<dyn CardNumberSource>,
    ) -> Self {
        Self {
            accounts,
            by_number: DashMap::new(),
            by_owner: DashMap::new(),
            source,
            prefix: config.prefix.clone(),
            max_attempts: config.max_attempts.max(1),
            journal,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }

    /// Issue a new card to `owner`.
    ///
    /// # Errors
    /// - `AccountNotFound` if the owner does not exist
    /// - `AllocationExhausted` after `max_attempts` rejected candidates
    /// - `StorageUnavailable` if the journal append fails (no card issued)
    pub fn issue_card(&self, owner: &str) -> Result<Card, CardError> {
        if !self.accounts.contains(owner) {
            return Err(CardError::AccountNotFound(owner.to_string()));
        }

        for attempt in 1..=self.max_attempts {
            let candidate = self.source.next_number(&self.prefix);
            if let Err(e) = validate_card_number(&candidate, &self.prefix) {
                warn!(attempt = attempt, error = %e, "Generated malformed card number");
                continue;
            }

            let card = Card {
                number: candidate.clone(),
                owner: owner.to_string(),
                issued_at: Utc::now(),
            };

            // Shard lock released at the end of the match, before by_owner
            // is touched.
            let inserted = match self.by_number.entry(candidate) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    self.journal
                        .append(&JournalRecord::CardIssued(CardIssuedPayload {
                            number: card.number.clone(),
                            owner: card.owner.clone(),
                            issued_at: card.issued_at,
                        }))?;
                    slot.insert(card.clone());
                    true
                }
            };

            if !inserted {
                debug!(attempt = attempt, number = %card.number, "Card number collision");
                continue;
            }

            self.by_owner
                .entry(card.owner.clone())
                .or_default()
                .push(card.number.clone());

            info!(owner = owner, number = %card.number, attempt = attempt, "Card issued");
            return Ok(card);
        }

        warn!(owner = owner, attempts = self.max_attempts, "Card allocation exhausted");
        Err(CardError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }

    pub fn resolve_by_number(&self, number: &str) -> Result<Card, CardError> {
        self.by_number
            .get(number)
            .map(|c| c.value().clone())
            .ok_or_else(|| CardError::NotFound(number.to_string()))
    }

    /// Cards of `owner` in issue order; empty for unknown owners.
    pub fn cards_of(&self, owner: &str) -> Vec<Card> {
        // Copy the list out first: never hold a by_owner guard while reading
        // by_number.
        let numbers = self
            .by_owner
            .get(owner)
            .map(|n| n.value().clone())
            .unwrap_or_default();

        numbers
            .iter()
            .filter_map(|n| self.by_number.get(n).map(|c| c.value().clone()))
            .collect()
    }

    /// Journal replay (no journaling).
    ///
    /// Only the shape is checked: cards issued under an earlier prefix stay
    /// valid after the configured prefix changes.
    pub(crate) fn restore(&self, card: Card) -> Result<(), CardError> {
        if !looks_like_card_number(&card.number) {
            return Err(CardError::InvalidNumber(ValidationError::InvalidFormat {
                field: "card",
                value: card.number,
                expected: "<PREFIX>-dddd-dddd",
            }));
        }
        if !self.accounts.contains(&card.owner) {
            return Err(CardError::AccountNotFound(card.owner));
        }

        let (number, owner) = (card.number.clone(), card.owner.clone());
        match self.by_number.entry(card.number.clone()) {
            Entry::Occupied(_) => return Err(CardError::DuplicateNumber(card.number)),
            Entry::Vacant(slot) => {
                slot.insert(card);
            }
        }
        self.by_owner.entry(owner).or_default().push(number);
        Ok(())
    }
}
