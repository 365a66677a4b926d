//! Wallet facade
//!
//! Wires the account store, card registry, ledger and transfer executor
//! together behind the operations the outside world calls. Every operation
//! takes an already-resolved caller identity; authentication is somebody
//! else's job.
//!
//! On [`Wallet::open`] with the journal enabled, every record on disk is
//! replayed (without re-journaling) before the wallet accepts new work.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

use crate::account::validation::looks_like_card_number;
use crate::account::{AccountStore, StoreError};
use crate::card::{Card, CardError, CardNumberSource, CardRegistry, RandomCardNumbers};
use crate::config::{AppConfig, WalletConfig};
use crate::core_types::{AccountId, CardNumber, SeqNum, Tier};
use crate::journal::{FileJournal, Journal, JournalError, JournalRecord, NoopJournal};
use crate::ledger::{HistoryPage, Ledger, LedgerEntry, LedgerError};
use crate::money::{MoneyError, parse_amount};
use crate::tier::{TierConfigError, TierPolicy};
use crate::transfer::{TransferError, TransferExecutor, TransferResult};

/// Largest supported minor-unit precision
const MAX_MINOR_UNITS: u32 = 8;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Card(#[from] CardError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error("Invalid amount: {0}")]
    Money(#[from] MoneyError),

    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),

    #[error("Invalid tier configuration: {0}")]
    TierConfig(#[from] TierConfigError),

    #[error("Invalid wallet configuration: {0}")]
    InvalidConfig(String),

    #[error("Journal replay failed at record {index}: {reason}")]
    Replay { index: usize, reason: String },
}

impl WalletError {
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::Store(e) => e.code(),
            WalletError::Card(e) => e.code(),
            WalletError::Ledger(e) => e.code(),
            WalletError::Transfer(e) => e.code(),
            WalletError::Money(_) => "INVALID_AMOUNT",
            WalletError::Journal(_) => "STORAGE_UNAVAILABLE",
            WalletError::TierConfig(_) | WalletError::InvalidConfig(_) => "INVALID_CONFIG",
            WalletError::Replay { .. } => "REPLAY_FAILED",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            WalletError::Store(e) => e.http_status(),
            WalletError::Card(e) => e.http_status(),
            WalletError::Ledger(e) => e.http_status(),
            WalletError::Transfer(e) => e.http_status(),
            WalletError::Money(_) => 400,
            WalletError::Journal(_) => 503,
            WalletError::TierConfig(_)
            | WalletError::InvalidConfig(_)
            | WalletError::Replay { .. } => 500,
        }
    }
}

/// Balance, points, tier and cards of one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSummary {
    pub identity: AccountId,
    pub balance: Decimal,
    pub points: u64,
    pub tier: Tier,
    pub cards: Vec<CardNumber>,
    pub currency: String,
}

/// Public view of a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardView {
    pub number: CardNumber,
    pub owner: AccountId,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOpened {
    pub summary: AccountSummary,
    pub card: Card,
}

pub struct Wallet {
    config: WalletConfig,
    accounts: Arc<AccountStore>,
    cards: CardRegistry,
    ledger: Arc<Ledger>,
    executor: TransferExecutor,
}

impl Wallet {
    /// Build the wallet from configuration, replaying the journal when it
    /// is enabled.
    pub fn open(config: &AppConfig) -> Result<Self, WalletError> {
        if !config.journal.enabled {
            return Self::in_memory(config);
        }

        let (journal, records) = FileJournal::open(&config.journal.path, config.journal.sync_writes)?;
        let wallet = Self::with_journal(config, Arc::new(journal), Box::new(RandomCardNumbers))?;
        wallet.replay(records)?;
        Ok(wallet)
    }

    /// No persistence
    pub fn in_memory(config: &AppConfig) -> Result<Self, WalletError> {
        Self::with_journal(config, Arc::new(NoopJournal::new()), Box::new(RandomCardNumbers))
    }

    pub fn with_journal(
        config: &AppConfig,
        journal: Arc<dyn Journal>,
        card_source: Box<dyn CardNumberSource>,
    ) -> Result<Self, WalletError> {
        validate_wallet_config(&config.wallet)?;
        let policy = TierPolicy::new(&config.tiers)?;

        let accounts = Arc::new(AccountStore::new(policy, journal.clone()));
        let ledger = Arc::new(Ledger::new());
        let cards =
            CardRegistry::with_source(accounts.clone(), &config.cards, journal.clone(), card_source);
        let executor =
            TransferExecutor::new(accounts.clone(), ledger.clone(), journal, &config.wallet);

        Ok(Self {
            config: config.wallet.clone(),
            accounts,
            cards,
            ledger,
            executor,
        })
    }

    fn replay(&self, records: Vec<JournalRecord>) -> Result<(), WalletError> {
        let total = records.len();
        let mut transfers = 0usize;

        for (index, record) in records.into_iter().enumerate() {
            let replay_err = |reason: String| WalletError::Replay { index, reason };
            match record {
                JournalRecord::AccountOpened(p) => self
                    .accounts
                    .restore_opened(&p.identity, p.starting_balance, p.opened_at)
                    .map_err(|e| replay_err(e.to_string()))?,
                JournalRecord::CardIssued(p) => self
                    .cards
                    .restore(Card {
                        number: p.number,
                        owner: p.owner,
                        issued_at: p.issued_at,
                    })
                    .map_err(|e| replay_err(e.to_string()))?,
                JournalRecord::BalanceAdjusted(p) => self
                    .accounts
                    .restore_delta(&p.identity, p.balance_delta, p.points_delta)
                    .map_err(|e| replay_err(e.to_string()))?,
                JournalRecord::TransferCommitted(p) => {
                    self.executor
                        .restore(&p)
                        .map_err(|e| replay_err(e.to_string()))?;
                    transfers += 1;
                }
            }
        }

        info!(
            records = total,
            accounts = self.accounts.len(),
            cards = self.cards.len(),
            transfers = transfers,
            "Journal replayed"
        );
        Ok(())
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Create an account with the configured starting balance and issue its
    /// first card.
    ///
    /// If card issuance fails the account still exists; a later
    /// [`Wallet::issue_card`] can retry.
    pub fn open_account(&self, identity: &str) -> Result<AccountOpened, WalletError> {
        self.accounts
            .create_account(identity, self.config.starting_balance)?;
        let card = self.cards.issue_card(identity)?;
        let summary = self.account_summary(identity)?;
        Ok(AccountOpened { summary, card })
    }

    /// Transfer a client-supplied amount. `receiver_ref` is an account
    /// identity, or a card number resolved to its owner.
    pub fn transfer(
        &self,
        sender: &str,
        receiver_ref: &str,
        amount: &str,
    ) -> Result<TransferResult, WalletError> {
        let amount = parse_amount(amount, self.config.minor_units).map_err(TransferError::from)?;
        self.transfer_amount(sender, receiver_ref, amount)
    }

    /// Both references are trimmed here; the executor sees exact identities.
    pub fn transfer_amount(
        &self,
        sender: &str,
        receiver_ref: &str,
        amount: Decimal,
    ) -> Result<TransferResult, WalletError> {
        let sender = sender.trim();
        if !self.accounts.contains(sender) {
            return Err(TransferError::SenderNotFound(sender.to_string()).into());
        }
        let receiver = self.resolve_receiver(receiver_ref.trim())?;
        Ok(self.executor.transfer(sender, &receiver, amount)?)
    }

    /// Card-shaped references go only through the card registry; identities
    /// can never take that shape.
    fn resolve_receiver(&self, receiver_ref: &str) -> Result<AccountId, TransferError> {
        if looks_like_card_number(receiver_ref) {
            let card = self
                .cards
                .resolve_by_number(receiver_ref)
                .map_err(|_| TransferError::ReceiverNotFound(receiver_ref.to_string()))?;
            debug!(card = receiver_ref, owner = %card.owner, "Receiver resolved by card");
            return Ok(card.owner);
        }
        if self.accounts.contains(receiver_ref) {
            return Ok(receiver_ref.to_string());
        }
        Err(TransferError::ReceiverNotFound(receiver_ref.to_string()))
    }

    /// Full history, newest first
    pub fn history_of(&self, identity: &str) -> Result<Vec<LedgerEntry>, WalletError> {
        self.ensure_account(identity)?;
        Ok(self.ledger.history_of(identity))
    }

    pub fn history_page(
        &self,
        identity: &str,
        cursor: Option<SeqNum>,
        limit: usize,
    ) -> Result<HistoryPage, WalletError> {
        self.ensure_account(identity)?;
        Ok(self.ledger.history_page(identity, cursor, limit)?)
    }

    pub fn issue_card(&self, identity: &str) -> Result<Card, WalletError> {
        Ok(self.cards.issue_card(identity)?)
    }

    /// Public lookup, no caller identity needed
    pub fn resolve_card(&self, number: &str) -> Result<CardView, WalletError> {
        let card = self.cards.resolve_by_number(number.trim())?;
        let owner = self.accounts.get(&card.owner)?;
        Ok(CardView {
            number: card.number,
            owner: card.owner,
            tier: owner.tier(),
        })
    }

    pub fn account_summary(&self, identity: &str) -> Result<AccountSummary, WalletError> {
        let account = self.accounts.get(identity)?;
        let cards = self
            .cards
            .cards_of(identity)
            .into_iter()
            .map(|c| c.number)
            .collect();
        Ok(AccountSummary {
            identity: account.identity().to_string(),
            balance: account.balance(),
            points: account.points(),
            tier: account.tier(),
            cards,
            currency: self.config.currency.clone(),
        })
    }

    /// Consistent sum of every balance
    pub fn total_balance(&self) -> Decimal {
        self.accounts.total_balance()
    }

    fn ensure_account(&self, identity: &str) -> Result<(), StoreError> {
        if self.accounts.contains(identity) {
            Ok(())
        } else {
            Err(StoreError::NotFound(identity.to_string()))
        }
    }
}

fn validate_wallet_config(config: &WalletConfig) -> Result<(), WalletError> {
    if config.minor_units > MAX_MINOR_UNITS {
        return Err(WalletError::InvalidConfig(format!(
            "minor_units {} exceeds {}",
            config.minor_units, MAX_MINOR_UNITS
        )));
    }
    if config.points_divisor <= Decimal::ZERO {
        return Err(WalletError::InvalidConfig(format!(
            "points_divisor must be positive, got {}",
            config.points_divisor
        )));
    }
    if config.starting_balance < Decimal::ZERO {
        return Err(WalletError::InvalidConfig(format!(
            "starting_balance must not be negative, got {}",
            config.starting_balance
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayConfig;

    fn app_config() -> AppConfig {
        AppConfig {
            log_level: "info".into(),
            log_dir: "./logs".into(),
            log_file: "wallet.log".into(),
            use_json: false,
            rotation: "never".into(),
            gateway: GatewayConfig {
                host: "127.0.0.1".into(),
                port: 0,
            },
            wallet: WalletConfig::default(),
            tiers: Default::default(),
            cards: Default::default(),
            journal: Default::default(),
        }
    }

    fn wallet() -> Wallet {
        Wallet::in_memory(&app_config()).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_open_account_issues_card() {
        let w = wallet();
        let opened = w.open_account("alice").unwrap();
        assert_eq!(opened.summary.balance, dec("20"));
        assert_eq!(opened.summary.tier, Tier::Base);
        assert_eq!(opened.summary.currency, "V$");
        assert_eq!(opened.summary.cards, vec![opened.card.number.clone()]);
        assert!(opened.card.number.starts_with("VY-"));

        assert!(matches!(
            w.open_account("alice"),
            Err(WalletError::Store(StoreError::AlreadyExists(_)))
        ));
    }

    #[test]
    fn test_transfer_by_identity_and_card() {
        let w = wallet();
        w.open_account("alice").unwrap();
        let bob = w.open_account("bob").unwrap();

        let r = w.transfer("alice", "bob", "5").unwrap();
        assert_eq!(r.receiver, "bob");
        let r = w.transfer("alice", &bob.card.number, "5").unwrap();
        assert_eq!(r.receiver, "bob");
        assert_eq!(w.account_summary("bob").unwrap().balance, dec("30"));
    }

    #[test]
    fn test_transfer_errors() {
        let w = wallet();
        w.open_account("alice").unwrap();
        w.open_account("bob").unwrap();

        let err = w.transfer("alice", "bob", "abc").unwrap_err();
        assert_eq!(err.code(), "INVALID_AMOUNT");
        assert!(matches!(
            err,
            WalletError::Transfer(TransferError::InvalidAmount(_))
        ));

        let err = w.transfer("alice", "VY-0000-0000", "1").unwrap_err();
        assert_eq!(err.code(), "RECEIVER_NOT_FOUND");

        let err = w.transfer("ghost", "bob", "1").unwrap_err();
        assert_eq!(err.code(), "SENDER_NOT_FOUND");

        let err = w.transfer("alice", "alice", "1").unwrap_err();
        assert_eq!(err.code(), "SAME_ACCOUNT");

        let err = w.transfer("alice", "bob", "30").unwrap_err();
        assert_eq!(err.code(), "INSUFFICIENT_FUNDS");
        assert_eq!(err.http_status(), 422);
    }

    #[test]
    fn test_card_shaped_identity_cannot_capture_card_transfers() {
        let w = wallet();
        let alice = w.open_account("alice").unwrap();
        w.open_account("carol").unwrap();

        let err = w.open_account(&alice.card.number).unwrap_err();
        assert_eq!(err.code(), "INVALID_IDENTITY");
        assert!(!w.accounts().contains(&alice.card.number));

        let r = w.transfer("carol", &alice.card.number, "5").unwrap();
        assert_eq!(r.receiver, "alice");
        assert_eq!(w.account_summary("alice").unwrap().balance, dec("25"));
    }

    #[test]
    fn test_references_are_trimmed() {
        let w = wallet();
        w.open_account("alice").unwrap();
        let bob = w.open_account("bob").unwrap();

        let r = w.transfer("  alice ", " bob\t", "1").unwrap();
        assert_eq!(r.sender, "alice");
        assert_eq!(r.receiver, "bob");

        let r = w.transfer(" alice", &format!(" {} ", bob.card.number), "1").unwrap();
        assert_eq!(r.receiver, "bob");
    }

    #[test]
    fn test_resolve_card() {
        let w = wallet();
        let opened = w.open_account("alice").unwrap();
        let view = w.resolve_card(&opened.card.number).unwrap();
        assert_eq!(view.owner, "alice");
        assert_eq!(view.tier, Tier::Base);

        let err = w.resolve_card("VY-0000-0000").unwrap_err();
        assert_eq!(err.code(), "CARD_NOT_FOUND");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn test_summary_is_stable_without_transfers() {
        let w = wallet();
        w.open_account("alice").unwrap();
        w.issue_card("alice").unwrap();
        let a = w.account_summary("alice").unwrap();
        let b = w.account_summary("alice").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.cards.len(), 2);
    }

    #[test]
    fn test_history_requires_account() {
        let w = wallet();
        assert!(matches!(
            w.history_of("ghost"),
            Err(WalletError::Store(StoreError::NotFound(_)))
        ));
        w.open_account("alice").unwrap();
        assert!(w.history_of("alice").unwrap().is_empty());
        assert!(w.history_page("alice", None, 10).unwrap().entries.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = app_config();
        config.wallet.points_divisor = Decimal::ZERO;
        assert!(matches!(
            Wallet::in_memory(&config),
            Err(WalletError::InvalidConfig(_))
        ));

        let mut config = app_config();
        config.tiers.mid_threshold = 5000;
        assert!(matches!(
            Wallet::in_memory(&config),
            Err(WalletError::TierConfig(_))
        ));
    }
}
