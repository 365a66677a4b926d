//! Ledger - Transfer audit log
//!
//! Every committed transfer is recorded as exactly two entries: one
//! `Outgoing` on the sender, one `Incoming` on the receiver. Entries are
//! append-only and never modified.
//!
//! `seq` is the global insertion order (1-based) and doubles as the
//! history cursor.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::core_types::{AccountId, Direction, SeqNum, TransferId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Entry pair has wrong directions")]
    DirectionMismatch,

    #[error("Entry pair amounts differ: {outgoing} vs {incoming}")]
    AmountMismatch { outgoing: Decimal, incoming: Decimal },

    #[error("Entry pair belongs to different transfers")]
    TransferIdMismatch,

    #[error("Entry pair timestamps differ")]
    TimestampMismatch,

    #[error("Entry pair identities are not swapped")]
    CounterpartyMismatch,

    #[error("Amount must be positive: {0}")]
    NonPositiveAmount(Decimal),

    #[error("Incoming entry must carry no commission: {0}")]
    IncomingCommission(Decimal),

    #[error("Unknown history cursor: {0}")]
    InvalidCursor(SeqNum),
}

impl LedgerError {
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidCursor(_) => "INVALID_CURSOR",
            _ => "LEDGER_PAIR_INVALID",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidCursor(_) => 400,
            _ => 500,
        }
    }
}

/// One side of one transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Assigned on append; 0 until then
    pub seq: SeqNum,
    pub transfer_id: TransferId,
    pub account: AccountId,
    /// Identity of the other side at the time of transfer
    pub counterparty: AccountId,
    pub direction: Direction,
    /// Face value, identical on both sides
    pub amount: Decimal,
    /// Charged to the sender; zero on the incoming side
    pub commission: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl LedgerEntry {
    /// Build the (outgoing, incoming) pair for one transfer
    pub fn transfer_pair(
        transfer_id: TransferId,
        sender: &str,
        receiver: &str,
        amount: Decimal,
        commission: Decimal,
        timestamp: DateTime<Utc>,
    ) -> (LedgerEntry, LedgerEntry) {
        let outgoing = LedgerEntry {
            seq: 0,
            transfer_id,
            account: sender.to_string(),
            counterparty: receiver.to_string(),
            direction: Direction::Outgoing,
            amount,
            commission,
            timestamp,
        };
        let incoming = LedgerEntry {
            seq: 0,
            transfer_id,
            account: receiver.to_string(),
            counterparty: sender.to_string(),
            direction: Direction::Incoming,
            amount,
            commission: Decimal::ZERO,
            timestamp,
        };
        (outgoing, incoming)
    }

    /// History order: newest first, later insert first on equal timestamps
    fn history_key(&self) -> (DateTime<Utc>, SeqNum) {
        (self.timestamp, self.seq)
    }
}

/// Check that two entries form a valid transfer pair
pub fn validate_pair(outgoing: &LedgerEntry, incoming: &LedgerEntry) -> Result<(), LedgerError> {
    if outgoing.direction != Direction::Outgoing || incoming.direction != Direction::Incoming {
        return Err(LedgerError::DirectionMismatch);
    }
    if outgoing.amount <= Decimal::ZERO {
        return Err(LedgerError::NonPositiveAmount(outgoing.amount));
    }
    if outgoing.amount != incoming.amount {
        return Err(LedgerError::AmountMismatch {
            outgoing: outgoing.amount,
            incoming: incoming.amount,
        });
    }
    if outgoing.transfer_id != incoming.transfer_id {
        return Err(LedgerError::TransferIdMismatch);
    }
    if outgoing.timestamp != incoming.timestamp {
        return Err(LedgerError::TimestampMismatch);
    }
    if outgoing.account != incoming.counterparty || outgoing.counterparty != incoming.account {
        return Err(LedgerError::CounterpartyMismatch);
    }
    if !incoming.commission.is_zero() {
        return Err(LedgerError::IncomingCommission(incoming.commission));
    }
    Ok(())
}

/// One page of an account's history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    pub entries: Vec<LedgerEntry>,
    /// `seq` of the last returned entry when more remain
    pub next_cursor: Option<SeqNum>,
}

#[derive(Default)]
struct LedgerInner {
    entries: Vec<LedgerEntry>,
    /// account → indexes into `entries`, ascending
    by_account: FxHashMap<AccountId, Vec<usize>>,
}

impl LedgerInner {
    fn push(&mut self, mut entry: LedgerEntry) {
        let idx = self.entries.len();
        entry.seq = idx as SeqNum + 1;
        self.by_account
            .entry(entry.account.clone())
            .or_default()
            .push(idx);
        self.entries.push(entry);
    }

    fn sorted_history(&self, account: &str) -> Vec<&LedgerEntry> {
        let mut out: Vec<&LedgerEntry> = self
            .by_account
            .get(account)
            .map(|idxs| idxs.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default();
        out.sort_by(|a, b| b.history_key().cmp(&a.history_key()));
        out
    }
}

#[derive(Default)]
pub struct Ledger {
    inner: Mutex<LedgerInner>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, LedgerInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.inner().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate and append a transfer pair. Both entries land under one
    /// lock, or neither does.
    pub fn record(&self, outgoing: LedgerEntry, incoming: LedgerEntry) -> Result<(), LedgerError> {
        validate_pair(&outgoing, &incoming)?;
        self.append_pair(outgoing, incoming);
        Ok(())
    }

    /// Append a pair already checked with [`validate_pair`]
    pub(crate) fn append_pair(&self, outgoing: LedgerEntry, incoming: LedgerEntry) {
        let mut inner = self.inner();
        inner.push(outgoing);
        inner.push(incoming);
    }

    /// Full history of `account`, newest first. Unknown accounts have an
    /// empty history.
    pub fn history_of(&self, account: &str) -> Vec<LedgerEntry> {
        self.inner()
            .sorted_history(account)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Restartable read: up to `limit` entries that come after the entry
    /// `before_seq` in history order (from the start when `None`).
    ///
    /// The cursor is positional on `(timestamp, seq)`, so entries appended
    /// after the first page never shift later pages.
    pub fn history_page(
        &self,
        account: &str,
        before_seq: Option<SeqNum>,
        limit: usize,
    ) -> Result<HistoryPage, LedgerError> {
        let inner = self.inner();

        let cursor = match before_seq {
            None => None,
            Some(seq) => {
                let entry = seq
                    .checked_sub(1)
                    .and_then(|i| inner.entries.get(i as usize))
                    .filter(|e| e.account == account)
                    .ok_or(LedgerError::InvalidCursor(seq))?;
                Some(entry.history_key())
            }
        };

        let limit = limit.max(1);
        let mut remaining = inner
            .sorted_history(account)
            .into_iter()
            .filter(|e| cursor.is_none_or(|c| e.history_key() < c))
            .peekable();

        let entries: Vec<LedgerEntry> = remaining.by_ref().take(limit).cloned().collect();
        let next_cursor = match (remaining.peek(), entries.last()) {
            (Some(_), Some(last)) => Some(last.seq),
            _ => None,
        };

        Ok(HistoryPage {
            entries,
            next_cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn pair(
        sender: &str,
        receiver: &str,
        amount: i64,
        at: DateTime<Utc>,
    ) -> (LedgerEntry, LedgerEntry) {
        LedgerEntry::transfer_pair(
            TransferId::new(),
            sender,
            receiver,
            Decimal::new(amount, 0),
            Decimal::new(amount * 2, 2),
            at,
        )
    }

    #[test]
    fn test_transfer_pair_shape() {
        let now = Utc::now();
        let (out, inc) = pair("alice", "bob", 10, now);
        assert_eq!(out.direction, Direction::Outgoing);
        assert_eq!(inc.direction, Direction::Incoming);
        assert_eq!(out.counterparty, "bob");
        assert_eq!(inc.counterparty, "alice");
        assert_eq!(out.commission, Decimal::new(20, 2));
        assert!(inc.commission.is_zero());
        assert!(validate_pair(&out, &inc).is_ok());
    }

    #[test]
    fn test_record_assigns_seq() {
        let ledger = Ledger::new();
        let (out, inc) = pair("alice", "bob", 10, Utc::now());
        ledger.record(out, inc).unwrap();
        assert_eq!(ledger.len(), 2);

        let a = ledger.history_of("alice");
        let b = ledger.history_of("bob");
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].seq, 1);
        assert_eq!(b[0].seq, 2);
        assert_eq!(a[0].transfer_id, b[0].transfer_id);
    }

    #[test]
    fn test_record_rejects_bad_pairs() {
        let ledger = Ledger::new();
        let now = Utc::now();

        let (out, mut inc) = pair("alice", "bob", 10, now);
        inc.amount = Decimal::new(11, 0);
        assert!(matches!(
            ledger.record(out, inc),
            Err(LedgerError::AmountMismatch { .. })
        ));

        let (out, inc) = pair("alice", "bob", 10, now);
        assert_eq!(
            ledger.record(inc.clone(), out.clone()),
            Err(LedgerError::DirectionMismatch)
        );

        let (out, mut inc) = pair("alice", "bob", 10, now);
        inc.timestamp = now + Duration::seconds(1);
        assert_eq!(ledger.record(out, inc), Err(LedgerError::TimestampMismatch));

        let (out, mut inc) = pair("alice", "bob", 10, now);
        inc.transfer_id = TransferId::new();
        assert_eq!(ledger.record(out, inc), Err(LedgerError::TransferIdMismatch));

        let (out, mut inc) = pair("alice", "bob", 10, now);
        inc.counterparty = "carol".into();
        assert_eq!(
            ledger.record(out, inc),
            Err(LedgerError::CounterpartyMismatch)
        );

        let (out, mut inc) = pair("alice", "bob", 10, now);
        inc.commission = Decimal::ONE;
        assert!(matches!(
            ledger.record(out, inc),
            Err(LedgerError::IncomingCommission(_))
        ));

        let (out, inc) = pair("alice", "bob", 0, now);
        assert!(matches!(
            ledger.record(out, inc),
            Err(LedgerError::NonPositiveAmount(_))
        ));

        // nothing partially appended
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_history_newest_first_with_seq_tiebreak() {
        let ledger = Ledger::new();
        let t0 = Utc::now();
        let (o, i) = pair("alice", "bob", 1, t0);
        ledger.record(o, i).unwrap();
        let (o, i) = pair("bob", "alice", 2, t0 + Duration::seconds(5));
        ledger.record(o, i).unwrap();
        // same instant as the first one
        let (o, i) = pair("alice", "carol", 3, t0);
        ledger.record(o, i).unwrap();

        let amounts: Vec<Decimal> = ledger
            .history_of("alice")
            .into_iter()
            .map(|e| e.amount)
            .collect();
        assert_eq!(
            amounts,
            vec![Decimal::new(2, 0), Decimal::new(3, 0), Decimal::new(1, 0)]
        );
        assert!(ledger.history_of("nobody").is_empty());
    }

    #[test]
    fn test_history_page_walk() {
        let ledger = Ledger::new();
        let t0 = Utc::now();
        for n in 1..=5 {
            let (o, i) = pair("alice", "bob", n, t0 + Duration::seconds(n));
            ledger.record(o, i).unwrap();
        }

        let p1 = ledger.history_page("alice", None, 2).unwrap();
        assert_eq!(p1.entries.len(), 2);
        assert_eq!(p1.entries[0].amount, Decimal::new(5, 0));
        let c1 = p1.next_cursor.unwrap();

        // new entry after the first page does not shift the walk
        let (o, i) = pair("alice", "bob", 9, t0 + Duration::seconds(60));
        ledger.record(o, i).unwrap();

        let p2 = ledger.history_page("alice", Some(c1), 2).unwrap();
        assert_eq!(
            p2.entries.iter().map(|e| e.amount).collect::<Vec<_>>(),
            vec![Decimal::new(3, 0), Decimal::new(2, 0)]
        );
        let p3 = ledger
            .history_page("alice", p2.next_cursor, 2)
            .unwrap();
        assert_eq!(p3.entries.len(), 1);
        assert_eq!(p3.entries[0].amount, Decimal::new(1, 0));
        assert_eq!(p3.next_cursor, None);
    }

    #[test]
    fn test_history_page_invalid_cursor() {
        let ledger = Ledger::new();
        let (o, i) = pair("alice", "bob", 1, Utc::now());
        ledger.record(o, i).unwrap();

        // seq 2 belongs to bob
        assert_eq!(
            ledger.history_page("alice", Some(2), 10),
            Err(LedgerError::InvalidCursor(2))
        );
        assert_eq!(
            ledger.history_page("alice", Some(0), 10),
            Err(LedgerError::InvalidCursor(0))
        );
        assert_eq!(
            ledger.history_page("alice", Some(99), 10),
            Err(LedgerError::InvalidCursor(99))
        );
    }

    #[test]
    fn test_history_page_empty() {
        let ledger = Ledger::new();
        let page = ledger.history_page("alice", None, 10).unwrap();
        assert!(page.entries.is_empty());
        assert_eq!(page.next_cursor, None);
    }
}
