//! Account Store
//!
//! Owns every account's balance, points and tier. Each account sits behind
//! its own mutex; the map itself is a `DashMap` so lookups for unrelated
//! accounts never contend.
//!
//! # Locking discipline
//!
//! ```text
//! account locks (ascending identity)  →  journal  →  ledger
//! ```
//!
//! - A transfer holds both account locks for the whole check-and-commit.
//! - Two accounts are always locked in ascending identity order, so two
//!   opposite-direction transfers on the same pair cannot deadlock.
//! - No code path acquires an account lock while holding the journal or
//!   ledger lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::error::StoreError;
use super::models::Account;
use super::validation::validate_identity;
use crate::core_types::AccountId;
use crate::journal::{AccountOpenedPayload, BalanceAdjustedPayload, Journal, JournalRecord};
use crate::tier::TierPolicy;

/// Shared handle to one account's lock.
#[derive(Debug, Clone)]
pub struct AccountHandle {
    identity: AccountId,
    cell: Arc<Mutex<Account>>,
}

impl AccountHandle {
    #[inline]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Exclusive access. A poisoned lock is recovered: the account is only
    /// ever replaced wholesale, never left half-written.
    pub fn lock(&self) -> MutexGuard<'_, Account> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> Account {
        self.lock().clone()
    }
}

/// Lock two distinct accounts in ascending identity order.
///
/// Guards are returned in argument order regardless of acquisition order.
pub fn lock_pair<'a>(
    first: &'a AccountHandle,
    second: &'a AccountHandle,
) -> Result<(MutexGuard<'a, Account>, MutexGuard<'a, Account>), StoreError> {
    if first.identity == second.identity {
        return Err(StoreError::SameAccount(first.identity.clone()));
    }

    if first.identity < second.identity {
        let a = first.lock();
        let b = second.lock();
        Ok((a, b))
    } else {
        let b = second.lock();
        let a = first.lock();
        Ok((a, b))
    }
}

pub struct AccountStore {
    accounts: DashMap<AccountId, AccountHandle>,
    policy: TierPolicy,
    journal: Arc<dyn Journal>,
}

impl AccountStore {
    pub fn new(policy: TierPolicy, journal: Arc<dyn Journal>) -> Self {
        Self {
            accounts: DashMap::new(),
            policy,
            journal,
        }
    }

    pub fn policy(&self) -> &TierPolicy {
        &self.policy
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.accounts.contains_key(identity)
    }

    /// Open a new account with `starting_balance` and zero points.
    ///
    /// # Errors
    /// - `InvalidIdentity` if the identity is malformed
    /// - `NegativeStartingBalance`
    /// - `AlreadyExists` if the identity is taken
    /// - `StorageUnavailable` if the journal append fails (nothing is created)
    pub fn create_account(
        &self,
        identity: &str,
        starting_balance: Decimal,
    ) -> Result<Account, StoreError> {
        validate_identity(identity)?;
        if starting_balance < Decimal::ZERO {
            return Err(StoreError::NegativeStartingBalance(starting_balance));
        }

        // The vacant entry holds the shard lock, so the check and the insert
        // are one step for concurrent openers of the same identity.
        match self.accounts.entry(identity.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(identity.to_string())),
            Entry::Vacant(slot) => {
                let opened_at = Utc::now();
                self.journal
                    .append(&JournalRecord::AccountOpened(AccountOpenedPayload {
                        identity: identity.to_string(),
                        starting_balance,
                        opened_at,
                    }))?;

                let account = Account::open(
                    identity.to_string(),
                    starting_balance,
                    opened_at,
                    &self.policy,
                );
                slot.insert(AccountHandle {
                    identity: identity.to_string(),
                    cell: Arc::new(Mutex::new(account.clone())),
                });

                info!(
                    identity = identity,
                    starting_balance = %starting_balance,
                    "Account opened"
                );
                Ok(account)
            }
        }
    }

    /// Point-in-time copy of an account. For display only: never use it as
    /// the basis of a sufficiency check.
    pub fn get(&self, identity: &str) -> Result<Account, StoreError> {
        Ok(self.handle(identity)?.snapshot())
    }

    pub fn handle(&self, identity: &str) -> Result<AccountHandle, StoreError> {
        self.accounts
            .get(identity)
            .map(|h| h.value().clone())
            .ok_or_else(|| StoreError::NotFound(identity.to_string()))
    }

    /// Atomically add `balance_delta` and `points_delta` to one account,
    /// recomputing its tier.
    ///
    /// # Errors
    /// - `NotFound`
    /// - `InsufficientFunds` if the balance would go below zero
    /// - `PointsUnderflow`, `Overflow`
    /// - `StorageUnavailable` (account unchanged)
    pub fn apply_delta(
        &self,
        identity: &str,
        balance_delta: Decimal,
        points_delta: i64,
    ) -> Result<Account, StoreError> {
        let handle = self.handle(identity)?;
        let mut guard = handle.lock();

        let next = guard.apply_delta(balance_delta, points_delta, &self.policy)?;
        self.journal
            .append(&JournalRecord::BalanceAdjusted(BalanceAdjustedPayload {
                identity: identity.to_string(),
                balance_delta,
                points_delta,
            }))?;
        *guard = next.clone();

        debug!(
            identity = identity,
            balance_delta = %balance_delta,
            points_delta = points_delta,
            balance = %next.balance(),
            tier = %next.tier(),
            "Balance adjusted"
        );
        Ok(next)
    }

    /// Every identity, ascending
    pub fn identities(&self) -> Vec<AccountId> {
        let mut ids: Vec<AccountId> = self.accounts.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    /// Sum of all balances, read with every account locked at once (in
    /// ascending identity order) so no in-flight transfer is half-counted.
    pub fn total_balance(&self) -> Decimal {
        let mut handles: Vec<AccountHandle> =
            self.accounts.iter().map(|e| e.value().clone()).collect();
        handles.sort_by(|a, b| a.identity.cmp(&b.identity));

        let guards: Vec<MutexGuard<'_, Account>> = handles.iter().map(|h| h.lock()).collect();
        guards.iter().map(|g| g.balance()).sum()
    }

    // ------------------------------------------------------------------
    // Journal replay (no journaling)
    // ------------------------------------------------------------------

    pub(crate) fn restore_opened(
        &self,
        identity: &str,
        starting_balance: Decimal,
        opened_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        match self.accounts.entry(identity.to_string()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(identity.to_string())),
            Entry::Vacant(slot) => {
                let account = Account::open(
                    identity.to_string(),
                    starting_balance,
                    opened_at,
                    &self.policy,
                );
                slot.insert(AccountHandle {
                    identity: identity.to_string(),
                    cell: Arc::new(Mutex::new(account)),
                });
                Ok(())
            }
        }
    }

    pub(crate) fn restore_delta(
        &self,
        identity: &str,
        balance_delta: Decimal,
        points_delta: i64,
    ) -> Result<(), StoreError> {
        let handle = self.handle(identity)?;
        let mut guard = handle.lock();
        *guard = guard.apply_delta(balance_delta, points_delta, &self.policy)?;
        Ok(())
    }
}
