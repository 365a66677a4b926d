//! Account model
//!
//! `Account` is a value: mutations produce a successor through
//! [`Account::apply_delta`], which the store swaps in only after every
//! check (and the journal append) has succeeded.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::StoreError;
use crate::core_types::{AccountId, Tier};
use crate::tier::TierPolicy;

/// A user's balance, points and tier.
///
/// # Invariants (enforced by private fields):
/// - `identity` never changes after open
/// - `tier == policy.tier_for_points(points)` after every mutation
/// - `balance >= 0` after every mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    identity: AccountId,
    balance: Decimal,
    points: u64,
    tier: Tier,
    opened_at: DateTime<Utc>,
}

impl Account {
    pub(crate) fn open(
        identity: AccountId,
        starting_balance: Decimal,
        opened_at: DateTime<Utc>,
        policy: &TierPolicy,
    ) -> Self {
        Self {
            identity,
            balance: starting_balance,
            points: 0,
            tier: policy.tier_for_points(0),
            opened_at,
        }
    }

    #[inline]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    #[inline]
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    #[inline]
    pub fn points(&self) -> u64 {
        self.points
    }

    #[inline]
    pub fn tier(&self) -> Tier {
        self.tier
    }

    #[inline]
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Successor state after adding `balance_delta` and `points_delta`.
    ///
    /// # Errors
    /// - `InsufficientFunds` if the balance would go below zero
    /// - `PointsUnderflow` if points would go below zero
    /// - `Overflow` on arithmetic overflow
    pub fn apply_delta(
        &self,
        balance_delta: Decimal,
        points_delta: i64,
        policy: &TierPolicy,
    ) -> Result<Account, StoreError> {
        let balance = self
            .balance
            .checked_add(balance_delta)
            .ok_or(StoreError::Overflow)?;
        if balance < Decimal::ZERO {
            return Err(StoreError::InsufficientFunds {
                required: -balance_delta,
                available: self.balance,
            });
        }

        let points = i128::from(self.points) + i128::from(points_delta);
        if points < 0 {
            return Err(StoreError::PointsUnderflow {
                points: self.points,
                delta: points_delta,
            });
        }
        let points = u64::try_from(points).map_err(|_| StoreError::Overflow)?;

        Ok(Account {
            identity: self.identity.clone(),
            balance,
            points,
            tier: policy.tier_for_points(i64::try_from(points).unwrap_or(i64::MAX)),
            opened_at: self.opened_at,
        })
    }
}
