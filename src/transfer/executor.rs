use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use tracing::{info, warn};

use super::error::TransferError;
use super::types::TransferResult;
use crate::account::{AccountStore, StoreError, lock_pair};
use crate::config::WalletConfig;
use crate::core_types::TransferId;
use crate::journal::{Journal, JournalRecord, TransferCommittedPayload};
use crate::ledger::{Ledger, LedgerEntry, validate_pair};
use crate::money::{round_minor, validate_amount};

pub struct TransferExecutor {
    store: Arc<AccountStore>,
    ledger: Arc<Ledger>,
    journal: Arc<dyn Journal>,
    points_divisor: Decimal,
    minor_units: u32,
}

impl TransferExecutor {
    pub fn new(
        store: Arc<AccountStore>,
        ledger: Arc<Ledger>,
        journal: Arc<dyn Journal>,
        config: &WalletConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            journal,
            points_divisor: config.points_divisor,
            minor_units: config.minor_units,
        }
    }

    /// Points earned on a face amount: `floor(amount / points_divisor)`
    pub fn points_for(&self, amount: Decimal) -> Result<u64, TransferError> {
        amount
            .checked_div(self.points_divisor)
            .and_then(|p| p.floor().to_u64())
            .ok_or(TransferError::Overflow)
    }

    /// Move `amount` from `sender` to `receiver`, charging the sender's tier
    /// commission on top.
    ///
    /// # Errors
    /// - `InvalidAmount` - not positive, or finer than the minor unit
    /// - `SenderNotFound` / `ReceiverNotFound`
    /// - `SelfTransfer`
    /// - `InsufficientFunds` - balance below `amount + commission`
    /// - `StorageUnavailable` - journal append failed, nothing applied
    pub fn transfer(
        &self,
        sender: &str,
        receiver: &str,
        amount: Decimal,
    ) -> Result<TransferResult, TransferError> {
        let amount = validate_amount(amount, self.minor_units)?;

        let sender_handle = self
            .store
            .handle(sender)
            .map_err(|_| TransferError::SenderNotFound(sender.to_string()))?;
        let receiver_handle = self
            .store
            .handle(receiver)
            .map_err(|_| TransferError::ReceiverNotFound(receiver.to_string()))?;
        if sender_handle.identity() == receiver_handle.identity() {
            return Err(TransferError::SelfTransfer);
        }

        let (mut from, mut to) =
            lock_pair(&sender_handle, &receiver_handle).map_err(|_| TransferError::SelfTransfer)?;

        let policy = self.store.policy();
        let rate = policy.commission_rate(from.tier());
        let commission = round_minor(
            amount.checked_mul(rate).ok_or(TransferError::Overflow)?,
            self.minor_units,
        );
        let total = amount
            .checked_add(commission)
            .ok_or(TransferError::Overflow)?;

        if from.balance() < total {
            warn!(
                sender = sender,
                receiver = receiver,
                required = %total,
                available = %from.balance(),
                "Transfer rejected: insufficient funds"
            );
            return Err(TransferError::InsufficientFunds {
                required: total,
                available: from.balance(),
            });
        }

        let earned_points = self.points_for(amount)?;
        let points_delta = i64::try_from(earned_points).map_err(|_| TransferError::Overflow)?;

        let next_from = from
            .apply_delta(-total, points_delta, policy)
            .map_err(store_error)?;
        let next_to = to.apply_delta(amount, 0, policy).map_err(store_error)?;

        let transfer_id = TransferId::new();
        let timestamp = Utc::now();
        let (outgoing, incoming) = LedgerEntry::transfer_pair(
            transfer_id,
            from.identity(),
            to.identity(),
            amount,
            commission,
            timestamp,
        );
        validate_pair(&outgoing, &incoming)
            .map_err(|e| TransferError::SystemError(e.to_string()))?;

        self.journal
            .append(&JournalRecord::TransferCommitted(TransferCommittedPayload {
                transfer_id: transfer_id.as_u128(),
                sender: from.identity().to_string(),
                receiver: to.identity().to_string(),
                amount,
                commission,
                earned_points,
                committed_at: timestamp,
            }))
            .map_err(|e| TransferError::StorageUnavailable(e.to_string()))?;

        let result = TransferResult {
            transfer_id,
            sender: next_from.identity().to_string(),
            receiver: next_to.identity().to_string(),
            sent: amount,
            commission,
            total_spent: total,
            new_balance: next_from.balance(),
            earned_points,
            new_tier: next_from.tier(),
            timestamp,
        };

        *from = next_from;
        *to = next_to;
        self.ledger.append_pair(outgoing, incoming);

        info!(
            transfer_id = %transfer_id,
            sender = sender,
            receiver = receiver,
            amount = %amount,
            commission = %commission,
            earned_points = earned_points,
            new_tier = %result.new_tier,
            "Transfer committed"
        );
        Ok(result)
    }

    /// Re-apply a journaled transfer exactly as it was committed.
    pub(crate) fn restore(&self, payload: &TransferCommittedPayload) -> Result<(), TransferError> {
        let sender_handle = self
            .store
            .handle(&payload.sender)
            .map_err(|_| TransferError::SenderNotFound(payload.sender.clone()))?;
        let receiver_handle = self
            .store
            .handle(&payload.receiver)
            .map_err(|_| TransferError::ReceiverNotFound(payload.receiver.clone()))?;
        let (mut from, mut to) =
            lock_pair(&sender_handle, &receiver_handle).map_err(|_| TransferError::SelfTransfer)?;

        let policy = self.store.policy();
        let total = payload
            .amount
            .checked_add(payload.commission)
            .ok_or(TransferError::Overflow)?;
        let points_delta =
            i64::try_from(payload.earned_points).map_err(|_| TransferError::Overflow)?;

        let next_from = from
            .apply_delta(-total, points_delta, policy)
            .map_err(store_error)?;
        let next_to = to.apply_delta(payload.amount, 0, policy).map_err(store_error)?;

        let (outgoing, incoming) = LedgerEntry::transfer_pair(
            payload.transfer_id(),
            &payload.sender,
            &payload.receiver,
            payload.amount,
            payload.commission,
            payload.committed_at,
        );
        validate_pair(&outgoing, &incoming)
            .map_err(|e| TransferError::SystemError(e.to_string()))?;

        *from = next_from;
        *to = next_to;
        self.ledger.append_pair(outgoing, incoming);
        Ok(())
    }
}

fn store_error(e: StoreError) -> TransferError {
    match e {
        StoreError::InsufficientFunds {
            required,
            available,
        } => TransferError::InsufficientFunds {
            required,
            available,
        },
        StoreError::Overflow => TransferError::Overflow,
        StoreError::StorageUnavailable(msg) => TransferError::StorageUnavailable(msg),
        other => TransferError::SystemError(other.to_string()),
    }
}
