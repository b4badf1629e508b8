//! Collateral Ledger — open/locked balance accounting per (owner, asset)
//!
//! The ledger is the single source of truth for balances. Every record
//! splits an owner's collateral into `open` (withdrawable) and `locked`
//! (pledged against a listing); the registry moves value between the two
//! halves only through the operations here and never touches records
//! directly.
//!
//! All state-changing operations are all-or-nothing: preconditions and the
//! inbound transfer are checked before any record is written, and the one
//! outbound transfer (withdraw) runs only after the debit is final, with the
//! debit restored if the push is rejected. Arithmetic is checked throughout;
//! a subtraction that would go negative surfaces as an error instead of
//! wrapping.

use std::collections::HashMap;

use tracing::{debug, warn};
use types::asset::Asset;
use types::collateral::CollateralBalance;
use types::ids::AccountId;

use crate::errors::LedgerError;
use crate::events::{
    CollateralDeposited, CollateralLocked, CollateralSettled, CollateralUnlocked,
    CollateralWithdrawn, ContractEvent,
};
use crate::transfer::TransferAdapter;

/// Core ledger managing collateral custody.
///
/// Balances are stored as `HashMap<AccountId, HashMap<Asset, CollateralBalance>>`;
/// a missing record is equivalent to a zeroed one, and records are created
/// implicitly on first credit.
#[derive(Debug)]
pub struct CollateralLedger {
    /// Balances: owner -> (asset -> open/locked record)
    accounts: HashMap<AccountId, HashMap<Asset, CollateralBalance>>,
    /// Transfer adapter over the external asset rails
    adapter: TransferAdapter,
    /// Emitted events log (append-only)
    events: Vec<ContractEvent>,
}

impl CollateralLedger {
    /// Create a ledger over the given transfer adapter.
    pub fn new(adapter: TransferAdapter) -> Self {
        Self {
            accounts: HashMap::new(),
            adapter,
            events: Vec::new(),
        }
    }

    // ───────────────────────── Balance Queries ─────────────────────────

    /// Get the full balance record for an (owner, asset) pair.
    pub fn balance(&self, owner: &AccountId, asset: &Asset) -> CollateralBalance {
        self.accounts
            .get(owner)
            .and_then(|assets| assets.get(asset))
            .copied()
            .unwrap_or_default()
    }

    /// Collateral available to withdraw or apply to a new commitment.
    pub fn open_collateral(&self, owner: &AccountId, asset: &Asset) -> u128 {
        self.balance(owner, asset).open
    }

    /// Collateral currently pledged against listing commitments.
    pub fn locked_collateral(&self, owner: &AccountId, asset: &Asset) -> u128 {
        self.balance(owner, asset).locked
    }

    /// Check whether `owner` could satisfy a lock of `required` from the
    /// open balance alone. Returns `(has_enough, shortfall)`.
    pub fn check(&self, owner: &AccountId, asset: &Asset, required: u128) -> (bool, u128) {
        let open = self.open_collateral(owner, asset);
        (open >= required, required.saturating_sub(open))
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Deposit `amount` into `owner`'s open balance.
    ///
    /// The transfer adapter confirms receipt before the credit is applied.
    /// Native deposits must attach exactly `amount`; token deposits must
    /// attach nothing.
    pub fn deposit(
        &mut self,
        owner: AccountId,
        asset: Asset,
        amount: u128,
        attached: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        // Excess native value would be silently absorbed; reject it.
        let expected = if asset.is_native() { amount } else { 0 };
        if attached > expected {
            return Err(LedgerError::ValueMismatch {
                required: expected,
                attached,
            });
        }

        let current = self.balance(&owner, &asset);
        let new_open = current
            .open
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        self.adapter.receive(&owner, &asset, amount, attached)?;
        self.record(owner, asset).open = new_open;

        debug!(owner = %owner, asset = %asset, amount, "Deposit credited");
        self.events
            .push(ContractEvent::CollateralDeposited(CollateralDeposited {
                owner,
                asset,
                amount,
            }));
        Ok(())
    }

    // ───────────────────────── Lock / Unlock ─────────────────────────

    /// Ensure `required` is locked for `owner`.
    ///
    /// Moves as much as possible from the open balance and pulls only the
    /// shortfall through the transfer adapter. Native calls must attach
    /// exactly the shortfall; token calls must attach nothing.
    pub fn lock(
        &mut self,
        owner: AccountId,
        asset: Asset,
        required: u128,
        attached: u128,
    ) -> Result<(), LedgerError> {
        let current = self.balance(&owner, &asset);
        let shortfall = required.saturating_sub(current.open);

        let expected = if asset.is_native() { shortfall } else { 0 };
        if attached != expected {
            return Err(LedgerError::ValueMismatch {
                required: expected,
                attached,
            });
        }

        // shortfall never exceeds required, so this cannot wrap
        let from_open = required - shortfall;
        let new_open = current.open - from_open;
        let new_locked = current
            .locked
            .checked_add(required)
            .ok_or(LedgerError::Overflow)?;

        if shortfall > 0 {
            self.adapter.receive(&owner, &asset, shortfall, attached)?;
        }

        let record = self.record(owner, asset);
        record.open = new_open;
        record.locked = new_locked;

        debug!(
            owner = %owner,
            asset = %asset,
            required,
            pulled = shortfall,
            "Collateral locked"
        );
        self.events
            .push(ContractEvent::CollateralLocked(CollateralLocked {
                owner,
                asset,
                amount: required,
                pulled: shortfall,
            }));
        Ok(())
    }

    /// Move `amount` from `owner`'s locked balance back to open.
    ///
    /// A shortfall here means the registry's bookkeeping has diverged from
    /// the ledger, not that the caller did anything wrong.
    pub fn unlock(
        &mut self,
        owner: AccountId,
        asset: Asset,
        amount: u128,
    ) -> Result<(), LedgerError> {
        let current = self.balance(&owner, &asset);
        if current.locked < amount {
            warn!(
                owner = %owner,
                asset = %asset,
                locked = current.locked,
                requested = amount,
                "Unlock exceeds locked balance"
            );
            return Err(LedgerError::InsufficientLocked {
                asset,
                required: amount,
                available: current.locked,
            });
        }
        let new_open = current
            .open
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;

        let record = self.record(owner, asset);
        record.locked = current.locked - amount;
        record.open = new_open;

        debug!(owner = %owner, asset = %asset, amount, "Collateral unlocked");
        self.events
            .push(ContractEvent::CollateralUnlocked(CollateralUnlocked {
                owner,
                asset,
                amount,
            }));
        Ok(())
    }

    // ───────────────────────── Settle ─────────────────────────

    /// Atomically debit `from`'s locked balance and credit `to`'s open
    /// balance. Used only at the final handoff; both sides may be the same
    /// account.
    pub fn settle(
        &mut self,
        from: AccountId,
        locked_debit: u128,
        to: AccountId,
        open_credit: u128,
        asset: Asset,
    ) -> Result<(), LedgerError> {
        let from_balance = self.balance(&from, &asset);
        if from_balance.locked < locked_debit {
            warn!(
                owner = %from,
                asset = %asset,
                locked = from_balance.locked,
                requested = locked_debit,
                "Settle exceeds locked balance"
            );
            return Err(LedgerError::InsufficientLocked {
                asset,
                required: locked_debit,
                available: from_balance.locked,
            });
        }
        let to_balance = self.balance(&to, &asset);
        let new_to_open = to_balance
            .open
            .checked_add(open_credit)
            .ok_or(LedgerError::Overflow)?;

        self.record(from, asset).locked = from_balance.locked - locked_debit;
        self.record(to, asset).open = new_to_open;

        debug!(
            from = %from,
            to = %to,
            asset = %asset,
            locked_debit,
            open_credit,
            "Collateral settled"
        );
        self.events
            .push(ContractEvent::CollateralSettled(CollateralSettled {
                from,
                to,
                asset,
                locked_debit,
                open_credit,
            }));
        Ok(())
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Debit `amount` from `owner`'s open balance and push it out.
    ///
    /// The debit lands before the outbound push so a re-entrant pull through
    /// the gateway observes the reduced balance; if the push is rejected the
    /// debit is restored and the call reports failure with state unchanged.
    pub fn withdraw(
        &mut self,
        owner: AccountId,
        asset: Asset,
        amount: u128,
    ) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount);
        }
        let current = self.balance(&owner, &asset);
        if current.open < amount {
            return Err(LedgerError::InsufficientOpen {
                asset,
                required: amount,
                available: current.open,
            });
        }

        self.record(owner, asset).open = current.open - amount;

        if let Err(err) = self.adapter.send(&owner, &asset, amount) {
            self.record(owner, asset).open = current.open;
            warn!(
                owner = %owner,
                asset = %asset,
                error = %err,
                "Withdrawal push rejected, debit rolled back"
            );
            return Err(err.into());
        }

        debug!(owner = %owner, asset = %asset, amount, "Withdrawal pushed");
        self.events
            .push(ContractEvent::CollateralWithdrawn(CollateralWithdrawn {
                owner,
                asset,
                amount,
            }));
        Ok(())
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }

    // ───────────────────────── Internal ─────────────────────────

    fn record(&mut self, owner: AccountId, asset: Asset) -> &mut CollateralBalance {
        self.accounts
            .entry(owner)
            .or_default()
            .entry(asset)
            .or_default()
    }
}
