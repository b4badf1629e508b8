//! Transfer Adapter — moving asset value across the custody boundary
//!
//! The adapter is the single seam between the ledger and the external asset
//! rails. Native value arrives as value attached to the call and is only
//! verified here; token value moves through an allowance-based gateway.
//! A failed transfer is terminal for that call — there are no retries, and
//! the caller must leave ledger state untouched.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex};

use types::asset::Asset;
use types::ids::{AccountId, TokenId};

use crate::errors::TransferError;

/// External asset rails as seen from the contract.
///
/// Implementations wrap whatever actually holds the value: a token contract,
/// a node RPC, or an in-memory stand-in. Every method is a single attempt;
/// a non-success return means no value moved.
pub trait AssetGateway: fmt::Debug {
    /// Pull `amount` of `token` from `from` into custody via its allowance.
    fn pull_token(
        &mut self,
        token: &TokenId,
        from: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Push `amount` of `token` out of custody to `to`.
    fn push_token(
        &mut self,
        token: &TokenId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Push `amount` of native value to `to`. The recipient may reject.
    fn push_native(&mut self, to: &AccountId, amount: u128) -> Result<(), TransferError>;
}

/// Dispatches inbound and outbound transfers to the right rail for an asset.
#[derive(Debug)]
pub struct TransferAdapter {
    gateway: Box<dyn AssetGateway>,
}

impl TransferAdapter {
    pub fn new(gateway: Box<dyn AssetGateway>) -> Self {
        Self { gateway }
    }

    /// Confirm receipt of `amount` of `asset` from `owner`.
    ///
    /// Native: the value must already ride on the call; this verifies the
    /// attached value covers the amount. Token: pulls through the gateway.
    pub fn receive(
        &mut self,
        owner: &AccountId,
        asset: &Asset,
        amount: u128,
        attached: u128,
    ) -> Result<(), TransferError> {
        match asset {
            Asset::Native => {
                if attached < amount {
                    return Err(TransferError::InsufficientValueSent {
                        required: amount,
                        attached,
                    });
                }
                Ok(())
            }
            Asset::Token(token) => self.gateway.pull_token(token, owner, amount),
        }
    }

    /// Push `amount` of `asset` out of custody to `recipient`.
    pub fn send(
        &mut self,
        recipient: &AccountId,
        asset: &Asset,
        amount: u128,
    ) -> Result<(), TransferError> {
        match asset {
            Asset::Native => self.gateway.push_native(recipient, amount),
            Asset::Token(token) => self.gateway.push_token(token, recipient, amount),
        }
    }
}

#[derive(Debug, Default)]
struct GatewayState {
    /// Token balances held by external accounts: (token, holder) -> amount
    token_balances: HashMap<(TokenId, AccountId), u128>,
    /// Amount each holder has approved the contract to pull: (token, owner) -> amount
    allowances: HashMap<(TokenId, AccountId), u128>,
    /// Cumulative native value pushed to each recipient
    native_pushed: HashMap<AccountId, u128>,
    /// Recipients that reject any push (fault injection)
    rejecting: HashSet<AccountId>,
}

/// In-memory asset rails.
///
/// Stands in for the real token contracts and native transfer machinery the
/// same way signature checking is stubbed at the wallet boundary: enough
/// behavior for the contract logic layer, including allowance bookkeeping
/// and injectable push rejection. Clones share state, so a test can keep a
/// handle while the ledger owns the adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<Mutex<GatewayState>>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `owner`'s external balance.
    pub fn mint(&self, token: TokenId, owner: AccountId, amount: u128) {
        let mut state = self.state.lock().expect("gateway state poisoned");
        let balance = state.token_balances.entry((token, owner)).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    /// Set the amount the contract may pull from `owner`.
    pub fn approve(&self, token: TokenId, owner: AccountId, amount: u128) {
        let mut state = self.state.lock().expect("gateway state poisoned");
        state.allowances.insert((token, owner), amount);
    }

    /// External token balance of `owner`.
    pub fn token_balance(&self, token: &TokenId, owner: &AccountId) -> u128 {
        let state = self.state.lock().expect("gateway state poisoned");
        state
            .token_balances
            .get(&(*token, *owner))
            .copied()
            .unwrap_or(0)
    }

    /// Remaining allowance granted by `owner`.
    pub fn allowance(&self, token: &TokenId, owner: &AccountId) -> u128 {
        let state = self.state.lock().expect("gateway state poisoned");
        state.allowances.get(&(*token, *owner)).copied().unwrap_or(0)
    }

    /// Cumulative native value pushed to `recipient`.
    pub fn native_pushed(&self, recipient: &AccountId) -> u128 {
        let state = self.state.lock().expect("gateway state poisoned");
        state.native_pushed.get(recipient).copied().unwrap_or(0)
    }

    /// Make `recipient` reject (or accept again) any outbound push.
    pub fn set_reject_pushes(&self, recipient: AccountId, reject: bool) {
        let mut state = self.state.lock().expect("gateway state poisoned");
        if reject {
            state.rejecting.insert(recipient);
        } else {
            state.rejecting.remove(&recipient);
        }
    }
}

impl AssetGateway for InMemoryGateway {
    fn pull_token(
        &mut self,
        token: &TokenId,
        from: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut state = self.state.lock().expect("gateway state poisoned");

        let allowance = state.allowances.get(&(*token, *from)).copied().unwrap_or(0);
        if allowance < amount {
            return Err(TransferError::Failed {
                reason: format!("allowance exceeded: approved {}, need {}", allowance, amount),
            });
        }
        let balance = state
            .token_balances
            .get(&(*token, *from))
            .copied()
            .unwrap_or(0);
        if balance < amount {
            return Err(TransferError::Failed {
                reason: format!("insufficient token balance: held {}, need {}", balance, amount),
            });
        }

        state.allowances.insert((*token, *from), allowance - amount);
        state.token_balances.insert((*token, *from), balance - amount);
        Ok(())
    }

    fn push_token(
        &mut self,
        token: &TokenId,
        to: &AccountId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut state = self.state.lock().expect("gateway state poisoned");
        if state.rejecting.contains(to) {
            return Err(TransferError::Failed {
                reason: format!("token push rejected by {}", to),
            });
        }
        let balance = state.token_balances.entry((*token, *to)).or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::Failed {
                reason: "recipient token balance overflow".to_string(),
            })?;
        Ok(())
    }

    fn push_native(&mut self, to: &AccountId, amount: u128) -> Result<(), TransferError> {
        let mut state = self.state.lock().expect("gateway state poisoned");
        if state.rejecting.contains(to) {
            return Err(TransferError::Failed {
                reason: format!("native push rejected by {}", to),
            });
        }
        let pushed = state.native_pushed.entry(*to).or_insert(0);
        *pushed = pushed.saturating_add(amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> (InMemoryGateway, TransferAdapter) {
        let gateway = InMemoryGateway::new();
        let adapter = TransferAdapter::new(Box::new(gateway.clone()));
        (gateway, adapter)
    }

    // ─── Native receive ───

    #[test]
    fn test_receive_native_exact_value() {
        let (_gateway, mut adapter) = adapter();
        let owner = AccountId::new();
        assert!(adapter.receive(&owner, &Asset::Native, 100, 100).is_ok());
    }

    #[test]
    fn test_receive_native_insufficient_value() {
        let (_gateway, mut adapter) = adapter();
        let owner = AccountId::new();
        let result = adapter.receive(&owner, &Asset::Native, 100, 40);
        assert_eq!(
            result,
            Err(TransferError::InsufficientValueSent {
                required: 100,
                attached: 40
            })
        );
    }

    // ─── Token pull ───

    #[test]
    fn test_pull_token_with_allowance() {
        let (gateway, mut adapter) = adapter();
        let token = TokenId::new();
        let owner = AccountId::new();
        gateway.mint(token, owner, 500);
        gateway.approve(token, owner, 300);

        adapter
            .receive(&owner, &Asset::Token(token), 200, 0)
            .unwrap();

        assert_eq!(gateway.token_balance(&token, &owner), 300);
        assert_eq!(gateway.allowance(&token, &owner), 100);
    }

    #[test]
    fn test_pull_token_without_allowance() {
        let (gateway, mut adapter) = adapter();
        let token = TokenId::new();
        let owner = AccountId::new();
        gateway.mint(token, owner, 500);

        let result = adapter.receive(&owner, &Asset::Token(token), 200, 0);
        assert!(matches!(result, Err(TransferError::Failed { .. })));
        // Nothing moved
        assert_eq!(gateway.token_balance(&token, &owner), 500);
    }

    #[test]
    fn test_pull_token_insufficient_balance() {
        let (gateway, mut adapter) = adapter();
        let token = TokenId::new();
        let owner = AccountId::new();
        gateway.mint(token, owner, 100);
        gateway.approve(token, owner, 1_000);

        let result = adapter.receive(&owner, &Asset::Token(token), 200, 0);
        assert!(matches!(result, Err(TransferError::Failed { .. })));
        assert_eq!(gateway.allowance(&token, &owner), 1_000);
    }

    // ─── Pushes ───

    #[test]
    fn test_send_native_records_push() {
        let (gateway, mut adapter) = adapter();
        let recipient = AccountId::new();
        adapter.send(&recipient, &Asset::Native, 75).unwrap();
        assert_eq!(gateway.native_pushed(&recipient), 75);
    }

    #[test]
    fn test_send_native_rejected() {
        let (gateway, mut adapter) = adapter();
        let recipient = AccountId::new();
        gateway.set_reject_pushes(recipient, true);

        let result = adapter.send(&recipient, &Asset::Native, 75);
        assert!(matches!(result, Err(TransferError::Failed { .. })));
        assert_eq!(gateway.native_pushed(&recipient), 0);
    }

    #[test]
    fn test_send_token_credits_recipient() {
        let (gateway, mut adapter) = adapter();
        let token = TokenId::new();
        let recipient = AccountId::new();

        adapter.send(&recipient, &Asset::Token(token), 60).unwrap();
        assert_eq!(gateway.token_balance(&token, &recipient), 60);
    }

    #[test]
    fn test_send_token_rejected() {
        let (gateway, mut adapter) = adapter();
        let token = TokenId::new();
        let recipient = AccountId::new();
        gateway.set_reject_pushes(recipient, true);

        let result = adapter.send(&recipient, &Asset::Token(token), 60);
        assert!(matches!(result, Err(TransferError::Failed { .. })));
        assert_eq!(gateway.token_balance(&token, &recipient), 0);
    }

    #[test]
    fn test_reject_can_be_lifted() {
        let (gateway, mut adapter) = adapter();
        let recipient = AccountId::new();
        gateway.set_reject_pushes(recipient, true);
        assert!(adapter.send(&recipient, &Asset::Native, 10).is_err());

        gateway.set_reject_pushes(recipient, false);
        assert!(adapter.send(&recipient, &Asset::Native, 10).is_ok());
        assert_eq!(gateway.native_pushed(&recipient), 10);
    }
}
