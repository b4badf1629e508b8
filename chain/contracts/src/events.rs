//! Contract events
//!
//! Events are immutable records emitted by ledger and registry operations.
//! They form the audit trail consumed by external collaborators; the
//! contract itself never reads them back.

use serde::{Deserialize, Serialize};
use types::asset::Asset;
use types::ids::AccountId;
use types::listing::ItemRef;

/// Collateral credited to an owner's open balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralDeposited {
    pub owner: AccountId,
    pub asset: Asset,
    pub amount: u128,
}

/// Collateral debited from an owner's open balance and pushed out
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralWithdrawn {
    pub owner: AccountId,
    pub asset: Asset,
    pub amount: u128,
}

/// Collateral pledged against a listing commitment.
///
/// `pulled` is the shortfall drawn in through the transfer adapter;
/// the remainder came out of the owner's open balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralLocked {
    pub owner: AccountId,
    pub asset: Asset,
    pub amount: u128,
    pub pulled: u128,
}

/// Collateral released from a commitment back to the open balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralUnlocked {
    pub owner: AccountId,
    pub asset: Asset,
    pub amount: u128,
}

/// Locked collateral moved into an open balance at final handoff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralSettled {
    pub from: AccountId,
    pub to: AccountId,
    pub asset: Asset,
    pub locked_debit: u128,
    pub open_credit: u128,
}

/// New listing created at the seller's next index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemListed {
    pub seller: AccountId,
    pub index: u64,
    pub item: ItemRef,
    pub price: u128,
    pub asset: Asset,
}

/// Asking price changed on an open listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceUpdated {
    pub seller: AccountId,
    pub index: u64,
    pub old_price: u128,
    pub new_price: u128,
}

/// Listing withdrawn by the seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingCanceled {
    pub seller: AccountId,
    pub index: u64,
}

/// Buyer committed to purchase, payment and matching collateral locked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyCommitted {
    pub seller: AccountId,
    pub index: u64,
    pub buyer: AccountId,
    pub price: u128,
}

/// Buyer backed out before the handoff, lock released
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyCanceled {
    pub seller: AccountId,
    pub index: u64,
    pub buyer: AccountId,
}

/// Seller reported the item handed off
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSent {
    pub seller: AccountId,
    pub index: u64,
}

/// Buyer confirmed receipt, funds settled
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemReceived {
    pub seller: AccountId,
    pub index: u64,
    pub buyer: AccountId,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    CollateralDeposited(CollateralDeposited),
    CollateralWithdrawn(CollateralWithdrawn),
    CollateralLocked(CollateralLocked),
    CollateralUnlocked(CollateralUnlocked),
    CollateralSettled(CollateralSettled),
    ItemListed(ItemListed),
    PriceUpdated(PriceUpdated),
    ListingCanceled(ListingCanceled),
    BuyCommitted(BuyCommitted),
    BuyCanceled(BuyCanceled),
    ItemSent(ItemSent),
    ItemReceived(ItemReceived),
}
