//! Listing lifecycle types
//!
//! A listing is a sale commitment keyed by (seller, index). The index is a
//! seller-scoped counter starting at 0 and never recycled; cancelled and
//! received listings stay in place for audit reads.

use crate::asset::Asset;
use crate::ids::AccountId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Listing state machine.
///
/// `Received` and `Canceled` are terminal; every other state has exactly one
/// forward transition plus, for `BuyCommitted`, the backward transition to
/// `Listed` when the buyer withdraws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingState {
    /// Listed for sale, seller collateral locked
    Listed,
    /// Buyer committed, payment and matching collateral locked
    BuyCommitted,
    /// Seller reports the item handed off
    Sent,
    /// Buyer confirms receipt, funds settled
    Received,
    /// Seller withdrew the listing
    Canceled,
}

impl ListingState {
    /// Check if this is a terminal state (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Received | Self::Canceled)
    }

    /// States in which the seller may reprice or cancel
    pub fn can_modify(&self) -> bool {
        matches!(self, Self::Listed)
    }

    /// States in which a buyer may commit
    pub fn can_buy(&self) -> bool {
        matches!(self, Self::Listed)
    }

    /// States in which the committed buyer may back out
    pub fn can_cancel_buy(&self) -> bool {
        matches!(self, Self::BuyCommitted)
    }

    /// States in which the seller may report the handoff
    pub fn can_mark_sent(&self) -> bool {
        matches!(self, Self::BuyCommitted)
    }

    /// States in which the buyer may confirm receipt
    pub fn can_mark_received(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

impl fmt::Display for ListingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Listed => "Listed",
            Self::BuyCommitted => "BuyCommitted",
            Self::Sent => "Sent",
            Self::Received => "Received",
            Self::Canceled => "Canceled",
        };
        write!(f, "{}", name)
    }
}

/// Fixed-size opaque handle identifying the item for sale.
///
/// The all-zero handle is the sentinel for "slot never used" and is rejected
/// at listing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemRef(pub [u8; 32]);

impl ItemRef {
    /// The empty sentinel handle.
    pub const EMPTY: Self = Self([0u8; 32]);

    /// Create a handle from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Whether this is the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Raw bytes of the handle.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// A single listing slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    /// Opaque handle to the item for sale (non-empty once listed)
    pub item: ItemRef,
    /// Asking price in base units of `asset`
    pub price: u128,
    /// Asset the price is denominated in
    pub asset: Asset,
    /// Committed buyer, absent until a buy is committed
    pub buyer: Option<AccountId>,
    /// Lifecycle state
    pub state: ListingState,
}

impl Listing {
    /// Create a fresh listing in the `Listed` state.
    pub fn new(item: ItemRef, price: u128, asset: Asset) -> Self {
        Self {
            item,
            price,
            asset,
            buyer: None,
            state: ListingState::Listed,
        }
    }
}
