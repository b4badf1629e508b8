//! Collateral balance records
//!
//! Each (owner, asset) pair maps to one record splitting the owner's
//! collateral into `open` (withdrawable, available for new commitments) and
//! `locked` (pledged against active listings). Amounts are unsigned base
//! units; all mutation happens in the ledger through checked arithmetic, so
//! a record can never go negative or wrap.

use serde::{Deserialize, Serialize};

/// Open/locked collateral for a single (owner, asset) pair.
///
/// Invariant: `open + locked` equals the net amount the owner has deposited
/// minus withdrawn, adjusted by settlements transferring value between
/// owners. A zeroed record is equivalent to an absent one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralBalance {
    /// Collateral available to withdraw or to apply to a new commitment
    pub open: u128,
    /// Collateral currently pledged against one or more listings
    pub locked: u128,
}

impl CollateralBalance {
    /// Create a record with the given open balance and nothing locked.
    pub fn with_open(open: u128) -> Self {
        Self { open, locked: 0 }
    }

    /// Total collateral held for this pair, `None` on overflow.
    pub fn total(&self) -> Option<u128> {
        self.open.checked_add(self.locked)
    }

    /// Whether this record is indistinguishable from an absent one.
    pub fn is_zero(&self) -> bool {
        self.open == 0 && self.locked == 0
    }
}
