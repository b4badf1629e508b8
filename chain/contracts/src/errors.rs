//! Contract-specific error types
//!
//! Comprehensive error taxonomy for transfer, ledger, and registry
//! operations. Every failure aborts the whole operation with no partial
//! mutation, so each variant describes a call that left state untouched.

use thiserror::Error;
use types::asset::Asset;
use types::ids::AccountId;
use types::listing::ListingState;

/// Transfer-adapter errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Attached value {attached} does not cover deposit of {required}")]
    InsufficientValueSent { required: u128, attached: u128 },

    #[error("Asset transfer failed: {reason}")]
    Failed { reason: String },
}

/// Ledger-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient open collateral for {asset}: required {required}, available {available}")]
    InsufficientOpen {
        asset: Asset,
        required: u128,
        available: u128,
    },

    #[error("Insufficient locked collateral for {asset}: required {required}, available {available}")]
    InsufficientLocked {
        asset: Asset,
        required: u128,
        available: u128,
    },

    #[error("Attached value {attached} does not match required {required}")]
    ValueMismatch { required: u128, attached: u128 },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),
}

/// Registry-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    #[error("No listing at index {index} for seller {seller}")]
    InvalidListing { seller: AccountId, index: u64 },

    #[error("Item reference must not be empty")]
    EmptyItemReference,

    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    #[error("Operation {operation} not allowed in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ListingState,
    },

    #[error("Caller {caller} is not authorized for this operation")]
    NotAuthorized { caller: AccountId },

    #[error("Arithmetic overflow computing required collateral")]
    Overflow,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
