//! Contract Logic for Collateral Custody & Escrow Settlement
//!
//! This crate implements the core of a collateralized peer-to-peer escrow
//! marketplace: sellers list items against a collateral deposit, buyers
//! commit by posting payment plus matching collateral, and funds settle only
//! once both sides confirm the handoff.
//!
//! # Modules
//! - `errors`: Error taxonomy for transfer, ledger, and registry operations
//! - `events`: Immutable records emitted by contract operations
//! - `transfer`: Asset transfer adapter over the external asset rails
//! - `ledger`: Per-(owner, asset) open/locked collateral accounting
//! - `registry`: Per-seller listing lifecycle and settlement coordination
//!
//! # Version
//! v0.1.0 — initial implementation

pub mod errors;
pub mod events;
pub mod ledger;
pub mod registry;
pub mod transfer;

/// Contract ABI version — frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";

/// Multiple of the asking price a buyer must lock when committing:
/// the payment itself plus an equal collateral share against reneging.
pub const BUYER_COLLATERAL_FACTOR: u128 = 2;
