//! Asset partition key
//!
//! Every balance record and every listing price is denominated in exactly one
//! asset: either the chain's native value or a fungible-token contract. The
//! ledger uses `Asset` as a map key and never inspects it beyond dispatching
//! transfers.

use crate::ids::TokenId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Asset identifier: native value or a reference to a fungible-token contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The chain's native value, moved by attaching value to a call
    Native,
    /// A fungible-token contract, moved via allowance-based transfers
    Token(TokenId),
}

impl Asset {
    /// Check whether this is the native asset.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    /// Get the token contract handle, if any.
    pub fn token(&self) -> Option<&TokenId> {
        match self {
            Self::Native => None,
            Self::Token(token) => Some(token),
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => write!(f, "native"),
            Self::Token(token) => write!(f, "token:{}", token),
        }
    }
}

impl From<TokenId> for Asset {
    fn from(token: TokenId) -> Self {
        Self::Token(token)
    }
}
