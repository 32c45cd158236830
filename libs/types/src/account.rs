//! Token account and mint state
//!
//! Mirrors the shape a token ledger exposes through its balance oracle:
//! every token account has exactly one mint and one owner, and the owner is
//! the only identity allowed to move or close it.

use crate::address::Address;
use serde::{Deserialize, Serialize};

/// Storage size of a token account in bytes.
pub const TOKEN_ACCOUNT_SPACE: usize = 165;

/// Storage size of a mint in bytes.
pub const MINT_SPACE: usize = 82;

/// A token balance held for one owner in one mint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAccount {
    pub address: Address,
    pub mint: Address,
    /// Wallet key or program-derived authority allowed to move the funds
    pub owner: Address,
    pub amount: u64,
}

impl TokenAccount {
    /// Create an empty token account.
    pub fn new(address: Address, mint: Address, owner: Address) -> Self {
        Self {
            address,
            mint,
            owner,
            amount: 0,
        }
    }

    /// Whether the account can cover `amount`.
    pub fn covers(&self, amount: u64) -> bool {
        self.amount >= amount
    }

    /// Whether the account holds nothing.
    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }
}

/// A token definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mint {
    pub address: Address,
    pub decimals: u8,
    /// Total amount minted and not burned
    pub supply: u64,
}

impl Mint {
    pub fn new(address: Address, decimals: u8) -> Self {
        Self {
            address,
            decimals,
            supply: 0,
        }
    }
}
