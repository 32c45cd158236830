//! Types library for the bazaar custody engine
//!
//! Value types shared between the engine and anything that talks to it:
//! identities, token accounts and transaction identifiers. Nothing in here
//! mutates ledger state.
//!
//! # Modules
//! - `address`: 32-byte identities (wallets, token accounts, derived addresses)
//! - `ids`: Time-sortable identifiers (TransactionId)
//! - `account`: Token account and mint state
//! - `errors`: Parse errors

pub mod address;
pub mod ids;
pub mod account;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::address::*;
    pub use crate::ids::*;
    pub use crate::account::*;
    pub use crate::errors::*;
}
