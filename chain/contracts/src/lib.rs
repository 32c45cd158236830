//! Custody and settlement contracts for the bazaar
//!
//! A custodial atomic-swap engine: vaults hold one party's deposit until a
//! counterparty pays the recorded amount or the depositor withdraws. Vaults
//! are owned by program-derived authorities, so no wallet key can move them.
//!
//! # Modules
//! - `config`: Program and ledger configuration
//! - `derivation`: Program-derived addresses and seed tags
//! - `custody`: Vault open / settle / refund
//! - `escrow`: Fixed bilateral swap
//! - `listing`: Non-custodial price advertisements
//! - `offer`: Many offerors against one acceptor
//! - `instruction`: Instruction surface, account lists and client builders
//! - `program`: Instruction dispatch
//! - `ledger`: Ledger seam, in-memory ledger and local transaction runner
//! - `transaction`: Signed transactions
//! - `security`: Signer and account checks
//! - `state`: Program-owned records
//! - `events`: Contract events
//! - `errors`: Contract-specific error types

pub mod config;
pub mod custody;
pub mod derivation;
pub mod errors;
pub mod escrow;
pub mod events;
pub mod instruction;
pub mod ledger;
pub mod listing;
pub mod offer;
pub mod program;
pub mod security;
pub mod state;
pub mod transaction;

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
