//! Contract-specific error types
//!
//! Every failure aborts the whole instruction. Variants are split per
//! precondition so callers can branch on the cause instead of parsing text.

use bazaar_types::address::Address;
use bazaar_types::ids::TransactionId;
use thiserror::Error;

/// Failures raised by ledger primitives (create, transfer, close).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account not found: {address}")]
    AccountNotFound { address: Address },

    #[error("Account already exists: {address}")]
    AccountAlreadyExists { address: Address },

    #[error("Account {address} is owned by {owner}, not {authority}")]
    OwnerMismatch {
        address: Address,
        owner: Address,
        authority: Address,
    },

    #[error("Insufficient tokens in {address}: required {required}, available {available}")]
    InsufficientFunds {
        address: Address,
        required: u64,
        available: u64,
    },

    #[error("Insufficient lamports in {address}: required {required}, available {available}")]
    InsufficientLamports {
        address: Address,
        required: u64,
        available: u64,
    },

    #[error("Mint mismatch between {source_account} and {destination}")]
    MintMismatch {
        source_account: Address,
        destination: Address,
    },

    #[error("Mint not found: {mint}")]
    MintNotFound { mint: Address },

    #[error("Cannot close {address}: {remaining} tokens remain")]
    NonEmptyAccount { address: Address, remaining: u64 },

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Engine errors for custody, escrow, listing and offer operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BazaarError {
    #[error("Insufficient balance in {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: Address,
        required: u64,
        available: u64,
    },

    #[error("Vault already exists at {vault}")]
    VaultAlreadyExists { vault: Address },

    #[error("Vault or record not found or already closed: {address}")]
    VaultNotFoundOrClosed { address: Address },

    #[error("Authority mismatch: expected {expected}, supplied {supplied}")]
    AuthorityMismatch { expected: Address, supplied: Address },

    #[error("Signer mismatch: operation requires {expected}, invoked by {supplied}")]
    SignerMismatch { expected: Address, supplied: Address },

    #[error("Amount mismatch: expected {expected}, got {actual}")]
    AmountMismatch { expected: u64, actual: u64 },

    #[error("No valid program address for seed tag '{tag}'")]
    DerivationFailure { tag: String },

    #[error("Missing required signature from {address}")]
    MissingSignature { address: Address },

    #[error("Invalid transaction signature for {address}")]
    InvalidSignature { address: Address },

    #[error("Account mismatch for {role}: expected {expected}, supplied {supplied}")]
    AccountMismatch {
        role: &'static str,
        expected: Address,
        supplied: Address,
    },

    #[error("Mint mismatch for {role}: expected {expected}, found {found}")]
    MintMismatch {
        role: &'static str,
        expected: Address,
        found: Address,
    },

    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Listing not found: {listing}")]
    ListingNotFound { listing: Address },

    #[error("Value not conserved for {asset}: before {before}, after {after}")]
    ConservationViolated {
        asset: String,
        before: u128,
        after: u128,
    },

    #[error("Transaction already processed: {id}")]
    AlreadyProcessed { id: TransactionId },

    #[error("Failed to encode instruction: {reason}")]
    Encoding { reason: String },

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
