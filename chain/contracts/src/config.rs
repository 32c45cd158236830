//! Program and ledger configuration
//!
//! Both configs deserialize from JSON with every field optional, falling back
//! to the defaults below.

use bazaar_types::address::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;

/// Largest number of bumps a derivation search may try (255 down to 0).
pub const MAX_BUMP_ATTEMPTS: u16 = 256;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_bump_attempts must be in 1..={max}, got {value}")]
    InvalidBumpBound { value: u16, max: u16 },

    #[error("lamports_per_byte must be positive")]
    InvalidRent,
}

/// How escrow vault, authority and record seeds are scoped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscrowSlot {
    /// Fixed seeds: a single escrow may be in flight program-wide.
    Global,
    /// Seeds include the initializer, one escrow in flight per initializer.
    PerInitializer,
}

/// Whether offers are bound to the acceptor's listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingPolicy {
    /// AcceptOffer must name the acceptor's listing; acceptor identity,
    /// amount, mint and deposit account are checked against it.
    Enforced,
    /// Listings are informational; any party with matching accounts may accept.
    Advisory,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgramConfig {
    /// Identity every derived address is scoped under
    pub program_id: Address,
    /// Bump search bound for address derivation
    pub max_bump_attempts: u16,
    pub escrow_slot: EscrowSlot,
    pub listing_policy: ListingPolicy,
}

impl ProgramConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bump_attempts == 0 || self.max_bump_attempts > MAX_BUMP_ATTEMPTS {
            return Err(ConfigError::InvalidBumpBound {
                value: self.max_bump_attempts,
                max: MAX_BUMP_ATTEMPTS,
            });
        }
        Ok(())
    }

    /// Default program identity: SHA-256 of the program name.
    pub fn default_program_id() -> Address {
        Address::new(Sha256::digest(b"bazaar-contracts").into())
    }
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            program_id: Self::default_program_id(),
            max_bump_attempts: MAX_BUMP_ATTEMPTS,
            escrow_slot: EscrowSlot::Global,
            listing_policy: ListingPolicy::Enforced,
        }
    }
}

/// Storage-cost schedule for the in-memory ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Lamports charged per byte of account storage, including overhead
    pub lamports_per_byte: u64,
}

impl LedgerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.lamports_per_byte == 0 {
            return Err(ConfigError::InvalidRent);
        }
        Ok(config)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lamports_per_byte: 6960,
        }
    }
}
