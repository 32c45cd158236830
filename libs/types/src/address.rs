//! 32-byte identities
//!
//! Wallet keys, token accounts and program-derived addresses all share the
//! same representation. Whether an address can sign is not a property of the
//! bytes alone: wallet addresses are ed25519 public keys, derived addresses
//! are deliberately off the curve.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::errors::ParseAddressError;

/// Length of an address in bytes.
pub const ADDRESS_BYTES: usize = 32;

/// A 32-byte account identity.
///
/// Displays and serializes as lowercase hex.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_BYTES]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; ADDRESS_BYTES]);

    /// Wrap raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }

    /// A fresh address nobody holds a key for.
    ///
    /// SHA-256 of a UUID v7, so two calls never collide in practice. Used for
    /// token accounts and mints created by a ledger.
    pub fn new_unique() -> Self {
        let digest = Sha256::digest(Uuid::now_v7().as_bytes());
        Self(digest.into())
    }

    /// Raw bytes.
    pub fn to_bytes(&self) -> [u8; ADDRESS_BYTES] {
        self.0
    }

    /// Borrow the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_BYTES] {
        &self.0
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ADDRESS_BYTES]> for Address {
    fn from(bytes: [u8; ADDRESS_BYTES]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| ParseAddressError::InvalidHex(e.to_string()))?;
        let array: [u8; ADDRESS_BYTES] = bytes
            .try_into()
            .map_err(|b: Vec<u8>| ParseAddressError::InvalidLength(b.len()))?;
        Ok(Self(array))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_unique_addresses_differ() {
        let a = Address::new_unique();
        let b = Address::new_unique();
        assert_ne!(a, b, "Unique addresses should never collide");
    }

    #[test]
    fn test_display_is_hex() {
        let addr = Address::new([0xab; 32]);
        assert_eq!(addr.to_string(), "ab".repeat(32));
    }

    #[test]
    fn test_parse_round_trip() {
        let addr = Address::new_unique();
        let parsed: Address = addr.to_string().parse().unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn test_parse_rejects_short_input() {
        let result = "abcd".parse::<Address>();
        assert_eq!(result, Err(ParseAddressError::InvalidLength(2)));
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        let result = "zz".repeat(32).parse::<Address>();
        assert!(matches!(result, Err(ParseAddressError::InvalidHex(_))));
    }

    #[test]
    fn test_serializes_as_hex_string() {
        let addr = Address::new([1u8; 32]);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));

        let deserialized: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, deserialized);
    }

    #[test]
    fn test_as_ref_exposes_raw_bytes() {
        let addr = Address::new([7u8; 32]);
        let seed: &[u8] = addr.as_ref();
        assert_eq!(seed.len(), ADDRESS_BYTES);
        assert!(seed.iter().all(|b| *b == 7));
    }
}
