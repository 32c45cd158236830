//! Signer checks shared by every instruction handler
//!
//! A [`Signers`] set is only produced from verified transaction signatures,
//! so handlers can treat membership as proof that the party authorized the
//! instruction.

use bazaar_types::address::Address;
use std::collections::BTreeSet;

use crate::errors::BazaarError;

/// Identities whose signatures were verified for the current transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signers {
    verified: BTreeSet<Address>,
}

impl Signers {
    pub(crate) fn from_verified(verified: impl IntoIterator<Item = Address>) -> Self {
        Self {
            verified: verified.into_iter().collect(),
        }
    }

    /// Whether `address` signed.
    pub fn contains(&self, address: &Address) -> bool {
        self.verified.contains(address)
    }

    /// Require a signature from `address`.
    pub fn require(&self, address: &Address) -> Result<(), BazaarError> {
        if !self.contains(address) {
            return Err(BazaarError::MissingSignature { address: *address });
        }
        Ok(())
    }

    /// Require that the supplied party both signed and is the party the
    /// record names. Checked in that order so a missing signature is not
    /// reported as an identity mismatch.
    pub fn require_party(&self, expected: &Address, supplied: &Address) -> Result<(), BazaarError> {
        self.require(supplied)?;
        if supplied != expected {
            return Err(BazaarError::SignerMismatch {
                expected: *expected,
                supplied: *supplied,
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.verified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verified.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.verified.iter()
    }
}

/// Require `supplied` to equal the account a record or derivation names.
pub fn require_account(
    role: &'static str,
    expected: &Address,
    supplied: &Address,
) -> Result<(), BazaarError> {
    if expected != supplied {
        return Err(BazaarError::AccountMismatch {
            role,
            expected: *expected,
            supplied: *supplied,
        });
    }
    Ok(())
}

/// Require a caller-supplied program address to equal the recomputed one.
pub fn require_derived(expected: &Address, supplied: &Address) -> Result<(), BazaarError> {
    if expected != supplied {
        return Err(BazaarError::AuthorityMismatch {
            expected: *expected,
            supplied: *supplied,
        });
    }
    Ok(())
}
