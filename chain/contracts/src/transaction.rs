//! Signed transactions
//!
//! A transaction is one instruction plus ed25519 signatures over the SHA-256
//! of the canonical JSON of its id and instruction. Signing the id binds each
//! signature to one submission, so a replay can be rejected by id alone.
//! Verification yields the [`Signers`] set handlers use as proof of
//! authorization.

use bazaar_types::address::Address;
use bazaar_types::ids::TransactionId;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::BazaarError;
use crate::instruction::Instruction;
use crate::security::Signers;

/// Address of a wallet key.
pub fn signer_address(key: &SigningKey) -> Address {
    Address::new(key.verifying_key().to_bytes())
}

/// One signature entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub signer: Address,
    /// Ed25519 signature as hex string
    pub signature: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub instruction: Instruction,
    pub signatures: Vec<TransactionSignature>,
}

impl Transaction {
    /// Unsigned transaction, mostly useful for tests of the signature checks.
    pub fn new(instruction: Instruction) -> Self {
        Self {
            id: TransactionId::new(),
            instruction,
            signatures: Vec::new(),
        }
    }

    /// Build a transaction signed by every key in `keys`.
    pub fn new_signed(instruction: Instruction, keys: &[&SigningKey]) -> Result<Self, BazaarError> {
        let mut tx = Self::new(instruction);
        for key in keys {
            tx.sign(key)?;
        }
        Ok(tx)
    }

    /// Add a signature from `key`.
    pub fn sign(&mut self, key: &SigningKey) -> Result<(), BazaarError> {
        let hash = self.message_hash()?;
        let signature = key.sign(&hash);
        self.signatures.push(TransactionSignature {
            signer: signer_address(key),
            signature: hex::encode(signature.to_bytes()),
        });
        Ok(())
    }

    /// SHA-256 of the canonical JSON encoding of `(id, instruction)`.
    pub fn message_hash(&self) -> Result<[u8; 32], BazaarError> {
        let bytes = serde_json::to_vec(&(&self.id, &self.instruction)).map_err(|e| BazaarError::Encoding {
            reason: e.to_string(),
        })?;
        Ok(Sha256::digest(&bytes).into())
    }

    /// Verify every signature and return the verified signer set.
    ///
    /// One bad signature rejects the whole transaction.
    pub fn verify(&self) -> Result<Signers, BazaarError> {
        let hash = self.message_hash()?;
        for entry in &self.signatures {
            let invalid = || BazaarError::InvalidSignature {
                address: entry.signer,
            };
            let verifying_key = VerifyingKey::from_bytes(entry.signer.as_bytes()).map_err(|_| invalid())?;
            let sig_bytes: [u8; 64] = hex::decode(&entry.signature)
                .map_err(|_| invalid())?
                .try_into()
                .map_err(|_| invalid())?;
            let signature = Signature::from_bytes(&sig_bytes);
            verifying_key
                .verify(&hash, &signature)
                .map_err(|_| invalid())?;
        }
        Ok(Signers::from_verified(
            self.signatures.iter().map(|s| s.signer),
        ))
    }
}
