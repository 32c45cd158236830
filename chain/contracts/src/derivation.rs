//! Authority derivation: program-derived addresses
//!
//! A derived address is `SHA-256(seeds ‖ bump ‖ program_id ‖ marker)` with the
//! bump chosen so the digest is *not* a valid ed25519 point. No private key
//! can exist for such an address, so the only way to act for it is to know
//! the seeds and run the program that owns them. Anyone can recompute the
//! address from public seeds; nothing here reads a secret.
//!
//! Every privileged operation re-derives instead of trusting a caller's
//! address or bump (see [`verify_program_address`]).

use bazaar_types::address::Address;
use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ProgramConfig;
use crate::errors::BazaarError;

/// Maximum number of seeds, bump included.
pub const MAX_SEEDS: usize = 16;

/// Maximum length of a single seed in bytes.
pub const MAX_SEED_LEN: usize = 32;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

/// Seed tags. Each domain uses its own tag so addresses never collide
/// across domains even for the same owner.
pub mod tags {
    pub const ESCROW_VAULT: &[u8] = b"token-seed";
    pub const ESCROW_AUTHORITY: &[u8] = b"escrow";
    pub const ESCROW_STATE: &[u8] = b"escrow-state";
    pub const OFFER_VAULT: &[u8] = b"offer-vault";
    pub const OFFER_AUTHORITY: &[u8] = b"offer-authority";
    pub const OFFER_STATE: &[u8] = b"offer-state";
    pub const LISTING: &[u8] = b"listing";
}

/// A derived address together with the bump that pushed it off the curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgramAddress {
    pub address: Address,
    pub bump: u8,
}

/// Whether the bytes decode to an ed25519 point, i.e. could be a wallet key.
pub fn is_on_curve(address: &Address) -> bool {
    VerifyingKey::from_bytes(address.as_bytes()).is_ok()
}

/// Compute the address for an explicit bump.
///
/// Fails if the seeds are malformed or the result lands on the curve.
pub fn create_program_address(
    seeds: &[&[u8]],
    bump: u8,
    program_id: &Address,
) -> Result<Address, BazaarError> {
    check_seeds(seeds)?;
    let address = hash_seeds(seeds, bump, program_id);
    if is_on_curve(&address) {
        return Err(derivation_failure(seeds));
    }
    Ok(address)
}

/// Search bumps from 255 downward and return the first off-curve address.
///
/// At most `max_attempts` bumps are tried. Running out is an explicit
/// `DerivationFailure`, never a silent fallback.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
    max_attempts: u16,
) -> Result<ProgramAddress, BazaarError> {
    check_seeds(seeds)?;
    for attempt in 0..max_attempts.min(256) {
        let bump = (255 - attempt) as u8;
        let address = hash_seeds(seeds, bump, program_id);
        if !is_on_curve(&address) {
            return Ok(ProgramAddress { address, bump });
        }
    }
    Err(derivation_failure(seeds))
}

/// Recompute the canonical derivation and compare it with a claimed address.
pub fn verify_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
    claimed: &Address,
    max_attempts: u16,
) -> Result<ProgramAddress, BazaarError> {
    let derived = find_program_address(seeds, program_id, max_attempts)?;
    if derived.address != *claimed {
        return Err(BazaarError::AuthorityMismatch {
            expected: derived.address,
            supplied: *claimed,
        });
    }
    Ok(derived)
}

/// Derive `[tag, scope...]` under the configured program.
pub fn derive(
    config: &ProgramConfig,
    tag: &[u8],
    scope: &[&Address],
) -> Result<ProgramAddress, BazaarError> {
    let mut seeds: Vec<&[u8]> = Vec::with_capacity(scope.len() + 1);
    seeds.push(tag);
    seeds.extend(scope.iter().map(|a| a.as_ref()));
    find_program_address(&seeds, &config.program_id, config.max_bump_attempts)
}

fn hash_seeds(seeds: &[&[u8]], bump: u8, program_id: &Address) -> Address {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id.as_ref());
    hasher.update(PDA_MARKER);
    Address::new(hasher.finalize().into())
}

fn check_seeds(seeds: &[&[u8]]) -> Result<(), BazaarError> {
    // The bump occupies the last slot.
    if seeds.len() >= MAX_SEEDS || seeds.iter().any(|s| s.len() > MAX_SEED_LEN) {
        return Err(derivation_failure(seeds));
    }
    Ok(())
}

fn derivation_failure(seeds: &[&[u8]]) -> BazaarError {
    let tag = seeds
        .first()
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .unwrap_or_default();
    BazaarError::DerivationFailure { tag }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;

    fn program() -> Address {
        ProgramConfig::default_program_id()
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let owner = Address::new([9u8; 32]);
        let a = find_program_address(&[b"offer-vault", owner.as_ref()], &program(), 256).unwrap();
        let b = find_program_address(&[b"offer-vault", owner.as_ref()], &program(), 256).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_distinct_owners_get_distinct_addresses() {
        let alice = Address::new([1u8; 32]);
        let bob = Address::new([2u8; 32]);
        let a = find_program_address(&[b"offer-vault", alice.as_ref()], &program(), 256).unwrap();
        let b = find_program_address(&[b"offer-vault", bob.as_ref()], &program(), 256).unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_distinct_programs_get_distinct_addresses() {
        let other = Address::new([42u8; 32]);
        let a = find_program_address(&[b"escrow"], &program(), 256).unwrap();
        let b = find_program_address(&[b"escrow"], &other, 256).unwrap();
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn test_derived_address_is_off_curve() {
        let derived = find_program_address(&[b"escrow"], &program(), 256).unwrap();
        assert!(!is_on_curve(&derived.address));
    }

    #[test]
    fn test_wallet_key_is_on_curve() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let address = Address::new(key.verifying_key().to_bytes());
        assert!(is_on_curve(&address));
    }

    #[test]
    fn test_create_matches_find_for_canonical_bump() {
        let derived = find_program_address(&[b"token-seed"], &program(), 256).unwrap();
        let created = create_program_address(&[b"token-seed"], derived.bump, &program()).unwrap();
        assert_eq!(created, derived.address);
    }

    #[test]
    fn test_oversized_seed_rejected() {
        let long = [0u8; MAX_SEED_LEN + 1];
        let result = find_program_address(&[&long], &program(), 256);
        assert!(matches!(result, Err(BazaarError::DerivationFailure { .. })));
    }

    #[test]
    fn test_too_many_seeds_rejected() {
        let seed: &[u8] = b"s";
        let seeds = vec![seed; MAX_SEEDS];
        let result = find_program_address(&seeds, &program(), 256);
        assert!(matches!(result, Err(BazaarError::DerivationFailure { .. })));
    }

    #[test]
    fn test_search_bound_exhaustion_fails_explicitly() {
        // Find seeds whose canonical bump is below 255; a single-attempt
        // search must then fail instead of returning an on-curve address.
        let mut counter = 0u32;
        let seeds_bytes = loop {
            let candidate = counter.to_le_bytes();
            let derived = find_program_address(&[b"probe", &candidate], &program(), 256).unwrap();
            if derived.bump < 255 {
                break candidate;
            }
            counter += 1;
        };
        let result = find_program_address(&[b"probe", &seeds_bytes], &program(), 1);
        assert_eq!(
            result,
            Err(BazaarError::DerivationFailure {
                tag: "probe".to_string()
            })
        );
    }

    #[test]
    fn test_verify_rejects_foreign_address() {
        let forged = Address::new([3u8; 32]);
        let result = verify_program_address(&[b"escrow"], &program(), &forged, 256);
        assert!(matches!(result, Err(BazaarError::AuthorityMismatch { .. })));
    }

    #[test]
    fn test_verify_accepts_recomputed_address() {
        let derived = find_program_address(&[b"escrow"], &program(), 256).unwrap();
        let verified = verify_program_address(&[b"escrow"], &program(), &derived.address, 256).unwrap();
        assert_eq!(verified, derived);
    }

    #[test]
    fn test_derive_scopes_by_owner() {
        let config = ProgramConfig::default();
        let owner = Address::new([5u8; 32]);
        let scoped = derive(&config, tags::OFFER_STATE, &[&owner]).unwrap();
        let manual =
            find_program_address(&[tags::OFFER_STATE, owner.as_ref()], &config.program_id, 256).unwrap();
        assert_eq!(scoped, manual);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn derived_addresses_never_land_on_curve(owner in prop::array::uniform32(any::<u8>())) {
                let owner = Address::new(owner);
                let derived = find_program_address(&[b"offer-vault", owner.as_ref()], &program(), 256).unwrap();
                prop_assert!(!is_on_curve(&derived.address));
            }

            #[test]
            fn recomputation_always_verifies(owner in prop::array::uniform32(any::<u8>())) {
                let owner = Address::new(owner);
                let seeds: [&[u8]; 2] = [b"offer-authority", owner.as_ref()];
                let derived = find_program_address(&seeds, &program(), 256).unwrap();
                let verified = verify_program_address(&seeds, &program(), &derived.address, 256).unwrap();
                prop_assert_eq!(verified.bump, derived.bump);
            }
        }
    }
}
