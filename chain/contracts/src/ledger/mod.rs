//! Ledger seam: the primitives the engine consumes
//!
//! The engine never owns balances. It reads them through the balance oracle
//! half of [`Ledger`] and mutates them only through the create / transfer /
//! close primitives. The ledger is expected to run each instruction
//! atomically; [`MemoryLedger`] and [`Bank`] provide that for local use.

pub mod bank;
pub mod memory;

pub use bank::{Bank, Receipt};
pub use memory::MemoryLedger;

use bazaar_types::account::TokenAccount;
use bazaar_types::address::Address;

use crate::derivation::create_program_address;
use crate::errors::{BazaarError, LedgerError};
use crate::security::Signers;
use crate::state::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthorityKind {
    Signer,
    Derived,
}

/// Proof of the right to move or close an account.
///
/// Only two constructors exist: one checks the verified signer set, the other
/// recomputes a derived address from seeds. A ledger compares
/// [`Authority::address`] with the account owner and nothing else, so an
/// `Authority` for an address can only be obtained by someone entitled to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    address: Address,
    kind: AuthorityKind,
}

impl Authority {
    /// Authority of a party that signed the current transaction.
    pub fn signer(address: &Address, signers: &Signers) -> Result<Self, BazaarError> {
        signers.require(address)?;
        Ok(Self {
            address: *address,
            kind: AuthorityKind::Signer,
        })
    }

    /// Authority of a program-derived address, re-derived from its seeds.
    pub fn derived(program_id: &Address, seeds: &[&[u8]], bump: u8) -> Result<Self, BazaarError> {
        let address = create_program_address(seeds, bump, program_id)?;
        Ok(Self {
            address,
            kind: AuthorityKind::Derived,
        })
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn is_derived(&self) -> bool {
        self.kind == AuthorityKind::Derived
    }
}

/// Ledger primitives and balance oracle.
///
/// Records are program-owned: `close_record` is only reachable from the
/// program, so it takes no authority.
pub trait Ledger {
    /// Native balance used to pay storage cost.
    fn lamports(&self, address: &Address) -> u64;

    fn token_account(&self, address: &Address) -> Option<TokenAccount>;

    fn record(&self, address: &Address) -> Option<Record>;

    /// Whether any account (token, mint or record) lives at `address`.
    fn account_exists(&self, address: &Address) -> bool;

    /// Storage cost of an account of `space` bytes.
    fn minimum_balance(&self, space: usize) -> u64;

    /// Create an empty token account owned by `owner`, paid for by `payer`.
    fn create_token_account(
        &mut self,
        payer: &Authority,
        address: Address,
        mint: Address,
        owner: Address,
    ) -> Result<(), LedgerError>;

    /// Move tokens between two accounts of the same mint.
    fn transfer(
        &mut self,
        source: &Address,
        destination: &Address,
        amount: u64,
        authority: &Authority,
    ) -> Result<(), LedgerError>;

    /// Close an empty token account and return its storage lamports to
    /// `destination`. Returns the lamports reclaimed.
    fn close_token_account(
        &mut self,
        account: &Address,
        destination: &Address,
        authority: &Authority,
    ) -> Result<u64, LedgerError>;

    /// Store a record, paid for by `payer`.
    fn create_record(
        &mut self,
        payer: &Authority,
        address: Address,
        record: Record,
    ) -> Result<(), LedgerError>;

    /// Remove a record and return its storage lamports to `destination`.
    fn close_record(&mut self, address: &Address, destination: &Address) -> Result<u64, LedgerError>;
}
