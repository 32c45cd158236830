//! In-memory ledger
//!
//! Hash-map backed implementation of [`Ledger`] with the harness helpers a
//! local runtime needs (airdrops, mints, user token accounts). State is
//! `Clone`, which is how [`MemoryLedger::atomically`] rolls back.

use bazaar_types::account::{Mint, TokenAccount, MINT_SPACE, TOKEN_ACCOUNT_SPACE};
use bazaar_types::address::Address;
use std::collections::{BTreeMap, HashMap};

use super::{Authority, Ledger};
use crate::config::LedgerConfig;
use crate::errors::LedgerError;
use crate::state::Record;

/// Per-account storage overhead charged on top of the data size.
pub const ACCOUNT_STORAGE_OVERHEAD: usize = 128;

/// Total value held by the ledger, per mint and in lamports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValueSnapshot {
    pub tokens: BTreeMap<Address, u128>,
    pub lamports: u128,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    config: LedgerConfig,
    lamports: HashMap<Address, u64>,
    mints: HashMap<Address, Mint>,
    token_accounts: HashMap<Address, TokenAccount>,
    records: HashMap<Address, Record>,
}

impl MemoryLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // ───────────────────────── Atomic execution ─────────────────────────

    /// Run `f` against the ledger; on error every mutation it made is undone.
    pub fn atomically<T, E>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, E>) -> Result<T, E> {
        let snapshot = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = snapshot;
        }
        result
    }

    // ───────────────────────── Harness helpers ─────────────────────────

    /// Credit lamports out of thin air.
    pub fn airdrop(&mut self, address: &Address, lamports: u64) {
        let balance = self.lamports.entry(*address).or_insert(0);
        *balance = balance.saturating_add(lamports);
    }

    /// Create a new mint and return its address.
    pub fn create_mint(&mut self, decimals: u8) -> Address {
        let address = Address::new_unique();
        let rent = self.minimum_balance(MINT_SPACE);
        self.mints.insert(address, Mint::new(address, decimals));
        self.lamports.insert(address, rent);
        address
    }

    /// Create an empty token account for a wallet outside of any instruction.
    pub fn create_token_account_for(
        &mut self,
        owner: &Address,
        mint: &Address,
    ) -> Result<Address, LedgerError> {
        if !self.mints.contains_key(mint) {
            return Err(LedgerError::MintNotFound { mint: *mint });
        }
        let address = Address::new_unique();
        let rent = self.minimum_balance(TOKEN_ACCOUNT_SPACE);
        self.token_accounts
            .insert(address, TokenAccount::new(address, *mint, *owner));
        self.lamports.insert(address, rent);
        Ok(address)
    }

    /// Mint new tokens into an account.
    pub fn mint_to(&mut self, mint: &Address, account: &Address, amount: u64) -> Result<(), LedgerError> {
        let mint_state = self
            .mints
            .get_mut(mint)
            .ok_or(LedgerError::MintNotFound { mint: *mint })?;
        let target = self
            .token_accounts
            .get_mut(account)
            .ok_or(LedgerError::AccountNotFound { address: *account })?;
        if target.mint != *mint {
            return Err(LedgerError::MintMismatch {
                source_account: *mint,
                destination: *account,
            });
        }
        let new_supply = mint_state.supply.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let new_amount = target.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;
        mint_state.supply = new_supply;
        target.amount = new_amount;
        Ok(())
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn mint(&self, address: &Address) -> Option<&Mint> {
        self.mints.get(address)
    }

    /// Minted supply, zero for an unknown mint.
    pub fn supply(&self, mint: &Address) -> u64 {
        self.mints.get(mint).map_or(0, |m| m.supply)
    }

    /// Token balance, zero if the account does not exist.
    pub fn balance(&self, address: &Address) -> u64 {
        self.token_accounts.get(address).map_or(0, |a| a.amount)
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Sum of balances per mint plus total lamports.
    pub fn value_snapshot(&self) -> ValueSnapshot {
        let mut tokens: BTreeMap<Address, u128> = self.mints.keys().map(|m| (*m, 0)).collect();
        for account in self.token_accounts.values() {
            *tokens.entry(account.mint).or_insert(0) += u128::from(account.amount);
        }
        let lamports = self.lamports.values().map(|l| u128::from(*l)).sum();
        ValueSnapshot { tokens, lamports }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    // ───────────────────────── Internal ─────────────────────────

    fn charge_storage(&mut self, payer: &Authority, address: Address, space: usize) -> Result<(), LedgerError> {
        let cost = self.minimum_balance(space);
        let available = self.lamports(payer.address());
        if available < cost {
            return Err(LedgerError::InsufficientLamports {
                address: *payer.address(),
                required: cost,
                available,
            });
        }
        self.lamports.insert(*payer.address(), available - cost);
        self.lamports.insert(address, cost);
        Ok(())
    }

    fn reclaim_storage(&mut self, address: &Address, destination: &Address) -> Result<u64, LedgerError> {
        let reclaimed = self.lamports.remove(address).unwrap_or(0);
        let balance = self.lamports.entry(*destination).or_insert(0);
        *balance = balance.checked_add(reclaimed).ok_or(LedgerError::Overflow)?;
        Ok(reclaimed)
    }

    fn check_owner(account: &TokenAccount, authority: &Authority) -> Result<(), LedgerError> {
        if account.owner != *authority.address() {
            return Err(LedgerError::OwnerMismatch {
                address: account.address,
                owner: account.owner,
                authority: *authority.address(),
            });
        }
        Ok(())
    }
}

impl Ledger for MemoryLedger {
    fn lamports(&self, address: &Address) -> u64 {
        self.lamports.get(address).copied().unwrap_or(0)
    }

    fn token_account(&self, address: &Address) -> Option<TokenAccount> {
        self.token_accounts.get(address).cloned()
    }

    fn record(&self, address: &Address) -> Option<Record> {
        self.records.get(address).cloned()
    }

    fn account_exists(&self, address: &Address) -> bool {
        self.token_accounts.contains_key(address)
            || self.records.contains_key(address)
            || self.mints.contains_key(address)
    }

    fn minimum_balance(&self, space: usize) -> u64 {
        ((ACCOUNT_STORAGE_OVERHEAD + space) as u64).saturating_mul(self.config.lamports_per_byte)
    }

    fn create_token_account(
        &mut self,
        payer: &Authority,
        address: Address,
        mint: Address,
        owner: Address,
    ) -> Result<(), LedgerError> {
        if self.account_exists(&address) {
            return Err(LedgerError::AccountAlreadyExists { address });
        }
        if !self.mints.contains_key(&mint) {
            return Err(LedgerError::MintNotFound { mint });
        }
        self.charge_storage(payer, address, TOKEN_ACCOUNT_SPACE)?;
        self.token_accounts
            .insert(address, TokenAccount::new(address, mint, owner));
        Ok(())
    }

    fn transfer(
        &mut self,
        source: &Address,
        destination: &Address,
        amount: u64,
        authority: &Authority,
    ) -> Result<(), LedgerError> {
        let from = self
            .token_accounts
            .get(source)
            .ok_or(LedgerError::AccountNotFound { address: *source })?;
        let to = self
            .token_accounts
            .get(destination)
            .ok_or(LedgerError::AccountNotFound { address: *destination })?;

        Self::check_owner(from, authority)?;
        if from.mint != to.mint {
            return Err(LedgerError::MintMismatch {
                source_account: *source,
                destination: *destination,
            });
        }
        if from.amount < amount {
            return Err(LedgerError::InsufficientFunds {
                address: *source,
                required: amount,
                available: from.amount,
            });
        }
        if source == destination {
            return Ok(());
        }
        let credited = to.amount.checked_add(amount).ok_or(LedgerError::Overflow)?;
        let debited = from.amount - amount;

        if let Some(from) = self.token_accounts.get_mut(source) {
            from.amount = debited;
        }
        if let Some(to) = self.token_accounts.get_mut(destination) {
            to.amount = credited;
        }
        Ok(())
    }

    fn close_token_account(
        &mut self,
        account: &Address,
        destination: &Address,
        authority: &Authority,
    ) -> Result<u64, LedgerError> {
        let state = self
            .token_accounts
            .get(account)
            .ok_or(LedgerError::AccountNotFound { address: *account })?;
        Self::check_owner(state, authority)?;
        if !state.is_empty() {
            return Err(LedgerError::NonEmptyAccount {
                address: *account,
                remaining: state.amount,
            });
        }
        self.token_accounts.remove(account);
        self.reclaim_storage(account, destination)
    }

    fn create_record(
        &mut self,
        payer: &Authority,
        address: Address,
        record: Record,
    ) -> Result<(), LedgerError> {
        if self.account_exists(&address) {
            return Err(LedgerError::AccountAlreadyExists { address });
        }
        self.charge_storage(payer, address, record.space())?;
        self.records.insert(address, record);
        Ok(())
    }

    fn close_record(&mut self, address: &Address, destination: &Address) -> Result<u64, LedgerError> {
        if self.records.remove(address).is_none() {
            return Err(LedgerError::AccountNotFound { address: *address });
        }
        self.reclaim_storage(address, destination)
    }
}
