//! Vault custody: open, settle, refund
//!
//! A vault is a token account whose owner is a derived authority, so no
//! wallet key can move it. Lifecycle per custody slot:
//!
//! ```text
//! (none) ── open ──▶ Open ──┬── settle ──▶ (closed)
//!                           └── refund ──▶ (closed)
//! ```
//!
//! Settle and refund both require the vault to exist and both close it, so
//! at most one of them can ever succeed. The vault's storage cost goes back
//! to whoever the caller names as receiver on either path.

use bazaar_types::account::TokenAccount;
use bazaar_types::address::Address;
use tracing::debug;

use crate::config::ProgramConfig;
use crate::derivation::{self, tags, ProgramAddress};
use crate::errors::{BazaarError, LedgerError};
use crate::ledger::{Authority, Ledger};

/// Seed tags for one family of vaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustodyDomain {
    pub vault_tag: &'static [u8],
    pub authority_tag: &'static [u8],
}

impl CustodyDomain {
    pub const ESCROW: CustodyDomain = CustodyDomain {
        vault_tag: tags::ESCROW_VAULT,
        authority_tag: tags::ESCROW_AUTHORITY,
    };

    pub const OFFER: CustodyDomain = CustodyDomain {
        vault_tag: tags::OFFER_VAULT,
        authority_tag: tags::OFFER_AUTHORITY,
    };
}

/// Derived vault and authority addresses for one custody slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustodyKeys {
    domain: CustodyDomain,
    owner: Option<Address>,
    program_id: Address,
    pub vault: ProgramAddress,
    pub authority: ProgramAddress,
}

impl CustodyKeys {
    /// Derive the slot for `owner`, or the single unscoped slot if `None`.
    pub fn derive(
        config: &ProgramConfig,
        domain: CustodyDomain,
        owner: Option<&Address>,
    ) -> Result<Self, BazaarError> {
        let scope: Vec<&Address> = owner.into_iter().collect();
        let vault = derivation::derive(config, domain.vault_tag, &scope)?;
        let authority = derivation::derive(config, domain.authority_tag, &scope)?;
        Ok(Self {
            domain,
            owner: owner.copied(),
            program_id: config.program_id,
            vault,
            authority,
        })
    }

    /// Reject caller-supplied vault or authority addresses that differ from
    /// the recomputed derivation.
    pub fn verify(&self, supplied_vault: &Address, supplied_authority: &Address) -> Result<(), BazaarError> {
        if *supplied_vault != self.vault.address {
            return Err(BazaarError::AuthorityMismatch {
                expected: self.vault.address,
                supplied: *supplied_vault,
            });
        }
        if *supplied_authority != self.authority.address {
            return Err(BazaarError::AuthorityMismatch {
                expected: self.authority.address,
                supplied: *supplied_authority,
            });
        }
        Ok(())
    }

    /// Reject a claimed vault bump that is not the canonical one.
    pub fn verify_bump(&self, claimed: u8) -> Result<(), BazaarError> {
        if claimed != self.vault.bump {
            let supplied =
                derivation::create_program_address(&self.vault_seeds(), claimed, &self.program_id)?;
            return Err(BazaarError::AuthorityMismatch {
                expected: self.vault.address,
                supplied,
            });
        }
        Ok(())
    }

    fn vault_seeds(&self) -> Vec<&[u8]> {
        let mut seeds: Vec<&[u8]> = vec![self.domain.vault_tag];
        if let Some(owner) = &self.owner {
            seeds.push(owner.as_ref());
        }
        seeds
    }

    /// Signing authority for the vault, rebuilt from seeds.
    fn signer(&self) -> Result<Authority, BazaarError> {
        let mut seeds: Vec<&[u8]> = vec![self.domain.authority_tag];
        if let Some(owner) = &self.owner {
            seeds.push(owner.as_ref());
        }
        Authority::derived(&self.program_id, &seeds, self.authority.bump)
    }
}

/// Custody operations on one slot.
pub struct VaultCustody {
    keys: CustodyKeys,
}

impl VaultCustody {
    pub fn new(keys: CustodyKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &CustodyKeys {
        &self.keys
    }

    /// Create the vault and lock `amount` from the depositor's account.
    ///
    /// The depositor pays the vault's storage cost.
    pub fn open<L: Ledger>(
        &self,
        ledger: &mut L,
        mint: &Address,
        depositor_account: &Address,
        depositor: &Authority,
        amount: u64,
    ) -> Result<(), BazaarError> {
        if amount == 0 {
            return Err(BazaarError::InvalidAmount);
        }
        let vault = self.keys.vault.address;
        if ledger.account_exists(&vault) {
            return Err(BazaarError::VaultAlreadyExists { vault });
        }

        let source = existing_token_account(ledger, depositor_account)?;
        require_mint("deposit account", mint, &source)?;
        require_balance(&source, amount)?;

        ledger.create_token_account(depositor, vault, *mint, self.keys.authority.address)?;
        ledger.transfer(depositor_account, &vault, amount, depositor)?;

        debug!(
            vault = %vault,
            authority = %self.keys.authority.address,
            amount,
            "Vault opened"
        );
        Ok(())
    }

    /// Pay the full vault balance to the counterparty and close the vault.
    pub fn settle<L: Ledger>(
        &self,
        ledger: &mut L,
        supplied_vault: &Address,
        supplied_authority: &Address,
        locked_amount: u64,
        destination: &Address,
        storage_receiver: &Address,
    ) -> Result<u64, BazaarError> {
        let paid = self.release(
            ledger,
            supplied_vault,
            supplied_authority,
            locked_amount,
            destination,
            storage_receiver,
        )?;
        debug!(vault = %supplied_vault, destination = %destination, paid, "Vault settled");
        Ok(paid)
    }

    /// Return the full vault balance to the depositor and close it.
    pub fn refund<L: Ledger>(
        &self,
        ledger: &mut L,
        supplied_vault: &Address,
        supplied_authority: &Address,
        locked_amount: u64,
        depositor_account: &Address,
        storage_receiver: &Address,
    ) -> Result<u64, BazaarError> {
        let refunded = self.release(
            ledger,
            supplied_vault,
            supplied_authority,
            locked_amount,
            depositor_account,
            storage_receiver,
        )?;
        debug!(vault = %supplied_vault, depositor = %depositor_account, refunded, "Vault refunded");
        Ok(refunded)
    }

    fn release<L: Ledger>(
        &self,
        ledger: &mut L,
        supplied_vault: &Address,
        supplied_authority: &Address,
        locked_amount: u64,
        destination: &Address,
        storage_receiver: &Address,
    ) -> Result<u64, BazaarError> {
        self.keys.verify(supplied_vault, supplied_authority)?;

        let vault = ledger
            .token_account(supplied_vault)
            .ok_or(BazaarError::VaultNotFoundOrClosed {
                address: *supplied_vault,
            })?;
        if vault.owner != self.keys.authority.address {
            return Err(BazaarError::AuthorityMismatch {
                expected: self.keys.authority.address,
                supplied: vault.owner,
            });
        }
        // Anyone may credit a vault, so surplus is paid out rather than refused.
        if vault.amount < locked_amount {
            return Err(BazaarError::AmountMismatch {
                expected: locked_amount,
                actual: vault.amount,
            });
        }

        let target = existing_token_account(ledger, destination)?;
        require_mint("vault destination", &vault.mint, &target)?;

        let authority = self.keys.signer()?;
        ledger.transfer(supplied_vault, destination, vault.amount, &authority)?;
        ledger.close_token_account(supplied_vault, storage_receiver, &authority)?;
        Ok(vault.amount)
    }
}

/// Read a token account that must exist.
pub(crate) fn existing_token_account<L: Ledger>(
    ledger: &L,
    address: &Address,
) -> Result<TokenAccount, BazaarError> {
    ledger
        .token_account(address)
        .ok_or(BazaarError::Ledger(LedgerError::AccountNotFound { address: *address }))
}

pub(crate) fn require_mint(
    role: &'static str,
    expected: &Address,
    account: &TokenAccount,
) -> Result<(), BazaarError> {
    if account.mint != *expected {
        return Err(BazaarError::MintMismatch {
            role,
            expected: *expected,
            found: account.mint,
        });
    }
    Ok(())
}

pub(crate) fn require_balance(account: &TokenAccount, amount: u64) -> Result<(), BazaarError> {
    if !account.covers(amount) {
        return Err(BazaarError::InsufficientBalance {
            account: account.address,
            required: amount,
            available: account.amount,
        });
    }
    Ok(())
}
