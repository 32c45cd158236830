//! Escrow: fixed bilateral swap
//!
//! One initializer locks `deposit_amount` and names `desired_amount`; one
//! taker pays the desired amount and receives the vault. The record lives at
//! a derived address and is removed on exchange or cancel, so both terminal
//! states look the same: the record and vault are gone.
//!
//! Seeds are unscoped under [`EscrowSlot::Global`], which allows a single
//! escrow in flight program-wide. [`EscrowSlot::PerInitializer`] adds the
//! initializer to every seed.

use bazaar_types::address::Address;

use crate::config::{EscrowSlot, ProgramConfig};
use crate::custody::{existing_token_account, require_balance, require_mint, CustodyDomain, CustodyKeys, VaultCustody};
use crate::derivation::{self, tags, ProgramAddress};
use crate::errors::BazaarError;
use crate::events::{ContractEvent, EscrowCancelled, EscrowExchanged, EscrowInitialized};
use crate::instruction::{CancelEscrowAccounts, ExchangeAccounts, InitializeEscrowAccounts};
use crate::ledger::{Authority, Ledger};
use crate::program::Context;
use crate::security::{require_account, require_derived};
use crate::state::{EscrowRecord, Record};

fn scope<'a>(config: &ProgramConfig, initializer: &'a Address) -> Option<&'a Address> {
    match config.escrow_slot {
        EscrowSlot::Global => None,
        EscrowSlot::PerInitializer => Some(initializer),
    }
}

/// Address of the escrow record for `initializer`.
pub fn escrow_address(config: &ProgramConfig, initializer: &Address) -> Result<ProgramAddress, BazaarError> {
    let scope: Vec<&Address> = scope(config, initializer).into_iter().collect();
    derivation::derive(config, tags::ESCROW_STATE, &scope)
}

/// Vault and authority for `initializer`'s escrow.
pub fn escrow_custody(config: &ProgramConfig, initializer: &Address) -> Result<CustodyKeys, BazaarError> {
    CustodyKeys::derive(config, CustodyDomain::ESCROW, scope(config, initializer))
}

fn load_record<L: Ledger>(ledger: &L, escrow: &Address) -> Result<EscrowRecord, BazaarError> {
    ledger
        .record(escrow)
        .and_then(|r| r.as_escrow().cloned())
        .ok_or(BazaarError::VaultNotFoundOrClosed { address: *escrow })
}

pub fn initialize<L: Ledger>(
    ctx: &mut Context<'_, L>,
    accounts: &InitializeEscrowAccounts,
    vault_bump: u8,
    deposit_amount: u64,
    desired_amount: u64,
) -> Result<ContractEvent, BazaarError> {
    if deposit_amount == 0 || desired_amount == 0 {
        return Err(BazaarError::InvalidAmount);
    }
    let initializer = Authority::signer(&accounts.initializer, ctx.signers)?;

    let keys = escrow_custody(ctx.config, &accounts.initializer)?;
    keys.verify(&accounts.vault, &accounts.vault_authority)?;
    keys.verify_bump(vault_bump)?;
    let record_address = escrow_address(ctx.config, &accounts.initializer)?;
    require_derived(&record_address.address, &accounts.escrow)?;

    let receive = existing_token_account(&*ctx.ledger, &accounts.initializer_receive_token_account)?;
    require_account("initializer receive owner", &accounts.initializer, &receive.owner)?;

    VaultCustody::new(keys).open(
        ctx.ledger,
        &accounts.mint,
        &accounts.initializer_deposit_token_account,
        &initializer,
        deposit_amount,
    )?;

    let record = EscrowRecord {
        initializer_key: accounts.initializer,
        initializer_deposit_token_account: accounts.initializer_deposit_token_account,
        initializer_receive_token_account: accounts.initializer_receive_token_account,
        deposit_amount,
        desired_amount,
    };
    ctx.ledger
        .create_record(&initializer, accounts.escrow, Record::Escrow(record))?;

    Ok(ContractEvent::EscrowInitialized(EscrowInitialized {
        escrow: accounts.escrow,
        initializer: accounts.initializer,
        vault: accounts.vault,
        mint: accounts.mint,
        deposit_amount,
        desired_amount,
    }))
}

/// Taker pays the desired amount and receives the vault, in one instruction.
pub fn exchange<L: Ledger>(
    ctx: &mut Context<'_, L>,
    accounts: &ExchangeAccounts,
) -> Result<ContractEvent, BazaarError> {
    let record = load_record(&*ctx.ledger, &accounts.escrow)?;
    require_account("initializer", &record.initializer_key, &accounts.initializer)?;
    require_derived(
        &escrow_address(ctx.config, &record.initializer_key)?.address,
        &accounts.escrow,
    )?;
    let keys = escrow_custody(ctx.config, &record.initializer_key)?;
    keys.verify(&accounts.vault, &accounts.vault_authority)?;
    require_account(
        "initializer deposit account",
        &record.initializer_deposit_token_account,
        &accounts.initializer_deposit_token_account,
    )?;
    require_account(
        "initializer receive account",
        &record.initializer_receive_token_account,
        &accounts.initializer_receive_token_account,
    )?;

    let taker = Authority::signer(&accounts.taker, ctx.signers)?;
    let source = existing_token_account(&*ctx.ledger, &accounts.taker_deposit_token_account)?;
    let receive = existing_token_account(&*ctx.ledger, &accounts.initializer_receive_token_account)?;
    require_mint("taker deposit account", &receive.mint, &source)?;
    require_balance(&source, record.desired_amount)?;

    ctx.ledger.transfer(
        &accounts.taker_deposit_token_account,
        &accounts.initializer_receive_token_account,
        record.desired_amount,
        &taker,
    )?;
    VaultCustody::new(keys).settle(
        ctx.ledger,
        &accounts.vault,
        &accounts.vault_authority,
        record.deposit_amount,
        &accounts.taker_receive_token_account,
        &record.initializer_key,
    )?;
    ctx.ledger.close_record(&accounts.escrow, &record.initializer_key)?;

    Ok(ContractEvent::EscrowExchanged(EscrowExchanged {
        escrow: accounts.escrow,
        initializer: record.initializer_key,
        taker: accounts.taker,
        deposit_amount: record.deposit_amount,
        desired_amount: record.desired_amount,
    }))
}

/// Initializer takes the deposit back.
pub fn cancel<L: Ledger>(
    ctx: &mut Context<'_, L>,
    accounts: &CancelEscrowAccounts,
) -> Result<ContractEvent, BazaarError> {
    let record = load_record(&*ctx.ledger, &accounts.escrow)?;
    ctx.signers
        .require_party(&record.initializer_key, &accounts.initializer)?;
    require_derived(
        &escrow_address(ctx.config, &record.initializer_key)?.address,
        &accounts.escrow,
    )?;
    let keys = escrow_custody(ctx.config, &record.initializer_key)?;
    require_account(
        "initializer deposit account",
        &record.initializer_deposit_token_account,
        &accounts.initializer_deposit_token_account,
    )?;

    let refunded = VaultCustody::new(keys).refund(
        ctx.ledger,
        &accounts.vault,
        &accounts.vault_authority,
        record.deposit_amount,
        &record.initializer_deposit_token_account,
        &record.initializer_key,
    )?;
    ctx.ledger.close_record(&accounts.escrow, &record.initializer_key)?;

    Ok(ContractEvent::EscrowCancelled(EscrowCancelled {
        escrow: accounts.escrow,
        initializer: record.initializer_key,
        refunded_amount: refunded,
    }))
}
