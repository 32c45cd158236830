//! Listings: standing, non-custodial price advertisements
//!
//! A listing names an amount of one mint the initializer is willing to pay.
//! Nothing is locked: the tokens stay in the initializer's deposit account
//! until an offer is accepted against the listing.

use bazaar_types::address::Address;

use crate::config::ProgramConfig;
use crate::custody::{existing_token_account, require_mint};
use crate::derivation::{self, tags, ProgramAddress};
use crate::errors::BazaarError;
use crate::events::{ContractEvent, ListingClosed, ListingInitialized};
use crate::instruction::{CloseListingAccounts, InitializeListingAccounts};
use crate::ledger::{Authority, Ledger};
use crate::program::Context;
use crate::security::{require_account, require_derived};
use crate::state::{ListingRecord, Record};

/// Address of `initializer`'s listing for `mint`.
pub fn listing_address(
    config: &ProgramConfig,
    initializer: &Address,
    mint: &Address,
) -> Result<ProgramAddress, BazaarError> {
    derivation::derive(config, tags::LISTING, &[initializer, mint])
}

/// Read the listing at `address`.
pub fn load_listing<L: Ledger>(ledger: &L, address: &Address) -> Result<ListingRecord, BazaarError> {
    ledger
        .record(address)
        .and_then(|r| r.as_listing().cloned())
        .ok_or(BazaarError::ListingNotFound { listing: *address })
}

pub fn initialize<L: Ledger>(
    ctx: &mut Context<'_, L>,
    accounts: &InitializeListingAccounts,
    amount: u64,
) -> Result<ContractEvent, BazaarError> {
    if amount == 0 {
        return Err(BazaarError::InvalidAmount);
    }
    let initializer = Authority::signer(&accounts.initializer, ctx.signers)?;
    let derived = listing_address(ctx.config, &accounts.initializer, &accounts.mint)?;
    require_derived(&derived.address, &accounts.listing)?;

    let deposit = existing_token_account(&*ctx.ledger, &accounts.initializer_deposit_token_account)?;
    require_account("listing deposit owner", &accounts.initializer, &deposit.owner)?;
    require_mint("listing deposit account", &accounts.mint, &deposit)?;

    let record = ListingRecord {
        initializer_key: accounts.initializer,
        initializer_deposit_token_account: accounts.initializer_deposit_token_account,
        mint: accounts.mint,
        amount,
    };
    ctx.ledger
        .create_record(&initializer, accounts.listing, Record::Listing(record))?;

    Ok(ContractEvent::ListingInitialized(ListingInitialized {
        listing: accounts.listing,
        initializer: accounts.initializer,
        mint: accounts.mint,
        amount,
    }))
}

/// Remove a listing and return its storage cost to the initializer.
pub fn close<L: Ledger>(
    ctx: &mut Context<'_, L>,
    accounts: &CloseListingAccounts,
) -> Result<ContractEvent, BazaarError> {
    let record = load_listing(&*ctx.ledger, &accounts.listing)?;
    ctx.signers
        .require_party(&record.initializer_key, &accounts.initializer)?;
    ctx.ledger
        .close_record(&accounts.listing, &record.initializer_key)?;

    Ok(ContractEvent::ListingClosed(ListingClosed {
        listing: accounts.listing,
        initializer: record.initializer_key,
    }))
}
