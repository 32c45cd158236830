//! Offers: many offerors against one acceptor
//!
//! Every seed includes the offeror, so each offeror gets a disjoint vault,
//! authority and record. Accepting or cancelling one offer never touches
//! another's accounts, which is what lets a ledger run them in parallel.
//!
//! Under [`ListingPolicy::Enforced`] an acceptance must name the acceptor's
//! listing and match it on identity, amount, mint and paying account.

use bazaar_types::address::Address;

use crate::config::{ListingPolicy, ProgramConfig};
use crate::custody::{existing_token_account, require_balance, require_mint, CustodyDomain, CustodyKeys, VaultCustody};
use crate::derivation::{self, tags, ProgramAddress};
use crate::errors::BazaarError;
use crate::events::{ContractEvent, OfferAccepted, OfferCancelled, OfferInitialized};
use crate::instruction::{AcceptOfferAccounts, CancelOfferAccounts, InitializeOfferAccounts};
use crate::ledger::{Authority, Ledger};
use crate::listing::{listing_address, load_listing};
use crate::program::Context;
use crate::security::{require_account, require_derived};
use crate::state::{OfferRecord, Record};

/// Address of `offeror`'s offer record.
pub fn offer_address(config: &ProgramConfig, offeror: &Address) -> Result<ProgramAddress, BazaarError> {
    derivation::derive(config, tags::OFFER_STATE, &[offeror])
}

/// Vault and authority for `offeror`'s offer.
pub fn offer_custody(config: &ProgramConfig, offeror: &Address) -> Result<CustodyKeys, BazaarError> {
    CustodyKeys::derive(config, CustodyDomain::OFFER, Some(offeror))
}

fn load_record<L: Ledger>(ledger: &L, offer: &Address) -> Result<OfferRecord, BazaarError> {
    ledger
        .record(offer)
        .and_then(|r| r.as_offer().cloned())
        .ok_or(BazaarError::VaultNotFoundOrClosed { address: *offer })
}

pub fn initialize<L: Ledger>(
    ctx: &mut Context<'_, L>,
    accounts: &InitializeOfferAccounts,
    vault_bump: u8,
    offer_amount: u64,
    required_amount: u64,
) -> Result<ContractEvent, BazaarError> {
    if offer_amount == 0 || required_amount == 0 {
        return Err(BazaarError::InvalidAmount);
    }
    let offeror = Authority::signer(&accounts.offeror, ctx.signers)?;

    let keys = offer_custody(ctx.config, &accounts.offeror)?;
    keys.verify(&accounts.vault, &accounts.vault_authority)?;
    keys.verify_bump(vault_bump)?;
    let record_address = offer_address(ctx.config, &accounts.offeror)?;
    require_derived(&record_address.address, &accounts.offer)?;

    let receive = existing_token_account(&*ctx.ledger, &accounts.offeror_receive_token_account)?;
    require_account("offeror receive owner", &accounts.offeror, &receive.owner)?;

    VaultCustody::new(keys).open(
        ctx.ledger,
        &accounts.mint,
        &accounts.offeror_deposit_token_account,
        &offeror,
        offer_amount,
    )?;

    let record = OfferRecord {
        offeror_key: accounts.offeror,
        offeror_deposit_token_account: accounts.offeror_deposit_token_account,
        offeror_receive_token_account: accounts.offeror_receive_token_account,
        offer_amount,
        required_amount,
    };
    ctx.ledger
        .create_record(&offeror, accounts.offer, Record::Offer(record))?;

    Ok(ContractEvent::OfferInitialized(OfferInitialized {
        offer: accounts.offer,
        offeror: accounts.offeror,
        vault: accounts.vault,
        mint: accounts.mint,
        offer_amount,
        required_amount,
    }))
}

/// Check the acceptance against the acceptor's listing. Returns the listing
/// address, or `Address::ZERO` when listings are advisory.
fn check_listing<L: Ledger>(
    ctx: &Context<'_, L>,
    accounts: &AcceptOfferAccounts,
    record: &OfferRecord,
    paying_mint: &Address,
) -> Result<Address, BazaarError> {
    if ctx.config.listing_policy == ListingPolicy::Advisory {
        return Ok(accounts.listing.unwrap_or(Address::ZERO));
    }

    let Some(supplied) = accounts.listing else {
        let expected = listing_address(ctx.config, &accounts.acceptor, paying_mint)?;
        return Err(BazaarError::ListingNotFound {
            listing: expected.address,
        });
    };
    let listing = load_listing(&*ctx.ledger, &supplied)?;
    require_derived(
        &listing_address(ctx.config, &listing.initializer_key, &listing.mint)?.address,
        &supplied,
    )?;

    if listing.initializer_key != accounts.acceptor {
        return Err(BazaarError::SignerMismatch {
            expected: listing.initializer_key,
            supplied: accounts.acceptor,
        });
    }
    if listing.amount != record.required_amount {
        return Err(BazaarError::AmountMismatch {
            expected: listing.amount,
            actual: record.required_amount,
        });
    }
    if listing.mint != *paying_mint {
        return Err(BazaarError::MintMismatch {
            role: "listing",
            expected: listing.mint,
            found: *paying_mint,
        });
    }
    require_account(
        "acceptor deposit account",
        &listing.initializer_deposit_token_account,
        &accounts.acceptor_deposit_token_account,
    )?;
    Ok(supplied)
}

/// Acceptor pays the required amount and receives the offeror's vault.
pub fn accept<L: Ledger>(
    ctx: &mut Context<'_, L>,
    accounts: &AcceptOfferAccounts,
) -> Result<ContractEvent, BazaarError> {
    let record = load_record(&*ctx.ledger, &accounts.offer)?;
    require_account("offeror", &record.offeror_key, &accounts.offeror)?;
    require_derived(
        &offer_address(ctx.config, &record.offeror_key)?.address,
        &accounts.offer,
    )?;
    let keys = offer_custody(ctx.config, &record.offeror_key)?;
    keys.verify(&accounts.vault, &accounts.vault_authority)?;
    require_account(
        "offeror receive account",
        &record.offeror_receive_token_account,
        &accounts.offeror_receive_token_account,
    )?;

    let acceptor = Authority::signer(&accounts.acceptor, ctx.signers)?;
    let receive = existing_token_account(&*ctx.ledger, &record.offeror_receive_token_account)?;
    let listing = check_listing(ctx, accounts, &record, &receive.mint)?;

    let source = existing_token_account(&*ctx.ledger, &accounts.acceptor_deposit_token_account)?;
    require_mint("acceptor deposit account", &receive.mint, &source)?;
    require_balance(&source, record.required_amount)?;

    ctx.ledger.transfer(
        &accounts.acceptor_deposit_token_account,
        &record.offeror_receive_token_account,
        record.required_amount,
        &acceptor,
    )?;
    VaultCustody::new(keys).settle(
        ctx.ledger,
        &accounts.vault,
        &accounts.vault_authority,
        record.offer_amount,
        &accounts.acceptor_receive_token_account,
        &record.offeror_key,
    )?;
    ctx.ledger.close_record(&accounts.offer, &record.offeror_key)?;

    Ok(ContractEvent::OfferAccepted(OfferAccepted {
        offer: accounts.offer,
        offeror: record.offeror_key,
        acceptor: accounts.acceptor,
        listing,
        offer_amount: record.offer_amount,
        required_amount: record.required_amount,
    }))
}

/// Offeror withdraws; only the offeror named in the record may do this.
pub fn cancel<L: Ledger>(
    ctx: &mut Context<'_, L>,
    accounts: &CancelOfferAccounts,
) -> Result<ContractEvent, BazaarError> {
    let record = load_record(&*ctx.ledger, &accounts.offer)?;
    ctx.signers
        .require_party(&record.offeror_key, &accounts.offeror)?;
    require_derived(
        &offer_address(ctx.config, &record.offeror_key)?.address,
        &accounts.offer,
    )?;
    let keys = offer_custody(ctx.config, &record.offeror_key)?;
    require_account(
        "offeror deposit account",
        &record.offeror_deposit_token_account,
        &accounts.offeror_deposit_token_account,
    )?;

    let refunded = VaultCustody::new(keys).refund(
        ctx.ledger,
        &accounts.vault,
        &accounts.vault_authority,
        record.offer_amount,
        &record.offeror_deposit_token_account,
        &record.offeror_key,
    )?;
    ctx.ledger.close_record(&accounts.offer, &record.offeror_key)?;

    Ok(ContractEvent::OfferCancelled(OfferCancelled {
        offer: accounts.offer,
        offeror: record.offeror_key,
        refunded_amount: refunded,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::instruction::Instruction;
    use crate::ledger::MemoryLedger;
    use crate::program::BazaarProgram;
    use crate::security::Signers;

    struct Desk {
        program: BazaarProgram,
        ledger: MemoryLedger,
        mint_a: Address,
        mint_b: Address,
        offeror: Address,
        offeror_a: Address,
        offeror_b: Address,
        acceptor: Address,
        acceptor_a: Address,
        acceptor_b: Address,
    }

    fn desk(policy: ListingPolicy) -> Desk {
        let mut ledger = MemoryLedger::new(LedgerConfig::default());
        let offeror = Address::new([1u8; 32]);
        let acceptor = Address::new([2u8; 32]);
        ledger.airdrop(&offeror, 1_000_000_000);
        ledger.airdrop(&acceptor, 1_000_000_000);
        let mint_a = ledger.create_mint(0);
        let mint_b = ledger.create_mint(0);
        let offeror_a = ledger.create_token_account_for(&offeror, &mint_a).unwrap();
        let offeror_b = ledger.create_token_account_for(&offeror, &mint_b).unwrap();
        let acceptor_a = ledger.create_token_account_for(&acceptor, &mint_a).unwrap();
        let acceptor_b = ledger.create_token_account_for(&acceptor, &mint_b).unwrap();
        ledger.mint_to(&mint_a, &offeror_a, 500).unwrap();
        ledger.mint_to(&mint_b, &acceptor_b, 1000).unwrap();
        let config = ProgramConfig {
            listing_policy: policy,
            ..ProgramConfig::default()
        };
        Desk {
            program: BazaarProgram::new(config),
            ledger,
            mint_a,
            mint_b,
            offeror,
            offeror_a,
            offeror_b,
            acceptor,
            acceptor_a,
            acceptor_b,
        }
    }

    fn run(signer: Address, d: &mut Desk, ix: Instruction) -> Result<ContractEvent, BazaarError> {
        let signers = Signers::from_verified([signer]);
        let program = d.program.clone();
        d.ledger.atomically(|l| program.process(l, &signers, &ix))
    }

    fn open_offer(d: &mut Desk, required: u64) {
        let ix = Instruction::initialize_offer(
            d.program.config(),
            &d.offeror,
            &d.mint_a,
            &d.offeror_a,
            &d.offeror_b,
            500,
            required,
        )
        .unwrap();
        run(d.offeror, d, ix).unwrap();
    }

    fn list(d: &mut Desk, amount: u64) {
        let ix = Instruction::initialize_listing(d.program.config(), &d.acceptor, &d.mint_b, &d.acceptor_b, amount)
            .unwrap();
        run(d.acceptor, d, ix).unwrap();
    }

    fn accept_ix(d: &Desk, listing_mint: Option<&Address>) -> Instruction {
        Instruction::accept_offer(
            d.program.config(),
            &d.acceptor,
            &d.acceptor_b,
            &d.acceptor_a,
            &d.offeror,
            &d.offeror_b,
            listing_mint,
        )
        .unwrap()
    }

    #[test]
    fn test_accept_against_matching_listing() {
        let mut d = desk(ListingPolicy::Enforced);
        open_offer(&mut d, 1000);
        list(&mut d, 1000);
        let ix = accept_ix(&d, Some(&d.mint_b));
        let event = run(d.acceptor, &mut d, ix).unwrap();

        assert!(matches!(event, ContractEvent::OfferAccepted(_)));
        assert_eq!(d.ledger.balance(&d.acceptor_a), 500);
        assert_eq!(d.ledger.balance(&d.offeror_b), 1000);
        // The listing survives the acceptance.
        assert_eq!(d.ledger.record_count(), 1);
    }

    #[test]
    fn test_enforced_policy_requires_listing() {
        let mut d = desk(ListingPolicy::Enforced);
        open_offer(&mut d, 1000);
        let ix = accept_ix(&d, None);
        let result = run(d.acceptor, &mut d, ix);
        assert!(matches!(result, Err(BazaarError::ListingNotFound { .. })));
    }

    #[test]
    fn test_enforced_policy_rejects_price_mismatch() {
        let mut d = desk(ListingPolicy::Enforced);
        open_offer(&mut d, 900);
        list(&mut d, 1000);
        let ix = accept_ix(&d, Some(&d.mint_b));
        let result = run(d.acceptor, &mut d, ix);
        assert_eq!(
            result,
            Err(BazaarError::AmountMismatch {
                expected: 1000,
                actual: 900
            })
        );
    }

    #[test]
    fn test_advisory_policy_accepts_without_listing() {
        let mut d = desk(ListingPolicy::Advisory);
        open_offer(&mut d, 900);
        let ix = accept_ix(&d, None);
        run(d.acceptor, &mut d, ix).unwrap();
        assert_eq!(d.ledger.balance(&d.acceptor_b), 100);
        assert_eq!(d.ledger.balance(&d.offeror_b), 900);
    }

    #[test]
    fn test_cancel_round_trip_restores_balance() {
        let mut d = desk(ListingPolicy::Enforced);
        open_offer(&mut d, 1000);
        assert_eq!(d.ledger.balance(&d.offeror_a), 0);
        let ix = Instruction::cancel_offer(d.program.config(), &d.offeror, &d.offeror_a).unwrap();
        run(d.offeror, &mut d, ix).unwrap();
        assert_eq!(d.ledger.balance(&d.offeror_a), 500);
        let keys = offer_custody(d.program.config(), &d.offeror).unwrap();
        assert!(!d.ledger.account_exists(&keys.vault.address));
    }

    #[test]
    fn test_accept_after_cancel_fails() {
        let mut d = desk(ListingPolicy::Advisory);
        open_offer(&mut d, 1000);
        let cancel = Instruction::cancel_offer(d.program.config(), &d.offeror, &d.offeror_a).unwrap();
        run(d.offeror, &mut d, cancel).unwrap();
        let ix = accept_ix(&d, None);
        let result = run(d.acceptor, &mut d, ix);
        assert!(matches!(result, Err(BazaarError::VaultNotFoundOrClosed { .. })));
    }

    #[test]
    fn test_receive_account_of_another_party_rejected() {
        let mut d = desk(ListingPolicy::Enforced);
        let ix = Instruction::initialize_offer(
            d.program.config(),
            &d.offeror,
            &d.mint_a,
            &d.offeror_a,
            &d.acceptor_b,
            500,
            1000,
        )
        .unwrap();
        let result = run(d.offeror, &mut d, ix);
        assert_eq!(
            result,
            Err(BazaarError::AccountMismatch {
                role: "offeror receive owner",
                expected: d.offeror,
                supplied: d.acceptor
            })
        );
        assert_eq!(d.ledger.balance(&d.offeror_a), 500);
    }

    #[test]
    fn test_receive_account_cannot_be_a_vault() {
        let mut d = desk(ListingPolicy::Enforced);
        let theirs = Instruction::initialize_offer(
            d.program.config(),
            &d.acceptor,
            &d.mint_b,
            &d.acceptor_b,
            &d.acceptor_a,
            1000,
            500,
        )
        .unwrap();
        run(d.acceptor, &mut d, theirs).unwrap();
        let vault = offer_custody(d.program.config(), &d.acceptor).unwrap();

        let ix = Instruction::initialize_offer(
            d.program.config(),
            &d.offeror,
            &d.mint_a,
            &d.offeror_a,
            &vault.vault.address,
            500,
            1,
        )
        .unwrap();
        let result = run(d.offeror, &mut d, ix);
        assert_eq!(
            result,
            Err(BazaarError::AccountMismatch {
                role: "offeror receive owner",
                expected: d.offeror,
                supplied: vault.authority.address
            })
        );
    }
}
