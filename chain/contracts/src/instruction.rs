//! Instruction surface
//!
//! Every instruction carries its typed arguments and a named accounts struct.
//! The account list is also the authorization contract: it says who must sign
//! and which accounts may change, which is all a ledger needs to schedule
//! non-overlapping instructions side by side.
//!
//! Builders compute every derived address the same way the program will, so
//! clients never have to hand-assemble vault or record addresses.

use bazaar_types::address::Address;
use serde::{Deserialize, Serialize};

use crate::config::ProgramConfig;
use crate::errors::BazaarError;
use crate::{escrow, listing, offer};

/// One entry of an instruction's account list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountMeta {
    pub address: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: true,
        }
    }

    pub fn readonly(address: Address, is_signer: bool) -> Self {
        Self {
            address,
            is_signer,
            is_writable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeEscrowAccounts {
    pub initializer: Address,
    pub mint: Address,
    pub vault: Address,
    pub vault_authority: Address,
    pub initializer_deposit_token_account: Address,
    pub initializer_receive_token_account: Address,
    pub escrow: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeAccounts {
    pub taker: Address,
    pub taker_deposit_token_account: Address,
    pub taker_receive_token_account: Address,
    pub initializer: Address,
    pub initializer_deposit_token_account: Address,
    pub initializer_receive_token_account: Address,
    pub escrow: Address,
    pub vault: Address,
    pub vault_authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelEscrowAccounts {
    pub initializer: Address,
    pub initializer_deposit_token_account: Address,
    pub escrow: Address,
    pub vault: Address,
    pub vault_authority: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeListingAccounts {
    pub initializer: Address,
    pub mint: Address,
    pub initializer_deposit_token_account: Address,
    pub listing: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseListingAccounts {
    pub initializer: Address,
    pub listing: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitializeOfferAccounts {
    pub offeror: Address,
    pub mint: Address,
    pub vault: Address,
    pub vault_authority: Address,
    pub offeror_deposit_token_account: Address,
    pub offeror_receive_token_account: Address,
    pub offer: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptOfferAccounts {
    pub acceptor: Address,
    pub acceptor_deposit_token_account: Address,
    pub acceptor_receive_token_account: Address,
    pub offeror: Address,
    pub offeror_receive_token_account: Address,
    pub offer: Address,
    pub vault: Address,
    pub vault_authority: Address,
    /// Acceptor's listing; required when listings are enforced
    pub listing: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOfferAccounts {
    pub offeror: Address,
    pub offeror_deposit_token_account: Address,
    pub offer: Address,
    pub vault: Address,
    pub vault_authority: Address,
}

/// Everything the program can be asked to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "instruction", rename_all = "snake_case")]
pub enum Instruction {
    InitializeEscrow {
        accounts: InitializeEscrowAccounts,
        vault_bump: u8,
        deposit_amount: u64,
        desired_amount: u64,
    },
    Exchange {
        accounts: ExchangeAccounts,
    },
    CancelEscrow {
        accounts: CancelEscrowAccounts,
    },
    InitializeListing {
        accounts: InitializeListingAccounts,
        amount: u64,
    },
    CloseListing {
        accounts: CloseListingAccounts,
    },
    InitializeOffer {
        accounts: InitializeOfferAccounts,
        vault_bump: u8,
        offer_amount: u64,
        required_amount: u64,
    },
    AcceptOffer {
        accounts: AcceptOfferAccounts,
    },
    CancelOffer {
        accounts: CancelOfferAccounts,
    },
}

impl Instruction {
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::InitializeEscrow { .. } => "initialize_escrow",
            Instruction::Exchange { .. } => "exchange",
            Instruction::CancelEscrow { .. } => "cancel_escrow",
            Instruction::InitializeListing { .. } => "initialize_listing",
            Instruction::CloseListing { .. } => "close_listing",
            Instruction::InitializeOffer { .. } => "initialize_offer",
            Instruction::AcceptOffer { .. } => "accept_offer",
            Instruction::CancelOffer { .. } => "cancel_offer",
        }
    }

    /// Ordered account list with signer and write flags.
    pub fn account_metas(&self) -> Vec<AccountMeta> {
        use AccountMeta as M;
        match self {
            Instruction::InitializeEscrow { accounts: a, .. } => vec![
                M::writable(a.initializer, true),
                M::readonly(a.mint, false),
                M::writable(a.vault, false),
                M::readonly(a.vault_authority, false),
                M::writable(a.initializer_deposit_token_account, false),
                M::readonly(a.initializer_receive_token_account, false),
                M::writable(a.escrow, false),
            ],
            Instruction::Exchange { accounts: a } => vec![
                M::readonly(a.taker, true),
                M::writable(a.taker_deposit_token_account, false),
                M::writable(a.taker_receive_token_account, false),
                M::writable(a.initializer, false),
                M::readonly(a.initializer_deposit_token_account, false),
                M::writable(a.initializer_receive_token_account, false),
                M::writable(a.escrow, false),
                M::writable(a.vault, false),
                M::readonly(a.vault_authority, false),
            ],
            Instruction::CancelEscrow { accounts: a } => vec![
                M::writable(a.initializer, true),
                M::writable(a.initializer_deposit_token_account, false),
                M::writable(a.escrow, false),
                M::writable(a.vault, false),
                M::readonly(a.vault_authority, false),
            ],
            Instruction::InitializeListing { accounts: a, .. } => vec![
                M::writable(a.initializer, true),
                M::readonly(a.mint, false),
                M::readonly(a.initializer_deposit_token_account, false),
                M::writable(a.listing, false),
            ],
            Instruction::CloseListing { accounts: a } => vec![
                M::writable(a.initializer, true),
                M::writable(a.listing, false),
            ],
            Instruction::InitializeOffer { accounts: a, .. } => vec![
                M::writable(a.offeror, true),
                M::readonly(a.mint, false),
                M::writable(a.vault, false),
                M::readonly(a.vault_authority, false),
                M::writable(a.offeror_deposit_token_account, false),
                M::readonly(a.offeror_receive_token_account, false),
                M::writable(a.offer, false),
            ],
            Instruction::AcceptOffer { accounts: a } => {
                let mut metas = vec![
                    M::readonly(a.acceptor, true),
                    M::writable(a.acceptor_deposit_token_account, false),
                    M::writable(a.acceptor_receive_token_account, false),
                    M::writable(a.offeror, false),
                    M::writable(a.offeror_receive_token_account, false),
                    M::writable(a.offer, false),
                    M::writable(a.vault, false),
                    M::readonly(a.vault_authority, false),
                ];
                if let Some(listing) = a.listing {
                    metas.push(M::readonly(listing, false));
                }
                metas
            }
            Instruction::CancelOffer { accounts: a } => vec![
                M::writable(a.offeror, true),
                M::writable(a.offeror_deposit_token_account, false),
                M::writable(a.offer, false),
                M::writable(a.vault, false),
                M::readonly(a.vault_authority, false),
            ],
        }
    }

    /// Addresses that must sign.
    pub fn required_signers(&self) -> Vec<Address> {
        self.account_metas()
            .into_iter()
            .filter(|m| m.is_signer)
            .map(|m| m.address)
            .collect()
    }

    /// Whether the two instructions touch a common account with at least one
    /// side writing it. Instructions that do not conflict may run in parallel.
    pub fn conflicts_with(&self, other: &Instruction) -> bool {
        let theirs = other.account_metas();
        self.account_metas().iter().any(|mine| {
            theirs
                .iter()
                .any(|t| t.address == mine.address && (t.is_writable || mine.is_writable))
        })
    }

    // ───────────────────────── Client builders ─────────────────────────

    pub fn initialize_escrow(
        config: &ProgramConfig,
        initializer: &Address,
        mint: &Address,
        deposit_account: &Address,
        receive_account: &Address,
        deposit_amount: u64,
        desired_amount: u64,
    ) -> Result<Self, BazaarError> {
        let keys = escrow::escrow_custody(config, initializer)?;
        let record = escrow::escrow_address(config, initializer)?;
        Ok(Instruction::InitializeEscrow {
            accounts: InitializeEscrowAccounts {
                initializer: *initializer,
                mint: *mint,
                vault: keys.vault.address,
                vault_authority: keys.authority.address,
                initializer_deposit_token_account: *deposit_account,
                initializer_receive_token_account: *receive_account,
                escrow: record.address,
            },
            vault_bump: keys.vault.bump,
            deposit_amount,
            desired_amount,
        })
    }

    /// Exchange against the escrow opened by `initializer`, whose token
    /// accounts the taker reads from the escrow record.
    pub fn exchange(
        config: &ProgramConfig,
        taker: &Address,
        taker_deposit_account: &Address,
        taker_receive_account: &Address,
        initializer: &Address,
        initializer_deposit_account: &Address,
        initializer_receive_account: &Address,
    ) -> Result<Self, BazaarError> {
        let keys = escrow::escrow_custody(config, initializer)?;
        let record = escrow::escrow_address(config, initializer)?;
        Ok(Instruction::Exchange {
            accounts: ExchangeAccounts {
                taker: *taker,
                taker_deposit_token_account: *taker_deposit_account,
                taker_receive_token_account: *taker_receive_account,
                initializer: *initializer,
                initializer_deposit_token_account: *initializer_deposit_account,
                initializer_receive_token_account: *initializer_receive_account,
                escrow: record.address,
                vault: keys.vault.address,
                vault_authority: keys.authority.address,
            },
        })
    }

    pub fn cancel_escrow(
        config: &ProgramConfig,
        initializer: &Address,
        deposit_account: &Address,
    ) -> Result<Self, BazaarError> {
        let keys = escrow::escrow_custody(config, initializer)?;
        let record = escrow::escrow_address(config, initializer)?;
        Ok(Instruction::CancelEscrow {
            accounts: CancelEscrowAccounts {
                initializer: *initializer,
                initializer_deposit_token_account: *deposit_account,
                escrow: record.address,
                vault: keys.vault.address,
                vault_authority: keys.authority.address,
            },
        })
    }

    pub fn initialize_listing(
        config: &ProgramConfig,
        initializer: &Address,
        mint: &Address,
        deposit_account: &Address,
        amount: u64,
    ) -> Result<Self, BazaarError> {
        let record = listing::listing_address(config, initializer, mint)?;
        Ok(Instruction::InitializeListing {
            accounts: InitializeListingAccounts {
                initializer: *initializer,
                mint: *mint,
                initializer_deposit_token_account: *deposit_account,
                listing: record.address,
            },
            amount,
        })
    }

    pub fn close_listing(
        config: &ProgramConfig,
        initializer: &Address,
        mint: &Address,
    ) -> Result<Self, BazaarError> {
        let record = listing::listing_address(config, initializer, mint)?;
        Ok(Instruction::CloseListing {
            accounts: CloseListingAccounts {
                initializer: *initializer,
                listing: record.address,
            },
        })
    }

    pub fn initialize_offer(
        config: &ProgramConfig,
        offeror: &Address,
        mint: &Address,
        deposit_account: &Address,
        receive_account: &Address,
        offer_amount: u64,
        required_amount: u64,
    ) -> Result<Self, BazaarError> {
        let keys = offer::offer_custody(config, offeror)?;
        let record = offer::offer_address(config, offeror)?;
        Ok(Instruction::InitializeOffer {
            accounts: InitializeOfferAccounts {
                offeror: *offeror,
                mint: *mint,
                vault: keys.vault.address,
                vault_authority: keys.authority.address,
                offeror_deposit_token_account: *deposit_account,
                offeror_receive_token_account: *receive_account,
                offer: record.address,
            },
            vault_bump: keys.vault.bump,
            offer_amount,
            required_amount,
        })
    }

    /// Accept `offeror`'s offer. `listing_mint` names the acceptor's listing
    /// (the mint the acceptor pays in); pass `None` when listings are advisory.
    pub fn accept_offer(
        config: &ProgramConfig,
        acceptor: &Address,
        acceptor_deposit_account: &Address,
        acceptor_receive_account: &Address,
        offeror: &Address,
        offeror_receive_account: &Address,
        listing_mint: Option<&Address>,
    ) -> Result<Self, BazaarError> {
        let keys = offer::offer_custody(config, offeror)?;
        let record = offer::offer_address(config, offeror)?;
        let listing = listing_mint
            .map(|mint| listing::listing_address(config, acceptor, mint))
            .transpose()?
            .map(|l| l.address);
        Ok(Instruction::AcceptOffer {
            accounts: AcceptOfferAccounts {
                acceptor: *acceptor,
                acceptor_deposit_token_account: *acceptor_deposit_account,
                acceptor_receive_token_account: *acceptor_receive_account,
                offeror: *offeror,
                offeror_receive_token_account: *offeror_receive_account,
                offer: record.address,
                vault: keys.vault.address,
                vault_authority: keys.authority.address,
                listing,
            },
        })
    }

    pub fn cancel_offer(
        config: &ProgramConfig,
        offeror: &Address,
        deposit_account: &Address,
    ) -> Result<Self, BazaarError> {
        let keys = offer::offer_custody(config, offeror)?;
        let record = offer::offer_address(config, offeror)?;
        Ok(Instruction::CancelOffer {
            accounts: CancelOfferAccounts {
                offeror: *offeror,
                offeror_deposit_token_account: *deposit_account,
                offer: record.address,
                vault: keys.vault.address,
                vault_authority: keys.authority.address,
            },
        })
    }
}
