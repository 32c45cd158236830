//! Program-owned records
//!
//! Each record lives at a derived address and is created in the same
//! instruction that opens its vault. Closing a record is the terminal state:
//! "settled" and "cancelled" both mean the record no longer exists.

use bazaar_types::address::{Address, ADDRESS_BYTES};
use serde::{Deserialize, Serialize};

/// Bytes reserved for the record discriminator.
pub const DISCRIMINATOR_SPACE: usize = 8;

/// Fixed bilateral swap terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowRecord {
    pub initializer_key: Address,
    pub initializer_deposit_token_account: Address,
    pub initializer_receive_token_account: Address,
    /// Locked in the vault
    pub deposit_amount: u64,
    /// Owed by the taker
    pub desired_amount: u64,
}

impl EscrowRecord {
    pub const SPACE: usize = DISCRIMINATOR_SPACE + 3 * ADDRESS_BYTES + 8 + 8;
}

/// One offeror's standing offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecord {
    pub offeror_key: Address,
    pub offeror_deposit_token_account: Address,
    pub offeror_receive_token_account: Address,
    /// Locked in the offeror's vault
    pub offer_amount: u64,
    /// Owed by the acceptor
    pub required_amount: u64,
}

impl OfferRecord {
    pub const SPACE: usize = DISCRIMINATOR_SPACE + 3 * ADDRESS_BYTES + 8 + 8;
}

/// A non-custodial advertised amount. Tokens stay in the initializer's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub initializer_key: Address,
    pub initializer_deposit_token_account: Address,
    pub mint: Address,
    pub amount: u64,
}

impl ListingRecord {
    pub const SPACE: usize = DISCRIMINATOR_SPACE + 3 * ADDRESS_BYTES + 8;
}

/// Any record the program stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Escrow(EscrowRecord),
    Offer(OfferRecord),
    Listing(ListingRecord),
}

impl Record {
    /// Storage size, used to price the record's storage cost.
    pub fn space(&self) -> usize {
        match self {
            Record::Escrow(_) => EscrowRecord::SPACE,
            Record::Offer(_) => OfferRecord::SPACE,
            Record::Listing(_) => ListingRecord::SPACE,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Record::Escrow(_) => "escrow",
            Record::Offer(_) => "offer",
            Record::Listing(_) => "listing",
        }
    }

    pub fn as_escrow(&self) -> Option<&EscrowRecord> {
        match self {
            Record::Escrow(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_offer(&self) -> Option<&OfferRecord> {
        match self {
            Record::Offer(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_listing(&self) -> Option<&ListingRecord> {
        match self {
            Record::Listing(r) => Some(r),
            _ => None,
        }
    }
}
