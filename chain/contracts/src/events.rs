//! Contract events
//!
//! One event per successful instruction. Events are immutable records of
//! what moved; a failed instruction emits nothing.

use bazaar_types::address::Address;
use serde::{Deserialize, Serialize};

/// Initializer locked `deposit_amount` in the escrow vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowInitialized {
    pub escrow: Address,
    pub initializer: Address,
    pub vault: Address,
    pub mint: Address,
    pub deposit_amount: u64,
    pub desired_amount: u64,
}

/// Taker paid `desired_amount` and received the vault contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowExchanged {
    pub escrow: Address,
    pub initializer: Address,
    pub taker: Address,
    pub deposit_amount: u64,
    pub desired_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowCancelled {
    pub escrow: Address,
    pub initializer: Address,
    pub refunded_amount: u64,
}

/// Advertised amount; nothing is locked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingInitialized {
    pub listing: Address,
    pub initializer: Address,
    pub mint: Address,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingClosed {
    pub listing: Address,
    pub initializer: Address,
}

/// Offeror locked `offer_amount` in their own offer vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferInitialized {
    pub offer: Address,
    pub offeror: Address,
    pub vault: Address,
    pub mint: Address,
    pub offer_amount: u64,
    pub required_amount: u64,
}

/// Acceptor paid `required_amount` and received the offer vault contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferAccepted {
    pub offer: Address,
    pub offeror: Address,
    pub acceptor: Address,
    pub listing: Address,
    pub offer_amount: u64,
    pub required_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferCancelled {
    pub offer: Address,
    pub offeror: Address,
    pub refunded_amount: u64,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ContractEvent {
    EscrowInitialized(EscrowInitialized),
    EscrowExchanged(EscrowExchanged),
    EscrowCancelled(EscrowCancelled),
    ListingInitialized(ListingInitialized),
    ListingClosed(ListingClosed),
    OfferInitialized(OfferInitialized),
    OfferAccepted(OfferAccepted),
    OfferCancelled(OfferCancelled),
}

impl ContractEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::EscrowInitialized(_) => "escrow_initialized",
            ContractEvent::EscrowExchanged(_) => "escrow_exchanged",
            ContractEvent::EscrowCancelled(_) => "escrow_cancelled",
            ContractEvent::ListingInitialized(_) => "listing_initialized",
            ContractEvent::ListingClosed(_) => "listing_closed",
            ContractEvent::OfferInitialized(_) => "offer_initialized",
            ContractEvent::OfferAccepted(_) => "offer_accepted",
            ContractEvent::OfferCancelled(_) => "offer_cancelled",
        }
    }
}
