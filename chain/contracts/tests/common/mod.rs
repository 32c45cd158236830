//! Shared harness for the integration tests: a bank with two mints and
//! parties holding real ed25519 keys.

#![allow(dead_code)]

use bazaar_contracts::config::{LedgerConfig, ProgramConfig};
use bazaar_contracts::errors::BazaarError;
use bazaar_contracts::instruction::Instruction;
use bazaar_contracts::ledger::{Bank, Ledger, Receipt};
use bazaar_contracts::transaction::{signer_address, Transaction};
use bazaar_types::address::Address;
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;

pub const STARTING_LAMPORTS: u64 = 1_000_000_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// A wallet with one token account per mint.
pub struct Party {
    pub key: SigningKey,
    pub address: Address,
    /// Token A account
    pub a: Address,
    /// Token B account
    pub b: Address,
}

pub struct Market {
    pub bank: Bank,
    pub mint_a: Address,
    pub mint_b: Address,
}

impl Market {
    pub fn new(config: ProgramConfig) -> Self {
        init_tracing();
        let mut bank = Bank::new(config, LedgerConfig::default());
        let mint_a = bank.ledger_mut().create_mint(6);
        let mint_b = bank.ledger_mut().create_mint(6);
        Self { bank, mint_a, mint_b }
    }

    pub fn config(&self) -> ProgramConfig {
        self.bank.config().clone()
    }

    /// New party funded with `a` of token A and `b` of token B.
    pub fn party(&mut self, a: u64, b: u64) -> Party {
        self.party_with_key(SigningKey::generate(&mut OsRng), a, b)
    }

    pub fn party_with_key(&mut self, key: SigningKey, a: u64, b: u64) -> Party {
        let address = signer_address(&key);
        let (mint_a, mint_b) = (self.mint_a, self.mint_b);
        let ledger = self.bank.ledger_mut();
        ledger.airdrop(&address, STARTING_LAMPORTS);
        let account_a = ledger.create_token_account_for(&address, &mint_a).unwrap();
        let account_b = ledger.create_token_account_for(&address, &mint_b).unwrap();
        if a > 0 {
            ledger.mint_to(&mint_a, &account_a, a).unwrap();
        }
        if b > 0 {
            ledger.mint_to(&mint_b, &account_b, b).unwrap();
        }
        Party {
            key,
            address,
            a: account_a,
            b: account_b,
        }
    }

    /// Sign with `signer` and submit.
    pub fn submit(&mut self, signer: &Party, ix: Instruction) -> Result<Receipt, BazaarError> {
        let tx = Transaction::new_signed(ix, &[&signer.key])?;
        self.bank.process_transaction(&tx)
    }

    pub fn balance(&self, account: &Address) -> u64 {
        self.bank.ledger().balance(account)
    }

    pub fn lamports(&self, address: &Address) -> u64 {
        self.bank.ledger().lamports(address)
    }

    pub fn exists(&self, address: &Address) -> bool {
        self.bank.ledger().account_exists(address)
    }

    // ───────────────────────── Instruction shortcuts ─────────────────────────

    /// Escrow depositing token A and asking for token B.
    pub fn initialize_escrow(&self, initializer: &Party, deposit: u64, desired: u64) -> Instruction {
        Instruction::initialize_escrow(
            self.bank.config(),
            &initializer.address,
            &self.mint_a,
            &initializer.a,
            &initializer.b,
            deposit,
            desired,
        )
        .unwrap()
    }

    pub fn exchange(&self, taker: &Party, initializer: &Party) -> Instruction {
        Instruction::exchange(
            self.bank.config(),
            &taker.address,
            &taker.b,
            &taker.a,
            &initializer.address,
            &initializer.a,
            &initializer.b,
        )
        .unwrap()
    }

    pub fn cancel_escrow(&self, initializer: &Party) -> Instruction {
        Instruction::cancel_escrow(self.bank.config(), &initializer.address, &initializer.a).unwrap()
    }

    /// Offer of token A asking for token B.
    pub fn initialize_offer(&self, offeror: &Party, offer: u64, required: u64) -> Instruction {
        Instruction::initialize_offer(
            self.bank.config(),
            &offeror.address,
            &self.mint_a,
            &offeror.a,
            &offeror.b,
            offer,
            required,
        )
        .unwrap()
    }

    /// Listing of token B the acceptor is willing to pay.
    pub fn initialize_listing(&self, acceptor: &Party, amount: u64) -> Instruction {
        Instruction::initialize_listing(self.bank.config(), &acceptor.address, &self.mint_b, &acceptor.b, amount)
            .unwrap()
    }

    /// Acceptance paid from the acceptor's token B account against their listing.
    pub fn accept_offer(&self, acceptor: &Party, offeror: &Party) -> Instruction {
        Instruction::accept_offer(
            self.bank.config(),
            &acceptor.address,
            &acceptor.b,
            &acceptor.a,
            &offeror.address,
            &offeror.b,
            Some(&self.mint_b),
        )
        .unwrap()
    }

    pub fn cancel_offer(&self, offeror: &Party) -> Instruction {
        Instruction::cancel_offer(self.bank.config(), &offeror.address, &offeror.a).unwrap()
    }
}
