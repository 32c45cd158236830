//! Instruction dispatch
//!
//! The program holds no balances and no state of its own. Each call gets a
//! ledger, the verified signer set and one instruction, and either returns
//! the event describing what moved or an error. Rolling back a failed
//! instruction is the ledger's job.

use tracing::{info, warn};

use crate::config::ProgramConfig;
use crate::errors::BazaarError;
use crate::events::ContractEvent;
use crate::instruction::Instruction;
use crate::ledger::Ledger;
use crate::security::Signers;
use crate::{escrow, listing, offer};

/// What every handler runs against.
pub struct Context<'a, L: Ledger> {
    pub config: &'a ProgramConfig,
    pub ledger: &'a mut L,
    pub signers: &'a Signers,
}

#[derive(Debug, Clone, Default)]
pub struct BazaarProgram {
    config: ProgramConfig,
}

impl BazaarProgram {
    pub fn new(config: ProgramConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProgramConfig {
        &self.config
    }

    /// Execute one instruction.
    pub fn process<L: Ledger>(
        &self,
        ledger: &mut L,
        signers: &Signers,
        instruction: &Instruction,
    ) -> Result<ContractEvent, BazaarError> {
        let mut ctx = Context {
            config: &self.config,
            ledger,
            signers,
        };

        let result = match instruction {
            Instruction::InitializeEscrow {
                accounts,
                vault_bump,
                deposit_amount,
                desired_amount,
            } => escrow::initialize(&mut ctx, accounts, *vault_bump, *deposit_amount, *desired_amount),
            Instruction::Exchange { accounts } => escrow::exchange(&mut ctx, accounts),
            Instruction::CancelEscrow { accounts } => escrow::cancel(&mut ctx, accounts),
            Instruction::InitializeListing { accounts, amount } => {
                listing::initialize(&mut ctx, accounts, *amount)
            }
            Instruction::CloseListing { accounts } => listing::close(&mut ctx, accounts),
            Instruction::InitializeOffer {
                accounts,
                vault_bump,
                offer_amount,
                required_amount,
            } => offer::initialize(&mut ctx, accounts, *vault_bump, *offer_amount, *required_amount),
            Instruction::AcceptOffer { accounts } => offer::accept(&mut ctx, accounts),
            Instruction::CancelOffer { accounts } => offer::cancel(&mut ctx, accounts),
        };

        match &result {
            Ok(event) => info!(
                instruction = instruction.name(),
                event = event.name(),
                "Instruction executed"
            ),
            Err(e) => warn!(
                instruction = instruction.name(),
                error = %e,
                "Instruction rejected"
            ),
        }
        result
    }
}
