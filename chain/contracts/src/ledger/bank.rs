//! Local transaction runner
//!
//! [`Bank`] plays the part of the runtime for a single process: it verifies
//! signatures, runs one instruction atomically against a [`MemoryLedger`],
//! and refuses to commit anything that changes total value. A committed
//! transaction produces a [`Receipt`] and appends its event to the log.

use std::collections::BTreeSet;

use bazaar_types::ids::TransactionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::memory::{MemoryLedger, ValueSnapshot};
use crate::config::{LedgerConfig, ProgramConfig};
use crate::errors::BazaarError;
use crate::events::ContractEvent;
use crate::program::BazaarProgram;
use crate::transaction::Transaction;

/// Proof that a transaction committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub committed_at: DateTime<Utc>,
    pub instruction: String,
    pub event: ContractEvent,
}

#[derive(Debug, Clone)]
pub struct Bank {
    ledger: MemoryLedger,
    program: BazaarProgram,
    /// Committed ids at or after `horizon`, kept for replay checks.
    processed: BTreeSet<TransactionId>,
    /// Ids older than this are refused without a lookup.
    horizon: Option<TransactionId>,
    events: Vec<ContractEvent>,
}

impl Bank {
    pub fn new(program_config: ProgramConfig, ledger_config: LedgerConfig) -> Self {
        Self {
            ledger: MemoryLedger::new(ledger_config),
            program: BazaarProgram::new(program_config),
            processed: BTreeSet::new(),
            horizon: None,
            events: Vec::new(),
        }
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    /// Direct ledger access for harness setup (airdrops, mints).
    pub fn ledger_mut(&mut self) -> &mut MemoryLedger {
        &mut self.ledger
    }

    pub fn config(&self) -> &ProgramConfig {
        self.program.config()
    }

    /// Verify, execute and commit one transaction.
    ///
    /// On any error the ledger is left exactly as it was.
    pub fn process_transaction(&mut self, tx: &Transaction) -> Result<Receipt, BazaarError> {
        let stale = self.horizon.is_some_and(|horizon| tx.id < horizon);
        if stale || self.processed.contains(&tx.id) {
            warn!(transaction_id = %tx.id, "Replayed transaction rejected");
            return Err(BazaarError::AlreadyProcessed { id: tx.id });
        }
        let signers = tx.verify()?;

        let before = self.ledger.value_snapshot();
        let program = &self.program;
        let event = self.ledger.atomically(|ledger| {
            let event = program.process(ledger, &signers, &tx.instruction)?;
            check_conservation(&before, &ledger.value_snapshot())?;
            Ok::<_, BazaarError>(event)
        })?;

        self.processed.insert(tx.id);
        self.events.push(event.clone());
        let receipt = Receipt {
            transaction_id: tx.id,
            committed_at: Utc::now(),
            instruction: tx.instruction.name().to_string(),
            event,
        };
        debug!(
            transaction_id = %receipt.transaction_id,
            instruction = %receipt.instruction,
            "Transaction committed"
        );
        Ok(receipt)
    }

    /// Forget committed ids older than `horizon`.
    ///
    /// Transaction ids are time-sortable, so anything older than the horizon
    /// is refused outright from then on and its id no longer needs storing.
    pub fn prune_processed(&mut self, horizon: TransactionId) {
        if self.horizon.is_some_and(|current| current >= horizon) {
            return;
        }
        self.processed = self.processed.split_off(&horizon);
        self.horizon = Some(horizon);
        debug!(horizon = %horizon, retained = self.processed.len(), "Replay window pruned");
    }

    /// Number of committed ids still held for replay checks.
    pub fn processed_len(&self) -> usize {
        self.processed.len()
    }

    /// Append-only log of committed events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Token supply per mint and total lamports must be unchanged.
fn check_conservation(before: &ValueSnapshot, after: &ValueSnapshot) -> Result<(), BazaarError> {
    let mints = before.tokens.keys().chain(after.tokens.keys());
    for mint in mints {
        let was = before.tokens.get(mint).copied().unwrap_or(0);
        let now = after.tokens.get(mint).copied().unwrap_or(0);
        if was != now {
            warn!(mint = %mint, before = was, after = now, "Token conservation violated");
            return Err(BazaarError::ConservationViolated {
                asset: mint.to_string(),
                before: was,
                after: now,
            });
        }
    }
    if before.lamports != after.lamports {
        warn!(before = before.lamports, after = after.lamports, "Lamport conservation violated");
        return Err(BazaarError::ConservationViolated {
            asset: "lamports".to_string(),
            before: before.lamports,
            after: after.lamports,
        });
    }
    Ok(())
}
