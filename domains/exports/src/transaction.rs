//! The export transaction
//!
//! Composes the ledger, the font catalog, and a completed preview reference
//! into one logical operation: debit the owner, persist the font, and
//! compensate the ledger if persistence fails after the debit. There is no
//! automatic retry at any step; the caller decides whether to re-invoke the
//! whole transaction from the top (safe after `InsufficientCredits`,
//! `LedgerUnavailable`, or `PersistenceFailure`; never after
//! `ConsistencyFault`).

use std::sync::Arc;

use typecraft_common::{Error, Result};
use typecraft_fonts::{Font, FontCatalog, FontDraft, FontFiles};
use typecraft_identity::Identity;
use typecraft_ledger::{export_reason, refund_reason, CreditLedger};

use crate::domain::state::{ExportEvent, ExportPhase, ExportStateMachine};

/// One export attempt's inputs: the record metadata carrying the completed
/// preview reference, the rendered-file references to attach on commit, and
/// the non-negative cost.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub draft: FontDraft,
    pub files: FontFiles,
    pub cost: i32,
}

/// Tracks a single attempt through the phase machine.
struct ExportAttempt {
    phase: ExportPhase,
}

impl ExportAttempt {
    fn new() -> Self {
        Self {
            phase: ExportPhase::Idle,
        }
    }

    fn advance(&mut self, event: ExportEvent) -> Result<ExportPhase> {
        self.phase = ExportStateMachine::transition(self.phase, event)
            .map_err(|e| Error::InvalidTransition(e.to_string()))?;
        Ok(self.phase)
    }
}

pub struct ExportTransaction {
    ledger: Arc<CreditLedger>,
    catalog: FontCatalog,
}

impl ExportTransaction {
    pub fn new(ledger: Arc<CreditLedger>, catalog: FontCatalog) -> Self {
        Self { ledger, catalog }
    }

    /// Run one export attempt to a terminal phase.
    ///
    /// Each attempt creates its own font record, so re-invoking after a
    /// failure always works on a fresh id; this call is not re-entrant for an
    /// existing record.
    pub async fn execute(&self, identity: &Identity, request: ExportRequest) -> Result<Font> {
        if request.cost < 0 {
            return Err(Error::Validation(
                "Export cost cannot be negative".to_string(),
            ));
        }

        // Step 1: precondition check, before any state is created.
        if request.cost > 0 {
            let available = self.ledger.balance(identity).await?;
            if available < request.cost {
                return Err(Error::InsufficientCredits {
                    required: request.cost,
                    available,
                });
            }
        }

        let mut attempt = ExportAttempt::new();

        // Step 2: create the record first so any later failure is
        // attributable to a concrete font id.
        let font = self.catalog.create(identity, request.draft).await?;
        attempt.advance(ExportEvent::Begin)?;

        tracing::debug!(font = %font.id, identity = %identity, cost = request.cost, "Export attempt started");

        // Step 3: debit. On failure nothing was persisted as billable, so no
        // compensation is needed; the record is marked failed for audit.
        if let Err(debit_error) = self
            .ledger
            .debit(identity, request.cost, &export_reason(font.id))
            .await
        {
            attempt.advance(ExportEvent::DebitFailed)?;
            if let Err(mark_error) = self
                .catalog
                .mark_failed(identity, font.id, &debit_error.to_string())
                .await
            {
                // Should not occur under correct orchestration.
                tracing::error!(
                    font = %font.id,
                    error = %mark_error,
                    "Failed to mark font failed after debit failure"
                );
            }
            tracing::warn!(font = %font.id, error = %debit_error, "Export debit failed");
            return Err(debit_error);
        }
        attempt.advance(ExportEvent::DebitSucceeded)?;

        // Step 4: persist the billable result.
        match self
            .catalog
            .commit(identity, font.id, request.files)
            .await
        {
            Ok(committed) => {
                attempt.advance(ExportEvent::PersistSucceeded)?;
                tracing::info!(font = %committed.id, identity = %identity, "Export committed");
                Ok(committed)
            }
            Err(commit_error) => {
                attempt.advance(ExportEvent::PersistFailed)?;

                // Step 5: compensate the debit.
                match self
                    .ledger
                    .credit(identity, request.cost, &refund_reason(font.id))
                    .await
                {
                    Ok(_) => {
                        attempt.advance(ExportEvent::RefundSucceeded)?;
                        if let Err(mark_error) = self
                            .catalog
                            .mark_failed(identity, font.id, &commit_error.to_string())
                            .await
                        {
                            tracing::error!(
                                font = %font.id,
                                error = %mark_error,
                                "Failed to mark font failed after refund"
                            );
                        }
                        tracing::warn!(
                            font = %font.id,
                            error = %commit_error,
                            "Export persistence failed; debit refunded"
                        );
                        Err(Error::PersistenceFailure(commit_error.to_string()))
                    }
                    Err(refund_error) => {
                        attempt.advance(ExportEvent::RefundFailed)?;
                        // The record stays `processing` and the debit stands.
                        // Requires out-of-band reconciliation; must not be
                        // retried automatically.
                        tracing::error!(
                            font = %font.id,
                            identity = %identity,
                            debited = request.cost,
                            commit_error = %commit_error,
                            refund_error = %refund_error,
                            "Export left inconsistent: debit stands without a committed font"
                        );
                        Err(Error::ConsistencyFault {
                            font: font.id,
                            debited: request.cost,
                            detail: format!(
                                "commit failed ({}); refund failed ({})",
                                commit_error, refund_error
                            ),
                        })
                    }
                }
            }
        }
    }
}
