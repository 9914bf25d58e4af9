//! State machine for export attempts
//!
//! Phases: Idle → Debiting → Persisting → Committed, or
//! Debiting → Aborted (debit failed, nothing persisted), or
//! Persisting → CompensationPending → Refunded | Inconsistent.
//! Committed, Aborted, Refunded, and Inconsistent are terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during phase transitions
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Terminal phase: {0} is a terminal phase and cannot transition")]
    TerminalPhase(String),
}

/// Export attempt phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExportPhase {
    #[default]
    Idle,
    Debiting,
    Persisting,
    Committed,
    /// Debit failed; nothing was persisted and no compensation is needed.
    Aborted,
    /// The debit stands but persistence failed; a refund is being attempted.
    CompensationPending,
    /// The refund restored the balance; only a failed record remains.
    Refunded,
    /// The refund failed too: balance and artifact state disagree.
    Inconsistent,
}

impl ExportPhase {
    /// Check if this is a terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Committed | Self::Aborted | Self::Refunded | Self::Inconsistent
        )
    }
}

impl std::fmt::Display for ExportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Debiting => write!(f, "debiting"),
            Self::Persisting => write!(f, "persisting"),
            Self::Committed => write!(f, "committed"),
            Self::Aborted => write!(f, "aborted"),
            Self::CompensationPending => write!(f, "compensation_pending"),
            Self::Refunded => write!(f, "refunded"),
            Self::Inconsistent => write!(f, "inconsistent"),
        }
    }
}

/// Events that drive an export attempt forward
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExportEvent {
    Begin,
    DebitSucceeded,
    DebitFailed,
    PersistSucceeded,
    PersistFailed,
    RefundSucceeded,
    RefundFailed,
}

impl std::fmt::Display for ExportEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Begin => write!(f, "begin"),
            Self::DebitSucceeded => write!(f, "debit_succeeded"),
            Self::DebitFailed => write!(f, "debit_failed"),
            Self::PersistSucceeded => write!(f, "persist_succeeded"),
            Self::PersistFailed => write!(f, "persist_failed"),
            Self::RefundSucceeded => write!(f, "refund_succeeded"),
            Self::RefundFailed => write!(f, "refund_failed"),
        }
    }
}

/// Export phase machine
pub struct ExportStateMachine;

impl ExportStateMachine {
    /// Attempt a phase transition
    pub fn transition(current: ExportPhase, event: ExportEvent) -> Result<ExportPhase, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalPhase(current.to_string()));
        }

        let next = match (&current, &event) {
            (ExportPhase::Idle, ExportEvent::Begin) => ExportPhase::Debiting,
            (ExportPhase::Debiting, ExportEvent::DebitSucceeded) => ExportPhase::Persisting,
            (ExportPhase::Debiting, ExportEvent::DebitFailed) => ExportPhase::Aborted,
            (ExportPhase::Persisting, ExportEvent::PersistSucceeded) => ExportPhase::Committed,
            (ExportPhase::Persisting, ExportEvent::PersistFailed) => {
                ExportPhase::CompensationPending
            }
            (ExportPhase::CompensationPending, ExportEvent::RefundSucceeded) => {
                ExportPhase::Refunded
            }
            (ExportPhase::CompensationPending, ExportEvent::RefundFailed) => {
                ExportPhase::Inconsistent
            }
            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    event: event.to_string(),
                });
            }
        };

        Ok(next)
    }
}
