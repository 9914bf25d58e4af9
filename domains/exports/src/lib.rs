//! Exports domain: spending credits to make a preview durable
//!
//! `ExportTransaction` is the only writer of billable state: it debits the
//! ledger, commits the font, and compensates the debit when persistence
//! fails. Its residual failure mode, `ConsistencyFault`, is surfaced
//! distinctly and never retried automatically.

pub mod domain;
pub mod transaction;

// Re-export domain types at the crate root for convenience
pub use domain::state::{ExportEvent, ExportPhase, ExportStateMachine};

pub use transaction::{ExportRequest, ExportTransaction};
