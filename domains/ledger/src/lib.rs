//! Ledger domain: append-only credit entries and the atomic balance mutator
//!
//! `CreditLedger` is the sole path by which any balance changes. Durable
//! balances are serialized per owner by the remote store's atomic primitive;
//! ephemeral balances by single-threaded check-then-apply over the
//! demo-session record.

pub mod domain;
pub mod ledger;
pub mod repository;
pub mod store;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{
    export_reason, refund_reason, LedgerEntry, PURCHASE_REASON, SIGNUP_GRANT_REASON,
};

pub use ledger::CreditLedger;
pub use repository::PgBalanceStore;
pub use store::{BalanceStore, MemoryBalanceStore};
