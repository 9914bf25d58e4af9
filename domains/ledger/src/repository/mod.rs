//! Repository layer for the Ledger domain

pub mod entries;

pub use entries::PgBalanceStore;
