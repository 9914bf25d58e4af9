//! Durable balance store seam
//!
//! The remote store serializes balance changes per owner; this trait is the
//! only path by which a durable balance moves. The Postgres implementation
//! lives in `repository::entries`; `MemoryBalanceStore` backs tests and local
//! development.

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::LedgerEntry;
use typecraft_common::{Error, Result};

/// Server-trusted balance operations, atomic per owner.
#[async_trait::async_trait]
pub trait BalanceStore: Send + Sync {
    /// Current committed balance for this owner. Never cached by callers.
    async fn balance(&self, owner: Uuid) -> Result<i32>;

    /// Apply a signed delta and append the matching entry in one atomic
    /// step. Fails with `InsufficientCredits` (and no mutation) if the
    /// resulting balance would be negative.
    async fn apply(&self, owner: Uuid, delta: i32, reason: &str) -> Result<i32>;

    /// Committed entries for this owner, newest first.
    async fn history(&self, owner: Uuid) -> Result<Vec<LedgerEntry>>;
}

/// In-memory `BalanceStore`
#[derive(Default)]
pub struct MemoryBalanceStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    balances: HashMap<Uuid, i32>,
    entries: Vec<LedgerEntry>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an owner with an opening balance.
    pub fn seed(&self, owner: Uuid, credits: i32) {
        self.state
            .lock()
            .expect("balance store lock poisoned")
            .balances
            .insert(owner, credits);
    }
}

#[async_trait::async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn balance(&self, owner: Uuid) -> Result<i32> {
        Ok(*self
            .state
            .lock()
            .expect("balance store lock poisoned")
            .balances
            .get(&owner)
            .unwrap_or(&0))
    }

    async fn apply(&self, owner: Uuid, delta: i32, reason: &str) -> Result<i32> {
        let mut state = self.state.lock().expect("balance store lock poisoned");
        let current = *state.balances.get(&owner).unwrap_or(&0);
        let next = current + delta;
        if next < 0 {
            return Err(Error::InsufficientCredits {
                required: -delta,
                available: current,
            });
        }
        state.balances.insert(owner, next);
        let entry = if delta < 0 {
            LedgerEntry::debit(owner, -delta, reason)
        } else {
            LedgerEntry::credit(owner, delta, reason)
        };
        state.entries.push(entry);
        Ok(next)
    }

    async fn history(&self, owner: Uuid) -> Result<Vec<LedgerEntry>> {
        let state = self.state.lock().expect("balance store lock poisoned");
        let mut entries: Vec<LedgerEntry> = state
            .entries
            .iter()
            .filter(|e| e.owner == owner)
            .cloned()
            .collect();
        entries.reverse();
        Ok(entries)
    }
}
