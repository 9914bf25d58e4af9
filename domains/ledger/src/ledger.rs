//! The credit ledger: sole mutator of every balance
//!
//! Dispatches on the identity variant: durable balances go through the
//! remote store's atomic per-owner primitive, ephemeral balances through a
//! serialized check-then-apply on the demo-session record. Nothing else in
//! the application writes a balance.

use std::sync::{Arc, Mutex};

use typecraft_common::{Error, Result};
use typecraft_identity::{DemoSessionStore, Identity};

use crate::domain::entities::{LedgerEntry, PURCHASE_REASON};
use crate::store::BalanceStore;

pub struct CreditLedger {
    durable: Arc<dyn BalanceStore>,
    sessions: DemoSessionStore,
    /// Session-local entry log; the lock also serializes ephemeral
    /// check-then-apply (one demo session per process, no external
    /// concurrency).
    session_log: Mutex<Vec<LedgerEntry>>,
}

impl CreditLedger {
    pub fn new(durable: Arc<dyn BalanceStore>, sessions: DemoSessionStore) -> Self {
        Self {
            durable,
            sessions,
            session_log: Mutex::new(Vec::new()),
        }
    }

    /// Current balance for this identity. Durable balances are read from the
    /// external store on every call, never cached here.
    pub async fn balance(&self, identity: &Identity) -> Result<i32> {
        match identity {
            Identity::Ephemeral { .. } => {
                let _guard = self.session_log.lock().expect("session log lock poisoned");
                let session = self.sessions.load().ok_or_else(|| {
                    Error::NotFound("Demo session record missing".to_string())
                })?;
                Ok(session.credits)
            }
            Identity::Durable { id, .. } => self.durable.balance(*id).await,
        }
    }

    /// Debit `amount` credits. Fails with `InsufficientCredits` and no
    /// mutation when the balance cannot cover it. Atomic per owner.
    pub async fn debit(&self, identity: &Identity, amount: i32, reason: &str) -> Result<i32> {
        if amount < 0 {
            return Err(Error::Validation(
                "Debit amount cannot be negative".to_string(),
            ));
        }

        let new_balance = match identity {
            Identity::Ephemeral { .. } => {
                let mut log = self.session_log.lock().expect("session log lock poisoned");
                let mut session = self.sessions.load().ok_or_else(|| {
                    Error::NotFound("Demo session record missing".to_string())
                })?;
                if amount > session.credits {
                    return Err(Error::InsufficientCredits {
                        required: amount,
                        available: session.credits,
                    });
                }
                session.credits -= amount;
                self.sessions.save(&session)?;
                log.push(LedgerEntry::debit(session.id, amount, reason));
                session.credits
            }
            Identity::Durable { id, .. } => self.durable.apply(*id, -amount, reason).await?,
        };

        tracing::debug!(identity = %identity, amount, reason, new_balance, "Debit committed");
        Ok(new_balance)
    }

    /// Credit `amount` credits unconditionally. Atomic per owner. Used for
    /// purchase top-ups, grants, and export compensation.
    pub async fn credit(&self, identity: &Identity, amount: i32, reason: &str) -> Result<i32> {
        if amount < 0 {
            return Err(Error::Validation(
                "Credit amount cannot be negative".to_string(),
            ));
        }

        let new_balance = match identity {
            Identity::Ephemeral { .. } => {
                let mut log = self.session_log.lock().expect("session log lock poisoned");
                let mut session = self.sessions.load().ok_or_else(|| {
                    Error::NotFound("Demo session record missing".to_string())
                })?;
                session.credits += amount;
                self.sessions.save(&session)?;
                log.push(LedgerEntry::credit(session.id, amount, reason));
                session.credits
            }
            Identity::Durable { id, .. } => self.durable.apply(*id, amount, reason).await?,
        };

        tracing::debug!(identity = %identity, amount, reason, new_balance, "Credit committed");
        Ok(new_balance)
    }

    /// Purchase top-up: the payment collaborator's only contract with the
    /// core.
    pub async fn top_up(&self, identity: &Identity, amount: i32) -> Result<i32> {
        self.credit(identity, amount, PURCHASE_REASON).await
    }

    /// Committed entries for this identity, newest first. Ephemeral history
    /// is the session-local log; the durable store is never consulted for it.
    pub async fn history(&self, identity: &Identity) -> Result<Vec<LedgerEntry>> {
        match identity {
            Identity::Ephemeral { id, .. } => {
                let log = self.session_log.lock().expect("session log lock poisoned");
                let mut entries: Vec<LedgerEntry> =
                    log.iter().filter(|e| e.owner == *id).cloned().collect();
                entries.reverse();
                Ok(entries)
            }
            Identity::Durable { id, .. } => self.durable.history(*id).await,
        }
    }
}
