//! Domain entities for the Ledger domain
//!
//! A balance is never stored as a fact of its own; it is the running sum of
//! an owner's entries, and no entry may be applied that would push that sum
//! below zero.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reason attached to a purchase top-up (payment collaborator contract).
pub const PURCHASE_REASON: &str = "purchase";

/// Reason attached to the one-time sign-up grant.
pub const SIGNUP_GRANT_REASON: &str = "signup-grant";

/// Reason for the debit of an export attempt.
pub fn export_reason(font_id: Uuid) -> String {
    format!("export:{}", font_id)
}

/// Reason for the compensating refund of a failed export attempt.
pub fn refund_reason(font_id: Uuid) -> String {
    format!("refund:{}", font_id)
}

/// An immutable signed adjustment to an owner's balance. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub owner: Uuid,
    pub delta: i32,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Record a debit of `amount` credits. A zero amount is legal: free
    /// exports still commit an entry so every `ready` font has one.
    pub fn debit(owner: Uuid, amount: i32, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            delta: -amount,
            reason: reason.into(),
            created_at: Utc::now(),
        }
    }

    /// Record a credit of `amount` credits.
    pub fn credit(owner: Uuid, amount: i32, reason: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            delta: amount,
            reason: reason.into(),
            created_at: Utc::now(),
        }
    }
}
