//! Domain entities for the Identity domain
//!
//! The `Identity` tagged variant is the single value threaded through every
//! ledger and font operation. Behavior always dispatches on the variant
//! itself, never on the contents of the email field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use typecraft_common::{Error, Result};

/// The owner of a credit balance and its fonts.
///
/// Exactly one identity is active per session:
/// - `Ephemeral`: created locally for a demo session, never synced to the
///   durable store. Carries its seed balance.
/// - `Durable`: backed by a row in the external account store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Identity {
    Ephemeral {
        id: Uuid,
        email: String,
        seed_credits: i32,
    },
    Durable {
        id: Uuid,
        email: String,
    },
}

impl Identity {
    pub fn id(&self) -> Uuid {
        match self {
            Identity::Ephemeral { id, .. } | Identity::Durable { id, .. } => *id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Identity::Ephemeral { email, .. } | Identity::Durable { email, .. } => email,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Identity::Ephemeral { .. })
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identity::Ephemeral { id, .. } => write!(f, "ephemeral:{}", id),
            Identity::Durable { id, .. } => write!(f, "durable:{}", id),
        }
    }
}

/// Durable account row as held by the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub credits: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Create a new account record with a zero balance. Credits are granted
    /// afterwards through the ledger, never written directly.
    pub fn new(id: Uuid, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            email: email.into(),
            credits: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        if self.credits < 0 {
            return Err(Error::Validation("Credits cannot be negative".to_string()));
        }
        Ok(())
    }
}
