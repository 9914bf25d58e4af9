//! Durable user directory seam
//!
//! The durable account store is an external collaborator; the core reaches it
//! through this trait. The Postgres implementation lives in
//! `repository::users`; `MemoryDirectory` backs tests and local development.

use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::entities::UserRecord;
use typecraft_common::Result;

/// Row lookup and insert against the durable account store.
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find an account row by owner id.
    async fn find(&self, id: Uuid) -> Result<Option<UserRecord>>;

    /// Insert a zero-credit row for this owner if none exists yet, returning
    /// the row that is now present. Safe under concurrent first-requests.
    async fn ensure(&self, id: Uuid, email: &str) -> Result<UserRecord>;
}

/// In-memory `UserDirectory`
#[derive(Default)]
pub struct MemoryDirectory {
    records: Mutex<HashMap<Uuid, UserRecord>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a pre-existing account row.
    pub fn insert(&self, record: UserRecord) {
        self.records
            .lock()
            .expect("directory lock poisoned")
            .insert(record.id, record);
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find(&self, id: Uuid) -> Result<Option<UserRecord>> {
        Ok(self
            .records
            .lock()
            .expect("directory lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn ensure(&self, id: Uuid, email: &str) -> Result<UserRecord> {
        let mut records = self.records.lock().expect("directory lock poisoned");
        Ok(records
            .entry(id)
            .or_insert_with(|| UserRecord::new(id, email))
            .clone())
    }
}
