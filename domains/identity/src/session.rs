//! Local ephemeral-session store
//!
//! A demo session is one fixed key holding a serialized `{id, email, credits}`
//! record. The record is written on demo-session start and on every ephemeral
//! debit/credit, and cleared on sign-out or on decode failure.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use typecraft_common::Result;

/// Fixed key under which the demo-session marker is stored.
pub const DEMO_SESSION_KEY: &str = "typecraft_demo_user";

/// The serialized demo-session marker record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoSession {
    pub id: Uuid,
    pub email: String,
    pub credits: i32,
}

/// Key-value store for session-local state, the durable store's local
/// counterpart. Values are opaque strings.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// In-memory `LocalStore`
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("local store lock poisoned")
            .get(key)
            .cloned()
    }

    fn put(&self, key: &str, value: String) {
        self.entries
            .lock()
            .expect("local store lock poisoned")
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .expect("local store lock poisoned")
            .remove(key);
    }
}

/// Typed access to the demo-session marker.
#[derive(Clone)]
pub struct DemoSessionStore {
    store: Arc<dyn LocalStore>,
}

impl DemoSessionStore {
    pub fn new(store: Arc<dyn LocalStore>) -> Self {
        Self { store }
    }

    /// Start a demo session with the given seed balance and persist the
    /// marker.
    pub fn start(&self, email: &str, seed_credits: i32) -> Result<DemoSession> {
        let session = DemoSession {
            id: Uuid::new_v4(),
            email: email.to_string(),
            credits: seed_credits,
        };
        self.save(&session)?;
        Ok(session)
    }

    /// Load the marker if present and well-formed. A marker that fails to
    /// decode is removed from the store and reported as absent, not as an
    /// error.
    pub fn load(&self) -> Option<DemoSession> {
        let raw = self.store.get(DEMO_SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(error) => {
                tracing::warn!(%error, "Discarding malformed demo-session marker");
                self.store.remove(DEMO_SESSION_KEY);
                None
            }
        }
    }

    /// Write the marker back, e.g. after a balance change.
    pub fn save(&self, session: &DemoSession) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.store.put(DEMO_SESSION_KEY, raw);
        Ok(())
    }

    /// Clear the marker (sign-out).
    pub fn clear(&self) {
        self.store.remove(DEMO_SESSION_KEY);
    }
}
