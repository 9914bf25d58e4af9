//! Identity resolution
//!
//! Two independent, asynchronous signals can claim the session: the local
//! demo-session marker and the durable session stream. The resolver owns the
//! precedence rule: a well-formed local marker is the unique source of truth
//! for its own lifetime, and durable stream events never clear or replace it.

use std::sync::{Arc, Mutex};

use typecraft_auth::SessionEvent;
use typecraft_common::Result;

use crate::directory::UserDirectory;
use crate::domain::entities::Identity;
use crate::session::DemoSessionStore;

/// Produces the single authoritative identity for ledger and font operations.
pub struct IdentityResolver {
    sessions: DemoSessionStore,
    directory: Arc<dyn UserDirectory>,
    active: Mutex<Option<Identity>>,
}

impl IdentityResolver {
    pub fn new(sessions: DemoSessionStore, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            sessions,
            directory,
            active: Mutex::new(None),
        }
    }

    /// Resolve the active identity.
    ///
    /// The local marker wins unconditionally; without one, the identity last
    /// derived from the durable session stream applies (none before the first
    /// event arrives).
    pub fn resolve(&self) -> Option<Identity> {
        if let Some(demo) = self.sessions.load() {
            let identity = Identity::Ephemeral {
                id: demo.id,
                email: demo.email,
                seed_credits: demo.credits,
            };
            *self.active.lock().expect("active identity lock poisoned") =
                Some(identity.clone());
            return Some(identity);
        }

        self.active
            .lock()
            .expect("active identity lock poisoned")
            .clone()
    }

    /// Apply a durable session-stream event.
    ///
    /// With a local marker present this is a no-op: the event never clears or
    /// replaces the active identity, whatever it reports. Otherwise a
    /// `Present` event adopts the matching account row, provisioning a
    /// zero-credit row when none exists yet, and `Absent` clears the
    /// identity. A failed directory call means "no record yet", not an error.
    pub async fn observe(&self, event: SessionEvent) -> Result<Option<Identity>> {
        if let Some(demo) = self.sessions.load() {
            tracing::debug!(
                ?event,
                "Ignoring durable session event while demo marker is active"
            );
            let identity = Identity::Ephemeral {
                id: demo.id,
                email: demo.email,
                seed_credits: demo.credits,
            };
            *self.active.lock().expect("active identity lock poisoned") =
                Some(identity.clone());
            return Ok(Some(identity));
        }

        let resolved = match event {
            SessionEvent::Present { owner, email } => {
                let identity = match self.directory.ensure(owner, &email).await {
                    Ok(record) => Identity::Durable {
                        id: record.id,
                        email: record.email,
                    },
                    Err(error) => {
                        // The store will provision the row itself; adopt the
                        // session's identity with an implicit zero balance.
                        tracing::warn!(%error, %owner, "Directory unavailable; adopting session identity");
                        Identity::Durable { id: owner, email }
                    }
                };
                Some(identity)
            }
            SessionEvent::Absent => None,
        };

        *self.active.lock().expect("active identity lock poisoned") = resolved.clone();
        Ok(resolved)
    }

    /// Start a demo session: writes the marker and activates the ephemeral
    /// identity.
    pub fn start_demo(&self, email: &str, seed_credits: i32) -> Result<Identity> {
        let demo = self.sessions.start(email, seed_credits)?;
        let identity = Identity::Ephemeral {
            id: demo.id,
            email: demo.email,
            seed_credits: demo.credits,
        };
        *self.active.lock().expect("active identity lock poisoned") = Some(identity.clone());
        tracing::info!(identity = %identity, "Demo session started");
        Ok(identity)
    }

    /// End the session: clears the marker and the active identity.
    pub fn end_session(&self) {
        self.sessions.clear();
        *self.active.lock().expect("active identity lock poisoned") = None;
        tracing::info!("Session ended");
    }
}
