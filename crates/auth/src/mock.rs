//! Mock Identity Provider Implementation
//!
//! Used by `IdentityProviderFactory` when provider is `"mock"`. Session
//! events can also be injected directly, letting tests script arbitrary
//! sequences of `Present`/`Absent` signals.

use uuid::Uuid;

use crate::{AuthError, IdentityProvider, SessionBroadcast, SessionEvent, SessionWatch};

/// Mock identity provider for testing
pub struct MockIdentityProvider {
    events: SessionBroadcast,
}

impl MockIdentityProvider {
    /// Create a new mock identity provider
    pub fn new() -> Self {
        Self {
            events: SessionBroadcast::new(),
        }
    }

    /// Inject a `Present` event for an arbitrary owner.
    pub fn emit_present(&self, owner: Uuid, email: &str) {
        self.events.emit(SessionEvent::Present {
            owner,
            email: email.to_string(),
        });
    }

    /// Inject an `Absent` event.
    pub fn emit_absent(&self) {
        self.events.emit(SessionEvent::Absent);
    }
}

impl Default for MockIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<(), AuthError> {
        tracing::info!(%email, "Mock identity provider sign-in");
        self.emit_present(Uuid::new_v4(), email);
        Ok(())
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<(), AuthError> {
        tracing::info!(%email, "Mock identity provider sign-up");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        tracing::info!("Mock identity provider sign-out");
        self.emit_absent();
        Ok(())
    }

    fn subscribe(&self) -> SessionWatch {
        self.events.subscribe()
    }
}
