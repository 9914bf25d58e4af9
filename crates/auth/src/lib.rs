//! Identity provider collaborator for TypeCraft
//!
//! Wraps the external auth service (Supabase GoTrue) behind a trait:
//! - `sign_in` / `sign_up` / `sign_out` account operations
//! - a broadcast stream of session-change events (`SessionEvent`)
//! - a mock provider for testing and development
//!
//! Session subscriptions are scoped resources: `subscribe()` returns a
//! `SessionWatch` guard that releases its slot when dropped, so a consumer
//! holds the stream exactly as long as its session lives.

pub mod mock;
pub mod supabase;

use thiserror::Error;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Capacity of the session event channel. Events are tiny and consumers keep
/// up; a small buffer only has to absorb bursts around sign-in/sign-out.
const SESSION_CHANNEL_CAPACITY: usize = 16;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Auth configuration error: {0}")]
    Configuration(String),

    #[error("Auth request error: {0}")]
    Request(String),

    #[error("Auth response error: {0}")]
    Response(String),

    #[error("Invalid credentials")]
    InvalidCredentials,
}

/// A session-change event observed from the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A durable session exists for this account.
    Present { owner: Uuid, email: String },
    /// No durable session exists.
    Absent,
}

/// Scoped subscription to the session event stream.
///
/// Dropping the watch releases the subscription; `release()` makes the
/// teardown explicit at session end.
pub struct SessionWatch {
    rx: broadcast::Receiver<SessionEvent>,
}

impl SessionWatch {
    fn new(rx: broadcast::Receiver<SessionEvent>) -> Self {
        Self { rx }
    }

    /// Wait for the next session event. Returns `None` once the provider has
    /// shut down and no further events can arrive. A lagged receiver skips
    /// to the oldest retained event; only the latest session state matters.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Session watch lagged; catching up");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Return an event immediately if one is queued, without waiting.
    pub fn try_next(&mut self) -> Option<SessionEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }

    /// Explicitly release the subscription.
    pub fn release(self) {}
}

/// Shared event fan-out used by provider implementations.
#[derive(Clone)]
pub(crate) struct SessionBroadcast {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionBroadcast {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(SESSION_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> SessionWatch {
        SessionWatch::new(self.tx.subscribe())
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        // A send error only means no subscriber is currently listening.
        let _ = self.tx.send(event);
    }
}

/// Identity provider operations consumed by the core.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Authenticate an existing account. Emits `SessionEvent::Present` on
    /// success.
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Register a new account. Whether a session is established immediately
    /// depends on the provider's email-confirmation settings.
    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// End the current session. Emits `SessionEvent::Absent`.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Subscribe to session-change events.
    fn subscribe(&self) -> SessionWatch;
}

/// Provider configuration
#[derive(Clone)]
pub struct AuthProviderConfig {
    pub provider: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl std::fmt::Debug for AuthProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthProviderConfig")
            .field("provider", &self.provider)
            .field("supabase_url", &self.supabase_url)
            .finish()
    }
}

/// Factory for creating IdentityProvider implementations
pub struct IdentityProviderFactory;

impl IdentityProviderFactory {
    pub fn create(config: AuthProviderConfig) -> Result<Box<dyn IdentityProvider>, AuthError> {
        match config.provider.as_str() {
            "supabase" => {
                tracing::info!("Creating Supabase identity provider");
                Ok(Box::new(supabase::SupabaseProvider::new(
                    config.supabase_url,
                    config.supabase_anon_key,
                )))
            }
            "mock" => {
                tracing::info!("Creating mock identity provider");
                Ok(Box::new(mock::MockIdentityProvider::new()))
            }
            provider => Err(AuthError::Configuration(format!(
                "Unknown auth provider: {}. Supported providers: supabase, mock",
                provider
            ))),
        }
    }
}
