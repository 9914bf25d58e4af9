//! TypeCraft application composition root
//!
//! Wires the identity resolver, ledger, font catalog, export transaction,
//! and the external collaborators into one core.

use std::sync::Arc;

use sqlx::PgPool;

use typecraft_auth::{AuthProviderConfig, IdentityProvider, IdentityProviderFactory};
use typecraft_common::Config;
use typecraft_engine::{EngineConfig, SpecimenEngine, SpecimenEngineFactory};
use typecraft_exports::ExportTransaction;
use typecraft_fonts::{FontCatalog, PgFontStore, SessionFontStore};
use typecraft_identity::{
    DemoSessionStore, IdentityResolver, MemoryDirectory, MemoryStore, PgUserDirectory,
};
use typecraft_ledger::{CreditLedger, MemoryBalanceStore, PgBalanceStore};

/// The assembled core of the application.
pub struct AppCore {
    pub resolver: Arc<IdentityResolver>,
    pub ledger: Arc<CreditLedger>,
    pub catalog: FontCatalog,
    pub exports: ExportTransaction,
    pub engine: Arc<dyn SpecimenEngine>,
    pub provider: Arc<dyn IdentityProvider>,
}

/// Create the core against the durable store and the configured
/// collaborators.
pub async fn create_core(config: Config, pool: PgPool) -> Result<AppCore, anyhow::Error> {
    let sessions = DemoSessionStore::new(Arc::new(MemoryStore::new()));

    let resolver = Arc::new(IdentityResolver::new(
        sessions.clone(),
        Arc::new(PgUserDirectory::new(pool.clone())),
    ));

    let ledger = Arc::new(CreditLedger::new(
        Arc::new(PgBalanceStore::new(pool.clone())),
        sessions,
    ));

    let catalog = FontCatalog::new(
        Arc::new(PgFontStore::new(pool)),
        Arc::new(SessionFontStore::new()),
    );

    let exports = ExportTransaction::new(ledger.clone(), catalog.clone());

    let engine = SpecimenEngineFactory::create(EngineConfig {
        provider: config.engine_provider.clone(),
        gemini_api_key: config.gemini_api_key.clone(),
        base_url: None,
    })?;

    let provider = IdentityProviderFactory::create(AuthProviderConfig {
        provider: "supabase".to_string(),
        supabase_url: config.supabase_url.clone(),
        supabase_anon_key: config.supabase_anon_key.clone(),
    })?;

    Ok(AppCore {
        resolver,
        ledger,
        catalog,
        exports,
        engine: Arc::from(engine),
        provider: Arc::from(provider),
    })
}

/// Create a core wired entirely to in-memory stores and mock collaborators.
/// Used for local development and demos; no database or network required.
pub fn create_demo_core() -> Result<AppCore, anyhow::Error> {
    let sessions = DemoSessionStore::new(Arc::new(MemoryStore::new()));

    let resolver = Arc::new(IdentityResolver::new(
        sessions.clone(),
        Arc::new(MemoryDirectory::new()),
    ));

    let ledger = Arc::new(CreditLedger::new(
        Arc::new(MemoryBalanceStore::new()),
        sessions,
    ));

    let catalog = FontCatalog::new(
        Arc::new(SessionFontStore::new()),
        Arc::new(SessionFontStore::new()),
    );

    let exports = ExportTransaction::new(ledger.clone(), catalog.clone());

    let engine = SpecimenEngineFactory::create(EngineConfig {
        provider: "mock".to_string(),
        gemini_api_key: String::new(),
        base_url: None,
    })?;

    let provider = IdentityProviderFactory::create(AuthProviderConfig {
        provider: "mock".to_string(),
        supabase_url: String::new(),
        supabase_anon_key: String::new(),
    })?;

    Ok(AppCore {
        resolver,
        ledger,
        catalog,
        exports,
        engine: Arc::from(engine),
        provider: Arc::from(provider),
    })
}

/// Pump the provider's session stream into the resolver for the life of the
/// session. The subscription is held by the task and released when the
/// stream closes or the task is aborted.
pub fn spawn_session_pump(
    resolver: Arc<IdentityResolver>,
    provider: &dyn IdentityProvider,
) -> tokio::task::JoinHandle<()> {
    let mut watch = provider.subscribe();
    tokio::spawn(async move {
        while let Some(event) = watch.next().await {
            if let Err(error) = resolver.observe(event).await {
                tracing::warn!(%error, "Failed to apply session event");
            }
        }
    })
}
