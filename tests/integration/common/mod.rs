//! Common test utilities and fixtures for integration tests
//!
//! Provides shared infrastructure for the core test suites:
//! - assembled cores over in-memory stores (no database required)
//! - demo and durable identity fixtures
//! - failure-injecting store doubles for the compensation paths

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use typecraft_common::{Error, Result};
use typecraft_exports::{ExportRequest, ExportTransaction};
use typecraft_fonts::{Font, FontCatalog, FontDraft, FontFiles, FontStore, SessionFontStore};
use typecraft_identity::{DemoSessionStore, Identity, MemoryStore};
use typecraft_ledger::{BalanceStore, CreditLedger, LedgerEntry, MemoryBalanceStore};

/// A `FontStore` whose commit can be switched to fail, standing in for a
/// durable store that loses writes mid-transaction.
pub struct FailingFontStore {
    inner: SessionFontStore,
    fail_commit: AtomicBool,
}

impl FailingFontStore {
    pub fn new() -> Self {
        Self {
            inner: SessionFontStore::new(),
            fail_commit: AtomicBool::new(false),
        }
    }

    pub fn fail_commits(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl FontStore for FailingFontStore {
    async fn create(&self, owner: Uuid, draft: FontDraft) -> Result<Font> {
        self.inner.create(owner, draft).await
    }

    async fn commit(&self, id: Uuid, files: FontFiles) -> Result<Font> {
        if self.fail_commit.load(Ordering::SeqCst) {
            return Err(Error::Unexpected(anyhow::anyhow!(
                "simulated storage outage"
            )));
        }
        self.inner.commit(id, files).await
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<Font> {
        self.inner.mark_failed(id, reason).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Font>> {
        self.inner.find(id).await
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Font>> {
        self.inner.list(owner).await
    }
}

/// A `BalanceStore` whose credits (refunds, top-ups) can be switched to
/// fail, standing in for a ledger that goes down between debit and refund.
pub struct FailingBalanceStore {
    inner: MemoryBalanceStore,
    fail_credits: AtomicBool,
}

impl FailingBalanceStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryBalanceStore::new(),
            fail_credits: AtomicBool::new(false),
        }
    }

    pub fn seed(&self, owner: Uuid, credits: i32) {
        self.inner.seed(owner, credits);
    }

    pub fn fail_credits(&self, fail: bool) {
        self.fail_credits.store(fail, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl BalanceStore for FailingBalanceStore {
    async fn balance(&self, owner: Uuid) -> Result<i32> {
        self.inner.balance(owner).await
    }

    async fn apply(&self, owner: Uuid, delta: i32, reason: &str) -> Result<i32> {
        if delta > 0 && self.fail_credits.load(Ordering::SeqCst) {
            return Err(Error::LedgerUnavailable(
                "simulated ledger outage".to_string(),
            ));
        }
        self.inner.apply(owner, delta, reason).await
    }

    async fn history(&self, owner: Uuid) -> Result<Vec<LedgerEntry>> {
        self.inner.history(owner).await
    }
}

/// An assembled core over in-memory stores, with handles to the injectable
/// doubles.
pub struct TestCore {
    pub ledger: Arc<CreditLedger>,
    pub catalog: FontCatalog,
    pub exports: ExportTransaction,
    pub sessions: DemoSessionStore,
    pub balances: Arc<FailingBalanceStore>,
    pub durable_fonts: Arc<FailingFontStore>,
}

impl TestCore {
    pub fn new() -> Self {
        let sessions = DemoSessionStore::new(Arc::new(MemoryStore::new()));
        let balances = Arc::new(FailingBalanceStore::new());
        let durable_fonts = Arc::new(FailingFontStore::new());

        let ledger = Arc::new(CreditLedger::new(balances.clone(), sessions.clone()));
        let catalog = FontCatalog::new(durable_fonts.clone(), Arc::new(SessionFontStore::new()));
        let exports = ExportTransaction::new(ledger.clone(), catalog.clone());

        Self {
            ledger,
            catalog,
            exports,
            sessions,
            balances,
            durable_fonts,
        }
    }

    /// Start a demo session and return its ephemeral identity.
    pub fn demo_identity(&self, seed_credits: i32) -> Identity {
        let demo = self
            .sessions
            .start("demo@typecraft.ai", seed_credits)
            .expect("demo session starts");
        Identity::Ephemeral {
            id: demo.id,
            email: demo.email,
            seed_credits: demo.credits,
        }
    }

    /// Seed a durable account and return its identity.
    pub fn durable_identity(&self, credits: i32) -> Identity {
        let id = Uuid::new_v4();
        self.balances.seed(id, credits);
        Identity::Durable {
            id,
            email: format!("test_{}@typecraft.test", id.simple()),
        }
    }
}

/// A standard export request at the given cost.
pub fn export_request(cost: i32) -> ExportRequest {
    ExportRequest {
        draft: FontDraft {
            family_name: "Acme Sans".to_string(),
            prompt: "A clean modern sans serif for a tech startup".to_string(),
            preview_url: Some("https://cdn.typecraft.ai/previews/acme.png".to_string()),
        },
        files: FontFiles::woff2("https://cdn.typecraft.ai/fonts/acme-v1.woff2"),
        cost,
    }
}
