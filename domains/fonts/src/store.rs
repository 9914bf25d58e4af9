//! Font store seam and the session-local implementation
//!
//! Demo sessions keep their fonts in process memory; durable identities keep
//! theirs in Postgres. The two record sets are disjoint and never
//! cross-queried.

use std::sync::Mutex;
use uuid::Uuid;

use typecraft_common::{Error, Result};

use crate::domain::entities::{Font, FontDraft, FontFiles};

/// Persistence and listing of font records, scoped to the owning identity.
#[async_trait::async_trait]
pub trait FontStore: Send + Sync {
    /// Create a record for an export attempt. Returns it in `processing`.
    async fn create(&self, owner: Uuid, draft: FontDraft) -> Result<Font>;

    /// Transition `processing → ready`, attaching the download references.
    /// Fails with `NotFound` for an unknown id and `InvalidTransition` if the
    /// record is not `processing`.
    async fn commit(&self, id: Uuid, files: FontFiles) -> Result<Font>;

    /// Transition `processing → failed` with a diagnostic reason. Same
    /// guards as `commit`.
    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<Font>;

    /// Find a record by id.
    async fn find(&self, id: Uuid) -> Result<Option<Font>>;

    /// All records owned by this identity, newest first.
    async fn list(&self, owner: Uuid) -> Result<Vec<Font>>;
}

/// In-memory store backing demo sessions.
#[derive(Default)]
pub struct SessionFontStore {
    fonts: Mutex<Vec<Font>>,
}

impl SessionFontStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl FontStore for SessionFontStore {
    async fn create(&self, owner: Uuid, draft: FontDraft) -> Result<Font> {
        let mut font = Font::new(owner, draft);
        font.begin_processing()?;

        self.fonts
            .lock()
            .expect("font store lock poisoned")
            .push(font.clone());
        Ok(font)
    }

    async fn commit(&self, id: Uuid, files: FontFiles) -> Result<Font> {
        let mut fonts = self.fonts.lock().expect("font store lock poisoned");
        let font = fonts
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::NotFound(format!("No font record for {}", id)))?;

        font.mark_ready(files)?;
        Ok(font.clone())
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> Result<Font> {
        let mut fonts = self.fonts.lock().expect("font store lock poisoned");
        let font = fonts
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| Error::NotFound(format!("No font record for {}", id)))?;

        font.mark_failed(reason)?;
        Ok(font.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Font>> {
        Ok(self
            .fonts
            .lock()
            .expect("font store lock poisoned")
            .iter()
            .find(|f| f.id == id)
            .cloned())
    }

    async fn list(&self, owner: Uuid) -> Result<Vec<Font>> {
        // Records are appended in creation order; reverse iteration gives
        // newest first.
        Ok(self
            .fonts
            .lock()
            .expect("font store lock poisoned")
            .iter()
            .rev()
            .filter(|f| f.owner == owner)
            .cloned()
            .collect())
    }
}
