//! Identity-routed access to the font stores
//!
//! The catalog picks the backing store from the identity variant itself:
//! ephemeral identities read and write only the session store, durable
//! identities only the durable store. Demo sessions never touch durable
//! data.

use std::sync::Arc;
use uuid::Uuid;

use typecraft_common::Result;
use typecraft_identity::Identity;

use crate::domain::entities::{Font, FontDraft, FontFiles};
use crate::store::FontStore;

#[derive(Clone)]
pub struct FontCatalog {
    durable: Arc<dyn FontStore>,
    session: Arc<dyn FontStore>,
}

impl FontCatalog {
    pub fn new(durable: Arc<dyn FontStore>, session: Arc<dyn FontStore>) -> Self {
        Self { durable, session }
    }

    fn store_for(&self, identity: &Identity) -> &Arc<dyn FontStore> {
        match identity {
            Identity::Ephemeral { .. } => &self.session,
            Identity::Durable { .. } => &self.durable,
        }
    }

    pub async fn create(&self, identity: &Identity, draft: FontDraft) -> Result<Font> {
        self.store_for(identity).create(identity.id(), draft).await
    }

    pub async fn commit(&self, identity: &Identity, id: Uuid, files: FontFiles) -> Result<Font> {
        self.store_for(identity).commit(id, files).await
    }

    pub async fn mark_failed(&self, identity: &Identity, id: Uuid, reason: &str) -> Result<Font> {
        self.store_for(identity).mark_failed(id, reason).await
    }

    pub async fn find(&self, identity: &Identity, id: Uuid) -> Result<Option<Font>> {
        self.store_for(identity).find(id).await
    }

    /// The identity's own fonts, newest first.
    pub async fn list(&self, identity: &Identity) -> Result<Vec<Font>> {
        self.store_for(identity).list(identity.id()).await
    }
}
