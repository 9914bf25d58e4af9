//! Domain entities for the Fonts domain
//!
//! A `Font` is the billable artifact: it starts as a draft record inside an
//! export attempt and only ever moves forward through its lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use typecraft_common::{Error, Result};

use crate::domain::state::{FontEvent, FontState, FontStateMachine, StateError};

/// Font status — persisted as the font_status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "font_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FontStatus {
    #[default]
    Draft,
    Processing,
    Ready,
    Failed,
}

impl FontStatus {
    fn as_state(self) -> FontState {
        match self {
            FontStatus::Draft => FontState::Draft,
            FontStatus::Processing => FontState::Processing,
            FontStatus::Ready => FontState::Ready,
            FontStatus::Failed => FontState::Failed,
        }
    }

    fn from_state(state: FontState) -> Self {
        match state {
            FontState::Draft => FontStatus::Draft,
            FontState::Processing => FontStatus::Processing,
            FontState::Ready => FontStatus::Ready,
            FontState::Failed => FontStatus::Failed,
        }
    }

    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        self.as_state().is_terminal()
    }
}

impl std::fmt::Display for FontStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_state().fmt(f)
    }
}

/// Download references attached when an export commits. Any subset of the
/// formats may be present.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct FontFiles {
    pub ttf_url: Option<String>,
    pub otf_url: Option<String>,
    pub woff2_url: Option<String>,
}

impl FontFiles {
    pub fn woff2(url: impl Into<String>) -> Self {
        Self {
            woff2_url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Metadata supplied when an export attempt creates the record. Empty names
/// and prompts are accepted here; validation is a caller concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontDraft {
    pub family_name: String,
    pub prompt: String,
    pub preview_url: Option<String>,
}

/// Font entity — a generated, potentially billable typeface record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Font {
    pub id: Uuid,
    pub owner: Uuid,
    pub family_name: String,
    pub prompt: String,
    pub status: FontStatus,
    pub preview_url: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub files: FontFiles,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Font {
    /// Create a new draft record for an owner.
    pub fn new(owner: Uuid, draft: FontDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner,
            family_name: draft.family_name,
            prompt: draft.prompt,
            status: FontStatus::default(),
            preview_url: draft.preview_url,
            files: FontFiles::default(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Hand the draft to an export attempt
    pub fn begin_processing(&mut self) -> Result<()> {
        self.status = self.apply_transition(FontEvent::Begin)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark the font ready, attaching its download references
    pub fn mark_ready(&mut self, files: FontFiles) -> Result<()> {
        self.status = self.apply_transition(FontEvent::Complete)?;
        self.files = files;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Mark the font failed with a diagnostic reason
    pub fn mark_failed(&mut self, reason: &str) -> Result<()> {
        self.status = self.apply_transition(FontEvent::Fail)?;
        self.error = Some(reason.to_string());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a state transition using the state machine
    fn apply_transition(&self, event: FontEvent) -> Result<FontStatus> {
        FontStateMachine::transition(self.status.as_state(), event)
            .map(FontStatus::from_state)
            .map_err(|e| match e {
                StateError::InvalidTransition { from, event } => Error::InvalidTransition(
                    format!("cannot apply '{}' event from '{}' state", event, from),
                ),
                StateError::TerminalState(state) => Error::InvalidTransition(format!(
                    "font is in terminal state '{}' and cannot transition",
                    state
                )),
            })
    }

    /// Check if a transition is valid without applying it
    pub fn can_transition(&self, event: &FontEvent) -> bool {
        FontStateMachine::can_transition(self.status.as_state(), event)
    }
}
