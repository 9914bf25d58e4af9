//! Fonts domain: billable font artifacts and their lifecycle
//!
//! A font record exists only as part of an export attempt and moves forward
//! through `draft → processing → ready | failed`, never backward. Stores are
//! owner-scoped and selected by identity variant.

pub mod catalog;
pub mod domain;
pub mod repository;
pub mod store;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Font, FontDraft, FontFiles, FontStatus};
pub use domain::state::{FontEvent, FontState, FontStateMachine, StateError};

pub use catalog::FontCatalog;
pub use repository::PgFontStore;
pub use store::{FontStore, SessionFontStore};
