//! Identity domain: who owns a balance and its fonts
//!
//! Resolves the single authoritative identity per session from two racing
//! signals (local demo marker, durable session stream) with an explicit
//! precedence rule, and provides the demo-session marker store and the
//! durable user directory.

pub mod directory;
pub mod domain;
pub mod repository;
pub mod resolver;
pub mod session;

// Re-export domain types at the crate root for convenience
pub use domain::entities::{Identity, UserRecord};

pub use directory::{MemoryDirectory, UserDirectory};
pub use repository::PgUserDirectory;
pub use resolver::IdentityResolver;
pub use session::{DemoSession, DemoSessionStore, LocalStore, MemoryStore, DEMO_SESSION_KEY};
