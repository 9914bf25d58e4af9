//! Repository layer for the Identity domain

pub mod users;

pub use users::PgUserDirectory;
