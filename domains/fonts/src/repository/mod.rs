//! Repository layer for the Fonts domain

pub mod fonts;

pub use fonts::PgFontStore;
