//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (Supabase PostgreSQL)
    pub database_url: String,

    /// Supabase configuration
    pub supabase_url: String,
    pub supabase_anon_key: String,

    /// Specimen engine
    pub gemini_api_key: String,
    pub engine_provider: String,

    /// Credit economy
    pub export_cost: i32,
    pub demo_seed_credits: i32,
    pub signup_grant_credits: i32,

    /// Runtime configuration
    pub log_level: String,
    pub rust_log: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            supabase_url: env::var("SUPABASE_URL")
                .map_err(|_| anyhow::anyhow!("SUPABASE_URL is required"))?,
            supabase_anon_key: env::var("SUPABASE_ANON_KEY")
                .map_err(|_| anyhow::anyhow!("SUPABASE_ANON_KEY is required"))?,

            gemini_api_key: env::var("GEMINI_API_KEY")
                .map_err(|_| anyhow::anyhow!("GEMINI_API_KEY is required"))?,
            engine_provider: env::var("ENGINE_PROVIDER").unwrap_or_else(|_| "mock".to_string()),

            export_cost: env::var("EXPORT_COST")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),
            demo_seed_credits: env::var("DEMO_SEED_CREDITS")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .unwrap_or(100),
            signup_grant_credits: env::var("SIGNUP_GRANT_CREDITS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "typecraft=debug".to_string()),
        };

        Ok(config)
    }
}
