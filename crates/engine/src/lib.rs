//! TypeCraft Specimen Engine
//!
//! Generates font-specimen previews from a design brief and an optional
//! reference image:
//! - Gemini image-model integration for production
//! - Mock engine for testing and development
//!
//! Generation is free and stateless: it never touches the ledger or the font
//! stores, and overlapping calls need no coordination. Callers discard stale
//! previews themselves.

pub mod gemini;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Engine configuration error: {0}")]
    Configuration(String),

    #[error("Engine request error: {0}")]
    Request(String),

    #[error("Engine response error: {0}")]
    Response(String),

    #[error("Engine rate limit exceeded")]
    RateLimit,
}

/// Typeface style toggle offered by the preview form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SpecimenStyle {
    #[default]
    Normal,
    Italic,
}

impl std::fmt::Display for SpecimenStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecimenStyle::Normal => write!(f, "normal"),
            SpecimenStyle::Italic => write!(f, "italic"),
        }
    }
}

/// Rendering options for the specimen image
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    pub preview_text: String,
    pub background: String,
    pub foreground: String,
    pub style: SpecimenStyle,
    pub weight: u16,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preview_text: "The quick brown fox".to_string(),
            background: "#ffffff".to_string(),
            foreground: "#000000".to_string(),
            style: SpecimenStyle::Normal,
            weight: 400,
        }
    }
}

/// Request to generate a specimen preview
#[derive(Debug, Clone)]
pub struct SpecimenRequest {
    /// Design brief describing the typeface.
    pub prompt: String,
    /// Optional reference image (raw bytes, e.g. a font screenshot).
    pub reference_image: Option<Vec<u8>>,
    pub options: RenderOptions,
}

impl SpecimenRequest {
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            reference_image: None,
            options: RenderOptions::default(),
        }
    }
}

/// A generated preview, referenced by URL (remote or data URL).
///
/// This is the free, ephemeral output; making it durable is the export
/// transaction's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecimenPreview {
    pub image_url: String,
}

/// Engine configuration
#[derive(Clone)]
pub struct EngineConfig {
    pub provider: String,
    pub gemini_api_key: String,
    pub base_url: Option<String>,
}

impl std::fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineConfig")
            .field("provider", &self.provider)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl EngineConfig {
    /// Create engine config from environment variables
    pub fn from_env() -> Result<Self, EngineError> {
        let provider = std::env::var("ENGINE_PROVIDER").unwrap_or_else(|_| "mock".to_string());
        let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();

        if provider == "gemini" && gemini_api_key.is_empty() {
            return Err(EngineError::Configuration(
                "GEMINI_API_KEY is required for the gemini provider".to_string(),
            ));
        }

        Ok(Self {
            provider,
            gemini_api_key,
            base_url: None,
        })
    }
}

/// Specimen engine trait for different generation backends
#[async_trait::async_trait]
pub trait SpecimenEngine: Send + Sync {
    /// Generate a free specimen preview. Pure with respect to the ledger and
    /// font stores.
    async fn generate(&self, request: SpecimenRequest) -> Result<SpecimenPreview, EngineError>;
}

/// Factory for creating SpecimenEngine implementations
pub struct SpecimenEngineFactory;

impl SpecimenEngineFactory {
    pub fn create(config: EngineConfig) -> Result<Box<dyn SpecimenEngine>, EngineError> {
        match config.provider.as_str() {
            "gemini" => {
                tracing::info!("Creating Gemini specimen engine");
                Ok(Box::new(gemini::GeminiEngine::new(config)))
            }
            "mock" => {
                tracing::info!("Creating mock specimen engine");
                Ok(Box::new(mock::MockSpecimenEngine::new()))
            }
            provider => Err(EngineError::Configuration(format!(
                "Unknown engine provider: {}. Supported providers: gemini, mock",
                provider
            ))),
        }
    }
}
