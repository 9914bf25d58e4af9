//! Mock Specimen Engine Implementation
//!
//! Minimal mock used by `SpecimenEngineFactory` when provider is `"mock"`.
//! Returns deterministic placeholder previews for testing.

use crate::{EngineError, SpecimenEngine, SpecimenPreview, SpecimenRequest};

/// Mock specimen engine for testing
#[derive(Debug, Clone)]
pub struct MockSpecimenEngine;

impl MockSpecimenEngine {
    /// Create a new mock specimen engine
    pub fn new() -> Self {
        Self
    }
}

impl Default for MockSpecimenEngine {
    fn default() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl SpecimenEngine for MockSpecimenEngine {
    async fn generate(&self, request: SpecimenRequest) -> Result<SpecimenPreview, EngineError> {
        tracing::info!("Mock specimen engine processing generation request");

        if request.prompt.is_empty() && request.reference_image.is_none() {
            return Err(EngineError::Request(
                "A prompt or reference image is required".to_string(),
            ));
        }

        let text = request.options.preview_text.replace(' ', "+");
        Ok(SpecimenPreview {
            image_url: format!(
                "https://placehold.co/800x400/{}/{}?text={}",
                request.options.background.trim_start_matches('#'),
                request.options.foreground.trim_start_matches('#'),
                text
            ),
        })
    }
}
