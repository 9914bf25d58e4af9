//! Gemini Image Model Implementation
//!
//! Calls the Gemini generateContent API using reqwest HTTP client. The
//! specimen comes back as inline image data and is handed to the caller as a
//! data URL.

use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::{EngineConfig, EngineError, SpecimenEngine, SpecimenPreview, SpecimenRequest};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const MODEL: &str = "gemini-2.5-flash-image";

/// Gemini generateContent request body
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Gemini generateContent response body
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<ResponseInlineData>,
}

#[derive(Debug, Deserialize)]
struct ResponseInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    status: String,
    message: String,
}

/// Gemini specimen engine implementation
pub struct GeminiEngine {
    client: Client,
    config: EngineConfig,
    base_url: String,
}

impl GeminiEngine {
    /// Create a new Gemini engine
    pub fn new(config: EngineConfig) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self {
            client: Client::new(),
            config,
            base_url,
        }
    }

    /// Compose the generation instruction from the brief and render options.
    fn compose_prompt(request: &SpecimenRequest) -> String {
        let options = &request.options;
        format!(
            "Render a typography specimen sheet showing the text \"{}\" in a typeface \
             matching this brief: {}. Weight {}, {} style, {} text on a {} background. \
             Flat specimen image only, no mockups.",
            options.preview_text,
            request.prompt,
            options.weight,
            options.style,
            options.foreground,
            options.background,
        )
    }
}

#[async_trait::async_trait]
impl SpecimenEngine for GeminiEngine {
    async fn generate(&self, request: SpecimenRequest) -> Result<SpecimenPreview, EngineError> {
        let mut parts = vec![Part {
            text: Some(Self::compose_prompt(&request)),
            inline_data: None,
        }];

        if let Some(image) = &request.reference_image {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: "image/png".to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(image),
                }),
            });
        }

        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, MODEL
        );

        tracing::debug!(model = MODEL, "Sending Gemini generateContent request");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.gemini_api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Request(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EngineError::RateLimit);
        }

        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_body) {
                return Err(EngineError::Response(format!(
                    "Gemini API error ({}): {}",
                    error_response.error.status, error_response.error.message
                )));
            }
            return Err(EngineError::Response(format!(
                "Gemini API error ({}): {}",
                status, error_body
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| EngineError::Response(format!("Malformed response: {}", e)))?;

        let image = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .find_map(|p| p.inline_data)
            .ok_or_else(|| {
                EngineError::Response("Response contained no image data".to_string())
            })?;

        Ok(SpecimenPreview {
            image_url: format!("data:{};base64,{}", image.mime_type, image.data),
        })
    }
}
