//! Supabase GoTrue API Implementation
//!
//! Calls the GoTrue auth endpoints (`/auth/v1/token`, `/auth/v1/signup`,
//! `/auth/v1/logout`) using reqwest HTTP client and emits session-change
//! events on the shared broadcast.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use uuid::Uuid;

use crate::{AuthError, IdentityProvider, SessionBroadcast, SessionEvent, SessionWatch};

/// GoTrue password-grant request body
#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// GoTrue token response body
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: GoTrueUser,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
}

/// GoTrue error response
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error_description", alias = "msg")]
    message: Option<String>,
}

/// Supabase identity provider implementation
pub struct SupabaseProvider {
    client: Client,
    base_url: String,
    anon_key: String,
    events: SessionBroadcast,
    access_token: Mutex<Option<String>>,
}

impl SupabaseProvider {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
            anon_key,
            events: SessionBroadcast::new(),
            access_token: Mutex::new(None),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn read_error(response: reqwest::Response) -> AuthError {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());

        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return AuthError::InvalidCredentials;
        }

        if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(&body) {
            if let Some(message) = parsed.message {
                return AuthError::Response(format!("GoTrue error ({}): {}", status, message));
            }
        }
        AuthError::Response(format!("GoTrue error ({}): {}", status, body))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for SupabaseProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let url = self.endpoint("token?grant_type=password");

        tracing::debug!(%email, "Signing in via GoTrue password grant");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await
            .map_err(|e| AuthError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Response(format!("Malformed token response: {}", e)))?;

        *self
            .access_token
            .lock()
            .expect("access token lock poisoned") = Some(token.access_token);

        self.events.emit(SessionEvent::Present {
            owner: token.user.id,
            email: token.user.email.unwrap_or_else(|| email.to_string()),
        });

        Ok(())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let url = self.endpoint("signup");

        tracing::debug!(%email, "Signing up via GoTrue");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await
            .map_err(|e| AuthError::Request(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        // With email confirmation enabled the session only begins after the
        // user verifies, so no event is emitted here; the durable store's
        // provisioning trigger creates the account row.
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let token = self
            .access_token
            .lock()
            .expect("access token lock poisoned")
            .take();

        if let Some(token) = token {
            let url = self.endpoint("logout");
            let response = self
                .client
                .post(&url)
                .header("apikey", &self.anon_key)
                .bearer_auth(&token)
                .send()
                .await
                .map_err(|e| AuthError::Request(format!("HTTP request failed: {}", e)))?;

            // An already-expired token still ends the local session.
            if !response.status().is_success() {
                tracing::warn!(status = %response.status(), "GoTrue logout returned non-success");
            }
        }

        self.events.emit(SessionEvent::Absent);
        Ok(())
    }

    fn subscribe(&self) -> SessionWatch {
        self.events.subscribe()
    }
}
