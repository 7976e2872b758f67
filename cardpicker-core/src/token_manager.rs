//! Default implementation of the TokenManager trait.
//!
//! This module provides [`DefaultTokenManager`], which caches one bearer
//! token in memory and performs the OAuth2 client-credentials exchange when
//! the token is missing or expired.
//!
//! # Features
//!
//! - Reuses the cached token until it expires (no network call)
//! - Serializes check-then-refresh so concurrent callers share one exchange
//! - Bounds every exchange with a request timeout
//! - Configurable expiry buffer to refresh tokens before they expire
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! use cardpicker_core::{Credentials, DefaultTokenManager, TokenManager};
//!
//! let manager = DefaultTokenManager::new("https://oauth.battle.net/token")?;
//! let creds = Credentials::new("client-id", "client-secret");
//!
//! let token = manager.ensure_token(&creds).await?;
//! println!("token valid until {}", token.expires_at);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::{
    error::{NetworkError, PickError, Result},
    secret::Credentials,
    token::{CachedToken, TokenManager},
};

/// Default timeout for a single token exchange.
pub const DEFAULT_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

const OPERATION: &str = "token exchange";

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

/// Default implementation of TokenManager.
///
/// This implementation:
/// - Holds the cached token behind an async mutex
/// - Exchanges client credentials with HTTP Basic authentication
/// - Never retries; callers decide whether to repeat the whole operation
pub struct DefaultTokenManager {
    token_url: String,
    http_client: reqwest::Client,
    expiry_buffer: Duration,
    state: Mutex<Option<CachedToken>>,
}

impl DefaultTokenManager {
    /// Create a new token manager for the given token endpoint.
    ///
    /// Uses the default request timeout and no expiry buffer.
    pub fn new(token_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(token_url, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Create a token manager whose exchanges give up after `timeout`.
    pub fn with_timeout(token_url: impl Into<String>, timeout: std::time::Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PickError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            token_url: token_url.into(),
            http_client,
            expiry_buffer: Duration::zero(),
            state: Mutex::new(None),
        })
    }

    /// Treat tokens as expired this long before their real expiry.
    pub fn with_expiry_buffer(mut self, buffer: Duration) -> Self {
        self.expiry_buffer = buffer;
        self
    }

    /// Seed the cache with a previously obtained token.
    pub fn with_token(mut self, token: CachedToken) -> Self {
        self.state = Mutex::new(Some(token));
        self
    }

    /// Check if a token can still be handed out.
    fn is_fresh(&self, token: &CachedToken) -> bool {
        token.is_usable() && !token.expires_within(self.expiry_buffer)
    }

    /// Exchange client credentials for a new token.
    async fn exchange(&self, credentials: &Credentials) -> Result<CachedToken> {
        let response = self
            .http_client
            .post(&self.token_url)
            .basic_auth(&credentials.client_id, Some(credentials.client_secret.expose()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(NetworkError::Server {
                operation: OPERATION.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(PickError::protocol(format!(
                "token endpoint returned status {}",
                status
            )));
        }

        let body = response.bytes().await.map_err(transport_error)?;
        let parsed: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| PickError::protocol(format!("malformed token response: {}", e)))?;

        if parsed.access_token.is_empty() {
            return Err(PickError::protocol("token response carried an empty access_token"));
        }
        if parsed.expires_in <= 0 {
            return Err(PickError::protocol(format!(
                "token response carried non-positive expires_in {}",
                parsed.expires_in
            )));
        }

        let expires_at = Duration::try_seconds(parsed.expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                PickError::protocol(format!(
                    "token response expires_in {} is out of range",
                    parsed.expires_in
                ))
            })?;

        Ok(CachedToken::new(parsed.access_token, expires_at))
    }
}

impl std::fmt::Debug for DefaultTokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultTokenManager")
            .field("token_url", &self.token_url)
            .field("expiry_buffer", &self.expiry_buffer)
            .finish_non_exhaustive()
    }
}

fn transport_error(err: reqwest::Error) -> PickError {
    if err.is_timeout() {
        NetworkError::Timeout {
            operation: OPERATION.to_string(),
        }
        .into()
    } else {
        NetworkError::Transport {
            operation: OPERATION.to_string(),
            message: err.to_string(),
        }
        .into()
    }
}

#[async_trait]
impl TokenManager for DefaultTokenManager {
    async fn ensure_token(&self, credentials: &Credentials) -> Result<CachedToken> {
        // Held across the exchange so concurrent callers wait for one refresh.
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref() {
            if self.is_fresh(token) {
                tracing::debug!("Using cached access token (expires {})", token.expires_at);
                return Ok(token.clone());
            }
            tracing::info!("Cached access token expired at {}, refreshing", token.expires_at);
        }

        if !credentials.is_complete() {
            return Err(PickError::config("missing credentials"));
        }

        match self.exchange(credentials).await {
            Ok(token) => {
                tracing::info!(
                    "Obtained access token for client {} (expires {})",
                    credentials.redacted_id(),
                    token.expires_at
                );
                *state = Some(token.clone());
                Ok(token)
            }
            Err(e) => {
                tracing::error!(
                    "Token exchange failed for client {}: {}",
                    credentials.redacted_id(),
                    e
                );
                Err(e)
            }
        }
    }

    async fn cached(&self) -> Option<CachedToken> {
        self.state.lock().await.clone()
    }

    async fn clear(&self) {
        let mut state = self.state.lock().await;
        if state.take().is_some() {
            tracing::debug!("Discarded cached access token");
        }
    }
}
