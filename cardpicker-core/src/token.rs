//! Bearer tokens and the token lifecycle trait.
//!
//! This module provides:
//! - [`CachedToken`] - A bearer token with its expiry instant
//! - [`TokenManager`] - Trait for obtaining a usable token

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::secret::{Credentials, Secret};

/// A bearer token with the instant it stops being valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedToken {
    /// The bearer value presented to the catalog.
    pub value: Secret,

    /// When the token expires.
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Create a token expiring at the given instant.
    pub fn new(value: impl Into<Secret>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// Create a token that expires `lifetime` from now.
    ///
    /// Saturates at the latest representable instant.
    pub fn expiring_in(value: impl Into<Secret>, lifetime: Duration) -> Self {
        let expires_at = Utc::now()
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(value, expires_at)
    }

    /// Non-empty and strictly before its expiry.
    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    /// Same as [`is_usable`](Self::is_usable) against an explicit clock.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.value.is_empty() && now < self.expires_at
    }

    /// Check if this token will expire within the given duration.
    pub fn expires_within(&self, duration: Duration) -> bool {
        self.expires_at <= Utc::now() + duration
    }
}

/// Trait for managing token lifecycle.
///
/// Implementations keep at most one token and hand it out until it
/// expires, exchanging credentials for a new one only when needed.
///
/// # Example
///
/// ```rust,ignore
/// use cardpicker_core::{Credentials, TokenManager};
///
/// async fn bearer(manager: &impl TokenManager) -> cardpicker_core::Result<String> {
///     let creds = Credentials::new("client-id", "client-secret");
///     let token = manager.ensure_token(&creds).await?;
///     Ok(token.value.expose().to_string())
/// }
/// ```
#[async_trait]
pub trait TokenManager: Send + Sync {
    /// Return a usable token, exchanging credentials only if the cached
    /// one is missing or expired.
    async fn ensure_token(&self, credentials: &Credentials) -> Result<CachedToken>;

    /// The currently held token, if any, without refreshing.
    async fn cached(&self) -> Option<CachedToken>;

    /// Forget the held token so the next call exchanges credentials again.
    async fn clear(&self);
}
