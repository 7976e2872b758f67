//! Remote endpoint configuration.
//!
//! [`ApiEndpoints`] names the OAuth token endpoint, the card catalog
//! endpoint, and the locale requested from the catalog. Defaults point at
//! the public Blizzard Hearthstone API.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PickError, Result};

/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://oauth.battle.net/token";

/// Default card catalog endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://us.api.blizzard.com/hearthstone/cards/";

/// Default catalog locale.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Endpoints and locale used to talk to the catalog provider.
///
/// # Example
///
/// ```
/// use cardpicker_core::endpoint::ApiEndpoints;
///
/// let endpoints = ApiEndpoints::default()
///     .with_catalog_url("https://eu.api.blizzard.com/hearthstone/cards/")
///     .with_locale("de_DE");
///
/// assert!(endpoints.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiEndpoints {
    /// OAuth token endpoint URL.
    pub token_url: String,

    /// Catalog search endpoint URL.
    pub catalog_url: String,

    /// Locale passed on every catalog request.
    pub locale: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

impl ApiEndpoints {
    /// Set the token URL.
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Set the catalog URL.
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = url.into();
        self
    }

    /// Set the catalog locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Check that both URLs parse and the locale is non-empty.
    ///
    /// The catalog URL must not carry a query or fragment of its own, since
    /// page requests append theirs.
    pub fn validate(&self) -> Result<()> {
        for (label, raw) in [("token", &self.token_url), ("catalog", &self.catalog_url)] {
            Url::parse(raw)
                .map_err(|e| PickError::config(format!("invalid {label} URL {raw:?}: {e}")))?;
        }
        let catalog = Url::parse(&self.catalog_url)
            .map_err(|e| PickError::config(format!("invalid catalog URL: {e}")))?;
        if catalog.query().is_some() || catalog.fragment().is_some() {
            return Err(PickError::config(format!(
                "catalog URL {:?} must not contain a query or fragment",
                self.catalog_url
            )));
        }
        if self.locale.is_empty() {
            return Err(PickError::config("locale must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let endpoints = ApiEndpoints::default();
        assert_eq!(endpoints.locale, "en_US");
        assert!(endpoints.validate().is_ok());
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let endpoints = ApiEndpoints::default().with_token_url("not a url");
        assert!(matches!(endpoints.validate(), Err(PickError::Config { .. })));
    }

    #[test]
    fn test_catalog_url_with_query_is_config_error() {
        for url in [
            "https://catalog.test/cards/?region=us",
            "https://catalog.test/cards/?",
            "https://catalog.test/cards/#top",
        ] {
            let endpoints = ApiEndpoints::default().with_catalog_url(url);
            assert!(
                matches!(endpoints.validate(), Err(PickError::Config { .. })),
                "{url} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_locale_is_config_error() {
        let endpoints = ApiEndpoints::default().with_locale("");
        assert!(matches!(endpoints.validate(), Err(PickError::Config { .. })));
    }

    #[test]
    fn test_partial_deserialize_fills_defaults() {
        let endpoints: ApiEndpoints =
            serde_json::from_value(serde_json::json!({ "locale": "fr_FR" })).unwrap();
        assert_eq!(endpoints.locale, "fr_FR");
        assert_eq!(endpoints.token_url, DEFAULT_TOKEN_URL);
    }
}
