//! Paginated card catalog retrieval.
//!
//! [`CatalogFetcher`] walks the catalog's pages one by one, appending each
//! page's cards to a running aggregate. It stops when it reaches the page
//! count reported by the first page or its own page limit, whichever comes
//! first. Aggregation is all-or-nothing: any failure discards the pages
//! already fetched.

use std::time::Duration;

use crate::{
    cancel::CancelSignal,
    criteria::{Criteria, encode_component},
    endpoint::ApiEndpoints,
    error::{NetworkError, PickError, Result},
    model::{CardRecord, CatalogPage},
    token::CachedToken,
};

/// Default maximum number of pages fetched per call.
pub const DEFAULT_PAGE_LIMIT: u32 = 2;

/// Default timeout for a single page request.
pub const DEFAULT_PAGE_TIMEOUT: Duration = Duration::from_secs(30);

const FETCH_OPERATION: &str = "catalog fetch";

/// Fetches and aggregates catalog pages.
#[derive(Debug, Clone)]
pub struct CatalogFetcher {
    http_client: reqwest::Client,
    catalog_url: String,
    locale: String,
    page_limit: u32,
}

impl CatalogFetcher {
    /// Create a fetcher with the default page limit and timeout.
    pub fn new(endpoints: &ApiEndpoints) -> Result<Self> {
        Self::with_options(endpoints, DEFAULT_PAGE_LIMIT, DEFAULT_PAGE_TIMEOUT)
    }

    /// Create a fetcher with an explicit page limit and per-request timeout.
    ///
    /// The endpoints must validate and the page limit must be at least 1.
    pub fn with_options(endpoints: &ApiEndpoints, page_limit: u32, timeout: Duration) -> Result<Self> {
        endpoints.validate()?;
        if page_limit == 0 {
            return Err(PickError::config("page limit must be at least 1"));
        }

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PickError::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            catalog_url: endpoints.catalog_url.clone(),
            locale: endpoints.locale.clone(),
            page_limit,
        })
    }

    /// The configured page limit.
    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    /// Build the request URL for one page.
    ///
    /// The result embeds the bearer token; never log it.
    pub fn page_url(&self, token: &CachedToken, page: u32, criteria: &Criteria) -> String {
        format!(
            "{}?locale={}&access_token={}&page={}{}",
            self.catalog_url,
            encode_component(&self.locale),
            encode_component(token.value.expose()),
            page,
            criteria.encode()
        )
    }

    /// Fetch every page up to the limit and concatenate their cards.
    pub async fn fetch(&self, token: &CachedToken, criteria: &Criteria) -> Result<Vec<CardRecord>> {
        self.fetch_with_cancel(token, criteria, &CancelSignal::never())
            .await
    }

    /// Like [`fetch`](Self::fetch), stopping early when `signal` fires.
    ///
    /// The signal is checked before each page and raced against the
    /// in-flight request; a dropped request releases its connection.
    pub async fn fetch_with_cancel(
        &self,
        token: &CachedToken,
        criteria: &Criteria,
        signal: &CancelSignal,
    ) -> Result<Vec<CardRecord>> {
        let mut cards = Vec::new();
        let mut reported_pages: Option<u32> = None;
        let mut page: u32 = 1;

        loop {
            if let Some(interrupt) = signal.check() {
                return Err(interrupt.into_error(page - 1, FETCH_OPERATION).into());
            }

            let url = self.page_url(token, page, criteria);
            let fetched = tokio::select! {
                biased;
                interrupt = signal.interrupted() => {
                    return Err(interrupt.into_error(page - 1, FETCH_OPERATION).into());
                }
                result = self.fetch_page(&url, page) => result?,
            };

            // Only the first page's count is trusted.
            let total = *reported_pages.get_or_insert(fetched.page_count);
            tracing::debug!(
                "Fetched catalog page {}/{} with {} card(s)",
                page,
                total,
                fetched.cards.len()
            );
            cards.extend(fetched.cards);

            if page >= self.page_limit {
                if page < total {
                    tracing::warn!(
                        "Catalog reports {} pages, stopping at page limit {}",
                        total,
                        self.page_limit
                    );
                }
                break;
            }
            if page >= total {
                break;
            }
            page += 1;
        }

        if cards.is_empty() {
            return Err(PickError::EmptyResult { pages: page });
        }

        tracing::debug!("Aggregated {} card(s) from {} page(s)", cards.len(), page);
        Ok(cards)
    }

    /// Issue one page request and decode it.
    async fn fetch_page(&self, url: &str, page: u32) -> Result<CatalogPage> {
        let operation = || format!("catalog page {}", page);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(e, operation()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(NetworkError::Server {
                operation: operation(),
                status: status.as_u16(),
            }
            .into());
        }
        if !status.is_success() {
            return Err(PickError::protocol(format!(
                "{} returned status {}",
                operation(),
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(e, operation()))?;

        serde_json::from_slice(&body)
            .map_err(|e| PickError::protocol(format!("malformed {}: {}", operation(), e)))
    }
}

fn transport_error(err: reqwest::Error, operation: String) -> PickError {
    // Strip the URL: it carries the access token.
    let err = err.without_url();
    if err.is_timeout() {
        NetworkError::Timeout { operation }.into()
    } else {
        NetworkError::Transport {
            operation,
            message: err.to_string(),
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    fn fetcher(page_limit: u32) -> CatalogFetcher {
        let endpoints = ApiEndpoints::default().with_catalog_url("https://catalog.test/cards/");
        CatalogFetcher::with_options(&endpoints, page_limit, DEFAULT_PAGE_TIMEOUT).unwrap()
    }

    #[test]
    fn test_page_url_layout() {
        let token = CachedToken::expiring_in("tok123", ChronoDuration::hours(1));
        let criteria = Criteria::new().with("manaCost", 7).with_list("class", [9, 2]);

        assert_eq!(
            fetcher(2).page_url(&token, 3, &criteria),
            "https://catalog.test/cards/?locale=en_US&access_token=tok123&page=3&class=9,2&manaCost=7"
        );
    }

    #[test]
    fn test_page_url_without_criteria() {
        let token = CachedToken::expiring_in("tok", ChronoDuration::hours(1));
        assert_eq!(
            fetcher(2).page_url(&token, 1, &Criteria::new()),
            "https://catalog.test/cards/?locale=en_US&access_token=tok&page=1"
        );
    }

    #[test]
    fn test_catalog_url_with_query_rejected() {
        let endpoints =
            ApiEndpoints::default().with_catalog_url("https://catalog.test/cards/?region=us");
        let result = CatalogFetcher::new(&endpoints);
        assert!(matches!(result, Err(PickError::Config { .. })));
    }

    #[test]
    fn test_zero_page_limit_rejected() {
        let endpoints = ApiEndpoints::default();
        let result = CatalogFetcher::with_options(&endpoints, 0, DEFAULT_PAGE_TIMEOUT);
        assert!(matches!(result, Err(PickError::Config { .. })));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_page() {
        let (handle, signal) = CancelSignal::pair();
        handle.cancel();

        let token = CachedToken::expiring_in("tok", ChronoDuration::hours(1));
        let result = fetcher(2)
            .fetch_with_cancel(&token, &Criteria::new(), &signal)
            .await;

        assert!(matches!(
            result,
            Err(PickError::Network(NetworkError::Cancelled { completed_pages: 0 }))
        ));
    }
}
