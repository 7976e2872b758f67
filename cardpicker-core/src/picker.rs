//! End-to-end card picking: token, fetch, sample.
//!
//! [`CardPicker`] wires a [`TokenManager`], a [`CatalogFetcher`] and the
//! sampler together. Build one with [`CardPicker::builder()`].
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example() -> cardpicker_core::Result<()> {
//! use cardpicker_core::{CardPicker, Credentials, Criteria};
//! use cardpicker_core::model::{CardClass, Rarity};
//!
//! let picker = CardPicker::builder().sample_size(10).build()?;
//! let creds = Credentials::new("client-id", "client-secret");
//! let criteria = Criteria::new()
//!     .with("sort", "id:asc")
//!     .with("manaCost", 7)
//!     .with("rarity", Rarity::Legendary.id())
//!     .with_list("class", [CardClass::Warlock.id(), CardClass::Druid.id()]);
//!
//! for card in picker.pick(&creds, &criteria).await? {
//!     println!("{} {}", card.id, card.name);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::{
    cancel::CancelSignal,
    catalog::{CatalogFetcher, DEFAULT_PAGE_LIMIT},
    criteria::Criteria,
    endpoint::ApiEndpoints,
    error::{PickError, Result},
    model::CardRecord,
    sampler::{DEFAULT_SAMPLE_SIZE, sample_with_rng},
    secret::Credentials,
    token::TokenManager,
    token_manager::{DEFAULT_REQUEST_TIMEOUT, DefaultTokenManager},
};

/// Builder for configuring and constructing a [`CardPicker`].
pub struct CardPickerBuilder {
    endpoints: ApiEndpoints,
    page_limit: u32,
    sample_size: usize,
    timeout: Duration,
    expiry_buffer: chrono::Duration,
    seed: Option<u64>,
    token_manager: Option<Arc<dyn TokenManager>>,
}

impl Default for CardPickerBuilder {
    fn default() -> Self {
        Self {
            endpoints: ApiEndpoints::default(),
            page_limit: DEFAULT_PAGE_LIMIT,
            sample_size: DEFAULT_SAMPLE_SIZE,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            expiry_buffer: chrono::Duration::zero(),
            seed: None,
            token_manager: None,
        }
    }
}

impl CardPickerBuilder {
    /// Set the token and catalog endpoints.
    pub fn endpoints(mut self, endpoints: ApiEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Maximum number of catalog pages fetched per pick. Defaults to 2.
    pub fn page_limit(mut self, page_limit: u32) -> Self {
        self.page_limit = page_limit;
        self
    }

    /// Number of cards returned per pick. Defaults to 10.
    pub fn sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    /// Timeout applied to every HTTP request. Defaults to 30 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Refresh tokens this long before they expire.
    pub fn expiry_buffer(mut self, buffer: chrono::Duration) -> Self {
        self.expiry_buffer = buffer;
        self
    }

    /// Seed the sampler for reproducible picks.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use an existing token manager instead of building one.
    ///
    /// The endpoint's token URL, timeout and expiry buffer are then ignored
    /// for token purposes.
    pub fn token_manager(mut self, manager: Arc<dyn TokenManager>) -> Self {
        self.token_manager = Some(manager);
        self
    }

    /// Validate the configuration and build the picker.
    pub fn build(self) -> Result<CardPicker> {
        self.endpoints.validate()?;

        let tokens = match self.token_manager {
            Some(manager) => manager,
            None => Arc::new(
                DefaultTokenManager::with_timeout(self.endpoints.token_url.clone(), self.timeout)?
                    .with_expiry_buffer(self.expiry_buffer),
            ),
        };
        let fetcher = CatalogFetcher::with_options(&self.endpoints, self.page_limit, self.timeout)?;
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(CardPicker {
            tokens,
            fetcher,
            sample_size: self.sample_size,
            rng: Mutex::new(rng),
        })
    }
}

/// Fetches a filtered catalog and returns a random, id-ordered sample.
pub struct CardPicker {
    tokens: Arc<dyn TokenManager>,
    fetcher: CatalogFetcher,
    sample_size: usize,
    rng: Mutex<StdRng>,
}

impl CardPicker {
    /// Create a new builder.
    pub fn builder() -> CardPickerBuilder {
        CardPickerBuilder::default()
    }

    /// The token manager used by this picker.
    pub fn token_manager(&self) -> &Arc<dyn TokenManager> {
        &self.tokens
    }

    /// The configured sample size.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Pick a sample of cards matching `criteria`.
    pub async fn pick(&self, credentials: &Credentials, criteria: &Criteria) -> Result<Vec<CardRecord>> {
        self.pick_with_cancel(credentials, criteria, &CancelSignal::never())
            .await
    }

    /// Like [`pick`](Self::pick), stopping early when `signal` fires.
    pub async fn pick_with_cancel(
        &self,
        credentials: &Credentials,
        criteria: &Criteria,
        signal: &CancelSignal,
    ) -> Result<Vec<CardRecord>> {
        let token = tokio::select! {
            biased;
            interrupt = signal.interrupted() => {
                return Err(interrupt.into_error(0, "token exchange").into());
            }
            result = self.tokens.ensure_token(credentials) => result?,
        };

        let cards = match self.fetcher.fetch_with_cancel(&token, criteria, signal).await {
            Ok(cards) => cards,
            Err(e) => {
                // These usually mean the catalog did not accept the token.
                if matches!(e, PickError::Protocol { .. } | PickError::EmptyResult { .. }) {
                    self.tokens.clear().await;
                }
                return Err(e);
            }
        };

        let fetched = cards.len();
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let picked = sample_with_rng(cards, self.sample_size, &mut *rng);
        tracing::info!("Picked {} of {} fetched card(s)", picked.len(), fetched);
        Ok(picked)
    }
}
