//! # Cardpicker Core
//!
//! Core library for picking random Hearthstone cards from the Blizzard
//! game-data catalog.
//!
//! This crate provides:
//! - Client-credentials token management with expiry-aware caching
//! - Encoding of filter criteria into catalog query parameters
//! - Paginated catalog retrieval with a page-limit cutoff
//! - Uniform random sampling with id-ordered output
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cardpicker_core::{CardPicker, Credentials, Criteria};
//!
//! async fn pick() -> Result<(), cardpicker_core::PickError> {
//!     let picker = CardPicker::builder().build()?;
//!     let creds = Credentials::new("client-id", "client-secret");
//!     let cards = picker.pick(&creds, &Criteria::new().with("manaCost", 7)).await?;
//!     println!("picked {} cards", cards.len());
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod catalog;
pub mod criteria;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod picker;
pub mod sampler;
pub mod secret;
pub mod token;
pub mod token_manager;

// Re-export commonly used types at crate root
pub use cancel::{CancelHandle, CancelSignal, Interrupt};

pub use catalog::CatalogFetcher;

pub use criteria::{Criteria, CriteriaValue};

pub use endpoint::ApiEndpoints;

pub use error::{NetworkError, PickError, Result};

pub use model::{CardClass, CardRecord, CardSet, CardType, CatalogPage, Rarity};

pub use picker::{CardPicker, CardPickerBuilder};

pub use sampler::{sample, sample_with_rng};

pub use secret::{Credentials, Secret};

pub use token::{CachedToken, TokenManager};

pub use token_manager::DefaultTokenManager;
