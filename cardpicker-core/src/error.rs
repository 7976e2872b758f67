//! Top-level error types for Cardpicker.

use thiserror::Error;

/// Transport-level failures.
///
/// Everything here except [`NetworkError::Cancelled`] is worth retrying
/// with backoff.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// The request could not be sent or the response could not be read.
    #[error("transport failure during {operation}: {message}")]
    Transport { operation: String, message: String },

    /// The request did not complete before its deadline.
    #[error("{operation} timed out")]
    Timeout { operation: String },

    /// The remote end answered with a server-side (5xx) status.
    #[error("{operation} failed with server status {status}")]
    Server { operation: String, status: u16 },

    /// The caller cancelled the fetch between pages.
    #[error("fetch cancelled after {completed_pages} page(s)")]
    Cancelled { completed_pages: u32 },
}

/// Top-level error type encompassing all Cardpicker errors.
#[derive(Debug, Error)]
pub enum PickError {
    /// Missing or invalid configuration, such as empty credentials.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Transport-level failure talking to the token or catalog endpoint.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The response body was malformed or unexpected.
    #[error("protocol error: {message}")]
    Protocol { message: String },

    /// The catalog returned no cards at all.
    #[error("catalog returned no cards across {pages} page(s)")]
    EmptyResult { pages: u32 },
}

impl PickError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Whether repeating the whole operation later could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(
                NetworkError::Transport { .. }
                    | NetworkError::Timeout { .. }
                    | NetworkError::Server { .. }
            )
        )
    }
}

/// Result alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, PickError>;
