//! Cancellation and deadlines for in-flight picks.

use tokio::sync::watch;
use tokio::time::{Duration, Instant};

use crate::error::NetworkError;

/// Why an in-flight operation stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// The owning [`CancelHandle`] asked to stop.
    Cancelled,
    /// The signal's deadline passed.
    DeadlineExceeded,
}

impl Interrupt {
    /// Convert into the error reported to the caller.
    pub fn into_error(self, completed_pages: u32, operation: &str) -> NetworkError {
        match self {
            Self::Cancelled => NetworkError::Cancelled { completed_pages },
            Self::DeadlineExceeded => NetworkError::Timeout {
                operation: operation.to_string(),
            },
        }
    }
}

/// Sending half of a cancellation pair.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Ask every linked [`CancelSignal`] to stop.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Cloneable signal observed by fetches between and during page requests.
///
/// The default signal never fires.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    receiver: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

impl CancelSignal {
    /// Create a linked handle and signal.
    pub fn pair() -> (CancelHandle, CancelSignal) {
        let (sender, receiver) = watch::channel(false);
        (
            CancelHandle { sender },
            CancelSignal {
                receiver: Some(receiver),
                deadline: None,
            },
        )
    }

    /// A signal that never fires.
    pub fn never() -> Self {
        Self::default()
    }

    /// Also fire once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Also fire once `timeout` has elapsed from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// The interrupt that has already happened, if any.
    pub fn check(&self) -> Option<Interrupt> {
        if self.receiver.as_ref().is_some_and(|rx| *rx.borrow()) {
            return Some(Interrupt::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(Interrupt::DeadlineExceeded);
        }
        None
    }

    /// Resolve when the signal fires. Pending forever for [`never`](Self::never).
    pub async fn interrupted(&self) -> Interrupt {
        let cancelled = async {
            match &self.receiver {
                Some(rx) => {
                    let mut rx = rx.clone();
                    let fired = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
                    // A dropped handle can never cancel.
                    if fired.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancelled => Interrupt::Cancelled,
            _ = expired => Interrupt::DeadlineExceeded,
        }
    }
}
