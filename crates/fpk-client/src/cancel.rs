//! Explicit cancellation for in-flight patch submissions.
//!
//! The submitting caller holds the [`CancelHandle`] (tied to its own
//! lifecycle, e.g. the edit screen); the client races the request future
//! against the [`CancelToken`]. Dropping the handle does **not** cancel —
//! cancellation is always an explicit call, so an abandoned handle behaves
//! like a submission that was never cancelled.

use tokio::sync::watch;

/// Create a connected handle/token pair for one submission scope.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx: Some(rx) })
}

/// Owner side: cancels every token cloned from this pair.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Another token observing this handle.
    pub fn token(&self) -> CancelToken {
        CancelToken {
            rx: Some(self.tx.subscribe()),
        }
    }
}

/// Observer side, cheap to clone. `rx: None` is the never-cancelled token.
#[derive(Clone, Debug)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

impl CancelToken {
    /// A token that never fires (fire-and-forget submissions, tests).
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.rx {
            Some(rx) => *rx.borrow(),
            None => false,
        }
    }

    /// Resolves once the handle cancels. Pends forever for a never-token or
    /// when the handle was dropped without cancelling.
    pub async fn cancelled(&mut self) {
        match &mut self.rx {
            None => std::future::pending::<()>().await,
            Some(rx) => {
                if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                    // Sender dropped without cancelling: not a cancellation.
                    std::future::pending::<()>().await;
                }
            }
        }
    }
}
