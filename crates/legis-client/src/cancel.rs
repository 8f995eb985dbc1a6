use std::sync::Arc;

use tokio::sync::watch;

/// Caller-owned cancellation token for one streaming session.
///
/// Write-once: the first `cancel()` flips it, later calls are no-ops. Clones
/// share the same flag, so the caller can keep one and hand another to the
/// session builder.
#[derive(Clone, Debug)]
pub struct CancelHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    /// Creates an untriggered handle.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Requests cancellation.
    ///
    /// Returns `true` only for the call that actually triggered the handle.
    /// Cancelling after the session reached a terminal state has no effect on
    /// that session.
    pub fn cancel(&self) -> bool {
        self.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }

    /// Returns whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once cancellation has been requested (immediately if it
    /// already was).
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}
