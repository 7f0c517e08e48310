//! Cooperative cancellation for streams and batch jobs.

use tokio_util::sync::CancellationToken;

/// Cloneable cancel signal. Cancelling any clone cancels them all.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once `cancel` has been called on any clone.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clones_share_state() {
        let handle = CancelHandle::new();
        let other = handle.clone();
        assert!(!other.is_cancelled());
        handle.cancel();
        assert!(other.is_cancelled());
        other.cancelled().await;
    }
}
