//! Cancellation utilities for interruptible link operations
//!
//! A [`CancelToken`] is a cheap, clonable flag the caller keeps; the client
//! races suspendable operations (device prompt, open) against it so a user
//! can abandon a connect that is taking too long.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::supervision::sleep;

/// Poll interval for cancellation checks (50ms)
pub const CANCEL_POLL_MS: u64 = 50;

/// Caller-held cancellation flag for suspendable operations.
///
/// Cloning shares the flag; cancelling any clone cancels them all. A token
/// never resets - create a fresh one per operation.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the flag. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// A future that completes once the flag is tripped.
    ///
    /// Polls every [`CANCEL_POLL_MS`] - responsive enough for user-driven
    /// cancellation without a dedicated wakeup channel.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                break;
            }
            sleep(std::time::Duration::from_millis(CANCEL_POLL_MS)).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancelled_completes_when_flag_set() {
        let token = CancelToken::new();
        let waiter = token.clone();

        let handle = tokio::spawn(async move { waiter.cancelled().await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_clones_share_the_flag() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }
}
