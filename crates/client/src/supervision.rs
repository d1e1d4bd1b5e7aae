//! Timeout supervision for suspendable link operations
//!
//! Every operation that can suspend against the environment (device prompt,
//! open, write, close) runs under a deadline from [`LinkTimeouts`], so a hung
//! environment call never strands the awaiting caller.

use std::future::Future;
use std::time::Duration;

use futures::future::{select, Either};
use vaclink_protocol::LinkError;

use crate::cancellation::CancelToken;

/// Timeout configuration for supervised operations
#[derive(Debug, Clone)]
pub struct LinkTimeouts {
    /// Timeout for the device-authorization prompt
    pub request_device_secs: u64,
    /// Timeout for opening the link and acquiring the write channel
    pub connect_secs: u64,
    /// Timeout for a single write
    pub write_secs: u64,
    /// Timeout for each close step during teardown
    pub disconnect_secs: u64,
}

impl Default for LinkTimeouts {
    fn default() -> Self {
        Self {
            request_device_secs: 60, // 60s: the prompt waits on a human
            connect_secs: 10,        // 10s for port opening
            write_secs: 5,           // 5s for a one-byte command write
            disconnect_secs: 5,      // 5s per close step
        }
    }
}

/// Platform sleep: tokio on native, gloo-timers on WASM
pub(crate) async fn sleep(duration: Duration) {
    #[cfg(not(target_arch = "wasm32"))]
    tokio::time::sleep(duration).await;

    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::sleep(duration).await;
}

/// Bound a future by `secs`, failing with [`LinkError::Timeout`] naming the
/// operation.
pub async fn deadline<T, F>(operation: &str, secs: u64, fut: F) -> Result<T, LinkError>
where
    F: Future<Output = T>,
{
    let timer = sleep(Duration::from_secs(secs));

    match select(Box::pin(fut), Box::pin(timer)).await {
        Either::Left((out, _)) => Ok(out),
        Either::Right(_) => Err(LinkError::Timeout(operation.to_string())),
    }
}

/// Run a fallible operation under both a deadline and a cancellation token.
///
/// Cancellation wins over completion when both race; a token that is already
/// tripped short-circuits without touching the environment.
pub async fn guarded<T, F>(
    operation: &str,
    secs: u64,
    cancel: &CancelToken,
    fut: F,
) -> Result<T, LinkError>
where
    F: Future<Output = Result<T, LinkError>>,
{
    if cancel.is_cancelled() {
        return Err(LinkError::Cancelled);
    }

    let bounded = deadline(operation, secs, fut);

    match select(Box::pin(bounded), Box::pin(cancel.cancelled())).await {
        Either::Left((out, _)) => out.and_then(|r| r),
        Either::Right(_) => Err(LinkError::Cancelled),
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use futures::future;

    #[test]
    fn test_default_config() {
        let timeouts = LinkTimeouts::default();
        assert_eq!(timeouts.request_device_secs, 60);
        assert_eq!(timeouts.connect_secs, 10);
        assert_eq!(timeouts.write_secs, 5);
        assert_eq!(timeouts.disconnect_secs, 5);
    }

    #[tokio::test]
    async fn test_deadline_passes_fast_operations() {
        let out = deadline("fast", 5, async { 7u32 }).await;
        assert_eq!(out, Ok(7));
    }

    #[tokio::test]
    async fn test_deadline_fires_on_hung_operation() {
        let out: Result<u32, LinkError> = deadline("hung", 1, future::pending()).await;
        match out {
            Err(LinkError::Timeout(op)) => assert_eq!(op, "hung"),
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_guarded_flattens_operation_errors() {
        let token = CancelToken::new();
        let out: Result<u32, LinkError> = guarded("failing", 5, &token, async {
            Err(LinkError::Device("open failed".into()))
        })
        .await;
        assert_eq!(out, Err(LinkError::Device("open failed".into())));
    }

    #[tokio::test]
    async fn test_guarded_short_circuits_on_pre_cancelled_token() {
        let token = CancelToken::new();
        token.cancel();

        // The operation must never run
        let out: Result<u32, LinkError> = guarded("never", 5, &token, async {
            panic!("operation ran despite cancelled token")
        })
        .await;
        assert_eq!(out, Err(LinkError::Cancelled));
    }

    #[tokio::test]
    async fn test_guarded_cancels_hung_operation() {
        let token = CancelToken::new();
        let canceller = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            canceller.cancel();
        });

        let out: Result<u32, LinkError> = guarded("hung", 30, &token, future::pending()).await;
        assert_eq!(out, Err(LinkError::Cancelled));
    }
}
