use std::sync::{Arc, Mutex as StdMutex, MutexGuard};

use futures_channel::mpsc;
use tokio::sync::Mutex;

use vaclink_protocol::{ConnectOptions, LinkError, LinkStatus, RobotCommand};

use crate::cancellation::CancelToken;
use crate::env::{SerialDevice, SerialEnvironment, WriteChannel};
use crate::subscribers::{StatusCallback, SubscriberSet, Subscription};
use crate::supervision::{deadline, guarded, LinkTimeouts};
use crate::{link_debug, link_info, link_warn};

/// Client for the robot's serial link.
///
/// Owns the one-at-a-time connection to the robot and mediates every write
/// to it. Construct one per panel and pass it to whoever renders the
/// controls; there is deliberately no shared global instance, so tests can
/// run independent clients side by side.
///
/// ## Lifecycle
///
/// ```text
/// request_device  ->  connect  ->  send*  ->  disconnect
///                      |   ^
///                      v   | retry from Error / Lost
///                    Error-+
/// ```
///
/// All lifecycle operations and sends serialize through one internal mutex:
/// overlapping calls queue rather than clobbering the device and channel
/// handles. Status changes reach the outside world only through subscribers
/// registered with [`on_status_change`](Self::on_status_change).
///
/// ## Failure semantics
///
/// `request_device`, `connect` and `send` surface failures to the caller;
/// `connect` additionally records the failure and drives the status to
/// [`LinkStatus::Error`] before propagating. `disconnect` swallows
/// everything - teardown always completes and always ends in
/// [`LinkStatus::Disconnected`].
pub struct SerialLinkClient<E: SerialEnvironment> {
    inner: Mutex<Inner<E>>,
    state: StdMutex<StatusState>,
    subscribers: Arc<SubscriberSet>,
    timeouts: LinkTimeouts,
    supported: bool,
}

struct Inner<E: SerialEnvironment> {
    env: E,
    device: Option<E::Device>,
    channel: Option<<E::Device as SerialDevice>::Channel>,
}

struct StatusState {
    status: LinkStatus,
    last_error: Option<LinkError>,
}

impl<E: SerialEnvironment> SerialLinkClient<E> {
    pub fn new(env: E) -> Self {
        Self::with_timeouts(env, LinkTimeouts::default())
    }

    pub fn with_timeouts(env: E, timeouts: LinkTimeouts) -> Self {
        // Capability cannot change for the lifetime of the environment, so
        // it is sampled once here.
        let supported = env.serial_supported();

        Self {
            inner: Mutex::new(Inner {
                env,
                device: None,
                channel: None,
            }),
            state: StdMutex::new(StatusState {
                status: LinkStatus::Disconnected,
                last_error: None,
            }),
            subscribers: SubscriberSet::new(),
            timeouts,
            supported,
        }
    }

    /// Does the host environment expose serial access at all?
    ///
    /// Pure query; never mutates state and has no error condition.
    pub fn supported(&self) -> bool {
        self.supported
    }

    pub fn status(&self) -> LinkStatus {
        self.state_lock().status
    }

    /// The last failure recorded by a connect or send attempt, if any
    pub fn last_error(&self) -> Option<LinkError> {
        self.state_lock().last_error.clone()
    }

    /// Register a status subscriber; returns its unsubscribe capability.
    ///
    /// Every status change invokes all registered subscribers synchronously,
    /// in registration order, with the new status value.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn on_status_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(LinkStatus) + Send + Sync + 'static,
    {
        let callback: Arc<StatusCallback> = Arc::new(callback);
        SubscriberSet::insert(&self.subscribers, callback)
    }

    /// Register a status subscriber; returns its unsubscribe capability.
    #[cfg(target_arch = "wasm32")]
    pub fn on_status_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(LinkStatus) + 'static,
    {
        let callback: Arc<StatusCallback> = Arc::new(callback);
        SubscriberSet::insert(&self.subscribers, callback)
    }

    /// Adapt a subscriber to a channel, for event-loop consumers that would
    /// rather poll a stream than take callbacks.
    pub fn status_stream(&self) -> (Subscription, mpsc::UnboundedReceiver<LinkStatus>) {
        let (tx, rx) = mpsc::unbounded();
        let subscription = self.on_status_change(move |status| {
            // Receiver gone just means nobody is watching anymore
            let _ = tx.unbounded_send(status);
        });
        (subscription, rx)
    }

    /// Acquire a user-authorized device handle for a later `connect`.
    ///
    /// Does not open the link and performs no status transition. The
    /// environment's prompt may be declined, which surfaces as a
    /// [`LinkError::Device`] failure.
    pub async fn request_device(&self) -> Result<(), LinkError> {
        self.request_device_with(&CancelToken::new()).await
    }

    /// Cancellable variant of [`request_device`](Self::request_device).
    pub async fn request_device_with(&self, cancel: &CancelToken) -> Result<(), LinkError> {
        if !self.supported {
            return Err(LinkError::UnsupportedEnvironment);
        }

        let mut inner = self.inner.lock().await;
        let device = guarded(
            "request_device",
            self.timeouts.request_device_secs,
            cancel,
            inner.env.request_device(),
        )
        .await?;

        inner.device = Some(device);
        link_debug!("device handle acquired");
        Ok(())
    }

    /// Open the link at the configured baud rate.
    ///
    /// Transitions to `Connecting` before the open attempt resolves, then to
    /// `Connected` on success or `Error` on failure. Nothing is retried
    /// automatically; a retry is a fresh `connect` call.
    pub async fn connect(&self, options: ConnectOptions) -> Result<(), LinkError> {
        self.connect_with(options, &CancelToken::new()).await
    }

    /// Cancellable variant of [`connect`](Self::connect).
    pub async fn connect_with(
        &self,
        options: ConnectOptions,
        cancel: &CancelToken,
    ) -> Result<(), LinkError> {
        if !self.supported {
            return Err(LinkError::UnsupportedEnvironment);
        }

        let mut inner = self.inner.lock().await;
        if inner.device.is_none() {
            return Err(LinkError::NoDeviceSelected);
        }

        // Observable to subscribers before the open attempt completes.
        // Also rejects connect while already Connecting or Connected.
        self.transition(LinkStatus::Connecting)?;

        let device = match inner.device.as_mut() {
            Some(device) => device,
            None => return Err(LinkError::NoDeviceSelected),
        };

        match guarded(
            "connect",
            self.timeouts.connect_secs,
            cancel,
            device.open(&options),
        )
        .await
        {
            Ok(channel) => {
                inner.channel = Some(channel);
                self.transition(LinkStatus::Connected)?;
                link_info!("link open at {} baud", options.baud_rate);
                Ok(())
            }
            Err(err) => {
                // Open failure, missing write channel, timeout and
                // cancellation all resolve the attempt the same way
                self.record_error(&err);
                let _ = self.transition(LinkStatus::Error);
                Err(err)
            }
        }
    }

    /// Write the UTF-8 encoding of `payload` to the open link.
    ///
    /// One call is exactly one write of the full payload: no queuing, no
    /// buffering across calls, no automatic reconnect. A write that fails on
    /// an open link drops the channel and moves the status to
    /// [`LinkStatus::Lost`]; recovery is a fresh `connect`.
    pub async fn send(&self, payload: &str) -> Result<(), LinkError> {
        let mut inner = self.inner.lock().await;

        if self.status() != LinkStatus::Connected {
            return Err(LinkError::NotConnected);
        }
        let channel = match inner.channel.as_mut() {
            Some(channel) => channel,
            None => return Err(LinkError::NotConnected),
        };

        let write = channel.write(payload.as_bytes());
        match deadline("send", self.timeouts.write_secs, write)
            .await
            .and_then(|result| result)
        {
            Ok(()) => Ok(()),
            Err(err) => {
                // The device went away underneath a connected client. Drop
                // the channel so the handle invariant holds for Lost.
                inner.channel = None;
                self.record_error(&err);
                let _ = self.transition(LinkStatus::Lost);
                Err(err)
            }
        }
    }

    /// Typed convenience over the command alphabet.
    pub async fn send_command(&self, command: RobotCommand) -> Result<(), LinkError> {
        self.send(command.as_str()).await
    }

    /// Best-effort teardown.
    ///
    /// Attempts to close the write channel and then the device link,
    /// swallowing any failure from either step. Always ends with both
    /// handles cleared and the status forced to `Disconnected` - this is the
    /// one operation guaranteed never to leave the status anywhere else.
    pub async fn disconnect(&self) {
        let mut inner = self.inner.lock().await;

        if let Some(mut channel) = inner.channel.take() {
            // The channel is released for reuse even if closing it fails
            let close = channel.close();
            if let Err(err) = deadline("close_channel", self.timeouts.disconnect_secs, close)
                .await
                .and_then(|result| result)
            {
                link_warn!("ignoring write-channel close failure: {}", err);
            }
        }

        if let Some(mut device) = inner.device.take() {
            let close = device.close();
            if let Err(err) = deadline("close_device", self.timeouts.disconnect_secs, close)
                .await
                .and_then(|result| result)
            {
                link_warn!("ignoring device close failure: {}", err);
            }
        }

        // Any state -> Disconnected is a valid transition; subscribers are
        // only notified when the value actually changes.
        let _ = self.transition(LinkStatus::Disconnected);
        link_info!("link closed");
    }

    fn state_lock(&self) -> MutexGuard<'_, StatusState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record_error(&self, err: &LinkError) {
        self.state_lock().last_error = Some(err.clone());
    }

    /// Validated status transition plus subscriber notification.
    ///
    /// Rejects moves the transition table forbids. Subscribers fire only
    /// when the status value actually changes.
    fn transition(&self, new_status: LinkStatus) -> Result<(), LinkError> {
        let changed = {
            let mut state = self.state_lock();
            if !state.status.can_transition_to(new_status) {
                return Err(LinkError::InvalidTransition(format!(
                    "{:?} -> {:?}",
                    state.status, new_status
                )));
            }
            let changed = state.status != new_status;
            state.status = new_status;
            changed
        };

        if changed {
            link_debug!("status -> {:?}", new_status);
            self.subscribers.notify(new_status);
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::MockEnvironment;

    #[tokio::test]
    async fn test_initial_state() {
        let client = SerialLinkClient::new(MockEnvironment::new());
        assert_eq!(client.status(), LinkStatus::Disconnected);
        assert!(client.last_error().is_none());
        assert!(client.supported());
    }

    #[tokio::test]
    async fn test_capability_sampled_at_construction() {
        let client = SerialLinkClient::new(MockEnvironment::unsupported());
        assert!(!client.supported());
    }

    #[tokio::test]
    async fn test_status_stream_sees_transitions() {
        use futures::stream::StreamExt;

        let client = SerialLinkClient::new(MockEnvironment::new());
        let (subscription, mut stream) = client.status_stream();

        client.request_device().await.unwrap();
        client.connect(ConnectOptions::default()).await.unwrap();

        assert_eq!(stream.next().await, Some(LinkStatus::Connecting));
        assert_eq!(stream.next().await, Some(LinkStatus::Connected));

        // Cancelling drops the adapter callback, so the stream ends and the
        // later Disconnected transition is never delivered to it
        subscription.cancel();
        client.disconnect().await;
        assert_eq!(stream.next().await, None);
        assert_eq!(client.status(), LinkStatus::Disconnected);
    }
}
