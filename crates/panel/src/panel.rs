use vaclink_client::{link_warn, CancelToken, SerialEnvironment, SerialLinkClient};
use vaclink_protocol::{ConnectOptions, LinkError, LinkStatus, RobotCommand};

use crate::config::PanelConfig;

/// Fixed advisory rendered in place of the Connect control when the host
/// exposes no serial access
pub const UNSUPPORTED_ADVISORY: &str = "Serial access is not supported in this browser";

/// User-notification sink (toast analog).
///
/// Implementations render however they like; the panel only decides *what*
/// to say and *when*.
pub trait Notifier {
    fn notify(&self, title: &str, body: &str);
}

/// Shared control-panel state and behavior.
///
/// Owns the injected [`SerialLinkClient`] and mediates every user action:
/// movement and suction commands are dispatched only while the link is
/// connected; commands issued while disconnected are logged and dropped,
/// never raised at the user (keyboard shortcuts and repeat timers must not
/// spam error toasts for an expected, recoverable condition).
pub struct ControlPanel<E: SerialEnvironment, N: Notifier> {
    client: SerialLinkClient<E>,
    notifier: N,
    config: PanelConfig,
    speed: u8,
    suction_active: bool,
    wall_warning: bool,
    active_direction: Option<RobotCommand>,
}

impl<E: SerialEnvironment, N: Notifier> ControlPanel<E, N> {
    pub fn new(client: SerialLinkClient<E>, notifier: N, config: PanelConfig) -> Self {
        Self {
            client,
            notifier,
            config,
            speed: 50,
            suction_active: false,
            wall_warning: false,
            active_direction: None,
        }
    }

    pub fn client(&self) -> &SerialLinkClient<E> {
        &self.client
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    /// Camera feed URL, passed through untouched for the feed image
    pub fn video_feed_url(&self) -> &str {
        &self.config.video_feed_url
    }

    /// Textual connection indicator: the fixed advisory when serial is
    /// unavailable, the link status otherwise
    pub fn status_line(&self) -> &'static str {
        if !self.client.supported() {
            UNSUPPORTED_ADVISORY
        } else {
            self.client.status().status_text()
        }
    }

    /// "Connect" action: authorize a device, then open the link.
    pub async fn connect(&mut self) -> Result<(), LinkError> {
        self.connect_with(&CancelToken::new()).await
    }

    /// Cancellable variant of [`connect`](Self::connect).
    pub async fn connect_with(&mut self, cancel: &CancelToken) -> Result<(), LinkError> {
        let options = ConnectOptions::new(self.config.baud_rate);
        let result = async {
            self.client.request_device_with(cancel).await?;
            self.client.connect_with(options, cancel).await
        }
        .await;

        match &result {
            Ok(()) => self
                .notifier
                .notify("Serial connected", "Ready to send commands"),
            Err(err) => self.notifier.notify("Serial error", &err.to_string()),
        }
        result
    }

    /// "Disconnect" action: teardown always completes.
    pub async fn disconnect(&mut self) {
        self.client.disconnect().await;
        self.notifier.notify("Serial disconnected", "");
    }

    /// Dispatch a command from a button press or keyboard shortcut.
    ///
    /// Panel state and the user notification update regardless of link
    /// state; the wire write happens only while connected.
    pub async fn dispatch(&mut self, command: RobotCommand) {
        match command {
            RobotCommand::Stop => {
                self.active_direction = None;
                self.notifier.notify("Stop", "Motors halted");
            }
            RobotCommand::SuctionOn => {
                self.suction_active = true;
                self.notifier.notify("Suction started", "");
            }
            RobotCommand::SuctionOff => {
                self.suction_active = false;
                self.notifier.notify("Suction stopped", "");
            }
            direction => {
                self.active_direction = Some(direction);
                self.notifier.notify(
                    &format!("Moving {}", direction.label()),
                    &format!("Speed: {}%", self.speed),
                );
            }
        }

        if self.client.status() == LinkStatus::Connected {
            if let Err(err) = self.client.send_command(command).await {
                link_warn!("command '{}' failed: {}", command.wire_char(), err);
            }
        } else {
            link_warn!(
                "serial not connected; command '{}' not sent",
                command.wire_char()
            );
        }
    }

    /// WASD keyboard shortcut mirror of the buttons; unknown keys ignored
    pub async fn handle_key(&mut self, key: char) {
        if let Some(command) = RobotCommand::from_key(key) {
            self.dispatch(command).await;
        }
    }

    /// Flip suction and dispatch the matching command
    pub async fn toggle_suction(&mut self) {
        let command = if self.suction_active {
            RobotCommand::SuctionOff
        } else {
            RobotCommand::SuctionOn
        };
        self.dispatch(command).await;
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Slider position in percent, clamped to 0-100
    pub fn set_speed(&mut self, speed: u8) {
        self.speed = speed.min(100);
    }

    pub fn suction_active(&self) -> bool {
        self.suction_active
    }

    pub fn active_direction(&self) -> Option<RobotCommand> {
        self.active_direction
    }

    /// Wall-proximity flag, fed by the external detection service
    pub fn set_wall_warning(&mut self, active: bool) {
        self.wall_warning = active;
    }

    pub fn wall_warning(&self) -> bool {
        self.wall_warning
    }

    /// Warning banner text when the wall flag is raised
    pub fn warning_text(&self) -> Option<&'static str> {
        self.wall_warning.then_some("Wall detected nearby")
    }

    /// Debug control: flip the wall flag without the detection service
    pub fn simulate_wall_detection(&mut self) {
        self.wall_warning = !self.wall_warning;
    }
}
