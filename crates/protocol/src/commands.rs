use serde::{Deserialize, Serialize};
use std::fmt;

/// Command alphabet understood by the robot firmware.
///
/// Each command is a single ASCII character sent as-is over the open link:
/// no framing, no acknowledgement, no checksum. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotCommand {
    /// Drive forward (`w`)
    Forward,
    /// Turn left (`a`)
    Left,
    /// Drive backward (`s`)
    Backward,
    /// Turn right (`d`)
    Right,
    /// Halt the motors (`p`)
    Stop,
    /// Start suction (`i`)
    SuctionOn,
    /// Stop suction (`o`)
    SuctionOff,
}

impl RobotCommand {
    pub const ALL: [RobotCommand; 7] = [
        RobotCommand::Forward,
        RobotCommand::Left,
        RobotCommand::Backward,
        RobotCommand::Right,
        RobotCommand::Stop,
        RobotCommand::SuctionOn,
        RobotCommand::SuctionOff,
    ];

    /// The wire character the firmware expects
    pub fn wire_char(self) -> char {
        match self {
            Self::Forward => 'w',
            Self::Left => 'a',
            Self::Backward => 's',
            Self::Right => 'd',
            Self::Stop => 'p',
            Self::SuctionOn => 'i',
            Self::SuctionOff => 'o',
        }
    }

    /// Wire character as a one-byte payload string
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "w",
            Self::Left => "a",
            Self::Backward => "s",
            Self::Right => "d",
            Self::Stop => "p",
            Self::SuctionOn => "i",
            Self::SuctionOff => "o",
        }
    }

    /// Map a keyboard key to a command (WASD layout, case-insensitive)
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'w' => Some(Self::Forward),
            'a' => Some(Self::Left),
            's' => Some(Self::Backward),
            'd' => Some(Self::Right),
            'p' => Some(Self::Stop),
            'i' => Some(Self::SuctionOn),
            'o' => Some(Self::SuctionOff),
            _ => None,
        }
    }

    /// Short human-readable label for notifications
    pub fn label(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Left => "left",
            Self::Backward => "backward",
            Self::Right => "right",
            Self::Stop => "stop",
            Self::SuctionOn => "suction on",
            Self::SuctionOff => "suction off",
        }
    }

    /// Is this a directional movement command?
    pub fn is_movement(self) -> bool {
        matches!(
            self,
            Self::Forward | Self::Left | Self::Backward | Self::Right
        )
    }
}

impl fmt::Display for RobotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
