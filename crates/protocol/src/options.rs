use serde::{Deserialize, Serialize};

/// Default baud rate for the robot link when the caller does not override it
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Connection parameters for opening the serial link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectOptions {
    pub baud_rate: u32,
}

impl ConnectOptions {
    pub fn new(baud_rate: u32) -> Self {
        Self { baud_rate }
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_baud_rate() {
        assert_eq!(ConnectOptions::default().baud_rate, 9600);
    }

    #[test]
    fn test_override() {
        assert_eq!(ConnectOptions::new(115200).baud_rate, 115200);
    }
}
