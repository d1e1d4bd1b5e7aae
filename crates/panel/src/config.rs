use vaclink_protocol::DEFAULT_BAUD_RATE;

/// Default camera-feed endpoint served by the Python camera service
pub const DEFAULT_VIDEO_FEED_URL: &str = "http://localhost:5000/video_feed";

/// Panel configuration, sourced from the environment with sensible defaults.
///
/// | Variable                | Default                             |
/// |-------------------------|-------------------------------------|
/// | `VACLINK_VIDEO_FEED_URL`| `http://localhost:5000/video_feed`  |
/// | `VACLINK_SERIAL_PORT`   | (unset - no port configured)        |
/// | `VACLINK_BAUD_RATE`     | `9600`                              |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    /// URL rendered as the continuously updating camera image. The panel
    /// only passes this through; ingestion happens in the camera service.
    pub video_feed_url: String,
    /// Native serial port path, when one is preconfigured
    pub serial_port: Option<String>,
    /// Baud rate for connect calls
    pub baud_rate: u32,
}

impl PanelConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            video_feed_url: lookup("VACLINK_VIDEO_FEED_URL")
                .unwrap_or_else(|| DEFAULT_VIDEO_FEED_URL.to_string()),
            serial_port: lookup("VACLINK_SERIAL_PORT"),
            baud_rate: lookup("VACLINK_BAUD_RATE")
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(DEFAULT_BAUD_RATE),
        }
    }
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            video_feed_url: DEFAULT_VIDEO_FEED_URL.to_string(),
            serial_port: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &HashMap<&str, &str>) -> impl Fn(&str) -> Option<String> + '_ {
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = PanelConfig::default();
        assert_eq!(config.video_feed_url, "http://localhost:5000/video_feed");
        assert_eq!(config.serial_port, None);
        assert_eq!(config.baud_rate, 9600);
    }

    #[test]
    fn test_unset_environment_yields_defaults() {
        let vars = HashMap::new();
        let config = PanelConfig::from_lookup(lookup_in(&vars));
        assert_eq!(config, PanelConfig::default());
    }

    #[test]
    fn test_overrides_win() {
        let vars = HashMap::from([
            ("VACLINK_VIDEO_FEED_URL", "http://robot.local:8080/feed"),
            ("VACLINK_SERIAL_PORT", "/dev/ttyACM0"),
            ("VACLINK_BAUD_RATE", "115200"),
        ]);
        let config = PanelConfig::from_lookup(lookup_in(&vars));
        assert_eq!(config.video_feed_url, "http://robot.local:8080/feed");
        assert_eq!(config.serial_port, Some("/dev/ttyACM0".to_string()));
        assert_eq!(config.baud_rate, 115200);
    }

    #[test]
    fn test_invalid_baud_rate_falls_back_to_default() {
        let vars = HashMap::from([("VACLINK_BAUD_RATE", "not-a-number")]);
        let config = PanelConfig::from_lookup(lookup_in(&vars));
        assert_eq!(config.baud_rate, DEFAULT_BAUD_RATE);
    }
}
