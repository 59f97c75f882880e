//! Monitor configuration

use std::time::Duration;

use crate::channel::MulticastGroup;

/// Default timeout dalam detik
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How the monitor listens and what it prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Maximum wait, checked between receives
    pub timeout: Duration,
    pub group: MulticastGroup,
    /// Stop cleanly after this many events
    pub max_events: Option<u64>,
    /// Also print the raw datagram
    pub raw: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            group: MulticastGroup::Kernel,
            max_events: None,
            raw: false,
        }
    }
}

impl MonitorConfig {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self {
            timeout: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.group, MulticastGroup::Kernel);
        assert_eq!(config.max_events, None);
        assert!(!config.raw);

        assert_eq!(MonitorConfig::with_timeout_secs(5).timeout.as_secs(), 5);
    }
}
