//! Configuration for the process-wide mode.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::mode::{self, Mode};

/// Environment variable holding the initial mode.
pub const MODE_ENV: &str = "FRAME_CONTRACT_MODE";

pub const DEFAULT_MODE: Mode = Mode::Silent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
}

fn default_mode() -> Mode {
    DEFAULT_MODE
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self { mode: DEFAULT_MODE }
    }
}

impl ContractConfig {
    /// Read [`MODE_ENV`]. Unset or invalid values fall back to
    /// [`DEFAULT_MODE`].
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(MODE_ENV).ok().as_deref())
    }

    pub fn from_env_value(value: Option<&str>) -> Self {
        let raw = match value.map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                info!(
                    "No environment variable {} set. Default to {}.",
                    MODE_ENV, DEFAULT_MODE
                );
                return Self::default();
            }
        };
        match raw.parse::<Mode>() {
            Ok(mode) => Self { mode },
            Err(_) => {
                warn!(
                    value = raw,
                    "Environment variable {} contains invalid value. Setting to default mode: {}",
                    MODE_ENV,
                    DEFAULT_MODE
                );
                Self::default()
            }
        }
    }

    /// Install this configuration as the process-wide mode.
    pub fn apply(&self) -> Mode {
        mode::set_global_mode(self.mode);
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use frame_contract_logging::capture_subscriber;

    #[test]
    fn test_from_env_value() {
        assert_eq!(ContractConfig::from_env_value(Some("raise")).mode, Mode::Raise);
        assert_eq!(ContractConfig::from_env_value(Some(" Warn ")).mode, Mode::Warn);
        assert_eq!(ContractConfig::from_env_value(None).mode, Mode::Silent);
        assert_eq!(ContractConfig::from_env_value(Some("")).mode, Mode::Silent);
    }

    #[test]
    fn test_unset_and_invalid_are_logged() {
        let (subscriber, capture) = capture_subscriber("frame_contract=info");
        tracing::subscriber::with_default(subscriber, || {
            assert_eq!(ContractConfig::from_env_value(None).mode, Mode::Silent);
            assert_eq!(ContractConfig::from_env_value(Some("shout")).mode, Mode::Silent);
        });
        let lines = capture.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("INFO") && lines[0].contains("No environment variable FRAME_CONTRACT_MODE set"));
        assert!(lines[1].contains("WARN") && lines[1].contains("invalid value"));
    }

    #[test]
    fn test_serde_default() {
        let config: ContractConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ContractConfig::default());
        let config: ContractConfig = serde_json::from_str(r#"{"mode": "raise"}"#).unwrap();
        assert_eq!(config.mode, Mode::Raise);
    }
}
