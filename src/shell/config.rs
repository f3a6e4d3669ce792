// Client configuration read from the environment.
//
// Invariants
// - Every setting has a default; only malformed values are errors.
// - Reading goes through a lookup function so the process environment is never mutated in tests.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const API_BASE_VAR: &str = "TASKMASTER_API_BASE";
pub const REFRESH_SECS_VAR: &str = "TASKMASTER_REFRESH_SECS";
pub const STATE_FILE_VAR: &str = "TASKMASTER_STATE_FILE";

const DEFAULT_API_BASE: &str = "http://127.0.0.1:5000/api";
const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_STATE_FILE: &str = ".taskmaster/session.json";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a whole number of seconds greater than zero, got {value:?}")]
    InvalidRefreshPeriod { name: &'static str, value: String },

    #[error("{name} must not be empty")]
    Empty { name: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub refresh_period: Duration,
    pub state_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            refresh_period: Duration::from_secs(DEFAULT_REFRESH_SECS),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_base = match lookup(API_BASE_VAR) {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::Empty { name: API_BASE_VAR }),
            Some(value) => value.trim().to_string(),
            None => defaults.api_base,
        };

        let refresh_period = match lookup(REFRESH_SECS_VAR) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidRefreshPeriod {
                        name: REFRESH_SECS_VAR,
                        value,
                    });
                }
            },
            None => defaults.refresh_period,
        };

        let state_file = match lookup(STATE_FILE_VAR) {
            Some(value) if value.trim().is_empty() => return Err(ConfigError::Empty { name: STATE_FILE_VAR }),
            Some(value) => PathBuf::from(value.trim()),
            None => defaults.state_file,
        };

        Ok(Self {
            api_base,
            refresh_period,
            state_file,
        })
    }
}
