//! Configuration for the to-do binary.
//!
//! Read from the environment, with defaults for everything:
//!
//! | Variable                    | Default | Meaning                            |
//! |-----------------------------|---------|------------------------------------|
//! | `TODO_FETCH_DELAY_MS`       | `500`   | Simulated latency of remote fetches |
//! | `TODO_SHUTDOWN_TIMEOUT_MS`  | `5000`  | Graceful shutdown timeout           |
//! | `RUST_LOG`                  | `info,todo=debug` | Tracing filter directives |

use std::time::Duration;
use thiserror::Error;

/// Fetch delay variable
pub const FETCH_DELAY_VAR: &str = "TODO_FETCH_DELAY_MS";

/// Shutdown timeout variable
pub const SHUTDOWN_TIMEOUT_VAR: &str = "TODO_SHUTDOWN_TIMEOUT_MS";

/// Tracing filter variable
pub const LOG_FILTER_VAR: &str = "RUST_LOG";

const DEFAULT_LOG_FILTER: &str = "info,todo=debug";

/// Configuration error
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but is not a valid number of milliseconds
    #[error("{var} must be a number of milliseconds, got `{value}`")]
    InvalidMillis {
        /// Variable name
        var: &'static str,
        /// Offending value
        value: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Runtime configuration of the to-do binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    /// Simulated latency of remote fetches
    pub fetch_delay: Duration,
    /// How long shutdown waits for in-flight fetches
    pub shutdown_timeout: Duration,
    /// Tracing filter directives
    pub log_filter: String,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            fetch_delay: Duration::from_millis(500),
            shutdown_timeout: Duration::from_secs(5),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TodoConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns error if a value cannot be parsed or fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            fetch_delay: parse_millis(&lookup, FETCH_DELAY_VAR)?.unwrap_or(defaults.fetch_delay),
            shutdown_timeout: parse_millis(&lookup, SHUTDOWN_TIMEOUT_VAR)?
                .unwrap_or(defaults.shutdown_timeout),
            log_filter: lookup(LOG_FILTER_VAR)
                .filter(|filter| !filter.trim().is_empty())
                .unwrap_or(defaults.log_filter),
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if the shutdown timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shutdown_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "shutdown timeout must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_millis<F>(lookup: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| match value.trim().parse::<u64>() {
            Ok(millis) => Ok(Duration::from_millis(millis)),
            Err(_) => Err(ConfigError::InvalidMillis { var, value }),
        })
        .transpose()
}
