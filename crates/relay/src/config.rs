use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Relay configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// JSON array of webhook subscriptions.
    pub subscriptions_path: PathBuf,
    /// Timeout of a single webhook delivery attempt.
    pub webhook_timeout: Duration,
    /// How long to wait for in-flight deliveries on shutdown.
    pub shutdown_grace: Duration,
    pub log_format: LogFormat,
}

impl RelayConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default              |
    /// |------------------------|----------------------|
    /// | `SUBSCRIPTIONS_PATH`   | `subscriptions.json` |
    /// | `WEBHOOK_TIMEOUT_SECS` | `10`                 |
    /// | `SHUTDOWN_GRACE_SECS`  | `30`                 |
    /// | `LOG_FORMAT`           | `text`               |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let subscriptions_path = lookup("SUBSCRIPTIONS_PATH")
            .unwrap_or_else(|| "subscriptions.json".into())
            .into();

        let webhook_timeout_secs: u64 = parse(&lookup, "WEBHOOK_TIMEOUT_SECS", 10, "u64")?;
        let shutdown_grace_secs: u64 = parse(&lookup, "SHUTDOWN_GRACE_SECS", 30, "u64")?;

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            None | Some("") | Some("text") => LogFormat::Text,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "LOG_FORMAT",
                    expected: "log format (text or json)",
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            subscriptions_path,
            webhook_timeout: Duration::from_secs(webhook_timeout_secs),
            shutdown_grace: Duration::from_secs(shutdown_grace_secs),
            log_format,
        })
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}
