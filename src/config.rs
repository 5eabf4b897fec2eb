//! Configuration types.
//!
//! Built from environment variables. `main` loads a `.env` file first when
//! one is present.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_CHANNEL: &str = "@signalscryptoglobal";
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/signals/telegram";
pub const DEFAULT_LOG_PATH: &str = "signals_log.json";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bot API token. `None` runs the listener on stdin instead of Telegram.
    pub bot_token: Option<SecretString>,
    /// Channel to follow: `@username` or numeric chat id.
    pub channel: String,
    /// Endpoint accepted signals are POSTed to.
    pub api_url: String,
    /// Append-only JSON-lines backup of accepted signals.
    pub log_path: PathBuf,
    /// Per-request timeout for the dispatcher.
    pub http_timeout: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            channel: DEFAULT_CHANNEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl ListenerConfig {
    /// Build config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let bot_token = get("TELEGRAM_BOT_TOKEN").map(SecretString::from);

        let channel = match lookup("SIGNAL_CHANNEL") {
            Some(raw) if raw.trim().is_empty() => {
                return Err(ConfigError::MissingRequired {
                    key: "SIGNAL_CHANNEL".into(),
                    hint: "Set it to the channel @username or numeric id, or unset it for the default".into(),
                });
            }
            Some(raw) => raw.trim().to_string(),
            None => defaults.channel,
        };

        let api_url = get("SIGNAL_API_URL").unwrap_or(defaults.api_url);
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: "SIGNAL_API_URL".into(),
                message: format!("expected an http(s) URL, got {api_url:?}"),
            });
        }

        let log_path = get("SIGNAL_LOG_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_path);

        let http_timeout = match get("SIGNAL_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "SIGNAL_HTTP_TIMEOUT_SECS".into(),
                    message: format!("expected whole seconds, got {raw:?}"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidValue {
                        key: "SIGNAL_HTTP_TIMEOUT_SECS".into(),
                        message: "must be greater than zero".into(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => defaults.http_timeout,
        };

        Ok(Self {
            bot_token,
            channel,
            api_url,
            log_path,
            http_timeout,
        })
    }
}
