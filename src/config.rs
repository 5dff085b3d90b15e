// src/config.rs
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::{BotError, Result};
use crate::poller::{RecordSelection, TimestampPolicy};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 600;

/// Settings for reaching the homework review API.
#[derive(Debug, Clone)]
pub struct PracticumConfig {
    pub endpoint: String,
    pub token: String,
}

/// Settings for delivering messages through the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub api_base: String,
    pub token: String,
    pub chat_id: String,
}

/// Application configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub practicum: PracticumConfig,
    pub telegram: TelegramConfig,
    pub retry_interval: Duration,
    pub timestamp_policy: TimestampPolicy,
    pub record_selection: RecordSelection,
    /// When set, log records go to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    /// Missing credentials load as empty strings; see [`AppConfig::all_credentials_present`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        // Credentials are taken verbatim; only an empty value counts as missing.
        let credential = |key: &str| lookup(key).unwrap_or_default();

        let retry_interval = match var("RETRY_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| {
                    BotError::Config(format!("RETRY_INTERVAL_SECS must be a whole number of seconds, got '{}'", raw))
                })?;
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_RETRY_INTERVAL_SECS),
        };

        let timestamp_policy = match var("TIMESTAMP_POLICY") {
            Some(raw) => raw.parse()?,
            None => TimestampPolicy::default(),
        };

        let record_selection = match var("RECORD_SELECTION") {
            Some(raw) => raw.parse()?,
            None => RecordSelection::default(),
        };

        Ok(AppConfig {
            practicum: PracticumConfig {
                endpoint: var("PRACTICUM_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                token: credential("PRACTICUM_TOKEN"),
            },
            telegram: TelegramConfig {
                api_base: var("TELEGRAM_API_BASE")
                    .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.to_string()),
                token: credential("TELEGRAM_TOKEN"),
                chat_id: credential("TELEGRAM_CHAT_ID"),
            },
            retry_interval,
            timestamp_policy,
            record_selection,
            log_file: var("LOG_FILE").map(PathBuf::from),
        })
    }

    /// True iff the API token, bot token and chat id are all non-empty.
    pub fn all_credentials_present(&self) -> bool {
        self.missing_credentials().is_empty()
    }

    /// Names of the credential variables that are empty or unset.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        [
            ("PRACTICUM_TOKEN", &self.practicum.token),
            ("TELEGRAM_TOKEN", &self.telegram.token),
            ("TELEGRAM_CHAT_ID", &self.telegram.chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// The credential gate: `Err(CredentialMissing)` names every absent credential.
    pub fn require_credentials(&self) -> Result<()> {
        let missing = self.missing_credentials();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(BotError::CredentialMissing(missing))
        }
    }
}
