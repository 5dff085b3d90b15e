// src/poller.rs
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde_json::Value;

use crate::api::HomeworkApi;
use crate::config::AppConfig;
use crate::errors::{BotError, FetchError, Result};
use crate::notifier::Notifier;
use crate::status::{parse_status, record_name, record_status};
use crate::validator::extract_homeworks;

/// Prefix of the chat message sent when a poll cycle fails.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы: ";

/// When the `from_date` lower bound moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampPolicy {
    /// After every successful cycle.
    #[default]
    EveryCycle,
    /// Only after a successful cycle whose most recent record is `approved`.
    OnApproved,
}

/// Which records of a response are checked for status changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordSelection {
    /// Only the first record, which the API orders as the most recent.
    #[default]
    MostRecent,
    /// Every record, tracked per homework name.
    All,
}

impl FromStr for TimestampPolicy {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "every-cycle" => Ok(TimestampPolicy::EveryCycle),
            "on-approved" => Ok(TimestampPolicy::OnApproved),
            other => Err(BotError::Config(format!(
                "unknown TIMESTAMP_POLICY '{}', expected 'every-cycle' or 'on-approved'",
                other
            ))),
        }
    }
}

impl fmt::Display for TimestampPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampPolicy::EveryCycle => write!(f, "every-cycle"),
            TimestampPolicy::OnApproved => write!(f, "on-approved"),
        }
    }
}

impl FromStr for RecordSelection {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "most-recent" => Ok(RecordSelection::MostRecent),
            "all" => Ok(RecordSelection::All),
            other => Err(BotError::Config(format!(
                "unknown RECORD_SELECTION '{}', expected 'most-recent' or 'all'",
                other
            ))),
        }
    }
}

impl fmt::Display for RecordSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordSelection::MostRecent => write!(f, "most-recent"),
            RecordSelection::All => write!(f, "all"),
        }
    }
}

/// Loop settings taken from [`AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerOptions {
    pub retry_interval: Duration,
    pub timestamp_policy: TimestampPolicy,
    pub record_selection: RecordSelection,
}

impl Default for PollerOptions {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_secs(crate::config::DEFAULT_RETRY_INTERVAL_SECS),
            timestamp_policy: TimestampPolicy::default(),
            record_selection: RecordSelection::default(),
        }
    }
}

impl From<&AppConfig> for PollerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            retry_interval: config.retry_interval,
            timestamp_policy: config.timestamp_policy,
            record_selection: config.record_selection,
        }
    }
}

/// In-memory state carried from one cycle to the next. Lost on restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopState {
    /// Status of the most recent record last reported to the chat.
    pub last_status: Option<String>,
    /// Per-homework statuses, used by [`RecordSelection::All`] only.
    pub last_statuses: HashMap<String, String>,
    /// Lower bound (`from_date`) for the next fetch.
    pub timestamp: i64,
    /// Rendered text of the last error reported to the chat.
    pub last_error: Option<String>,
}

impl LoopState {
    pub fn new(timestamp: i64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }
}

/// What a single cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleOutcome {
    pub notifications: usize,
    pub timestamp_advanced: bool,
    /// Rendered error text when the cycle failed.
    pub error: Option<String>,
}

/// The poll-check-notify loop.
pub struct Poller<A, N> {
    api: A,
    notifier: N,
    options: PollerOptions,
    state: LoopState,
}

impl<A: HomeworkApi, N: Notifier> Poller<A, N> {
    /// Creates a poller whose first fetch asks for changes since `started_at`.
    pub fn new(api: A, notifier: N, options: PollerOptions, started_at: i64) -> Self {
        Self {
            api,
            notifier,
            options,
            state: LoopState::new(started_at),
        }
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs forever: one cycle, then the retry interval, regardless of the cycle's result.
    pub async fn run(&mut self) {
        log::info!(
            "Polling every {}s (timestamp policy: {}, records: {})",
            self.options.retry_interval.as_secs(),
            self.options.timestamp_policy,
            self.options.record_selection
        );
        loop {
            let now = chrono::Utc::now().timestamp();
            self.run_cycle(now).await;
            tokio::time::sleep(self.options.retry_interval).await;
        }
    }

    /// One cycle with errors handled: logged, and reported to the chat unless
    /// the same text was the last one reported.
    pub async fn run_cycle(&mut self, now: i64) -> CycleOutcome {
        match self.poll_once(now).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let text = err.to_string();
                self.report_error(&err).await;
                CycleOutcome {
                    error: Some(text),
                    ..CycleOutcome::default()
                }
            }
        }
    }

    /// Fetch, validate, translate and notify. `now` becomes the next lower
    /// bound when the timestamp policy allows it.
    pub async fn poll_once(&mut self, now: i64) -> Result<CycleOutcome> {
        let response = self.api.fetch(self.state.timestamp).await?;
        let homeworks = extract_homeworks(&response)?;

        let notifications = match self.options.record_selection {
            RecordSelection::MostRecent => self.check_most_recent(homeworks.first()).await?,
            RecordSelection::All => self.check_all(homeworks).await?,
        };

        let timestamp_advanced = match self.options.timestamp_policy {
            TimestampPolicy::EveryCycle => true,
            TimestampPolicy::OnApproved => homeworks
                .first()
                .and_then(|record| record_status(record).ok())
                .is_some_and(|status| status == "approved"),
        };
        if timestamp_advanced {
            log::debug!("Next fetch starts from {}", now);
            self.state.timestamp = now;
        }

        Ok(CycleOutcome {
            notifications,
            timestamp_advanced,
            error: None,
        })
    }

    async fn check_most_recent(&mut self, record: Option<&Value>) -> Result<usize> {
        let Some(record) = record else {
            log::debug!("No homework updates since {}", self.state.timestamp);
            return Ok(0);
        };

        let status = record_status(record)?;
        if self.state.last_status.as_deref() == Some(status.as_ref()) {
            log::debug!("Homework status unchanged: {}", status);
            return Ok(0);
        }

        let message = parse_status(record)?;
        self.notifier.notify(&message).await?;
        log::info!("Notification sent: {}", message);
        self.state.last_status = Some(status.to_string());
        Ok(1)
    }

    // Oldest first, so the chat reads in chronological order.
    async fn check_all(&mut self, homeworks: &[Value]) -> Result<usize> {
        let mut sent = 0;
        for record in homeworks.iter().rev() {
            let name = record_name(record)?;
            let status = record_status(record)?;
            let previous = self.state.last_statuses.get(name.as_ref());
            if previous.map(String::as_str) == Some(status.as_ref()) {
                log::debug!("Homework \"{}\" status unchanged: {}", name, status);
                continue;
            }

            let message = parse_status(record)?;
            self.notifier.notify(&message).await?;
            log::info!("Notification sent: {}", message);
            self.state
                .last_statuses
                .insert(name.to_string(), status.to_string());
            sent += 1;
        }
        if homeworks.is_empty() {
            log::debug!("No homework updates since {}", self.state.timestamp);
        }
        Ok(sent)
    }

    async fn report_error(&mut self, err: &BotError) {
        let text = err.to_string();
        log::error!("{}", text);
        if let BotError::Fetch(FetchError::UnexpectedStatus {
            status,
            headers,
            url,
            ..
        }) = err
        {
            log::error!("Request to {} returned {}, headers: {:?}", url, status, headers);
        }

        if self.state.last_error.as_deref() == Some(text.as_str()) {
            log::debug!("Error already reported, not notifying again");
            return;
        }

        let message = format!("{}{}", FAILURE_PREFIX, text);
        match self.notifier.notify(&message).await {
            Ok(()) => log::info!("Error notification sent"),
            Err(e) => log::error!("Could not deliver error notification: {}", e),
        }
        self.state.last_error = Some(text);
    }
}
