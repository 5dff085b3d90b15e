// src/api/practicum.rs

use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Instant;

use crate::api::HomeworkApi;
use crate::config::PracticumConfig;
use crate::errors::FetchError;

/// Client for the Practicum homework status endpoint.
pub struct PracticumClient {
    client: Client,
    config: PracticumConfig,
}

impl PracticumClient {
    /// Creates a new `PracticumClient`.
    pub fn new(client: Client, config: PracticumConfig) -> Self {
        Self { client, config }
    }
}

impl HomeworkApi for PracticumClient {
    async fn fetch(&self, timestamp: i64) -> Result<Value, FetchError> {
        log::debug!(
            "Requesting {} with from_date={}",
            self.config.endpoint,
            timestamp
        );

        let start = Instant::now();

        let resp = self
            .client
            .get(&self.config.endpoint)
            .header("Authorization", format!("OAuth {}", self.config.token))
            .query(&[("from_date", timestamp)])
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::debug!("Homework API response status: {} ({}ms)", status, latency_ms);

        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                headers: resp.headers().clone(),
                url: resp.url().to_string(),
                endpoint: self.config.endpoint.clone(),
            });
        }

        let body = resp.text().await.map_err(FetchError::Transport)?;
        serde_json::from_str(&body).map_err(FetchError::Decode)
    }
}
