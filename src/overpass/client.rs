//! Resilient HTTP client for the Overpass API.
//!
//! One request at a time, bounded retries with linearly increasing
//! backoff (2s x attempt number). All failure modes collapse into
//! [`FetchError`] so callers can skip a place without special-casing.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

pub struct OverpassClient {
    client: Client,
    url: String,
    max_retries: u32,
}

impl OverpassClient {
    pub fn new(url: &str, user_agent: &str, timeout_s: u64, max_retries: u32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_s))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
            max_retries,
        })
    }

    /// POST an Overpass QL query and return the raw response body.
    ///
    /// Retries on network errors, non-2xx statuses, and body read
    /// failures; each failed attempt backs off for 2s x attempt.
    pub async fn post_query(&self, query: &str) -> Result<String, FetchError> {
        for attempt in 1..=self.max_retries {
            match self.client.post(&self.url).body(query.to_string()).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.text().await {
                        Ok(body) => return Ok(body),
                        Err(e) => {
                            warn!(
                                "Overpass body read failed (attempt {}/{}): {}",
                                attempt, self.max_retries, e
                            );
                        }
                    }
                }
                Ok(response) => {
                    warn!(
                        "Overpass returned status {} (attempt {}/{})",
                        response.status(),
                        attempt,
                        self.max_retries
                    );
                }
                Err(e) => {
                    warn!(
                        "Overpass request failed (attempt {}/{}): {}",
                        attempt, self.max_retries, e
                    );
                }
            }
            tokio::time::sleep(Duration::from_secs(2 * attempt as u64)).await;
        }
        Err(FetchError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }
}
