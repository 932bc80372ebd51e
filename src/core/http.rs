//! Rate-limited page fetching for basketball-reference

use crate::config::ScraperConfig;
use crate::error::FetchError;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, warn};

#[cfg(test)]
mod tests;

/// Statuses worth another attempt; everything else non-2xx fails at once.
pub const RETRYABLE_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SEASON_INDEX_PATH: &str = "/international/years/";

/// HTTP GET with a fixed delay before every attempt and exponential backoff
/// on retryable failures. One client is shared for the whole run.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    base_url: Url,
    request_delay: Duration,
    max_retries: u32,
    backoff_factor: f64,
}

impl PageFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            request_delay: config.request_delay,
            max_retries: config.max_retries.max(1),
            backoff_factor: config.backoff_factor,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn season_index_url(&self) -> Result<Url, FetchError> {
        self.resolve(SEASON_INDEX_PATH)
    }

    /// Resolve an absolute URL or a site-relative path against the base URL.
    pub fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url
            .join(path)
            .map_err(|e| FetchError::InvalidUrl {
                url: path.to_string(),
                reason: e.to_string(),
            })
    }

    /// Wait after failed attempt `attempt` (1-based) before retrying.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let nanos = self.request_delay.as_nanos() as f64 * self.backoff_factor.powi(exponent);
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Fetch `url` and return the response body.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let target = self.resolve(url)?;
        let mut last_error = None;

        for attempt in 1..=self.max_retries {
            tokio::time::sleep(self.request_delay).await;
            debug!(url = %target, attempt, "GET");

            match self.client.get(target.clone()).send().await {
                Ok(response) if response.status().is_success() => {
                    match response.text().await {
                        Ok(body) => return Ok(body),
                        Err(e) => {
                            warn!(url = %target, attempt, error = %e, "Failed to read response body");
                            last_error = Some(e);
                        }
                    }
                }
                Ok(response) => {
                    let status = response.status();
                    if !is_retryable(status) {
                        return Err(FetchError::Status {
                            status: status.as_u16(),
                            url: target.to_string(),
                        });
                    }
                    warn!(url = %target, attempt, status = status.as_u16(), "Retryable HTTP status");
                }
                Err(e) => {
                    warn!(url = %target, attempt, error = %e, "Request failed");
                    last_error = Some(e);
                }
            }

            if attempt < self.max_retries {
                tokio::time::sleep(self.backoff(attempt)).await;
            }
        }

        Err(FetchError::Exhausted {
            url: target.to_string(),
            attempts: self.max_retries,
            last: last_error,
        })
    }
}

pub fn is_retryable(status: StatusCode) -> bool {
    RETRYABLE_STATUSES.contains(&status.as_u16())
}
