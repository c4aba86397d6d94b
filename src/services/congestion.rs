use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CrowdLevel, Reading};
use crate::services::ReadingCache;

/// Errors that can occur when querying the congestion provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("provider returned error: {0}")]
    ApiError(String),

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct ProviderQuery<'a> {
    query: &'a str,
    #[serde(rename = "serviceType")]
    service_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct ProviderEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<ProviderPayload>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderPayload {
    location: String,
    #[serde(rename = "crowdLevel")]
    crowd_level: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    timestamp: Option<chrono::DateTime<chrono::Utc>>,
}

/// Client for the upstream congestion provider.
///
/// `fetch_reading` never surfaces an error: any failure (timeout,
/// upstream error, malformed body) degrades to an Unknown reading for
/// that location only, so one bad location never sinks a batch.
pub struct CongestionClient {
    base_url: String,
    probe_location: String,
    client: Client,
    cache: Arc<ReadingCache>,
}

impl CongestionClient {
    pub fn new(
        base_url: String,
        timeout_secs: u64,
        probe_location: String,
        cache: Arc<ReadingCache>,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("crowd-compare/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            probe_location,
            client,
            cache,
        }
    }

    /// Fetch one reading, absorbing every failure into a degraded Reading
    pub async fn fetch_reading(&self, location: &str) -> Reading {
        if let Some(cached) = self.cache.get(location).await {
            return cached;
        }

        match self.query_provider(location).await {
            Ok(reading) => {
                if reading.success {
                    self.cache.insert(location, reading.clone()).await;
                }
                reading
            }
            Err(e) => {
                tracing::warn!(location, error = %e, "congestion fetch degraded");
                Reading::unavailable(location)
            }
        }
    }

    /// Fetch readings for all locations concurrently and independently.
    ///
    /// Fan-out then fan-in: the result vector is in input order and is
    /// only produced once every fetch has settled.
    pub async fn fetch_all(&self, locations: &[String]) -> Vec<Reading> {
        let fetches = locations.iter().map(|location| self.fetch_reading(location));
        let readings = join_all(fetches).await;

        let successful = readings.iter().filter(|r| r.success).count();
        tracing::info!(
            total = locations.len(),
            successful,
            "batch congestion fetch completed"
        );
        readings
    }

    /// Quick upstream liveness probe used by the health endpoint
    pub async fn check_status(&self) -> bool {
        let probe = self.query_provider(&self.probe_location);
        matches!(
            tokio::time::timeout(Duration::from_secs(3), probe).await,
            Ok(Ok(_))
        )
    }

    async fn query_provider(&self, location: &str) -> Result<Reading, ProviderError> {
        let url = format!(
            "{}/congestion/query",
            self.base_url.trim_end_matches('/')
        );

        tracing::debug!(location, url = %url, "querying congestion provider");

        let response = self
            .client
            .post(&url)
            .json(&ProviderQuery {
                query: location,
                service_type: "realtime",
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "provider answered {}",
                response.status()
            )));
        }

        let envelope: ProviderEnvelope = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        if !envelope.success {
            return Err(ProviderError::ApiError(
                envelope
                    .message
                    .unwrap_or_else(|| "provider reported failure".to_string()),
            ));
        }

        let payload = envelope
            .data
            .ok_or_else(|| ProviderError::InvalidResponse("missing data field".to_string()))?;

        Ok(Reading {
            location: payload.location,
            level: CrowdLevel::from_label(&payload.crowd_level),
            message: payload.message,
            observed_at: payload.timestamp.unwrap_or_else(chrono::Utc::now),
            success: true,
        })
    }
}
