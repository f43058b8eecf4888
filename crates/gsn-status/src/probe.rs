use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use shared::models::PingResponse;

use crate::error::{ProbeError, StatusError, StatusResult};

/// Health check of a relay server endpoint.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn get_ping_response(&self, relay_url: &str) -> Result<PingResponse, ProbeError>;
}

/// Pings relays over HTTP with `GET <relay url>/getaddr`.
pub struct HttpClient {
    client: Client,
    timeout_ms: u64,
}

impl HttpClient {
    /// A `timeout_ms` of 0 leaves requests unbounded.
    pub fn new(timeout_ms: u64) -> StatusResult<Self> {
        let mut builder = Client::builder();
        if timeout_ms > 0 {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| StatusError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout_ms })
    }

    fn request_error(&self, url: &str, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout_ms,
            }
        } else {
            ProbeError::Connection {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

#[async_trait]
impl HealthProbe for HttpClient {
    async fn get_ping_response(&self, relay_url: &str) -> Result<PingResponse, ProbeError> {
        let url = format!("{}/getaddr", relay_url.trim_end_matches('/'));
        debug!("Pinging {url}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.request_error(&url, e))?;
        if body.trim().is_empty() {
            return Err(ProbeError::EmptyBody { url });
        }

        serde_json::from_str(&body).map_err(|e| ProbeError::Malformed {
            url,
            reason: e.to_string(),
        })
    }
}
