//! HTTP dispatcher — POSTs accepted signals to the signals endpoint.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::DispatchError;
use crate::signal::SignalRecord;
use crate::sinks::SignalSink;

/// POSTs each record as JSON and reads `success` from the JSON reply.
pub struct ApiDispatcher {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl ApiDispatcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DispatchError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DispatchError::Http {
                url: url.clone(),
                reason: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            url,
            timeout,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SignalSink for ApiDispatcher {
    fn name(&self) -> &str {
        "api"
    }

    async fn deliver(&self, record: &SignalRecord) -> Result<bool, DispatchError> {
        let resp = self
            .client
            .post(&self.url)
            .json(record)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DispatchError::Timeout {
                        url: self.url.clone(),
                        timeout: self.timeout,
                    }
                } else {
                    DispatchError::Http {
                        url: self.url.clone(),
                        reason: e.to_string(),
                    }
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body.chars().take(200).collect::<String>(), "API error");
            return Ok(false);
        }

        let data: serde_json::Value = resp.json().await.map_err(|e| DispatchError::Decode {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;

        let success = data
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        debug!(success, "API accepted signal request");
        Ok(success)
    }
}
