//! One-shot client for the configured remote store.

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, warn};
use serde_json::json;
use tokio::time::Duration;

use crate::error::UploadError;

/// Reachability probe budget. The actual upload is single-shot and
/// unbounded; only the probe is time-boxed.
const PING_TIMEOUT_SECS: u64 = 3;

pub struct UploadClient {
    base_url: String,
    client: reqwest::Client,
}

impl UploadClient {
    pub fn new(server_url: &str) -> Self {
        Self {
            base_url: server_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Sends the processed artifact to `{serverUrl}/api/upload`. Exactly one
    /// attempt per call; the caller owns any retry affordance.
    pub async fn upload(
        &self,
        image: &str,
        subject: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<(), UploadError> {
        let body = json!({
            "image": image,
            "subject": subject,
            "timestamp": timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        });

        let response = self
            .client
            .post(format!("{}/api/upload", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(UploadError::Connectivity)?;

        let status = response.status();
        if status.is_success() {
            debug!("Upload accepted with status {status}");
            return Ok(());
        }

        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => rejection_message(status.as_u16(), &body),
            Err(_) => fallback_message(status.as_u16()),
        };

        Err(UploadError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    /// Classifies reachability of the remote within a three-second budget.
    /// Any response counts as reachable; the body is ignored.
    pub async fn ping(&self) -> bool {
        let result = self
            .client
            .get(format!("{}/ping", self.base_url))
            .timeout(Duration::from_secs(PING_TIMEOUT_SECS))
            .send()
            .await;

        match result {
            Ok(response) => {
                debug!("Ping answered with status {}", response.status());
                true
            }
            Err(err) => {
                warn!("Ping failed: {err}");
                false
            }
        }
    }
}

fn rejection_message(status: u16, body: &serde_json::Value) -> String {
    body.get("message")
        .and_then(|value| value.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_message(status))
}

fn fallback_message(status: u16) -> String {
    format!("remote rejected request, status={status}")
}
