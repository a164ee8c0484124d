//! Authenticated upload of one aggregate to the data store.
//!
//! Every outcome is terminal for the tick. Nothing is retried or queued.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, StatusCode};
use tracing::{error, info, warn};

use crate::{
    config::{Config, TEMPERATURE_TABLE},
    error::{AgentError, Result},
    token::TokenIssuer,
    types::TemperaturePayload,
};

pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// 200 or 201
    Success,
    BadRequest { body: String },
    Unauthorized { body: String },
    Forbidden { body: String },
    /// Endpoint or table missing.
    NotFound { body: String },
    Unexpected { status: u16, body: String },
    /// No response was received at all.
    Transport { reason: String },
}

impl UploadOutcome {
    pub fn classify(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::OK | StatusCode::CREATED => UploadOutcome::Success,
            StatusCode::BAD_REQUEST => UploadOutcome::BadRequest { body },
            StatusCode::UNAUTHORIZED => UploadOutcome::Unauthorized { body },
            StatusCode::FORBIDDEN => UploadOutcome::Forbidden { body },
            StatusCode::NOT_FOUND => UploadOutcome::NotFound { body },
            other => UploadOutcome::Unexpected {
                status: other.as_u16(),
                body,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success)
    }
}

/// Builds the shared HTTP client. Certificate checks stay on unless the
/// config explicitly opts out.
pub fn build_client(timeout: Duration, insecure_skip_verify: bool) -> Result<reqwest::Client> {
    if insecure_skip_verify {
        warn!("TLS certificate verification is disabled");
    }
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(insecure_skip_verify)
        .build()?;
    Ok(client)
}

pub struct Uploader {
    client: reqwest::Client,
    endpoint_url: String,
    issuer: TokenIssuer,
}

impl Uploader {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: build_client(UPLOAD_TIMEOUT, config.insecure_skip_verify)?,
            endpoint_url: config.endpoint_url.clone(),
            issuer: TokenIssuer::new(&config.jwt_secret),
        })
    }

    pub fn endpoint_url(&self) -> &str {
        &self.endpoint_url
    }

    /// POSTs the payload once and logs the classified result.
    ///
    /// `Err` means the request was never sent (payload or token could not be
    /// built). `sensor_count` is only used for the success line.
    pub async fn send(
        &self,
        payload: &TemperaturePayload,
        sensor_count: usize,
    ) -> Result<UploadOutcome> {
        let json = serde_json::to_vec(payload).map_err(AgentError::Serialization)?;
        let token = self.issuer.issue()?;

        let response = self
            .client
            .post(&self.endpoint_url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(token)
            .body(json.clone())
            .send()
            .await;

        let outcome = match response {
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                UploadOutcome::classify(status, body)
            }
            Err(e) => UploadOutcome::Transport {
                reason: e.to_string(),
            },
        };

        self.report(&outcome, payload, sensor_count, &json);
        Ok(outcome)
    }

    fn report(
        &self,
        outcome: &UploadOutcome,
        payload: &TemperaturePayload,
        sensor_count: usize,
        json: &[u8],
    ) {
        match outcome {
            UploadOutcome::Success => info!(
                "SUCCESS: {} sensors aggregated. Average {:.2}°C sent to the data store",
                sensor_count, payload.temperature_avg
            ),
            UploadOutcome::BadRequest { body } => {
                error!("ERROR 400: bad request");
                error!("  Payload: {}", String::from_utf8_lossy(json));
                error!("  Response: {}", body);
            }
            UploadOutcome::Unauthorized { body } => {
                error!("ERROR 401: JWT authentication failed");
                error!("  Response: {}", body);
            }
            UploadOutcome::Forbidden { body } => {
                error!("ERROR 403: permission denied");
                error!("  Response: {}", body);
            }
            UploadOutcome::NotFound { body } => {
                error!("ERROR 404: endpoint not found");
                error!("  API URL: {}", self.endpoint_url);
                error!("  Response: {}", body);
                error!(
                    "  Check that the '{}' table exists in the PostgREST schema",
                    TEMPERATURE_TABLE
                );
            }
            UploadOutcome::Unexpected { status, body } => {
                warn!("HTTP {}: {}", status, body);
            }
            UploadOutcome::Transport { reason } => {
                error!("Connection failed: {}", reason);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        let body = || "b".to_string();

        assert_eq!(UploadOutcome::classify(StatusCode::OK, body()), UploadOutcome::Success);
        assert_eq!(
            UploadOutcome::classify(StatusCode::CREATED, body()),
            UploadOutcome::Success
        );
        assert_eq!(
            UploadOutcome::classify(StatusCode::BAD_REQUEST, body()),
            UploadOutcome::BadRequest { body: body() }
        );
        assert_eq!(
            UploadOutcome::classify(StatusCode::UNAUTHORIZED, body()),
            UploadOutcome::Unauthorized { body: body() }
        );
        assert_eq!(
            UploadOutcome::classify(StatusCode::FORBIDDEN, body()),
            UploadOutcome::Forbidden { body: body() }
        );
        assert_eq!(
            UploadOutcome::classify(StatusCode::NOT_FOUND, body()),
            UploadOutcome::NotFound { body: body() }
        );
        assert_eq!(
            UploadOutcome::classify(StatusCode::NO_CONTENT, body()),
            UploadOutcome::Unexpected {
                status: 204,
                body: body()
            }
        );
        assert_eq!(
            UploadOutcome::classify(StatusCode::SERVICE_UNAVAILABLE, body()),
            UploadOutcome::Unexpected {
                status: 503,
                body: body()
            }
        );
    }

    #[test]
    fn only_success_is_success() {
        assert!(UploadOutcome::Success.is_success());
        assert!(!UploadOutcome::Transport {
            reason: "refused".into()
        }
        .is_success());
    }
}
