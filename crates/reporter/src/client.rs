//! HTTP client for the metrics API

use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::ReporterConfig;
use crate::error::{ReporterError, ReporterResult};
use crate::payload::ResultPayload;

const USER_AGENT: &str = concat!("kaytee-e2e/", env!("CARGO_PKG_VERSION"));

/// Client for `POST /results` and `GET /health`
#[derive(Clone)]
pub struct MetricsClient {
    http: reqwest::Client,
    results_url: String,
    health_url: String,
    api_key: String,
}

impl MetricsClient {
    pub fn new(config: &ReporterConfig) -> ReporterResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upload_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            results_url: config.results_url(),
            health_url: config.health_url(),
            api_key: config.api_key.clone(),
        })
    }

    /// Upload one project's results. Any non-2xx status is an error.
    pub async fn post_result(&self, payload: &ResultPayload) -> ReporterResult<()> {
        let response = self
            .http
            .post(&self.results_url)
            .header("X-API-Key", &self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReporterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Single health probe
    pub async fn health(&self) -> ReporterResult<bool> {
        let response = self.http.get(&self.health_url).send().await?;
        Ok(response.status().is_success())
    }

    /// Poll the health endpoint until it answers with 2xx
    pub async fn wait_for_healthy(&self, max_attempts: usize, delay: Duration) -> ReporterResult<()> {
        for attempt in 1..=max_attempts {
            match self.health().await {
                Ok(true) => {
                    info!("{} is healthy after {} attempt(s)", self.health_url, attempt);
                    return Ok(());
                }
                Ok(false) => {
                    warn!("Health check attempt {} returned a non-success status", attempt);
                }
                Err(ReporterError::Http(e)) if e.is_connect() => {
                    // Connection refused is expected while the API is starting
                    debug!("Health check attempt {}: {}", attempt, e);
                }
                Err(e) => {
                    warn!("Health check attempt {} failed: {}", attempt, e);
                }
            }

            if attempt < max_attempts {
                sleep(delay).await;
            }
        }

        Err(ReporterError::HealthCheck(max_attempts))
    }
}
