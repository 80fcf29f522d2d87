//! Health Commands

use std::time::Duration;

use anyhow::Result;
use clap::Args;

use kaytee_reporter::{MetricsClient, ReporterConfig};

use super::ApiArgs;
use crate::output::{print_error, print_success};

#[derive(Args)]
pub struct HealthArgs {
    /// Number of health probes before giving up
    #[arg(long, default_value = "30")]
    pub attempts: usize,

    /// Delay between probes in milliseconds
    #[arg(long, default_value = "2000")]
    pub delay_ms: u64,
}

/// Wait for the metrics API. Returns true when it became healthy.
pub async fn execute(args: HealthArgs, api: &ApiArgs) -> Result<bool> {
    let config = api.apply(ReporterConfig::from_env());
    let client = MetricsClient::new(&config)?;

    match client
        .wait_for_healthy(args.attempts.max(1), Duration::from_millis(args.delay_ms))
        .await
    {
        Ok(()) => {
            print_success(&format!("Metrics API is healthy at {}", config.api_url));
            Ok(true)
        }
        Err(e) => {
            print_error(&format!("{} ({})", e, config.health_url()));
            Ok(false)
        }
    }
}
