//! CLI Commands

pub mod health;
pub mod projects;
pub mod report;
pub mod run;

use std::path::PathBuf;

use clap::Args;
use tracing::warn;

use kaytee_reporter::playwright::{detect_node_version, detect_playwright_version};
use kaytee_reporter::{Dispatcher, PlaywrightReport, ProjectCatalog, ReporterConfig};

use crate::output::{print_dispatch, print_list, OutputFormat};

/// Metrics API overrides, falling back to the environment
#[derive(Args, Debug, Clone, Default)]
pub struct ApiArgs {
    /// Metrics API base URL
    #[arg(long, env = "METRICS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Metrics API key
    #[arg(long, env = "METRICS_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,
}

impl ApiArgs {
    pub fn apply(&self, mut config: ReporterConfig) -> ReporterConfig {
        if let Some(url) = self.api_url.as_deref().filter(|u| !u.is_empty()) {
            config = config.with_api_url(url);
        }
        if let Some(key) = &self.api_key {
            config = config.with_api_key(key.as_str());
        }
        config
    }
}

/// Options shared by every command that reports results
#[derive(Args)]
pub struct ReportingArgs {
    /// Where to write the per-project summary JSON
    #[arg(long, default_value = "test-results/metrics-summary.json")]
    pub output: PathBuf,

    /// Aggregate and print results without uploading them
    #[arg(long)]
    pub no_upload: bool,
}

/// Reporter configuration for a finished report.
///
/// The Playwright version recorded in the report wins over the installed
/// one.
pub async fn reporter_config(report: &PlaywrightReport, api: &ApiArgs) -> ReporterConfig {
    let mut config = api.apply(ReporterConfig::from_env());

    let tool_version = match report.version() {
        Some(version) => Some(version.to_string()),
        None => detect_playwright_version().await,
    };
    if let Some(version) = tool_version {
        config = config.with_tool_version(version);
    }
    if let Some(version) = detect_node_version().await {
        config = config.with_runtime_version(version);
    }

    config
}

/// Aggregate a report, print the summary, and upload it.
///
/// Never fails: summary output and uploads are best effort.
pub async fn report_results(
    report: &PlaywrightReport,
    args: &ReportingArgs,
    api: &ApiArgs,
    format: OutputFormat,
) {
    let config = reporter_config(report, api).await;
    let run = report.aggregate(config.clone(), &ProjectCatalog::default_catalog());

    print_list(run.summaries(), format);

    if let Err(e) = run.write_json(&args.output) {
        warn!("Failed to write summary to {}: {}", args.output.display(), e);
    }

    if args.no_upload {
        return;
    }

    let dispatch = Dispatcher::new(&config).dispatch(run).await;
    print_dispatch(&dispatch);
}
