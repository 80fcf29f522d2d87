//! Report Commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use kaytee_reporter::PlaywrightReport;

use super::{report_results, ApiArgs, ReportingArgs};
use crate::output::OutputFormat;

#[derive(Args)]
pub struct ReportArgs {
    /// Playwright JSON report to ingest
    #[arg(short, long, default_value = "test-results/results.json")]
    pub results: PathBuf,

    #[command(flatten)]
    pub reporting: ReportingArgs,
}

pub async fn execute(args: ReportArgs, api: &ApiArgs, format: OutputFormat) -> Result<()> {
    let report = PlaywrightReport::load(&args.results)
        .with_context(|| format!("failed to read {}", args.results.display()))?;

    report_results(&report, &args.reporting, api, format).await;
    Ok(())
}
