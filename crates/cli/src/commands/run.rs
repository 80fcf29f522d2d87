//! Run Commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use kaytee_reporter::{PlaywrightCommand, ProjectCatalog, ReporterError};

use super::{report_results, ApiArgs, ReportingArgs};
use crate::output::{print_error, print_success, OutputFormat};

#[derive(Args)]
pub struct RunArgs {
    /// Only run this project (repeatable)
    #[arg(short, long = "project")]
    pub projects: Vec<String>,

    /// Only run tests matching this pattern
    #[arg(short, long)]
    pub grep: Option<String>,

    /// Directory containing playwright.config.ts
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,

    #[command(flatten)]
    pub reporting: ReportingArgs,

    /// Extra arguments passed through to `playwright test`
    #[arg(last = true)]
    pub playwright_args: Vec<String>,
}

/// Run the suite and report it. Returns Playwright's exit code.
pub async fn execute(args: RunArgs, api: &ApiArgs, format: OutputFormat) -> Result<i32> {
    let catalog = ProjectCatalog::default_catalog();
    for project in &args.projects {
        if !catalog.contains(project) {
            warn!("'{}' is not a known project; passing it to Playwright anyway", project);
        }
    }

    let mut cmd = PlaywrightCommand::new().workdir(&args.workdir);
    for project in &args.projects {
        cmd = cmd.project(project);
    }
    if let Some(grep) = &args.grep {
        cmd = cmd.grep(grep);
    }
    for arg in &args.playwright_args {
        cmd = cmd.arg(arg);
    }

    let run = match cmd.run().await {
        Ok(run) => run,
        Err(e) => {
            if let Some(code) = exit_code_without_report(&e) {
                print_error(&e.to_string());
                return Ok(code);
            }
            return Err(e).context("failed to run Playwright");
        }
    };
    info!("Playwright finished with exit code {:?}", run.exit_code);

    report_results(&run.report, &args.reporting, api, format).await;

    if run.success {
        print_success("All tests passed");
        Ok(0)
    } else {
        print_error("Test run failed");
        Ok(run.exit_code.unwrap_or(1))
    }
}

/// Playwright's own exit code when it ran but left no report behind
fn exit_code_without_report(err: &ReporterError) -> Option<i32> {
    match err {
        ReporterError::NoReport { exit_code } => Some(exit_code.unwrap_or(1)),
        _ => None,
    }
}
