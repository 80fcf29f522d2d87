//! KayTee E2E CLI - Main Entry Point
//!
//! Runs the Playwright suites of the KayTee ecosystem and uploads one result
//! summary per project to the metrics API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{health, projects, report, run};

/// KayTee E2E - Playwright runs with metrics reporting
#[derive(Parser)]
#[command(name = "kaytee-e2e")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Directory containing .env.local / .env
    #[arg(long, default_value = ".", global = true)]
    env_dir: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    api: commands::ApiArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run Playwright and report the results
    Run(run::RunArgs),

    /// Report an existing Playwright JSON report
    Report(report::ReportArgs),

    /// Wait for the metrics API to become healthy
    Health(health::HealthArgs),

    /// List the ecosystem's test projects
    Projects,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    kaytee_reporter::load_dotenv(&cli.env_dir);

    match cli.command {
        Commands::Run(args) => {
            let code = run::execute(args, &cli.api, cli.format).await?;
            if code != 0 {
                std::process::exit(code);
            }
        }
        Commands::Report(args) => report::execute(args, &cli.api, cli.format).await?,
        Commands::Health(args) => {
            if !health::execute(args, &cli.api).await? {
                std::process::exit(1);
            }
        }
        Commands::Projects => projects::execute(cli.format),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_passthrough_args() {
        let cli = Cli::try_parse_from([
            "kaytee-e2e",
            "run",
            "--project",
            "kaytee-hub",
            "-p",
            "quality-metrics",
            "--no-upload",
            "--",
            "--workers=1",
        ])
        .unwrap();

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.projects, vec!["kaytee-hub", "quality-metrics"]);
                assert!(args.reporting.no_upload);
                assert_eq!(args.playwright_args, vec!["--workers=1"]);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_parse_api_overrides() {
        let cli = Cli::try_parse_from([
            "kaytee-e2e",
            "health",
            "--api-url",
            "http://localhost:8000/",
            "--api-key",
            "local-key",
        ])
        .unwrap();

        assert_eq!(cli.api.api_url.as_deref(), Some("http://localhost:8000/"));
        assert_eq!(cli.api.api_key.as_deref(), Some("local-key"));

        let config = cli.api.apply(kaytee_reporter::ReporterConfig::default());
        assert_eq!(config.results_url(), "http://localhost:8000/results");
        assert!(config.has_credentials());
    }

    #[test]
    fn test_api_overrides_keep_config_when_absent() {
        let api = commands::ApiArgs::default();
        let config = api.apply(kaytee_reporter::ReporterConfig::default().with_api_key("from-env"));
        assert_eq!(config.api_key, "from-env");
        assert_eq!(config.api_url, kaytee_reporter::config::DEFAULT_API_URL);
    }

    #[test]
    fn test_report_defaults() {
        let cli = Cli::try_parse_from(["kaytee-e2e", "report"]).unwrap();
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.results, PathBuf::from("test-results/results.json"));
                assert_eq!(args.reporting.output, PathBuf::from("test-results/metrics-summary.json"));
                assert!(!args.reporting.no_upload);
            }
            _ => panic!("expected report command"),
        }
    }
}
