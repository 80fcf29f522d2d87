//! Playwright integration
//!
//! Reads the output of Playwright's built-in JSON reporter and turns it into
//! the same event stream a live reporter would produce: one `TestFinished`
//! per attempt (retries included), framed by `RunStarted` / `RunFinished`.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::process::Command;
use tracing::{debug, info};

use crate::aggregator::{Aggregator, FinalizedRun};
use crate::config::ReporterConfig;
use crate::error::{ReporterError, ReporterResult};
use crate::event::{RunEvent, RunStatus, TestOutcome};
use crate::project::ProjectCatalog;

/// Playwright JSON report (`--reporter=json`)
#[derive(Debug, Clone, Deserialize)]
pub struct PlaywrightReport {
    #[serde(default)]
    pub config: ReportConfig,

    #[serde(default)]
    pub suites: Vec<ReportSuite>,

    #[serde(default)]
    pub errors: Vec<serde_json::Value>,

    #[serde(default)]
    pub stats: ReportStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportConfig {
    /// Playwright version that produced the report
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub projects: Vec<ReportProject>,
}

/// Project entry of the report config. The JSON reporter leaves out the
/// project's `use` options, so the browser is not available here.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProject {
    pub name: String,

    #[serde(default)]
    pub retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSuite {
    pub title: String,

    #[serde(default)]
    pub file: Option<String>,

    #[serde(default)]
    pub specs: Vec<ReportSpec>,

    #[serde(default)]
    pub suites: Vec<ReportSuite>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSpec {
    pub title: String,

    #[serde(default)]
    pub tests: Vec<ReportTest>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTest {
    #[serde(default)]
    pub project_name: String,

    #[serde(default)]
    pub results: Vec<ReportResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportResult {
    pub status: String,

    /// Milliseconds
    #[serde(default)]
    pub duration: f64,

    #[serde(default)]
    pub retry: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    /// When the runner started
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expected: u64,
    #[serde(default)]
    pub unexpected: u64,
    #[serde(default)]
    pub flaky: u64,
    #[serde(default)]
    pub skipped: u64,
    /// Milliseconds
    #[serde(default)]
    pub duration: f64,
}

/// Project name used when Playwright reports a test without one
pub const UNKNOWN_PROJECT: &str = "unknown";

/// Map a Playwright result status onto a test outcome.
///
/// `interrupted` (and anything unrecognised) counts as skipped so that every
/// attempt lands in exactly one counter.
pub fn outcome_from_status(status: &str) -> TestOutcome {
    match status {
        "passed" => TestOutcome::Passed,
        "failed" => TestOutcome::Failed,
        "timedOut" => TestOutcome::TimedOut,
        "skipped" => TestOutcome::Skipped,
        other => {
            debug!("Treating result status '{}' as skipped", other);
            TestOutcome::Skipped
        }
    }
}

impl PlaywrightReport {
    pub fn from_json(json: &str) -> ReporterResult<Self> {
        serde_json::from_str(json).map_err(|e| ReporterError::ReportParse(e.to_string()))
    }

    pub fn load(path: &Path) -> ReporterResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn version(&self) -> Option<&str> {
        self.config.version.as_deref()
    }

    /// Overall status. The JSON report doesn't carry the runner's final
    /// status, so it is derived from the stats.
    pub fn run_status(&self) -> RunStatus {
        if self.stats.unexpected > 0 || !self.errors.is_empty() {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        }
    }

    /// Number of test attempts in the report
    pub fn attempt_count(&self) -> usize {
        fn count(suite: &ReportSuite) -> usize {
            let own: usize = suite
                .specs
                .iter()
                .flat_map(|s| &s.tests)
                .map(|t| t.results.len())
                .sum();
            own + suite.suites.iter().map(count).sum::<usize>()
        }
        self.suites.iter().map(count).sum()
    }

    /// Wall-clock duration of the run as measured by Playwright
    pub fn duration(&self) -> Option<Duration> {
        let millis = self.stats.duration;
        (millis.is_finite() && millis > 0.0).then(|| Duration::from_millis(millis.round() as u64))
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.stats.start_time
    }

    /// Replay the report as a run event sequence.
    ///
    /// The report doesn't record browsers, so each project's browser comes
    /// from `catalog`; projects it doesn't know get the aggregator's
    /// configured default.
    pub fn events(&self, catalog: &ProjectCatalog) -> Vec<RunEvent> {
        let browser_for = |project: &str| catalog.browser_for(project).map(String::from);

        let mut events = vec![RunEvent::RunStarted];
        for suite in &self.suites {
            collect_suite(suite, &browser_for, &mut events);
        }
        events.push(RunEvent::RunFinished {
            status: self.run_status(),
        });

        events
    }

    /// Aggregate the report, keeping the run timing Playwright measured
    /// rather than the time it took to replay the events.
    pub fn aggregate(&self, config: ReporterConfig, catalog: &ProjectCatalog) -> FinalizedRun {
        let mut aggregator = Aggregator::new(config);
        for event in self.events(catalog) {
            aggregator.apply(event);
        }
        if let Some(elapsed) = self.duration() {
            aggregator.set_reported_timing(self.start_time(), elapsed);
        }
        aggregator.finalize()
    }
}

fn collect_suite<F>(suite: &ReportSuite, browser_for: &F, events: &mut Vec<RunEvent>)
where
    F: Fn(&str) -> Option<String>,
{
    for spec in &suite.specs {
        for test in &spec.tests {
            let project = if test.project_name.is_empty() {
                UNKNOWN_PROJECT
            } else {
                test.project_name.as_str()
            };

            for result in &test.results {
                events.push(RunEvent::TestFinished {
                    project: project.to_string(),
                    title: spec.title.clone(),
                    outcome: outcome_from_status(&result.status),
                    duration_ms: result.duration.max(0.0).round() as u64,
                    browser: browser_for(project),
                });
            }
        }
    }

    for child in &suite.suites {
        collect_suite(child, browser_for, events);
    }
}

/// Outcome of a `playwright test` invocation
#[derive(Debug)]
pub struct PlaywrightRun {
    pub report: PlaywrightReport,
    pub success: bool,
    pub exit_code: Option<i32>,
}

/// Builder for `npx playwright test`
#[derive(Debug, Clone, Default)]
pub struct PlaywrightCommand {
    workdir: Option<PathBuf>,
    projects: Vec<String>,
    grep: Option<String>,
    extra_args: Vec<String>,
}

impl PlaywrightCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    pub fn project(mut self, name: impl Into<String>) -> Self {
        self.projects.push(name.into());
        self
    }

    pub fn grep(mut self, pattern: impl Into<String>) -> Self {
        self.grep = Some(pattern.into());
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Arguments passed after `npx`
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "playwright".to_string(),
            "test".to_string(),
            "--reporter=list,json".to_string(),
        ];
        for project in &self.projects {
            args.push(format!("--project={}", project));
        }
        if let Some(grep) = &self.grep {
            args.push(format!("--grep={}", grep));
        }
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Run the suite and parse the JSON report it leaves behind.
    ///
    /// A failing suite is not an error; only a missing or unreadable report
    /// is.
    pub async fn run(&self) -> ReporterResult<PlaywrightRun> {
        let temp_dir = tempfile::tempdir()?;
        let report_path = temp_dir.path().join("results.json");

        let mut cmd = Command::new("npx");
        cmd.args(self.args())
            .env("PLAYWRIGHT_JSON_OUTPUT_NAME", &report_path)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }

        info!("Running: npx {}", self.args().join(" "));

        let status = cmd.status().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ReporterError::PlaywrightNotFound
            } else {
                ReporterError::Io(e)
            }
        })?;

        if !report_path.exists() {
            return Err(ReporterError::NoReport {
                exit_code: status.code(),
            });
        }

        let report = PlaywrightReport::load(&report_path)?;
        debug!("Parsed {} test attempt(s) from {}", report.attempt_count(), report_path.display());

        Ok(PlaywrightRun {
            report,
            success: status.success(),
            exit_code: status.code(),
        })
    }
}

/// Installed Playwright version, e.g. `1.49.1`
pub async fn detect_playwright_version() -> Option<String> {
    let output = Command::new("npx")
        .args(["playwright", "--version"])
        .stdin(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_playwright_version(&String::from_utf8_lossy(&output.stdout))
}

/// Node.js version, e.g. `v20.11.0`
pub async fn detect_node_version() -> Option<String> {
    let output = Command::new("node")
        .arg("--version")
        .stdin(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!version.is_empty()).then_some(version)
}

/// `Version 1.49.1` -> `1.49.1`
fn parse_playwright_version(stdout: &str) -> Option<String> {
    let line = stdout.lines().find(|l| !l.trim().is_empty())?.trim();
    let version = line.strip_prefix("Version").unwrap_or(line).trim();
    (!version.is_empty()).then(|| version.to_string())
}
