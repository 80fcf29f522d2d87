//! Folds the runner's event stream into one summary per project

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::ReporterConfig;
use crate::error::ReporterResult;
use crate::event::{RunEvent, RunStatus};
use crate::payload::ResultPayload;
use crate::summary::{ProjectSummary, RunMetadata};

/// Accumulates per-project summaries while a run is in progress.
///
/// Events must be applied one at a time. When they are produced by several
/// tasks, funnel them through [`aggregate_channel`] so this stays the only
/// writer.
pub struct Aggregator {
    config: ReporterConfig,
    summaries: BTreeMap<String, ProjectSummary>,
    started: Instant,
    started_at: DateTime<Utc>,
    reported_elapsed: Option<Duration>,
    run_status: Option<RunStatus>,
}

impl Aggregator {
    pub fn new(config: ReporterConfig) -> Self {
        Self {
            config,
            summaries: BTreeMap::new(),
            started: Instant::now(),
            started_at: Utc::now(),
            reported_elapsed: None,
            run_status: None,
        }
    }

    /// Use the start time and wall-clock duration measured by the runner.
    ///
    /// For events replayed after the fact, the aggregator's own clock only
    /// sees the replay.
    pub fn set_reported_timing(&mut self, started_at: Option<DateTime<Utc>>, elapsed: Duration) {
        if let Some(started_at) = started_at {
            self.started_at = started_at;
        }
        self.reported_elapsed = Some(elapsed);
    }

    /// Apply a single event
    pub fn apply(&mut self, event: RunEvent) {
        if let Some(status) = self.run_status {
            warn!("Ignoring event received after run finished ({}): {:?}", status, event);
            return;
        }

        match event {
            RunEvent::RunStarted => {
                self.started = Instant::now();
                if self.reported_elapsed.is_none() {
                    self.started_at = Utc::now();
                }
                info!("Test run started at {}", self.started_at.to_rfc3339());
            }
            RunEvent::TestStarted { project, title } => {
                debug!(project = %project, "Test started: {}", title);
            }
            RunEvent::TestFinished { project, title, outcome, duration_ms, browser } => {
                debug!(
                    project = %project,
                    "Test finished: {} ({}, {} ms)",
                    title,
                    outcome.as_str(),
                    duration_ms
                );

                let config = &self.config;
                let summary = self.summaries.entry(project).or_insert_with_key(|name| {
                    debug!(project = %name, "Tracking new project");
                    ProjectSummary::new(name.clone(), RunMetadata::capture(config, browser.as_deref()))
                });
                summary.record(&title, outcome, duration_ms);
            }
            RunEvent::RunFinished { status } => {
                self.run_status = Some(status);
            }
        }
    }

    pub fn summary(&self, project: &str) -> Option<&ProjectSummary> {
        self.summaries.get(project)
    }

    pub fn summaries(&self) -> impl Iterator<Item = &ProjectSummary> {
        self.summaries.values()
    }

    pub fn is_finished(&self) -> bool {
        self.run_status.is_some()
    }

    /// Freeze the summaries for upload
    pub fn finalize(self) -> FinalizedRun {
        let elapsed = self.reported_elapsed.unwrap_or_else(|| self.started.elapsed());
        let projects: Vec<ProjectSummary> = self.summaries.into_values().collect();

        let status = self.run_status.unwrap_or_else(|| {
            if projects.iter().any(ProjectSummary::is_failed) {
                RunStatus::Failed
            } else {
                RunStatus::Passed
            }
        });

        FinalizedRun {
            started_at: self.started_at,
            elapsed_ms: elapsed.as_millis() as u64,
            status,
            projects,
        }
    }
}

/// Aggregate a complete, already-collected event sequence
pub fn aggregate<I>(config: ReporterConfig, events: I) -> FinalizedRun
where
    I: IntoIterator<Item = RunEvent>,
{
    let mut aggregator = Aggregator::new(config);
    for event in events {
        aggregator.apply(event);
    }
    aggregator.finalize()
}

/// Drain `rx` into an aggregator and finalize once every sender is dropped
pub async fn aggregate_channel(
    config: ReporterConfig,
    mut rx: mpsc::UnboundedReceiver<RunEvent>,
) -> FinalizedRun {
    let mut aggregator = Aggregator::new(config);
    while let Some(event) = rx.recv().await {
        aggregator.apply(event);
    }
    aggregator.finalize()
}

/// Summaries of a finished run. No further mutation is possible.
#[derive(Debug, Clone, Serialize)]
pub struct FinalizedRun {
    started_at: DateTime<Utc>,
    elapsed_ms: u64,
    status: RunStatus,
    projects: Vec<ProjectSummary>,
}

impl FinalizedRun {
    /// Summaries ordered by project name
    pub fn summaries(&self) -> &[ProjectSummary] {
        &self.projects
    }

    pub fn summary(&self, project: &str) -> Option<&ProjectSummary> {
        self.projects.iter().find(|s| s.project == project)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock time between run start and finalization
    pub fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn into_payloads(self) -> Vec<ResultPayload> {
        self.projects.into_iter().map(ResultPayload::from).collect()
    }

    /// Write the finalized summaries as pretty JSON
    pub fn write_json(&self, path: &Path) -> ReporterResult<PathBuf> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;

        info!("Summary written to: {}", path.display());
        Ok(path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TestOutcome;
    use crate::summary::SummaryStatus;

    #[test]
    fn test_example_run() {
        let run = aggregate(
            ReporterConfig::default(),
            vec![
                RunEvent::RunStarted,
                RunEvent::finished("alpha", "t1", TestOutcome::Passed, 100),
                RunEvent::finished("alpha", "t2", TestOutcome::Failed, 50),
                RunEvent::finished("beta", "t3", TestOutcome::Skipped, 0),
                RunEvent::RunFinished { status: RunStatus::Failed },
            ],
        );

        let alpha = run.summary("alpha").unwrap();
        assert_eq!(alpha.total_tests, 2);
        assert_eq!(alpha.passed_tests, 1);
        assert_eq!(alpha.failed_tests, 1);
        assert_eq!(alpha.skipped_tests, 0);
        assert_eq!(alpha.status, SummaryStatus::Failed);
        assert_eq!(alpha.metadata.failed_test_names, vec!["t2"]);
        assert_eq!(alpha.duration_ms, 150);

        let beta = run.summary("beta").unwrap();
        assert_eq!(beta.total_tests, 1);
        assert_eq!(beta.skipped_tests, 1);
        assert_eq!(beta.status, SummaryStatus::Passed);
        assert_eq!(beta.duration_ms, 0);

        assert_eq!(run.status(), RunStatus::Failed);
        assert_eq!(run.summaries().len(), 2);
    }

    #[test]
    fn test_no_summary_before_first_finished_test() {
        let mut aggregator = Aggregator::new(ReporterConfig::default());
        aggregator.apply(RunEvent::RunStarted);
        aggregator.apply(RunEvent::TestStarted {
            project: "alpha".to_string(),
            title: "t1".to_string(),
        });
        assert!(aggregator.summary("alpha").is_none());
    }

    #[test]
    fn test_events_after_run_finished_are_ignored() {
        let mut aggregator = Aggregator::new(ReporterConfig::default());
        aggregator.apply(RunEvent::finished("alpha", "t1", TestOutcome::Passed, 1));
        aggregator.apply(RunEvent::RunFinished { status: RunStatus::Passed });
        aggregator.apply(RunEvent::finished("alpha", "late", TestOutcome::Failed, 1));

        let summary = aggregator.summary("alpha").unwrap();
        assert_eq!(summary.total_tests, 1);
        assert!(!summary.is_failed());
    }

    #[test]
    fn test_status_derived_without_run_finished() {
        let run = aggregate(
            ReporterConfig::default(),
            vec![RunEvent::finished("alpha", "t1", TestOutcome::TimedOut, 1)],
        );
        assert_eq!(run.status(), RunStatus::Failed);

        let run = aggregate(ReporterConfig::default(), Vec::new());
        assert_eq!(run.status(), RunStatus::Passed);
        assert!(run.is_empty());
    }

    #[test]
    fn test_browser_captured_from_first_event() {
        let run = aggregate(
            ReporterConfig::default(),
            vec![
                RunEvent::TestFinished {
                    project: "mobile-chrome".to_string(),
                    title: "menu".to_string(),
                    outcome: TestOutcome::Passed,
                    duration_ms: 1,
                    browser: Some("webkit".to_string()),
                },
                RunEvent::TestFinished {
                    project: "mobile-chrome".to_string(),
                    title: "nav".to_string(),
                    outcome: TestOutcome::Passed,
                    duration_ms: 1,
                    browser: Some("firefox".to_string()),
                },
            ],
        );
        assert_eq!(run.summary("mobile-chrome").unwrap().metadata.browser, "webkit");
    }

    #[tokio::test]
    async fn test_aggregate_channel_with_concurrent_producers() {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut producers = Vec::new();
        for project in ["alpha", "beta", "gamma"] {
            let tx = tx.clone();
            producers.push(tokio::spawn(async move {
                for i in 0..50 {
                    let outcome = if i % 10 == 0 { TestOutcome::Failed } else { TestOutcome::Passed };
                    tx.send(RunEvent::finished(project, format!("t{}", i), outcome, 2)).unwrap();
                }
            }));
        }
        drop(tx);
        for producer in producers {
            producer.await.unwrap();
        }

        let run = aggregate_channel(ReporterConfig::default(), rx).await;
        assert_eq!(run.summaries().len(), 3);
        for summary in run.summaries() {
            assert_eq!(summary.total_tests, 50);
            assert_eq!(summary.failed_tests, 5);
            assert_eq!(summary.duration_ms, 100);
            assert!(summary.counters_consistent());
        }
    }

    #[test]
    fn test_reported_timing_overrides_own_clock() {
        let started_at = DateTime::parse_from_rfc3339("2026-10-19T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let mut aggregator = Aggregator::new(ReporterConfig::default());
        aggregator.set_reported_timing(Some(started_at), Duration::from_millis(41_250));
        aggregator.apply(RunEvent::RunStarted);
        aggregator.apply(RunEvent::finished("alpha", "t1", TestOutcome::Passed, 3));

        let run = aggregator.finalize();
        assert_eq!(run.elapsed(), Duration::from_millis(41_250));
        assert_eq!(run.started_at(), started_at);
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/metrics-summary.json");
        let run = aggregate(
            ReporterConfig::default(),
            vec![RunEvent::finished("alpha", "t1", TestOutcome::Passed, 3)],
        );

        run.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["status"], "passed");
        assert_eq!(value["projects"][0]["project"], "alpha");
        assert_eq!(value["projects"][0]["duration_ms"], 3);
    }
}
