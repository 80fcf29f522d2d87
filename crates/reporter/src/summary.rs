//! Per-project result summaries

use serde::{Deserialize, Serialize};

use crate::config::ReporterConfig;
use crate::event::TestOutcome;

/// Pass/fail state of a project. Only ever moves from passed to failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    #[default]
    Passed,
    Failed,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Passed => "passed",
            SummaryStatus::Failed => "failed",
        }
    }
}

/// Environment captured the first time a project is seen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub browser: String,
    pub playwright_version: String,
    pub node_version: String,
    pub ci: bool,
    pub commit_sha: Option<String>,
    pub branch: Option<String>,
    pub run_id: Option<String>,
    /// Titles of failed or timed-out tests, in completion order
    pub failed_test_names: Vec<String>,
}

impl RunMetadata {
    pub fn capture(config: &ReporterConfig, browser: Option<&str>) -> Self {
        Self {
            browser: browser.unwrap_or(&config.browser).to_string(),
            playwright_version: config.tool_version.clone(),
            node_version: config.runtime_version.clone(),
            ci: config.ci,
            commit_sha: config.commit_sha.clone(),
            branch: config.branch.clone(),
            run_id: config.run_id.clone(),
            failed_test_names: Vec::new(),
        }
    }
}

/// Running totals for one project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub project: String,
    pub status: SummaryStatus,
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub skipped_tests: u64,
    /// Sum of individual test durations, not wall-clock time
    pub duration_ms: u64,
    pub metadata: RunMetadata,
}

impl ProjectSummary {
    pub fn new(project: impl Into<String>, metadata: RunMetadata) -> Self {
        Self {
            project: project.into(),
            status: SummaryStatus::Passed,
            total_tests: 0,
            passed_tests: 0,
            failed_tests: 0,
            skipped_tests: 0,
            duration_ms: 0,
            metadata,
        }
    }

    /// Fold one finished test into the totals
    pub fn record(&mut self, title: &str, outcome: TestOutcome, duration_ms: u64) {
        self.total_tests += 1;
        self.duration_ms = self.duration_ms.saturating_add(duration_ms);

        match outcome {
            TestOutcome::Passed => self.passed_tests += 1,
            TestOutcome::Failed | TestOutcome::TimedOut => {
                self.failed_tests += 1;
                self.status = SummaryStatus::Failed;
                self.metadata.failed_test_names.push(title.to_string());
            }
            TestOutcome::Skipped => self.skipped_tests += 1,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == SummaryStatus::Failed
    }

    /// `total == passed + failed + skipped`
    pub fn counters_consistent(&self) -> bool {
        self.total_tests == self.passed_tests + self.failed_tests + self.skipped_tests
    }
}
