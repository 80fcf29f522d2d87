//! Wire format for `POST /results`

use serde::{Deserialize, Serialize};

use crate::summary::{ProjectSummary, SummaryStatus};

/// Test type reported for every upload from this suite
pub const TEST_TYPE: &str = "e2e";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultPayload {
    pub project: String,
    pub test_type: String,
    pub status: SummaryStatus,
    pub total_tests: u64,
    pub passed_tests: u64,
    pub failed_tests: u64,
    pub skipped_tests: u64,
    pub duration_ms: u64,
    pub metadata: PayloadMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadMetadata {
    pub browser: String,
    pub playwright_version: String,
    pub node_version: String,
    pub ci: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default)]
    pub failed_test_names: Vec<String>,
}

impl From<ProjectSummary> for ResultPayload {
    fn from(summary: ProjectSummary) -> Self {
        let metadata = summary.metadata;
        Self {
            project: summary.project,
            test_type: TEST_TYPE.to_string(),
            status: summary.status,
            total_tests: summary.total_tests,
            passed_tests: summary.passed_tests,
            failed_tests: summary.failed_tests,
            skipped_tests: summary.skipped_tests,
            duration_ms: summary.duration_ms,
            metadata: PayloadMetadata {
                browser: metadata.browser,
                playwright_version: metadata.playwright_version,
                node_version: metadata.node_version,
                ci: metadata.ci,
                commit_sha: metadata.commit_sha,
                branch: metadata.branch,
                run_id: metadata.run_id,
                failed_test_names: metadata.failed_test_names,
            },
        }
    }
}

impl From<&ProjectSummary> for ResultPayload {
    fn from(summary: &ProjectSummary) -> Self {
        summary.clone().into()
    }
}
