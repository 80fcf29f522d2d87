//! Playwright JSON report ingestion

use std::path::PathBuf;
use std::time::Duration;

use kaytee_reporter::playwright::outcome_from_status;
use kaytee_reporter::{
    aggregate, PlaywrightReport, ProjectCatalog, ReporterConfig, ReporterError, RunEvent, RunStatus,
    SummaryStatus, TestOutcome,
};
use test_case::test_case;

fn fixture() -> PlaywrightReport {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/results.json");
    PlaywrightReport::load(&path).expect("fixture report should parse")
}

#[test_case("passed", TestOutcome::Passed ; "passed")]
#[test_case("failed", TestOutcome::Failed ; "failed")]
#[test_case("timedOut", TestOutcome::TimedOut ; "timed out")]
#[test_case("skipped", TestOutcome::Skipped ; "skipped")]
#[test_case("interrupted", TestOutcome::Skipped ; "interrupted")]
fn test_result_status_mapping(status: &str, expected: TestOutcome) {
    assert_eq!(outcome_from_status(status), expected);
}

#[test]
fn test_report_metadata() {
    let report = fixture();
    assert_eq!(report.version(), Some("1.49.1"));
    assert_eq!(report.attempt_count(), 8);
    assert_eq!(report.run_status(), RunStatus::Failed);
}

#[test]
fn test_every_attempt_becomes_an_event() {
    let events = fixture().events(&ProjectCatalog::default_catalog());

    assert_eq!(events.len(), 10);
    assert_eq!(events.first(), Some(&RunEvent::RunStarted));
    assert_eq!(
        events.last(),
        Some(&RunEvent::RunFinished { status: RunStatus::Failed })
    );

    // Retries of the same test are reported individually
    let retried: Vec<TestOutcome> = events
        .iter()
        .filter_map(|e| match e {
            RunEvent::TestFinished { title, outcome, .. } if title == "should reject invalid credentials" => {
                Some(*outcome)
            }
            _ => None,
        })
        .collect();
    assert_eq!(retried, vec![TestOutcome::TimedOut, TestOutcome::Passed]);
}

#[test]
fn test_report_aggregates_per_project() {
    let config = ReporterConfig::default().with_tool_version("1.49.1");
    let run = aggregate(config, fixture().events(&ProjectCatalog::default_catalog()));

    assert_eq!(run.status(), RunStatus::Failed);
    assert_eq!(run.summaries().len(), 3);

    let tropical = run.summary("kaytee-tropical").unwrap();
    assert_eq!(tropical.total_tests, 3);
    assert_eq!(tropical.passed_tests, 2);
    assert_eq!(tropical.failed_tests, 1);
    assert_eq!(tropical.duration_ms, 1840 + 30000 + 2211);
    assert_eq!(tropical.status, SummaryStatus::Failed);
    assert_eq!(tropical.metadata.failed_test_names, vec!["should reject invalid credentials"]);
    assert_eq!(tropical.metadata.browser, "chromium");
    assert_eq!(tropical.metadata.playwright_version, "1.49.1");

    let metrics = run.summary("quality-metrics").unwrap();
    assert_eq!(metrics.total_tests, 4);
    assert_eq!(metrics.failed_tests, 3);
    assert_eq!(metrics.skipped_tests, 1);
    assert_eq!(metrics.duration_ms, 950 + 910 + 905 + 120);
    assert_eq!(metrics.metadata.failed_test_names.len(), 3);
    assert!(metrics.counters_consistent());

    // Not in the catalog, so the configured default browser applies
    let staging = run.summary("staging-webkit").unwrap();
    assert_eq!(staging.total_tests, 1);
    assert_eq!(staging.skipped_tests, 1);
    assert_eq!(staging.status, SummaryStatus::Passed);
    assert_eq!(staging.metadata.browser, "chromium");
}

#[test]
fn test_catalog_supplies_project_browser() {
    let config = ReporterConfig::default().with_browser("firefox");
    let run = aggregate(config, fixture().events(&ProjectCatalog::default_catalog()));

    assert_eq!(run.summary("kaytee-tropical").unwrap().metadata.browser, "chromium");
    assert_eq!(run.summary("staging-webkit").unwrap().metadata.browser, "firefox");
}

#[test]
fn test_aggregate_keeps_playwright_timing() {
    let report = fixture();
    let run = report.aggregate(ReporterConfig::default(), &ProjectCatalog::default_catalog());

    assert_eq!(report.duration(), Some(Duration::from_millis(41_250)));
    assert_eq!(run.elapsed(), Duration::from_millis(41_250));
    assert_eq!(run.started_at().to_rfc3339(), "2026-10-19T08:00:00+00:00");
    assert_eq!(run.status(), RunStatus::Failed);
    assert_eq!(run.summaries().len(), 3);
}

#[test]
fn test_report_without_stats_has_no_duration() {
    let report = PlaywrightReport::from_json(r#"{ "suites": [] }"#).unwrap();
    assert_eq!(report.duration(), None);
    assert_eq!(report.start_time(), None);
}

#[test]
fn test_clean_report_passes() {
    let report = PlaywrightReport::from_json(
        r#"{
            "config": { "version": "1.49.1", "projects": [] },
            "suites": [],
            "errors": [],
            "stats": { "expected": 0, "unexpected": 0, "flaky": 0, "skipped": 0, "duration": 12 }
        }"#,
    )
    .unwrap();

    assert_eq!(report.run_status(), RunStatus::Passed);
    assert_eq!(report.events(&ProjectCatalog::empty()).len(), 2);
}

#[test]
fn test_global_errors_fail_the_run() {
    let report = PlaywrightReport::from_json(
        r#"{ "suites": [], "errors": [{ "message": "Error: No tests found" }] }"#,
    )
    .unwrap();
    assert_eq!(report.run_status(), RunStatus::Failed);
}

#[test]
fn test_invalid_report_is_a_parse_error() {
    let result = PlaywrightReport::from_json("{ not json");
    assert!(matches!(result, Err(ReporterError::ReportParse(_))));
}
