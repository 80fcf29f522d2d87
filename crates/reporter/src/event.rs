//! Test lifecycle events consumed by the aggregator

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

/// Outcome of a single test attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestOutcome {
    Passed,
    Failed,
    #[serde(alias = "timedOut")]
    TimedOut,
    Skipped,
}

impl TestOutcome {
    /// Failed and timed-out tests both fail their project
    pub fn is_failure(&self) -> bool {
        matches!(self, TestOutcome::Failed | TestOutcome::TimedOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestOutcome::Passed => "passed",
            TestOutcome::Failed => "failed",
            TestOutcome::TimedOut => "timed-out",
            TestOutcome::Skipped => "skipped",
        }
    }
}

/// Overall status of a finished run, as reported by the test runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Passed,
    Failed,
    #[serde(alias = "timedOut")]
    Timedout,
    Interrupted,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Passed => "passed",
            RunStatus::Failed => "failed",
            RunStatus::Timedout => "timedout",
            RunStatus::Interrupted => "interrupted",
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle event emitted by the test runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum RunEvent {
    RunStarted,
    TestStarted {
        project: String,
        title: String,
    },
    TestFinished {
        project: String,
        title: String,
        outcome: TestOutcome,
        #[serde(default)]
        duration_ms: u64,
        /// Browser the project runs in, when the runner knows it
        #[serde(default, skip_serializing_if = "Option::is_none")]
        browser: Option<String>,
    },
    RunFinished {
        status: RunStatus,
    },
}

impl RunEvent {
    pub fn finished(
        project: impl Into<String>,
        title: impl Into<String>,
        outcome: TestOutcome,
        duration_ms: u64,
    ) -> Self {
        RunEvent::TestFinished {
            project: project.into(),
            title: title.into(),
            outcome,
            duration_ms,
            browser: None,
        }
    }
}

/// Read NDJSON events from `reader` and forward them over `tx`.
///
/// Blank lines and lines that aren't events are skipped. Returns the number
/// of events forwarded; stops early if the receiver is gone.
pub async fn forward_ndjson<R>(reader: R, tx: mpsc::UnboundedSender<RunEvent>) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut forwarded = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<RunEvent>(line) {
            Ok(event) => {
                if tx.send(event).is_err() {
                    break;
                }
                forwarded += 1;
            }
            Err(e) => debug!("Skipping non-event line ({}): {}", e, line),
        }
    }

    Ok(forwarded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_test_finished_event() {
        let json = r#"{"type":"test-finished","project":"kaytee-hub","title":"loads hub","outcome":"timedOut","duration_ms":30000}"#;
        let event: RunEvent = serde_json::from_str(json).unwrap();

        assert_eq!(
            event,
            RunEvent::finished("kaytee-hub", "loads hub", TestOutcome::TimedOut, 30000)
        );
    }

    #[test]
    fn test_parse_run_finished_event() {
        let event: RunEvent =
            serde_json::from_str(r#"{"type":"run-finished","status":"interrupted"}"#).unwrap();
        assert_eq!(event, RunEvent::RunFinished { status: RunStatus::Interrupted });
    }

    #[test]
    fn test_failure_outcomes() {
        assert!(TestOutcome::Failed.is_failure());
        assert!(TestOutcome::TimedOut.is_failure());
        assert!(!TestOutcome::Passed.is_failure());
        assert!(!TestOutcome::Skipped.is_failure());
    }

    #[tokio::test]
    async fn test_forward_ndjson_skips_noise() {
        let input = concat!(
            "{\"type\":\"run-started\"}\n",
            "Running 3 tests using 1 worker\n",
            "\n",
            "{\"type\":\"test-finished\",\"project\":\"alpha\",\"title\":\"t1\",\"outcome\":\"passed\",\"duration_ms\":5}\n",
            "{\"type\":\"run-finished\",\"status\":\"passed\"}\n",
        );
        let (tx, mut rx) = mpsc::unbounded_channel();

        let forwarded = forward_ndjson(input.as_bytes(), tx).await.unwrap();
        assert_eq!(forwarded, 3);

        assert_eq!(rx.recv().await, Some(RunEvent::RunStarted));
        assert!(matches!(rx.recv().await, Some(RunEvent::TestFinished { .. })));
        assert!(matches!(rx.recv().await, Some(RunEvent::RunFinished { .. })));
        assert_eq!(rx.recv().await, None);
    }
}
