//! Best-effort upload of finalized summaries
//!
//! Each project gets exactly one upload attempt. Uploads run concurrently and
//! a failure is recorded against its own project only; nothing here returns
//! an error to the caller, so reporting can never change a test run's verdict.

use futures::future::join_all;
use tracing::{error, info, warn};

use crate::aggregator::FinalizedRun;
use crate::client::MetricsClient;
use crate::config::ReporterConfig;
use crate::payload::ResultPayload;

/// Result of a single project's upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOutcome {
    pub project: String,
    pub status: UploadStatus,
}

impl UploadOutcome {
    pub fn is_uploaded(&self) -> bool {
        self.status == UploadStatus::Uploaded
    }
}

/// What the dispatcher did with a finalized run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReport {
    /// No API key configured; nothing was sent
    Skipped,
    /// One outcome per project, in project order
    Completed(Vec<UploadOutcome>),
}

impl DispatchReport {
    pub fn outcomes(&self) -> &[UploadOutcome] {
        match self {
            DispatchReport::Skipped => &[],
            DispatchReport::Completed(outcomes) => outcomes,
        }
    }

    pub fn uploaded(&self) -> usize {
        self.outcomes().iter().filter(|o| o.is_uploaded()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes().iter().filter(|o| !o.is_uploaded()).count()
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, DispatchReport::Skipped)
    }
}

enum Uploader {
    /// No API key configured
    Disabled,
    Ready(MetricsClient),
    /// The HTTP client could not be built
    Unavailable(String),
}

pub struct Dispatcher {
    uploader: Uploader,
}

impl Dispatcher {
    pub fn new(config: &ReporterConfig) -> Self {
        if !config.has_credentials() {
            return Self { uploader: Uploader::Disabled };
        }

        let uploader = match MetricsClient::new(config) {
            Ok(client) => Uploader::Ready(client),
            Err(e) => {
                error!("Failed to build metrics API client: {}", e);
                Uploader::Unavailable(e.to_string())
            }
        };
        Self { uploader }
    }

    /// Upload every project summary of `run`
    pub async fn dispatch(&self, run: FinalizedRun) -> DispatchReport {
        info!("Test run completed in {}ms", run.elapsed().as_millis());
        info!("Overall status: {}", run.status());

        match &self.uploader {
            Uploader::Disabled => {
                warn!("METRICS_API_KEY not set, skipping result upload");
                DispatchReport::Skipped
            }
            Uploader::Unavailable(reason) => {
                let outcomes = run
                    .summaries()
                    .iter()
                    .map(|summary| {
                        error!(project = %summary.project, "Failed to send results: {}", reason);
                        UploadOutcome {
                            project: summary.project.clone(),
                            status: UploadStatus::Failed(reason.clone()),
                        }
                    })
                    .collect();
                DispatchReport::Completed(outcomes)
            }
            Uploader::Ready(client) => {
                let uploads = run
                    .into_payloads()
                    .into_iter()
                    .map(|payload| upload(client, payload));

                DispatchReport::Completed(join_all(uploads).await)
            }
        }
    }
}

async fn upload(client: &MetricsClient, payload: ResultPayload) -> UploadOutcome {
    let status = match client.post_result(&payload).await {
        Ok(()) => {
            info!(project = %payload.project, "Results sent");
            UploadStatus::Uploaded
        }
        Err(e) => {
            error!(project = %payload.project, "Failed to send results: {}", e);
            UploadStatus::Failed(e.to_string())
        }
    };

    UploadOutcome {
        project: payload.project,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use crate::event::{RunEvent, TestOutcome};

    #[test]
    fn test_report_counts() {
        let report = DispatchReport::Completed(vec![
            UploadOutcome { project: "a".into(), status: UploadStatus::Uploaded },
            UploadOutcome { project: "b".into(), status: UploadStatus::Failed("500".into()) },
        ]);
        assert_eq!(report.uploaded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_skipped());

        assert_eq!(DispatchReport::Skipped.outcomes().len(), 0);
    }

    #[test]
    fn test_uploads_disabled_without_credentials() {
        let dispatcher = Dispatcher::new(&ReporterConfig::default());
        assert!(matches!(dispatcher.uploader, Uploader::Disabled));
    }

    #[tokio::test]
    async fn test_unavailable_client_fails_every_project() {
        let run = aggregate(
            ReporterConfig::default(),
            vec![
                RunEvent::finished("alpha", "t1", TestOutcome::Passed, 1),
                RunEvent::finished("beta", "t2", TestOutcome::Failed, 1),
            ],
        );
        let dispatcher = Dispatcher {
            uploader: Uploader::Unavailable("no TLS backend".to_string()),
        };

        let report = dispatcher.dispatch(run).await;

        assert!(!report.is_skipped());
        assert_eq!(report.failed(), 2);
        assert_eq!(report.outcomes()[0].project, "alpha");
        assert_eq!(report.outcomes()[1].status, UploadStatus::Failed("no TLS backend".to_string()));
    }
}
