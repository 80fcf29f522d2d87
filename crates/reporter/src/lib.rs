//! KayTee E2E result reporting
//!
//! Collects per-test completion events from a Playwright run, folds them into
//! one summary per test project, and uploads each summary to the metrics API
//! once the run is over.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Playwright (JSON report / NDJSON events)                   │
//! │    └── RunEvent { RunStarted, TestFinished, RunFinished }   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator                                                 │
//! │    ├── apply(event)          per-project ProjectSummary     │
//! │    └── finalize() -> FinalizedRun                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Dispatcher                                                 │
//! │    └── dispatch(run) -> DispatchReport                      │
//! │          one POST {METRICS_API_URL}/results per project     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod aggregator;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod event;
pub mod payload;
pub mod playwright;
pub mod project;
pub mod summary;

pub use aggregator::{aggregate, aggregate_channel, Aggregator, FinalizedRun};
pub use client::MetricsClient;
pub use config::{load_dotenv, ReporterConfig};
pub use dispatcher::{DispatchReport, Dispatcher, UploadOutcome, UploadStatus};
pub use error::{ReporterError, ReporterResult};
pub use event::{RunEvent, RunStatus, TestOutcome};
pub use payload::ResultPayload;
pub use playwright::{PlaywrightCommand, PlaywrightReport};
pub use project::{ProjectCatalog, ProjectDefinition};
pub use summary::{ProjectSummary, RunMetadata, SummaryStatus};
