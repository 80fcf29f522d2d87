//! Error types for result reporting

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReporterError {
    #[error("API request failed: {status} {body}")]
    Api { status: u16, body: String },

    #[error("Metrics API health check failed after {0} attempts")]
    HealthCheck(usize),

    #[error("Playwright not found. Install with: npm install -D @playwright/test")]
    PlaywrightNotFound,

    #[error(
        "Playwright produced no JSON report (exit code {})",
        .exit_code.map_or_else(|| "none".to_string(), |c| c.to_string())
    )]
    NoReport { exit_code: Option<i32> },

    #[error("Report parse error: {0}")]
    ReportParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type ReporterResult<T> = Result<T, ReporterError>;
