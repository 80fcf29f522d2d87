//! Reporter configuration
//!
//! Everything the aggregator and dispatcher need from the environment is
//! captured here once, so neither of them reads process state directly.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Metrics API used when `METRICS_API_URL` is unset
pub const DEFAULT_API_URL: &str = "https://api.khannara.dev";

/// Browser reported for projects that don't declare one
pub const DEFAULT_BROWSER: &str = "chromium";

const UNKNOWN_VERSION: &str = "unknown";

/// Configuration shared by the aggregator and the upload dispatcher
#[derive(Clone)]
pub struct ReporterConfig {
    /// Base URL of the metrics API (no trailing slash)
    pub api_url: String,

    /// Value of the `X-API-Key` header. Empty disables uploads.
    pub api_key: String,

    /// Browser identifier used when an event doesn't carry one
    pub browser: String,

    /// Playwright version
    pub tool_version: String,

    /// Node.js version
    pub runtime_version: String,

    /// Whether the run happens on a CI agent
    pub ci: bool,

    pub commit_sha: Option<String>,
    pub branch: Option<String>,
    pub run_id: Option<String>,

    /// Per-request timeout for uploads
    pub upload_timeout: Duration,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            browser: DEFAULT_BROWSER.to_string(),
            tool_version: UNKNOWN_VERSION.to_string(),
            runtime_version: UNKNOWN_VERSION.to_string(),
            ci: false,
            commit_sha: None,
            branch: None,
            run_id: None,
            upload_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReporterConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("browser", &self.browser)
            .field("tool_version", &self.tool_version)
            .field("runtime_version", &self.runtime_version)
            .field("ci", &self.ci)
            .field("commit_sha", &self.commit_sha)
            .field("branch", &self.branch)
            .field("run_id", &self.run_id)
            .field("upload_timeout", &self.upload_timeout)
            .finish()
    }
}

impl ReporterConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// CI metadata has a primary name (Azure Pipelines) and a fallback
    /// (GitHub Actions). Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let first = |keys: &[&str]| keys.iter().find_map(|k| get(*k));

        let api_url = get("METRICS_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self {
            api_url: normalize_url(&api_url),
            api_key: get("METRICS_API_KEY").unwrap_or_default(),
            ci: get("CI").is_some(),
            commit_sha: first(&["BUILD_SOURCEVERSION", "GITHUB_SHA"]),
            branch: first(&["BUILD_SOURCEBRANCH", "GITHUB_REF"]),
            run_id: first(&["BUILD_BUILDID", "GITHUB_RUN_ID"]),
            ..Default::default()
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = normalize_url(&url.into());
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    pub fn with_browser(mut self, browser: impl Into<String>) -> Self {
        self.browser = browser.into();
        self
    }

    pub fn with_tool_version(mut self, version: impl Into<String>) -> Self {
        self.tool_version = version.into();
        self
    }

    pub fn with_runtime_version(mut self, version: impl Into<String>) -> Self {
        self.runtime_version = version.into();
        self
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Whether an API key is available for uploads
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn results_url(&self) -> String {
        format!("{}/results", self.api_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.api_url)
    }
}

fn normalize_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Load `.env.local` and then `.env` from `dir`.
///
/// Variables already present in the environment are never overridden, so
/// `.env.local` takes precedence over `.env`. Returns the files that were
/// loaded.
pub fn load_dotenv(dir: &Path) -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    for name in [".env.local", ".env"] {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        match dotenvy::from_path(&path) {
            Ok(()) => {
                debug!("Loaded environment from {}", path.display());
                loaded.push(path);
            }
            Err(e) => warn!("Failed to load {}: {}", path.display(), e),
        }
    }

    loaded
}
