//! Test projects of the KayTee ecosystem
//!
//! Mirrors the project list in `playwright.config.ts`: one project per
//! application, plus a mobile viewport project that runs `@mobile` tests
//! from every app.

use serde::Serialize;

use crate::config::DEFAULT_BROWSER;

#[derive(Debug, Clone, Serialize)]
pub struct ProjectDefinition {
    /// Playwright project name
    pub name: &'static str,

    /// What the project exercises
    pub description: &'static str,

    /// Directory holding the project's specs
    pub test_dir: &'static str,

    /// Environment variable overriding the base URL
    pub base_url_env: &'static str,

    /// Base URL used when the variable is unset
    pub default_base_url: &'static str,

    /// Playwright device descriptor
    pub device: &'static str,

    pub browser: &'static str,

    /// Only tests matching this pattern run in the project
    pub grep: Option<&'static str>,
}

impl ProjectDefinition {
    /// Base URL after applying the environment override
    pub fn resolve_base_url<F>(&self, lookup: F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(self.base_url_env)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.default_base_url.to_string())
    }
}

const PROJECTS: &[ProjectDefinition] = &[
    ProjectDefinition {
        name: "kaytee-tropical",
        description: "Business dashboard",
        test_dir: "apps/kaytee-tropical/tests",
        base_url_env: "KAYTEE_TROPICAL_URL",
        default_base_url: "https://dev.kayteetropical.com",
        device: "Desktop Chrome",
        browser: DEFAULT_BROWSER,
        grep: None,
    },
    ProjectDefinition {
        name: "quality-metrics",
        description: "QA metrics dashboard",
        test_dir: "apps/quality-metrics/tests",
        base_url_env: "QUALITY_METRICS_URL",
        default_base_url: "https://qa.khannara.dev",
        device: "Desktop Chrome",
        browser: DEFAULT_BROWSER,
        grep: None,
    },
    ProjectDefinition {
        name: "digital-portfolio",
        description: "Portfolio site",
        test_dir: "apps/digital-portfolio/tests",
        base_url_env: "PORTFOLIO_URL",
        default_base_url: "https://khannara.dev",
        device: "Desktop Chrome",
        browser: DEFAULT_BROWSER,
        grep: None,
    },
    ProjectDefinition {
        name: "kaytee-hub",
        description: "Operations hub",
        test_dir: "apps/kaytee-hub/tests",
        base_url_env: "KAYTEE_HUB_URL",
        default_base_url: "https://hub.khannara.dev",
        device: "Desktop Chrome",
        browser: DEFAULT_BROWSER,
        grep: None,
    },
    ProjectDefinition {
        name: "mobile-chrome",
        description: "Mobile viewport checks across all apps",
        test_dir: "apps",
        base_url_env: "BASE_URL",
        default_base_url: "http://localhost:3000",
        device: "Pixel 5",
        browser: DEFAULT_BROWSER,
        grep: Some("@mobile"),
    },
];

/// Known test projects
#[derive(Debug, Clone)]
pub struct ProjectCatalog {
    projects: Vec<ProjectDefinition>,
}

impl Default for ProjectCatalog {
    fn default() -> Self {
        Self::default_catalog()
    }
}

impl ProjectCatalog {
    pub fn default_catalog() -> Self {
        Self {
            projects: PROJECTS.to_vec(),
        }
    }

    pub fn empty() -> Self {
        Self { projects: Vec::new() }
    }

    pub fn get(&self, name: &str) -> Option<&ProjectDefinition> {
        self.projects.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProjectDefinition> {
        self.projects.iter()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Browser for a project, if the project is known
    pub fn browser_for(&self, name: &str) -> Option<&'static str> {
        self.get(name).map(|p| p.browser)
    }
}
