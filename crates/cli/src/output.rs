//! Output formatting for CLI

use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use kaytee_reporter::{DispatchReport, ProjectDefinition, ProjectSummary, UploadStatus};

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// Plain text format
    Plain,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

impl TableDisplay for ProjectSummary {
    fn headers() -> Vec<&'static str> {
        vec!["Project", "Status", "Total", "Passed", "Failed", "Skipped", "Duration"]
    }

    fn row(&self) -> Vec<String> {
        let status = if self.is_failed() {
            format!("✗ {}", self.status.as_str()).red().to_string()
        } else {
            format!("✓ {}", self.status.as_str()).green().to_string()
        };
        vec![
            self.project.clone(),
            status,
            self.total_tests.to_string(),
            self.passed_tests.to_string(),
            self.failed_tests.to_string(),
            self.skipped_tests.to_string(),
            format!("{} ms", self.duration_ms),
        ]
    }
}

impl TableDisplay for ProjectDefinition {
    fn headers() -> Vec<&'static str> {
        vec!["Project", "Description", "Tests", "Base URL", "Device", "Grep"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.name.to_string(),
            self.description.to_string(),
            self.test_dir.to_string(),
            self.resolve_base_url(|k| std::env::var(k).ok()),
            self.device.to_string(),
            self.grep.unwrap_or("-").to_string(),
        ]
    }
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    if items.is_empty() {
        println!("No items found.");
        return;
    }

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
        OutputFormat::Plain => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    println!("---");
                }
                let row = item.row();
                for (header, value) in T::headers().iter().zip(row.iter()) {
                    println!("{}: {}", header, value);
                }
            }
        }
    }
}

/// Print what happened to each upload
pub fn print_dispatch(report: &DispatchReport) {
    match report {
        DispatchReport::Skipped => print_warning("Result upload skipped (METRICS_API_KEY not set)"),
        DispatchReport::Completed(outcomes) if outcomes.is_empty() => {
            print_info("No project results to upload");
        }
        DispatchReport::Completed(outcomes) => {
            for outcome in outcomes {
                match &outcome.status {
                    UploadStatus::Uploaded => {
                        print_success(&format!("Results sent for project: {}", outcome.project));
                    }
                    UploadStatus::Failed(reason) => {
                        print_error(&format!("Failed to send results for {}: {}", outcome.project, reason));
                    }
                }
            }
        }
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}
