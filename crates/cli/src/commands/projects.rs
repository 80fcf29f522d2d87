//! Project Commands

use kaytee_reporter::{ProjectCatalog, ProjectDefinition};

use crate::output::{print_list, OutputFormat};

pub fn execute(format: OutputFormat) {
    let catalog = ProjectCatalog::default_catalog();
    let projects: Vec<ProjectDefinition> = catalog.iter().cloned().collect();
    print_list(&projects, format);
}
