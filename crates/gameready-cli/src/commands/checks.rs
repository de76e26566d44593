//! Checks command implementation
//!
//! Lists the registered checks with their section and worst severity.

use anyhow::{Context, Result};
use colored::Colorize;
use gameready_lint::{CheckMetadata, CheckRegistry, Severity};
use std::process::ExitCode;

/// Run the checks command.
pub fn run(json: bool) -> Result<ExitCode> {
    let metadata = CheckRegistry::default_checks().check_metadata();

    if json {
        let text =
            serde_json::to_string_pretty(&metadata).context("Failed to serialize check list")?;
        println!("{}", text);
    } else {
        print_text_output(&metadata);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_text_output(metadata: &[CheckMetadata]) {
    println!("{} {}", "Registered checks:".cyan().bold(), metadata.len());
    let mut section = None;
    for check in metadata {
        if section != Some(check.section) {
            println!("\n{}", check.section.name().bold());
            section = Some(check.section);
        }
        let severity = match check.severity {
            Severity::Error => check.severity.as_str().red(),
            Severity::Warning => check.severity.as_str().yellow(),
            Severity::Info => check.severity.as_str().blue(),
        };
        println!(
            "  {:<28} {:<7} {}",
            check.id.cyan(),
            severity,
            check.description.dimmed()
        );
    }
}
