//! Scan command implementation
//!
//! Loads a scene, runs the game-readiness checks and publishes the report.

use anyhow::{bail, Context, Result};
use colored::Colorize;
use gameready_lint::{
    render_report, CheckRegistry, ReportSink, ScanReport, ScanScope, Scanner, Settings, WriterSink,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use crate::input;

/// Options collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Scene snapshot or glTF model to scan.
    pub input: String,
    /// Scope override (`single`, `collection`, `scene`).
    pub scope: Option<String>,
    /// Object to scan instead of the active one.
    pub object: Option<String>,
    /// Collection to scan.
    pub collection: Option<String>,
    /// Keep `*_high` objects in the scan.
    pub include_high_poly: bool,
    /// AAA naming and UV targets.
    pub strict: bool,
    /// Hero asset policies.
    pub hero: bool,
    /// Modular collection policies.
    pub modular: bool,
    /// Settings file applied before the flags.
    pub config: Option<String>,
    /// Check IDs to disable.
    pub disable_checks: Vec<String>,
    /// Comma-separated check IDs to run exclusively.
    pub only_checks: Option<String>,
    /// Host findings file.
    pub findings: Option<String>,
    /// Emit JSON instead of report text.
    pub json: bool,
    /// Report destination (default: stdout).
    pub output: Option<String>,
}

/// JSON output for the scan command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOutput {
    /// Whether the asset is game-ready.
    pub success: bool,
    /// Path to the scanned input.
    pub input: String,
    /// The full scan report.
    pub report: ScanReport,
}

/// Resolves settings from the config file and the flags. Flags win.
pub fn resolve_settings(options: &ScanOptions) -> Result<Settings> {
    let mut settings = match &options.config {
        Some(path) => Settings::from_json_file(Path::new(path))
            .with_context(|| format!("Failed to load settings from {}", path))?,
        None => Settings::default(),
    };

    if let Some(scope) = &options.scope {
        settings.scan_scope = scope
            .parse::<ScanScope>()
            .map_err(|e| anyhow::anyhow!(e))?;
    } else if options.collection.is_some() {
        settings.scan_scope = ScanScope::Collection;
    }
    if let Some(object) = &options.object {
        settings.target_object = Some(object.clone());
    }
    if let Some(collection) = &options.collection {
        settings.target_collection = Some(collection.clone());
    }
    if options.include_high_poly {
        settings.exclude_high_poly = false;
    }
    settings.strict_naming_mode |= options.strict;
    settings.is_hero_asset |= options.hero;
    settings.asset_is_modular_collection |= options.modular;
    Ok(settings)
}

/// Builds the check registry, rejecting unknown check IDs.
pub fn build_registry(options: &ScanOptions) -> Result<CheckRegistry> {
    let mut registry = CheckRegistry::default_checks();

    for check_id in &options.disable_checks {
        if !registry.contains(check_id) {
            bail!("unknown check '{}' (see `gameready checks`)", check_id);
        }
        registry.disable_check(check_id);
    }

    if let Some(only) = &options.only_checks {
        let checks: Vec<&str> = only
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if let Some(unknown) = checks.iter().find(|id| !registry.contains(id)) {
            bail!("unknown check '{}' (see `gameready checks`)", unknown);
        }
        registry.enable_only(&checks);
    }
    Ok(registry)
}

/// Loads the input and runs the scan.
pub fn execute(options: &ScanOptions) -> Result<(ScanReport, Settings)> {
    let settings = resolve_settings(options)?;
    let registry = build_registry(options)?;
    let scene = input::load_scene(Path::new(&options.input))?;
    let host_findings = match &options.findings {
        Some(path) => input::load_host_findings(Path::new(path))?,
        None => BTreeMap::new(),
    };

    let scanner = Scanner::with_registry(settings.clone(), registry);
    let report = scanner
        .scan_with_host_findings(&scene, &host_findings)
        .with_context(|| format!("Failed to scan {}", options.input))?;
    Ok((report, settings))
}

/// Renders the report as text or JSON.
pub fn render(options: &ScanOptions, report: &ScanReport, settings: &Settings) -> Result<String> {
    if options.json {
        let output = ScanOutput {
            success: report.passed,
            input: options.input.clone(),
            report: report.clone(),
        };
        serde_json::to_string_pretty(&output).context("Failed to serialize scan report")
    } else {
        Ok(render_report(report, settings))
    }
}

/// Run the scan command.
///
/// # Returns
/// Exit code: 0 if the asset passed, 1 otherwise
pub fn run(options: &ScanOptions) -> Result<ExitCode> {
    let (report, settings) = execute(options)?;
    let text = render(options, &report, &settings)?;

    match &options.output {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path))?;
            WriterSink::new(std::io::BufWriter::new(file)).publish(&text)?;
        }
        None => WriterSink::new(std::io::stdout().lock()).publish(&text)?,
    }

    if !options.json {
        print_status(&report, options.output.as_deref());
    }

    if report.passed {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}

fn print_status(report: &ScanReport, output: Option<&str>) {
    let summary = format!(
        "{} error(s), {} warning(s), {} info",
        report.summary.error_count, report.summary.warning_count, report.summary.info_count
    );
    let status = if report.passed {
        "PASSED".green().bold()
    } else {
        "FAILED".red().bold()
    };
    match output {
        Some(path) => println!("{} {} ({} written)", status, summary.dimmed(), path),
        None => println!("\n{} {}", status, summary.dimmed()),
    }
}
