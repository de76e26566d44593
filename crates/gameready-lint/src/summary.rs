//! Verdict, compact summary and full report text.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use crate::report::{Entry, Finding, ObjectReport, ScanReport, Section, Severity};
use crate::rules::texture::naming::map_label;
use crate::settings::Settings;

/// Width at which asset summary lines wrap.
pub const SUMMARY_WIDTH: usize = 150;

const UTILIZATION_CHECK: &str = "uv/utilization";
const UTILIZATION_LABEL: &str = "UV Space Utilization";
const MISSING_MAP_PREFIX: &str = "Missing Texture Map: ";

fn is_utilization(finding: &Finding) -> bool {
    finding.check_id == UTILIZATION_CHECK
        || (finding.check_id.is_empty() && finding.label.starts_with(UTILIZATION_LABEL))
}

/// Whether the scanned objects pass.
///
/// Any ERROR fails the scan, except UV utilization errors when several
/// objects are judged as one asset: their layouts share the UV space, so
/// only the collection-level utilization is meaningful.
pub fn verdict(objects: &[ObjectReport], multi_object: bool) -> bool {
    !objects.iter().flat_map(ObjectReport::findings).any(|f| {
        f.severity == Severity::Error && !(multi_object && is_utilization(f))
    })
}

/// Wraps `issues` into `ASSET : <category> | <status> (...)` lines.
pub fn asset_summary_lines(category: &str, issues: &[String], status: &str, width: usize) -> Vec<String> {
    let prefix = format!("ASSET : {} | {} (", category, status);
    let indent = " ".repeat(prefix.len());
    let mut lines = Vec::new();
    let mut line = prefix;

    for (i, issue) in issues.iter().enumerate() {
        let separator = if i + 1 < issues.len() { ", " } else { "" };
        let text = format!("{}{}", issue, separator);
        if line.len() + text.len() > width && !line.trim().ends_with('(') {
            lines.push(line.trim_end_matches([',', ' ']).to_string());
            line = format!("{}{}", indent, text);
        } else {
            line.push_str(&text);
        }
    }
    line.push(')');
    lines.push(line);
    lines
}

fn format_error(finding: &Finding) -> String {
    if finding.value.is_empty() || finding.value == "None found" {
        finding.label.clone()
    } else {
        format!("{} ({})", finding.label, finding.value)
    }
}

fn errors(report: &ObjectReport, section: Section) -> Vec<&Finding> {
    report
        .section_findings(section)
        .filter(|f| f.is_error())
        .collect()
}

/// Groups texture errors by reason, listing the affected map types.
fn texture_error_groups(errors: &[&Finding]) -> Vec<String> {
    let mut groups: Vec<(String, BTreeSet<String>)> = Vec::new();
    for finding in errors {
        let (reason, item) = match finding.label.strip_prefix(MISSING_MAP_PREFIX) {
            Some(map) => ("Missing Texture Map".to_string(), Some(map.to_string())),
            None => {
                let reason = match finding.label.rsplit_once(']') {
                    Some((_, rest)) => rest.trim(),
                    None => finding.label.as_str(),
                };
                let reason = reason.trim_end_matches(':').trim().to_string();
                (reason, finding.subject.as_deref().map(map_label))
            }
        };
        let index = match groups.iter().position(|(r, _)| *r == reason) {
            Some(index) => index,
            None => {
                groups.push((reason, BTreeSet::new()));
                groups.len() - 1
            }
        };
        if let Some(item) = item {
            groups[index].1.insert(item);
        }
    }

    groups
        .into_iter()
        .map(|(reason, items)| {
            if items.is_empty() {
                reason
            } else {
                let items: Vec<String> = items.into_iter().collect();
                format!("{}: {}", reason, items.join(", "))
            }
        })
        .collect()
}

fn section_line(report: &ObjectReport, section: Section, skip_missing_maps: bool) -> Option<String> {
    let mut found = errors(report, section);
    if skip_missing_maps {
        found.retain(|f| !f.label.starts_with(MISSING_MAP_PREFIX));
    }
    if found.is_empty() {
        return None;
    }

    let text = match section {
        Section::Modifiers => {
            let mut kinds: Vec<String> = Vec::new();
            for f in &found {
                let kind = f
                    .subject
                    .clone()
                    .unwrap_or_else(|| f.value.trim_start_matches("Disallowed type:").trim().to_string());
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            format!("[{} ({})], Disallowed type: {}", section, found.len(), kinds.join(", "))
        }
        Section::Textures => format!(
            "[{} ({})], {}",
            section,
            found.len(),
            texture_error_groups(&found).join(" | ")
        ),
        _ => {
            let mut items: Vec<String> = found.iter().map(|f| format_error(f)).collect();
            items.sort();
            format!("[{} ({})], {}", section, found.len(), items.join(", "))
        }
    };
    Some(format!("OBJECT : {:<12} | {}", report.name, text))
}

/// Compact summary: one line per object and section listing only errors.
pub fn compact_summary(report: &ScanReport, settings: &Settings) -> String {
    let mut lines = Vec::new();

    if report.multi_object {
        if let Some(utilization) = report.collection_utilization {
            let (target, pass) = settings.utilization_marks();
            let verdict = if utilization >= pass {
                None
            } else if utilization >= target - 5.0 {
                Some(("WARNING", " (suboptimal)"))
            } else {
                Some(("FAIL", " (too low)"))
            };
            if let Some((status, note)) = verdict {
                lines.push(format!(
                    "ASSET  : {} | [UVs], {} (UV Space Utilization (Collection: {:.2}%{}))",
                    report.asset_name, status, utilization, note
                ));
            }
        }

        let mut missing: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for object in &report.objects {
            for f in errors(object, Section::Textures) {
                if let Some(map) = f.label.strip_prefix(MISSING_MAP_PREFIX) {
                    missing.entry(map.to_string()).or_default().push(object.name.clone());
                }
            }
        }
        if !missing.is_empty() {
            let issues: Vec<String> = missing
                .into_iter()
                .map(|(map, objects)| format!("{} ({})", map, objects.join(", ")))
                .collect();
            lines.extend(asset_summary_lines("Textures", &issues, "FAIL", SUMMARY_WIDTH));
        }
    }

    for object in &report.objects {
        for section in object.sections.keys() {
            if report.multi_object && *section == Section::Uvs {
                continue;
            }
            if let Some(line) = section_line(object, *section, report.multi_object) {
                lines.push(line);
            }
        }
    }
    lines.join("\n")
}

fn banner(out: &mut String, title: &str) {
    let rule = "=".repeat(title.len());
    let _ = write!(out, "\n\n{}\n{}\n{}\n\n", rule, title, rule);
}

fn finding_line(finding: &Finding) -> String {
    format!("[{}] {}: {}\n", finding.severity, finding.label, finding.value)
}

/// Per-object detail: every section with its findings and a section verdict.
pub fn object_detail(report: &ObjectReport) -> String {
    let mut out = String::new();
    let header = format!("Object: {}", report.name);
    let rule = "=".repeat(header.len());
    let _ = write!(out, "\n{}\n{}\n{}\n\n", rule, header, rule);

    let mut sections: Vec<Section> = Section::EXPECTED.to_vec();
    if !report.section(Section::Other).is_empty() {
        sections.push(Section::Other);
    }

    for section in sections {
        let name = section.name();
        let _ = write!(out, "\n[{}]\n{}\n\n", name, "-".repeat(name.len() + 2));

        let entries = report.section(section);
        if entries.is_empty() {
            let _ = writeln!(
                out,
                "[INFO] No data returned for {} - check may not apply to this object",
                name
            );
            let _ = writeln!(out, "[SUMMARY] {}: PASS", name);
            continue;
        }

        let mut section_errors = BTreeSet::new();
        let mut has_warnings = false;
        for entry in entries {
            match entry {
                Entry::Finding(f) => {
                    out.push_str(&finding_line(f));
                    match f.severity {
                        Severity::Error => {
                            let label = f.label.strip_prefix(MISSING_MAP_PREFIX).unwrap_or(&f.label);
                            section_errors.insert(label.to_string());
                        }
                        Severity::Warning => has_warnings = true,
                        Severity::Info => {}
                    }
                }
                Entry::Malformed(raw) => {
                    let _ = writeln!(out, "[INFO] Malformed report item: {}", raw);
                }
            }
        }

        if section_errors.is_empty() {
            let suffix = if has_warnings { " - With Warnings" } else { "" };
            let _ = writeln!(out, "[SUMMARY] {}: PASS{}", name, suffix);
        } else {
            let issues: Vec<String> = section_errors.into_iter().collect();
            for line in asset_summary_lines(name, &issues, "FAIL", SUMMARY_WIDTH) {
                let _ = writeln!(out, "{}", line);
            }
        }
    }
    out
}

/// Renders the full report text handed to the report sink.
pub fn render_report(report: &ScanReport, settings: &Settings) -> String {
    let mut out = String::new();
    let title = "Game-Ready Check Report";
    let _ = write!(out, "\n{}\n{}\n\n", title, "=".repeat(title.len()));
    let _ = writeln!(
        out,
        "Asset Type: {}",
        if report.hero_asset { "Hero" } else { "Background" }
    );
    let _ = writeln!(out, "Scope: {}", report.scope_label);

    banner(&mut out, "[FINAL SUMMARY]");
    let status = if report.passed { "PASS" } else { "FAIL" };
    let _ = write!(out, "Overall Game-Ready Status: {}\n\n", status);
    let summary = compact_summary(report, settings);
    if !summary.is_empty() {
        let _ = writeln!(out, "{}", summary);
    }

    if !report.excluded.is_empty() {
        banner(&mut out, "[Excluded Objects]");
        for name in &report.excluded {
            let _ = writeln!(out, "- {} (high-poly)", name);
        }
    }

    if !report.collections.is_empty() {
        banner(&mut out, "[Collection Structure]");
        for (i, block) in report.collections.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let _ = write!(out, "[{}]\n{}\n", block.name, "-".repeat(block.name.len() + 2));
            for finding in &block.findings {
                out.push_str(&finding_line(finding));
            }
        }
    }

    banner(&mut out, "[Per-Object Detail]");
    for object in &report.objects {
        out.push_str(&object_detail(object));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn object(name: &str, findings: Vec<Finding>) -> ObjectReport {
        let mut report = ObjectReport::new(name);
        for finding in findings {
            report.add_finding(finding);
        }
        report
    }

    #[test]
    fn test_asset_summary_line_wraps() {
        let issues: Vec<String> = (0..30).map(|i| format!("Issue number {}", i)).collect();
        let lines = asset_summary_lines("Textures", &issues, "FAIL", 80);
        assert!(lines.len() > 1);
        assert!(lines[0].starts_with("ASSET : Textures | FAIL ("));
        assert!(lines.iter().all(|l| l.len() <= 80));
        assert!(lines.last().unwrap().ends_with(')'));
        assert!(lines[1].starts_with(&" ".repeat("ASSET : Textures | FAIL (".len())));
    }

    #[test]
    fn test_single_line_summary() {
        let lines = asset_summary_lines("Geometry", &["N-gons".to_string()], "FAIL", 150);
        assert_eq!(lines, vec!["ASSET : Geometry | FAIL (N-gons)".to_string()]);
    }

    #[test]
    fn test_verdict_ignores_utilization_in_multi_object_mode() {
        let reports = vec![object(
            "Cube",
            vec![Finding::new(
                "uv/utilization",
                Section::Uvs,
                "UV Space Utilization",
                "12.00% (too low)",
                Severity::Error,
            )],
        )];
        assert!(!verdict(&reports, false));
        assert!(verdict(&reports, true));
    }

    #[test]
    fn test_collection_headline_bands() {
        let report = |utilization: f64| ScanReport {
            passed: true,
            scope_label: "Single Collection Scan".to_string(),
            hero_asset: false,
            multi_object: true,
            objects: vec![],
            excluded: vec![],
            collection_utilization: Some(utilization),
            asset_name: "Props".to_string(),
            collections: vec![],
            summary: crate::report::FindingCounts::default(),
        };
        let defaults = Settings::default();
        assert_eq!(compact_summary(&report(74.0), &defaults), "");

        let strict = Settings {
            strict_naming_mode: true,
            ..Settings::default()
        };
        assert_eq!(
            compact_summary(&report(84.0), &strict),
            "ASSET  : Props | [UVs], FAIL (UV Space Utilization (Collection: 84.00% (too low)))"
        );
        assert_eq!(compact_summary(&report(85.0), &strict), "");
    }

    #[test]
    fn test_compact_texture_groups() {
        let report = object(
            "Rock",
            vec![
                Finding::new("texture/resolution", Section::Textures, "Not power-of-two", "T_rock_c.png (1000x1000)", Severity::Error)
                    .with_subject("T_rock_c.png"),
                Finding::new("texture/resolution", Section::Textures, "Not power-of-two", "T_rock_n.png (1000x1000)", Severity::Error)
                    .with_subject("T_rock_n.png"),
                Finding::new("texture/maps", Section::Textures, "Missing Texture Map: Roughness", "Not found", Severity::Error)
                    .with_subject("Roughness"),
                Finding::new("texture/maps", Section::Textures, "Found Texture Maps", "Diffuse, Normal", Severity::Info),
            ],
        );
        let line = section_line(&report, Section::Textures, false).unwrap();
        assert_eq!(
            line,
            "OBJECT : Rock         | [Textures (3)], Not power-of-two: Diffuse, Normal | Missing Texture Map: Roughness"
        );
    }

    #[test]
    fn test_compact_modifier_line() {
        let report = object(
            "Crate",
            vec![
                Finding::new("modifiers/policy", Section::Modifiers, "Modifier: Subdivision", "Disallowed type: SUBSURF", Severity::Error)
                    .with_subject("SUBSURF"),
                Finding::new("modifiers/policy", Section::Modifiers, "Modifier: Bevel", "Disallowed type: BEVEL", Severity::Error)
                    .with_subject("BEVEL"),
            ],
        );
        assert_eq!(
            section_line(&report, Section::Modifiers, false).unwrap(),
            "OBJECT : Crate        | [Modifiers (2)], Disallowed type: SUBSURF, BEVEL"
        );
    }

    #[test]
    fn test_object_detail_sections() {
        let report = object(
            "Cube",
            vec![
                Finding::new("geometry/counts", Section::Geometry, "Vertex Count", "8", Severity::Info),
                Finding::new("geometry/topology", Section::Geometry, "Non-Manifold Edges", "4", Severity::Warning),
                Finding::new("modifiers/policy", Section::Modifiers, "Modifier: Subdivision", "Disallowed type: SUBSURF", Severity::Error),
            ],
        );
        let text = object_detail(&report);
        assert!(text.contains("[INFO] Vertex Count: 8\n"));
        assert!(text.contains("[SUMMARY] Geometry: PASS - With Warnings\n"));
        assert!(text.contains("[INFO] No data returned for Rigging - check may not apply to this object\n"));
        assert!(text.contains("ASSET : Modifiers | FAIL (Modifier: Subdivision)\n"));
        assert!(!text.contains("[Other]"));
    }
}
