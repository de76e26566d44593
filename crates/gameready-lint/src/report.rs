//! Finding and report types for structured output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::collection::CollectionBlock;
use crate::section::classify_label;

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Informational, never affects the verdict.
    Info,
    /// Likely problems, worth investigating.
    Warning,
    /// Not game-ready; fails the scan.
    Error,
}

impl Severity {
    /// Upper-case name used in report text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INFO" => Ok(Severity::Info),
            "WARNING" | "WARN" => Ok(Severity::Warning),
            "ERROR" => Ok(Severity::Error),
            _ => Err(format!("unknown severity '{}'", s)),
        }
    }
}

/// Report section a finding belongs to.
///
/// The declaration order is the order sections are printed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    Geometry,
    Textures,
    #[serde(rename = "UVs")]
    Uvs,
    Modifiers,
    Rigging,
    Other,
}

impl Section {
    /// The five sections every object detail lists, in print order.
    pub const EXPECTED: [Section; 5] = [
        Section::Geometry,
        Section::Textures,
        Section::Uvs,
        Section::Modifiers,
        Section::Rigging,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            Section::Geometry => "Geometry",
            Section::Textures => "Textures",
            Section::Uvs => "UVs",
            Section::Modifiers => "Modifiers",
            Section::Rigging => "Rigging",
            Section::Other => "Other",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single finding produced by a check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// Identifier of the producing check (e.g. "geometry/topology").
    /// Empty for findings supplied by the host.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub check_id: String,

    /// Section, tagged at creation. `None` means "classify from the label".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,

    /// Short label, e.g. "N-gons".
    pub label: String,

    /// Measured value or detail text.
    pub value: String,

    /// Severity level.
    pub severity: Severity,

    /// What the finding is about when it is not the object itself
    /// (an image name, a map type, a modifier kind).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl Finding {
    /// Creates a finding tagged with its section.
    pub fn new(
        check_id: impl Into<String>,
        section: Section,
        label: impl Into<String>,
        value: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            check_id: check_id.into(),
            section: Some(section),
            label: label.into(),
            value: value.into(),
            severity,
            subject: None,
        }
    }

    /// Creates a finding whose section is inferred from its label.
    pub fn untagged(label: impl Into<String>, value: impl Into<String>, severity: Severity) -> Self {
        Self {
            check_id: String::new(),
            section: None,
            label: label.into(),
            value: value.into(),
            severity,
            subject: None,
        }
    }

    /// Builder method to set the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// The section this finding is reported under.
    pub fn section(&self) -> Section {
        self.section.unwrap_or_else(|| classify_label(&self.label))
    }

    /// Returns true for error-level findings.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// An item in a report section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entry {
    /// A well-formed finding.
    Finding(Finding),
    /// Host data that could not be read as a finding.
    Malformed(String),
}

impl Entry {
    /// Reads a host-supplied finding.
    ///
    /// Accepts a `[label, value, severity]` triple or an object with those
    /// fields. Anything else is kept verbatim as a malformed entry.
    pub fn from_value(value: &serde_json::Value) -> Entry {
        if let Some(items) = value.as_array() {
            if let [label, detail, severity] = items.as_slice() {
                let parsed = severity.as_str().and_then(|s| s.parse::<Severity>().ok());
                if let (Some(label), Some(severity)) = (label.as_str(), parsed) {
                    let detail = match detail {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    return Entry::Finding(Finding::untagged(label, detail, severity));
                }
            }
        } else if value.is_object() {
            if let Ok(finding) = serde_json::from_value::<Finding>(value.clone()) {
                return Entry::Finding(finding);
            }
        }
        Entry::Malformed(value.to_string())
    }

    /// The finding, if well-formed.
    pub fn as_finding(&self) -> Option<&Finding> {
        match self {
            Entry::Finding(f) => Some(f),
            Entry::Malformed(_) => None,
        }
    }

    fn section(&self) -> Section {
        match self {
            Entry::Finding(f) => f.section(),
            Entry::Malformed(_) => Section::Other,
        }
    }
}

/// Counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingCounts {
    /// Number of error-level findings.
    pub error_count: usize,
    /// Number of warning-level findings.
    pub warning_count: usize,
    /// Number of info-level findings.
    pub info_count: usize,
}

impl FindingCounts {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Info => self.info_count += 1,
            Severity::Warning => self.warning_count += 1,
            Severity::Error => self.error_count += 1,
        }
    }
}

/// Findings of one object, bucketed by section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectReport {
    /// Object name.
    pub name: String,
    /// Section buckets; insertion order is preserved within a bucket.
    pub sections: BTreeMap<Section, Vec<Entry>>,
}

impl ObjectReport {
    /// Creates an empty object report.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: BTreeMap::new(),
        }
    }

    /// Buckets an entry by its section.
    pub fn push(&mut self, entry: Entry) {
        self.sections.entry(entry.section()).or_default().push(entry);
    }

    /// Buckets a finding by its section.
    pub fn add_finding(&mut self, finding: Finding) {
        self.push(Entry::Finding(finding));
    }

    /// Entries of one section.
    pub fn section(&self, section: Section) -> &[Entry] {
        self.sections.get(&section).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Well-formed findings of one section.
    pub fn section_findings(&self, section: Section) -> impl Iterator<Item = &Finding> + '_ {
        self.section(section).iter().filter_map(Entry::as_finding)
    }

    /// Every well-formed finding, section by section.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> + '_ {
        self.sections
            .values()
            .flat_map(|entries| entries.iter().filter_map(Entry::as_finding))
    }

    /// First finding with the given label.
    pub fn find(&self, label: &str) -> Option<&Finding> {
        self.findings().find(|f| f.label == label)
    }

    /// Severity counts.
    pub fn counts(&self) -> FindingCounts {
        let mut counts = FindingCounts::default();
        for finding in self.findings() {
            counts.add(finding.severity);
        }
        counts
    }
}

/// Complete result of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// True if the asset is game-ready.
    pub passed: bool,
    /// Human-readable scope ("Active Object Scan", ...).
    pub scope_label: String,
    /// Whether hero-asset policies were applied.
    pub hero_asset: bool,
    /// Whether findings were judged as one multi-object asset.
    pub multi_object: bool,
    /// Per-object findings, in scan order.
    pub objects: Vec<ObjectReport>,
    /// Objects skipped by the high-poly filter.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excluded: Vec<String>,
    /// Aggregate UV utilization over all scanned UV loops (percent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_utilization: Option<f64>,
    /// Name used for the asset in collection-level lines.
    pub asset_name: String,
    /// Collection-level structure blocks (collection scope only).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collections: Vec<CollectionBlock>,
    /// Severity totals over all objects.
    pub summary: FindingCounts,
}

impl ScanReport {
    /// Report of a single object by name.
    pub fn object(&self, name: &str) -> Option<&ObjectReport> {
        self.objects.iter().find(|o| o.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_finding_builder() {
        let finding = Finding::new(
            "texture/resolution",
            Section::Textures,
            "Not power-of-two",
            "1000x1000",
            Severity::Error,
        )
        .with_subject("T_rock_c.png");

        assert_eq!(finding.section(), Section::Textures);
        assert_eq!(finding.subject.as_deref(), Some("T_rock_c.png"));
        assert!(finding.is_error());
    }

    #[test]
    fn test_untagged_finding_is_classified() {
        let finding = Finding::untagged("Vertex Count", "8", Severity::Info);
        assert_eq!(finding.section(), Section::Geometry);
    }

    #[test]
    fn test_severity_ordering_and_parsing() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert!("fatal".parse::<Severity>().is_err());
    }

    #[test]
    fn test_entry_from_value() {
        let ok = Entry::from_value(&json!(["Stray Vertices", "3", "ERROR"]));
        assert_eq!(ok.as_finding().unwrap().section(), Section::Geometry);

        let short = Entry::from_value(&json!(["Stray Vertices", "3"]));
        assert!(matches!(short, Entry::Malformed(_)));

        let bad_severity = Entry::from_value(&json!(["Stray Vertices", "3", "FATAL"]));
        assert!(matches!(bad_severity, Entry::Malformed(_)));

        let object = Entry::from_value(&json!({"label": "Bone Count", "value": "0", "severity": "ERROR"}));
        assert_eq!(object.as_finding().unwrap().section(), Section::Rigging);
    }

    #[test]
    fn test_malformed_entries_go_to_other() {
        let mut report = ObjectReport::new("Cube");
        report.push(Entry::from_value(&json!(42)));
        report.add_finding(Finding::new("geometry/counts", Section::Geometry, "Vertex Count", "8", Severity::Info));
        assert_eq!(report.section(Section::Other).len(), 1);
        assert_eq!(report.section(Section::Geometry).len(), 1);
        assert_eq!(report.counts().info_count, 1);
    }

    #[test]
    fn test_section_order() {
        let mut report = ObjectReport::new("Cube");
        report.add_finding(Finding::new("rig/armature", Section::Rigging, "Rigging Context", "none", Severity::Info));
        report.add_finding(Finding::new("geometry/counts", Section::Geometry, "Vertex Count", "8", Severity::Info));
        let order: Vec<_> = report.sections.keys().copied().collect();
        assert_eq!(order, vec![Section::Geometry, Section::Rigging]);
    }
}
