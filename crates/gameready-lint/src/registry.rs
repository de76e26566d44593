//! Check registry for managing validation checks.

use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};
use crate::rules::{geometry, modifiers, rig, texture, uv, Check};
use std::collections::HashSet;

/// Registry of all available checks.
pub struct CheckRegistry {
    checks: Vec<Box<dyn Check>>,
    disabled_checks: HashSet<String>,
    enabled_only: Option<HashSet<String>>,
}

impl CheckRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            disabled_checks: HashSet::new(),
            enabled_only: None,
        }
    }

    /// Creates a registry with every built-in check, in report order.
    pub fn default_checks() -> Self {
        let mut registry = Self::new();

        for check in geometry::all_checks() {
            registry.register(check);
        }
        for check in modifiers::all_checks() {
            registry.register(check);
        }
        for check in uv::all_checks() {
            registry.register(check);
        }
        for check in texture::all_checks() {
            registry.register(check);
        }
        for check in rig::all_checks() {
            registry.register(check);
        }

        registry
    }

    /// Registers a new check.
    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    /// Disables a check by ID.
    pub fn disable_check(&mut self, check_id: &str) {
        self.disabled_checks.insert(check_id.to_string());
    }

    /// Enables only the specified checks (disables all others).
    pub fn enable_only(&mut self, check_ids: &[&str]) {
        self.enabled_only = Some(check_ids.iter().map(|s| s.to_string()).collect());
    }

    /// Returns all registered checks.
    pub fn checks(&self) -> &[Box<dyn Check>] {
        &self.checks
    }

    /// Returns check metadata for documentation/introspection.
    pub fn check_metadata(&self) -> Vec<CheckMetadata> {
        self.checks
            .iter()
            .map(|c| CheckMetadata {
                id: c.id().to_string(),
                description: c.description().to_string(),
                section: c.section(),
                severity: c.default_severity(),
                enabled: self.is_check_enabled(c.id()),
            })
            .collect()
    }

    /// Returns the number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if no checks are registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Whether a registered check exists with this ID.
    pub fn contains(&self, check_id: &str) -> bool {
        self.checks.iter().any(|c| c.id() == check_id)
    }

    /// Checks if a check is enabled.
    pub fn is_check_enabled(&self, check_id: &str) -> bool {
        if self.disabled_checks.contains(check_id) {
            return false;
        }
        if let Some(ref enabled) = self.enabled_only {
            return enabled.contains(check_id);
        }
        true
    }

    /// Runs every enabled check on one object, in registration order.
    pub fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        for check in &self.checks {
            if !self.is_check_enabled(check.id()) {
                continue;
            }
            let produced = check.check(ctx);
            tracing::debug!(
                object = %ctx.object.name,
                check = check.id(),
                findings = produced.len(),
                "check finished"
            );
            findings.extend(produced);
        }
        findings
    }
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::default_checks()
    }
}

/// Metadata about a check for documentation/introspection.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CheckMetadata {
    /// Check identifier.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Section the check reports under.
    pub section: Section,
    /// Most severe level the check reports.
    pub severity: Severity,
    /// Whether the check runs with the current configuration.
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = CheckRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_default_registry() {
        let registry = CheckRegistry::default_checks();
        // Geometry: 5, Modifiers: 1, UVs: 6, Textures: 5, Rigging: 5
        assert_eq!(registry.len(), 22);
        assert!(registry.contains("uv/texel-density"));
        assert!(registry.contains("modifiers/policy"));
    }

    #[test]
    fn test_check_ids_are_unique() {
        let registry = CheckRegistry::default_checks();
        let ids: HashSet<_> = registry.checks().iter().map(|c| c.id()).collect();
        assert_eq!(ids.len(), registry.len());
    }

    #[test]
    fn test_disable_check() {
        let mut registry = CheckRegistry::new();
        registry.disable_check("geometry/counts");
        assert!(!registry.is_check_enabled("geometry/counts"));
        assert!(registry.is_check_enabled("geometry/topology"));
    }

    #[test]
    fn test_enable_only() {
        let mut registry = CheckRegistry::default_checks();
        registry.enable_only(&["uv/islands", "rig/bones"]);
        assert!(registry.is_check_enabled("uv/islands"));
        assert!(registry.is_check_enabled("rig/bones"));
        assert!(!registry.is_check_enabled("uv/stacked"));

        let enabled: Vec<_> = registry
            .check_metadata()
            .into_iter()
            .filter(|m| m.enabled)
            .map(|m| m.id)
            .collect();
        assert_eq!(enabled, vec!["uv/islands", "rig/bones"]);
    }

    #[test]
    fn test_metadata_sections_match_ids() {
        for meta in CheckRegistry::default_checks().check_metadata() {
            let prefix = meta.id.split('/').next().unwrap_or_default();
            let expected = match prefix {
                "geometry" => Section::Geometry,
                "modifiers" => Section::Modifiers,
                "uv" => Section::Uvs,
                "texture" => Section::Textures,
                "rig" => Section::Rigging,
                other => panic!("unexpected check prefix {}", other),
            };
            assert_eq!(meta.section, expected, "{}", meta.id);
        }
    }
}
