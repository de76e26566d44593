//! Check trait and domain-specific check modules.

use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};

pub mod geometry;
pub mod modifiers;
pub mod rig;
pub mod texture;
pub mod uv;

/// A check that inspects one mesh object and reports findings.
pub trait Check: Send + Sync {
    /// Unique identifier (e.g., "geometry/topology", "uv/islands").
    fn id(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Section every finding of this check is reported under.
    fn section(&self) -> Section;

    /// Most severe level this check can report.
    fn default_severity(&self) -> Severity;

    /// Run the check, return findings.
    ///
    /// Checks never fail: input they cannot handle becomes an INFO
    /// "not applicable" finding and host read faults become WARNING or
    /// ERROR findings.
    fn check(&self, ctx: &CheckContext) -> Vec<Finding>;

    /// Creates a finding tagged with this check's id and section.
    fn finding(
        &self,
        label: impl Into<String>,
        value: impl Into<String>,
        severity: Severity,
    ) -> Finding
    where
        Self: Sized,
    {
        Finding::new(self.id(), self.section(), label, value, severity)
    }
}
