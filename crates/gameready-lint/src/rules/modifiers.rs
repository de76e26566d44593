//! Modifier stack policy.

use gameready_scene::ModifierKind;

use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};
use crate::rules::Check;

/// Modifier kinds a game-ready object may keep on its stack.
pub const ALLOWED_MODIFIERS: [ModifierKind; 3] = [
    ModifierKind::Armature,
    ModifierKind::Triangulate,
    ModifierKind::WeightedNormal,
];

/// Only export-safe modifiers on the stack.
pub struct ModifierPolicyCheck;

impl Check for ModifierPolicyCheck {
    fn id(&self) -> &'static str {
        "modifiers/policy"
    }

    fn description(&self) -> &'static str {
        "Allows only armature, triangulate and weighted-normal modifiers"
    }

    fn section(&self) -> Section {
        Section::Modifiers
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let modifiers = &ctx.object.modifiers;
        let disallowed: Vec<Finding> = modifiers
            .iter()
            .filter(|m| !ALLOWED_MODIFIERS.contains(&m.kind))
            .map(|m| {
                self.finding(
                    format!("Modifier: {}", m.name),
                    format!("Disallowed type: {}", m.kind),
                    Severity::Error,
                )
                .with_subject(m.kind.as_str())
            })
            .collect();

        if !disallowed.is_empty() {
            disallowed
        } else if modifiers.is_empty() {
            vec![self.finding("Modifiers", "None present", Severity::Info)]
        } else {
            vec![self.finding("Modifiers", "Only allowed modifiers present", Severity::Info)]
        }
    }
}

/// Returns all modifier checks.
pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![Box::new(ModifierPolicyCheck)]
}
