//! Rigging checks.
//!
//! The armature is the target of the mesh's armature modifier. A mesh without
//! one only gets an INFO finding from `rig/armature`; the other rig checks
//! stay silent.

use gameready_scene::{Armature, Object};
use glob::Pattern;
use std::sync::OnceLock;

use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};
use crate::rules::Check;

/// Bone name prefixes of the deform/control/mechanism naming scheme.
pub const ALLOWED_BONE_PREFIXES: [&str; 5] = ["DEF-", "CTRL-", "MCH-", "VIS-", "TGT-"];

const BLACKLIST_PATTERNS: [&str; 5] = ["Bone*", "Joint*", "Temp*", "Unnamed*", "Helper*"];

static BLACKLIST: OnceLock<Vec<Pattern>> = OnceLock::new();

fn blacklist() -> &'static [Pattern] {
    BLACKLIST.get_or_init(|| {
        BLACKLIST_PATTERNS
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect()
    })
}

/// Whether a bone name matches a default/placeholder pattern (case-sensitive).
pub fn is_blacklisted_bone(name: &str) -> bool {
    blacklist().iter().any(|p| p.matches(name))
}

/// Whether a bone name carries an allowed prefix.
pub fn has_allowed_prefix(name: &str) -> bool {
    ALLOWED_BONE_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Whether a bone name is a plain identifier once its prefix is set aside.
///
/// The name must start with a letter or underscore and continue with
/// letters, digits, underscores or dots. The hyphen of an allowed prefix is
/// accepted.
pub fn is_valid_bone_identifier(name: &str) -> bool {
    let body = ALLOWED_BONE_PREFIXES
        .iter()
        .find_map(|p| name.strip_prefix(p))
        .unwrap_or(name);
    let mut chars = body.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        }
        _ => false,
    }
}

/// The armature object deforming the inspected mesh, if any.
fn linked_armature<'a>(ctx: &CheckContext<'a>) -> Option<(&'a Object, &'a Armature)> {
    let target = ctx.scene.object(ctx.object.armature_target()?);
    target.as_armature().map(|armature| (target, armature))
}

/// Resolves the armature linked by the mesh's armature modifier.
pub struct ArmatureLinkCheck;

impl Check for ArmatureLinkCheck {
    fn id(&self) -> &'static str {
        "rig/armature"
    }

    fn description(&self) -> &'static str {
        "Reports the armature deforming the mesh"
    }

    fn section(&self) -> Section {
        Section::Rigging
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(target_id) = ctx.object.armature_target() else {
            return vec![self.finding("Rigging Context", "No armature linked", Severity::Info)];
        };
        let target = ctx.scene.object(target_id);
        let value = match target.as_armature() {
            Some(armature) => format!("{} ({} bones)", target.name, armature.bones.len()),
            None => format!(
                "Not applicable: '{}' is a {} object, not an armature",
                target.name,
                target.data.type_name()
            ),
        };
        vec![self.finding("Rigging Context", value, Severity::Info)]
    }
}

/// Bone count and naming.
pub struct BoneNamingCheck;

impl Check for BoneNamingCheck {
    fn id(&self) -> &'static str {
        "rig/bones"
    }

    fn description(&self) -> &'static str {
        "Checks bone count, identifier validity, naming prefixes and placeholder names"
    }

    fn section(&self) -> Section {
        Section::Rigging
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some((_, armature)) = linked_armature(ctx) else {
            return vec![];
        };

        let count = armature.bones.len();
        let mut findings = vec![self.finding(
            "Bone Count",
            count.to_string(),
            if count > 0 { Severity::Info } else { Severity::Error },
        )];

        let invalid: Vec<&str> = armature
            .bones
            .iter()
            .map(|b| b.name.as_str())
            .filter(|name| !is_valid_bone_identifier(name))
            .collect();
        findings.push(if invalid.is_empty() {
            self.finding("Bone Naming OK", "True", Severity::Info)
        } else {
            self.finding(
                "Bone Naming OK",
                format!("False ({})", invalid.join(", ")),
                Severity::Error,
            )
        });

        let non_conforming = armature
            .bones
            .iter()
            .filter(|b| !has_allowed_prefix(&b.name))
            .count();
        if non_conforming > 0 {
            findings.push(self.finding(
                "Naming Convention",
                format!(
                    "{} bones not using {}",
                    non_conforming,
                    ALLOWED_BONE_PREFIXES.join("/")
                ),
                Severity::Error,
            ));
        }

        let blacklisted: Vec<&str> = armature
            .bones
            .iter()
            .map(|b| b.name.as_str())
            .filter(|name| is_blacklisted_bone(name))
            .collect();
        if !blacklisted.is_empty() {
            findings.push(self.finding(
                "Blacklisted Bone Names",
                blacklisted.join(", "),
                Severity::Error,
            ));
        }
        findings
    }
}

/// Bones parented to themselves.
pub struct BoneHierarchyCheck;

impl Check for BoneHierarchyCheck {
    fn id(&self) -> &'static str {
        "rig/hierarchy"
    }

    fn description(&self) -> &'static str {
        "Detects bones that are their own parent"
    }

    fn section(&self) -> Section {
        Section::Rigging
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some((_, armature)) = linked_armature(ctx) else {
            return vec![];
        };

        let self_parented: Vec<&str> = armature
            .bones
            .iter()
            .enumerate()
            .filter(|(i, b)| b.parent == Some(*i))
            .map(|(_, b)| b.name.as_str())
            .collect();

        if self_parented.is_empty() {
            vec![self.finding("Hierarchy Clean", "True", Severity::Info)]
        } else {
            vec![self.finding(
                "Hierarchy Clean",
                format!("False (self-parented: {})", self_parented.join(", ")),
                Severity::Error,
            )]
        }
    }
}

/// Vertices with no vertex group.
pub struct SkinWeightsCheck;

impl Check for SkinWeightsCheck {
    fn id(&self) -> &'static str {
        "rig/weights"
    }

    fn description(&self) -> &'static str {
        "Counts vertices without any vertex group assignment"
    }

    fn section(&self) -> Section {
        Section::Rigging
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        if linked_armature(ctx).is_none() {
            return vec![];
        }
        let unassigned = ctx.mesh.vertices.iter().filter(|v| v.groups.is_empty()).count();
        vec![self
            .finding(
                "Unassigned Verts",
                unassigned.to_string(),
                if unassigned == 0 {
                    Severity::Info
                } else {
                    Severity::Error
                },
            )
            .with_subject(&ctx.object.name)]
    }
}

/// Constraints and drivers on the pose.
pub struct PoseLayerCheck;

impl Check for PoseLayerCheck {
    fn id(&self) -> &'static str {
        "rig/pose"
    }

    fn description(&self) -> &'static str {
        "Warns about bone constraints and animation drivers"
    }

    fn section(&self) -> Section {
        Section::Rigging
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some((_, armature)) = linked_armature(ctx) else {
            return vec![];
        };
        let level = |present: bool| {
            if present {
                Severity::Warning
            } else {
                Severity::Info
            }
        };
        let constraints = armature.has_constraints();
        let drivers = armature.driver_count > 0;
        vec![
            self.finding(
                "Constraints Present",
                if constraints { "True" } else { "False" },
                level(constraints),
            ),
            self.finding(
                "Drivers Present",
                if drivers { "True" } else { "False" },
                level(drivers),
            ),
        ]
    }
}

/// Returns all rig checks.
pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(ArmatureLinkCheck),
        Box::new(BoneNamingCheck),
        Box::new(BoneHierarchyCheck),
        Box::new(SkinWeightsCheck),
        Box::new(PoseLayerCheck),
    ]
}
