//! Armature (skeleton) snapshot.

use serde::{Deserialize, Serialize};

/// A bone. The parent is an index into the owning armature's bone list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bone {
    /// Bone name.
    pub name: String,
    /// Parent bone index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
}

impl Bone {
    /// Creates a bone.
    pub fn new(name: impl Into<String>, parent: Option<usize>) -> Self {
        Self {
            name: name.into(),
            parent,
        }
    }
}

/// Pose-mode counterpart of a bone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoseBone {
    /// Bone name (mirrors the rest bone).
    pub name: String,
    /// Constraint kinds attached to this pose bone.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<String>,
}

/// Armature data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Armature {
    /// Rest bones.
    #[serde(default)]
    pub bones: Vec<Bone>,
    /// Pose bones. Empty means "mirror the rest bones without constraints".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pose_bones: Vec<PoseBone>,
    /// Number of animation drivers on the armature.
    #[serde(default)]
    pub driver_count: usize,
}

impl Armature {
    /// Creates an armature from bones, mirroring them into unconstrained pose bones.
    pub fn from_bones(bones: Vec<Bone>) -> Self {
        let pose_bones = bones
            .iter()
            .map(|b| PoseBone {
                name: b.name.clone(),
                constraints: Vec::new(),
            })
            .collect();
        Self {
            bones,
            pose_bones,
            driver_count: 0,
        }
    }

    /// Whether any pose bone carries a constraint.
    pub fn has_constraints(&self) -> bool {
        self.pose_bones.iter().any(|p| !p.constraints.is_empty())
    }
}
