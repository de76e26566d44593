//! Counts, topology defects and transform status.

use gameready_scene::math::round_to;
use gameready_scene::{Mesh, Object, Transform};
use std::collections::HashSet;

use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};
use crate::rules::Check;
use crate::settings::Settings;

/// Vertex, face and edge counts.
pub struct CountsCheck;

impl Check for CountsCheck {
    fn id(&self) -> &'static str {
        "geometry/counts"
    }

    fn description(&self) -> &'static str {
        "Reports vertex, face and edge counts"
    }

    fn section(&self) -> Section {
        Section::Geometry
    }

    fn default_severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let mesh = ctx.mesh;
        vec![
            self.finding("Vertex Count", mesh.vertices.len().to_string(), Severity::Info),
            self.finding("Face Count", mesh.polygons.len().to_string(), Severity::Info),
            self.finding("Edge Count", mesh.edges.len().to_string(), Severity::Info),
        ]
    }
}

/// Topology defect counts of a mesh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TopologyDefects {
    /// Faces with more than four vertices.
    pub ngons: usize,
    /// Edges not bordering exactly two faces.
    pub non_manifold_edges: usize,
    /// Vertices used by no edge.
    pub stray_vertices: usize,
}

impl TopologyDefects {
    /// Counts the defects of a mesh.
    pub fn of(mesh: &Mesh) -> Self {
        let ngons = mesh.polygons.iter().filter(|p| p.vertices.len() > 4).count();

        let face_counts = mesh.edge_face_counts();
        let non_manifold_edges = mesh
            .edges
            .iter()
            .filter(|e| face_counts.get(&e.key()).copied().unwrap_or(0) != 2)
            .count();

        let used: HashSet<usize> = mesh.edges.iter().flat_map(|e| e.vertices).collect();
        let stray_vertices = (0..mesh.vertices.len()).filter(|v| !used.contains(v)).count();

        Self {
            ngons,
            non_manifold_edges,
            stray_vertices,
        }
    }
}

/// N-gons, non-manifold edges and stray vertices.
pub struct TopologyCheck;

impl Check for TopologyCheck {
    fn id(&self) -> &'static str {
        "geometry/topology"
    }

    fn description(&self) -> &'static str {
        "Detects n-gons, non-manifold edges and stray vertices"
    }

    fn section(&self) -> Section {
        Section::Geometry
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let defects = TopologyDefects::of(ctx.mesh);
        let level = |count: usize, severity: Severity| {
            if count > 0 {
                severity
            } else {
                Severity::Info
            }
        };
        vec![
            self.finding(
                "N-gons",
                defects.ngons.to_string(),
                level(defects.ngons, Severity::Error),
            ),
            self.finding(
                "Non-Manifold Edges",
                defects.non_manifold_edges.to_string(),
                level(defects.non_manifold_edges, Severity::Warning),
            ),
            self.finding(
                "Stray Vertices",
                defects.stray_vertices.to_string(),
                level(defects.stray_vertices, Severity::Error),
            ),
        ]
    }
}

/// Which parts of an object's transform are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformStatus {
    pub scale: bool,
    pub rotation: bool,
    pub location: bool,
}

impl TransformStatus {
    /// Scale and rotation are compared after rounding to 3 decimals.
    /// Location counts as applied for parented objects or an exact origin.
    pub fn of(object: &Object) -> Self {
        Self::from_transform(&object.transform, object.parent.is_some())
    }

    /// Status of a bare transform.
    pub fn from_transform(transform: &Transform, has_parent: bool) -> Self {
        Self {
            scale: transform.scale.iter().all(|v| round_to(*v, 3) == 1.0),
            rotation: transform.rotation_euler.iter().all(|v| round_to(*v, 3) == 0.0),
            location: has_parent || transform.location.iter().all(|v| *v == 0.0),
        }
    }

    /// Whether everything is applied.
    pub fn is_applied(&self) -> bool {
        self.scale && self.rotation && self.location
    }
}

/// Evaluates the transform finding for an object.
pub fn transform_finding(object: &Object, settings: &Settings) -> (&'static str, String, Severity) {
    let status = TransformStatus::of(object);
    if status.is_applied() {
        return ("Transforms Applied", "True".to_string(), Severity::Info);
    }

    let mut reasons = Vec::new();
    if !status.scale {
        reasons.push("Scale");
    }
    if !status.rotation {
        reasons.push("Rotation");
    }

    let mut severity = Severity::Error;
    if !status.location {
        if !settings.asset_is_modular_collection {
            reasons.push("Location");
        } else if reasons.is_empty() {
            // Offsets are expected in modular kits.
            reasons.push("Location");
            severity = Severity::Warning;
        }
    }
    ("Unapplied Transforms", reasons.join(", "), severity)
}

/// Scale, rotation and location applied.
pub struct TransformsCheck;

impl Check for TransformsCheck {
    fn id(&self) -> &'static str {
        "geometry/transforms"
    }

    fn description(&self) -> &'static str {
        "Checks that scale, rotation and location are applied"
    }

    fn section(&self) -> Section {
        Section::Geometry
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let (label, value, severity) = transform_finding(ctx.object, ctx.settings);
        vec![self.finding(label, value, severity)]
    }
}
