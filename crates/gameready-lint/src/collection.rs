//! Collection-level structure, transform and UV checks.
//!
//! These run in collection scope on the target collection and on each of its
//! direct children, and are printed as blocks before the per-object detail.

use gameready_scene::{CollectionId, ObjectData, ObjectId, Scene};
use serde::{Deserialize, Serialize};

use crate::report::{Finding, Section, Severity};
use crate::rules::geometry::TransformStatus;
use crate::rules::uv::analysis::UvBounds;
use crate::settings::Settings;

/// Findings about one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionBlock {
    /// Collection name.
    pub name: String,
    /// Findings, labelled with the collection name.
    pub findings: Vec<Finding>,
}

impl CollectionBlock {
    /// Runs the collection checks.
    pub fn check(scene: &Scene, id: CollectionId, settings: &Settings) -> Self {
        let name = scene.collection(id).name.clone();
        let mut findings = structure(scene, id);
        findings.extend(transforms(scene, id));
        findings.extend(uv_utilization(scene, id, settings));
        Self { name, findings }
    }
}

fn finding(check_id: &str, section: Section, label: &str, value: String, severity: Severity) -> Finding {
    Finding::new(check_id, section, label, value, severity)
}

/// Armature presence and nesting.
fn structure(scene: &Scene, id: CollectionId) -> Vec<Finding> {
    let collection = scene.collection(id);
    let mut findings = Vec::new();

    let has_armature = collection
        .objects
        .iter()
        .any(|o| matches!(scene.object(*o).data, ObjectData::Armature(_)));
    if !has_armature {
        findings.push(finding(
            "collection/structure",
            Section::Other,
            &collection.name,
            "No armature present".to_string(),
            Severity::Warning,
        ));
    }

    if !collection.children.is_empty() {
        let names: Vec<&str> = collection
            .children
            .iter()
            .map(|c| scene.collection(*c).name.as_str())
            .collect();
        findings.push(finding(
            "collection/structure",
            Section::Other,
            &collection.name,
            format!("Contains nested collections: {}", names.join(", ")),
            Severity::Info,
        ));
    }
    findings
}

/// Transform status of every mesh and armature, judged on its top-most parent.
fn transforms(scene: &Scene, id: CollectionId) -> Vec<Finding> {
    let name = scene.collection(id).name.as_str();
    let objects: Vec<ObjectId> = scene
        .collection_objects_recursive(id)
        .into_iter()
        .filter(|o| scene.object(*o).is_mesh_or_armature())
        .collect();

    let emit = |value: &str, severity: Severity| {
        finding("collection/transforms", Section::Geometry, name, value.to_string(), severity)
    };

    if objects.is_empty() {
        return vec![emit("No mesh or armature objects to check", Severity::Info)];
    }

    let statuses: Vec<TransformStatus> = objects
        .iter()
        .map(|o| TransformStatus::of(scene.object(scene.top_parent(*o))))
        .collect();

    let summary = |all: bool, ok: &str, bad: &str| {
        if all {
            emit(ok, Severity::Info)
        } else {
            emit(bad, Severity::Warning)
        }
    };

    vec![
        emit(
            &format!("Checked {} objects across nested collections", objects.len()),
            Severity::Info,
        ),
        summary(
            statuses.iter().all(|s| s.scale),
            "All objects have scale applied",
            "Some objects have unapplied scale",
        ),
        summary(
            statuses.iter().all(|s| s.rotation),
            "All objects have rotation applied",
            "Some objects have unapplied rotation",
        ),
        summary(
            statuses.iter().all(|s| s.location),
            "All objects have valid location",
            "At least one object has invalid location",
        ),
    ]
}

/// UV utilization over the active layers of the collection's own meshes.
fn uv_utilization(scene: &Scene, id: CollectionId, settings: &Settings) -> Vec<Finding> {
    let collection = scene.collection(id);
    let utilization = aggregate_utilization(scene, &collection.objects);

    let (value, severity) = match utilization {
        None => ("No UVs found".to_string(), Severity::Warning),
        Some(u) if u >= settings.thresholds.collection_utilization => {
            (format!("{:.2}%", u), Severity::Info)
        }
        Some(u) => (format!("{:.2}%", u), Severity::Warning),
    };
    vec![finding(
        "collection/uv",
        Section::Uvs,
        "UV Space Utilization",
        value,
        severity,
    )]
}

/// Bounding-box utilization over the union of the objects' active UV
/// coordinates. Layers that do not hold one coordinate per loop are
/// unreadable and skipped. `None` when no object contributes coordinates.
pub fn aggregate_utilization(scene: &Scene, objects: &[ObjectId]) -> Option<f64> {
    let coords = objects
        .iter()
        .filter_map(|o| scene.object(*o).as_mesh())
        .filter_map(|mesh| {
            mesh.active_uv()
                .filter(|layer| layer.uvs.len() == mesh.loop_count())
        })
        .flat_map(|layer| layer.uvs.iter());
    UvBounds::of(coords).map(|b| b.utilization())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameready_scene::{Mesh, Object, UvLayer};

    fn quad(uvs: Vec<[f64; 2]>) -> Object {
        let mut mesh = Mesh::from_polygons(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            vec![vec![0, 1, 2, 3]],
        );
        mesh.push_active_uv_layer(UvLayer::new("UVMap", uvs));
        Object::mesh("Quad", mesh)
    }

    #[test]
    fn test_aggregate_utilization_skips_unreadable_layers() {
        let mut scene = Scene::new();
        let readable = scene.add_object(quad(vec![[0.0, 0.0], [0.5, 0.0], [0.5, 0.5], [0.0, 0.5]]));
        let short = scene.add_object(quad(vec![[0.0, 0.0], [1.0, 1.0]]));

        assert_eq!(aggregate_utilization(&scene, &[readable, short]), Some(25.0));
        assert_eq!(aggregate_utilization(&scene, &[short]), None);
    }
}
