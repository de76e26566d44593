use gameready_scene::{Mesh, Object, ObjectId, Scene};

use super::topology::{transform_finding, TopologyDefects};
use super::*;
use crate::context::CheckContext;
use crate::report::{Finding, Severity};
use crate::settings::Settings;

const CUBE_POSITIONS: [[f64; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 1.0],
    [0.0, 1.0, 1.0],
];

/// Closed unit cube with outward-facing winding.
fn cube_faces() -> Vec<Vec<usize>> {
    vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![2, 3, 7, 6],
        vec![0, 4, 7, 3],
        vec![1, 2, 6, 5],
    ]
}

fn cube() -> Mesh {
    Mesh::from_polygons(&CUBE_POSITIONS, cube_faces())
}

fn scene_with(mesh: Mesh) -> (Scene, ObjectId) {
    let mut scene = Scene::new();
    let id = scene.add_object(Object::mesh("Mesh", mesh));
    (scene, id)
}

fn run(check: &dyn Check, scene: &Scene, id: ObjectId, settings: &Settings) -> Vec<Finding> {
    let ctx = CheckContext::new(scene, id, settings, false).unwrap();
    check.check(&ctx)
}

fn value_of<'a>(findings: &'a [Finding], label: &str) -> &'a Finding {
    findings
        .iter()
        .find(|f| f.label == label)
        .unwrap_or_else(|| panic!("no finding labelled {}", label))
}

// ========================================================================
// Counts and topology
// ========================================================================

#[test]
fn test_empty_mesh_counts_are_zero() {
    let (scene, id) = scene_with(Mesh::default());
    let settings = Settings::default();

    let counts = run(&CountsCheck, &scene, id, &settings);
    assert_eq!(counts.len(), 3);
    assert!(counts.iter().all(|f| f.value == "0" && f.severity == Severity::Info));

    let topology = run(&TopologyCheck, &scene, id, &settings);
    assert!(topology.iter().all(|f| f.severity != Severity::Error));
}

#[test]
fn test_cube_counts_and_clean_topology() {
    let (scene, id) = scene_with(cube());
    let settings = Settings::default();

    let counts = run(&CountsCheck, &scene, id, &settings);
    assert_eq!(value_of(&counts, "Vertex Count").value, "8");
    assert_eq!(value_of(&counts, "Face Count").value, "6");
    assert_eq!(value_of(&counts, "Edge Count").value, "12");

    let topology = run(&TopologyCheck, &scene, id, &settings);
    assert!(topology.iter().all(|f| f.value == "0" && f.severity == Severity::Info));
}

#[test]
fn test_ngon_and_stray_vertex() {
    let positions = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.5, 1.0, 0.0],
        [0.5, 1.5, 0.0],
        [-0.5, 1.0, 0.0],
        [5.0, 5.0, 5.0],
    ];
    let mesh = Mesh::from_polygons(&positions, vec![vec![0, 1, 2, 3, 4]]);
    let defects = TopologyDefects::of(&mesh);
    assert_eq!(defects.ngons, 1);
    assert_eq!(defects.stray_vertices, 1);
    assert_eq!(defects.non_manifold_edges, 5);

    let (scene, id) = scene_with(mesh);
    let findings = run(&TopologyCheck, &scene, id, &Settings::default());
    assert_eq!(value_of(&findings, "N-gons").severity, Severity::Error);
    assert_eq!(value_of(&findings, "Non-Manifold Edges").severity, Severity::Warning);
    assert_eq!(value_of(&findings, "Stray Vertices").severity, Severity::Error);
}

// ========================================================================
// Transforms
// ========================================================================

#[test]
fn test_transform_rounding() {
    let mut object = Object::mesh("Cube", cube());
    object.transform.scale = [1.0004, 1.0, 0.9996];
    object.transform.rotation_euler = [0.0004, 0.0, 0.0];
    assert!(TransformStatus::of(&object).is_applied());

    object.transform.scale[0] = 1.01;
    let status = TransformStatus::of(&object);
    assert!(!status.scale);
    assert!(status.rotation);
}

#[test]
fn test_transform_finding_is_idempotent() {
    let mut object = Object::mesh("Cube", cube());
    object.transform.rotation_euler = [0.5, 0.0, 0.0];
    object.transform.location = [1.0, 0.0, 0.0];
    let settings = Settings::default();

    let first = transform_finding(&object, &settings);
    let second = transform_finding(&object, &settings);
    assert_eq!(first, second);
    assert_eq!(first.0, "Unapplied Transforms");
    assert_eq!(first.1, "Rotation, Location");
    assert_eq!(first.2, Severity::Error);
}

#[test]
fn test_parented_object_location_is_applied() {
    let mut scene = Scene::new();
    let root = scene.add_object(Object::mesh("Root", cube()));
    let mut child = Object::mesh("Child", cube());
    child.parent = Some(root);
    child.transform.location = [3.0, 0.0, 0.0];
    let child = scene.add_object(child);

    let findings = run(&TransformsCheck, &scene, child, &Settings::default());
    assert_eq!(findings[0].label, "Transforms Applied");
    assert_eq!(findings[0].severity, Severity::Info);
}

#[test]
fn test_modular_location_downgrade() {
    let mut object = Object::mesh("Wall", cube());
    object.transform.location = [4.0, 0.0, 0.0];
    let modular = Settings {
        asset_is_modular_collection: true,
        ..Settings::default()
    };

    let (_, value, severity) = transform_finding(&object, &modular);
    assert_eq!(value, "Location");
    assert_eq!(severity, Severity::Warning);

    object.transform.scale = [2.0, 2.0, 2.0];
    let (_, value, severity) = transform_finding(&object, &modular);
    assert_eq!(value, "Scale");
    assert_eq!(severity, Severity::Error);
}

// ========================================================================
// Duplicate vertices
// ========================================================================

#[test]
fn test_duplicate_pair_is_counted_once() {
    let positions = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.00005, 0.0],
        [0.0, 1.0, 0.0],
    ];
    assert_eq!(count_duplicate_vertices(&positions, 1e-4), 2);

    let mesh = Mesh::from_polygons(&positions, vec![vec![0, 1, 3], vec![2, 3, 1]]);
    let (scene, id) = scene_with(mesh);
    let findings = run(&DuplicateVerticesCheck, &scene, id, &Settings::default());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].value, "1 within 0.0001m");
    assert_eq!(findings[0].severity, Severity::Error);
}

#[test]
fn test_vertices_outside_threshold_are_distinct() {
    let positions = [[0.0, 0.0, 0.0], [0.0002, 0.0, 0.0], [0.0, 0.0, 0.0002]];
    assert_eq!(count_duplicate_vertices(&positions, 1e-4), 0);

    let (scene, id) = scene_with(cube());
    let findings = run(&DuplicateVerticesCheck, &scene, id, &Settings::default());
    assert_eq!(findings[0].value, "None found");
    assert_eq!(findings[0].severity, Severity::Info);
}

#[test]
fn test_duplicates_across_cell_boundaries() {
    // Straddles a spatial-hash cell edge.
    let positions = [[0.000199, 0.0, 0.0], [0.000201, 0.0, 0.0]];
    assert_eq!(count_duplicate_vertices(&positions, 1e-4), 2);
}

// ========================================================================
// Flipped normals
// ========================================================================

#[test]
fn test_consistent_cube_has_no_flipped_faces() {
    assert!(find_flipped_faces(&cube(), 0.999).is_empty());

    let (scene, id) = scene_with(cube());
    let findings = run(&FlippedNormalsCheck, &scene, id, &Settings::default());
    assert_eq!(findings[0].value, "No flipped normals detected");
    assert_eq!(findings[0].severity, Severity::Info);
}

#[test]
fn test_single_flipped_face_is_found() {
    let mut faces = cube_faces();
    faces[1].reverse();
    let mesh = Mesh::from_polygons(&CUBE_POSITIONS, faces);
    assert_eq!(find_flipped_faces(&mesh, 0.999), vec![1]);

    let (scene, id) = scene_with(mesh);
    let findings = run(&FlippedNormalsCheck, &scene, id, &Settings::default());
    assert_eq!(findings[0].value, "1 faces appear flipped");
    assert_eq!(findings[0].severity, Severity::Error);
}

#[test]
fn test_inside_out_cube_is_fully_flipped() {
    let faces: Vec<Vec<usize>> = cube_faces()
        .into_iter()
        .map(|mut f| {
            f.reverse();
            f
        })
        .collect();
    let mesh = Mesh::from_polygons(&CUBE_POSITIONS, faces);
    assert_eq!(find_flipped_faces(&mesh, 0.999).len(), 6);
}

#[test]
fn test_empty_mesh_has_no_flipped_faces() {
    assert!(find_flipped_faces(&Mesh::default(), 0.999).is_empty());
}

#[test]
fn test_all_checks_order() {
    let ids: Vec<_> = all_checks().iter().map(|c| c.id()).collect();
    assert_eq!(
        ids,
        vec![
            "geometry/counts",
            "geometry/topology",
            "geometry/transforms",
            "geometry/flipped-normals",
            "geometry/duplicate-vertices",
        ]
    );
}
