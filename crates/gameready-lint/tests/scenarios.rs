//! End-to-end scans over small hand-built scenes.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p gameready-lint --test scenarios
//! ```

use std::collections::BTreeMap;

use gameready_lint::{
    render_report, CheckRegistry, Entry, ReportSink, ScanReport, ScanScope, Scanner, Section,
    Settings, Severity, StringSink,
};
use gameready_scene::{
    Collection, Image, Material, Mesh, Modifier, ModifierKind, Node, NodeKind, Object, ObjectId,
    Scene, UvLayer,
};
use pretty_assertions::assert_eq;

fn quad_with_uvs(uvs: [[f64; 2]; 4]) -> Mesh {
    let mut mesh = Mesh::from_polygons(
        &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        vec![vec![0, 1, 2, 3]],
    );
    mesh.push_active_uv_layer(UvLayer::new("UVMap", uvs.to_vec()));
    mesh
}

fn square(min: f64, max: f64) -> [[f64; 2]; 4] {
    [[min, min], [max, min], [max, max], [min, max]]
}

fn entries(report: &ScanReport, object: &str, section: Section) -> Vec<(String, String, Severity)> {
    report
        .object(object)
        .unwrap()
        .section_findings(section)
        .map(|f| (f.label.clone(), f.value.clone(), f.severity))
        .collect()
}

// ============================================================================
// Single object
// ============================================================================

mod single_object {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Empty mesh, no UVs, no armature, no textures, one subdivision modifier.
    fn bare_scene() -> Scene {
        let mut scene = Scene::new();
        let mut object = Object::mesh("Blockout", Mesh::default());
        object
            .modifiers
            .push(Modifier::new("Subdivision", ModifierKind::Subsurf));
        let id = scene.add_object(object);
        scene.active_object = Some(id);
        scene
    }

    #[test]
    fn test_bare_mesh_with_subsurf() {
        let scene = bare_scene();
        let report = Scanner::new(Settings::default()).scan(&scene).unwrap();

        assert!(!report.passed);
        assert_eq!(report.scope_label, "Active Object Scan");
        assert!(!report.multi_object);

        let geometry = entries(&report, "Blockout", Section::Geometry);
        assert_eq!(
            &geometry[..3],
            &[
                ("Vertex Count".to_string(), "0".to_string(), Severity::Info),
                ("Face Count".to_string(), "0".to_string(), Severity::Info),
                ("Edge Count".to_string(), "0".to_string(), Severity::Info),
            ]
        );
        assert!(geometry.iter().all(|(_, _, s)| *s != Severity::Error));

        assert_eq!(
            entries(&report, "Blockout", Section::Modifiers),
            vec![(
                "Modifier: Subdivision".to_string(),
                "Disallowed type: SUBSURF".to_string(),
                Severity::Error
            )]
        );
        assert_eq!(
            entries(&report, "Blockout", Section::Uvs),
            vec![(
                "UV Unwrapped".to_string(),
                "Not applicable: no active UV layer".to_string(),
                Severity::Info
            )]
        );
        assert_eq!(
            entries(&report, "Blockout", Section::Textures),
            vec![(
                "No textures found".to_string(),
                "No image textures in material slots".to_string(),
                Severity::Error
            )]
        );
        assert_eq!(
            entries(&report, "Blockout", Section::Rigging),
            vec![(
                "Rigging Context".to_string(),
                "No armature linked".to_string(),
                Severity::Info
            )]
        );
    }

    #[test]
    fn test_bare_mesh_report_text() {
        let scene = bare_scene();
        let settings = Settings::default();
        let report = Scanner::new(settings.clone()).scan(&scene).unwrap();

        let mut sink = StringSink::new();
        sink.publish(&render_report(&report, &settings)).unwrap();
        let text = sink.text();

        assert!(text.contains("Asset Type: Background"));
        assert!(text.contains("Overall Game-Ready Status: FAIL"));
        assert!(text.contains("OBJECT : Blockout     | [Modifiers (1)], Disallowed type: SUBSURF"));
        assert!(text.contains("OBJECT : Blockout     | [Textures (1)], No textures found"));
        assert!(text.contains("[SUMMARY] Rigging: PASS"));
        assert!(text.contains("ASSET : Modifiers | FAIL (Modifier: Subdivision)"));
    }

    #[test]
    fn test_hero_texture_scenario() {
        let mut scene = Scene::new();
        let image = scene.add_image(Image::packed("T_rock_n.png", 2048, 2048));
        let mut material = Material::new("M_Rock");
        let tex = material.add_node(Node::new("Normal", NodeKind::ImageTexture { image: Some(image) }));
        let normal_map = material.add_node(Node::new("Normal Map", NodeKind::NormalMap));
        let bsdf = material.add_node(Node::new("BSDF", NodeKind::PrincipledBsdf));
        material.link(tex, "Color", normal_map, "Color");
        material.link(normal_map, "Normal", bsdf, "Normal");
        let material = scene.add_material(material);

        let mut object = Object::mesh("Rock", quad_with_uvs(square(0.0, 1.0)));
        object.material_slots.push(Some(material));
        let id = scene.add_object(object);
        scene.active_object = Some(id);

        let settings = Settings {
            is_hero_asset: true,
            strict_naming_mode: true,
            ..Settings::default()
        };
        let report = Scanner::new(settings).scan(&scene).unwrap();
        let textures = entries(&report, "Rock", Section::Textures);

        let naming_errors: Vec<_> = textures
            .iter()
            .filter(|(label, _, severity)| {
                *severity == Severity::Error
                    && (label == "Texture name invalid" || label == "Missing required suffix")
            })
            .collect();
        assert!(naming_errors.is_empty(), "{:?}", naming_errors);
        assert!(textures.contains(&(
            "Resolution OK".to_string(),
            "T_rock_n.png (2048x2048)".to_string(),
            Severity::Info
        )));
        assert!(textures.contains(&("Found Texture Maps".to_string(), "Normal".to_string(), Severity::Info)));
    }

    #[test]
    fn test_duplicate_vertices_reported_as_pairs() {
        let positions = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [1.0, 1.0, 0.00001],
        ];
        let mut scene = Scene::new();
        let mesh = Mesh::from_polygons(&positions, vec![vec![0, 1, 2], vec![0, 3, 1]]);
        let id = scene.add_object(Object::mesh("Shard", mesh));
        scene.active_object = Some(id);

        let report = Scanner::new(Settings::default()).scan(&scene).unwrap();
        let shard = report.object("Shard").unwrap();
        assert_eq!(shard.find("Double Vertices").unwrap().value, "1 within 0.0001m");
    }

    #[test]
    fn test_transform_finding_is_stable_across_scans() {
        let mut scene = Scene::new();
        let mut object = Object::mesh("Crate", quad_with_uvs(square(0.0, 1.0)));
        object.transform.scale = [2.0, 2.0, 2.0];
        let id = scene.add_object(object);
        scene.active_object = Some(id);

        let scanner = Scanner::new(Settings::default());
        let first = scanner.scan(&scene).unwrap();
        let second = scanner.scan(&scene).unwrap();
        assert_eq!(
            first.object("Crate").unwrap().find("Unapplied Transforms"),
            second.object("Crate").unwrap().find("Unapplied Transforms")
        );
    }

    #[test]
    fn test_scene_from_json() {
        let json = r#"{
            "objects": [{
                "name": "Plane",
                "data": {
                    "type": "mesh",
                    "vertices": [
                        {"position": [0, 0, 0]}, {"position": [1, 0, 0]},
                        {"position": [1, 1, 0]}, {"position": [0, 1, 0]}
                    ],
                    "polygons": [{"vertices": [0, 1, 2, 3]}]
                },
                "modifiers": [{"name": "Triangulate", "type": "TRIANGULATE"}]
            }],
            "active_object": 0
        }"#;
        let scene = Scene::from_json(json).unwrap();
        let report = Scanner::new(Settings::default()).scan(&scene).unwrap();
        let plane = report.object("Plane").unwrap();
        assert_eq!(plane.find("Edge Count").unwrap().value, "4");
        assert_eq!(plane.find("Modifiers").unwrap().value, "Only allowed modifiers present");
    }
}

// ============================================================================
// Collections
// ============================================================================

mod collections {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Two quads whose layouts each cover a quarter of UV space but tile it
    /// together.
    fn split_layout_scene() -> (Scene, [ObjectId; 2]) {
        let mut scene = Scene::new();
        let a = scene.add_object(Object::mesh("Left", quad_with_uvs(square(0.0, 0.5))));
        let b = scene.add_object(Object::mesh("Right", quad_with_uvs(square(0.5, 1.0))));
        let props = scene.add_collection(Collection::new("Props"));
        scene.link_object(props, a);
        scene.link_object(props, b);
        (scene, [a, b])
    }

    fn utilization_only(settings: Settings) -> Scanner {
        let mut registry = CheckRegistry::default_checks();
        registry.enable_only(&["uv/utilization"]);
        Scanner::with_registry(settings, registry)
    }

    #[test]
    fn test_utilization_errors_are_advisory_for_collections() {
        let (mut scene, [left, _]) = split_layout_scene();
        let collection = Settings {
            scan_scope: ScanScope::Collection,
            target_collection: Some("Props".into()),
            ..Settings::default()
        };
        let report = utilization_only(collection).scan(&scene).unwrap();
        assert!(report.multi_object);
        assert!(report.passed);
        assert_eq!(report.collection_utilization, Some(100.0));
        assert_eq!(
            entries(&report, "Left", Section::Uvs),
            vec![(
                "UV Space Utilization".to_string(),
                "25.00% (too low)".to_string(),
                Severity::Warning
            )]
        );

        scene.active_object = Some(left);
        let single = utilization_only(Settings::default()).scan(&scene).unwrap();
        assert!(!single.passed);
        assert_eq!(single.collection_utilization, None);
    }

    #[test]
    fn test_modular_collection_is_judged_per_object() {
        let (scene, _) = split_layout_scene();
        let modular = Settings {
            scan_scope: ScanScope::Collection,
            target_collection: Some("Props".into()),
            asset_is_modular_collection: true,
            ..Settings::default()
        };
        let report = utilization_only(modular).scan(&scene).unwrap();
        assert!(!report.multi_object);
        assert!(!report.passed);
    }

    #[test]
    fn test_low_collection_utilization_headline() {
        let mut scene = Scene::new();
        let a = scene.add_object(Object::mesh("A", quad_with_uvs(square(0.0, 0.3))));
        scene.add_object(Object::mesh("B", quad_with_uvs(square(0.1, 0.4))));
        scene.active_object = Some(a);

        let settings = Settings {
            scan_scope: ScanScope::WholeScene,
            ..Settings::default()
        };
        let report = utilization_only(settings.clone()).scan(&scene).unwrap();
        assert_eq!(report.scope_label, "Full File Scan");
        assert_eq!(report.collection_utilization, Some(16.0));

        let text = render_report(&report, &settings);
        assert!(text.contains(
            "ASSET  : File | [UVs], FAIL (UV Space Utilization (Collection: 16.00% (too low)))"
        ));
        assert!(text.contains("Overall Game-Ready Status: PASS"));
    }

    #[test]
    fn test_nested_collection_blocks() {
        let mut scene = Scene::new();
        let body = scene.add_object(Object::mesh("Body", quad_with_uvs(square(0.0, 1.0))));
        let mut wheel = Object::mesh("Wheel", quad_with_uvs(square(0.0, 1.0)));
        wheel.transform.scale = [0.5, 0.5, 0.5];
        let wheel = scene.add_object(wheel);

        let car = scene.add_collection(Collection::new("Car"));
        let parts = scene.add_collection(Collection::new("Parts"));
        scene.link_collection(car, parts);
        scene.link_object(car, body);
        scene.link_object(parts, wheel);

        let settings = Settings {
            scan_scope: ScanScope::Collection,
            target_collection: Some("Car".into()),
            ..Settings::default()
        };
        let report = Scanner::new(settings.clone()).scan(&scene).unwrap();
        assert_eq!(report.scope_label, "Nested Collection Scan");
        assert_eq!(report.objects.len(), 2);

        let names: Vec<&str> = report.collections.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Car", "Parts"]);

        let car_block = &report.collections[0];
        let values: Vec<&str> = car_block.findings.iter().map(|f| f.value.as_str()).collect();
        assert!(values.contains(&"No armature present"));
        assert!(values.contains(&"Contains nested collections: Parts"));
        assert!(values.contains(&"Checked 2 objects across nested collections"));
        assert!(values.contains(&"Some objects have unapplied scale"));

        let text = render_report(&report, &settings);
        assert!(text.contains("[Collection Structure]"));
        assert!(text.contains("[WARNING] Car: No armature present"));
    }

    #[test]
    fn test_high_poly_objects_are_listed() {
        let mut scene = Scene::new();
        let low = scene.add_object(Object::mesh("Rock_low", quad_with_uvs(square(0.0, 1.0))));
        scene.add_object(Object::mesh("Rock_high", quad_with_uvs(square(0.0, 1.0))));
        scene.active_object = Some(low);

        let settings = Settings {
            scan_scope: ScanScope::WholeScene,
            ..Settings::default()
        };
        let report = Scanner::new(settings.clone()).scan(&scene).unwrap();
        assert_eq!(report.excluded, vec!["Rock_high".to_string()]);
        assert!(render_report(&report, &settings).contains("- Rock_high (high-poly)"));
    }
}

// ============================================================================
// Host findings
// ============================================================================

#[test]
fn test_malformed_host_findings_do_not_abort() {
    let mut scene = Scene::new();
    let id = scene.add_object(Object::mesh("Cube", quad_with_uvs(square(0.0, 1.0))));
    scene.active_object = Some(id);

    let mut host = BTreeMap::new();
    host.insert(
        "Cube".to_string(),
        vec![
            serde_json::json!(["Bone Count", "3"]),
            serde_json::json!(["Texel Density Ratio", "1.2", "WARNING"]),
        ],
    );

    let settings = Settings::default();
    let report = Scanner::new(settings.clone())
        .scan_with_host_findings(&scene, &host)
        .unwrap();
    let cube = report.object("Cube").unwrap();

    assert!(matches!(cube.section(Section::Other), [Entry::Malformed(_)]));
    assert!(cube
        .section_findings(Section::Uvs)
        .any(|f| f.label == "Texel Density Ratio"));

    let text = render_report(&report, &settings);
    assert!(text.contains("[Other]"));
    assert!(text.contains("[INFO] Malformed report item: [\"Bone Count\",\"3\"]"));
}
