//! Scope selection and the per-object scan loop.

use std::collections::BTreeMap;

use gameready_scene::{CollectionId, ObjectId, Scene};

use crate::collection::{aggregate_utilization, CollectionBlock};
use crate::context::CheckContext;
use crate::error::ScanError;
use crate::registry::CheckRegistry;
use crate::report::{Entry, FindingCounts, ObjectReport, ScanReport};
use crate::settings::{ScanScope, Settings};
use crate::summary::verdict;

const HIGH_POLY_SUFFIX: &str = "_high";
const HIGH_POLY_COLLECTION: &str = "high poly";

/// Whether an object is a high-poly source: its name ends in `_high` or it
/// sits in a collection named "high poly" (both case-insensitive).
pub fn is_high_poly(scene: &Scene, id: ObjectId) -> bool {
    if scene.object(id).name.to_lowercase().ends_with(HIGH_POLY_SUFFIX) {
        return true;
    }
    scene
        .collections_containing(id)
        .into_iter()
        .any(|c| scene.collection(c).name.eq_ignore_ascii_case(HIGH_POLY_COLLECTION))
}

/// Objects selected for a scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Mesh and armature objects in scope, after exclusion.
    pub objects: Vec<ObjectId>,
    /// Names of excluded high-poly objects.
    pub excluded: Vec<String>,
    /// Target collection in collection scope.
    pub collection: Option<CollectionId>,
}

/// Runs the registered checks over the objects a [`Settings`] selects.
pub struct Scanner {
    registry: CheckRegistry,
    settings: Settings,
}

impl Scanner {
    /// Creates a scanner with every built-in check.
    pub fn new(settings: Settings) -> Self {
        Self::with_registry(settings, CheckRegistry::default_checks())
    }

    /// Creates a scanner with a custom registry.
    pub fn with_registry(settings: Settings, registry: CheckRegistry) -> Self {
        Self { registry, settings }
    }

    /// The scan settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The check registry.
    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Resolves the objects in scope.
    pub fn select(&self, scene: &Scene) -> Result<Selection, ScanError> {
        let mut selection = Selection::default();

        let candidates: Vec<ObjectId> = match self.settings.scan_scope {
            ScanScope::SingleObject => {
                let id = match &self.settings.target_object {
                    Some(name) => scene
                        .find_object(name)
                        .ok_or_else(|| ScanError::UnknownObject(name.clone()))?,
                    None => scene.active_object.ok_or(ScanError::NoActiveObject)?,
                };
                let object = scene.object(id);
                if !object.is_mesh_or_armature() {
                    return Err(ScanError::UnsupportedObject {
                        name: object.name.clone(),
                        kind: object.data.type_name().to_string(),
                    });
                }
                vec![id]
            }
            ScanScope::Collection => {
                let name = self
                    .settings
                    .target_collection
                    .as_deref()
                    .ok_or(ScanError::MissingCollection)?;
                let id = scene
                    .find_collection(name)
                    .ok_or_else(|| ScanError::UnknownCollection(name.to_string()))?;
                selection.collection = Some(id);
                scene
                    .collection_objects_recursive(id)
                    .into_iter()
                    .filter(|o| scene.object(*o).is_mesh_or_armature())
                    .collect()
            }
            ScanScope::WholeScene => scene
                .objects_with_ids()
                .filter(|(_, o)| o.is_mesh_or_armature())
                .map(|(id, _)| id)
                .collect(),
        };

        for id in candidates {
            if self.settings.exclude_high_poly && is_high_poly(scene, id) {
                tracing::debug!(object = %scene.object(id).name, "excluding high-poly object");
                selection.excluded.push(scene.object(id).name.clone());
            } else {
                selection.objects.push(id);
            }
        }

        if selection.objects.is_empty() {
            return Err(ScanError::NothingToScan);
        }
        Ok(selection)
    }

    /// Scans the scene.
    pub fn scan(&self, scene: &Scene) -> Result<ScanReport, ScanError> {
        self.scan_with_host_findings(scene, &BTreeMap::new())
    }

    /// Scans the scene, appending host-supplied findings to the named objects.
    ///
    /// Host findings are raw JSON values; entries that are not well-formed
    /// findings are kept as malformed items instead of failing the scan.
    pub fn scan_with_host_findings(
        &self,
        scene: &Scene,
        host_findings: &BTreeMap<String, Vec<serde_json::Value>>,
    ) -> Result<ScanReport, ScanError> {
        scene.validate()?;
        let selection = self.select(scene)?;
        let settings = &self.settings;

        let meshes: Vec<ObjectId> = selection
            .objects
            .iter()
            .copied()
            .filter(|id| scene.object(*id).as_mesh().is_some())
            .collect();

        let multi_object = meshes.len() > 1
            && settings.scan_scope != ScanScope::SingleObject
            && !settings.asset_is_modular_collection;

        tracing::info!(
            scope = settings.scan_scope.as_str(),
            objects = meshes.len(),
            excluded = selection.excluded.len(),
            multi_object,
            "starting scan"
        );

        let mut objects = Vec::with_capacity(meshes.len());
        for id in &meshes {
            let Some(ctx) = CheckContext::new(scene, *id, settings, multi_object) else {
                continue;
            };
            let mut report = ObjectReport::new(&ctx.object.name);
            for finding in self.registry.run(&ctx) {
                report.add_finding(finding);
            }
            if let Some(extra) = host_findings.get(&ctx.object.name) {
                for value in extra {
                    report.push(Entry::from_value(value));
                }
            }
            objects.push(report);
        }

        let collection_utilization = match settings.scan_scope {
            ScanScope::SingleObject => None,
            _ => aggregate_utilization(scene, &meshes),
        };

        let mut collections = Vec::new();
        let (scope_label, asset_name) = match selection.collection {
            Some(id) => {
                let collection = scene.collection(id);
                collections.push(CollectionBlock::check(scene, id, settings));
                for child in &collection.children {
                    collections.push(CollectionBlock::check(scene, *child, settings));
                }
                let label = if collection.children.is_empty() {
                    "Single Collection Scan"
                } else {
                    "Nested Collection Scan"
                };
                (label, collection.name.clone())
            }
            None if settings.scan_scope == ScanScope::WholeScene => {
                ("Full File Scan", "File".to_string())
            }
            None => {
                let name = objects
                    .first()
                    .map(|o| o.name.clone())
                    .unwrap_or_else(|| "File".to_string());
                ("Active Object Scan", name)
            }
        };

        let mut summary = FindingCounts::default();
        for object in &objects {
            let counts = object.counts();
            summary.error_count += counts.error_count;
            summary.warning_count += counts.warning_count;
            summary.info_count += counts.info_count;
        }

        let passed = verdict(&objects, multi_object);
        tracing::info!(passed, errors = summary.error_count, "scan finished");

        Ok(ScanReport {
            passed,
            scope_label: scope_label.to_string(),
            hero_asset: settings.is_hero_asset,
            multi_object,
            objects,
            excluded: selection.excluded,
            collection_utilization,
            asset_name,
            collections,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameready_scene::{Armature, Bone, Collection, Mesh, Object, ObjectData};

    fn quad() -> Mesh {
        Mesh::from_polygons(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            vec![vec![0, 1, 2, 3]],
        )
    }

    fn scene_with(names: &[&str]) -> (Scene, Vec<ObjectId>) {
        let mut scene = Scene::new();
        let ids = names
            .iter()
            .map(|n| scene.add_object(Object::mesh(*n, quad())))
            .collect();
        (scene, ids)
    }

    #[test]
    fn test_single_scope_requires_active_object() {
        let (scene, _) = scene_with(&["Cube"]);
        let scanner = Scanner::new(Settings::default());
        assert!(matches!(scanner.select(&scene), Err(ScanError::NoActiveObject)));
    }

    #[test]
    fn test_single_scope_rejects_unsupported_type() {
        let mut scene = Scene::new();
        let id = scene.add_object(Object::new("Camera", ObjectData::Other { kind: "CAMERA".into() }));
        scene.active_object = Some(id);
        let scanner = Scanner::new(Settings::default());
        match scanner.select(&scene) {
            Err(ScanError::UnsupportedObject { name, kind }) => {
                assert_eq!(name, "Camera");
                assert_eq!(kind, "CAMERA");
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[test]
    fn test_named_object_overrides_active() {
        let (mut scene, ids) = scene_with(&["Cube", "Rock"]);
        scene.active_object = Some(ids[0]);
        let settings = Settings {
            target_object: Some("Rock".into()),
            ..Settings::default()
        };
        let selection = Scanner::new(settings).select(&scene).unwrap();
        assert_eq!(selection.objects, vec![ids[1]]);
    }

    #[test]
    fn test_high_poly_exclusion() {
        let (mut scene, ids) = scene_with(&["Rock_high", "Rock_low", "Sculpt"]);
        let high = scene.add_collection(Collection::new("High Poly"));
        scene.link_object(high, ids[2]);

        assert!(is_high_poly(&scene, ids[0]));
        assert!(!is_high_poly(&scene, ids[1]));
        assert!(is_high_poly(&scene, ids[2]));

        let settings = Settings {
            scan_scope: ScanScope::WholeScene,
            ..Settings::default()
        };
        let selection = Scanner::new(settings.clone()).select(&scene).unwrap();
        assert_eq!(selection.objects, vec![ids[1]]);
        assert_eq!(selection.excluded, vec!["Rock_high", "Sculpt"]);

        let keep_all = Settings {
            exclude_high_poly: false,
            ..settings
        };
        assert_eq!(Scanner::new(keep_all).select(&scene).unwrap().objects.len(), 3);
    }

    #[test]
    fn test_everything_excluded_is_an_error() {
        let (mut scene, ids) = scene_with(&["Rock_high"]);
        scene.active_object = Some(ids[0]);
        let scanner = Scanner::new(Settings::default());
        assert!(matches!(scanner.scan(&scene), Err(ScanError::NothingToScan)));
    }

    #[test]
    fn test_collection_scope_errors() {
        let (scene, _) = scene_with(&["Cube"]);
        let settings = Settings {
            scan_scope: ScanScope::Collection,
            ..Settings::default()
        };
        assert!(matches!(
            Scanner::new(settings.clone()).select(&scene),
            Err(ScanError::MissingCollection)
        ));

        let named = Settings {
            target_collection: Some("Props".into()),
            ..settings
        };
        assert!(matches!(
            Scanner::new(named).select(&scene),
            Err(ScanError::UnknownCollection(name)) if name == "Props"
        ));
    }

    #[test]
    fn test_multi_object_mode() {
        let (mut scene, ids) = scene_with(&["A", "B"]);
        let rig = scene.add_object(Object::armature("Rig", Armature::from_bones(vec![Bone::new("DEF-root", None)])));
        let props = scene.add_collection(Collection::new("Props"));
        scene.link_object(props, ids[0]);
        scene.link_object(props, ids[1]);
        scene.link_object(props, rig);

        let settings = Settings {
            scan_scope: ScanScope::Collection,
            target_collection: Some("Props".into()),
            ..Settings::default()
        };
        let report = Scanner::new(settings.clone()).scan(&scene).unwrap();
        assert!(report.multi_object);
        assert_eq!(report.objects.len(), 2);
        assert_eq!(report.scope_label, "Single Collection Scan");
        assert_eq!(report.asset_name, "Props");
        assert_eq!(report.collections.len(), 1);

        let modular = Settings {
            asset_is_modular_collection: true,
            ..settings
        };
        assert!(!Scanner::new(modular).scan(&scene).unwrap().multi_object);
    }

    #[test]
    fn test_host_findings_are_appended() {
        let (mut scene, ids) = scene_with(&["Cube"]);
        scene.active_object = Some(ids[0]);
        let mut host = BTreeMap::new();
        host.insert(
            "Cube".to_string(),
            vec![
                serde_json::json!(["Custom Check", "ok", "INFO"]),
                serde_json::json!("broken"),
            ],
        );
        let report = Scanner::new(Settings::default())
            .scan_with_host_findings(&scene, &host)
            .unwrap();
        let cube = report.object("Cube").unwrap();
        assert!(cube.find("Custom Check").is_some());
        assert!(cube
            .section(crate::report::Section::Other)
            .iter()
            .any(|e| matches!(e, Entry::Malformed(_))));
    }
}
