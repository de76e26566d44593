//! Input loading for scene snapshots and glTF models.
//!
//! Dispatches by file extension and always returns a validated [`Scene`].

use anyhow::{bail, Context, Result};
use gameready_scene::Scene;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::gltf_import;

/// Recognized scene snapshot extensions.
pub const JSON_EXTENSIONS: &[&str] = &["json"];

/// Recognized glTF extensions.
pub const GLTF_EXTENSIONS: &[&str] = &["gltf", "glb"];

/// Identifies the format of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Scene snapshot exported by a host application.
    Json,
    /// glTF 2.0 model, text or binary.
    Gltf,
}

impl SourceKind {
    /// Detects the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        if JSON_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Json)
        } else if GLTF_EXTENSIONS.contains(&ext.as_str()) {
            Some(SourceKind::Gltf)
        } else {
            None
        }
    }

    /// Returns the string representation for reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Json => "json",
            SourceKind::Gltf => "gltf",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Loads a scene from a snapshot or a glTF model.
pub fn load_scene(path: &Path) -> Result<Scene> {
    let Some(kind) = SourceKind::from_path(path) else {
        bail!(
            "unsupported input '{}': expected .json, .gltf or .glb",
            path.display()
        );
    };
    tracing::debug!(path = %path.display(), kind = %kind, "loading scene");

    let scene = match kind {
        SourceKind::Json => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Scene::from_json(&text)
                .with_context(|| format!("Failed to parse scene snapshot {}", path.display()))?
        }
        SourceKind::Gltf => gltf_import::load(path)
            .with_context(|| format!("Failed to import {}", path.display()))?,
    };
    Ok(scene)
}

/// Loads host-supplied findings: a JSON object mapping object names to lists
/// of `[label, value, severity]` items.
pub fn load_host_findings(path: &Path) -> Result<BTreeMap<String, Vec<serde_json::Value>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse findings file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_source_kind_detection() {
        assert_eq!(SourceKind::from_path(Path::new("scene.json")), Some(SourceKind::Json));
        assert_eq!(SourceKind::from_path(Path::new("rock.GLB")), Some(SourceKind::Gltf));
        assert_eq!(SourceKind::from_path(Path::new("rock.gltf")), Some(SourceKind::Gltf));
        assert_eq!(SourceKind::from_path(Path::new("rock.fbx")), None);
        assert_eq!(SourceKind::from_path(Path::new("rock")), None);
    }

    #[test]
    fn test_load_json_scene() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"objects": [{{"name": "Plane", "data": {{"type": "mesh",
                "vertices": [{{"position": [0, 0, 0]}}, {{"position": [1, 0, 0]}}, {{"position": [0, 1, 0]}}],
                "polygons": [{{"vertices": [0, 1, 2]}}]}}}}],
                "active_object": 0}}"#
        )
        .unwrap();

        let scene = load_scene(file.path()).unwrap();
        assert_eq!(scene.objects.len(), 1);
        assert_eq!(scene.objects[0].as_mesh().unwrap().edges.len(), 3);
    }

    #[test]
    fn test_invalid_json_scene_is_an_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"objects": [], "active_object": 3}}"#).unwrap();
        assert!(load_scene(file.path()).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_scene(Path::new("model.fbx")).unwrap_err();
        assert!(err.to_string().contains("unsupported input"));
    }

    #[test]
    fn test_load_host_findings() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"Cube": [["Custom", "ok", "INFO"], 42]}}"#).unwrap();
        let findings = load_host_findings(file.path()).unwrap();
        assert_eq!(findings["Cube"].len(), 2);
    }
}
