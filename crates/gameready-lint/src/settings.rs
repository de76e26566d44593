//! Scan settings and tuned thresholds.
//!
//! Settings are immutable for the duration of a scan and are passed by
//! reference to every check.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ScanError;

/// What a scan covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanScope {
    /// The active object only.
    #[default]
    SingleObject,
    /// The target collection and its nested collections.
    Collection,
    /// Every object in the scene.
    WholeScene,
}

impl ScanScope {
    /// Returns the string representation used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanScope::SingleObject => "single",
            ScanScope::Collection => "collection",
            ScanScope::WholeScene => "scene",
        }
    }
}

impl std::str::FromStr for ScanScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "object" | "single_object" => Ok(ScanScope::SingleObject),
            "collection" => Ok(ScanScope::Collection),
            "scene" | "file" | "whole_scene" => Ok(ScanScope::WholeScene),
            _ => Err(format!(
                "unknown scope '{}', expected 'single', 'collection' or 'scene'",
                s
            )),
        }
    }
}

/// Domain-tuned constants. `Default` reproduces the reference behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Acceptable average texel density range outside AAA mode.
    pub texel_density_range: (f64, f64),
    /// Minimum average texel density in AAA mode.
    pub texel_density_min_aaa: f64,
    /// Maximum deviation from the average, as a fraction of the average.
    pub texel_density_deviation: f64,
    /// Average density under which an auto-unwrap is considered poor.
    pub poor_texel_density: f64,
    /// Distance under which two vertices count as duplicates.
    pub duplicate_distance: f64,
    /// Minimum dot product between a face normal and its consistent orientation.
    pub normal_consistency: f64,
    /// UV island limit for background assets.
    pub max_islands: usize,
    /// UV island limit for hero assets.
    pub max_islands_hero: usize,
    /// Fraction of the island limit at which a warning starts.
    pub island_warning_ratio: f64,
    /// Face count under which a single-island mesh is "simple".
    pub simple_mesh_faces: usize,
    /// Vertex count under which a single-island mesh is "simple".
    pub simple_mesh_vertices: usize,
    /// UV utilization target outside AAA mode (percent).
    pub utilization_target: f64,
    /// UV utilization target in AAA mode (percent).
    pub utilization_target_aaa: f64,
    /// UV utilization pass mark outside AAA mode (percent).
    pub utilization_pass: f64,
    /// UV utilization pass mark in AAA mode (percent).
    pub utilization_pass_aaa: f64,
    /// Collection-level utilization considered healthy (percent).
    pub collection_utilization: f64,
    /// Distinct/total UV ratio under which a layout is stacked.
    pub stacked_ratio: f64,
    /// Atlas heuristic: utilization under which the layout is "tiny" (percent).
    pub atlas_utilization: f64,
    /// Atlas heuristic: island count under which the layout is "few islands".
    pub atlas_max_islands: usize,
    /// Atlas heuristic: score from which an object is treated as a color atlas.
    pub atlas_score: u32,
    /// Island count above which an unseamed layout looks auto-generated.
    pub smart_uv_islands: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            texel_density_range: (3.0, 12.0),
            texel_density_min_aaa: 12.0,
            texel_density_deviation: 0.15,
            poor_texel_density: 0.5,
            duplicate_distance: 1e-4,
            normal_consistency: 0.999,
            max_islands: 100,
            max_islands_hero: 200,
            island_warning_ratio: 0.75,
            simple_mesh_faces: 100,
            simple_mesh_vertices: 150,
            utilization_target: 80.0,
            utilization_target_aaa: 90.0,
            utilization_pass: 70.0,
            utilization_pass_aaa: 85.0,
            collection_utilization: 90.0,
            stacked_ratio: 0.1,
            atlas_utilization: 15.0,
            atlas_max_islands: 15,
            atlas_score: 5,
            smart_uv_islands: 50,
        }
    }
}

/// Scan configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// What to scan.
    pub scan_scope: ScanScope,
    /// Skip `*_high` objects and objects in a "high poly" collection.
    pub exclude_high_poly: bool,
    /// AAA mode: stricter texel density, utilization and texture naming.
    pub strict_naming_mode: bool,
    /// Hero asset: stricter resolution and island policies.
    pub is_hero_asset: bool,
    /// Modular collection: object offsets are expected.
    pub asset_is_modular_collection: bool,
    /// Collection to scan in collection scope (by name).
    pub target_collection: Option<String>,
    /// Object to scan in single-object scope, overriding the scene's active object.
    pub target_object: Option<String>,
    /// Tuned constants.
    pub thresholds: Thresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scan_scope: ScanScope::SingleObject,
            exclude_high_poly: true,
            strict_naming_mode: false,
            is_hero_asset: false,
            asset_is_modular_collection: false,
            target_collection: None,
            target_object: None,
            thresholds: Thresholds::default(),
        }
    }
}

impl Settings {
    /// Loads settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ScanError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// UV utilization `(target, pass_threshold)` for the current mode.
    pub fn utilization_marks(&self) -> (f64, f64) {
        let t = &self.thresholds;
        if self.strict_naming_mode {
            (t.utilization_target_aaa, t.utilization_pass_aaa)
        } else {
            (t.utilization_target, t.utilization_pass)
        }
    }

    /// UV island limit for the current asset class.
    pub fn island_limit(&self) -> usize {
        if self.is_hero_asset {
            self.thresholds.max_islands_hero
        } else {
            self.thresholds.max_islands
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parsing() {
        assert_eq!("single".parse::<ScanScope>().unwrap(), ScanScope::SingleObject);
        assert_eq!("COLLECTION".parse::<ScanScope>().unwrap(), ScanScope::Collection);
        assert_eq!("file".parse::<ScanScope>().unwrap(), ScanScope::WholeScene);
        assert!("everything".parse::<ScanScope>().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"is_hero_asset": true, "thresholds": {"max_islands": 40}}"#)
                .unwrap();
        assert!(settings.is_hero_asset);
        assert!(settings.exclude_high_poly);
        assert_eq!(settings.thresholds.max_islands, 40);
        assert_eq!(settings.thresholds.max_islands_hero, 200);
        assert_eq!(settings.island_limit(), 200);
    }

    #[test]
    fn test_utilization_marks() {
        let mut settings = Settings::default();
        assert_eq!(settings.utilization_marks(), (80.0, 70.0));
        settings.strict_naming_mode = true;
        assert_eq!(settings.utilization_marks(), (90.0, 85.0));
    }
}
