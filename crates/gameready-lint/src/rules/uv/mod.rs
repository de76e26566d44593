//! UV layout checks.
//!
//! Every check reads the shared [`UvAnalysis`](analysis::UvAnalysis) of the
//! object. Without an active UV layer only `uv/layer` reports, with an INFO
//! "not applicable" finding. A layer on a mesh without faces gets a single
//! WARNING from `uv/layer` and nothing else.

pub mod analysis;


use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};
use crate::rules::Check;

/// Downgrades an ERROR to WARNING when several objects are judged as one asset.
fn collective(severity: Severity, multi_object: bool) -> Severity {
    if multi_object && severity == Severity::Error {
        Severity::Warning
    } else {
        severity
    }
}

/// Active layer presence and readability.
///
/// A layer whose coordinate count does not match the loop count is a host
/// read fault and is reported as a warning.
pub struct UvLayerCheck;

impl Check for UvLayerCheck {
    fn id(&self) -> &'static str {
        "uv/layer"
    }

    fn description(&self) -> &'static str {
        "Reports the active UV layer, its readability and marked seams"
    }

    fn section(&self) -> Section {
        Section::Uvs
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(uv) = &ctx.uv else {
            return vec![self.finding(
                "UV Unwrapped",
                "Not applicable: no active UV layer",
                Severity::Info,
            )];
        };

        let mut findings = Vec::new();
        if !uv.has_data() {
            findings.push(self.finding(
                "UV Unwrapped",
                format!("{} (UV layer exists but contains no data)", uv.layer_name),
                Severity::Warning,
            ));
        } else if uv.is_readable() {
            findings.push(self.finding(
                "UV Unwrapped",
                format!("True ({})", uv.layer_name),
                Severity::Info,
            ));
        } else {
            findings.push(self.finding(
                "UV Read Error",
                format!(
                    "{}: {} coordinates for {} loops",
                    uv.layer_name, uv.coord_count, uv.loop_count
                ),
                Severity::Warning,
            ));
        }
        findings.push(self.finding(
            "Marked Seams",
            if uv.has_seams { "Found" } else { "None" },
            Severity::Info,
        ));
        findings
    }
}

/// Island count against the asset-class limit.
pub struct UvIslandsCheck;

impl Check for UvIslandsCheck {
    fn id(&self) -> &'static str {
        "uv/islands"
    }

    fn description(&self) -> &'static str {
        "Counts seam-bounded UV islands against the island limit"
    }

    fn section(&self) -> Section {
        Section::Uvs
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(uv) = ctx.uv.as_ref().filter(|uv| uv.has_data()) else {
            return vec![];
        };
        let t = &ctx.settings.thresholds;

        if uv.islands == 1
            && ctx.mesh.polygons.len() < t.simple_mesh_faces
            && ctx.mesh.vertices.len() < t.simple_mesh_vertices
        {
            return vec![self.finding("UV Islands", "1 (simple mesh, 1 island)", Severity::Info)];
        }

        let limit = ctx.settings.island_limit();
        let severity = if uv.islands > limit {
            Severity::Error
        } else if uv.islands as f64 > t.island_warning_ratio * limit as f64 {
            Severity::Warning
        } else {
            Severity::Info
        };
        vec![self.finding(
            "UV Islands",
            format!("{} (limit {})", uv.islands, limit),
            severity,
        )]
    }
}

/// Bounding-box coverage of the unit square.
pub struct UvUtilizationCheck;

impl Check for UvUtilizationCheck {
    fn id(&self) -> &'static str {
        "uv/utilization"
    }

    fn description(&self) -> &'static str {
        "Measures how much of the 0-1 UV space the layout covers"
    }

    fn section(&self) -> Section {
        Section::Uvs
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(uv) = ctx.uv.as_ref().filter(|uv| uv.has_data()) else {
            return vec![];
        };
        let (target, pass) = ctx.settings.utilization_marks();
        let utilization = uv.utilization;

        let (value, severity) = if utilization == 0.0 {
            (
                "0% (layout collapsed or invalid)".to_string(),
                collective(Severity::Error, ctx.multi_object),
            )
        } else if uv.overflow {
            (
                format!("{:.2}% (UVs exceed 0-1 space)", utilization),
                collective(Severity::Error, ctx.multi_object),
            )
        } else if utilization >= pass {
            (format!("{:.2}%", utilization), Severity::Info)
        } else if utilization >= target - 5.0 {
            (format!("{:.2}% (suboptimal)", utilization), Severity::Warning)
        } else {
            (
                format!("{:.2}% (too low)", utilization),
                collective(Severity::Error, ctx.multi_object),
            )
        };

        let mut findings = vec![self.finding("UV Space Utilization", value, severity)];
        if ctx.settings.strict_naming_mode {
            findings.push(self.finding(
                "AAA Target",
                format!("UV Utilization should be ~{:.0}%", target),
                Severity::Info,
            ));
        }
        findings
    }
}

/// Object-wide texel density ratio, average per-face density and its spread.
pub struct TexelDensityCheck;

impl Check for TexelDensityCheck {
    fn id(&self) -> &'static str {
        "uv/texel-density"
    }

    fn description(&self) -> &'static str {
        "Checks average texel density and its deviation across faces"
    }

    fn section(&self) -> Section {
        Section::Uvs
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(uv) = ctx.uv.as_ref().filter(|uv| uv.has_data()) else {
            return vec![];
        };
        if uv.is_atlas {
            return vec![self.finding("Texel Density", "Skipped (color atlas)", Severity::Info)];
        }

        let t = &ctx.settings.thresholds;
        let density = uv.texel_density;
        let within_policy = |value: f64| {
            if ctx.settings.strict_naming_mode {
                value >= t.texel_density_min_aaa
            } else {
                let (low, high) = t.texel_density_range;
                (low..=high).contains(&value)
            }
        };
        let level = |passed: bool| if passed { Severity::Info } else { Severity::Warning };

        vec![
            self.finding(
                "Texel Density Ratio (px/cm)",
                format!("{:.2}", density.ratio),
                level(within_policy(density.ratio)),
            ),
            self.finding(
                "Texel Density Avg",
                format!("{:.2}", density.average),
                level(within_policy(density.average)),
            ),
            self.finding(
                "Texel Density Deviation",
                format!("{:.2}", density.deviation),
                if density.is_uneven(t.texel_density_deviation) {
                    Severity::Warning
                } else {
                    Severity::Info
                },
            ),
        ]
    }
}

/// Many loops sharing few distinct coordinates.
pub struct StackedUvsCheck;

impl Check for StackedUvsCheck {
    fn id(&self) -> &'static str {
        "uv/stacked"
    }

    fn description(&self) -> &'static str {
        "Detects stacked or overlapping UV layouts"
    }

    fn section(&self) -> Section {
        Section::Uvs
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(ratio) = ctx.uv.as_ref().and_then(|uv| uv.distinct_ratio) else {
            return vec![];
        };

        if ratio < ctx.settings.thresholds.stacked_ratio {
            let severity = if ctx.settings.is_hero_asset {
                Severity::Error
            } else {
                Severity::Warning
            };
            vec![self.finding(
                "Stacked UVs",
                format!("{:.1}% distinct coordinates", ratio * 100.0),
                severity,
            )]
        } else {
            vec![self.finding("Stacked UVs", "None detected", Severity::Info)]
        }
    }
}

/// Manual, auto-generated or default unwrap; also reports atlas detection.
pub struct UnwrapQualityCheck;

impl Check for UnwrapQualityCheck {
    fn id(&self) -> &'static str {
        "uv/unwrap-quality"
    }

    fn description(&self) -> &'static str {
        "Classifies the unwrap as manual, auto-generated or default"
    }

    fn section(&self) -> Section {
        Section::Uvs
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(uv) = ctx.uv.as_ref().filter(|uv| uv.has_data()) else {
            return vec![];
        };
        if uv.is_atlas {
            return vec![self.finding(
                "Color Atlas",
                format!(
                    "Detected (score {}/6), texel density and map checks skipped",
                    uv.atlas_score
                ),
                Severity::Info,
            )];
        }

        let t = &ctx.settings.thresholds;
        let density = uv.texel_density;
        let smart = uv.islands > t.smart_uv_islands && !uv.has_seams;
        let poor_density =
            density.average < t.poor_texel_density || density.is_uneven(t.texel_density_deviation);

        let (value, severity) = if smart && poor_density {
            (
                format!("Auto-generated layout ({} islands, no seams) with poor texel density", uv.islands),
                Severity::Warning,
            )
        } else if smart {
            (
                format!("Auto-generated layout ({} islands, no seams)", uv.islands),
                Severity::Info,
            )
        } else if uv.islands < 2 && !uv.has_seams {
            ("Likely default UVs".to_string(), Severity::Error)
        } else if uv.has_seams {
            ("Manual unwrap, seams present".to_string(), Severity::Info)
        } else {
            (format!("Manual unwrap ({} islands)", uv.islands), Severity::Info)
        };
        vec![self.finding("Unwrapping Quality", value, severity)]
    }
}

/// Returns all UV checks.
pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(UvLayerCheck),
        Box::new(UvIslandsCheck),
        Box::new(UvUtilizationCheck),
        Box::new(TexelDensityCheck),
        Box::new(StackedUvsCheck),
        Box::new(UnwrapQualityCheck),
    ]
}
