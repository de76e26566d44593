//! Texture checks.
//!
//! Textures are the images referenced by image nodes in the object's
//! material slots. Naming, resolution and packing are judged once per image;
//! connectivity once per node.

pub mod graph;
pub mod naming;


use gameready_scene::Image;

use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};
use crate::rules::Check;

use graph::is_resolved;
use naming::{
    ambiguous_optional_maps, clean_name, has_resolution_tag, has_texture_prefix, infer_map_type,
    is_banned_name, normalize_token, MapType,
};

/// File naming conventions.
pub struct TextureNamingCheck;

impl Check for TextureNamingCheck {
    fn id(&self) -> &'static str {
        "texture/naming"
    }

    fn description(&self) -> &'static str {
        "Checks texture file names for map suffixes, banned terms and prefixes"
    }

    fn section(&self) -> Section {
        Section::Textures
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let strict = ctx.settings.strict_naming_mode;
        let mut findings = Vec::new();

        for id in ctx.textures.images() {
            let image = ctx.scene.image(id);
            let name = image.name.as_str();
            let issue = |label: &str, severity: Severity| {
                self.finding(label, name, severity).with_subject(name)
            };

            if has_resolution_tag(name) {
                let severity = if strict { Severity::Error } else { Severity::Warning };
                findings.push(issue("Filename includes resolution", severity));
            }
            if is_banned_name(name) {
                findings.push(issue("Contains disallowed term", Severity::Error));
            }
            if strict && !has_texture_prefix(name) {
                findings.push(issue("Missing 'T_' prefix", Severity::Warning));
            }

            match infer_map_type(name) {
                None => findings.push(issue("Texture name invalid", Severity::Error)),
                Some(map) if !map.matches_exactly(&normalize_token(&clean_name(name))) => findings.push(
                    self.finding(
                        "Missing required suffix",
                        format!("{} (expected {} suffix such as {})", name, map, map.primary_suffix()),
                        Severity::Error,
                    )
                    .with_subject(name),
                ),
                Some(_) => {}
            }

            if strict {
                for map in ambiguous_optional_maps(name) {
                    findings.push(
                        self.finding(
                            "Ambiguous map name",
                            format!("{} mentions {} without a matching suffix", name, map),
                            Severity::Warning,
                        )
                        .with_subject(name),
                    );
                }
            }

            if image.source == gameready_scene::ImageSource::Tiled {
                findings.push(
                    self.finding("UDIM detected", format!("{} tiles", image.tile_count), Severity::Info)
                        .with_subject(name),
                );
            }
        }
        findings
    }
}

/// Resolution policy and power-of-two dimensions.
pub struct TextureResolutionCheck;

impl TextureResolutionCheck {
    fn policy(image: &Image, hero: bool) -> (&'static str, Severity) {
        let min_dim = image.width.min(image.height);
        if min_dim < 256 {
            ("Very low resolution", Severity::Error)
        } else if hero && min_dim < 2048 {
            ("Resolution too low for Hero Asset", Severity::Error)
        } else if !hero && min_dim > 1024 {
            ("Resolution too high for background Asset", Severity::Error)
        } else if min_dim < 512 {
            ("Low resolution", Severity::Warning)
        } else {
            ("Resolution OK", Severity::Info)
        }
    }
}

impl Check for TextureResolutionCheck {
    fn id(&self) -> &'static str {
        "texture/resolution"
    }

    fn description(&self) -> &'static str {
        "Checks texture resolution against the asset class and power-of-two sizes"
    }

    fn section(&self) -> Section {
        Section::Textures
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let mut findings = Vec::new();
        for id in ctx.textures.images() {
            let image = ctx.scene.image(id);
            let value = format!("{} ({}x{})", image.name, image.width, image.height);

            let (label, severity) = Self::policy(image, ctx.settings.is_hero_asset);
            findings.push(self.finding(label, value.clone(), severity).with_subject(&image.name));

            if !is_power_of_two(image.width, image.height) {
                findings.push(
                    self.finding("Not power-of-two", value, Severity::Error)
                        .with_subject(&image.name),
                );
            }
        }
        findings
    }
}

/// Whether both dimensions are powers of two.
pub fn is_power_of_two(width: u32, height: u32) -> bool {
    width.is_power_of_two() && height.is_power_of_two()
}

/// Image nodes whose output feeds nothing.
pub struct TextureConnectivityCheck;

impl Check for TextureConnectivityCheck {
    fn id(&self) -> &'static str {
        "texture/connectivity"
    }

    fn description(&self) -> &'static str {
        "Detects image texture nodes that are not connected to anything"
    }

    fn section(&self) -> Section {
        Section::Textures
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        if ctx.textures.is_empty() {
            return vec![];
        }
        let findings: Vec<Finding> = ctx
            .textures
            .nodes
            .iter()
            .filter(|n| !n.connected)
            .map(|n| {
                let material = ctx.scene.material(n.material);
                let image = &ctx.scene.image(n.image).name;
                self.finding(
                    format!("[{}] Image node not connected", material.name),
                    image.as_str(),
                    Severity::Warning,
                )
                .with_subject(image.as_str())
            })
            .collect();

        if findings.is_empty() {
            vec![self.finding(
                "Image Nodes",
                format!("All {} connected", ctx.textures.nodes.len()),
                Severity::Info,
            )]
        } else {
            findings
        }
    }
}

/// Embedded versus external image data.
pub struct TexturePackingCheck;

impl Check for TexturePackingCheck {
    fn id(&self) -> &'static str {
        "texture/packing"
    }

    fn description(&self) -> &'static str {
        "Requires texture images to be packed into the scene"
    }

    fn section(&self) -> Section {
        Section::Textures
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let images = ctx.textures.images();
        if images.is_empty() {
            return vec![];
        }

        let mut findings = Vec::new();
        for id in &images {
            let image = ctx.scene.image(*id);
            if image.packed {
                continue;
            }
            let path = image.filepath.as_deref().unwrap_or(&image.name);
            if image.file_exists == Some(false) {
                tracing::warn!(image = %image.name, path, "external texture file not found");
                findings.push(
                    self.finding("Missing external texture", path, Severity::Error)
                        .with_subject(&image.name),
                );
            } else {
                findings.push(
                    self.finding("External texture image", path, Severity::Error)
                        .with_subject(&image.name),
                );
            }
        }

        if findings.is_empty() {
            findings.push(self.finding(
                "Packed Textures",
                format!("All {} packed", images.len()),
                Severity::Info,
            ));
        }
        findings
    }
}

/// Presence of required and optional maps across the object's textures.
pub struct TextureMapsCheck;

impl Check for TextureMapsCheck {
    fn id(&self) -> &'static str {
        "texture/maps"
    }

    fn description(&self) -> &'static str {
        "Checks that the required texture maps are present"
    }

    fn section(&self) -> Section {
        Section::Textures
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        if ctx.textures.is_empty() {
            return vec![self.finding(
                "No textures found",
                "No image textures in material slots",
                Severity::Error,
            )];
        }

        let found = ctx.textures.found_maps(ctx.scene);
        let unresolved = ctx
            .textures
            .nodes
            .iter()
            .filter(|n| !is_resolved(ctx.scene, n.image))
            .count();
        if unresolved > 0 {
            tracing::debug!(unresolved, "textures without pixel data ignored for map presence");
        }

        let mut findings = Vec::new();
        if ctx.is_color_atlas() {
            findings.push(self.finding(
                "Map Presence",
                "Skipped (color atlas)",
                Severity::Info,
            ));
        } else {
            for map in MapType::REQUIRED {
                if found.contains(&map) {
                    continue;
                }
                let severity = if map == MapType::Roughness && !ctx.settings.is_hero_asset {
                    Severity::Warning
                } else {
                    Severity::Error
                };
                findings.push(
                    self.finding(format!("Missing Texture Map: {}", map), "Not found", severity)
                        .with_subject(map.name()),
                );
            }

            let missing: Vec<&str> = MapType::OPTIONAL
                .iter()
                .filter(|m| !found.contains(m))
                .map(|m| m.name())
                .collect();
            if !missing.is_empty() {
                findings.push(self.finding(
                    "Optional Maps",
                    format!("Missing: {}", missing.join(", ")),
                    Severity::Warning,
                ));
            }
        }

        let mut names: Vec<&str> = found.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        let summary = if names.is_empty() {
            "None".to_string()
        } else {
            names.join(", ")
        };
        findings.push(self.finding("Found Texture Maps", summary, Severity::Info));
        findings
    }
}

/// Returns all texture checks.
pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(TextureNamingCheck),
        Box::new(TextureResolutionCheck),
        Box::new(TextureConnectivityCheck),
        Box::new(TexturePackingCheck),
        Box::new(TextureMapsCheck),
    ]
}
