//! Texture map inference from file names.
//!
//! A texture's role is read from the suffix of its cleaned file name:
//! `T_rock_n.png` is a normal map, `rock-basecolor.png` a diffuse map.

use glob::{MatchOptions, Pattern};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

/// Semantic role of a texture map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MapType {
    Diffuse,
    Normal,
    Roughness,
    Metallic,
    Emissive,
    Specular,
    AmbientOcclusion,
    Alpha,
}

impl MapType {
    /// Maps every PBR material is expected to have, in matching order.
    pub const REQUIRED: [MapType; 3] = [MapType::Diffuse, MapType::Normal, MapType::Roughness];

    /// Maps that are reported when missing but never fail a scan.
    pub const OPTIONAL: [MapType; 5] = [
        MapType::Metallic,
        MapType::Emissive,
        MapType::Specular,
        MapType::AmbientOcclusion,
        MapType::Alpha,
    ];

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            MapType::Diffuse => "Diffuse",
            MapType::Normal => "Normal",
            MapType::Roughness => "Roughness",
            MapType::Metallic => "Metallic",
            MapType::Emissive => "Emissive",
            MapType::Specular => "Specular",
            MapType::AmbientOcclusion => "Ambient Occlusion",
            MapType::Alpha => "Alpha",
        }
    }

    /// Whether this map is required.
    pub fn is_required(&self) -> bool {
        Self::REQUIRED.contains(self)
    }

    /// Registered file name suffixes.
    ///
    /// Packed-channel suffixes (`_rma`, `_orm`) appear under every map
    /// type they carry.
    pub fn suffixes(&self) -> &'static [&'static str] {
        match self {
            MapType::Diffuse => &[
                "_c", "_col", "_color", "_bc", "_basecolor", "_base_color", "_albedo", "_d",
                "_diffuse", "_diff",
            ],
            MapType::Normal => &["_n", "_nrm", "_normal", "_h", "_height", "_nml"],
            MapType::Roughness => &["_r", "_roughness", "_rma", "_rough", "_rgh", "_orm", "_mrh"],
            MapType::Metallic => &[
                "_m", "_mt", "_mtl", "_metalness", "_metallic", "_rma", "_met", "_orm",
            ],
            MapType::Emissive => &["_e", "_ems", "_emissive", "_emmissive", "_g", "_glow"],
            MapType::Specular => &["_s", "_spec", "_specular"],
            MapType::AmbientOcclusion => &["_ao", "_a", "_occlusion", "_rma", "_orm"],
            MapType::Alpha => &["_a", "_alpha", "_mask", "_opacity"],
        }
    }

    /// First registered suffix, used in hints.
    pub fn primary_suffix(&self) -> &'static str {
        self.suffixes()[0]
    }

    /// Whether the clean name ends in one of this type's suffixes as a
    /// separate word.
    ///
    /// Suffixes of one or two characters only count when a separator
    /// precedes them, so `_c` does not claim "metallic". Longer suffixes are
    /// compared on the normalized token and ignore punctuation.
    pub fn matches(&self, clean: &str, token: &str) -> bool {
        self.suffixes().iter().any(|suffix| {
            let body = normalize_token(suffix);
            if body.len() <= 2 {
                has_separated_suffix(clean, &body)
            } else {
                token.ends_with(&body)
            }
        })
    }

    /// Whether the normalized token ends in one of this type's suffixes.
    pub fn matches_exactly(&self, token: &str) -> bool {
        self.suffixes()
            .iter()
            .any(|suffix| token.ends_with(&normalize_token(suffix)))
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

const SEPARATORS: [char; 4] = ['_', '-', ' ', '.'];

/// Required texture file name prefixes (strict mode).
pub const TEXTURE_PREFIXES: [&str; 2] = ["T_", "TEX_"];

const BANNED_PATTERNS: &[&str] = &[
    "default*",
    "material*",
    "texture*",
    "image*",
    "untitled*",
    "placeholder*",
    "bake*",
    "temp*",
    "test*",
    "preview*",
    "render*",
    "output*",
    "copy*",
    "duplicate*",
    "backup*",
    "old*",
    "new*",
];

const RESOLUTION_TAG_PATTERN: &str = r"[-_]?\d{3,5}x\d{3,5}$";

static RESOLUTION_TAG: OnceLock<Regex> = OnceLock::new();
static BANNED: OnceLock<Vec<Pattern>> = OnceLock::new();

fn resolution_tag() -> &'static Regex {
    RESOLUTION_TAG.get_or_init(|| Regex::new(RESOLUTION_TAG_PATTERN).expect("invalid regex pattern"))
}

fn banned_patterns() -> &'static [Pattern] {
    BANNED.get_or_init(|| {
        BANNED_PATTERNS
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect()
    })
}

fn has_separated_suffix(clean: &str, body: &str) -> bool {
    clean
        .strip_suffix(body)
        .is_some_and(|rest| rest.ends_with(SEPARATORS))
}

/// File name without its extension.
pub fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
}

/// Strips the extension and a trailing resolution tag, then lower-cases.
pub fn clean_name(name: &str) -> String {
    let stem = file_stem(name);
    resolution_tag().replace(stem, "").to_lowercase()
}

/// Lower-cases and keeps only ASCII letters and digits.
pub fn normalize_token(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Infers the map type of a texture from its file name.
///
/// Required types are tried before optional ones and the first match wins.
/// Separated suffixes are preferred; a bare token ending (`rockn`) is the
/// fallback.
pub fn infer_map_type(name: &str) -> Option<MapType> {
    let clean = clean_name(name);
    let token = normalize_token(&clean);
    let ordered = || MapType::REQUIRED.into_iter().chain(MapType::OPTIONAL);
    ordered()
        .find(|map| map.matches(&clean, &token))
        .or_else(|| ordered().find(|map| map.matches_exactly(&token)))
}

/// Whether the file name (without extension) ends in a resolution tag
/// such as `_2048x2048`.
pub fn has_resolution_tag(name: &str) -> bool {
    resolution_tag().is_match(file_stem(name))
}

/// Whether the file name matches a banned placeholder pattern.
pub fn is_banned_name(name: &str) -> bool {
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };
    banned_patterns()
        .iter()
        .any(|p| p.matches_with(name, options))
}

/// Whether the file name starts with a texture prefix, ignoring case.
pub fn has_texture_prefix(name: &str) -> bool {
    let upper = name.to_uppercase();
    TEXTURE_PREFIXES.iter().any(|p| upper.starts_with(p))
}

/// Optional map types whose name appears in the file name without a
/// suffix confirming it (e.g. `rock_metallic_old.png`).
pub fn ambiguous_optional_maps(name: &str) -> Vec<MapType> {
    let clean = clean_name(name);
    let token = normalize_token(&clean);
    MapType::OPTIONAL
        .iter()
        .copied()
        .filter(|map| token.contains(&normalize_token(map.name())) && !map.matches(&clean, &token))
        .collect()
}

/// Map type for reports: the inferred type, or the clean name when
/// nothing matches.
pub fn map_label(name: &str) -> String {
    match infer_map_type(name) {
        Some(map) => map.name().to_string(),
        None => clean_name(name),
    }
}
