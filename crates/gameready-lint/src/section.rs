//! Label-based section classification.
//!
//! Built-in checks tag every finding with its section when they create it.
//! Findings handed over by a host only carry a label, so they are bucketed
//! by matching the label against an alias table first and keyword sets after.

use crate::report::Section;

/// Aliases matched in order: a label that contains the key
/// goes to the paired section.
const SECTION_ALIASES: &[(&str, Section)] = &[
    ("Normals", Section::Geometry),
    ("Unapplied Transforms", Section::Geometry),
    ("Transforms Applied", Section::Geometry),
    ("Double Vertices", Section::Geometry),
    ("Topology", Section::Geometry),
    ("Counts", Section::Geometry),
    ("Marked Seams", Section::Uvs),
    ("Seams", Section::Uvs),
    ("Unwrapping Quality", Section::Uvs),
    ("Texel Density Ratio", Section::Uvs),
    ("Texture name invalid", Section::Textures),
    ("Contains disallowed term", Section::Textures),
    ("Resolution too high for background Asset", Section::Textures),
    ("Resolution too low for Hero Asset", Section::Textures),
    ("Very low resolution", Section::Textures),
    ("Not power-of-two", Section::Textures),
    ("Missing Texture Map", Section::Textures),
    ("Modifier", Section::Modifiers),
    ("Bone Count", Section::Rigging),
    ("Bone Naming OK", Section::Rigging),
    ("Hierarchy", Section::Rigging),
    ("Naming Convention", Section::Rigging),
    ("Blacklisted Bone Names", Section::Rigging),
    ("Constraints Present", Section::Rigging),
    ("Drivers Present", Section::Rigging),
    ("Unassigned Verts", Section::Rigging),
    ("Rigging Context", Section::Rigging),
];

const GEOMETRY_LABELS: &[&str] = &[
    "Vertex Count",
    "Face Count",
    "Edge Count",
    "N-gons",
    "Non-Manifold Edges",
    "Stray Vertices",
];

/// Buckets a label into a section.
pub fn classify_label(label: &str) -> Section {
    if let Some((_, section)) = SECTION_ALIASES
        .iter()
        .find(|(key, _)| label.contains(key))
    {
        return *section;
    }

    if label.starts_with("Texture")
        || label.starts_with("Optional Maps")
        || label.starts_with("Found Texture Maps")
        || label.contains("Resolution")
        || label.contains("power-of-two")
    {
        return Section::Textures;
    }

    if label.contains("UV") || label.starts_with("Texel") || label.starts_with("Unwrapping") {
        return Section::Uvs;
    }

    if ["Bone", "Rigging", "Constraints", "Drivers"]
        .iter()
        .any(|k| label.contains(k))
    {
        return Section::Rigging;
    }

    if GEOMETRY_LABELS.contains(&label) {
        return Section::Geometry;
    }

    Section::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_table() {
        assert_eq!(classify_label("Normals"), Section::Geometry);
        assert_eq!(classify_label("Double Vertices: "), Section::Geometry);
        assert_eq!(classify_label("Modifier: Subdivision"), Section::Modifiers);
        assert_eq!(classify_label("Missing Texture Map: Normal"), Section::Textures);
        assert_eq!(classify_label("Cube - Unassigned Verts"), Section::Rigging);
        assert_eq!(classify_label("Texel Density Ratio (px/cm)"), Section::Uvs);
        assert_eq!(classify_label("Bone Naming OK"), Section::Rigging);
    }

    #[test]
    fn test_keyword_heuristics() {
        assert_eq!(classify_label("UV Space Utilization"), Section::Uvs);
        assert_eq!(classify_label("Texel Density Avg"), Section::Uvs);
        assert_eq!(classify_label("Found Texture Maps"), Section::Textures);
        assert_eq!(classify_label("[T_rock_c.png] Resolution OK"), Section::Textures);
        assert_eq!(classify_label("Bone Roll"), Section::Rigging);
        assert_eq!(classify_label("Stray Vertices"), Section::Geometry);
    }

    #[test]
    fn test_unknown_label_goes_to_other() {
        assert_eq!(classify_label("Something Else"), Section::Other);
        assert_eq!(classify_label(""), Section::Other);
    }
}
