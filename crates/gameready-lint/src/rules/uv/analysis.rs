//! Measurements of the active UV layer, computed once per object.

use gameready_scene::math::round_to;
use gameready_scene::{edge_key, Mesh, UvLayer};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::rules::texture::naming::MapType;
use crate::settings::Settings;

/// Axis-aligned bounds of a set of UV coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl UvBounds {
    /// Bounds of the coordinates, or `None` when there are none.
    pub fn of<'a>(uvs: impl IntoIterator<Item = &'a [f64; 2]>) -> Option<Self> {
        let mut iter = uvs.into_iter();
        let first = *iter.next()?;
        let mut bounds = UvBounds {
            min: first,
            max: first,
        };
        for uv in iter {
            for axis in 0..2 {
                bounds.min[axis] = bounds.min[axis].min(uv[axis]);
                bounds.max[axis] = bounds.max[axis].max(uv[axis]);
            }
        }
        Some(bounds)
    }

    /// Percentage of the unit square covered by the bounds, rounded to two
    /// decimals. Not clamped: overflowing layouts may exceed 100.
    pub fn utilization(&self) -> f64 {
        let width = self.max[0] - self.min[0];
        let height = self.max[1] - self.min[1];
        round_to(width * height * 100.0, 2)
    }

    /// Whether any coordinate lies outside `[0, 1]²`.
    pub fn overflows(&self) -> bool {
        self.min[0] < 0.0 || self.min[1] < 0.0 || self.max[0] > 1.0 || self.max[1] > 1.0
    }
}

/// Per-face ratio of UV area to object-space area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TexelDensity {
    /// Mean density over faces with positive area.
    pub average: f64,
    /// Largest absolute difference from the mean.
    pub deviation: f64,
    /// Number of faces that contributed.
    pub faces: usize,
    /// Total UV area over total object-space area, rounded to two decimals.
    pub ratio: f64,
}

impl TexelDensity {
    /// Whether the deviation exceeds `ratio` times the average.
    pub fn is_uneven(&self, ratio: f64) -> bool {
        self.deviation > ratio * self.average
    }
}

/// Result of analysing an object's active UV layer.
#[derive(Debug, Clone, PartialEq)]
pub struct UvAnalysis {
    /// Name of the active layer.
    pub layer_name: String,
    /// Number of polygon loops in the mesh.
    pub loop_count: usize,
    /// Number of coordinates the layer actually holds.
    pub coord_count: usize,
    /// Seam-bounded face islands.
    pub islands: usize,
    /// Whether any edge is marked as a seam.
    pub has_seams: bool,
    /// Bounds of the coordinates; `None` when empty or unreadable.
    pub bounds: Option<UvBounds>,
    /// Bounding-box coverage of the unit square in percent.
    pub utilization: f64,
    /// Whether coordinates leave the unit square.
    pub overflow: bool,
    /// Distinct coordinates (rounded to 5 decimals) over all coordinates.
    pub distinct_ratio: Option<f64>,
    /// Texel density statistics.
    pub texel_density: TexelDensity,
    /// Color-atlas heuristic score, 0 to 6.
    pub atlas_score: u32,
    /// Whether the object is treated as a color atlas.
    pub is_atlas: bool,
}

impl UvAnalysis {
    /// Analyses the active UV layer. Returns `None` when the mesh has none.
    ///
    /// `found_maps` are the texture maps present on the object; the atlas
    /// heuristic counts missing normal and roughness maps.
    pub fn compute(mesh: &Mesh, settings: &Settings, found_maps: &BTreeSet<MapType>) -> Option<Self> {
        let layer = mesh.active_uv()?;
        let loop_count = mesh.loop_count();
        let readable = layer.uvs.len() == loop_count;
        if !readable {
            tracing::warn!(
                layer = %layer.name,
                coords = layer.uvs.len(),
                loops = loop_count,
                "UV layer does not match loop count; treating coordinates as unreadable"
            );
        }
        let uvs: &[[f64; 2]] = if readable { &layer.uvs } else { &[] };

        let bounds = UvBounds::of(uvs);
        let utilization = bounds.map(|b| b.utilization()).unwrap_or(0.0);
        let overflow = bounds.is_some_and(|b| b.overflows());
        let distinct_ratio = distinct_ratio(uvs);
        let islands = count_islands(mesh);
        let has_seams = mesh.has_seams();
        let texel_density = if readable {
            texel_density(mesh, layer)
        } else {
            TexelDensity::default()
        };

        let t = &settings.thresholds;
        let atlas_score = [
            utilization < t.atlas_utilization,
            distinct_ratio.is_some_and(|r| r < t.stacked_ratio),
            !found_maps.contains(&MapType::Normal),
            !found_maps.contains(&MapType::Roughness),
            islands < t.atlas_max_islands,
            !has_seams,
        ]
        .iter()
        .filter(|hit| **hit)
        .count() as u32;
        let is_atlas = !uvs.is_empty() && atlas_score >= t.atlas_score;

        Some(Self {
            layer_name: layer.name.clone(),
            loop_count,
            coord_count: layer.uvs.len(),
            islands,
            has_seams,
            bounds,
            utilization,
            overflow,
            distinct_ratio,
            texel_density,
            atlas_score,
            is_atlas,
        })
    }

    /// Whether the mesh has any loops for the layer to cover.
    pub fn has_data(&self) -> bool {
        self.loop_count > 0
    }

    /// Whether the layer holds one coordinate per loop.
    pub fn is_readable(&self) -> bool {
        self.coord_count == self.loop_count
    }

    /// Whether the layout looks stacked (few distinct coordinates).
    pub fn is_stacked(&self, threshold: f64) -> bool {
        self.distinct_ratio.is_some_and(|r| r < threshold)
    }
}

/// Counts face islands: faces sharing a non-seam edge belong together.
pub fn count_islands(mesh: &Mesh) -> usize {
    let seams = mesh.seam_edges();
    let mut edge_faces: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
    for (face, polygon) in mesh.polygons.iter().enumerate() {
        for (a, b) in polygon.directed_edges() {
            if a == b {
                continue;
            }
            let key = edge_key(a, b);
            if !seams.contains(&key) {
                edge_faces.entry(key).or_default().push(face);
            }
        }
    }

    let mut sets = DisjointSet::new(mesh.polygons.len());
    for faces in edge_faces.values() {
        for pair in faces.windows(2) {
            sets.union(pair[0], pair[1]);
        }
    }
    (0..mesh.polygons.len())
        .map(|f| sets.find(f))
        .collect::<HashSet<_>>()
        .len()
}

/// Ratio of distinct coordinates (rounded to 5 decimals) to all coordinates.
pub fn distinct_ratio(uvs: &[[f64; 2]]) -> Option<f64> {
    if uvs.is_empty() {
        return None;
    }
    let distinct: HashSet<(i64, i64)> = uvs
        .iter()
        .map(|uv| ((uv[0] * 1e5).round() as i64, (uv[1] * 1e5).round() as i64))
        .collect();
    Some(distinct.len() as f64 / uvs.len() as f64)
}

/// Texel density over faces with positive object-space area.
pub fn texel_density(mesh: &Mesh, layer: &UvLayer) -> TexelDensity {
    let mut total_uv_area = 0.0;
    let mut total_area = 0.0;
    let densities: Vec<f64> = mesh
        .polygon_loops()
        .into_iter()
        .enumerate()
        .filter_map(|(face, loops)| {
            let area = mesh.polygon_area(face);
            if area <= 0.0 {
                return None;
            }
            let uv_area = mesh.polygon_uv_area(layer, loops)?;
            total_uv_area += uv_area;
            total_area += area;
            Some(uv_area / area)
        })
        .collect();

    if densities.is_empty() {
        return TexelDensity::default();
    }
    let average = densities.iter().sum::<f64>() / densities.len() as f64;
    let deviation = densities
        .iter()
        .map(|d| (d - average).abs())
        .fold(0.0, f64::max);
    TexelDensity {
        average,
        deviation,
        faces: densities.len(),
        ratio: round_to(total_uv_area / total_area, 2),
    }
}

/// Union-find with path halving.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}
