//! Duplicate vertex detection.

use gameready_scene::math::distance_squared3;
use std::collections::HashMap;

use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};
use crate::rules::Check;

/// Number of vertices that have at least one other vertex within `threshold`.
///
/// Uses a uniform spatial hash with cells twice the threshold, so every
/// neighbour within range lies in the surrounding 3x3x3 block of cells.
pub fn count_duplicate_vertices(positions: &[[f64; 3]], threshold: f64) -> usize {
    if positions.len() < 2 || threshold.is_nan() || threshold <= 0.0 {
        return 0;
    }

    let cell_size = threshold * 2.0;
    let max_distance = threshold * threshold;

    let mut spatial_hash: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for (idx, pos) in positions.iter().enumerate() {
        spatial_hash
            .entry(pos_to_cell(pos, cell_size))
            .or_default()
            .push(idx);
    }

    positions
        .iter()
        .enumerate()
        .filter(|(idx, pos)| {
            let cell = pos_to_cell(pos, cell_size);
            neighbourhood(cell).any(|neighbor_cell| {
                spatial_hash.get(&neighbor_cell).is_some_and(|candidates| {
                    candidates.iter().any(|&other| {
                        other != *idx && distance_squared3(**pos, positions[other]) <= max_distance
                    })
                })
            })
        })
        .count()
}

fn neighbourhood(cell: (i64, i64, i64)) -> impl Iterator<Item = (i64, i64, i64)> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (cell.0 + dx, cell.1 + dy, cell.2 + dz)))
    })
}

/// Convert position to spatial hash cell.
fn pos_to_cell(pos: &[f64; 3], cell_size: f64) -> (i64, i64, i64) {
    (
        (pos[0] / cell_size).floor() as i64,
        (pos[1] / cell_size).floor() as i64,
        (pos[2] / cell_size).floor() as i64,
    )
}

/// Vertices closer than the duplicate distance, reported as pairs.
pub struct DuplicateVerticesCheck;

impl Check for DuplicateVerticesCheck {
    fn id(&self) -> &'static str {
        "geometry/duplicate-vertices"
    }

    fn description(&self) -> &'static str {
        "Detects vertices lying within the duplicate distance of each other"
    }

    fn section(&self) -> Section {
        Section::Geometry
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let threshold = ctx.settings.thresholds.duplicate_distance;
        let positions: Vec<[f64; 3]> = ctx.mesh.vertices.iter().map(|v| v.position).collect();
        let pairs = count_duplicate_vertices(&positions, threshold) / 2;

        if pairs > 0 {
            vec![self.finding(
                "Double Vertices",
                format!("{} within {}m", pairs, threshold),
                Severity::Error,
            )]
        } else {
            vec![self.finding("Double Vertices", "None found", Severity::Info)]
        }
    }
}
