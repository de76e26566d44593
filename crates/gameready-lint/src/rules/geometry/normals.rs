//! Flipped normal detection by island-consistent re-orientation.
//!
//! Faces are grouped into islands connected through manifold, non-seam
//! edges. In each island the face pointing most outward from the island's
//! vertex centroid seeds a breadth-first walk that carries an orientation
//! sign across shared edges: two faces that traverse their shared edge in
//! the same direction have opposite winding. A face whose original normal
//! disagrees with its re-oriented normal is flipped.

use gameready_scene::math::{centroid3, dot3, normalize3, sub3};
use gameready_scene::{edge_key, Mesh};
use std::collections::{BTreeSet, HashMap, VecDeque};

use crate::context::CheckContext;
use crate::report::{Finding, Section, Severity};
use crate::rules::Check;

const SEED_EPSILON: f64 = 1e-6;

/// Neighbour of a face and whether the pair winds the shared edge the same way.
#[derive(Debug, Clone, Copy)]
struct Adjacent {
    face: usize,
    same_direction: bool,
}

/// Indices of faces whose normal disagrees with the consistent orientation.
///
/// A face is flipped when the dot product of its normal with the
/// re-oriented normal falls below `threshold`. Degenerate faces are ignored.
pub fn find_flipped_faces(mesh: &Mesh, threshold: f64) -> Vec<usize> {
    let face_count = mesh.polygons.len();
    let normals: Vec<[f64; 3]> = (0..face_count).map(|f| mesh.polygon_normal(f)).collect();
    let valid: Vec<bool> = normals.iter().map(|n| dot3(*n, *n) > 0.0).collect();
    let adjacency = build_adjacency(mesh, &valid);

    let mut sign = vec![0i8; face_count];
    for start in 0..face_count {
        if !valid[start] || sign[start] != 0 {
            continue;
        }
        let island = collect_island(start, &adjacency);
        orient_island(mesh, &island, &normals, &adjacency, &mut sign);
    }

    (0..face_count)
        .filter(|&f| valid[f])
        .filter(|&f| {
            let reference = normals[f].map(|c| c * f64::from(sign[f]));
            dot3(normals[f], reference) < threshold
        })
        .collect()
}

fn build_adjacency(mesh: &Mesh, valid: &[bool]) -> Vec<Vec<Adjacent>> {
    let seams = mesh.seam_edges();
    let mut edge_uses: HashMap<(usize, usize), Vec<(usize, usize)>> = HashMap::new();
    for (face, polygon) in mesh.polygons.iter().enumerate() {
        if !valid[face] {
            continue;
        }
        for (a, b) in polygon.directed_edges() {
            if a != b {
                edge_uses.entry(edge_key(a, b)).or_default().push((face, a));
            }
        }
    }

    let mut adjacency = vec![Vec::new(); mesh.polygons.len()];
    for (key, uses) in &edge_uses {
        if seams.contains(key) {
            continue;
        }
        if let [(f1, from1), (f2, from2)] = uses.as_slice() {
            if f1 == f2 {
                continue;
            }
            let same_direction = from1 == from2;
            adjacency[*f1].push(Adjacent {
                face: *f2,
                same_direction,
            });
            adjacency[*f2].push(Adjacent {
                face: *f1,
                same_direction,
            });
        }
    }
    adjacency
}

fn collect_island(start: usize, adjacency: &[Vec<Adjacent>]) -> Vec<usize> {
    let mut island = vec![start];
    let mut seen = BTreeSet::from([start]);
    let mut i = 0;
    while i < island.len() {
        for adj in &adjacency[island[i]] {
            if seen.insert(adj.face) {
                island.push(adj.face);
            }
        }
        i += 1;
    }
    island
}

fn orient_island(
    mesh: &Mesh,
    island: &[usize],
    normals: &[[f64; 3]],
    adjacency: &[Vec<Adjacent>],
    sign: &mut [i8],
) {
    let vertices: BTreeSet<usize> = island
        .iter()
        .flat_map(|&f| mesh.polygons[f].vertices.iter().copied())
        .collect();
    let positions: Vec<[f64; 3]> = vertices.iter().map(|&v| mesh.position(v)).collect();
    let centroid = centroid3(positions.iter());

    let outward_dot = |f: usize| {
        let outward = normalize3(sub3(mesh.polygon_center(f), centroid));
        dot3(normals[f], outward)
    };
    let (seed, seed_dot) = island
        .iter()
        .map(|&f| (f, outward_dot(f)))
        .fold((island[0], f64::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 {
                cur
            } else {
                best
            }
        });

    sign[seed] = 1;
    let mut queue = VecDeque::from([seed]);
    while let Some(face) = queue.pop_front() {
        for adj in &adjacency[face] {
            if sign[adj.face] == 0 {
                sign[adj.face] = if adj.same_direction {
                    -sign[face]
                } else {
                    sign[face]
                };
                queue.push_back(adj.face);
            }
        }
    }

    let flip_all = if seed_dot < -SEED_EPSILON {
        true
    } else if seed_dot.abs() <= SEED_EPSILON {
        // No face points outward: keep the orientation covering more area.
        let (kept, reversed) = island.iter().fold((0.0, 0.0), |(kept, reversed), &f| {
            if sign[f] > 0 {
                (kept + mesh.polygon_area(f), reversed)
            } else {
                (kept, reversed + mesh.polygon_area(f))
            }
        });
        reversed > kept
    } else {
        false
    };

    if flip_all {
        for &f in island {
            sign[f] = -sign[f];
        }
    }
}

/// Faces wound against their neighbours.
pub struct FlippedNormalsCheck;

impl Check for FlippedNormalsCheck {
    fn id(&self) -> &'static str {
        "geometry/flipped-normals"
    }

    fn description(&self) -> &'static str {
        "Detects faces whose normals disagree with a consistent outward orientation"
    }

    fn section(&self) -> Section {
        Section::Geometry
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, ctx: &CheckContext) -> Vec<Finding> {
        let flipped = find_flipped_faces(ctx.mesh, ctx.settings.thresholds.normal_consistency);
        if flipped.is_empty() {
            vec![self.finding("Normals", "No flipped normals detected", Severity::Info)]
        } else {
            tracing::debug!(count = flipped.len(), "flipped faces");
            vec![self.finding(
                "Normals",
                format!("{} faces appear flipped", flipped.len()),
                Severity::Error,
            )]
        }
    }
}
