//! Geometry checks.
//!
//! Counts, topology defects, unapplied transforms, duplicate vertices and
//! flipped normals. Every check handles meshes with no polygons and reports
//! zero-valued findings for them.

pub mod duplicates;
pub mod normals;
pub mod topology;

#[cfg(test)]
mod tests;

use crate::rules::Check;

pub use duplicates::{count_duplicate_vertices, DuplicateVerticesCheck};
pub use normals::{find_flipped_faces, FlippedNormalsCheck};
pub use topology::{CountsCheck, TopologyCheck, TransformStatus, TransformsCheck};

/// Returns all geometry checks.
pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(CountsCheck),
        Box::new(TopologyCheck),
        Box::new(TransformsCheck),
        Box::new(FlippedNormalsCheck),
        Box::new(DuplicateVerticesCheck),
    ]
}
