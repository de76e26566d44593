//! Mesh snapshot: vertices, edges, polygons and UV layers.
//!
//! A mesh is read-only for the validator. Polygons store their loop as an
//! ordered list of vertex indices; the loops of all polygons, concatenated in
//! polygon order, form the loop array that UV layers are indexed by.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Range;

use crate::math::{add3, cross3, normalize3, scale3, triangle_area_2d, triangle_area_3d};

/// Membership of a vertex in a vertex group (used for skin weights).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupWeight {
    /// Index of the vertex group on the owning object.
    pub group: usize,
    /// Influence weight.
    pub weight: f32,
}

/// A mesh vertex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// Object-space position.
    pub position: [f64; 3],
    /// Vertex group assignments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupWeight>,
}

impl Vertex {
    /// Creates an unweighted vertex.
    pub fn new(position: [f64; 3]) -> Self {
        Self {
            position,
            groups: Vec::new(),
        }
    }
}

/// A mesh edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Endpoint vertex indices.
    pub vertices: [usize; 2],
    /// Whether the edge is marked as a UV seam.
    #[serde(default)]
    pub seam: bool,
}

impl Edge {
    /// Order-independent key for this edge.
    pub fn key(&self) -> (usize, usize) {
        edge_key(self.vertices[0], self.vertices[1])
    }
}

/// A polygon, stored as its ordered vertex loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertex indices in winding order.
    pub vertices: Vec<usize>,
}

impl Polygon {
    /// Creates a polygon from its vertex loop.
    pub fn new(vertices: impl Into<Vec<usize>>) -> Self {
        Self {
            vertices: vertices.into(),
        }
    }

    /// Iterates the polygon's directed boundary edges `(from, to)`.
    pub fn directed_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }
}

/// A UV layer: one 2D coordinate per polygon loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UvLayer {
    /// Layer name.
    pub name: String,
    /// Coordinates, indexed by loop.
    pub uvs: Vec<[f64; 2]>,
}

impl UvLayer {
    /// Creates a UV layer.
    pub fn new(name: impl Into<String>, uvs: Vec<[f64; 2]>) -> Self {
        Self {
            name: name.into(),
            uvs,
        }
    }
}

/// Mesh snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertices.
    #[serde(default)]
    pub vertices: Vec<Vertex>,
    /// Edges. When empty but polygons exist, edges are derived on load.
    #[serde(default)]
    pub edges: Vec<Edge>,
    /// Polygons.
    #[serde(default)]
    pub polygons: Vec<Polygon>,
    /// UV layers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uv_layers: Vec<UvLayer>,
    /// Index of the active UV layer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_uv_layer: Option<usize>,
}

/// Order-independent key for the edge between `a` and `b`.
pub fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Mesh {
    /// Builds a mesh from positions and polygon loops, deriving the edge list.
    pub fn from_polygons(positions: &[[f64; 3]], polygons: Vec<Vec<usize>>) -> Self {
        let mut mesh = Mesh {
            vertices: positions.iter().copied().map(Vertex::new).collect(),
            edges: Vec::new(),
            polygons: polygons.into_iter().map(Polygon::new).collect(),
            uv_layers: Vec::new(),
            active_uv_layer: None,
        };
        mesh.derive_missing_edges();
        mesh
    }

    /// Adds an edge for every polygon side that has no edge yet.
    ///
    /// Existing edges (and their seam flags) are kept; new edges are appended
    /// in first-seen order.
    pub fn derive_missing_edges(&mut self) {
        let mut known: HashSet<(usize, usize)> = self.edges.iter().map(Edge::key).collect();
        let mut added = Vec::new();
        for polygon in &self.polygons {
            for (a, b) in polygon.directed_edges() {
                let key = edge_key(a, b);
                if a != b && known.insert(key) {
                    added.push(Edge {
                        vertices: [key.0, key.1],
                        seam: false,
                    });
                }
            }
        }
        self.edges.extend(added);
    }

    /// Marks the edge between `a` and `b` as a seam. Returns false if no such edge exists.
    pub fn mark_seam(&mut self, a: usize, b: usize) -> bool {
        let key = edge_key(a, b);
        match self.edges.iter_mut().find(|e| e.key() == key) {
            Some(edge) => {
                edge.seam = true;
                true
            }
            None => false,
        }
    }

    /// Appends a UV layer and makes it active.
    pub fn push_active_uv_layer(&mut self, layer: UvLayer) {
        self.uv_layers.push(layer);
        self.active_uv_layer = Some(self.uv_layers.len() - 1);
    }

    /// Returns the active UV layer, if any.
    pub fn active_uv(&self) -> Option<&UvLayer> {
        self.active_uv_layer.and_then(|i| self.uv_layers.get(i))
    }

    /// Total number of polygon loops.
    pub fn loop_count(&self) -> usize {
        self.polygons.iter().map(|p| p.vertices.len()).sum()
    }

    /// Loop index range of every polygon, in polygon order.
    pub fn polygon_loops(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.polygons
            .iter()
            .map(|p| {
                let range = start..start + p.vertices.len();
                start = range.end;
                range
            })
            .collect()
    }

    /// Position of a vertex.
    pub fn position(&self, vertex: usize) -> [f64; 3] {
        self.vertices[vertex].position
    }

    /// Whether any edge is marked as a seam.
    pub fn has_seams(&self) -> bool {
        self.edges.iter().any(|e| e.seam)
    }

    /// Keys of all seam edges.
    pub fn seam_edges(&self) -> HashSet<(usize, usize)> {
        self.edges.iter().filter(|e| e.seam).map(Edge::key).collect()
    }

    /// Mean of the polygon's vertex positions.
    pub fn polygon_center(&self, polygon: usize) -> [f64; 3] {
        let verts = &self.polygons[polygon].vertices;
        if verts.is_empty() {
            return [0.0; 3];
        }
        let sum = verts
            .iter()
            .fold([0.0; 3], |acc, &v| add3(acc, self.position(v)));
        scale3(sum, 1.0 / verts.len() as f64)
    }

    /// Unit normal of a polygon (Newell's method). Degenerate polygons yield zero.
    pub fn polygon_normal(&self, polygon: usize) -> [f64; 3] {
        let verts = &self.polygons[polygon].vertices;
        let mut normal = [0.0; 3];
        for i in 0..verts.len() {
            let cur = self.position(verts[i]);
            let next = self.position(verts[(i + 1) % verts.len()]);
            normal = add3(normal, cross3(cur, next));
        }
        normalize3(normal)
    }

    /// Object-space area using fan triangulation from the first loop vertex.
    pub fn polygon_area(&self, polygon: usize) -> f64 {
        let verts = &self.polygons[polygon].vertices;
        if verts.len() < 3 {
            return 0.0;
        }
        let p0 = self.position(verts[0]);
        (1..verts.len() - 1)
            .map(|i| triangle_area_3d(p0, self.position(verts[i]), self.position(verts[i + 1])))
            .sum()
    }

    /// UV-space area of a polygon using the same fan triangulation.
    ///
    /// Returns `None` when the layer does not cover the polygon's loops.
    pub fn polygon_uv_area(&self, layer: &UvLayer, loops: Range<usize>) -> Option<f64> {
        let uvs = layer.uvs.get(loops)?;
        if uvs.len() < 3 {
            return Some(0.0);
        }
        Some(
            (1..uvs.len() - 1)
                .map(|i| triangle_area_2d(uvs[0], uvs[i], uvs[i + 1]))
                .sum(),
        )
    }

    /// Number of polygons using each edge key.
    pub fn edge_face_counts(&self) -> HashMap<(usize, usize), usize> {
        let mut counts: HashMap<(usize, usize), usize> = HashMap::new();
        for polygon in &self.polygons {
            let unique: BTreeSet<(usize, usize)> = polygon
                .directed_edges()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| edge_key(a, b))
                .collect();
            for key in unique {
                *counts.entry(key).or_insert(0) += 1;
            }
        }
        counts
    }
}
