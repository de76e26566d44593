//! Materials, shader node graphs and images.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::scene::ImageId;

/// Kind of a shader node. Only the kinds the validator reasons about are named.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    /// Image texture node, optionally referencing an image.
    ImageTexture {
        #[serde(default)]
        image: Option<ImageId>,
    },
    /// Tangent-space normal map node.
    NormalMap,
    /// Node splitting a color into its channels.
    SeparateColor,
    /// PBR shader.
    PrincipledBsdf,
    /// Material output.
    MaterialOutput,
    /// Any other node.
    Other { kind: String },
}

/// A shader node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node name.
    pub name: String,
    /// Node kind.
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    /// Creates a node.
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Returns the referenced image if this is an image texture node.
    pub fn image(&self) -> Option<ImageId> {
        match self.kind {
            NodeKind::ImageTexture { image } => image,
            _ => None,
        }
    }
}

/// A link from an output socket to an input socket, by node index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Source node index.
    pub from_node: usize,
    /// Source output socket name.
    pub from_socket: String,
    /// Destination node index.
    pub to_node: usize,
    /// Destination input socket name.
    pub to_socket: String,
}

impl Link {
    /// Creates a link.
    pub fn new(
        from_node: usize,
        from_socket: impl Into<String>,
        to_node: usize,
        to_socket: impl Into<String>,
    ) -> Self {
        Self {
            from_node,
            from_socket: from_socket.into(),
            to_node,
            to_socket: to_socket.into(),
        }
    }
}

/// A material and its node graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Material name.
    pub name: String,
    /// Whether the node graph is in use.
    #[serde(default = "default_true")]
    pub use_nodes: bool,
    /// Nodes.
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Links between nodes.
    #[serde(default)]
    pub links: Vec<Link>,
}

fn default_true() -> bool {
    true
}

impl Material {
    /// Creates an empty node-based material.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_nodes: true,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Adds a node and returns its index.
    pub fn add_node(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Links `from.from_socket` to `to.to_socket`.
    pub fn link(
        &mut self,
        from: usize,
        from_socket: impl Into<String>,
        to: usize,
        to_socket: impl Into<String>,
    ) {
        self.links.push(Link::new(from, from_socket, to, to_socket));
    }

    /// Links leaving a node, in declaration order.
    pub fn links_from(&self, node: usize) -> impl Iterator<Item = &Link> + '_ {
        self.links.iter().filter(move |l| l.from_node == node)
    }

    /// Indices of image texture nodes that reference an image.
    pub fn image_nodes(&self) -> impl Iterator<Item = (usize, ImageId)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.image().map(|img| (i, img)))
    }

    /// Every node reachable by following output links forward from `node`.
    ///
    /// The start node itself is only included if a cycle leads back to it.
    pub fn downstream_nodes(&self, node: usize) -> BTreeSet<usize> {
        let mut visited = BTreeSet::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            for link in self.links_from(current) {
                if visited.insert(link.to_node) {
                    stack.push(link.to_node);
                }
            }
        }
        visited
    }
}

/// How an image's pixels are laid out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageSource {
    /// A single image.
    #[default]
    Single,
    /// UDIM tiles.
    Tiled,
}

/// Image metadata as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Image name (usually the file name).
    pub name: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Whether the pixel data is embedded in the scene.
    #[serde(default)]
    pub packed: bool,
    /// Single image or UDIM tiles.
    #[serde(default)]
    pub source: ImageSource,
    /// Number of UDIM tiles for tiled images.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub tile_count: usize,
    /// External file path, for unpacked images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filepath: Option<String>,
    /// Whether the external file was found. `None` if never probed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_exists: Option<bool>,
}

fn is_zero(v: &usize) -> bool {
    *v == 0
}

impl Image {
    /// Creates a packed single image.
    pub fn packed(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            packed: true,
            source: ImageSource::Single,
            tile_count: 0,
            filepath: None,
            file_exists: None,
        }
    }

    /// Creates an unpacked image backed by an external file.
    pub fn external(
        name: impl Into<String>,
        width: u32,
        height: u32,
        filepath: impl Into<String>,
        file_exists: bool,
    ) -> Self {
        Self {
            packed: false,
            filepath: Some(filepath.into()),
            file_exists: Some(file_exists),
            ..Self::packed(name, width, height)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downstream_nodes() {
        let mut mat = Material::new("M");
        let tex = mat.add_node(Node::new(
            "Tex",
            NodeKind::ImageTexture {
                image: Some(ImageId(0)),
            },
        ));
        let bsdf = mat.add_node(Node::new("BSDF", NodeKind::PrincipledBsdf));
        let out = mat.add_node(Node::new("Out", NodeKind::MaterialOutput));
        let lonely = mat.add_node(Node::new(
            "Lonely",
            NodeKind::ImageTexture { image: None },
        ));
        mat.link(tex, "Color", bsdf, "Base Color");
        mat.link(bsdf, "BSDF", out, "Surface");

        let reached = mat.downstream_nodes(tex);
        assert!(reached.contains(&bsdf));
        assert!(reached.contains(&out));
        assert!(mat.downstream_nodes(lonely).is_empty());
        assert_eq!(mat.image_nodes().count(), 1);
    }

    #[test]
    fn test_node_json_shape() {
        let json = r#"{"name":"Tex","type":"image_texture","image":3}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.image(), Some(ImageId(3)));

        let other: Node = serde_json::from_str(r#"{"name":"Mix","type":"other","kind":"MIX"}"#).unwrap();
        assert_eq!(
            other.kind,
            NodeKind::Other {
                kind: "MIX".to_string()
            }
        );
    }

    #[test]
    fn test_image_defaults() {
        let img: Image =
            serde_json::from_str(r#"{"name":"T_rock_n.png","width":2048,"height":2048}"#).unwrap();
        assert!(!img.packed);
        assert_eq!(img.source, ImageSource::Single);
        assert_eq!(img.file_exists, None);
    }
}
