//! Image texture nodes reachable from an object's material slots.

use gameready_scene::{ImageId, Material, MaterialId, NodeKind, Object, Scene};
use std::collections::BTreeSet;

use super::naming::{infer_map_type, MapType};

/// An image texture node found in one of the object's materials.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureNode {
    /// Owning material.
    pub material: MaterialId,
    /// Node index within the material.
    pub node: usize,
    /// Referenced image.
    pub image: ImageId,
    /// Whether the node's output reaches any other node.
    pub connected: bool,
    /// Map type from the file name, falling back to the node graph.
    pub map_type: Option<MapType>,
}

/// Every image texture node used by one object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureInventory {
    /// Nodes in slot order, then node order. A material linked into several
    /// slots is listed once.
    pub nodes: Vec<TextureNode>,
}

impl TextureInventory {
    /// Walks the object's material slots.
    ///
    /// Empty slots and materials that do not use nodes are skipped.
    pub fn collect(scene: &Scene, object: &Object) -> Self {
        let mut seen = BTreeSet::new();
        let mut nodes = Vec::new();
        for material_id in object.material_slots.iter().flatten() {
            if !seen.insert(*material_id) {
                continue;
            }
            let material = scene.material(*material_id);
            if !material.use_nodes {
                continue;
            }
            for (node, image) in material.image_nodes() {
                let map_type = infer_map_type(&scene.image(image).name)
                    .or_else(|| detect_from_node_graph(material, node));
                nodes.push(TextureNode {
                    material: *material_id,
                    node,
                    image,
                    connected: is_node_connected(material, node),
                    map_type,
                });
            }
        }
        Self { nodes }
    }

    /// Whether the object uses no image textures at all.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Distinct images, in first-use order.
    pub fn images(&self) -> Vec<ImageId> {
        let mut out: Vec<ImageId> = Vec::new();
        for node in &self.nodes {
            if !out.contains(&node.image) {
                out.push(node.image);
            }
        }
        out
    }

    /// Map types of textures that count towards map presence: connected,
    /// and either packed or backed by an existing file.
    pub fn found_maps(&self, scene: &Scene) -> BTreeSet<MapType> {
        self.nodes
            .iter()
            .filter(|n| n.connected && is_resolved(scene, n.image))
            .filter_map(|n| n.map_type)
            .collect()
    }
}

/// Whether an image's pixels are available: packed, or an external file
/// that the host found on disk.
pub fn is_resolved(scene: &Scene, image: ImageId) -> bool {
    let image = scene.image(image);
    image.packed || image.file_exists == Some(true)
}

/// A texture node is connected when following its outputs reaches any
/// other node.
pub fn is_node_connected(material: &Material, node: usize) -> bool {
    material.downstream_nodes(node).iter().any(|&n| n != node)
}

/// Classifies a texture by what its first Color output link feeds.
pub fn detect_from_node_graph(material: &Material, node: usize) -> Option<MapType> {
    let link = material
        .links_from(node)
        .find(|l| l.from_socket == "Color")?;
    let target = material.nodes.get(link.to_node)?;
    match &target.kind {
        NodeKind::NormalMap => Some(MapType::Normal),
        NodeKind::SeparateColor => Some(MapType::Roughness),
        NodeKind::PrincipledBsdf => match link.to_socket.as_str() {
            "Base Color" | "Color" => Some(MapType::Diffuse),
            "Roughness" => Some(MapType::Roughness),
            "Metallic" => Some(MapType::Metallic),
            "Normal" => Some(MapType::Normal),
            "Emission" | "Emission Color" => Some(MapType::Emissive),
            "Alpha" => Some(MapType::Alpha),
            _ => None,
        },
        _ => None,
    }
}
