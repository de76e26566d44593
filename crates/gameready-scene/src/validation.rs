//! Structural validation of a scene snapshot.
//!
//! Checks only what the validator relies on to index safely: ids in range,
//! element indices in range and acyclic parent chains. UV layers with the
//! wrong number of coordinates are *not* rejected here; the UV checks report
//! them as findings instead.

use crate::error::SceneError;
use crate::mesh::Mesh;
use crate::scene::{ObjectData, Scene};
use crate::armature::Armature;

impl Scene {
    /// Validates ids and indices. Returns the first problem found.
    pub fn validate(&self) -> Result<(), SceneError> {
        let objects = self.objects.len();

        if let Some(active) = self.active_object {
            if active.0 >= objects {
                return Err(SceneError::dangling("scene.active_object", "object", active.0, objects));
            }
        }

        for object in &self.objects {
            let owner = object.name.as_str();
            if let Some(parent) = object.parent {
                if parent.0 >= objects {
                    return Err(SceneError::dangling(owner, "object", parent.0, objects));
                }
            }
            for modifier in &object.modifiers {
                if let Some(target) = modifier.object {
                    if target.0 >= objects {
                        return Err(SceneError::dangling(owner, "object", target.0, objects));
                    }
                }
            }
            for slot in object.material_slots.iter().flatten() {
                if slot.0 >= self.materials.len() {
                    return Err(SceneError::dangling(owner, "material", slot.0, self.materials.len()));
                }
            }
            match &object.data {
                ObjectData::Mesh(mesh) => validate_mesh(owner, mesh)?,
                ObjectData::Armature(armature) => validate_armature(owner, armature)?,
                ObjectData::Other { .. } => {}
            }
        }

        for collection in &self.collections {
            for object in &collection.objects {
                if object.0 >= objects {
                    return Err(SceneError::dangling(&collection.name, "object", object.0, objects));
                }
            }
            for child in &collection.children {
                if child.0 >= self.collections.len() {
                    return Err(SceneError::dangling(
                        &collection.name,
                        "collection",
                        child.0,
                        self.collections.len(),
                    ));
                }
            }
        }

        for material in &self.materials {
            let nodes = material.nodes.len();
            for (_, image) in material.image_nodes() {
                if image.0 >= self.images.len() {
                    return Err(SceneError::dangling(&material.name, "image", image.0, self.images.len()));
                }
            }
            for link in &material.links {
                for index in [link.from_node, link.to_node] {
                    if index >= nodes {
                        return Err(SceneError::out_of_range(&material.name, "link node", index, nodes));
                    }
                }
            }
        }

        self.check_parent_cycles()
    }

    fn check_parent_cycles(&self) -> Result<(), SceneError> {
        for (start, object) in self.objects.iter().enumerate() {
            let mut current = object.parent;
            let mut steps = 0;
            while let Some(parent) = current {
                steps += 1;
                if parent.0 == start || steps > self.objects.len() {
                    return Err(SceneError::ParentCycle(object.name.clone()));
                }
                current = self.objects[parent.0].parent;
            }
        }
        Ok(())
    }
}

fn validate_mesh(owner: &str, mesh: &Mesh) -> Result<(), SceneError> {
    let verts = mesh.vertices.len();
    for (i, edge) in mesh.edges.iter().enumerate() {
        for v in edge.vertices {
            if v >= verts {
                return Err(SceneError::out_of_range(owner, format!("edge {} vertex", i), v, verts));
            }
        }
    }
    for (i, polygon) in mesh.polygons.iter().enumerate() {
        for &v in &polygon.vertices {
            if v >= verts {
                return Err(SceneError::out_of_range(owner, format!("polygon {} vertex", i), v, verts));
            }
        }
    }
    if let Some(active) = mesh.active_uv_layer {
        if active >= mesh.uv_layers.len() {
            return Err(SceneError::out_of_range(owner, "active UV layer", active, mesh.uv_layers.len()));
        }
    }
    Ok(())
}

fn validate_armature(owner: &str, armature: &Armature) -> Result<(), SceneError> {
    let bones = armature.bones.len();
    for bone in &armature.bones {
        if let Some(parent) = bone.parent {
            if parent >= bones {
                return Err(SceneError::out_of_range(
                    owner,
                    format!("bone '{}' parent", bone.name),
                    parent,
                    bones,
                ));
            }
        }
    }
    Ok(())
}
