//! Scene arena: objects, collections, materials and images addressed by id.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::armature::Armature;
use crate::error::SceneError;
use crate::material::{Image, Material};
use crate::mesh::Mesh;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Index into the owning arena.
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arena_id!(
    /// Index of an object in [`Scene::objects`].
    ObjectId
);
arena_id!(
    /// Index of a collection in [`Scene::collections`].
    CollectionId
);
arena_id!(
    /// Index of a material in [`Scene::materials`].
    MaterialId
);
arena_id!(
    /// Index of an image in [`Scene::images`].
    ImageId
);

/// Local transform of an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Location.
    #[serde(default)]
    pub location: [f64; 3],
    /// Euler rotation in radians.
    #[serde(default)]
    pub rotation_euler: [f64; 3],
    /// Scale.
    #[serde(default = "unit_scale")]
    pub scale: [f64; 3],
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            location: [0.0; 3],
            rotation_euler: [0.0; 3],
            scale: unit_scale(),
        }
    }
}

/// Kind of a non-destructive modifier.
///
/// Serialised as the host's upper-case type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModifierKind {
    Armature,
    Triangulate,
    WeightedNormal,
    Subsurf,
    Mirror,
    Bevel,
    Solidify,
    Array,
    Boolean,
    Decimate,
    Other(String),
}

impl ModifierKind {
    /// Host type name, e.g. `WEIGHTED_NORMAL`.
    pub fn as_str(&self) -> &str {
        match self {
            ModifierKind::Armature => "ARMATURE",
            ModifierKind::Triangulate => "TRIANGULATE",
            ModifierKind::WeightedNormal => "WEIGHTED_NORMAL",
            ModifierKind::Subsurf => "SUBSURF",
            ModifierKind::Mirror => "MIRROR",
            ModifierKind::Bevel => "BEVEL",
            ModifierKind::Solidify => "SOLIDIFY",
            ModifierKind::Array => "ARRAY",
            ModifierKind::Boolean => "BOOLEAN",
            ModifierKind::Decimate => "DECIMATE",
            ModifierKind::Other(s) => s,
        }
    }
}

impl From<String> for ModifierKind {
    fn from(s: String) -> Self {
        match s.to_uppercase().as_str() {
            "ARMATURE" => ModifierKind::Armature,
            "TRIANGULATE" => ModifierKind::Triangulate,
            "WEIGHTED_NORMAL" => ModifierKind::WeightedNormal,
            "SUBSURF" => ModifierKind::Subsurf,
            "MIRROR" => ModifierKind::Mirror,
            "BEVEL" => ModifierKind::Bevel,
            "SOLIDIFY" => ModifierKind::Solidify,
            "ARRAY" => ModifierKind::Array,
            "BOOLEAN" => ModifierKind::Boolean,
            "DECIMATE" => ModifierKind::Decimate,
            _ => ModifierKind::Other(s),
        }
    }
}

impl From<ModifierKind> for String {
    fn from(kind: ModifierKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A modifier on an object's stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifier {
    /// Modifier name.
    pub name: String,
    /// Modifier kind.
    #[serde(rename = "type")]
    pub kind: ModifierKind,
    /// Target object (armature modifiers).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectId>,
}

impl Modifier {
    /// Creates a modifier without a target.
    pub fn new(name: impl Into<String>, kind: ModifierKind) -> Self {
        Self {
            name: name.into(),
            kind,
            object: None,
        }
    }

    /// Creates an armature modifier deforming by `armature`.
    pub fn armature(name: impl Into<String>, armature: ObjectId) -> Self {
        Self {
            name: name.into(),
            kind: ModifierKind::Armature,
            object: Some(armature),
        }
    }
}

/// Object payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectData {
    /// Mesh object.
    Mesh(Mesh),
    /// Armature object.
    Armature(Armature),
    /// Anything else (lights, cameras, empties...).
    Other { kind: String },
}

impl ObjectData {
    /// Host type name of the payload.
    pub fn type_name(&self) -> &str {
        match self {
            ObjectData::Mesh(_) => "MESH",
            ObjectData::Armature(_) => "ARMATURE",
            ObjectData::Other { kind } => kind,
        }
    }
}

/// A scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Object name (unique within the scene).
    pub name: String,
    /// Parent object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectId>,
    /// Local transform.
    #[serde(default)]
    pub transform: Transform,
    /// Payload.
    pub data: ObjectData,
    /// Modifier stack, in evaluation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub modifiers: Vec<Modifier>,
    /// Material slots; empty slots are `None`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub material_slots: Vec<Option<MaterialId>>,
}

impl Object {
    /// Creates an object with an identity transform.
    pub fn new(name: impl Into<String>, data: ObjectData) -> Self {
        Self {
            name: name.into(),
            parent: None,
            transform: Transform::default(),
            data,
            modifiers: Vec::new(),
            material_slots: Vec::new(),
        }
    }

    /// Creates a mesh object.
    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(name, ObjectData::Mesh(mesh))
    }

    /// Creates an armature object.
    pub fn armature(name: impl Into<String>, armature: Armature) -> Self {
        Self::new(name, ObjectData::Armature(armature))
    }

    /// Mesh payload, if this is a mesh object.
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.data {
            ObjectData::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Armature payload, if this is an armature object.
    pub fn as_armature(&self) -> Option<&Armature> {
        match &self.data {
            ObjectData::Armature(armature) => Some(armature),
            _ => None,
        }
    }

    /// Whether this object is a mesh or an armature.
    pub fn is_mesh_or_armature(&self) -> bool {
        matches!(self.data, ObjectData::Mesh(_) | ObjectData::Armature(_))
    }

    /// Target of the first armature modifier that has one.
    pub fn armature_target(&self) -> Option<ObjectId> {
        self.modifiers
            .iter()
            .filter(|m| m.kind == ModifierKind::Armature)
            .find_map(|m| m.object)
    }
}

/// A collection of objects, possibly nested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Collection name.
    pub name: String,
    /// Objects directly linked to this collection.
    #[serde(default)]
    pub objects: Vec<ObjectId>,
    /// Child collections.
    #[serde(default)]
    pub children: Vec<CollectionId>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Snapshot of a host scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Objects.
    #[serde(default)]
    pub objects: Vec<Object>,
    /// Collections.
    #[serde(default)]
    pub collections: Vec<Collection>,
    /// Materials.
    #[serde(default)]
    pub materials: Vec<Material>,
    /// Images.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Active object (used for single-object scans).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_object: Option<ObjectId>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a scene snapshot from JSON, derives missing mesh edges and validates it.
    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let mut scene: Scene = serde_json::from_str(json)?;
        scene.derive_missing_edges();
        scene.validate()?;
        Ok(scene)
    }

    /// Derives edges for every mesh that has polygons without edges.
    pub fn derive_missing_edges(&mut self) {
        for object in &mut self.objects {
            if let ObjectData::Mesh(mesh) = &mut object.data {
                mesh.derive_missing_edges();
            }
        }
    }

    /// Adds an object and returns its id.
    pub fn add_object(&mut self, object: Object) -> ObjectId {
        self.objects.push(object);
        ObjectId(self.objects.len() - 1)
    }

    /// Adds a collection and returns its id.
    pub fn add_collection(&mut self, collection: Collection) -> CollectionId {
        self.collections.push(collection);
        CollectionId(self.collections.len() - 1)
    }

    /// Adds a material and returns its id.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    /// Adds an image and returns its id.
    pub fn add_image(&mut self, image: Image) -> ImageId {
        self.images.push(image);
        ImageId(self.images.len() - 1)
    }

    /// Links an object into a collection.
    pub fn link_object(&mut self, collection: CollectionId, object: ObjectId) {
        self.collections[collection.0].objects.push(object);
    }

    /// Nests `child` under `parent`.
    pub fn link_collection(&mut self, parent: CollectionId, child: CollectionId) {
        self.collections[parent.0].children.push(child);
    }

    /// Object by id.
    pub fn object(&self, id: ObjectId) -> &Object {
        &self.objects[id.0]
    }

    /// Collection by id.
    pub fn collection(&self, id: CollectionId) -> &Collection {
        &self.collections[id.0]
    }

    /// Material by id.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    /// Image by id.
    pub fn image(&self, id: ImageId) -> &Image {
        &self.images[id.0]
    }

    /// Iterates objects with their ids.
    pub fn objects_with_ids(&self) -> impl Iterator<Item = (ObjectId, &Object)> + '_ {
        self.objects.iter().enumerate().map(|(i, o)| (ObjectId(i), o))
    }

    /// Finds an object by name.
    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().position(|o| o.name == name).map(ObjectId)
    }

    /// Finds a collection by name.
    pub fn find_collection(&self, name: &str) -> Option<CollectionId> {
        self.collections
            .iter()
            .position(|c| c.name == name)
            .map(CollectionId)
    }

    /// Walks parent links up to the root. Requires a validated (acyclic) scene.
    pub fn top_parent(&self, id: ObjectId) -> ObjectId {
        let mut current = id;
        while let Some(parent) = self.object(current).parent {
            current = parent;
        }
        current
    }

    /// Collections that directly link the object.
    pub fn collections_containing(&self, id: ObjectId) -> Vec<CollectionId> {
        self.collections
            .iter()
            .enumerate()
            .filter(|(_, c)| c.objects.contains(&id))
            .map(|(i, _)| CollectionId(i))
            .collect()
    }

    /// Objects of a collection and all nested collections, depth first.
    ///
    /// An object linked into several nested collections is returned once.
    pub fn collection_objects_recursive(&self, id: CollectionId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut seen_collections = vec![false; self.collections.len()];
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if std::mem::replace(&mut seen_collections[current.0], true) {
                continue;
            }
            let collection = self.collection(current);
            for object in &collection.objects {
                if !out.contains(object) {
                    out.push(*object);
                }
            }
            for child in collection.children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_modifier_kind_round_trip_names() {
        assert_eq!(ModifierKind::from("weighted_normal".to_string()), ModifierKind::WeightedNormal);
        assert_eq!(
            ModifierKind::from("REMESH".to_string()),
            ModifierKind::Other("REMESH".to_string())
        );
        assert_eq!(String::from(ModifierKind::Subsurf), "SUBSURF");
    }

    #[test]
    fn test_top_parent_and_recursive_collections() {
        let mut scene = Scene::new();
        let root = scene.add_object(Object::mesh("Root", Mesh::default()));
        let mut child = Object::mesh("Child", Mesh::default());
        child.parent = Some(root);
        let child = scene.add_object(child);
        let outer = scene.add_collection(Collection::new("Outer"));
        let inner = scene.add_collection(Collection::new("Inner"));
        scene.link_collection(outer, inner);
        scene.link_object(outer, root);
        scene.link_object(inner, child);
        scene.link_object(inner, root);

        assert_eq!(scene.top_parent(child), root);
        assert_eq!(scene.collection_objects_recursive(outer), vec![root, child]);
        assert_eq!(scene.collections_containing(root), vec![outer, inner]);
        assert_eq!(scene.find_collection("Inner"), Some(inner));
    }

    #[test]
    fn test_from_json_derives_edges() {
        let json = r#"{
            "objects": [{
                "name": "Plane",
                "data": {
                    "type": "mesh",
                    "vertices": [
                        {"position": [0,0,0]}, {"position": [1,0,0]},
                        {"position": [1,1,0]}, {"position": [0,1,0]}
                    ],
                    "polygons": [{"vertices": [0,1,2,3]}]
                },
                "modifiers": [{"name": "Subdivision", "type": "SUBSURF"}]
            }],
            "active_object": 0
        }"#;
        let scene = Scene::from_json(json).unwrap();
        let mesh = scene.object(ObjectId(0)).as_mesh().unwrap();
        assert_eq!(mesh.edges.len(), 4);
        assert_eq!(scene.object(ObjectId(0)).modifiers[0].kind, ModifierKind::Subsurf);
        assert_eq!(scene.object(ObjectId(0)).transform.scale, [1.0, 1.0, 1.0]);
    }
}
