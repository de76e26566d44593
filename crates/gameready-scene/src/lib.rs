//! Scene snapshot types for game-readiness validation.
//!
//! A host 3D application exports what the validator needs to read into a
//! [`Scene`]: an arena of objects, collections, materials and images addressed
//! by stable ids. Parent links are ids, so the snapshot has no ownership
//! cycles and can be (de)serialised as plain JSON.
//!
//! # Example
//!
//! ```
//! use gameready_scene::{Mesh, Object, Scene};
//!
//! let mut scene = Scene::new();
//! let quad = Mesh::from_polygons(
//!     &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
//!     vec![vec![0, 1, 2, 3]],
//! );
//! let id = scene.add_object(Object::mesh("Plane", quad));
//! scene.active_object = Some(id);
//!
//! assert!(scene.validate().is_ok());
//! assert_eq!(scene.object(id).as_mesh().unwrap().edges.len(), 4);
//! ```

pub mod armature;
pub mod error;
pub mod material;
pub mod math;
pub mod mesh;
pub mod scene;
mod validation;

pub use armature::{Armature, Bone, PoseBone};
pub use error::SceneError;
pub use material::{Image, ImageSource, Link, Material, Node, NodeKind};
pub use mesh::{edge_key, Edge, GroupWeight, Mesh, Polygon, UvLayer, Vertex};
pub use scene::{
    Collection, CollectionId, ImageId, MaterialId, Modifier, ModifierKind, Object, ObjectData,
    ObjectId, Scene, Transform,
};
