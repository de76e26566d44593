//! Per-object state shared by every check.

use gameready_scene::{Mesh, Object, ObjectId, Scene};

use crate::rules::texture::graph::TextureInventory;
use crate::rules::uv::analysis::UvAnalysis;
use crate::settings::Settings;

/// Everything a check may read about the object under inspection.
///
/// The texture inventory and the UV analysis are computed once per object:
/// UV heuristics need to know which maps exist, and map presence is waived
/// for objects the UV analysis classifies as a color atlas.
pub struct CheckContext<'a> {
    /// The whole scene, for armature and material lookups.
    pub scene: &'a Scene,
    /// Id of the inspected object.
    pub object_id: ObjectId,
    /// The inspected object.
    pub object: &'a Object,
    /// Its mesh payload.
    pub mesh: &'a Mesh,
    /// Scan settings.
    pub settings: &'a Settings,
    /// Whether several objects are judged together as one asset.
    pub multi_object: bool,
    /// Image texture nodes reachable from the object's materials.
    pub textures: TextureInventory,
    /// Active UV layer analysis; `None` without an active layer.
    pub uv: Option<UvAnalysis>,
}

impl<'a> CheckContext<'a> {
    /// Builds the context for a mesh object. Returns `None` for other objects.
    pub fn new(
        scene: &'a Scene,
        object_id: ObjectId,
        settings: &'a Settings,
        multi_object: bool,
    ) -> Option<Self> {
        let object = scene.object(object_id);
        let mesh = object.as_mesh()?;
        let textures = TextureInventory::collect(scene, object);
        let found = textures.found_maps(scene);
        let uv = UvAnalysis::compute(mesh, settings, &found);
        Some(Self {
            scene,
            object_id,
            object,
            mesh,
            settings,
            multi_object,
            textures,
            uv,
        })
    }

    /// Whether the UV analysis treats the object as a color atlas.
    pub fn is_color_atlas(&self) -> bool {
        self.uv.as_ref().is_some_and(|uv| uv.is_atlas)
    }
}
