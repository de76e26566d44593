//! glTF 2.0 model import.
//!
//! Maps a glTF document onto the scene model the validator reads:
//!
//! - every node with a mesh becomes a mesh object. Its triangle primitives
//!   are merged, vertices that glTF split for attribute discontinuities are
//!   welded back together, and edges where the welded faces disagree on UVs
//!   are marked as seams.
//! - `TEXCOORD_0` becomes the active UV layer, `JOINTS_0`/`WEIGHTS_0` become
//!   vertex group weights.
//! - every skin becomes an armature object; skinned meshes get an armature
//!   modifier pointing at it.
//! - materials become a principled-BSDF node graph with one image node per
//!   texture slot, wired the way a host importer wires them.
//! - images embedded in the file are packed; URI images are external, with
//!   their existence probed on disk. Dimensions come from the PNG header.
//! - every glTF scene becomes a collection.

use anyhow::{anyhow, bail, Context, Result};
use base64::Engine;
use gameready_scene::{
    Armature, Bone, Collection, CollectionId, GroupWeight, Image, ImageId, Material, MaterialId,
    Mesh, Modifier, Node, NodeKind, Object, ObjectId, Scene, Transform, UvLayer,
};
use std::collections::HashMap;
use std::path::Path;

/// Name given to imported UV layers.
const UV_LAYER_NAME: &str = "UVMap";

/// Loads a `.gltf` or `.glb` file. Relative URIs resolve against its directory.
pub fn load(path: &Path) -> Result<Scene> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    from_slice(&bytes, base)
}

/// Imports a glTF document from memory.
pub fn from_slice(bytes: &[u8], base: &Path) -> Result<Scene> {
    let gltf = gltf::Gltf::from_slice(bytes).context("invalid glTF document")?;
    let buffers = load_buffers(&gltf, base)?;
    let mut scene = Scene::new();

    let image_ids: Vec<ImageId> = gltf
        .images()
        .map(|image| scene.add_image(import_image(&image, &buffers, base)))
        .collect();

    let material_ids: Vec<MaterialId> = gltf
        .materials()
        .map(|material| scene.add_material(import_material(&material, &image_ids)))
        .collect();

    let parents = node_parents(&gltf);
    let armature_ids: Vec<ObjectId> = gltf
        .skins()
        .map(|skin| {
            let name = skin
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Armature.{:03}", skin.index()));
            scene.add_object(Object::armature(name, import_skin(&skin, &parents)))
        })
        .collect();

    let mut node_objects: HashMap<usize, ObjectId> = HashMap::new();
    for node in gltf.nodes() {
        let Some(mesh) = node.mesh() else {
            continue;
        };
        let (data, material_slots) = import_mesh(&mesh, &buffers, &material_ids)?;
        let name = node
            .name()
            .or_else(|| mesh.name())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Mesh.{:03}", node.index()));

        let mut object = Object::mesh(name, data);
        object.transform = node_transform(&node);
        object.material_slots = material_slots;
        if let Some(&armature) = node.skin().and_then(|s| armature_ids.get(s.index())) {
            object.modifiers.push(Modifier::armature("Armature", armature));
        }

        let id = scene.add_object(object);
        tracing::debug!(object = %scene.object(id).name, "imported mesh node");
        node_objects.insert(node.index(), id);
    }

    // Objects parent to their nearest ancestor node that is itself an object.
    for (&node, &id) in &node_objects {
        let mut current = parents.get(&node);
        while let Some(parent) = current {
            if let Some(&parent_id) = node_objects.get(parent) {
                scene.objects[id.index()].parent = Some(parent_id);
                break;
            }
            current = parents.get(parent);
        }
    }

    for gltf_scene in gltf.scenes() {
        let name = gltf_scene.name().unwrap_or("Scene").to_string();
        let collection = scene.add_collection(Collection::new(name));
        let mut stack: Vec<gltf::Node> = gltf_scene.nodes().collect();
        while let Some(node) = stack.pop() {
            if let Some(&id) = node_objects.get(&node.index()) {
                link_once(&mut scene, collection, id);
            }
            if let Some(&armature) = node.skin().and_then(|s| armature_ids.get(s.index())) {
                link_once(&mut scene, collection, armature);
            }
            stack.extend(node.children());
        }
    }

    let first_mesh = scene
        .objects_with_ids()
        .find(|(_, o)| o.as_mesh().is_some())
        .map(|(id, _)| id);
    scene.active_object = first_mesh;

    tracing::info!(
        objects = scene.objects.len(),
        materials = scene.materials.len(),
        images = scene.images.len(),
        "imported glTF document"
    );
    scene.validate()?;
    Ok(scene)
}

fn link_once(scene: &mut Scene, collection: CollectionId, object: ObjectId) {
    if !scene.collection(collection).objects.contains(&object) {
        scene.link_object(collection, object);
    }
}

fn load_buffers(gltf: &gltf::Gltf, base: &Path) -> Result<Vec<Vec<u8>>> {
    gltf.buffers()
        .map(|buffer| {
            let data = match buffer.source() {
                gltf::buffer::Source::Bin => gltf
                    .blob
                    .clone()
                    .ok_or_else(|| anyhow!("GLB binary chunk is missing"))?,
                gltf::buffer::Source::Uri(uri) => read_uri(uri, base)?,
            };
            if data.len() < buffer.length() {
                bail!(
                    "buffer {} holds {} bytes, expected {}",
                    buffer.index(),
                    data.len(),
                    buffer.length()
                );
            }
            Ok(data)
        })
        .collect()
}

fn read_uri(uri: &str, base: &Path) -> Result<Vec<u8>> {
    match decode_data_uri(uri) {
        Some(decoded) => decoded,
        None => {
            let path = base.join(uri);
            std::fs::read(&path).with_context(|| format!("Failed to read buffer {}", path.display()))
        }
    }
}

/// Decodes a base64 `data:` URI. `None` for anything else.
fn decode_data_uri(uri: &str) -> Option<Result<Vec<u8>>> {
    let rest = uri.strip_prefix("data:")?;
    let (_, payload) = rest.split_once(";base64,")?;
    Some(
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .context("invalid base64 data URI"),
    )
}

/// Width and height from a PNG header.
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
    let reader = decoder.read_info().ok()?;
    let info = reader.info();
    Some((info.width, info.height))
}

fn import_image(image: &gltf::Image, buffers: &[Vec<u8>], base: &Path) -> Image {
    let fallback = || format!("Image.{:03}", image.index());

    match image.source() {
        gltf::image::Source::View { view, .. } => {
            let name = image.name().map(str::to_string).unwrap_or_else(fallback);
            let (width, height) = buffers
                .get(view.buffer().index())
                .and_then(|data| data.get(view.offset()..view.offset() + view.length()))
                .and_then(png_dimensions)
                .unwrap_or_else(|| unknown_dimensions(&name));
            Image::packed(name, width, height)
        }
        gltf::image::Source::Uri { uri, .. } => {
            if let Some(decoded) = decode_data_uri(uri) {
                let name = image.name().map(str::to_string).unwrap_or_else(fallback);
                let (width, height) = decoded
                    .ok()
                    .and_then(|bytes| png_dimensions(&bytes))
                    .unwrap_or_else(|| unknown_dimensions(&name));
                return Image::packed(name, width, height);
            }

            let path = base.join(uri);
            let name = image
                .name()
                .map(str::to_string)
                .or_else(|| {
                    Path::new(uri)
                        .file_name()
                        .map(|f| f.to_string_lossy().into_owned())
                })
                .unwrap_or_else(fallback);
            let exists = path.is_file();
            let (width, height) = if exists {
                std::fs::read(&path)
                    .ok()
                    .and_then(|bytes| png_dimensions(&bytes))
                    .unwrap_or_else(|| unknown_dimensions(&name))
            } else {
                (0, 0)
            };
            Image::external(name, width, height, path.display().to_string(), exists)
        }
    }
}

fn unknown_dimensions(name: &str) -> (u32, u32) {
    tracing::warn!(image = name, "could not read image dimensions (not a PNG)");
    (0, 0)
}

fn import_material(material: &gltf::Material, images: &[ImageId]) -> Material {
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Material.{:03}", material.index().unwrap_or(0)));
    let mut out = Material::new(name);
    let bsdf = out.add_node(Node::new("Principled BSDF", NodeKind::PrincipledBsdf));
    let output = out.add_node(Node::new("Material Output", NodeKind::MaterialOutput));
    out.link(bsdf, "BSDF", output, "Surface");

    let image_node = |label: &str, texture: gltf::Texture| {
        let image = images.get(texture.source().index()).copied();
        Node::new(label, NodeKind::ImageTexture { image })
    };

    let pbr = material.pbr_metallic_roughness();
    if let Some(info) = pbr.base_color_texture() {
        let tex = out.add_node(image_node("Base Color", info.texture()));
        out.link(tex, "Color", bsdf, "Base Color");
    }
    if let Some(info) = pbr.metallic_roughness_texture() {
        let tex = out.add_node(image_node("Metallic Roughness", info.texture()));
        let separate = out.add_node(Node::new("Separate Color", NodeKind::SeparateColor));
        out.link(tex, "Color", separate, "Color");
        out.link(separate, "Green", bsdf, "Roughness");
        out.link(separate, "Blue", bsdf, "Metallic");
    }
    if let Some(info) = material.normal_texture() {
        let tex = out.add_node(image_node("Normal", info.texture()));
        let normal_map = out.add_node(Node::new("Normal Map", NodeKind::NormalMap));
        out.link(tex, "Color", normal_map, "Color");
        out.link(normal_map, "Normal", bsdf, "Normal");
    }
    if let Some(info) = material.emissive_texture() {
        let tex = out.add_node(image_node("Emission", info.texture()));
        out.link(tex, "Color", bsdf, "Emission Color");
    }
    if let Some(info) = material.occlusion_texture() {
        let tex = out.add_node(image_node("Occlusion", info.texture()));
        let settings = out.add_node(Node::new(
            "glTF Material Output",
            NodeKind::Other {
                kind: "GROUP".to_string(),
            },
        ));
        out.link(tex, "Color", settings, "Occlusion");
    }
    out
}

/// Maps each node index to its parent's index.
fn node_parents(document: &gltf::Document) -> HashMap<usize, usize> {
    let mut parents = HashMap::new();
    for node in document.nodes() {
        for child in node.children() {
            parents.insert(child.index(), node.index());
        }
    }
    parents
}

fn import_skin(skin: &gltf::Skin, parents: &HashMap<usize, usize>) -> Armature {
    let joints: Vec<gltf::Node> = skin.joints().collect();
    let bone_of: HashMap<usize, usize> = joints
        .iter()
        .enumerate()
        .map(|(bone, node)| (node.index(), bone))
        .collect();

    let bones = joints
        .iter()
        .map(|joint| {
            let parent = parents
                .get(&joint.index())
                .and_then(|p| bone_of.get(p))
                .copied();
            let name = joint
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Bone.{:03}", joint.index()));
            Bone::new(name, parent)
        })
        .collect();
    Armature::from_bones(bones)
}

fn node_transform(node: &gltf::Node) -> Transform {
    let (translation, rotation, scale) = node.transform().decomposed();
    Transform {
        location: translation.map(f64::from),
        rotation_euler: quat_to_euler(rotation),
        scale: scale.map(f64::from),
    }
}

/// XYZ Euler angles of an `[x, y, z, w]` quaternion.
fn quat_to_euler(q: [f32; 4]) -> [f64; 3] {
    let [x, y, z, w] = q.map(f64::from);
    let roll = (2.0 * (w * x + y * z)).atan2(1.0 - 2.0 * (x * x + y * y));
    let sin_pitch = 2.0 * (w * y - z * x);
    let pitch = if sin_pitch.abs() >= 1.0 {
        std::f64::consts::FRAC_PI_2.copysign(sin_pitch)
    } else {
        sin_pitch.asin()
    };
    let yaw = (2.0 * (w * z + x * y)).atan2(1.0 - 2.0 * (y * y + z * z));
    [roll, pitch, yaw]
}

/// Mesh under construction: welded vertices and per-loop UVs.
#[derive(Default)]
struct MeshBuilder {
    welded: HashMap<[u32; 3], usize>,
    positions: Vec<[f64; 3]>,
    groups: Vec<Vec<GroupWeight>>,
    polygons: Vec<Vec<usize>>,
    loop_uvs: Vec<[f64; 2]>,
    missing_uvs: bool,
    degenerate: usize,
}

impl MeshBuilder {
    fn weld(&mut self, position: [f32; 3]) -> usize {
        let key = position.map(f32::to_bits);
        if let Some(&index) = self.welded.get(&key) {
            return index;
        }
        self.positions.push(position.map(f64::from));
        self.groups.push(Vec::new());
        let index = self.positions.len() - 1;
        self.welded.insert(key, index);
        index
    }

    fn add_primitive(&mut self, primitive: &gltf::Primitive, buffers: &[Vec<u8>]) {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::warn!(mode = ?primitive.mode(), "skipping non-triangle primitive");
            return;
        }
        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
        let Some(positions) = reader.read_positions() else {
            return;
        };
        let remap: Vec<usize> = positions.map(|p| self.weld(p)).collect();

        let indices: Vec<usize> = match reader.read_indices() {
            Some(indices) => indices.into_u32().map(|i| i as usize).collect(),
            None => (0..remap.len()).collect(),
        };
        let uvs: Option<Vec<[f32; 2]>> = reader.read_tex_coords(0).map(|t| t.into_f32().collect());
        if uvs.is_none() {
            self.missing_uvs = true;
        }

        if let (Some(joints), Some(weights)) = (reader.read_joints(0), reader.read_weights(0)) {
            for ((joint, weight), &vertex) in joints.into_u16().zip(weights.into_f32()).zip(&remap) {
                if !self.groups[vertex].is_empty() {
                    continue;
                }
                self.groups[vertex] = joint
                    .iter()
                    .zip(weight)
                    .filter(|(_, w)| *w > 0.0)
                    .map(|(&group, weight)| GroupWeight {
                        group: group as usize,
                        weight,
                    })
                    .collect();
            }
        }

        for triangle in indices.chunks_exact(3) {
            if triangle.iter().any(|&i| i >= remap.len()) {
                self.degenerate += 1;
                continue;
            }
            let polygon: Vec<usize> = triangle.iter().map(|&i| remap[i]).collect();
            if polygon[0] == polygon[1] || polygon[1] == polygon[2] || polygon[0] == polygon[2] {
                self.degenerate += 1;
                continue;
            }
            if let Some(uvs) = &uvs {
                for &i in triangle {
                    // glTF puts the UV origin at the top left.
                    let [u, v] = uvs.get(i).copied().unwrap_or_default();
                    self.loop_uvs.push([f64::from(u), 1.0 - f64::from(v)]);
                }
            }
            self.polygons.push(polygon);
        }
    }

    fn build(self) -> Mesh {
        if self.degenerate > 0 {
            tracing::debug!(count = self.degenerate, "dropped degenerate triangles");
        }
        let mut mesh = Mesh::from_polygons(&self.positions, self.polygons);
        for (vertex, groups) in mesh.vertices.iter_mut().zip(self.groups) {
            vertex.groups = groups;
        }
        if !self.missing_uvs && !self.loop_uvs.is_empty() {
            mark_uv_seams(&mut mesh, &self.loop_uvs);
            mesh.push_active_uv_layer(UvLayer::new(UV_LAYER_NAME, self.loop_uvs));
        }
        mesh
    }
}

fn import_mesh(
    mesh: &gltf::Mesh,
    buffers: &[Vec<u8>],
    materials: &[MaterialId],
) -> Result<(Mesh, Vec<Option<MaterialId>>)> {
    let mut builder = MeshBuilder::default();
    let mut slots: Vec<Option<MaterialId>> = Vec::new();

    for primitive in mesh.primitives() {
        builder.add_primitive(&primitive, buffers);
        if let Some(index) = primitive.material().index() {
            let id = materials
                .get(index)
                .copied()
                .ok_or_else(|| anyhow!("primitive references unknown material {}", index))?;
            if !slots.contains(&Some(id)) {
                slots.push(Some(id));
            }
        }
    }
    Ok((builder.build(), slots))
}

/// Marks edges whose adjacent faces store different UVs at its endpoints.
fn mark_uv_seams(mesh: &mut Mesh, loop_uvs: &[[f64; 2]]) {
    let mut first_seen: HashMap<(usize, usize), ([f64; 2], [f64; 2])> = HashMap::new();
    let mut seams = Vec::new();

    for (polygon, loops) in mesh.polygons.iter().zip(mesh.polygon_loops()) {
        let Some(uvs) = loop_uvs.get(loops) else {
            continue;
        };
        let n = polygon.vertices.len();
        for i in 0..n {
            let (a, b) = (polygon.vertices[i], polygon.vertices[(i + 1) % n]);
            let (ua, ub) = (uvs[i], uvs[(i + 1) % n]);
            let (key, pair) = if a <= b { ((a, b), (ua, ub)) } else { ((b, a), (ub, ua)) };
            match first_seen.get(&key) {
                Some(first) if *first != pair => seams.push(key),
                Some(_) => {}
                None => {
                    first_seen.insert(key, pair);
                }
            }
        }
    }

    for (a, b) in seams {
        mesh.mark_seam(a, b);
    }
}
