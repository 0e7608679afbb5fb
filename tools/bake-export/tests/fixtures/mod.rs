//! Test scene generators
//!
//! A skinned glTF quad written as `.gltf` + `.bin`, and JSON scene descriptions.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Polygons in the glTF quad
pub const QUAD_POLYGONS: usize = 2;

/// Animation of the glTF quad: root slides 2 units along X over one second
pub const QUAD_SLIDE: f32 = 2.0;

fn push_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Variations of the glTF quad
#[derive(Debug, Clone, Copy)]
pub struct QuadGltf {
    /// Last animation key time in seconds
    pub stop: f32,
    /// Also instance the quad mesh on the Root joint
    pub mesh_on_root: bool,
}

impl Default for QuadGltf {
    fn default() -> Self {
        Self {
            stop: 1.0,
            mesh_on_root: false,
        }
    }
}

/// Skinned quad with two joints (Root -> Tip), one textured material and a
/// one-second translation animation on the root.
///
/// Vertex 2 is bound to Tip, vertex 3 half to each joint, the rest to Root.
pub fn write_skinned_quad_gltf(dir: &Path, stem: &str) -> PathBuf {
    write_quad_gltf(dir, stem, QuadGltf::default())
}

pub fn write_quad_gltf(dir: &Path, stem: &str, quad: QuadGltf) -> PathBuf {
    let mut bin = Vec::new();

    // 0: positions (48 bytes)
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
    // 48: normals (48 bytes)
    for _ in 0..4 {
        push_f32s(&mut bin, &[0.0, 0.0, 1.0]);
    }
    // 96: uvs (32 bytes)
    push_f32s(&mut bin, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]);
    // 128: joints, u8 x 4 (16 bytes)
    bin.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0]);
    // 144: weights (64 bytes)
    push_f32s(
        &mut bin,
        &[
            1.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, 0.0, //
            0.5, 0.5, 0.0, 0.0,
        ],
    );
    // 208: indices (24 bytes)
    for i in [0u32, 1, 2, 0, 2, 3] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    // 232: inverse bind matrices (128 bytes)
    push_f32s(
        &mut bin,
        &[
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, //
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, -1.0, 0.0, 1.0,
        ],
    );
    // 360: animation times (8 bytes)
    push_f32s(&mut bin, &[0.0, quad.stop]);
    // 368: animation translations (24 bytes)
    push_f32s(&mut bin, &[0.0, 0.0, 0.0, QUAD_SLIDE, 0.0, 0.0]);
    assert_eq!(bin.len(), 392);

    let views: Vec<Value> = [(0, 48), (48, 48), (96, 32), (128, 16), (144, 64), (208, 24), (232, 128), (360, 8), (368, 24)]
        .iter()
        .map(|&(offset, length)| json!({ "buffer": 0, "byteOffset": offset, "byteLength": length }))
        .collect();

    let bin_name = format!("{stem}.bin");
    let root = if quad.mesh_on_root {
        json!({ "name": "Root", "children": [1], "mesh": 0 })
    } else {
        json!({ "name": "Root", "children": [1] })
    };
    let document = json!({
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 2] }],
        "nodes": [
            root,
            { "name": "Tip", "translation": [0.0, 1.0, 0.0] },
            { "name": "QuadNode", "mesh": 0, "skin": 0 }
        ],
        "meshes": [{
            "name": "Quad",
            "primitives": [{
                "attributes": {
                    "POSITION": 0,
                    "NORMAL": 1,
                    "TEXCOORD_0": 2,
                    "JOINTS_0": 3,
                    "WEIGHTS_0": 4
                },
                "indices": 5,
                "material": 0
            }]
        }],
        "skins": [{ "joints": [0, 1], "inverseBindMatrices": 6 }],
        "materials": [{
            "name": "Skin",
            "pbrMetallicRoughness": {
                "baseColorFactor": [0.8, 0.6, 0.4, 1.0],
                "baseColorTexture": { "index": 0 }
            },
            "emissiveFactor": [0.1, 0.0, 0.0]
        }],
        "textures": [{ "source": 0 }],
        "images": [{ "uri": "albedo.png" }],
        "animations": [{
            "name": "Slide",
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
            "samplers": [{ "input": 7, "output": 8, "interpolation": "LINEAR" }]
        }],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 4, "type": "VEC3" },
            { "bufferView": 2, "componentType": 5126, "count": 4, "type": "VEC2" },
            { "bufferView": 3, "componentType": 5121, "count": 4, "type": "VEC4" },
            { "bufferView": 4, "componentType": 5126, "count": 4, "type": "VEC4" },
            { "bufferView": 5, "componentType": 5125, "count": 6, "type": "SCALAR" },
            { "bufferView": 6, "componentType": 5126, "count": 2, "type": "MAT4" },
            { "bufferView": 7, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [quad.stop] },
            { "bufferView": 8, "componentType": 5126, "count": 2, "type": "VEC3" }
        ],
        "bufferViews": views,
        "buffers": [{ "byteLength": bin.len(), "uri": bin_name }]
    });

    std::fs::write(dir.join(&bin_name), &bin).expect("Failed to write glTF buffer");
    let path = dir.join(format!("{stem}.gltf"));
    std::fs::write(&path, serde_json::to_vec_pretty(&document).expect("Failed to encode glTF"))
        .expect("Failed to write glTF");
    path
}

/// Skeleton nodes and bind pose shared by the JSON scenes
///
/// Node 0 is the root joint, node 1 its child joint, node 2 the mesh node.
fn rig(mesh: Value, extra: Value) -> Value {
    let mut scene = json!({
        "nodes": [
            { "name": "Root", "children": [1], "attribute": { "type": "skeleton", "root": true } },
            { "name": "Tip", "attribute": { "type": "skeleton" },
              "transform": { "translation": [0.0, 1.0, 0.0] } },
            { "name": "MeshNode", "attribute": { "type": "mesh", "mesh": 0 } }
        ],
        "meshes": [mesh],
        "poses": [{ "name": "bind", "bind_pose": true, "nodes": [0, 1, 2] }]
    });
    if let (Some(target), Some(extra)) = (scene.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            target.insert(key.clone(), value.clone());
        }
    }
    scene
}

pub fn write_description(dir: &Path, stem: &str, scene: &Value) -> PathBuf {
    let path = dir.join(format!("{stem}.json"));
    std::fs::write(&path, serde_json::to_vec_pretty(scene).expect("Failed to encode scene"))
        .expect("Failed to write scene");
    path
}

/// One triangle over three distinct control points, fully bound to Root
pub fn triangle_scene() -> Value {
    rig(
        json!({
            "name": "Tri",
            "control_points": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            "polygons": [[0, 1, 2]],
            "normals": { "mapping": "by_control_point", "reference": "direct",
                         "direct": [[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]] },
            "skins": [{ "clusters": [
                { "link": 0, "control_points": [0, 1, 2], "weights": [1.0, 1.0, 1.0] }
            ] }]
        }),
        json!({}),
    )
}

/// Quad split into two triangles with per-polygon-vertex indexed UVs
///
/// The shared edge carries identical normals and UVs in both triangles.
pub fn quad_scene() -> Value {
    rig(
        json!({
            "name": "Quad",
            "control_points": [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            "polygons": [[0, 1, 2], [0, 2, 3]],
            "normals": { "mapping": "by_control_point", "reference": "direct",
                         "direct": [[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]] },
            "uvs": { "mapping": "by_polygon_vertex", "reference": "index_to_direct",
                     "direct": [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
                     "index": [0, 1, 2, 0, 2, 3] },
            "skins": [{ "clusters": [
                { "link": 0, "control_points": [0, 1, 2, 3], "weights": [2.0, 1.0, 1.0, 0.0] },
                { "link": 1, "control_points": [1, 2], "weights": [1.0, 3.0] }
            ] }]
        }),
        json!({
            "materials": [{
                "name": "Painted",
                "shading": "phong",
                "diffuse": { "color": [0.5, 0.5, 0.5], "factor": 1.0, "texture": "paint.png" },
                "specular": { "color": [1.0, 1.0, 1.0], "factor": 0.25, "texture": "paint_spec.png" }
            }]
        }),
    )
}

/// Triangle scene with an animation stack spanning frames `0..=stop_frame`
pub fn animated_scene(stop_frame: u32) -> Value {
    let mut scene = triangle_scene();
    scene["animation_stacks"] = json!([{
        "name": "Wave",
        "start": 0.0,
        "stop": stop_frame as f64 / 24.0,
        "tracks": [{
            "node": 1,
            "rotation": {
                "times": [0.0, 1.0],
                "values": [[0.0, 0.0, 0.0, 1.0], [0.0, 0.0, 0.7071068, 0.7071068]]
            }
        }]
    }]);
    scene
}
