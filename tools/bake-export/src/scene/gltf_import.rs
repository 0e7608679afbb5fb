//! glTF / GLB importer

use std::collections::BTreeMap;
use std::path::Path;

use glam::Mat4;
use gltf::animation::util::ReadOutputs;
use hashbrown::HashSet;

use super::{
    AnimationStack, Cluster, ColorChannel, Curve, ImportError, Interpolation, LayerElement,
    MappingMode, MeshGeometry, Node, NodeAttribute, NodeId, NodeTrack, Pose, Scene, ShadingModel,
    SkinDeformer, SurfaceMaterial, Transform,
};

/// Import a `.gltf` or `.glb` file
///
/// Buffers are loaded but images are not; texture references are kept as paths.
pub fn import_gltf(path: &Path) -> Result<Scene, ImportError> {
    let gltf_error = |source| ImportError::Gltf {
        path: path.to_path_buf(),
        source,
    };

    let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(gltf_error)?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(gltf_error)?;

    build_scene(&document, &buffers)?.finalize()
}

fn build_scene(document: &gltf::Document, buffers: &[gltf::buffer::Data]) -> Result<Scene, ImportError> {
    let joints: HashSet<usize> = document
        .skins()
        .flat_map(|skin| skin.joints().map(|j| j.index()))
        .collect();

    let mut parents = vec![None; document.nodes().len()];
    for node in document.nodes() {
        for child in node.children() {
            parents[child.index()] = Some(node.index());
        }
    }

    let mut scene = Scene::default();
    let mut skinned_nodes = Vec::new();

    for node in document.nodes() {
        let index = node.index();
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("node{index}"));
        let (translation, rotation, scale) = node.transform().decomposed();

        let attribute = if joints.contains(&index) {
            // One attribute per node; joints take precedence over meshes
            if node.mesh().is_some() {
                tracing::warn!("Joint '{}' also holds a mesh; the mesh is not imported", name);
            }
            let root = !parents[index].is_some_and(|p| joints.contains(&p));
            NodeAttribute::Skeleton { root }
        } else if let Some(mesh) = node.mesh() {
            let geometry = convert_mesh(&node, &mesh, &name, buffers)?;
            if !geometry.skins.is_empty() {
                skinned_nodes.push(NodeId(index as u32));
            }
            scene.meshes.push(geometry);
            NodeAttribute::Mesh {
                mesh: scene.meshes.len() - 1,
            }
        } else {
            NodeAttribute::None
        };

        scene.nodes.push(Node {
            name,
            children: node.children().map(|c| NodeId(c.index() as u32)).collect(),
            attribute,
            transform: Transform {
                translation,
                rotation,
                scale,
            },
            parent: None,
        });
    }

    if !joints.is_empty() {
        let mut nodes: Vec<NodeId> = joints.iter().map(|&j| NodeId(j as u32)).collect();
        nodes.sort();
        nodes.extend(skinned_nodes);
        scene.poses.push(Pose {
            name: "bind_pose".to_string(),
            bind_pose: true,
            nodes,
        });
    }

    for material in document.materials() {
        scene.materials.push(convert_material(&material));
    }

    for animation in document.animations() {
        scene.animation_stacks.push(convert_animation(&animation, buffers)?);
    }
    if !scene.animation_stacks.is_empty() {
        scene.current_stack = Some(0);
    }

    Ok(scene)
}

/// Merge the triangle primitives of a mesh node into one geometry
fn convert_mesh(
    node: &gltf::Node,
    mesh: &gltf::Mesh,
    node_name: &str,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshGeometry, ImportError> {
    let mut geometry = MeshGeometry {
        name: mesh.name().unwrap_or(node_name).to_string(),
        ..MeshGeometry::default()
    };
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut has_normals = false;
    let mut has_uvs = false;

    let skin = node.skin();
    let mut clusters: Vec<Cluster> = match &skin {
        Some(skin) => {
            let reader = skin.reader(|buffer| Some(&buffers[buffer.index()]));
            let mut inverse_binds = reader.read_inverse_bind_matrices();
            skin.joints()
                .map(|joint| {
                    let bind_matrix = inverse_binds
                        .as_mut()
                        .and_then(Iterator::next)
                        .map(|ibm| Mat4::from_cols_array_2d(&ibm).inverse().to_cols_array());
                    Cluster {
                        link: Some(NodeId(joint.index() as u32)),
                        bind_matrix,
                        ..Cluster::default()
                    }
                })
                .collect()
        }
        None => Vec::new(),
    };

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            tracing::debug!("Skipping non-triangle primitive in mesh '{}'", geometry.name);
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<[f32; 3]> = positions.collect();
        let offset = geometry.control_points.len() as u32;
        let count = positions.len();

        match reader.read_normals() {
            Some(iter) => {
                has_normals = true;
                normals.extend(iter);
            }
            None => normals.extend(std::iter::repeat_n([0.0; 3], count)),
        }
        match reader.read_tex_coords(0) {
            Some(iter) => {
                has_uvs = true;
                uvs.extend(iter.into_f32());
            }
            None => uvs.extend(std::iter::repeat_n([0.0; 2], count)),
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(iter) => iter.into_u32().collect(),
            None => (0..count as u32).collect(),
        };
        for triangle in indices.chunks_exact(3) {
            geometry
                .polygons
                .push([triangle[0] + offset, triangle[1] + offset, triangle[2] + offset]);
        }

        if !clusters.is_empty() {
            if let (Some(joint_iter), Some(weight_iter)) = (reader.read_joints(0), reader.read_weights(0)) {
                for (vertex, (joint_set, weights)) in joint_iter.into_u16().zip(weight_iter.into_f32()).enumerate() {
                    for (joint, weight) in joint_set.into_iter().zip(weights) {
                        if weight <= 0.0 {
                            continue;
                        }
                        let cluster = clusters.get_mut(joint as usize).ok_or_else(|| {
                            ImportError::InvalidScene(format!(
                                "Mesh '{}' references joint {joint} outside its skin",
                                geometry.name
                            ))
                        })?;
                        cluster.control_points.push(offset + vertex as u32);
                        cluster.weights.push(f64::from(weight));
                    }
                }
            }
        }

        geometry.control_points.extend(positions);
    }

    if has_normals {
        geometry.normals = Some(LayerElement::direct(MappingMode::ByControlPoint, normals));
    }
    if has_uvs {
        geometry.uvs = Some(LayerElement::direct(MappingMode::ByControlPoint, uvs));
    }
    if skin.is_some() {
        geometry.skins.push(SkinDeformer { clusters });
    }

    Ok(geometry)
}

/// Map a PBR material onto the Lambert channels
fn convert_material(material: &gltf::Material) -> SurfaceMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material{}", material.index().unwrap_or(0)));

    SurfaceMaterial {
        name,
        shading: ShadingModel::Lambert,
        emissive: ColorChannel {
            color: material.emissive_factor(),
            factor: 1.0,
            texture: material.emissive_texture().and_then(|info| texture_uri(&info.texture())),
        },
        diffuse: ColorChannel {
            color: [r, g, b],
            factor: 1.0,
            texture: pbr.base_color_texture().and_then(|info| texture_uri(&info.texture())),
        },
        specular: ColorChannel::default(),
    }
}

fn texture_uri(texture: &gltf::Texture) -> Option<String> {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } => Some(uri.to_string()),
        gltf::image::Source::View { .. } => None,
    }
}

fn convert_animation(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
) -> Result<AnimationStack, ImportError> {
    let name = animation
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("animation{}", animation.index()));
    let mut tracks: BTreeMap<usize, NodeTrack> = BTreeMap::new();
    let mut span: Option<(f32, f32)> = None;

    for channel in animation.channels() {
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();
        if let (Some(&first), Some(&last)) = (times.first(), times.last()) {
            span = Some(match span {
                Some((start, stop)) => (start.min(first), stop.max(last)),
                None => (first, last),
            });
        }

        let (interpolation, cubic) = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => (Interpolation::Linear, false),
            gltf::animation::Interpolation::Step => (Interpolation::Step, false),
            // Tangents are dropped; the key values are interpolated linearly
            gltf::animation::Interpolation::CubicSpline => (Interpolation::Linear, true),
        };

        let node = channel.target().node().index();
        let track = tracks
            .entry(node)
            .or_insert_with(|| NodeTrack::new(NodeId(node as u32)));

        match reader.read_outputs() {
            Some(ReadOutputs::Translations(iter)) => {
                track.translation = Some(curve(interpolation, &times, iter.collect(), cubic));
            }
            Some(ReadOutputs::Rotations(iter)) => {
                track.rotation = Some(curve(interpolation, &times, iter.into_f32().collect(), cubic));
            }
            Some(ReadOutputs::Scales(iter)) => {
                track.scale = Some(curve(interpolation, &times, iter.collect(), cubic));
            }
            Some(ReadOutputs::MorphTargetWeights(_)) | None => {
                tracing::debug!("Skipping morph/empty channel in animation '{}'", name);
            }
        }
    }

    let (start, stop) = span.unwrap_or((0.0, 0.0));
    Ok(AnimationStack {
        name,
        start: f64::from(start),
        stop: f64::from(stop),
        tracks: tracks.into_values().collect(),
    })
}

fn curve<T: Copy>(interpolation: Interpolation, times: &[f32], values: Vec<T>, cubic: bool) -> Curve<T> {
    let values = if cubic {
        // (in-tangent, value, out-tangent) triplets
        values.chunks_exact(3).map(|c| c[1]).collect()
    } else {
        values
    };
    Curve {
        interpolation,
        times: times.to_vec(),
        values,
    }
}
