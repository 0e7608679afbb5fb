//! In-memory scene graph consumed by the bake pipeline
//!
//! Importers (glTF, JSON scene descriptions) build a [`Scene`]; the pipeline
//! only reads it. Node identity is the [`NodeId`] assigned at import time and
//! never a reference into importer-owned objects.

mod description;
pub mod evaluate;
mod gltf_import;
mod layer;

pub use description::load_description;
pub use evaluate::Evaluator;
pub use gltf_import::import_gltf;
pub use layer::{LayerElement, MappingMode, ReferenceMode};

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Errors raised while importing or validating a scene
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load glTF {path:?}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: ::gltf::Error,
    },

    #[error("Failed to parse scene description {path:?}: {source}")]
    Description {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported scene format: {0:?} (use .gltf, .glb or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("Invalid scene: {0}")]
    InvalidScene(String),
}

/// Stable identifier of a scene node (its index in [`Scene::nodes`])
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Rest-pose local transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: [f32; 3],
    /// Quaternion [x, y, z, w]
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            scale: [1.0; 3],
        }
    }
}

impl Transform {
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::from(self.scale),
            Quat::from_array(self.rotation),
            Vec3::from(self.translation),
        )
    }
}

/// What a node carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeAttribute {
    #[default]
    None,
    /// Index into [`Scene::meshes`]
    Mesh { mesh: usize },
    /// Skeleton joint; `root` marks the top of a joint hierarchy
    Skeleton {
        #[serde(default)]
        root: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    /// Child order is significant: it defines joint enumeration order
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub attribute: NodeAttribute,
    #[serde(default)]
    pub transform: Transform,
    /// Derived from the children lists by [`Scene::finalize`]
    #[serde(skip)]
    pub parent: Option<NodeId>,
}

/// The binding between one joint and the control points it moves
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cluster {
    /// Bound joint node
    pub link: Option<NodeId>,
    pub control_points: Vec<u32>,
    /// One weight per entry of `control_points`
    pub weights: Vec<f64>,
    /// Global transform of the joint at bind time (column-major)
    #[serde(default)]
    pub bind_matrix: Option<[f32; 16]>,
}

/// Skin deformer: a set of clusters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SkinDeformer {
    pub clusters: Vec<Cluster>,
}

/// Polygon mesh geometry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshGeometry {
    pub name: String,
    pub control_points: Vec<[f32; 3]>,
    /// Triangles as control point indices
    pub polygons: Vec<[u32; 3]>,
    #[serde(default)]
    pub normals: Option<LayerElement<[f32; 3]>>,
    #[serde(default)]
    pub uvs: Option<LayerElement<[f32; 2]>>,
    #[serde(default)]
    pub skins: Vec<SkinDeformer>,
}

impl MeshGeometry {
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    pub fn control_point_count(&self) -> usize {
        self.control_points.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingModel {
    #[default]
    Lambert,
    Phong,
    /// Any non-Lambert-derived surface; skipped by the material export
    Other,
}

/// One color channel of a surface material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorChannel {
    pub color: [f32; 3],
    pub factor: f32,
    /// Relative texture file name
    pub texture: Option<String>,
}

impl Default for ColorChannel {
    fn default() -> Self {
        Self {
            color: [0.0; 3],
            factor: 1.0,
            texture: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceMaterial {
    pub name: String,
    #[serde(default)]
    pub shading: ShadingModel,
    #[serde(default)]
    pub emissive: ColorChannel,
    #[serde(default)]
    pub diffuse: ColorChannel,
    /// Only read for [`ShadingModel::Phong`]
    #[serde(default)]
    pub specular: ColorChannel,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub name: String,
    #[serde(default)]
    pub bind_pose: bool,
    pub nodes: Vec<NodeId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    #[default]
    Linear,
    Step,
}

/// Keyed values of one transform component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve<T> {
    #[serde(default)]
    pub interpolation: Interpolation,
    /// Key times in seconds, ascending
    pub times: Vec<f32>,
    pub values: Vec<T>,
}

/// Animated transform components of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTrack {
    pub node: NodeId,
    #[serde(default)]
    pub translation: Option<Curve<[f32; 3]>>,
    #[serde(default)]
    pub rotation: Option<Curve<[f32; 4]>>,
    #[serde(default)]
    pub scale: Option<Curve<[f32; 3]>>,
}

impl NodeTrack {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            translation: None,
            rotation: None,
            scale: None,
        }
    }
}

/// One animation take with its local time span
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimationStack {
    pub name: String,
    /// Span start in seconds
    pub start: f64,
    /// Span stop in seconds
    pub stop: f64,
    #[serde(default)]
    pub tracks: Vec<NodeTrack>,
}

/// An imported scene
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scene {
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub meshes: Vec<MeshGeometry>,
    #[serde(default)]
    pub materials: Vec<SurfaceMaterial>,
    #[serde(default)]
    pub poses: Vec<Pose>,
    #[serde(default)]
    pub animation_stacks: Vec<AnimationStack>,
    /// Active stack; the first stack when unset
    #[serde(default)]
    pub current_stack: Option<usize>,
}

impl Scene {
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Total polygon count across all mesh geometries
    pub fn poly_count(&self) -> usize {
        self.meshes.iter().map(MeshGeometry::polygon_count).sum()
    }

    /// The first pose flagged as a bind pose
    pub fn bind_pose(&self) -> Option<&Pose> {
        self.poses.iter().find(|p| p.bind_pose)
    }

    /// The first node of `pose` that is a skeleton root
    pub fn skeleton_root(&self, pose: &Pose) -> Option<NodeId> {
        pose.nodes.iter().copied().find(|&id| {
            matches!(
                self.node(id).map(|n| n.attribute),
                Some(NodeAttribute::Skeleton { root: true })
            )
        })
    }

    pub fn is_joint(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).map(|n| n.attribute),
            Some(NodeAttribute::Skeleton { .. })
        )
    }

    /// Mesh nodes in node order, with their geometry
    pub fn mesh_nodes(&self) -> impl Iterator<Item = (NodeId, &Node, &MeshGeometry)> {
        self.nodes.iter().enumerate().filter_map(|(i, node)| match node.attribute {
            NodeAttribute::Mesh { mesh } => self
                .meshes
                .get(mesh)
                .map(|geometry| (NodeId(i as u32), node, geometry)),
            _ => None,
        })
    }

    /// Find a mesh by geometry or node name, or the first mesh when `name` is `None`
    pub fn find_mesh(&self, name: Option<&str>) -> Option<(NodeId, &MeshGeometry)> {
        let mut meshes = self.mesh_nodes();
        match name {
            None => meshes.next(),
            Some(name) => meshes.find(|(_, node, geometry)| geometry.name == name || node.name == name),
        }
        .map(|(id, _, geometry)| (id, geometry))
    }

    /// The active animation stack
    pub fn active_stack(&self) -> Option<&AnimationStack> {
        match self.current_stack {
            Some(index) => self.animation_stacks.get(index),
            None => self.animation_stacks.first(),
        }
    }

    /// Global transform of `node` at `time` seconds under the active stack
    pub fn evaluate_global_transform(&self, node: NodeId, time: f64) -> Mat4 {
        Evaluator::new(self, self.active_stack()).global_transform(node, time)
    }

    /// Derive parent links and check every cross-reference.
    pub fn finalize(mut self) -> Result<Self, ImportError> {
        let node_count = self.nodes.len();
        let check_node = |id: NodeId, what: &str| {
            if id.index() < node_count {
                Ok(())
            } else {
                Err(ImportError::InvalidScene(format!(
                    "{what} references node {} but the scene has {node_count} nodes",
                    id.0
                )))
            }
        };

        let mut parents: Vec<Option<NodeId>> = vec![None; node_count];
        for (index, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                check_node(child, "Node children")?;
                if child.index() == index || parents[child.index()].is_some() {
                    return Err(ImportError::InvalidScene(format!(
                        "Node {} has more than one parent",
                        child.0
                    )));
                }
                parents[child.index()] = Some(NodeId(index as u32));
            }
        }

        // A chain longer than the node count means a cycle
        for start in 0..node_count {
            let mut current = parents[start];
            let mut steps = 0;
            while let Some(parent) = current {
                steps += 1;
                if steps > node_count {
                    return Err(ImportError::InvalidScene(format!(
                        "Node {start} is part of a parent cycle"
                    )));
                }
                current = parents[parent.index()];
            }
        }

        for (node, parent) in self.nodes.iter_mut().zip(parents) {
            node.parent = parent;
            if let NodeAttribute::Mesh { mesh } = node.attribute {
                if mesh >= self.meshes.len() {
                    return Err(ImportError::InvalidScene(format!(
                        "Node '{}' references mesh {mesh} but the scene has {} meshes",
                        node.name,
                        self.meshes.len()
                    )));
                }
            }
        }

        for mesh in &self.meshes {
            let count = mesh.control_points.len() as u32;
            if let Some(polygon) = mesh.polygons.iter().find(|p| p.iter().any(|&i| i >= count)) {
                return Err(ImportError::InvalidScene(format!(
                    "Mesh '{}' polygon {polygon:?} exceeds {count} control points",
                    mesh.name
                )));
            }
            for cluster in mesh.skins.iter().flat_map(|s| &s.clusters) {
                if let Some(link) = cluster.link {
                    check_node(link, "Cluster link")?;
                }
            }
        }

        for pose in &self.poses {
            for &id in &pose.nodes {
                check_node(id, "Pose")?;
            }
        }

        for stack in &self.animation_stacks {
            for track in &stack.tracks {
                check_node(track.node, "Animation track")?;
                let lengths = [
                    track.translation.as_ref().map(|c| (c.times.len(), c.values.len())),
                    track.rotation.as_ref().map(|c| (c.times.len(), c.values.len())),
                    track.scale.as_ref().map(|c| (c.times.len(), c.values.len())),
                ];
                if lengths.iter().flatten().any(|(times, values)| times != values) {
                    return Err(ImportError::InvalidScene(format!(
                        "Animation '{}' has a curve with mismatched key and value counts",
                        stack.name
                    )));
                }
            }
        }

        if let Some(index) = self.current_stack {
            if index >= self.animation_stacks.len() {
                return Err(ImportError::InvalidScene(format!(
                    "Current animation stack {index} does not exist"
                )));
            }
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn joint(name: &str, root: bool, children: &[u32]) -> Node {
        Node {
            name: name.to_string(),
            children: children.iter().map(|&c| NodeId(c)).collect(),
            attribute: NodeAttribute::Skeleton { root },
            ..Node::default()
        }
    }

    #[test]
    fn test_finalize_derives_parents() {
        let scene = Scene {
            nodes: vec![joint("root", true, &[1, 2]), joint("a", false, &[]), joint("b", false, &[])],
            ..Scene::default()
        }
        .finalize()
        .unwrap();

        assert_eq!(scene.nodes[0].parent, None);
        assert_eq!(scene.nodes[1].parent, Some(NodeId(0)));
        assert_eq!(scene.nodes[2].parent, Some(NodeId(0)));
    }

    #[test]
    fn test_finalize_rejects_shared_child() {
        let result = Scene {
            nodes: vec![joint("a", true, &[2]), joint("b", false, &[2]), joint("c", false, &[])],
            ..Scene::default()
        }
        .finalize();
        assert!(matches!(result, Err(ImportError::InvalidScene(_))));
    }

    #[test]
    fn test_finalize_rejects_cycle() {
        let result = Scene {
            nodes: vec![joint("a", false, &[1]), joint("b", false, &[0])],
            ..Scene::default()
        }
        .finalize();
        assert!(matches!(result, Err(ImportError::InvalidScene(_))));
    }

    #[test]
    fn test_finalize_rejects_polygon_out_of_range() {
        let result = Scene {
            meshes: vec![MeshGeometry {
                name: "tri".into(),
                control_points: vec![[0.0; 3]; 2],
                polygons: vec![[0, 1, 2]],
                ..MeshGeometry::default()
            }],
            ..Scene::default()
        }
        .finalize();
        assert!(matches!(result, Err(ImportError::InvalidScene(_))));
    }

    #[test]
    fn test_find_mesh_by_geometry_or_node_name() {
        let scene = Scene {
            nodes: vec![
                Node {
                    name: "BodyNode".into(),
                    attribute: NodeAttribute::Mesh { mesh: 0 },
                    ..Node::default()
                },
                Node {
                    name: "HeadNode".into(),
                    attribute: NodeAttribute::Mesh { mesh: 1 },
                    ..Node::default()
                },
            ],
            meshes: vec![
                MeshGeometry {
                    name: "Body".into(),
                    ..MeshGeometry::default()
                },
                MeshGeometry {
                    name: "Head".into(),
                    ..MeshGeometry::default()
                },
            ],
            ..Scene::default()
        }
        .finalize()
        .unwrap();

        assert_eq!(scene.find_mesh(None).unwrap().1.name, "Body");
        assert_eq!(scene.find_mesh(Some("Head")).unwrap().0, NodeId(1));
        assert_eq!(scene.find_mesh(Some("HeadNode")).unwrap().1.name, "Head");
        assert!(scene.find_mesh(Some("Tail")).is_none());
    }

    #[test]
    fn test_skeleton_root_from_bind_pose() {
        let scene = Scene {
            nodes: vec![joint("child", false, &[]), joint("root", true, &[0])],
            poses: vec![
                Pose {
                    name: "rest".into(),
                    bind_pose: false,
                    nodes: vec![NodeId(1)],
                },
                Pose {
                    name: "bind".into(),
                    bind_pose: true,
                    nodes: vec![NodeId(0), NodeId(1)],
                },
            ],
            ..Scene::default()
        }
        .finalize()
        .unwrap();

        let pose = scene.bind_pose().unwrap();
        assert_eq!(pose.name, "bind");
        assert_eq!(scene.skeleton_root(pose), Some(NodeId(1)));
    }

    #[test]
    fn test_global_transform_under_active_stack() {
        let mut track = NodeTrack::new(NodeId(0));
        track.scale = Some(Curve {
            interpolation: Interpolation::Step,
            times: vec![0.0, 1.0],
            values: vec![[1.0; 3], [2.0; 3]],
        });
        let mut child = joint("child", false, &[]);
        child.transform.translation = [0.0, 0.0, 3.0];
        let scene = Scene {
            nodes: vec![joint("root", true, &[1]), child],
            animation_stacks: vec![
                AnimationStack {
                    name: "idle".into(),
                    ..AnimationStack::default()
                },
                AnimationStack {
                    name: "grow".into(),
                    start: 0.0,
                    stop: 1.0,
                    tracks: vec![track],
                },
            ],
            current_stack: Some(1),
            ..Scene::default()
        }
        .finalize()
        .unwrap();

        assert_eq!(scene.active_stack().unwrap().name, "grow");
        assert_eq!(scene.evaluate_global_transform(NodeId(1), 0.5).w_axis.z, 3.0);
        assert_eq!(scene.evaluate_global_transform(NodeId(1), 1.0).w_axis.z, 6.0);
    }

    #[test]
    fn test_finalize_rejects_missing_current_stack() {
        let result = Scene {
            current_stack: Some(0),
            ..Scene::default()
        }
        .finalize();
        assert!(matches!(result, Err(ImportError::InvalidScene(_))));
    }

    #[test]
    fn test_poly_count_sums_meshes() {
        let scene = Scene {
            meshes: vec![
                MeshGeometry {
                    control_points: vec![[0.0; 3]; 3],
                    polygons: vec![[0, 1, 2]; 4],
                    ..MeshGeometry::default()
                },
                MeshGeometry {
                    control_points: vec![[0.0; 3]; 3],
                    polygons: vec![[0, 1, 2]; 2],
                    ..MeshGeometry::default()
                },
            ],
            ..Scene::default()
        };
        assert_eq!(scene.poly_count(), 6);
    }
}
