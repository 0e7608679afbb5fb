//! Joint hierarchy flattening
//!
//! Joints are enumerated breadth-first from the bind pose's root skeleton node,
//! following skeleton children in scene order. That order is the joint index
//! used by the mesh and animation exports.

use std::collections::VecDeque;

use hashbrown::HashMap;

use crate::error::ExportError;
use crate::scene::{NodeId, Scene};

#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonJoint {
    pub node: NodeId,
    pub name: String,
    /// Index of the parent joint, -1 for the root
    pub parent_index: i32,
}

/// Flattened joint list with node lookup
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: Vec<SkeletonJoint>,
    lookup: HashMap<NodeId, usize>,
}

impl Skeleton {
    /// Flatten the skeleton rooted at the bind pose's root joint
    pub fn from_bind_pose(scene: &Scene) -> Result<Self, ExportError> {
        let pose = scene.bind_pose().ok_or(ExportError::MissingBindPose)?;
        let root = scene
            .skeleton_root(pose)
            .ok_or(ExportError::MissingSkeletonRoot)?;
        Ok(Self::from_root(scene, root))
    }

    /// Breadth-first enumeration from `root`
    pub fn from_root(scene: &Scene, root: NodeId) -> Self {
        let mut skeleton = Self::default();
        let mut queue = VecDeque::from([(root, -1)]);

        while let Some((id, parent_index)) = queue.pop_front() {
            let Some(node) = scene.node(id) else {
                continue;
            };
            let index = skeleton.joints.len();
            skeleton.joints.push(SkeletonJoint {
                node: id,
                name: node.name.clone(),
                parent_index,
            });
            skeleton.lookup.insert(id, index);

            for &child in &node.children {
                if scene.is_joint(child) {
                    queue.push_back((child, index as i32));
                }
            }
        }

        skeleton
    }

    pub fn joints(&self) -> &[SkeletonJoint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Joint index of a node, if it belongs to this skeleton
    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        self.lookup.get(&node).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Node, NodeAttribute, Pose};

    fn node(name: &str, attribute: NodeAttribute, children: &[u32]) -> Node {
        Node {
            name: name.into(),
            children: children.iter().map(|&c| NodeId(c)).collect(),
            attribute,
            ..Node::default()
        }
    }

    fn joint(name: &str, children: &[u32]) -> Node {
        node(name, NodeAttribute::Skeleton { root: false }, children)
    }

    /// hips -> (spine -> head, leg_l, leg_r), plus a non-joint helper under hips
    fn rig() -> Scene {
        Scene {
            nodes: vec![
                node("hips", NodeAttribute::Skeleton { root: true }, &[1, 5, 2, 3]),
                joint("spine", &[4]),
                joint("leg_l", &[]),
                joint("leg_r", &[]),
                joint("head", &[]),
                node("helper", NodeAttribute::None, &[]),
            ],
            poses: vec![Pose {
                name: "bind".into(),
                bind_pose: true,
                nodes: vec![NodeId(4), NodeId(0)],
            }],
            ..Scene::default()
        }
        .finalize()
        .unwrap()
    }

    #[test]
    fn test_breadth_first_order() {
        let skeleton = Skeleton::from_bind_pose(&rig()).unwrap();
        let names: Vec<&str> = skeleton.joints().iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, ["hips", "spine", "leg_l", "leg_r", "head"]);

        let parents: Vec<i32> = skeleton.joints().iter().map(|j| j.parent_index).collect();
        assert_eq!(parents, [-1, 0, 0, 0, 1]);
    }

    #[test]
    fn test_lookup_by_node() {
        let skeleton = Skeleton::from_bind_pose(&rig()).unwrap();
        assert_eq!(skeleton.index_of(NodeId(4)), Some(4));
        assert_eq!(skeleton.index_of(NodeId(5)), None);
        assert_eq!(skeleton.len(), 5);
    }

    #[test]
    fn test_order_is_stable() {
        let scene = rig();
        let a = Skeleton::from_bind_pose(&scene).unwrap();
        let b = Skeleton::from_bind_pose(&scene).unwrap();
        assert_eq!(a.joints(), b.joints());
    }

    #[test]
    fn test_missing_bind_pose() {
        let mut scene = rig();
        scene.poses[0].bind_pose = false;
        assert!(matches!(
            Skeleton::from_bind_pose(&scene),
            Err(ExportError::MissingBindPose)
        ));
    }

    #[test]
    fn test_missing_skeleton_root() {
        let mut scene = rig();
        scene.poses[0].nodes = vec![NodeId(4)];
        assert!(matches!(
            Skeleton::from_bind_pose(&scene),
            Err(ExportError::MissingSkeletonRoot)
        ));
    }
}
