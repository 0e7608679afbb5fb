//! Node transform evaluation at arbitrary times

use glam::{Mat4, Quat, Vec3};
use hashbrown::HashMap;

use super::{AnimationStack, Curve, Interpolation, NodeId, NodeTrack, Scene};

/// Evaluates node transforms against one animation stack
///
/// Nodes without a track keep their rest transform.
pub struct Evaluator<'a> {
    scene: &'a Scene,
    tracks: HashMap<NodeId, &'a NodeTrack>,
}

impl<'a> Evaluator<'a> {
    pub fn new(scene: &'a Scene, stack: Option<&'a AnimationStack>) -> Self {
        let tracks = stack
            .map(|s| s.tracks.iter().map(|t| (t.node, t)).collect())
            .unwrap_or_default();
        Self { scene, tracks }
    }

    /// Local transform of `node` at `time` seconds
    pub fn local_transform(&self, node: NodeId, time: f64) -> Mat4 {
        let Some(rest) = self.scene.node(node).map(|n| n.transform) else {
            return Mat4::IDENTITY;
        };
        let Some(track) = self.tracks.get(&node) else {
            return rest.to_mat4();
        };

        let t = time as f32;
        let translation = track
            .translation
            .as_ref()
            .and_then(|c| sample_vec3(c, t))
            .unwrap_or(rest.translation);
        let rotation = track
            .rotation
            .as_ref()
            .and_then(|c| sample_quat(c, t))
            .unwrap_or_else(|| Quat::from_array(rest.rotation));
        let scale = track
            .scale
            .as_ref()
            .and_then(|c| sample_vec3(c, t))
            .unwrap_or(rest.scale);

        Mat4::from_scale_rotation_translation(
            Vec3::from(scale),
            rotation,
            Vec3::from(translation),
        )
    }

    /// Global transform of `node` at `time` seconds
    pub fn global_transform(&self, node: NodeId, time: f64) -> Mat4 {
        let mut matrix = self.local_transform(node, time);
        let mut current = self.scene.node(node).and_then(|n| n.parent);
        while let Some(parent) = current {
            matrix = self.local_transform(parent, time) * matrix;
            current = self.scene.node(parent).and_then(|n| n.parent);
        }
        matrix
    }
}

/// Locate the keyframe pair around `t` and the blend factor between them
///
/// Returns `None` for empty curves. Past either end the nearest key is held.
fn locate(times: &[f32], interpolation: Interpolation, t: f32) -> Option<(usize, usize, f32)> {
    if times.is_empty() {
        return None;
    }

    let mut i = 0;
    while i < times.len() - 1 && times[i + 1] < t {
        i += 1;
    }

    if i >= times.len() - 1 {
        return Some((i, i, 0.0));
    }

    let t0 = times[i];
    let t1 = times[i + 1];
    let factor = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
    let factor = factor.clamp(0.0, 1.0);

    match interpolation {
        Interpolation::Linear => Some((i, i + 1, factor)),
        // Step holds the earlier key until the next one is reached
        Interpolation::Step if factor >= 1.0 => Some((i + 1, i + 1, 0.0)),
        Interpolation::Step => Some((i, i, 0.0)),
    }
}

fn sample_vec3(curve: &Curve<[f32; 3]>, t: f32) -> Option<[f32; 3]> {
    let (a, b, factor) = locate(&curve.times, curve.interpolation, t)?;
    let v0 = Vec3::from(*curve.values.get(a)?);
    let v1 = Vec3::from(*curve.values.get(b)?);
    Some(v0.lerp(v1, factor).to_array())
}

fn sample_quat(curve: &Curve<[f32; 4]>, t: f32) -> Option<Quat> {
    let (a, b, factor) = locate(&curve.times, curve.interpolation, t)?;
    let q0 = Quat::from_array(*curve.values.get(a)?).normalize();
    let q1 = Quat::from_array(*curve.values.get(b)?).normalize();
    Some(if a == b { q0 } else { q0.slerp(q1, factor) })
}
