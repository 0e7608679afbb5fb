//! Animation baker (active animation stack -> .anim)
//!
//! Samples every joint's global transform at a fixed 24 fps over the active
//! stack's frame span.

use std::path::Path;

use bake_common::{AnimationClip, JointPose, Keyframe, FRAMES_PER_SECOND};
use glam::Mat4;

use crate::error::ExportError;
use crate::formats::write_animation_file;
use crate::scene::{Evaluator, NodeId, Scene};
use crate::session::ImportSession;
use crate::skeleton::Skeleton;

/// Statistics of one animation bake
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSummary {
    pub stack: String,
    pub start_frame: i64,
    pub end_frame: i64,
    pub frame_count: usize,
    pub joint_count: usize,
    pub duration: f64,
}

/// Convert seconds to a 24 fps frame index
///
/// Truncates toward zero, except that values close to a whole frame snap to
/// it so that `n / 24` seconds maps back to frame `n`. The snap window grows
/// with the frame number to absorb the rounding of `f32` key times.
pub fn frame_index(seconds: f64) -> i64 {
    let frames = seconds * FRAMES_PER_SECOND;
    let nearest = frames.round();
    let tolerance = (nearest.abs() * f64::from(f32::EPSILON)).max(1e-6);
    if (frames - nearest).abs() < tolerance {
        nearest as i64
    } else {
        frames.trunc() as i64
    }
}

/// Inverse bind transform of a joint, from the first cluster bound to it
/// that carries a bind matrix
fn inverse_bind(scene: &Scene, joint: NodeId) -> [f32; 16] {
    scene
        .meshes
        .iter()
        .flat_map(|m| &m.skins)
        .flat_map(|s| &s.clusters)
        .filter(|c| c.link == Some(joint))
        .find_map(|c| c.bind_matrix)
        .map(|bind| Mat4::from_cols_array(&bind).inverse().to_cols_array())
        .unwrap_or_else(|| Mat4::IDENTITY.to_cols_array())
}

/// Bake the active animation stack of an open session
///
/// Produces one keyframe per frame in `[start, end)`; the clip duration counts
/// both endpoints.
pub fn bake(session: &ImportSession) -> Result<(AnimationClip, ClipSummary), ExportError> {
    let scene = session.scene();
    let skeleton = Skeleton::from_bind_pose(scene)?;
    let stack = scene.active_stack().ok_or(ExportError::MissingAnimationStack)?;

    let start_frame = frame_index(stack.start);
    let end_frame = frame_index(stack.stop);
    let duration = (end_frame - start_frame + 1) as f64;

    let inverse_binds: Vec<[f32; 16]> = skeleton
        .joints()
        .iter()
        .map(|joint| inverse_bind(scene, joint.node))
        .collect();

    let evaluator = Evaluator::new(scene, Some(stack));
    let frames: Vec<Keyframe> = (start_frame..end_frame)
        .map(|frame| {
            let time = frame as f64 / FRAMES_PER_SECOND;
            let joints = skeleton
                .joints()
                .iter()
                .zip(&inverse_binds)
                .map(|(joint, inverse)| JointPose {
                    global_xform: evaluator.global_transform(joint.node, time).to_cols_array(),
                    inverse_xform: *inverse,
                    parent_index: joint.parent_index,
                })
                .collect();
            Keyframe { time, joints }
        })
        .collect();

    let summary = ClipSummary {
        stack: stack.name.clone(),
        start_frame,
        end_frame,
        frame_count: frames.len(),
        joint_count: skeleton.len(),
        duration,
    };
    Ok((AnimationClip { duration, frames }, summary))
}

/// Bake the active animation stack of a scene file to the animation format
pub fn export_animation(input: &Path, output: &Path) -> Result<ClipSummary, ExportError> {
    let session = ImportSession::open(input)?;
    let (clip, summary) = bake(&session)?;
    write_animation_file(output, &clip)?;

    tracing::info!(
        "Exported animation '{}': frames {}..{}, {} keyframes x {} joints -> {:?}",
        summary.stack,
        summary.start_frame,
        summary.end_frame,
        summary.frame_count,
        summary.joint_count,
        output
    );
    Ok(summary)
}
