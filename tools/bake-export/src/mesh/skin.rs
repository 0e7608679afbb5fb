//! Skin influence table
//!
//! Every control point keeps the four strongest (joint, weight) pairs found
//! across all skin deformers of a mesh.

use bake_common::MAX_INFLUENCES;

use crate::error::ExportError;
use crate::options::{ExportOptions, InfluencePolicy};
use crate::scene::MeshGeometry;
use crate::skeleton::Skeleton;

/// A candidate must beat a slot by more than this to take it
pub const INFLUENCE_TOLERANCE: f32 = 0.0001;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Influence {
    pub joint: i32,
    pub weight: f32,
}

pub type InfluenceSet = [Influence; MAX_INFLUENCES];

/// Place `candidate` into `set` according to `policy`
///
/// Returns whether a slot was taken.
pub fn insert(set: &mut InfluenceSet, candidate: Influence, policy: InfluencePolicy) -> bool {
    match policy {
        InfluencePolicy::FirstEligible => {
            for slot in set.iter_mut() {
                if candidate.weight - slot.weight > INFLUENCE_TOLERANCE {
                    *slot = candidate;
                    return true;
                }
            }
            false
        }
        InfluencePolicy::ReplaceWeakest => {
            let mut weakest = 0;
            for (i, slot) in set.iter().enumerate() {
                if slot.weight < set[weakest].weight {
                    weakest = i;
                }
            }
            if candidate.weight - set[weakest].weight > INFLUENCE_TOLERANCE {
                set[weakest] = candidate;
                true
            } else {
                false
            }
        }
    }
}

/// Joint indices and weights divided by their sum
///
/// A set with zero total weight is returned unscaled (all zero weights).
pub fn normalize(set: &InfluenceSet) -> ([i32; MAX_INFLUENCES], [f32; MAX_INFLUENCES]) {
    let joints = set.map(|i| i.joint);
    let weights = set.map(|i| i.weight);
    let total: f32 = weights.iter().sum();
    if total > 0.0 {
        (joints, weights.map(|w| w / total))
    } else {
        (joints, weights)
    }
}

/// Influence sets indexed by control point
#[derive(Debug, Clone, Default)]
pub struct InfluenceTable {
    sets: Vec<InfluenceSet>,
}

impl InfluenceTable {
    pub fn build(
        mesh: &MeshGeometry,
        skeleton: &Skeleton,
        options: &ExportOptions,
    ) -> Result<Self, ExportError> {
        let control_points = mesh.control_point_count();
        let mut sets = vec![InfluenceSet::default(); control_points];
        let unbound_joint = skeleton.len() as i32;

        for (deformer_index, deformer) in mesh.skins.iter().enumerate() {
            for (cluster_index, cluster) in deformer.clusters.iter().enumerate() {
                if cluster.control_points.len() != cluster.weights.len() {
                    return Err(ExportError::MalformedDeformer(format!(
                        "cluster {cluster_index} of deformer {deformer_index} has {} control points but {} weights",
                        cluster.control_points.len(),
                        cluster.weights.len()
                    )));
                }

                let joint = match cluster.link.and_then(|link| skeleton.index_of(link)) {
                    Some(index) => index as i32,
                    None if options.strict_joint_binding => {
                        return Err(ExportError::UnboundCluster {
                            deformer: deformer_index,
                            cluster: cluster_index,
                        });
                    }
                    None => {
                        tracing::warn!(
                            "Cluster {} of deformer {} in mesh '{}' is not bound to a skeleton joint",
                            cluster_index,
                            deformer_index,
                            mesh.name
                        );
                        unbound_joint
                    }
                };

                for (&point, &weight) in cluster.control_points.iter().zip(&cluster.weights) {
                    let set = sets.get_mut(point as usize).ok_or_else(|| {
                        ExportError::MalformedDeformer(format!(
                            "cluster {cluster_index} of deformer {deformer_index} references control point {point} of {control_points}"
                        ))
                    })?;
                    insert(
                        set,
                        Influence {
                            joint,
                            weight: weight as f32,
                        },
                        options.influence_policy,
                    );
                }
            }
        }

        Ok(Self { sets })
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, control_point: usize) -> Option<&InfluenceSet> {
        self.sets.get(control_point)
    }

    /// Control points left without any weight
    pub fn zero_weight_count(&self) -> usize {
        self.sets
            .iter()
            .filter(|set| set.iter().map(|i| i.weight).sum::<f32>() <= 0.0)
            .count()
    }
}
