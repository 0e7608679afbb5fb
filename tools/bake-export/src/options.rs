//! Export behavior switches

use serde::{Deserialize, Serialize};

/// How a new influence claims one of the four slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InfluencePolicy {
    /// First slot the candidate beats by more than the tolerance
    #[default]
    FirstEligible,
    /// The weakest slot, if the candidate beats it by more than the tolerance
    ReplaceWeakest,
}

/// Vertex deduplication strategy; both produce identical output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompactionStrategy {
    /// Quadratic scan over emitted vertices
    Linear,
    /// Bit-pattern keyed hash lookup
    #[default]
    Hashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ExportOptions {
    pub influence_policy: InfluencePolicy,
    pub compaction: CompactionStrategy,
    /// Fail on clusters whose link is not a skeleton joint instead of
    /// recording an out-of-range joint index
    pub strict_joint_binding: bool,
}
