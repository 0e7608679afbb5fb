//! Export pipeline errors and their C status codes

use std::fmt;
use std::path::PathBuf;

use crate::scene::{ImportError, ReferenceMode};

/// Status codes returned across the C interface
pub mod codes {
    pub const SUCCESS: i32 = 0;
    /// Import failure, missing scene data, malformed skin
    pub const STRUCTURE: i32 = -1;
    pub const IO: i32 = -2;
    pub const ATTRIBUTE: i32 = -3;
    pub const ENCODING: i32 = -4;
}

/// Which vertex attribute failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Normal,
    Uv,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Normal => f.write_str("normal"),
            AttributeKind::Uv => f.write_str("uv"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Scene has no bind pose")]
    MissingBindPose,

    #[error("Bind pose has no root skeleton node")]
    MissingSkeletonRoot,

    #[error("Mesh not found: {}", .0.as_deref().unwrap_or("<first mesh>"))]
    MeshNotFound(Option<String>),

    #[error("Scene has no animation stack")]
    MissingAnimationStack,

    #[error("Malformed skin deformer: {0}")]
    MalformedDeformer(String),

    #[error("Cluster {cluster} of deformer {deformer} is not bound to a skeleton joint")]
    UnboundCluster { deformer: usize, cluster: usize },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Unsupported {attribute} reference mode {mode:?}")]
    UnsupportedReferenceMode {
        attribute: AttributeKind,
        mode: ReferenceMode,
    },

    #[error("{attribute} index {index} out of range ({len} values)")]
    AttributeIndexOutOfRange {
        attribute: AttributeKind,
        index: usize,
        len: usize,
    },

    #[error("Texture path does not fit a fixed slot: {path}")]
    TexturePathTooLong { path: String },

    #[error("Failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    /// C status code for this error
    pub fn code(&self) -> i32 {
        match self {
            ExportError::Import(_)
            | ExportError::MissingBindPose
            | ExportError::MissingSkeletonRoot
            | ExportError::MeshNotFound(_)
            | ExportError::MissingAnimationStack
            | ExportError::MalformedDeformer(_)
            | ExportError::UnboundCluster { .. }
            | ExportError::InvalidGeometry(_) => codes::STRUCTURE,
            ExportError::Io { .. } => codes::IO,
            ExportError::UnsupportedReferenceMode { .. }
            | ExportError::AttributeIndexOutOfRange { .. } => codes::ATTRIBUTE,
            ExportError::TexturePathTooLong { .. } => codes::ENCODING,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ExportError::MissingBindPose.code(), codes::STRUCTURE);
        assert_eq!(ExportError::MeshNotFound(Some("Body".into())).code(), -1);
        assert_eq!(
            ExportError::UnsupportedReferenceMode {
                attribute: AttributeKind::Normal,
                mode: ReferenceMode::Index,
            }
            .code(),
            -3
        );
        assert_eq!(
            ExportError::TexturePathTooLong {
                path: "x".repeat(300)
            }
            .code(),
            -4
        );
        let io = ExportError::Io {
            path: "out.mesh".into(),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(io.code(), codes::IO);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ExportError::MeshNotFound(None).to_string(),
            "Mesh not found: <first mesh>"
        );
        let err = ExportError::AttributeIndexOutOfRange {
            attribute: AttributeKind::Uv,
            index: 9,
            len: 3,
        };
        assert_eq!(err.to_string(), "uv index 9 out of range (3 values)");
    }
}
