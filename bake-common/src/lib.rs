//! Shared binary asset formats for the skinned asset baker
//!
//! This crate provides the on-disk layouts shared between:
//! - `bake-export` (asset pipeline, writes the files)
//! - runtime loaders (read the files back)
//!
//! # Modules
//!
//! - [`formats`] - Mesh, material and animation binary formats
//! - [`asset_format`] - File extensions and default output paths

pub mod asset_format;
pub mod formats;

pub use asset_format::{AssetFormat, BAKE_FORMAT};

// Re-export commonly used format items
pub use formats::{
    // Animation types
    AnimationClip,
    AnimationHeader,
    // Mesh types
    BakedMesh,
    BinarySerializable,
    // Constants
    DEFAULT_VERTEX_COLOR,
    FRAMES_PER_SECOND,
    JointPose,
    Keyframe,
    MAX_INFLUENCES,
    // Material types
    MaterialChannel,
    MaterialComponent,
    MaterialLibrary,
    MaterialRecord,
    MeshVertex,
    NO_TEXTURE,
    TEXTURE_PATH_SIZE,
};
