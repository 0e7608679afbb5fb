//! bake-export library
//!
//! Bakes imported scenes (glTF or JSON scene descriptions) into the fixed-layout
//! mesh, material and animation files defined in `bake-common`. The same
//! exports are reachable from Rust, from C through [`ffi`], and from the
//! `bake-export` binary.

pub mod animation;
pub mod batch;
pub mod error;
pub mod ffi;
pub mod formats;
pub mod manifest;
pub mod material;
pub mod mesh;
pub mod options;
pub mod scene;
pub mod session;
pub mod skeleton;

pub use bake_common::{AssetFormat, BAKE_FORMAT};

pub use animation::{bake, export_animation, frame_index, ClipSummary};
pub use error::{codes, AttributeKind, ExportError};
pub use ffi::scene_poly_count;
pub use material::{collect_materials, export_materials, MaterialSummary};
pub use mesh::{export_simple_mesh, extract_mesh, MeshSummary};
pub use options::{CompactionStrategy, ExportOptions, InfluencePolicy};
pub use scene::{ImportError, NodeId, Scene};
pub use session::ImportSession;
pub use skeleton::Skeleton;
