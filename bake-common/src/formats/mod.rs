//! Baked asset binary formats
//!
//! POD (Plain Old Data) layouts consumed directly by the runtime engine.
//! No magic bytes and no version tag - the format is determined by which
//! loader opens the file. Everything is little-endian.
//!
//! Fixed-size records implement the [`BinarySerializable`] trait for
//! consistent serialization/deserialization.

pub mod animation;
pub mod material;
pub mod mesh;
mod serialization;

pub use animation::*;
pub use material::*;
pub use mesh::*;
pub use serialization::BinarySerializable;
