//! Binary serialization trait for fixed-size records.
//!
//! Every fixed-size record of the baked formats implements `BinarySerializable`
//! so container readers/writers can walk arrays of them generically. Each
//! record also keeps a type-specific `to_bytes()` returning a fixed-size array.

use bytemuck::Pod;

/// Trait for binary-serializable fixed-size records.
///
/// The trait uses `Vec<u8>` for the return type because associated const
/// generics in return types (`[u8; Self::SIZE]`) are not yet stable in Rust.
///
/// # Example
///
/// ```
/// use bake_common::formats::{BinarySerializable, MeshVertex};
///
/// let vertex = MeshVertex::default();
/// let bytes = vertex.serialize();
/// assert_eq!(bytes.len(), <MeshVertex as BinarySerializable>::SIZE);
/// let parsed = MeshVertex::deserialize(&bytes).unwrap();
/// assert_eq!(parsed, vertex);
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized record in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

/// Write a POD value made only of 4-byte scalars as little-endian words.
///
/// `out` must be exactly `size_of::<T>()` bytes long.
pub(crate) fn write_words_le<T: Pod>(value: &T, out: &mut [u8]) {
    let words: &[u32] = bytemuck::cast_slice(std::slice::from_ref(value));
    for (chunk, word) in out.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
}

/// Read a POD value made only of 4-byte scalars from little-endian words.
pub(crate) fn read_words_le<T: Pod>(bytes: &[u8]) -> Option<T> {
    let size = std::mem::size_of::<T>();
    if bytes.len() < size {
        return None;
    }
    let mut value = T::zeroed();
    let words: &mut [u32] = bytemuck::cast_slice_mut(std::slice::from_mut(&mut value));
    for (word, chunk) in words.iter_mut().zip(bytes[..size].chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    Some(value)
}

impl BinarySerializable for super::MeshVertex {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::MaterialRecord {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::JointPose {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::AnimationHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}
