//! Baked mesh binary format (.mesh)
//!
//! Indexed triangle list with full-precision skinned vertices.
//! POD format - no magic bytes.
//!
//! # Layout
//! ```text
//! 0x00: index_count u32
//! 0x04: indices (index_count × u32)
//! var:  vert_count u32
//! var:  vertices (vert_count × 84 bytes)
//! ```
//!
//! Each vertex is 21 little-endian 4-byte words:
//! ```text
//! 0x00: position [f32; 4]   (w = 1)
//! 0x10: color    [f32; 4]
//! 0x20: joints   [i32; 4]
//! 0x30: weights  [f32; 4]
//! 0x40: normal   [f32; 3]
//! 0x4C: uv       [f32; 2]
//! ```

use std::io::{self, Write};

use bytemuck::{Pod, Zeroable};

use super::serialization::{read_words_le, write_words_le};

/// Number of joint influence slots per vertex
pub const MAX_INFLUENCES: usize = 4;

/// Uniform color assigned to every baked vertex
pub const DEFAULT_VERTEX_COLOR: [f32; 4] = [0.75, 0.75, 0.75, 1.0];

/// One baked vertex (84 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct MeshVertex {
    /// Homogeneous position, w = 1
    pub position: [f32; 4],
    pub color: [f32; 4],
    /// Canonical joint indices
    pub joints: [i32; MAX_INFLUENCES],
    /// Normalized joint weights
    pub weights: [f32; MAX_INFLUENCES],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub const SIZE: usize = 84;

    /// Write vertex to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        write_words_le(self, &mut bytes);
        bytes
    }

    /// Read vertex from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        read_words_le(bytes)
    }
}

/// A compacted, indexed mesh ready for serialization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BakedMesh {
    /// One index per expanded triangle corner
    pub indices: Vec<u32>,
    /// Distinct vertices
    pub vertices: Vec<MeshVertex>,
}

impl BakedMesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vert_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Total encoded size in bytes
    pub fn byte_size(&self) -> usize {
        4 + self.indices.len() * 4 + 4 + self.vertices.len() * MeshVertex::SIZE
    }

    /// Write a complete mesh file
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Encode into an in-memory buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_size());
        bytes.extend_from_slice(&self.index_count().to_le_bytes());
        for index in &self.indices {
            bytes.extend_from_slice(&index.to_le_bytes());
        }
        bytes.extend_from_slice(&self.vert_count().to_le_bytes());
        for vertex in &self.vertices {
            bytes.extend_from_slice(&vertex.to_bytes());
        }
        bytes
    }

    /// Decode a complete mesh file
    ///
    /// Returns `None` if the data is truncated.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let index_count = read_u32(bytes, 0)? as usize;
        let mut offset: usize = 4;

        let index_end = offset.checked_add(index_count.checked_mul(4)?)?;
        let index_data = bytes.get(offset..index_end)?;
        let indices = index_data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        offset = index_end;

        let vert_count = read_u32(bytes, offset)? as usize;
        offset += 4;

        let vertex_end = offset.checked_add(vert_count.checked_mul(MeshVertex::SIZE)?)?;
        let vertex_data = bytes.get(offset..vertex_end)?;
        let vertices = vertex_data
            .chunks_exact(MeshVertex::SIZE)
            .map(MeshVertex::from_bytes)
            .collect::<Option<Vec<_>>>()?;

        Some(Self { indices, vertices })
    }

    /// Check that every index addresses a vertex
    pub fn indices_in_range(&self) -> bool {
        let count = self.vert_count();
        self.indices.iter().all(|&i| i < count)
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}
