//! Baked material table format (.mats)
//!
//! Fixed four-channel surface descriptions plus a side table of texture paths.
//! POD format - no magic bytes.
//!
//! # Layout
//! ```text
//! 0x00: mat_count u64
//! 0x08: materials (mat_count × 96 bytes)
//! var:  path_count u64
//! var:  paths (path_count × 260 bytes, NUL-padded)
//! ```
//!
//! Each material is four 24-byte components in [`MaterialChannel`] order:
//! ```text
//! 0x00: value  [f32; 3]
//! 0x0C: factor f32
//! 0x10: input  i64   (texture path index, -1 if none)
//! ```

use std::io::{self, Write};
use std::ops::{Index, IndexMut};

/// Texture index stored when a channel has no texture
pub const NO_TEXTURE: i64 = -1;

/// Fixed slot size of one texture path, including the NUL terminator
pub const TEXTURE_PATH_SIZE: usize = 260;

/// Material channels in on-disk order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialChannel {
    Emissive = 0,
    Diffuse = 1,
    Specular = 2,
    Shininess = 3,
}

impl MaterialChannel {
    pub const COUNT: usize = 4;

    pub const ALL: [Self; Self::COUNT] = [
        Self::Emissive,
        Self::Diffuse,
        Self::Specular,
        Self::Shininess,
    ];
}

/// One material channel (24 bytes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialComponent {
    pub value: [f32; 3],
    pub factor: f32,
    /// Index into the texture path table, or [`NO_TEXTURE`]
    pub input: i64,
}

impl Default for MaterialComponent {
    fn default() -> Self {
        Self {
            value: [0.0; 3],
            factor: 0.0,
            input: NO_TEXTURE,
        }
    }
}

impl MaterialComponent {
    pub const SIZE: usize = 24;

    /// Write component to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.value[0].to_le_bytes());
        bytes[4..8].copy_from_slice(&self.value[1].to_le_bytes());
        bytes[8..12].copy_from_slice(&self.value[2].to_le_bytes());
        bytes[12..16].copy_from_slice(&self.factor.to_le_bytes());
        bytes[16..24].copy_from_slice(&self.input.to_le_bytes());
        bytes
    }

    /// Read component from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let f = |o: usize| f32::from_le_bytes([bytes[o], bytes[o + 1], bytes[o + 2], bytes[o + 3]]);
        let mut input = [0u8; 8];
        input.copy_from_slice(&bytes[16..24]);
        Some(Self {
            value: [f(0), f(4), f(8)],
            factor: f(12),
            input: i64::from_le_bytes(input),
        })
    }

    pub fn has_texture(&self) -> bool {
        self.input != NO_TEXTURE
    }
}

/// One material: a component per channel (96 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialRecord {
    components: [MaterialComponent; MaterialChannel::COUNT],
}

impl MaterialRecord {
    pub const SIZE: usize = MaterialComponent::SIZE * MaterialChannel::COUNT;

    /// Write record to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        for (chunk, component) in bytes
            .chunks_exact_mut(MaterialComponent::SIZE)
            .zip(&self.components)
        {
            chunk.copy_from_slice(&component.to_bytes());
        }
        bytes
    }

    /// Read record from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut record = Self::default();
        for (component, chunk) in record
            .components
            .iter_mut()
            .zip(bytes[..Self::SIZE].chunks_exact(MaterialComponent::SIZE))
        {
            *component = MaterialComponent::from_bytes(chunk)?;
        }
        Some(record)
    }
}

impl Index<MaterialChannel> for MaterialRecord {
    type Output = MaterialComponent;

    fn index(&self, channel: MaterialChannel) -> &Self::Output {
        &self.components[channel as usize]
    }
}

impl IndexMut<MaterialChannel> for MaterialRecord {
    fn index_mut(&mut self, channel: MaterialChannel) -> &mut Self::Output {
        &mut self.components[channel as usize]
    }
}

/// All materials of a scene and the texture paths they reference
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    pub materials: Vec<MaterialRecord>,
    texture_paths: Vec<String>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texture_paths(&self) -> &[String] {
        &self.texture_paths
    }

    /// Append a texture path and return its table index.
    ///
    /// Returns `None` if the path does not fit a fixed slot (259 bytes plus
    /// the terminator) or contains an interior NUL.
    pub fn push_texture_path(&mut self, path: &str) -> Option<i64> {
        encode_texture_path(path)?;
        self.texture_paths.push(path.to_string());
        Some(self.texture_paths.len() as i64 - 1)
    }

    /// Total encoded size in bytes
    pub fn byte_size(&self) -> usize {
        8 + self.materials.len() * MaterialRecord::SIZE + 8 + self.texture_paths.len() * TEXTURE_PATH_SIZE
    }

    /// Write a complete material file
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.to_bytes())
    }

    /// Encode into an in-memory buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.byte_size());
        bytes.extend_from_slice(&(self.materials.len() as u64).to_le_bytes());
        for material in &self.materials {
            bytes.extend_from_slice(&material.to_bytes());
        }
        bytes.extend_from_slice(&(self.texture_paths.len() as u64).to_le_bytes());
        for path in &self.texture_paths {
            // push_texture_path only admits paths shorter than a slot
            let raw = path.as_bytes();
            bytes.extend_from_slice(raw);
            bytes.resize(bytes.len() + (TEXTURE_PATH_SIZE - raw.len()), 0);
        }
        bytes
    }

    /// Decode a complete material file
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let mat_count = usize::try_from(read_u64(bytes, 0)?).ok()?;
        let mut offset = 8;

        let mut materials = Vec::with_capacity(mat_count.min(bytes.len() / MaterialRecord::SIZE));
        for _ in 0..mat_count {
            materials.push(MaterialRecord::from_bytes(bytes.get(offset..)?)?);
            offset += MaterialRecord::SIZE;
        }

        let path_count = usize::try_from(read_u64(bytes, offset)?).ok()?;
        offset += 8;

        let mut texture_paths = Vec::with_capacity(path_count.min(bytes.len() / TEXTURE_PATH_SIZE));
        for _ in 0..path_count {
            let slot = bytes.get(offset..offset + TEXTURE_PATH_SIZE)?;
            texture_paths.push(decode_texture_path(slot)?);
            offset += TEXTURE_PATH_SIZE;
        }

        Some(Self {
            materials,
            texture_paths,
        })
    }
}

/// Encode a path into a NUL-padded fixed slot
pub fn encode_texture_path(path: &str) -> Option<[u8; TEXTURE_PATH_SIZE]> {
    let raw = path.as_bytes();
    if raw.len() >= TEXTURE_PATH_SIZE || raw.contains(&0) {
        return None;
    }
    let mut slot = [0u8; TEXTURE_PATH_SIZE];
    slot[..raw.len()].copy_from_slice(raw);
    Some(slot)
}

/// Decode a NUL-padded fixed slot
pub fn decode_texture_path(slot: &[u8]) -> Option<String> {
    let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
    String::from_utf8(slot[..end].to_vec()).ok()
}

fn read_u64(bytes: &[u8], offset: usize) -> Option<u64> {
    let b = bytes.get(offset..offset.checked_add(8)?)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(b);
    Some(u64::from_le_bytes(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_default() {
        let component = MaterialComponent::default();
        assert_eq!(component.input, NO_TEXTURE);
        assert!(!component.has_texture());
        let bytes = component.to_bytes();
        assert_eq!(&bytes[16..24], &(-1i64).to_le_bytes());
    }

    #[test]
    fn test_record_channel_order() {
        let mut record = MaterialRecord::default();
        record[MaterialChannel::Diffuse].value = [0.2, 0.4, 0.6];
        record[MaterialChannel::Diffuse].factor = 1.0;
        record[MaterialChannel::Diffuse].input = 3;

        let bytes = record.to_bytes();
        assert_eq!(bytes.len(), MaterialRecord::SIZE);
        // Emissive first, diffuse second
        assert_eq!(&bytes[0..4], &0.0f32.to_le_bytes());
        assert_eq!(&bytes[24..28], &0.2f32.to_le_bytes());
        assert_eq!(&bytes[36..40], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[40..48], &3i64.to_le_bytes());

        let parsed = MaterialRecord::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_library_file_layout() {
        let mut library = MaterialLibrary::new();
        let mut record = MaterialRecord::default();
        record[MaterialChannel::Emissive].input = library.push_texture_path("glow.png").unwrap();
        record[MaterialChannel::Diffuse].input =
            library.push_texture_path("textures/albedo.png").unwrap();
        library.materials.push(record);

        let bytes = library.to_bytes();
        assert_eq!(bytes.len(), library.byte_size());
        assert_eq!(bytes.len(), 8 + 96 + 8 + 2 * 260);
        assert_eq!(&bytes[0..8], &1u64.to_le_bytes());
        assert_eq!(&bytes[104..112], &2u64.to_le_bytes());
        assert_eq!(&bytes[112..120], b"glow.png");
        assert_eq!(bytes[120], 0);

        let parsed = MaterialLibrary::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, library);
        assert_eq!(parsed.texture_paths()[1], "textures/albedo.png");
    }

    #[test]
    fn test_write_to_matches_to_bytes() {
        let mut library = MaterialLibrary::new();
        let longest = "p".repeat(TEXTURE_PATH_SIZE - 1);
        let mut record = MaterialRecord::default();
        record[MaterialChannel::Specular].input = library.push_texture_path(&longest).unwrap();
        library.materials.push(record);

        let mut written = Vec::new();
        library.write_to(&mut written).unwrap();
        assert_eq!(written, library.to_bytes());
        assert_eq!(written.len(), library.byte_size());
        assert_eq!(*written.last().unwrap(), 0);
        assert_eq!(MaterialLibrary::from_bytes(&written).unwrap(), library);
    }

    #[test]
    fn test_texture_path_limits() {
        let longest = "a".repeat(TEXTURE_PATH_SIZE - 1);
        assert!(encode_texture_path(&longest).is_some());

        let too_long = "a".repeat(TEXTURE_PATH_SIZE);
        let mut library = MaterialLibrary::new();
        assert!(library.push_texture_path(&too_long).is_none());
        assert!(library.push_texture_path("bad\0path").is_none());
        assert!(library.texture_paths().is_empty());
    }

    #[test]
    fn test_library_from_truncated_bytes() {
        let mut library = MaterialLibrary::new();
        library.materials.push(MaterialRecord::default());
        let bytes = library.to_bytes();
        assert!(MaterialLibrary::from_bytes(&bytes[..bytes.len() - 1]).is_none());
    }
}
