//! Per-vertex attribute layers
//!
//! A layer element stores one attribute (normals, UVs) the way the source
//! asset chose to: keyed by control point or by polygon vertex, with the
//! values either stored directly or behind an index array.

use serde::{Deserialize, Serialize};

/// What an attribute layer is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingMode {
    None,
    ByControlPoint,
    ByPolygonVertex,
    ByPolygon,
    ByEdge,
    AllSame,
}

/// How layer values are addressed once the key is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Value stored at the key
    Direct,
    /// Key goes through the index array first
    IndexToDirect,
    /// Index array only, without values (legacy encoding)
    Index,
}

/// One attribute layer of a mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerElement<T> {
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
    /// Value array
    pub direct: Vec<T>,
    /// Index array, used by [`ReferenceMode::IndexToDirect`]
    #[serde(default)]
    pub index: Vec<u32>,
}

impl<T> LayerElement<T> {
    /// Values stored directly at their key
    pub fn direct(mapping: MappingMode, values: Vec<T>) -> Self {
        Self {
            mapping,
            reference: ReferenceMode::Direct,
            direct: values,
            index: Vec::new(),
        }
    }

    /// Values stored behind an index array
    pub fn indexed(mapping: MappingMode, values: Vec<T>, index: Vec<u32>) -> Self {
        Self {
            mapping,
            reference: ReferenceMode::IndexToDirect,
            direct: values,
            index,
        }
    }
}
