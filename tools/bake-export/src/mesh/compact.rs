//! Vertex deduplication
//!
//! Two vertices are the same when position, normal and UV compare equal as
//! floats. Joint indices and weights do not take part. The first occurrence
//! wins and unique vertices keep stream order.

use bake_common::{BakedMesh, MeshVertex};
use hashbrown::HashMap;

use crate::error::ExportError;
use crate::options::CompactionStrategy;

/// Deduplicate an expanded vertex stream into an indexed mesh
pub fn compact(stream: &[MeshVertex], strategy: CompactionStrategy) -> BakedMesh {
    match strategy {
        CompactionStrategy::Linear => compact_linear(stream),
        CompactionStrategy::Hashed => compact_hashed(stream),
    }
}

/// Run an already indexed mesh through compaction again
///
/// Fails if any index does not address a vertex.
pub fn recompact(mesh: &BakedMesh, strategy: CompactionStrategy) -> Result<BakedMesh, ExportError> {
    let stream = mesh
        .indices
        .iter()
        .map(|&i| {
            mesh.vertices.get(i as usize).copied().ok_or_else(|| {
                ExportError::InvalidGeometry(format!(
                    "index {i} out of range for {} vertices",
                    mesh.vertices.len()
                ))
            })
        })
        .collect::<Result<Vec<MeshVertex>, _>>()?;
    Ok(compact(&stream, strategy))
}

fn same_key(a: &MeshVertex, b: &MeshVertex) -> bool {
    a.position[..3] == b.position[..3] && a.normal == b.normal && a.uv == b.uv
}

fn compact_linear(stream: &[MeshVertex]) -> BakedMesh {
    let mut mesh = BakedMesh {
        indices: Vec::with_capacity(stream.len()),
        vertices: Vec::new(),
    };

    for vertex in stream {
        let index = match mesh.vertices.iter().position(|v| same_key(v, vertex)) {
            Some(existing) => existing,
            None => {
                mesh.vertices.push(*vertex);
                mesh.vertices.len() - 1
            }
        };
        mesh.indices.push(index as u32);
    }

    mesh
}

type VertexKey = [u32; 8];

/// Bit pattern key; `None` if any component is NaN
fn vertex_key(vertex: &MeshVertex) -> Option<VertexKey> {
    let components = [
        vertex.position[0],
        vertex.position[1],
        vertex.position[2],
        vertex.normal[0],
        vertex.normal[1],
        vertex.normal[2],
        vertex.uv[0],
        vertex.uv[1],
    ];
    if components.iter().any(|c| c.is_nan()) {
        return None;
    }
    // -0.0 and +0.0 share a key
    Some(components.map(|c| if c == 0.0 { 0 } else { c.to_bits() }))
}

fn compact_hashed(stream: &[MeshVertex]) -> BakedMesh {
    let mut mesh = BakedMesh {
        indices: Vec::with_capacity(stream.len()),
        vertices: Vec::new(),
    };
    let mut seen: HashMap<VertexKey, u32> = HashMap::with_capacity(stream.len());

    for vertex in stream {
        let index = match vertex_key(vertex) {
            Some(key) => *seen.entry(key).or_insert_with(|| {
                mesh.vertices.push(*vertex);
                mesh.vertices.len() as u32 - 1
            }),
            None => {
                // NaN never matches anything, itself included
                mesh.vertices.push(*vertex);
                mesh.vertices.len() as u32 - 1
            }
        };
        mesh.indices.push(index);
    }

    mesh
}
