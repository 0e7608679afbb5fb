//! Mesh extraction (scene mesh -> .mesh)
//!
//! Triangles are expanded into one vertex per corner, carrying the resolved
//! normal, UV and normalized skin influences, then compacted into an indexed
//! vertex buffer.

pub mod attributes;
pub mod compact;
pub mod skin;

use std::path::Path;

use bake_common::{BakedMesh, MeshVertex, DEFAULT_VERTEX_COLOR};

use crate::error::{AttributeKind, ExportError};
use crate::formats::write_mesh_file;
use crate::options::ExportOptions;
use crate::scene::MeshGeometry;
use crate::session::ImportSession;
use crate::skeleton::Skeleton;

use self::skin::InfluenceTable;

/// Statistics of one mesh export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshSummary {
    pub name: String,
    pub polygon_count: usize,
    pub index_count: usize,
    pub vert_count: usize,
    pub joint_count: usize,
    /// Control points that ended up without any skin weight
    pub zero_weight_points: usize,
}

/// Expand every triangle into three vertices, in polygon then corner order
///
/// Colors are left zero; they are assigned after compaction.
pub fn expand_triangles(
    mesh: &MeshGeometry,
    influences: &InfluenceTable,
) -> Result<Vec<MeshVertex>, ExportError> {
    let mut stream = Vec::with_capacity(mesh.polygon_count() * 3);
    let mut polygon_vertex = 0;

    for polygon in &mesh.polygons {
        for &control_point in polygon {
            let cp = control_point as usize;
            let [x, y, z] = *mesh.control_points.get(cp).ok_or_else(|| {
                ExportError::InvalidGeometry(format!(
                    "mesh '{}' references control point {cp} of {}",
                    mesh.name,
                    mesh.control_point_count()
                ))
            })?;

            let normal = attributes::resolve(mesh.normals.as_ref(), AttributeKind::Normal, polygon_vertex, cp)?;
            let uv = attributes::resolve(mesh.uvs.as_ref(), AttributeKind::Uv, polygon_vertex, cp)?;
            let (joints, weights) = influences
                .get(cp)
                .map(skin::normalize)
                .unwrap_or_default();

            stream.push(MeshVertex {
                position: [x, y, z, 1.0],
                color: [0.0; 4],
                joints,
                weights,
                normal,
                uv,
            });
            polygon_vertex += 1;
        }
    }

    Ok(stream)
}

/// Extract, expand and compact one mesh of an open session
///
/// `mesh_name` matches a mesh or node name; `None` takes the first mesh.
pub fn extract_mesh(
    session: &ImportSession,
    mesh_name: Option<&str>,
    options: &ExportOptions,
) -> Result<(BakedMesh, MeshSummary), ExportError> {
    let scene = session.scene();
    let skeleton = Skeleton::from_bind_pose(scene)?;
    let (_, geometry) = scene
        .find_mesh(mesh_name)
        .ok_or_else(|| ExportError::MeshNotFound(mesh_name.map(str::to_string)))?;

    let influences = InfluenceTable::build(geometry, &skeleton, options)?;
    let zero_weight_points = influences.zero_weight_count();
    if zero_weight_points > 0 {
        tracing::warn!(
            "Mesh '{}': {} control points have no skin weight, leaving their weights at zero",
            geometry.name,
            zero_weight_points
        );
    }

    let stream = expand_triangles(geometry, &influences)?;
    let mut mesh = compact::compact(&stream, options.compaction);
    for vertex in &mut mesh.vertices {
        vertex.color = DEFAULT_VERTEX_COLOR;
    }

    let summary = MeshSummary {
        name: geometry.name.clone(),
        polygon_count: geometry.polygon_count(),
        index_count: mesh.indices.len(),
        vert_count: mesh.vertices.len(),
        joint_count: skeleton.len(),
        zero_weight_points,
    };
    Ok((mesh, summary))
}

/// Export one mesh of a scene file to the mesh format
pub fn export_simple_mesh(
    input: &Path,
    output: &Path,
    mesh_name: Option<&str>,
    options: &ExportOptions,
) -> Result<MeshSummary, ExportError> {
    let session = ImportSession::open(input)?;
    let (mesh, summary) = extract_mesh(&session, mesh_name, options)?;
    write_mesh_file(output, &mesh)?;

    tracing::info!(
        "Exported mesh '{}': {} polygons, {} indices, {} vertices -> {:?}",
        summary.name,
        summary.polygon_count,
        summary.index_count,
        summary.vert_count,
        output
    );
    Ok(summary)
}
