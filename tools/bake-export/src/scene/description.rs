//! JSON scene descriptions
//!
//! A [`Scene`] serialized with serde. Used for hand-written fixtures and for
//! attribute encodings glTF cannot express (indexed or per-polygon-vertex layers).

use std::path::Path;

use super::{ImportError, Scene};

/// Load and validate a scene description
pub fn load_description(path: &Path) -> Result<Scene, ImportError> {
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_description(&text, path)?.finalize()
}

fn parse_description(text: &str, path: &Path) -> Result<Scene, ImportError> {
    serde_json::from_str(text).map_err(|source| ImportError::Description {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MappingMode, NodeAttribute, NodeId, ReferenceMode};

    #[test]
    fn test_parse_minimal_description() {
        let text = r#"{
            "nodes": [
                { "name": "Root", "children": [1], "attribute": { "type": "skeleton", "root": true } },
                { "name": "Tri", "attribute": { "type": "mesh", "mesh": 0 } }
            ],
            "meshes": [{
                "name": "Tri",
                "control_points": [[0,0,0],[1,0,0],[0,1,0]],
                "polygons": [[0,1,2]],
                "normals": {
                    "mapping": "by_polygon_vertex",
                    "reference": "index_to_direct",
                    "direct": [[0,0,1]],
                    "index": [0,0,0]
                }
            }]
        }"#;
        let scene = parse_description(text, Path::new("tri.json"))
            .unwrap()
            .finalize()
            .unwrap();

        assert_eq!(scene.nodes[1].parent, Some(NodeId(0)));
        assert_eq!(scene.nodes[0].attribute, NodeAttribute::Skeleton { root: true });
        let normals = scene.meshes[0].normals.as_ref().unwrap();
        assert_eq!(normals.mapping, MappingMode::ByPolygonVertex);
        assert_eq!(normals.reference, ReferenceMode::IndexToDirect);
        assert_eq!(scene.poly_count(), 1);
    }

    #[test]
    fn test_parse_error_reports_path() {
        let err = parse_description("{ not json", Path::new("broken.json")).unwrap_err();
        assert!(matches!(err, ImportError::Description { .. }));
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_description(Path::new("/nonexistent/scene.json")).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
