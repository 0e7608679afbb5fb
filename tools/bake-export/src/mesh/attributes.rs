//! Per-vertex attribute resolution

use crate::error::{AttributeKind, ExportError};
use crate::scene::{LayerElement, MappingMode, ReferenceMode};

/// Resolve one attribute value for a triangle corner
///
/// `polygon_vertex` is the running count of corners emitted so far across the
/// whole mesh. A missing layer, or one keyed by anything other than control
/// point or polygon vertex, yields the zero value.
pub fn resolve<T: Copy + Default>(
    element: Option<&LayerElement<T>>,
    attribute: AttributeKind,
    polygon_vertex: usize,
    control_point: usize,
) -> Result<T, ExportError> {
    let Some(element) = element else {
        return Ok(T::default());
    };

    let key = match element.mapping {
        MappingMode::ByControlPoint => control_point,
        MappingMode::ByPolygonVertex => polygon_vertex,
        other => {
            tracing::debug!("Ignoring {} layer mapped {:?}", attribute, other);
            return Ok(T::default());
        }
    };

    let direct_index = match element.reference {
        ReferenceMode::Direct => key,
        ReferenceMode::IndexToDirect => {
            *element
                .index
                .get(key)
                .ok_or(ExportError::AttributeIndexOutOfRange {
                    attribute,
                    index: key,
                    len: element.index.len(),
                })? as usize
        }
        mode => return Err(ExportError::UnsupportedReferenceMode { attribute, mode }),
    };

    element
        .direct
        .get(direct_index)
        .copied()
        .ok_or(ExportError::AttributeIndexOutOfRange {
            attribute,
            index: direct_index,
            len: element.direct.len(),
        })
}
