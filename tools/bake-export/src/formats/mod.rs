//! Binary format definitions for baked asset files
//!
//! Re-exports from bake-common plus file-level writers.

pub use bake_common::formats::*;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::ExportError;

/// Create (or truncate) `path` and fill it through a buffered writer
fn write_file<F>(path: &Path, encode: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    encode(&mut writer).map_err(io_error)?;
    writer.flush().map_err(io_error)
}

/// Write a complete mesh file
pub fn write_mesh_file(path: &Path, mesh: &BakedMesh) -> Result<(), ExportError> {
    write_file(path, |w| mesh.write_to(w))
}

/// Write a complete material file
pub fn write_material_file(path: &Path, library: &MaterialLibrary) -> Result<(), ExportError> {
    write_file(path, |w| library.write_to(w))
}

/// Write a complete animation file
pub fn write_animation_file(path: &Path, clip: &AnimationClip) -> Result<(), ExportError> {
    write_file(path, |w| clip.write_to(w))
}
