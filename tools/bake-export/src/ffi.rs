//! C entry points
//!
//! Every function returns 0 on success or a negative status code from
//! [`crate::error::codes`]. Null output paths select the default file names.
//! Panics are caught at the boundary and reported as structural failures.

use std::ffi::{CStr, c_char, c_int};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};

use bake_common::BAKE_FORMAT;

use crate::error::{ExportError, codes};
use crate::options::ExportOptions;
use crate::session::ImportSession;

/// Total polygon count of all meshes in a scene file
pub fn scene_poly_count(path: &Path) -> Result<usize, ExportError> {
    let session = ImportSession::open(path)?;
    Ok(session.scene().poly_count())
}

enum PathArg<'a> {
    Missing,
    Invalid,
    Value(&'a str),
}

/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
unsafe fn read_arg<'a>(ptr: *const c_char) -> PathArg<'a> {
    if ptr.is_null() {
        return PathArg::Missing;
    }
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => PathArg::Value(s),
        Err(_) => PathArg::Invalid,
    }
}

fn guarded<F>(export: F) -> c_int
where
    F: FnOnce() -> Result<(), ExportError>,
{
    match catch_unwind(AssertUnwindSafe(export)) {
        Ok(Ok(())) => codes::SUCCESS,
        Ok(Err(err)) => {
            tracing::error!("{}", err);
            err.code()
        }
        Err(_) => {
            tracing::error!("Export panicked");
            codes::STRUCTURE
        }
    }
}

/// Resolve the input and output arguments shared by the export entry points
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
unsafe fn io_paths(in_path: *const c_char, out_path: *const c_char, default_out: &str) -> Option<(PathBuf, PathBuf)> {
    let input = match unsafe { read_arg(in_path) } {
        PathArg::Value(s) => PathBuf::from(s),
        PathArg::Missing | PathArg::Invalid => return None,
    };
    let output = match unsafe { read_arg(out_path) } {
        PathArg::Value(s) => PathBuf::from(s),
        PathArg::Missing => PathBuf::from(default_out),
        PathArg::Invalid => return None,
    };
    Some((input, output))
}

/// Total polygon count across all mesh geometries, -1 on import failure
///
/// # Safety
/// `path` must be null or a valid NUL-terminated string.
#[allow(non_snake_case)]
#[unsafe(no_mangle)]
pub unsafe extern "C" fn Get_Scene_Poly_Count(path: *const c_char) -> c_int {
    let PathArg::Value(path) = (unsafe { read_arg(path) }) else {
        return codes::STRUCTURE;
    };
    catch_unwind(|| scene_poly_count(Path::new(path)))
        .ok()
        .and_then(Result::ok)
        .map_or(codes::STRUCTURE, |count| c_int::try_from(count).unwrap_or(c_int::MAX))
}

/// Export one mesh; a null `mesh_name` selects the first mesh
///
/// # Safety
/// All pointers must be null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn export_simple_mesh(
    in_path: *const c_char,
    out_path: *const c_char,
    mesh_name: *const c_char,
) -> c_int {
    let Some((input, output)) = (unsafe { io_paths(in_path, out_path, BAKE_FORMAT.default_mesh_path) }) else {
        return codes::STRUCTURE;
    };
    let mesh_name = match unsafe { read_arg(mesh_name) } {
        PathArg::Missing => None,
        PathArg::Value(s) => Some(s),
        PathArg::Invalid => return codes::STRUCTURE,
    };

    guarded(|| {
        crate::mesh::export_simple_mesh(&input, &output, mesh_name, &ExportOptions::default()).map(|_| ())
    })
}

/// Export all Lambert/Phong materials
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn export_materials(in_path: *const c_char, out_path: *const c_char) -> c_int {
    let Some((input, output)) = (unsafe { io_paths(in_path, out_path, BAKE_FORMAT.default_material_path) })
    else {
        return codes::STRUCTURE;
    };
    guarded(|| crate::material::export_materials(&input, &output).map(|_| ()))
}

/// Bake the active animation stack
///
/// # Safety
/// Both pointers must be null or valid NUL-terminated strings.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn export_animation(in_path: *const c_char, out_path: *const c_char) -> c_int {
    let Some((input, output)) = (unsafe { io_paths(in_path, out_path, BAKE_FORMAT.default_animation_path) })
    else {
        return codes::STRUCTURE;
    };
    guarded(|| crate::animation::export_animation(&input, &output).map(|_| ()))
}
