//! Asset file naming for baked outputs.
//!
//! `BAKE_FORMAT` is the single source of truth for the extensions the batch
//! driver substitutes and the default output paths of the C API.
//!
//! # Example
//!
//! ```
//! use bake_common::BAKE_FORMAT;
//!
//! assert_eq!(BAKE_FORMAT.mesh_ext, "mesh");
//! assert_eq!(BAKE_FORMAT.default_mesh_path, "TestMesh.mesh");
//! ```

/// Extension and default path set for baked assets.
#[derive(Debug, Clone, Copy)]
pub struct AssetFormat {
    /// Mesh file extension without dot
    pub mesh_ext: &'static str,

    /// Material table file extension without dot
    pub material_ext: &'static str,

    /// Animation clip file extension without dot
    pub animation_ext: &'static str,

    /// Output path used when a mesh export is given none
    pub default_mesh_path: &'static str,

    /// Output path used when a material export is given none
    pub default_material_path: &'static str,

    /// Output path used when an animation export is given none
    pub default_animation_path: &'static str,
}

impl AssetFormat {
    pub const fn new(
        mesh_ext: &'static str,
        material_ext: &'static str,
        animation_ext: &'static str,
        default_mesh_path: &'static str,
        default_material_path: &'static str,
        default_animation_path: &'static str,
    ) -> Self {
        Self {
            mesh_ext,
            material_ext,
            animation_ext,
            default_mesh_path,
            default_material_path,
            default_animation_path,
        }
    }
}

/// Baked asset naming.
///
/// The animation default keeps the historical `TestMat.anim` name that
/// existing tooling looks for.
pub const BAKE_FORMAT: AssetFormat = AssetFormat::new(
    "mesh",
    "mats",
    "anim",
    "TestMesh.mesh",
    "TestMat.mat",
    "TestMat.anim",
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions_are_bare() {
        for ext in [
            BAKE_FORMAT.mesh_ext,
            BAKE_FORMAT.material_ext,
            BAKE_FORMAT.animation_ext,
        ] {
            assert!(!ext.starts_with('.'), "extension {ext:?} must not carry a dot");
        }
    }

    #[test]
    fn test_default_paths() {
        assert_eq!(BAKE_FORMAT.default_material_path, "TestMat.mat");
        assert_eq!(BAKE_FORMAT.default_animation_path, "TestMat.anim");
    }
}
