//! Material table export (scene surfaces -> .mats)

use std::path::Path;

use bake_common::{MaterialChannel, MaterialComponent, MaterialLibrary, MaterialRecord};

use crate::error::ExportError;
use crate::formats::write_material_file;
use crate::scene::{ColorChannel, Scene, ShadingModel};
use crate::session::ImportSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialSummary {
    pub material_count: usize,
    pub texture_count: usize,
    /// Surfaces that are neither Lambert nor Phong
    pub skipped: usize,
}

fn component(library: &mut MaterialLibrary, channel: &ColorChannel) -> Result<MaterialComponent, ExportError> {
    let mut component = MaterialComponent {
        value: channel.color,
        factor: channel.factor,
        ..MaterialComponent::default()
    };
    if let Some(path) = &channel.texture {
        component.input = library
            .push_texture_path(path)
            .ok_or_else(|| ExportError::TexturePathTooLong { path: path.clone() })?;
    }
    Ok(component)
}

/// Build the material table of a scene
///
/// Textures are appended to the path table in diffuse, emissive, specular
/// order per material. Shininess keeps its defaults.
pub fn collect_materials(scene: &Scene) -> Result<(MaterialLibrary, MaterialSummary), ExportError> {
    let mut library = MaterialLibrary::new();
    let mut skipped = 0;

    for material in &scene.materials {
        if material.shading == ShadingModel::Other {
            tracing::debug!("Skipping material '{}': not a Lambert surface", material.name);
            skipped += 1;
            continue;
        }

        let mut record = MaterialRecord::default();
        record[MaterialChannel::Diffuse] = component(&mut library, &material.diffuse)?;
        record[MaterialChannel::Emissive] = component(&mut library, &material.emissive)?;
        if material.shading == ShadingModel::Phong {
            record[MaterialChannel::Specular] = component(&mut library, &material.specular)?;
        }
        library.materials.push(record);
    }

    let summary = MaterialSummary {
        material_count: library.materials.len(),
        texture_count: library.texture_paths().len(),
        skipped,
    };
    Ok((library, summary))
}

/// Export every Lambert/Phong material of a scene file
pub fn export_materials(input: &Path, output: &Path) -> Result<MaterialSummary, ExportError> {
    let session = ImportSession::open(input)?;
    let (library, summary) = collect_materials(session.scene())?;
    write_material_file(output, &library)?;

    tracing::info!(
        "Exported {} materials ({} textures) -> {:?}",
        summary.material_count,
        summary.texture_count,
        output
    );
    Ok(summary)
}
