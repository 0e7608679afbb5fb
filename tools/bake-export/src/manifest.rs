//! Manifest parsing and build orchestration
//!
//! Parses bake.toml and runs the exports it lists. Relative paths are resolved
//! against the manifest's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::batch::{self, AssetKind, BatchConfig};
use crate::options::ExportOptions;

/// Root manifest structure
#[derive(Debug, Deserialize, Default)]
pub struct BakeManifest {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub options: ExportOptions,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub scenes: Vec<SceneEntry>,
    /// Directory the manifest was loaded from
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("baked/")
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SceneEntry {
    pub path: PathBuf,
    /// Output file stem; defaults to the input's
    #[serde(default)]
    pub name: Option<String>,
    /// Mesh or node name; the first mesh when unset
    #[serde(default)]
    pub mesh_name: Option<String>,
    #[serde(default = "enabled")]
    pub mesh: bool,
    #[serde(default = "enabled")]
    pub materials: bool,
    #[serde(default = "enabled")]
    pub animation: bool,
}

impl SceneEntry {
    fn stem(&self) -> String {
        self.name.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "scene".to_string())
        })
    }

    fn wants(&self, kind: AssetKind) -> bool {
        match kind {
            AssetKind::Mesh => self.mesh,
            AssetKind::Materials => self.materials,
            AssetKind::Animation => self.animation,
        }
    }
}

impl BakeManifest {
    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<BakeManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest: BakeManifest = toml::from_str(&content)
        .with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Validate a manifest without building
pub fn validate(manifest: &BakeManifest) -> Result<()> {
    for entry in &manifest.scenes {
        let path = manifest.resolve(&entry.path);
        if !path.exists() {
            anyhow::bail!("Scene source not found: {:?}", path);
        }
        if !AssetKind::ALL.into_iter().any(|kind| entry.wants(kind)) {
            anyhow::bail!("Scene {:?} has every export disabled", entry.path);
        }
    }
    if let Some(dir) = &manifest.batch.dir {
        let dir = manifest.resolve(dir);
        if !dir.is_dir() {
            anyhow::bail!("Batch directory not found: {:?}", dir);
        }
    }
    if manifest.batch.extensions.is_empty() {
        anyhow::bail!("Batch extension list is empty");
    }
    Ok(())
}

/// Build all assets from a manifest
pub fn build_all(manifest: &BakeManifest, output_override: Option<&Path>) -> Result<()> {
    let output_dir = match output_override {
        Some(dir) => dir.to_path_buf(),
        None => manifest.resolve(&manifest.output.dir),
    };
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    for entry in &manifest.scenes {
        let input = manifest.resolve(&entry.path);
        let stem = entry.stem();

        for kind in AssetKind::ALL.into_iter().filter(|&k| entry.wants(k)) {
            let output = output_dir.join(format!("{}.{}", stem, kind.extension()));
            tracing::info!("Baking {:?} {:?} -> {:?}", kind, input, output);

            let result = match kind {
                AssetKind::Mesh => {
                    crate::mesh::export_simple_mesh(&input, &output, entry.mesh_name.as_deref(), &manifest.options)
                        .map(|_| ())
                }
                AssetKind::Materials => crate::material::export_materials(&input, &output).map(|_| ()),
                AssetKind::Animation => crate::animation::export_animation(&input, &output).map(|_| ()),
            };
            result.with_context(|| format!("Failed to bake {:?} from {:?}", kind, input))?;
        }
    }

    if let Some(dir) = &manifest.batch.dir {
        let report = batch::run_batch(&manifest.resolve(dir), &manifest.batch, &manifest.options, Some(&output_dir))?;
        if report.failed() > 0 {
            anyhow::bail!("Batch finished with {} failed exports", report.failed());
        }
    }

    Ok(())
}
