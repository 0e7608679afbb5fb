//! Directory batch driver
//!
//! Finds scene files by extension and runs the mesh, material and animation
//! exports on each, next to the input or into an output directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bake_common::BAKE_FORMAT;
use serde::Deserialize;
use walkdir::WalkDir;

use crate::error::ExportError;
use crate::options::ExportOptions;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory to scan; batch runs are skipped by `build` when unset
    pub dir: Option<PathBuf>,
    /// Scene file extensions, case-insensitive
    pub extensions: Vec<String>,
    pub recursive: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            dir: None,
            extensions: vec!["glb".to_string(), "gltf".to_string()],
            recursive: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Mesh,
    Materials,
    Animation,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Mesh, AssetKind::Materials, AssetKind::Animation];

    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Mesh => BAKE_FORMAT.mesh_ext,
            AssetKind::Materials => BAKE_FORMAT.material_ext,
            AssetKind::Animation => BAKE_FORMAT.animation_ext,
        }
    }
}

/// Outcome of one export of one file
#[derive(Debug)]
pub struct AssetOutcome {
    pub kind: AssetKind,
    pub output: PathBuf,
    pub result: Result<(), ExportError>,
}

#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub assets: Vec<AssetOutcome>,
}

impl FileReport {
    pub fn succeeded(&self) -> bool {
        self.assets.iter().all(|a| a.result.is_ok())
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn exported(&self) -> usize {
        self.outcomes().filter(|a| a.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes().filter(|a| a.result.is_err()).count()
    }

    fn outcomes(&self) -> impl Iterator<Item = &AssetOutcome> {
        self.files.iter().flat_map(|f| &f.assets)
    }
}

/// Scene files under `dir` with a configured extension, sorted by path
pub fn find_scenes(dir: &Path, config: &BatchConfig) -> Vec<PathBuf> {
    let max_depth = if config.recursive { usize::MAX } else { 1 };
    let mut scenes: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(max_depth)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|ext| config.extensions.iter().any(|x| x.eq_ignore_ascii_case(ext)))
        })
        .collect();
    scenes.sort();
    scenes
}

/// Output path for one asset of `input`
pub fn output_path(input: &Path, output_dir: Option<&Path>, kind: AssetKind) -> PathBuf {
    let derived = input.with_extension(kind.extension());
    match (output_dir, derived.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => derived,
    }
}

/// Run the three exports on one scene file
pub fn export_file(input: &Path, output_dir: Option<&Path>, options: &ExportOptions) -> FileReport {
    let assets = AssetKind::ALL
        .into_iter()
        .map(|kind| {
            let output = output_path(input, output_dir, kind);
            let result = match kind {
                AssetKind::Mesh => crate::mesh::export_simple_mesh(input, &output, None, options).map(|_| ()),
                AssetKind::Materials => crate::material::export_materials(input, &output).map(|_| ()),
                AssetKind::Animation => crate::animation::export_animation(input, &output).map(|_| ()),
            };
            if let Err(err) = &result {
                tracing::warn!("{:?} export of {:?} failed ({}): {}", kind, input, err.code(), err);
            }
            AssetOutcome { kind, output, result }
        })
        .collect();

    FileReport {
        input: input.to_path_buf(),
        assets,
    }
}

/// Export every matching scene file in `dir`
pub fn run_batch(
    dir: &Path,
    config: &BatchConfig,
    options: &ExportOptions,
    output_dir: Option<&Path>,
) -> Result<BatchReport> {
    if !dir.is_dir() {
        anyhow::bail!("Batch directory not found: {:?}", dir);
    }
    if let Some(out) = output_dir {
        std::fs::create_dir_all(out).with_context(|| format!("Failed to create output directory: {:?}", out))?;
    }

    let scenes = find_scenes(dir, config);
    tracing::info!("Found {} scene files in {:?}", scenes.len(), dir);

    let mut report = BatchReport::default();
    for input in scenes {
        let file = export_file(&input, output_dir, options);
        if file.succeeded() {
            tracing::info!("Exported {:?}", input);
        } else {
            tracing::warn!("Exported {:?} with errors", input);
        }
        report.files.push(file);
    }

    tracing::info!(
        "Batch complete: {} assets exported, {} failed",
        report.exported(),
        report.failed()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_find_scenes_filters_and_sorts() {
        let dir = tempdir().unwrap();
        for name in ["b.glb", "a.GLTF", "notes.txt", "c.json"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("d.glb"), b"").unwrap();

        let config = BatchConfig::default();
        let found = find_scenes(dir.path(), &config);
        let names: Vec<_> = found.iter().filter_map(|p| p.file_name()?.to_str()).collect();
        assert_eq!(names, ["a.GLTF", "b.glb"]);

        let recursive = BatchConfig {
            recursive: true,
            ..BatchConfig::default()
        };
        assert_eq!(find_scenes(dir.path(), &recursive).len(), 3);
    }

    #[test]
    fn test_output_paths() {
        let input = Path::new("scenes/hero.glb");
        assert_eq!(output_path(input, None, AssetKind::Mesh), Path::new("scenes/hero.mesh"));
        assert_eq!(output_path(input, None, AssetKind::Materials), Path::new("scenes/hero.mats"));
        assert_eq!(
            output_path(input, Some(Path::new("out")), AssetKind::Animation),
            Path::new("out/hero.anim")
        );
    }

    #[test]
    fn test_broken_file_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("broken.gltf"), b"not gltf").unwrap();

        let report = run_batch(dir.path(), &BatchConfig::default(), &ExportOptions::default(), None).unwrap();
        assert_eq!(report.files.len(), 1);
        assert!(!report.files[0].succeeded());
        assert_eq!(report.failed(), 3);
        assert!(report.files[0].assets.iter().all(|a| a.result.as_ref().is_err_and(|e| e.code() == -1)));
    }
}
