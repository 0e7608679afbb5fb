//! Scene import sessions
//!
//! One session per export call. The session owns the imported scene and is
//! dropped on every exit path of the call.

use std::path::{Path, PathBuf};

use crate::scene::{self, ImportError, Scene};

pub struct ImportSession {
    path: PathBuf,
    scene: Scene,
}

impl ImportSession {
    /// Import a scene file, choosing the importer by extension
    pub fn open(path: &Path) -> Result<Self, ImportError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();

        let scene = match ext.as_str() {
            "gltf" | "glb" => scene::import_gltf(path)?,
            "json" => scene::load_description(path)?,
            _ => return Err(ImportError::UnsupportedFormat(path.to_path_buf())),
        };

        tracing::debug!(
            "Opened session for {:?}: {} nodes, {} meshes",
            path,
            scene.nodes.len(),
            scene.meshes.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            scene,
        })
    }

    /// Wrap an already built scene
    pub fn from_scene(path: impl Into<PathBuf>, scene: Scene) -> Result<Self, ImportError> {
        Ok(Self {
            path: path.into(),
            scene: scene.finalize()?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl Drop for ImportSession {
    fn drop(&mut self) {
        tracing::debug!("Closing session for {:?}", self.path);
    }
}
