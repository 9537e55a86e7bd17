//! Import adapter: file path in, post-processed [`Scene`] out

use std::path::Path;

pub use asset_importer::postprocess::PostProcessSteps;
use thiserror::Error;
use tracing::info;

use crate::assimp;
use crate::scene::Scene;

/// Steps run on every model opened for viewing
pub const VIEWER_STEPS: PostProcessSteps = PostProcessSteps::TRIANGULATE
    .union(PostProcessSteps::GEN_NORMALS)
    .union(PostProcessSteps::JOIN_IDENTICAL_VERTICES);

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Import failed: {0}")]
    Assimp(String),
    #[error("Model contains no meshes")]
    EmptyScene,
}

/// Container formats known to the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Obj,
    Stl,
    Fbx,
    Gltf,
    Glb,
    ThreeDs,
    Collada,
    Ply,
}

impl ModelFormat {
    pub const ALL: [ModelFormat; 8] = [
        ModelFormat::Obj,
        ModelFormat::Stl,
        ModelFormat::Fbx,
        ModelFormat::Gltf,
        ModelFormat::Glb,
        ModelFormat::ThreeDs,
        ModelFormat::Collada,
        ModelFormat::Ply,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "obj" => Some(Self::Obj),
            "stl" => Some(Self::Stl),
            "fbx" => Some(Self::Fbx),
            "gltf" => Some(Self::Gltf),
            "glb" => Some(Self::Glb),
            "3ds" => Some(Self::ThreeDs),
            "dae" => Some(Self::Collada),
            "ply" => Some(Self::Ply),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Obj => "obj",
            Self::Stl => "stl",
            Self::Fbx => "fbx",
            Self::Gltf => "gltf",
            Self::Glb => "glb",
            Self::ThreeDs => "3ds",
            Self::Collada => "dae",
            Self::Ply => "ply",
        }
    }

    /// Extensions advertised by the open-file picker
    pub fn advertised_extensions() -> Vec<&'static str> {
        Self::ALL.iter().map(|f| f.extension()).collect()
    }
}

/// Import a model file and run the requested post-process steps.
///
/// Nothing outside the returned value is touched, so callers can keep their
/// current scene when this fails.
pub fn import_file(path: &Path, steps: PostProcessSteps) -> Result<Scene, ImportError> {
    if !path.is_file() {
        return Err(ImportError::NotFound(path.display().to_string()));
    }

    // Assimp would guess from content; only the advertised extensions are opened
    ModelFormat::from_path(path).ok_or_else(|| {
        ImportError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>")
                .to_string(),
        )
    })?;

    let scene = assimp::read(path, steps).map_err(ImportError::Assimp)?;
    if scene.meshes.is_empty() {
        return Err(ImportError::EmptyScene);
    }

    info!(
        path = %path.display(),
        meshes = scene.mesh_count(),
        materials = scene.material_count(),
        textures = scene.texture_count(),
        "Imported model"
    );

    Ok(scene)
}
