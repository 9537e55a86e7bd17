//! Export adapter: retained [`Scene`] out to a file through the Assimp exporter

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::assimp;
use crate::scene::{Material, Mesh, Node, Scene};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),
    #[error("Export failed: {0}")]
    Assimp(String),
    #[error("Scene has no geometry to export")]
    NothingToExport,
}

/// Export targets offered by the save dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Fbx,
    Glb,
    Gltf,
    Obj,
    Stl,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Fbx,
        ExportFormat::Glb,
        ExportFormat::Gltf,
        ExportFormat::Obj,
        ExportFormat::Stl,
    ];

    /// Formats offered when saving a single mesh
    pub const SINGLE_MESH: [ExportFormat; 2] = [ExportFormat::Obj, ExportFormat::Stl];

    /// Assimp exporter identifier
    pub fn id(&self) -> &'static str {
        match self {
            ExportFormat::Fbx => "fbx",
            ExportFormat::Glb => "glb2",
            ExportFormat::Gltf => "gltf2",
            ExportFormat::Obj => "obj",
            ExportFormat::Stl => "stlb",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Fbx => "fbx",
            ExportFormat::Glb => "glb",
            ExportFormat::Gltf => "gltf",
            ExportFormat::Obj => "obj",
            ExportFormat::Stl => "stl",
        }
    }

    /// Filter label for the save dialog
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Fbx => "FBX",
            ExportFormat::Glb => "GLB",
            ExportFormat::Gltf => "glTF",
            ExportFormat::Obj => "OBJ",
            ExportFormat::Stl => "STL",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.extension() == ext)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Write `scene` to `path` in the given format
pub fn export_scene(scene: &Scene, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
    if scene.face_count() == 0 {
        return Err(ExportError::NothingToExport);
    }
    assimp::write(scene, path, format.id()).map_err(ExportError::Assimp)?;

    info!(path = %path.display(), format = format.id(), "Exported scene");
    Ok(())
}

/// Export using the format implied by the destination extension
pub fn export_to_path(scene: &Scene, path: &Path) -> Result<ExportFormat, ExportError> {
    let format = ExportFormat::from_path(path).ok_or_else(|| {
        ExportError::UnsupportedFormat(
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or("<none>")
                .to_string(),
        )
    })?;
    export_scene(scene, path, format)?;
    Ok(format)
}

/// Minimal scene holding a copy of one mesh with a default material
pub fn single_mesh_scene(mesh: &Mesh) -> Scene {
    let mut copy = Mesh::new(mesh.name.clone());
    copy.vertices = mesh.vertices.clone();
    if mesh.has_normals() {
        copy.normals = mesh.normals.clone();
    }
    copy.faces = mesh.faces.clone();
    if let Some(uvs) = mesh.texture_coords(0) {
        copy.texture_coords = vec![uvs.to_vec()];
    }
    copy.material_index = Some(0);

    let mut root = Node::new("Root");
    root.mesh_indices.push(0);

    Scene {
        meshes: vec![copy],
        materials: vec![Material {
            name: "DefaultMaterial".to_string(),
            ..Default::default()
        }],
        textures: Vec::new(),
        root,
    }
}
