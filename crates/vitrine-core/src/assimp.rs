//! Assimp bindings through `asset-importer`
//!
//! Imported scenes are mapped into [`Scene`] straight away, so no foreign
//! handle outlives a call. Exports go the other way: the [`Scene`] is staged
//! as OBJ in a temporary directory, loaded back by Assimp and handed to its
//! exporter under the requested format id.

use std::fmt::Write as _;
use std::path::Path;

use asset_importer::exporter::ExportBuilder;
use asset_importer::material::{material_keys, TextureType};
use asset_importer::node::Node as AiNode;
use asset_importer::postprocess::PostProcessSteps;
use asset_importer::texture::TextureData;
use asset_importer::Importer;
use tracing::debug;

use crate::scene::{EmbeddedTexture, Face, Material, Mesh, Node, Scene};

/// Read any format Assimp recognizes and run `steps` on it
pub(crate) fn read(path: &Path, steps: PostProcessSteps) -> Result<Scene, String> {
    let imported = Importer::new()
        .read_file(path)
        .with_post_process(steps)
        .import_file(path)
        .map_err(|e| e.to_string())?;

    let meshes = imported
        .meshes()
        .map(|mesh| {
            let mut out = Mesh::new(mesh.name().to_string());
            out.vertices = mesh
                .vertices()
                .iter()
                .map(|v| [v.x, v.y, v.z])
                .collect();
            out.normals = mesh
                .normals()
                .map(|normals| normals.iter().map(|n| [n.x, n.y, n.z]).collect())
                .unwrap_or_default();
            if let Some(uvs) = mesh.texture_coords(0) {
                out.texture_coords = vec![uvs.iter().map(|t| [t.x, t.y]).collect()];
            }
            out.faces = mesh
                .faces()
                .map(|face| Face::new(face.indices().to_vec()))
                .collect();
            out.material_index = Some(mesh.material_index() as usize);
            out
        })
        .collect();

    let materials = imported
        .materials()
        .map(|material| Material {
            name: material.name().to_string(),
            diffuse_color: material
                .get_color_property(material_keys::COLOR_DIFFUSE)
                .map(|c| [c.x, c.y, c.z, c.w]),
            diffuse_texture: material
                .texture(TextureType::Diffuse, 0)
                .map(|info| info.path)
                .filter(|p| !p.is_empty()),
        })
        .collect();

    // Raw texel arrays have no encoded form to save or thumbnail
    let textures = imported
        .textures()
        .map(|texture| EmbeddedTexture {
            format_hint: texture.format_hint().to_string(),
            data: match texture.data() {
                Ok(TextureData::Compressed(bytes)) => bytes,
                _ => Vec::new(),
            },
        })
        .collect();

    let root = imported
        .root_node()
        .map(|node| map_node(&node))
        .unwrap_or_default();

    Ok(Scene {
        meshes,
        materials,
        textures,
        root,
    })
}

fn map_node(node: &AiNode) -> Node {
    let mut out = Node::new(node.name().to_string());
    out.mesh_indices = node.mesh_indices().collect();
    out.children = node.children().map(|child| map_node(&child)).collect();
    out
}

/// Write `scene` through the Assimp exporter registered under `format_id`
pub(crate) fn write(scene: &Scene, path: &Path, format_id: &str) -> Result<(), String> {
    let stage = tempfile::tempdir().map_err(|e| e.to_string())?;
    let staged = stage.path().join("scene.obj");
    stage_obj(scene, &staged).map_err(|e| e.to_string())?;
    debug!(staged = %staged.display(), format_id, "Staged scene for export");

    let imported = Importer::new()
        .read_file(&staged)
        .import_file(&staged)
        .map_err(|e| e.to_string())?;
    ExportBuilder::new(format_id)
        .export_to_file(&imported, path)
        .map_err(|e| e.to_string())
}

/// Write the scene as OBJ, plus a sibling `.mtl` when it has materials
fn stage_obj(scene: &Scene, path: &Path) -> std::io::Result<()> {
    let mut out = String::new();

    let mtl_path = path.with_extension("mtl");
    let write_mtl = !scene.materials.is_empty();
    if write_mtl {
        if let Some(name) = mtl_path.file_name().and_then(|n| n.to_str()) {
            let _ = writeln!(out, "mtllib {}", name);
        }
    }

    // OBJ indices are 1-based and global across objects
    let mut v_base = 1u32;
    for (i, mesh) in scene.meshes.iter().enumerate() {
        let name = if mesh.name.is_empty() {
            format!("Mesh_{}", i)
        } else {
            mesh.name.replace(char::is_whitespace, "_")
        };
        let _ = writeln!(out, "o {}", name);

        for v in &mesh.vertices {
            let _ = writeln!(out, "v {} {} {}", v[0], v[1], v[2]);
        }
        let uvs = mesh.texture_coords(0);
        for t in uvs.unwrap_or_default() {
            let _ = writeln!(out, "vt {} {}", t[0], t[1]);
        }
        let has_normals = mesh.has_normals();
        if has_normals {
            for n in &mesh.normals {
                let _ = writeln!(out, "vn {} {} {}", n[0], n[1], n[2]);
            }
        }

        if write_mtl {
            if let Some(material) = scene.material_for(mesh) {
                let _ = writeln!(out, "usemtl {}", material_name(material, mesh.material_index));
            }
        }

        for face in mesh.faces.iter().filter(|f| f.index_count() >= 3) {
            out.push('f');
            for &idx in &face.indices {
                let k = idx + v_base;
                let _ = match (uvs.is_some(), has_normals) {
                    (true, true) => write!(out, " {k}/{k}/{k}"),
                    (true, false) => write!(out, " {k}/{k}"),
                    (false, true) => write!(out, " {k}//{k}"),
                    (false, false) => write!(out, " {k}"),
                };
            }
            out.push('\n');
        }

        v_base += mesh.vertices.len() as u32;
    }

    std::fs::write(path, out)?;
    if write_mtl {
        std::fs::write(&mtl_path, material_library(scene))?;
    }
    Ok(())
}

fn material_name(material: &Material, index: Option<usize>) -> String {
    if material.name.is_empty() {
        format!("Material_{}", index.unwrap_or(0))
    } else {
        material.name.replace(char::is_whitespace, "_")
    }
}

fn material_library(scene: &Scene) -> String {
    let mut out = String::new();
    for (i, material) in scene.materials.iter().enumerate() {
        let _ = writeln!(out, "newmtl {}", material_name(material, Some(i)));
        let [r, g, b, a] = material.diffuse_color.unwrap_or([0.8, 0.8, 0.8, 1.0]);
        let _ = writeln!(out, "Kd {} {} {}", r, g, b);
        let _ = writeln!(out, "d {}", a);
        // Embedded references mean nothing outside the source file
        if let Some(texture) = &material.diffuse_texture {
            if material.embedded_texture_index().is_none() && !texture.is_empty() {
                let _ = writeln!(out, "map_Kd {}", texture);
            }
        }
        out.push('\n');
    }
    out
}
