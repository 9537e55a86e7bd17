//! Scene-graph converter
//!
//! Turns an imported [`Scene`] into render-ready geometry plus the inspector
//! lists (meshes and textures) shown next to the viewport.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, info, warn};

use crate::bounds::Aabb;
use crate::scene::{Material, Mesh, Scene};

/// Width of texture thumbnails in the inspector
pub const THUMBNAIL_WIDTH: u32 = 150;

/// Flat gray used when a mesh has no usable diffuse texture
pub const FLAT_GRAY: [u8; 3] = [128, 128, 128];

/// Surface description for one render mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderMaterial {
    pub base_color: [f32; 4],
    /// Index into [`RenderGroup::images`]
    pub texture: Option<usize>,
}

impl RenderMaterial {
    pub fn flat_gray() -> Self {
        let [r, g, b] = FLAT_GRAY;
        Self {
            base_color: [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0],
            texture: None,
        }
    }

    pub fn textured(image: usize) -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            texture: Some(image),
        }
    }
}

/// Render-ready triangle geometry
#[derive(Debug, Clone)]
pub struct RenderMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    /// Top-left origin, ready for the GPU
    pub uvs: Option<Vec<[f32; 2]>>,
    pub indices: Vec<u32>,
    pub material: RenderMaterial,
    /// Bounds in group-local coordinates
    pub bounds: Aabb,
}

/// Everything the viewport needs to display a model
#[derive(Debug, Clone, Default)]
pub struct RenderGroup {
    pub meshes: Vec<RenderMesh>,
    /// Decoded diffuse textures shared between meshes
    pub images: Vec<RgbaImage>,
    /// Offset that moves the model center to the origin
    pub translation: [f32; 3],
    /// Bounds after centering
    pub bounds: Aabb,
}

/// Inspector entry for one imported mesh
#[derive(Debug, Clone)]
pub struct MeshNode {
    pub name: String,
    /// Index into [`RenderGroup::meshes`]
    pub render_index: usize,
    /// Copy of the imported record, used for single-mesh export
    pub source: Mesh,
}

/// Small RGBA preview image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// Inspector entry for one texture
#[derive(Debug, Clone, Default)]
pub struct TextureNode {
    pub name: String,
    /// Upper-case format tag such as `PNG` or `JPEG`
    pub format: String,
    pub data: Option<Vec<u8>>,
    pub file_path: Option<PathBuf>,
    pub thumbnail: Option<Thumbnail>,
}

impl TextureNode {
    /// Extension used when saving this texture
    pub fn file_extension(&self) -> &'static str {
        if self.format.to_ascii_uppercase().contains("PNG") {
            ".png"
        } else {
            ".jpg"
        }
    }
}

/// Result of converting one imported scene
#[derive(Debug, Clone, Default)]
pub struct ConvertedModel {
    pub group: RenderGroup,
    pub mesh_nodes: Vec<MeshNode>,
    pub texture_nodes: Vec<TextureNode>,
    pub poly_count: usize,
    pub vertex_count: usize,
}

impl ConvertedModel {
    pub fn poly_text(&self) -> String {
        format!("Polys: {}", self.poly_count)
    }

    pub fn vertex_text(&self) -> String {
        format!("Verts: {}", self.vertex_count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ImageKey {
    Embedded(usize),
    File(PathBuf),
}

/// Decoded images keyed by where they came from
#[derive(Default)]
struct ImageCache {
    images: Vec<RgbaImage>,
    index: HashMap<ImageKey, Option<usize>>,
}

impl ImageCache {
    fn get_or_decode(
        &mut self,
        key: ImageKey,
        decode: impl FnOnce() -> image::ImageResult<image::DynamicImage>,
    ) -> Option<usize> {
        if let Some(&cached) = self.index.get(&key) {
            return cached;
        }
        let slot = match decode() {
            Ok(img) => {
                self.images.push(img.to_rgba8());
                Some(self.images.len() - 1)
            }
            Err(e) => {
                warn!(source = ?key, "Texture decode failed: {}", e);
                None
            }
        };
        self.index.insert(key, slot);
        slot
    }
}

/// Convert an imported scene for display.
///
/// `source_path` is the model file, used to resolve external textures.
pub fn convert_scene(scene: &Scene, source_path: &Path) -> ConvertedModel {
    let mut cache = ImageCache::default();
    let mut meshes = Vec::with_capacity(scene.meshes.len());
    let mut mesh_nodes = Vec::with_capacity(scene.meshes.len());
    let mut external: Vec<PathBuf> = Vec::new();

    for (i, mesh) in scene.meshes.iter().enumerate() {
        let material = scene
            .material_for(mesh)
            .map(|m| resolve_material(m, scene, source_path, &mut cache, &mut external))
            .unwrap_or_else(RenderMaterial::flat_gray);

        let name = if mesh.name.is_empty() {
            format!("Mesh_{}", i)
        } else {
            mesh.name.clone()
        };

        meshes.push(render_mesh(mesh, name.clone(), material));
        mesh_nodes.push(MeshNode {
            name,
            render_index: i,
            source: mesh.clone(),
        });
    }

    let raw_bounds = meshes
        .iter()
        .fold(Aabb::EMPTY, |acc, m: &RenderMesh| acc.union(&m.bounds));
    let translation = if raw_bounds.is_empty() {
        [0.0; 3]
    } else {
        let c = raw_bounds.center();
        [-c[0], -c[1], -c[2]]
    };

    let texture_nodes = texture_nodes(scene, &external);

    let model = ConvertedModel {
        group: RenderGroup {
            meshes,
            images: cache.images,
            translation,
            bounds: raw_bounds.translated(translation),
        },
        mesh_nodes,
        texture_nodes,
        poly_count: scene.face_count(),
        vertex_count: scene.vertex_count(),
    };

    info!(
        meshes = model.mesh_nodes.len(),
        textures = model.texture_nodes.len(),
        polys = model.poly_count,
        verts = model.vertex_count,
        "Converted scene"
    );
    model
}

fn render_mesh(mesh: &Mesh, name: String, material: RenderMaterial) -> RenderMesh {
    // Faces below three indices are points or lines and are not drawn
    let indices: Vec<u32> = mesh
        .faces
        .iter()
        .filter(|f| f.index_count() >= 3)
        .flat_map(|f| f.indices.iter().copied())
        .collect();

    let uvs = mesh
        .texture_coords(0)
        .map(|uvs| uvs.iter().map(|&[u, v]| [u, 1.0 - v]).collect());

    RenderMesh {
        name,
        positions: mesh.vertices.clone(),
        normals: if mesh.has_normals() {
            mesh.normals.clone()
        } else {
            Vec::new()
        },
        uvs,
        indices,
        material,
        bounds: Aabb::from_points(&mesh.vertices),
    }
}

fn resolve_material(
    material: &Material,
    scene: &Scene,
    source_path: &Path,
    cache: &mut ImageCache,
    external: &mut Vec<PathBuf>,
) -> RenderMaterial {
    if !material.has_texture_diffuse() {
        return RenderMaterial::flat_gray();
    }

    if let Some(n) = material.embedded_texture_index() {
        if let Some(texture) = scene.textures.get(n).filter(|t| t.has_compressed_data()) {
            let slot = cache.get_or_decode(ImageKey::Embedded(n), || {
                image::load_from_memory(&texture.data)
            });
            if let Some(slot) = slot {
                return RenderMaterial::textured(slot);
            }
        }
    }

    let reference = material.diffuse_texture.as_deref().unwrap_or_default();
    if let Some(path) = find_texture_path(source_path, reference) {
        if !external.contains(&path) {
            external.push(path.clone());
        }
        let open = path.clone();
        if let Some(slot) = cache.get_or_decode(ImageKey::File(path), || image::open(&open)) {
            return RenderMaterial::textured(slot);
        }
    } else {
        debug!(texture = %reference, "Texture file not found");
    }

    RenderMaterial::flat_gray()
}

/// Locate a texture referenced by a model file.
///
/// Candidates, in order: the reference relative to the model directory, the
/// bare file name next to the model, `textures/<name>` and
/// `<model stem>.fbm/<name>`. Backslash separators are normalized.
pub fn find_texture_path(model_path: &Path, reference: &str) -> Option<PathBuf> {
    if reference.is_empty() || reference.starts_with('*') {
        return None;
    }
    let normalized = reference.replace('\\', "/");
    let dir = model_path.parent().unwrap_or_else(|| Path::new(""));
    let file_name = Path::new(&normalized).file_name()?;
    let stem = model_path.file_stem()?.to_string_lossy();

    let candidates = [
        dir.join(&normalized),
        dir.join(file_name),
        dir.join("textures").join(file_name),
        dir.join(format!("{}.fbm", stem)).join(file_name),
    ];
    candidates.into_iter().find(|p| p.is_file())
}

fn texture_nodes(scene: &Scene, external: &[PathBuf]) -> Vec<TextureNode> {
    let mut nodes = Vec::with_capacity(scene.textures.len() + external.len());

    for (i, texture) in scene.textures.iter().enumerate() {
        let data = texture.has_compressed_data().then(|| texture.data.clone());
        nodes.push(TextureNode {
            name: format!("Embedded_{}", i),
            format: format_tag(data.as_deref(), &texture.format_hint),
            thumbnail: data.as_deref().and_then(|d| thumbnail(image::load_from_memory(d))),
            data,
            file_path: None,
        });
    }

    for path in external {
        let hint = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        nodes.push(TextureNode {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            format: format_tag(None, hint),
            data: None,
            file_path: Some(path.clone()),
            thumbnail: thumbnail(image::open(path)),
        });
    }

    nodes
}

fn format_tag(data: Option<&[u8]>, hint: &str) -> String {
    let guessed = data
        .and_then(|d| image::guess_format(d).ok())
        .or_else(|| image::ImageFormat::from_extension(hint));
    match guessed {
        Some(format) => format!("{:?}", format).to_ascii_uppercase(),
        None if hint.is_empty() => "UNKNOWN".to_string(),
        None => hint.to_ascii_uppercase(),
    }
}

/// Scale an image to the thumbnail width, keeping its aspect ratio
fn thumbnail(decoded: image::ImageResult<image::DynamicImage>) -> Option<Thumbnail> {
    let img = decoded.ok()?;
    if img.width() == 0 {
        return None;
    }
    let height = ((img.height() as u64 * THUMBNAIL_WIDTH as u64) / img.width() as u64).max(1) as u32;
    let scaled = img
        .resize_exact(THUMBNAIL_WIDTH, height, image::imageops::FilterType::Triangle)
        .to_rgba8();
    Some(Thumbnail {
        width: scaled.width(),
        height: scaled.height(),
        rgba: scaled.into_raw(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scene::{EmbeddedTexture, Face, Node};
    use std::io::Cursor;
    use tempfile::TempDir;

    /// Unit cube at (10, 20, 30): 8 vertices, 12 triangles, no materials
    pub(crate) fn cube_scene() -> Scene {
        let mut mesh = Mesh::new("");
        mesh.vertices = (0..8)
            .map(|i| {
                [
                    10.0 + (i & 1) as f32,
                    20.0 + ((i >> 1) & 1) as f32,
                    30.0 + ((i >> 2) & 1) as f32,
                ]
            })
            .collect();
        mesh.faces = [
            [0, 2, 1], [1, 2, 3], // -z
            [4, 5, 6], [5, 7, 6], // +z
            [0, 1, 4], [1, 5, 4], // -y
            [2, 6, 3], [3, 6, 7], // +y
            [0, 4, 2], [2, 4, 6], // -x
            [1, 3, 5], [3, 7, 5], // +x
        ]
        .iter()
        .map(|&[a, b, c]| Face::triangle(a, b, c))
        .collect();

        let mut root = Node::new("Root");
        root.mesh_indices.push(0);
        Scene {
            meshes: vec![mesh],
            root,
            ..Default::default()
        }
    }

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_cube_scenario() {
        let model = convert_scene(&cube_scene(), Path::new("cube.obj"));

        assert_eq!(model.mesh_nodes.len(), 1);
        assert_eq!(model.mesh_nodes[0].name, "Mesh_0");
        assert_eq!(model.poly_text(), "Polys: 12");
        assert_eq!(model.vertex_text(), "Verts: 8");
        assert!(model.texture_nodes.is_empty());

        let mesh = &model.group.meshes[0];
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.material, RenderMaterial::flat_gray());
    }

    #[test]
    fn test_group_is_centered() {
        let model = convert_scene(&cube_scene(), Path::new("cube.obj"));
        assert_eq!(model.group.translation, [-10.5, -20.5, -30.5]);
        let c = model.group.bounds.center();
        for k in 0..3 {
            assert!(c[k].abs() < 1e-5);
        }
    }

    #[test]
    fn test_small_faces_dropped_and_uv_flipped() {
        let mut scene = cube_scene();
        let mesh = &mut scene.meshes[0];
        mesh.faces.push(Face::new(vec![0, 1]));
        mesh.texture_coords = vec![vec![[0.0, 0.25]; 8]];

        let model = convert_scene(&scene, Path::new("cube.obj"));
        let mesh = &model.group.meshes[0];
        assert_eq!(mesh.indices.len(), 36);
        assert_eq!(mesh.uvs.as_ref().unwrap()[0], [0.0, 0.75]);
        // Stats still count the imported faces
        assert_eq!(model.poly_count, 13);
    }

    #[test]
    fn test_embedded_texture_is_decoded_and_listed() {
        let mut scene = cube_scene();
        scene.textures.push(EmbeddedTexture {
            format_hint: "png".to_string(),
            data: png_bytes(300, 100),
        });
        scene.materials.push(Material {
            name: "m".to_string(),
            diffuse_color: None,
            diffuse_texture: Some("*0".to_string()),
        });
        scene.meshes[0].material_index = Some(0);

        let model = convert_scene(&scene, Path::new("cube.glb"));
        assert_eq!(model.group.meshes[0].material, RenderMaterial::textured(0));
        assert_eq!(model.group.images.len(), 1);

        let node = &model.texture_nodes[0];
        assert_eq!(node.name, "Embedded_0");
        assert_eq!(node.format, "PNG");
        assert_eq!(node.file_extension(), ".png");
        let thumb = node.thumbnail.as_ref().unwrap();
        assert_eq!((thumb.width, thumb.height), (150, 50));
    }

    #[test]
    fn test_undecodable_embedded_falls_back_to_gray() {
        let mut scene = cube_scene();
        scene.textures.push(EmbeddedTexture {
            format_hint: "png".to_string(),
            data: vec![1, 2, 3],
        });
        scene.materials.push(Material {
            diffuse_texture: Some("*0".to_string()),
            ..Default::default()
        });
        scene.meshes[0].material_index = Some(0);

        let model = convert_scene(&scene, Path::new("cube.glb"));
        assert_eq!(model.group.meshes[0].material, RenderMaterial::flat_gray());
        assert!(model.texture_nodes[0].thumbnail.is_none());
    }

    #[test]
    fn test_find_texture_search_order() {
        let dir = TempDir::new().unwrap();
        let model = dir.path().join("car.fbx");
        std::fs::create_dir_all(dir.path().join("textures")).unwrap();
        std::fs::create_dir_all(dir.path().join("car.fbm")).unwrap();
        std::fs::write(dir.path().join("car.fbm").join("paint.png"), b"x").unwrap();

        assert_eq!(
            find_texture_path(&model, "C:\\work\\paint.png"),
            Some(dir.path().join("car.fbm").join("paint.png"))
        );

        std::fs::write(dir.path().join("textures").join("paint.png"), b"x").unwrap();
        assert_eq!(
            find_texture_path(&model, "C:\\work\\paint.png"),
            Some(dir.path().join("textures").join("paint.png"))
        );

        std::fs::write(dir.path().join("paint.png"), b"x").unwrap();
        assert_eq!(
            find_texture_path(&model, "sub/paint.png"),
            Some(dir.path().join("paint.png"))
        );
        assert_eq!(find_texture_path(&model, "missing.png"), None);
        assert_eq!(find_texture_path(&model, "*0"), None);
    }

    #[test]
    fn test_external_texture_listed() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("wood.png"), png_bytes(10, 10)).unwrap();

        let mut scene = cube_scene();
        scene.materials.push(Material {
            diffuse_texture: Some("wood.png".to_string()),
            ..Default::default()
        });
        scene.meshes[0].material_index = Some(0);

        let model = convert_scene(&scene, &dir.path().join("cube.obj"));
        assert_eq!(model.group.meshes[0].material, RenderMaterial::textured(0));
        assert_eq!(model.texture_nodes.len(), 1);
        assert_eq!(model.texture_nodes[0].name, "wood");
        assert_eq!(model.texture_nodes[0].file_path, Some(dir.path().join("wood.png")));
    }
}
