//! Imported scene graph
//!
//! Format-neutral representation of everything an importer produces: meshes,
//! materials, embedded textures and a node hierarchy. Texture coordinates keep
//! Assimp's bottom-left origin.

use serde::{Deserialize, Serialize};

/// A single polygon, as indices into the owning mesh's vertex array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    pub indices: Vec<u32>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn triangle(a: u32, b: u32, c: u32) -> Self {
        Self {
            indices: vec![a, b, c],
        }
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// Imported mesh record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<[f32; 3]>,
    /// Per-vertex normals; empty when the source had none
    pub normals: Vec<[f32; 3]>,
    pub faces: Vec<Face>,
    /// UV channels, each with one entry per vertex
    pub texture_coords: Vec<Vec<[f32; 2]>>,
    pub material_index: Option<usize>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn has_normals(&self) -> bool {
        !self.normals.is_empty() && self.normals.len() == self.vertices.len()
    }

    /// Whether UV channel `channel` exists and covers every vertex
    pub fn has_texture_coords(&self, channel: usize) -> bool {
        self.texture_coords
            .get(channel)
            .map(|uvs| !uvs.is_empty() && uvs.len() == self.vertices.len())
            .unwrap_or(false)
    }

    pub fn texture_coords(&self, channel: usize) -> Option<&[[f32; 2]]> {
        if self.has_texture_coords(channel) {
            self.texture_coords.get(channel).map(Vec::as_slice)
        } else {
            None
        }
    }
}

/// Imported material
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    /// RGBA diffuse / base color factor
    pub diffuse_color: Option<[f32; 4]>,
    /// Diffuse texture reference: a file path, or `*N` for embedded texture N
    pub diffuse_texture: Option<String>,
}

impl Material {
    pub fn has_texture_diffuse(&self) -> bool {
        self.diffuse_texture
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }

    /// Index of the embedded texture this material points at, if any
    pub fn embedded_texture_index(&self) -> Option<usize> {
        parse_embedded_reference(self.diffuse_texture.as_deref()?)
    }
}

/// Parse an embedded texture reference of the form `*N`
pub fn parse_embedded_reference(reference: &str) -> Option<usize> {
    reference.strip_prefix('*')?.parse().ok()
}

/// Image data stored inside the model file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddedTexture {
    /// Short format hint such as `png` or `jpg`
    pub format_hint: String,
    /// Compressed (encoded) image bytes
    pub data: Vec<u8>,
}

impl EmbeddedTexture {
    pub fn has_compressed_data(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Node in the imported hierarchy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub mesh_indices: Vec<usize>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Visit every mesh index referenced by this node and its descendants
    pub fn all_mesh_indices(&self) -> Vec<usize> {
        let mut out = self.mesh_indices.clone();
        for child in &self.children {
            out.extend(child.all_mesh_indices());
        }
        out
    }
}

/// Complete imported scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub textures: Vec<EmbeddedTexture>,
    pub root: Node,
}

impl Scene {
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Total faces across all meshes
    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(Mesh::face_count).sum()
    }

    /// Total vertices across all meshes
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(Mesh::vertex_count).sum()
    }

    /// Material used by the mesh, if its index is valid
    pub fn material_for(&self, mesh: &Mesh) -> Option<&Material> {
        mesh.material_index.and_then(|i| self.materials.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_reference() {
        assert_eq!(parse_embedded_reference("*0"), Some(0));
        assert_eq!(parse_embedded_reference("*12"), Some(12));
        assert_eq!(parse_embedded_reference("tex.png"), None);
        assert_eq!(parse_embedded_reference("*abc"), None);
    }

    #[test]
    fn test_texture_coords_require_full_coverage() {
        let mut mesh = Mesh::new("m");
        mesh.vertices = vec![[0.0; 3]; 3];
        mesh.texture_coords = vec![vec![[0.0, 0.0]; 2]];
        assert!(!mesh.has_texture_coords(0));

        mesh.texture_coords = vec![vec![[0.0, 0.0]; 3]];
        assert!(mesh.has_texture_coords(0));
        assert!(!mesh.has_texture_coords(1));
    }

    #[test]
    fn test_node_mesh_indices() {
        let mut root = Node::new("Root");
        root.mesh_indices.push(0);
        let mut child = Node::new("child");
        child.mesh_indices.extend([1, 2]);
        root.children.push(child);
        assert_eq!(root.all_mesh_indices(), vec![0, 1, 2]);
    }
}
