//! Saving inspector textures to disk

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use crate::convert::TextureNode;

#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Texture {0} has neither data nor a source file")]
    NoSource(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Default file name offered when saving `node`
pub fn default_file_name(node: &TextureNode) -> String {
    format!("{}{}", node.name, node.file_extension())
}

/// Write the embedded payload, or copy the source file, to `dest`
pub fn save_texture(node: &TextureNode, dest: &Path) -> Result<(), TextureError> {
    if let Some(data) = &node.data {
        std::fs::write(dest, data)?;
    } else if let Some(source) = &node.file_path {
        std::fs::copy(source, dest)?;
    } else {
        return Err(TextureError::NoSource(node.name.clone()));
    }
    info!(texture = %node.name, dest = %dest.display(), "Saved texture");
    Ok(())
}

/// Save every texture into `dir`, returning how many were written
pub fn export_all_textures(nodes: &[TextureNode], dir: &Path) -> usize {
    nodes
        .iter()
        .filter(|node| {
            let dest = dir.join(default_file_name(node));
            match save_texture(node, &dest) {
                Ok(()) => true,
                Err(e) => {
                    warn!(texture = %node.name, "Skipping texture: {}", e);
                    false
                }
            }
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn embedded(name: &str, format: &str) -> TextureNode {
        TextureNode {
            name: name.to_string(),
            format: format.to_string(),
            data: Some(vec![1, 2, 3]),
            ..Default::default()
        }
    }

    #[test]
    fn test_extension_from_format() {
        assert_eq!(default_file_name(&embedded("Embedded_0", "PNG")), "Embedded_0.png");
        assert_eq!(default_file_name(&embedded("Embedded_1", "JPEG")), "Embedded_1.jpg");
        assert_eq!(default_file_name(&embedded("Embedded_2", "TGA")), "Embedded_2.jpg");
    }

    #[test]
    fn test_save_copies_source_file() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("wood.png");
        std::fs::write(&source, b"pixels").unwrap();
        let node = TextureNode {
            name: "wood".to_string(),
            format: "PNG".to_string(),
            file_path: Some(source),
            ..Default::default()
        };

        let dest = dir.path().join("copy.png");
        save_texture(&node, &dest).unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"pixels");
    }

    #[test]
    fn test_export_all_counts_successes() {
        let dir = TempDir::new().unwrap();
        let nodes = vec![
            embedded("Embedded_0", "PNG"),
            TextureNode {
                name: "orphan".to_string(),
                ..Default::default()
            },
            embedded("Embedded_1", "JPEG"),
        ];

        assert_eq!(export_all_textures(&nodes, dir.path()), 2);
        assert!(dir.path().join("Embedded_0.png").is_file());
        assert!(dir.path().join("Embedded_1.jpg").is_file());
        assert_eq!(export_all_textures(&[], dir.path()), 0);
    }
}
