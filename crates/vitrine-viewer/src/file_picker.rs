//! Native open/save dialogs

use std::path::{Path, PathBuf};

use vitrine_core::{textures, ExportFormat, ModelFormat, TextureNode};

/// Dialog filters for opening models: every supported extension first,
/// then one filter per format, then "All files"
pub fn model_filters() -> Vec<(String, Vec<&'static str>)> {
    let mut filters = vec![(
        "3D Models".to_string(),
        ModelFormat::advertised_extensions(),
    )];
    for format in ModelFormat::ALL {
        let ext = format.extension();
        filters.push((ext.to_ascii_uppercase(), vec![ext]));
    }
    filters.push(("All files".to_string(), vec!["*"]));
    filters
}

/// Append the first offered extension when the user typed none
pub fn ensure_extension(mut path: PathBuf, formats: &[ExportFormat]) -> PathBuf {
    if path.extension().is_none() {
        if let Some(format) = formats.first() {
            path.set_extension(format.extension());
        }
    }
    path
}

fn export_dialog(formats: &[ExportFormat], file_name: &str) -> rfd::FileDialog {
    formats.iter().fold(
        rfd::FileDialog::new().set_file_name(file_name),
        |dialog, format| dialog.add_filter(format.label(), &[format.extension()]),
    )
}

pub fn pick_model() -> Option<PathBuf> {
    model_filters()
        .iter()
        .fold(rfd::FileDialog::new(), |dialog, (name, exts)| {
            dialog.add_filter(name.as_str(), exts.as_slice())
        })
        .pick_file()
}

/// Destination for a model or part export; the extension selects the format
pub fn pick_export_path(formats: &[ExportFormat], stem: &str) -> Option<PathBuf> {
    let default_name = match formats.first() {
        Some(format) => format!("{}.{}", stem, format.extension()),
        None => stem.to_string(),
    };
    export_dialog(formats, &default_name)
        .save_file()
        .map(|path| ensure_extension(path, formats))
}

pub fn pick_texture_path(node: &TextureNode) -> Option<PathBuf> {
    let default_name = textures::default_file_name(node);
    let ext = node.file_extension().trim_start_matches('.');
    rfd::FileDialog::new()
        .set_file_name(default_name.as_str())
        .add_filter(ext.to_ascii_uppercase().as_str(), &[ext])
        .save_file()
}

pub fn pick_folder() -> Option<PathBuf> {
    rfd::FileDialog::new().pick_folder()
}

pub fn pick_screenshot_path(default_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter("PNG", &["png"])
        .save_file()
        .map(|mut path| {
            if path.extension().is_none() {
                path.set_extension("png");
            }
            path
        })
}

pub fn pick_report_path(model_path: &Path) -> Option<PathBuf> {
    let stem = model_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    rfd::FileDialog::new()
        .set_file_name(format!("{}_report.txt", stem).as_str())
        .add_filter("Text", &["txt"])
        .save_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_filters_layout() {
        let filters = model_filters();
        assert_eq!(filters.len(), 1 + ModelFormat::ALL.len() + 1);
        assert_eq!(
            filters[0].1,
            vec!["obj", "stl", "fbx", "gltf", "glb", "3ds", "dae", "ply"]
        );
        assert_eq!(filters[1], ("OBJ".to_string(), vec!["obj"]));
        assert_eq!(filters.last().unwrap().0, "All files");
    }

    #[test]
    fn test_ensure_extension() {
        let path = ensure_extension(PathBuf::from("/tmp/part"), &ExportFormat::SINGLE_MESH);
        assert_eq!(path, PathBuf::from("/tmp/part.obj"));

        let typed = ensure_extension(PathBuf::from("/tmp/part.stl"), &ExportFormat::SINGLE_MESH);
        assert_eq!(typed, PathBuf::from("/tmp/part.stl"));
    }
}
