//! Model loading from the file dialog, the recent list or drag-and-drop

use std::path::Path;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use vitrine_core::{convert_scene, import_file, ImportError, ModelReport, VIEWER_STEPS};
use vitrine_scene::ui::ThumbnailCache;
use vitrine_scene::ShowModel;

use crate::app::{CurrentModel, LoadedModel, Notice, OpenModel, Session, Strings, UiState};

/// Plugin for model file loading
pub struct FileLoaderPlugin;

impl Plugin for FileLoaderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ThumbnailCache>()
            .add_systems(Update, (handle_dropped_files, load_requested_models).chain());
    }
}

/// Import, convert and summarize one model file
pub fn load_model(path: &Path) -> Result<CurrentModel, ImportError> {
    let scene = import_file(path, VIEWER_STEPS)?;
    let converted = convert_scene(&scene, path);
    let report = ModelReport::new(&scene, &converted, path);
    Ok(CurrentModel {
        path: path.to_path_buf(),
        scene,
        converted,
        report,
    })
}

fn handle_dropped_files(
    mut drops: MessageReader<FileDragAndDrop>,
    mut open: MessageWriter<OpenModel>,
) {
    for drop in drops.read() {
        if let FileDragAndDrop::DroppedFile { path_buf, .. } = drop {
            tracing::info!(path = %path_buf.display(), "File dropped");
            open.write(OpenModel(path_buf.clone()));
        }
    }
}

fn load_requested_models(
    mut requests: MessageReader<OpenModel>,
    mut show: MessageWriter<ShowModel>,
    mut loaded: ResMut<LoadedModel>,
    mut session: ResMut<Session>,
    mut notice: ResMut<Notice>,
    mut thumbnails: ResMut<ThumbnailCache>,
    mut ui_state: ResMut<UiState>,
    strings: Res<Strings>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    for OpenModel(path) in requests.read() {
        let model = match load_model(path) {
            Ok(model) => model,
            Err(e) => {
                // Keep whatever is currently displayed
                tracing::error!(path = %path.display(), "Failed to load model: {}", e);
                notice.error(strings.get("Msg_ImportError"), &e);
                continue;
            }
        };

        tracing::info!(
            path = %path.display(),
            meshes = model.converted.mesh_nodes.len(),
            textures = model.converted.texture_nodes.len(),
            "Loaded model"
        );

        show.write(ShowModel(model.converted.group.clone()));
        thumbnails.clear();
        ui_state.selected_texture = None;

        if let Ok(mut window) = windows.single_mut() {
            window.title = format!("{} - {}", strings.get("App_Title"), model.report.file_name);
        }

        session.recent.insert(path.clone());
        if let Err(e) = session.recent.save(&session.paths) {
            tracing::error!("Failed to save recent files: {}", e);
            notice.error(strings.get("Msg_SaveError"), &e);
        }

        loaded.0 = Some(model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const QUAD_OBJ: &str = "o quad\nv 0 0 0\nv 2 0 0\nv 2 1 0\nv 0 1 0\nf 1 2 3 4\n";

    #[test]
    fn test_load_model_builds_lists_and_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quad.obj");
        std::fs::write(&path, QUAD_OBJ).unwrap();

        let model = load_model(&path).unwrap();
        assert_eq!(model.converted.mesh_nodes.len(), 1);
        assert!(model.converted.texture_nodes.is_empty());
        // The quad is triangulated for display
        assert_eq!(model.converted.poly_count, 2);
        assert_eq!(model.report.file_name, "quad.obj");
        assert_eq!(model.report.mesh_count, 1);
    }

    #[test]
    fn test_load_model_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_model(&dir.path().join("missing.obj"));
        assert!(matches!(result, Err(ImportError::NotFound(_))));
    }

    #[test]
    fn test_failed_load_keeps_previous_model() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("quad.obj");
        std::fs::write(&good, QUAD_OBJ).unwrap();

        let mut app = App::new();
        app.insert_resource(Session::load(vitrine_core::SessionPaths::new(dir.path())))
            .init_resource::<LoadedModel>()
            .init_resource::<Notice>()
            .init_resource::<ThumbnailCache>()
            .init_resource::<UiState>()
            .init_resource::<Strings>()
            .add_message::<OpenModel>()
            .add_message::<ShowModel>()
            .add_systems(Update, load_requested_models);

        app.world_mut().write_message(OpenModel(good.clone()));
        app.update();
        assert!(app.world().resource::<Notice>().0.is_none());

        app.world_mut()
            .write_message(OpenModel(dir.path().join("broken.xyz")));
        app.update();

        let loaded = app.world().resource::<LoadedModel>();
        assert_eq!(loaded.0.as_ref().map(|m| m.path.clone()), Some(good.clone()));
        assert!(app.world().resource::<Notice>().0.is_some());

        let session = app.world().resource::<Session>();
        assert_eq!(session.recent.entries(), &[good]);
        assert!(dir.path().join("recent.txt").is_file());
    }
}
