//! User actions behind the menus and inspector buttons.
//!
//! Each action asks for a destination, runs synchronously and reports the
//! outcome through the message dialog. A failed action never touches the
//! displayed model.

use std::path::{Path, PathBuf};

use bevy::image::IntoDynamicImageError;
use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use thiserror::Error;
use vitrine_core::export::export_to_path;
use vitrine_core::{
    export_all_textures, save_texture, single_mesh_scene, ExportError, ExportFormat, Language,
    Settings, Unit,
};

use crate::app::{CurrentModel, Notice, Session, Strings};
use crate::file_picker;

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("No mesh at index {0}")]
    NoSuchMesh(usize),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Cannot convert captured frame: {0}")]
    Capture(#[from] IntoDynamicImageError),
    #[error("Cannot write image: {0}")]
    Image(#[from] image::ImageError),
}

/// Export the whole imported scene; the destination extension picks the format
pub fn export_model(model: &CurrentModel, dest: &Path) -> Result<ExportFormat, ActionError> {
    Ok(export_to_path(&model.scene, dest)?)
}

/// Export one mesh as a standalone scene
pub fn export_part(
    model: &CurrentModel,
    index: usize,
    dest: &Path,
) -> Result<ExportFormat, ActionError> {
    let node = model
        .converted
        .mesh_nodes
        .get(index)
        .ok_or(ActionError::NoSuchMesh(index))?;
    Ok(export_to_path(&single_mesh_scene(&node.source), dest)?)
}

fn model_stem(model: &CurrentModel) -> String {
    model
        .path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

pub fn export_model_dialog(model: Option<&CurrentModel>, strings: &Strings, notice: &mut Notice) {
    let Some(model) = model else {
        notice.info(strings.get("Msg_NoModel"));
        return;
    };
    let Some(dest) = file_picker::pick_export_path(&ExportFormat::ALL, &model_stem(model)) else {
        return;
    };

    match export_model(model, &dest) {
        Ok(format) => {
            tracing::info!(dest = %dest.display(), format = format.id(), "Model exported");
            notice.info(strings.get("Msg_ExportSuccess"));
        }
        Err(e) => {
            tracing::error!(dest = %dest.display(), "Model export failed: {}", e);
            notice.error(strings.get("Msg_ExportError"), e);
        }
    }
}

pub fn save_part_dialog(
    model: Option<&CurrentModel>,
    selected: Option<usize>,
    strings: &Strings,
    notice: &mut Notice,
) {
    let Some(model) = model else {
        notice.info(strings.get("Msg_NoModel"));
        return;
    };
    let Some(node) = selected.and_then(|i| model.converted.mesh_nodes.get(i).map(|n| (i, n)))
    else {
        notice.info(strings.get("Msg_NoSelection"));
        return;
    };
    let (index, node) = node;
    let Some(dest) = file_picker::pick_export_path(&ExportFormat::SINGLE_MESH, &node.name) else {
        return;
    };

    match export_part(model, index, &dest) {
        Ok(_) => notice.info(strings.get("Msg_PartSaved")),
        Err(e) => {
            tracing::error!(mesh = %node.name, "Part export failed: {}", e);
            notice.error(strings.get("Msg_ExportError"), e);
        }
    }
}

pub fn save_texture_dialog(
    model: Option<&CurrentModel>,
    selected: Option<usize>,
    strings: &Strings,
    notice: &mut Notice,
) {
    let Some(node) = model.and_then(|m| selected.and_then(|i| m.converted.texture_nodes.get(i)))
    else {
        notice.info(strings.get("Msg_NoTexture"));
        return;
    };
    let Some(dest) = file_picker::pick_texture_path(node) else {
        return;
    };

    match save_texture(node, &dest) {
        Ok(()) => notice.info(strings.get("Msg_TextureSaved")),
        Err(e) => {
            tracing::error!(texture = %node.name, "Texture save failed: {}", e);
            notice.error(strings.get("Msg_SaveError"), e);
        }
    }
}

pub fn export_textures_dialog(model: Option<&CurrentModel>, strings: &Strings, notice: &mut Notice) {
    let nodes = model.map(|m| m.converted.texture_nodes.as_slice()).unwrap_or_default();
    if nodes.is_empty() {
        notice.info(strings.get("Msg_NoTexture"));
        return;
    }
    let Some(dir) = file_picker::pick_folder() else {
        return;
    };

    let saved = export_all_textures(nodes, &dir);
    tracing::info!(dir = %dir.display(), saved, total = nodes.len(), "Exported textures");
    if saved == 0 {
        notice.error(strings.get("Msg_SaveError"), format!("0/{}", nodes.len()));
    } else {
        notice.info(strings.get("Msg_TextureSaved"));
    }
}

/// Write a captured frame to `dest` as RGB; the extension picks the encoding
pub fn save_screenshot(frame: Image, dest: &Path) -> Result<(), ActionError> {
    // Alpha holds brightness when HDR is on
    frame.try_into_dynamic()?.to_rgb8().save(dest)?;
    Ok(())
}

/// Observer that saves the capture and reports the outcome once it is on disk
fn report_screenshot(
    dest: PathBuf,
) -> impl FnMut(On<ScreenshotCaptured>, ResMut<Notice>, Res<Strings>) {
    move |captured, mut notice, strings| match save_screenshot(captured.image.clone(), &dest) {
        Ok(()) => {
            tracing::info!(dest = %dest.display(), "Screenshot saved");
            notice.info(strings.get("Msg_ScreenshotSaved"));
        }
        Err(e) => {
            tracing::error!(dest = %dest.display(), "Screenshot save failed: {}", e);
            notice.error(strings.get("Msg_SaveError"), e);
        }
    }
}

/// Capture the primary window to a PNG chosen by the user.
///
/// The capture completes a frame or two later; the message dialog is filled
/// in by the observer.
pub fn screenshot_dialog(commands: &mut Commands) {
    let default_name = format!(
        "screenshot_{}.png",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let Some(dest) = file_picker::pick_screenshot_path(&default_name) else {
        return;
    };

    tracing::info!(dest = %dest.display(), "Capturing screenshot");
    commands
        .spawn(Screenshot::primary_window())
        .observe(report_screenshot(dest));
}

pub fn save_report_dialog(
    model: Option<&CurrentModel>,
    unit: Unit,
    strings: &Strings,
    notice: &mut Notice,
) {
    let Some(model) = model else {
        notice.info(strings.get("Msg_NoModel"));
        return;
    };
    let Some(dest) = file_picker::pick_report_path(&model.path) else {
        return;
    };

    match model.report.save(&dest, unit) {
        Ok(()) => notice.info(strings.get("Msg_ReportReady")),
        Err(e) => {
            tracing::error!(dest = %dest.display(), "Report save failed: {}", e);
            notice.error(strings.get("Msg_SaveError"), e);
        }
    }
}

/// Switch the UI language at once; it reaches disk with the next save
pub fn switch_language(session: &mut Session, draft: &mut Settings, language: Language) {
    draft.language = language.code().to_string();
    session.settings.language = draft.language.clone();
}

/// Persist edited settings and make them current
pub fn save_settings(session: &mut Session, draft: Settings, strings: &Strings, notice: &mut Notice) {
    session.settings = draft;
    match session.settings.save(&session.paths) {
        Ok(()) => notice.info(strings.get("Msg_SettingsSaved")),
        Err(e) => {
            tracing::error!("Settings save failed: {}", e);
            notice.error(strings.get("Msg_SaveError"), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_loader::load_model;
    use tempfile::TempDir;
    use vitrine_core::{import_file, PostProcessSteps, SessionPaths};

    const TWO_PARTS_OBJ: &str = "o left\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n\
                                 o right\nv 2 0 0\nv 3 0 0\nv 3 1 0\nv 2 1 0\nf 4 5 6 7\n";

    fn loaded(dir: &TempDir) -> CurrentModel {
        let path = dir.path().join("parts.obj");
        std::fs::write(&path, TWO_PARTS_OBJ).unwrap();
        load_model(&path).unwrap()
    }

    #[test]
    fn test_export_part_writes_only_that_mesh() {
        let dir = TempDir::new().unwrap();
        let model = loaded(&dir);
        let dest = dir.path().join("right.stl");

        let format = export_part(&model, 1, &dest).unwrap();
        assert_eq!(format, ExportFormat::Stl);

        let part = import_file(&dest, PostProcessSteps::empty()).unwrap();
        assert_eq!(part.face_count(), 2);
    }

    #[test]
    fn test_export_part_rejects_bad_index() {
        let dir = TempDir::new().unwrap();
        let model = loaded(&dir);
        let result = export_part(&model, 7, &dir.path().join("x.obj"));
        assert!(matches!(result, Err(ActionError::NoSuchMesh(7))));
    }

    #[test]
    fn test_export_model_picks_format_from_extension() {
        let dir = TempDir::new().unwrap();
        let model = loaded(&dir);

        let format = export_model(&model, &dir.path().join("out.fbx")).unwrap();
        assert_eq!(format, ExportFormat::Fbx);
        let back = import_file(&dir.path().join("out.fbx"), PostProcessSteps::empty()).unwrap();
        assert_eq!(back.face_count(), model.scene.face_count());

        let result = export_model(&model, &dir.path().join("out.xyz"));
        assert!(matches!(
            result,
            Err(ActionError::Export(ExportError::UnsupportedFormat(_)))
        ));
        assert!(!dir.path().join("out.xyz").exists());
    }

    fn frame(width: u32, height: u32) -> Image {
        use bevy::asset::RenderAssetUsages;
        use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};

        Image::new_fill(
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[0, 128, 255, 255],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        )
    }

    fn capture_into(dest: PathBuf) -> App {
        let mut app = App::new();
        app.init_resource::<Notice>().init_resource::<Strings>();
        let entity = app
            .world_mut()
            .spawn_empty()
            .observe(report_screenshot(dest))
            .id();
        app.world_mut().trigger(ScreenshotCaptured {
            entity,
            image: frame(4, 2),
        });
        app
    }

    #[test]
    fn test_screenshot_reports_saved_after_write() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("shot.png");

        let app = capture_into(dest.clone());

        assert_eq!(
            app.world().resource::<Notice>().0.as_deref(),
            Some(Strings::default().get("Msg_ScreenshotSaved"))
        );
        let saved = image::open(&dest).unwrap();
        assert_eq!((saved.width(), saved.height()), (4, 2));
    }

    #[test]
    fn test_screenshot_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("missing").join("shot.png");

        let app = capture_into(dest.clone());

        let notice = app.world().resource::<Notice>().0.clone().unwrap();
        assert!(notice.starts_with(Strings::default().get("Msg_SaveError")));
        assert!(!dest.exists());
    }

    #[test]
    fn test_switch_language_applies_before_save() {
        let dir = TempDir::new().unwrap();
        let paths = SessionPaths::new(dir.path());
        let mut session = Session::load(paths.clone());
        let mut draft = session.settings.clone();
        draft.show_fps = true;

        switch_language(&mut session, &mut draft, Language::TrTr);

        assert_eq!(session.settings.language, "tr-TR");
        assert_eq!(draft.language, "tr-TR");
        // Other edits wait for the save button
        assert!(!session.settings.show_fps);
        assert_eq!(Settings::load(&paths), Settings::default());
    }

    #[test]
    fn test_save_settings_persists_and_notifies() {
        let dir = TempDir::new().unwrap();
        let mut session = Session::load(SessionPaths::new(dir.path()));
        let mut notice = Notice::default();
        let strings = Strings::default();
        let draft = Settings {
            show_fps: true,
            ..Settings::default()
        };

        save_settings(&mut session, draft.clone(), &strings, &mut notice);

        assert_eq!(notice.0.as_deref(), Some("Settings saved."));
        assert_eq!(Settings::load(&SessionPaths::new(dir.path())), draft);
    }
}
