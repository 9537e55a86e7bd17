//! Bevy application setup and viewer-wide state

use std::path::PathBuf;

use anyhow::anyhow;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use vitrine_core::{
    ConvertedModel, Localizer, ModelReport, RecentFiles, Scene, SessionPaths, Settings, Unit,
};
use vitrine_scene::{CameraSettings, VitrineScenePlugin};

use crate::file_loader::FileLoaderPlugin;
use crate::ui::UiPlugin;

/// Settings and recent files for this session, plus where they are stored
#[derive(Debug, Clone, Resource)]
pub struct Session {
    pub paths: SessionPaths,
    pub settings: Settings,
    pub recent: RecentFiles,
}

impl Session {
    pub fn load(paths: SessionPaths) -> Self {
        let settings = Settings::load(&paths);
        let recent = RecentFiles::load(&paths);
        Self {
            paths,
            settings,
            recent,
        }
    }
}

/// Active UI string table
#[derive(Debug, Clone, Default, Resource)]
pub struct Strings(pub Localizer);

impl Strings {
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.0.get(key)
    }
}

/// The model currently on screen, kept for export and reporting
#[derive(Debug)]
pub struct CurrentModel {
    pub path: PathBuf,
    pub scene: Scene,
    pub converted: ConvertedModel,
    pub report: ModelReport,
}

#[derive(Debug, Default, Resource)]
pub struct LoadedModel(pub Option<CurrentModel>);

/// Pending text for the modal message dialog
#[derive(Debug, Default, Resource)]
pub struct Notice(pub Option<String>);

impl Notice {
    /// Show a localized prefix followed by error details
    pub fn error(&mut self, prefix: &str, error: impl std::fmt::Display) {
        self.0 = Some(format!("{}{}", prefix, error));
    }

    pub fn info(&mut self, text: &str) {
        self.0 = Some(text.to_string());
    }
}

/// Request to load a model file
#[derive(Debug, Clone, Message)]
pub struct OpenModel(pub PathBuf);

/// Window and inspector state owned by the UI
#[derive(Debug, Resource)]
pub struct UiState {
    pub show_settings: bool,
    pub show_about: bool,
    pub show_model_info: bool,
    pub dark_theme: bool,
    pub selected_texture: Option<usize>,
    pub unit: Unit,
    /// Edited copy of the settings while the settings window is open
    pub settings_draft: Settings,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            show_settings: false,
            show_about: false,
            show_model_info: false,
            dark_theme: true,
            selected_texture: None,
            unit: Unit::default(),
            settings_draft: Settings::default(),
        }
    }
}

/// Push changed settings into the camera and string table
fn apply_session_settings(
    session: Res<Session>,
    mut camera_settings: ResMut<CameraSettings>,
    mut strings: ResMut<Strings>,
    mut windows: Query<&mut Window>,
) {
    if !session.is_changed() {
        return;
    }

    let settings = &session.settings;
    camera_settings.sensitivity_scale = settings.camera_sensitivity.max(0.01);

    let language = vitrine_core::Language::from_code(&settings.language).unwrap_or_default();
    if strings.0.language() != language {
        strings.0.set_language(language);
        tracing::info!(language = language.code(), "Switched UI language");
        for mut window in windows.iter_mut() {
            window.title = strings.get("App_Title").to_string();
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let session = Session::load(SessionPaths::working_dir());
    let strings = Strings(Localizer::new(&session.settings.language));
    let title = strings.get("App_Title").to_string();

    let exit = App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title,
                ..default()
            }),
            ..default()
        }))
        // Picking must be registered before EguiPlugin so egui can detect it
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .insert_resource(session)
        .insert_resource(strings)
        .init_resource::<LoadedModel>()
        .init_resource::<Notice>()
        .init_resource::<UiState>()
        .add_message::<OpenModel>()
        .add_plugins(VitrineScenePlugin)
        .add_plugins(FileLoaderPlugin)
        .add_plugins(UiPlugin)
        .add_systems(Update, apply_session_settings)
        .run();

    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => Err(anyhow!("Viewer exited with code {}", code)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_load_defaults_in_empty_dir() {
        let dir = TempDir::new().unwrap();
        let session = Session::load(SessionPaths::new(dir.path()));
        assert!(session.recent.is_empty());
        assert_eq!(session.settings.camera_sensitivity, 1.0);
        assert!(!session.settings.show_fps);
    }

    #[test]
    fn test_notice_prefixes_error() {
        let mut notice = Notice::default();
        notice.error("Export failed: ", "disk full");
        assert_eq!(notice.0.as_deref(), Some("Export failed: disk full"));
    }

    #[test]
    fn test_settings_change_updates_camera_and_language() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new();
        app.insert_resource(Session::load(SessionPaths::new(dir.path())))
            .init_resource::<Strings>()
            .init_resource::<CameraSettings>()
            .add_systems(Update, apply_session_settings);

        {
            let mut session = app.world_mut().resource_mut::<Session>();
            session.settings.camera_sensitivity = 2.5;
            session.settings.language = "de-DE".to_string();
        }
        app.update();

        let camera = app.world().resource::<CameraSettings>();
        assert_eq!(camera.sensitivity_scale, 2.5);
        let strings = app.world().resource::<Strings>();
        assert_eq!(strings.0.language(), vitrine_core::Language::DeDe);
    }
}
