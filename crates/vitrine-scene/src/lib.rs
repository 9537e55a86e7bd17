//! Vitrine Scene - Viewport plugins and shared UI widgets
//!
//! Everything that touches the renderer lives here: the orbit camera and its
//! presets, lights and world overlays, spawning of converted models, the
//! offscreen preview of the selected mesh, and the egui widgets the viewer
//! composes into its panels.

pub mod camera;
pub mod models;
pub mod preview;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;

/// Plugin that sets up the viewport
pub struct VitrineScenePlugin;

impl Plugin for VitrineScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(camera::CameraPlugin)
            .add_plugins(scene::SceneSetupPlugin)
            .add_plugins(models::ModelsPlugin)
            .add_plugins(preview::PreviewPlugin);
    }
}

// Re-export commonly used types
pub use camera::{CameraSettings, MainCamera};
pub use preview::MeshPreview;
pub use types::*;
