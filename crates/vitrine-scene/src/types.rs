//! Resources and messages shared between the viewport and the viewer UI

use bevy::prelude::*;
use vitrine_core::{Aabb, CameraView, MaterialOverrides, RenderGroup, RenderMaterial};

/// Viewport clear color, cycled by the background button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Background {
    #[default]
    Black,
    White,
    DarkGray,
}

impl Background {
    pub fn next(self) -> Self {
        match self {
            Background::Black => Background::White,
            Background::White => Background::DarkGray,
            Background::DarkGray => Background::Black,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Background::Black => Color::BLACK,
            Background::White => Color::WHITE,
            Background::DarkGray => Color::srgb_u8(169, 169, 169),
        }
    }
}

/// World overlay and lighting settings
#[derive(Debug, Clone, Resource)]
pub struct WorldSettings {
    pub show_grid: bool,
    pub show_axis: bool,
    pub show_bounding_box: bool,
    /// Minor grid spacing; major lines are every ten minor lines
    pub grid_spacing: f32,
    pub grid_alpha: f32,
    /// Directional light illuminance in lux
    pub light_intensity: f32,
    pub background: Background,
    // Track previous values to detect geometry changes
    prev_spacing: f32,
    prev_alpha: f32,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axis: true,
            show_bounding_box: false,
            grid_spacing: 1.0,
            grid_alpha: 0.5,
            light_intensity: 5000.0,
            background: Background::default(),
            prev_spacing: 1.0,
            prev_alpha: 0.5,
        }
    }
}

impl WorldSettings {
    /// Check if grid geometry needs to be regenerated
    pub fn needs_grid_regeneration(&self) -> bool {
        self.grid_spacing != self.prev_spacing || self.grid_alpha != self.prev_alpha
    }

    /// Mark current values as previous (call after regeneration)
    pub fn mark_grid_regenerated(&mut self) {
        self.prev_spacing = self.grid_spacing;
        self.prev_alpha = self.grid_alpha;
    }
}

/// Mesh selected in the inspector or by clicking in the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Resource)]
pub struct SelectedMesh(pub Option<usize>);

/// Opacity and color overrides for the displayed model
#[derive(Debug, Clone, Default, Resource)]
pub struct ModelMaterials(pub MaterialOverrides);

/// Camera projection and turntable state
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct ViewState {
    pub orthographic: bool,
    pub turntable: bool,
}

/// Replace the displayed model with a freshly converted group
#[derive(Debug, Clone, Message)]
pub struct ShowModel(pub RenderGroup);

/// Camera actions triggered from menus and toolbar
#[derive(Debug, Clone, Copy, PartialEq, Message)]
pub enum CameraCommand {
    Preset(CameraView),
    ZoomExtents,
    Reset,
    ToggleProjection,
    ToggleTurntable,
}

/// What is currently spawned in the viewport
#[derive(Debug, Default, Resource)]
pub struct SpawnedModel {
    pub root: Option<Entity>,
    /// Group bounds after centering
    pub bounds: Aabb,
    pub translation: Vec3,
    /// Per-mesh bounds in group-local coordinates
    pub mesh_bounds: Vec<Aabb>,
    pub base_materials: Vec<RenderMaterial>,
    pub images: Vec<Handle<Image>>,
    pub materials: Vec<Handle<StandardMaterial>>,
}

impl SpawnedModel {
    /// Bounds used for framing; a unit box stands in when nothing is loaded
    pub fn framing_bounds(&self) -> Aabb {
        if self.bounds.is_empty() {
            Aabb::new([-1.0; 3], [1.0; 3])
        } else {
            self.bounds
        }
    }

    /// World-space bounds of mesh `index`
    pub fn mesh_world_bounds(&self, index: usize) -> Option<Aabb> {
        self.mesh_bounds
            .get(index)
            .map(|b| b.translated(self.translation.to_array()))
    }
}
