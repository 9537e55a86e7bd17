//! Camera controls: orbit navigation, view presets, projection toggle and turntable

use bevy::camera::ScalingMode;
use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use vitrine_core::view::{self, RESET_POSITION, TURNTABLE_INTERVAL, TURNTABLE_STEP};
use vitrine_core::Aabb;

use crate::types::{CameraCommand, SpawnedModel, ViewState};

const MIN_DISTANCE: f32 = 0.01;
const MAX_DISTANCE: f32 = 100_000.0;
const FAR_PLANE: f32 = 1_000_000.0;

/// Camera controller settings
#[derive(Debug, Clone, Resource)]
pub struct CameraSettings {
    pub distance: f32,
    pub target_distance: f32,
    pub azimuth: f32,
    pub elevation: f32,
    pub target: Vec3,
    pub target_focus: Vec3,
    pub up: Vec3,
    /// Radians per pixel of mouse motion
    pub sensitivity: f32,
    /// User multiplier from the settings window
    pub sensitivity_scale: f32,
    pub zoom_speed: f32,
    pub smooth_factor: f32,
    /// Vertical field of view of the perspective projection
    pub fov: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        let mut settings = Self {
            distance: 1.0,
            target_distance: 1.0,
            azimuth: 0.0,
            elevation: 0.0,
            target: Vec3::ZERO,
            target_focus: Vec3::ZERO,
            up: Vec3::Y,
            sensitivity: 0.005,
            sensitivity_scale: 1.0,
            zoom_speed: 0.1,
            smooth_factor: 0.15,
            fov: std::f32::consts::FRAC_PI_4,
        };
        settings.snap_offset(Vec3::from_array(RESET_POSITION));
        settings
    }
}

impl CameraSettings {
    /// Camera position relative to the target (Y up)
    pub fn offset(&self) -> Vec3 {
        self.distance
            * Vec3::new(
                self.elevation.cos() * self.azimuth.sin(),
                self.elevation.sin(),
                self.elevation.cos() * self.azimuth.cos(),
            )
    }

    /// Point the orbit angles along `offset`, keeping the distance
    pub fn set_direction(&mut self, offset: Vec3) {
        let len = offset.length();
        if len <= f32::EPSILON {
            return;
        }
        self.elevation = (offset.y / len).clamp(-1.0, 1.0).asin();
        self.azimuth = offset.x.atan2(offset.z);
    }

    /// Jump to `offset` without smoothing
    pub fn snap_offset(&mut self, offset: Vec3) {
        let len = offset.length();
        if len <= f32::EPSILON {
            return;
        }
        self.set_direction(offset);
        self.distance = len.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.target_distance = self.distance;
    }

    /// Jump the target without smoothing
    pub fn snap_target(&mut self, target: Vec3) {
        self.target = target;
        self.target_focus = target;
    }

    /// Frame `bounds` looking along `look` with the given up vector
    pub fn frame(&mut self, bounds: &Aabb, look: Vec3, up: Vec3) {
        let center = Vec3::from_array(bounds.center());
        let position = Vec3::from_array(view::frame_position(bounds, look.to_array(), self.fov));
        self.snap_target(center);
        self.snap_offset(position - center);
        self.up = up;
    }

    /// Orthographic viewport height matching the perspective view at the target
    pub fn orthographic_height(&self) -> f32 {
        (2.0 * self.distance * (self.fov * 0.5).tan()).max(MIN_DISTANCE)
    }
}

/// Marker component for the main camera
#[derive(Component)]
pub struct MainCamera;

/// Repeating turntable timer
#[derive(Resource)]
pub struct TurntableTimer(pub Timer);

impl Default for TurntableTimer {
    fn default() -> Self {
        Self(Timer::new(TURNTABLE_INTERVAL, TimerMode::Repeating))
    }
}

/// Plugin for camera controls
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .init_resource::<ViewState>()
            .init_resource::<TurntableTimer>()
            .add_message::<CameraCommand>()
            .add_systems(
                Update,
                (handle_camera_commands, turntable, update_camera).chain(),
            );
    }
}

/// Perspective projection used at startup and when leaving orthographic mode
pub fn perspective(fov: f32) -> Projection {
    Projection::Perspective(PerspectiveProjection {
        fov,
        near: MIN_DISTANCE,
        far: FAR_PLANE,
        ..default()
    })
}

fn orthographic(viewport_height: f32) -> Projection {
    Projection::Orthographic(OrthographicProjection {
        near: -FAR_PLANE,
        far: FAR_PLANE,
        scaling_mode: ScalingMode::FixedVertical { viewport_height },
        ..OrthographicProjection::default_3d()
    })
}

fn handle_camera_commands(
    mut commands_in: MessageReader<CameraCommand>,
    mut settings: ResMut<CameraSettings>,
    mut view_state: ResMut<ViewState>,
    mut timer: ResMut<TurntableTimer>,
    spawned: Res<SpawnedModel>,
    mut projection_query: Query<&mut Projection, With<MainCamera>>,
) {
    for command in commands_in.read() {
        let bounds = spawned.framing_bounds();
        match *command {
            CameraCommand::Preset(preset) => {
                let look = Vec3::from_array(preset.look_direction());
                let up = Vec3::from_array(preset.up_direction());
                settings.frame(&bounds, look, up);
            }
            CameraCommand::ZoomExtents => {
                let look = -settings.offset();
                let up = settings.up;
                settings.frame(&bounds, look, up);
            }
            CameraCommand::Reset => {
                settings.snap_target(Vec3::ZERO);
                settings.snap_offset(Vec3::from_array(RESET_POSITION));
                settings.up = Vec3::Y;
                let look = -settings.offset();
                settings.frame(&bounds, look, Vec3::Y);
            }
            CameraCommand::ToggleProjection => {
                let Ok(mut projection) = projection_query.single_mut() else {
                    continue;
                };
                view_state.orthographic = !view_state.orthographic;
                *projection = if view_state.orthographic {
                    orthographic(settings.orthographic_height())
                } else {
                    perspective(settings.fov)
                };
                tracing::info!(orthographic = view_state.orthographic, "Switched projection");
            }
            CameraCommand::ToggleTurntable => {
                view_state.turntable = !view_state.turntable;
                timer.0.reset();
            }
        }
    }
}

/// Rotate the camera about the vertical axis on every timer tick
fn turntable(
    time: Res<Time>,
    view_state: Res<ViewState>,
    mut timer: ResMut<TurntableTimer>,
    mut settings: ResMut<CameraSettings>,
) {
    if !view_state.turntable {
        return;
    }

    timer.0.tick(time.delta());
    for _ in 0..timer.0.times_finished_this_tick() {
        let (rotated, _look) = view::turntable_step(settings.offset().to_array(), TURNTABLE_STEP);
        settings.set_direction(Vec3::from_array(rotated));
    }
}

fn update_camera(
    mut camera_query: Query<(&mut Transform, &mut Projection), With<MainCamera>>,
    mut settings: ResMut<CameraSettings>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    time: Res<Time>,
    mut contexts: EguiContexts,
) {
    let Ok((mut transform, mut projection)) = camera_query.single_mut() else {
        return;
    };

    // Leave the pointer to egui while it is over a panel or window
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);

    let motion = mouse_motion.delta;

    // Orbit with left mouse drag
    if mouse_button.pressed(MouseButton::Left) && !egui_wants_pointer && motion != Vec2::ZERO {
        let speed = settings.sensitivity * settings.sensitivity_scale;
        settings.azimuth -= motion.x * speed;
        settings.elevation = (settings.elevation - motion.y * speed).clamp(-1.5, 1.5);
        settings.up = Vec3::Y;
    }

    // Pan with right mouse drag in the view plane
    if mouse_button.pressed(MouseButton::Right) && !egui_wants_pointer {
        let pan_speed = settings.distance * 0.002;
        let right = *transform.right();
        let up = *transform.up();
        settings.target_focus -= right * motion.x * pan_speed;
        settings.target_focus += up * motion.y * pan_speed;
    }

    // Zoom with scroll
    if !egui_wants_pointer && mouse_scroll.delta.y != 0.0 {
        let lines = match mouse_scroll.unit {
            MouseScrollUnit::Line => mouse_scroll.delta.y,
            MouseScrollUnit::Pixel => mouse_scroll.delta.y / 100.0,
        };
        let zoom_factor = (1.0 - lines * settings.zoom_speed).max(0.1);
        settings.target_distance =
            (settings.target_distance * zoom_factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    // Smooth interpolation for zoom and target
    let dt = time.delta_secs();
    let lerp_factor = 1.0 - (-settings.smooth_factor * 60.0 * dt).exp();
    settings.distance += (settings.target_distance - settings.distance) * lerp_factor;
    let focus = settings.target_focus;
    settings.target = settings.target.lerp(focus, lerp_factor);

    transform.translation = settings.target + settings.offset();
    transform.look_at(settings.target, settings.up);

    // Keep the orthographic view in step with zoom
    if let Projection::Orthographic(ortho) = &mut *projection {
        ortho.scaling_mode = ScalingMode::FixedVertical {
            viewport_height: settings.orthographic_height(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_round_trip() {
        let mut settings = CameraSettings::default();
        settings.snap_offset(Vec3::new(3.0, 4.0, 0.0));
        assert!((settings.offset() - Vec3::new(3.0, 4.0, 0.0)).length() < 1e-4);
        assert!((settings.distance - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_default_starts_at_reset_position() {
        let settings = CameraSettings::default();
        let expected = Vec3::from_array(RESET_POSITION);
        assert!((settings.offset() - expected).length() < 1e-3);
    }

    #[test]
    fn test_frame_top_preset() {
        let mut settings = CameraSettings::default();
        let bounds = Aabb::new([-1.0; 3], [1.0; 3]);
        let preset = vitrine_core::CameraView::Top;
        settings.frame(
            &bounds,
            Vec3::from_array(preset.look_direction()),
            Vec3::from_array(preset.up_direction()),
        );

        let dir = settings.offset().normalize();
        assert!((dir - Vec3::Y).length() < 1e-4);
        assert_eq!(settings.up, Vec3::Z);
        assert_eq!(settings.target, Vec3::ZERO);
    }

    #[test]
    fn test_turntable_keeps_distance() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<CameraSettings>()
            .init_resource::<TurntableTimer>()
            .insert_resource(ViewState {
                orthographic: false,
                turntable: true,
            })
            .add_systems(Update, turntable);

        let before = app.world().resource::<CameraSettings>().clone();
        for _ in 0..5 {
            app.update();
            std::thread::sleep(TURNTABLE_INTERVAL);
        }
        let after = app.world().resource::<CameraSettings>();
        assert_eq!(after.distance, before.distance);
        assert!((after.elevation - before.elevation).abs() < 1e-5);
    }
}
