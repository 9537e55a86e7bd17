//! Scene setup - camera, lights, grid, axis and background

use bevy::asset::RenderAssetUsages;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;

use crate::camera::{perspective, CameraSettings, MainCamera};
use crate::types::WorldSettings;

/// Minor grid lines on each side of the origin
const GRID_HALF_LINES: i32 = 50;
/// Every n-th grid line is a major line
const GRID_MAJOR_EVERY: i32 = 10;

/// Marker component for the main directional light
#[derive(Component)]
pub struct MainDirectionalLight;

/// Marker component for grid lines
#[derive(Component)]
pub struct GridLine;

/// Marker component for world axis visualization
#[derive(Component)]
pub struct WorldAxis;

/// Plugin for scene setup
pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<WorldSettings>()
            .insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (
                    update_world_visibility,
                    update_grid_spacing,
                    update_lighting,
                ),
            );
    }
}

/// Build a line-list mesh from endpoint pairs
pub fn line_list_mesh(points: Vec<[f32; 3]>) -> Mesh {
    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, points)
}

/// Minor and major grid line endpoints on the XZ ground plane
pub fn grid_lines(spacing: f32) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
    let extent = GRID_HALF_LINES as f32 * spacing;
    let mut minor = Vec::new();
    let mut major = Vec::new();

    for i in -GRID_HALF_LINES..=GRID_HALF_LINES {
        let offset = i as f32 * spacing;
        let target = if i % GRID_MAJOR_EVERY == 0 {
            &mut major
        } else {
            &mut minor
        };
        target.extend([[-extent, 0.0, offset], [extent, 0.0, offset]]);
        target.extend([[offset, 0.0, -extent], [offset, 0.0, extent]]);
    }
    (minor, major)
}

fn visibility(visible: bool) -> Visibility {
    if visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    camera_settings: Res<CameraSettings>,
    world_settings: Res<WorldSettings>,
) {
    let camera_position = camera_settings.target + camera_settings.offset();
    commands.spawn((
        Camera3d::default(),
        perspective(camera_settings.fov),
        Transform::from_translation(camera_position).looking_at(camera_settings.target, Vec3::Y),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 300.0,
        ..default()
    });

    commands.spawn((
        DirectionalLight {
            illuminance: world_settings.light_intensity,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(4.0, 8.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        MainDirectionalLight,
    ));

    // Fill light from the opposite side
    commands.spawn((
        PointLight {
            intensity: 200_000.0,
            range: 1000.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.9),
            ..default()
        },
        Transform::from_xyz(-6.0, 4.0, -6.0),
    ));

    spawn_grid(&mut commands, &mut meshes, &mut materials, &world_settings);

    // World axis: X red, Y green, Z blue
    let axis_length = 1.0;
    let axes = [
        (Vec3::X, Color::srgb(0.9, 0.2, 0.2)),
        (Vec3::Y, Color::srgb(0.2, 0.9, 0.2)),
        (Vec3::Z, Color::srgb(0.2, 0.4, 0.9)),
    ];
    for (direction, color) in axes {
        let material = materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            ..default()
        });
        let end = (direction * axis_length).to_array();
        commands.spawn((
            Mesh3d(meshes.add(line_list_mesh(vec![[0.0; 3], end]))),
            MeshMaterial3d(material),
            Transform::default(),
            WorldAxis,
            visibility(world_settings.show_axis),
        ));
    }
}

fn spawn_grid(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    world_settings: &WorldSettings,
) {
    let (minor, major) = grid_lines(world_settings.grid_spacing);
    let alpha = world_settings.grid_alpha;
    let layers = [
        (minor, Color::srgba(0.35, 0.35, 0.35, alpha)),
        (major, Color::srgba(0.6, 0.6, 0.6, alpha)),
    ];

    for (points, color) in layers {
        let material = materials.add(StandardMaterial {
            base_color: color,
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        commands.spawn((
            Mesh3d(meshes.add(line_list_mesh(points))),
            MeshMaterial3d(material),
            Transform::default(),
            GridLine,
            visibility(world_settings.show_grid),
        ));
    }
}

fn update_world_visibility(
    world_settings: Res<WorldSettings>,
    mut grid_query: Query<&mut Visibility, (With<GridLine>, Without<WorldAxis>)>,
    mut axis_query: Query<&mut Visibility, With<WorldAxis>>,
) {
    if !world_settings.is_changed() {
        return;
    }

    for mut v in grid_query.iter_mut() {
        *v = visibility(world_settings.show_grid);
    }
    for mut v in axis_query.iter_mut() {
        *v = visibility(world_settings.show_axis);
    }
}

/// Regenerate grid when spacing or opacity changes
fn update_grid_spacing(
    mut commands: Commands,
    mut world_settings: ResMut<WorldSettings>,
    grid_query: Query<Entity, With<GridLine>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !world_settings.is_changed() || !world_settings.needs_grid_regeneration() {
        return;
    }

    for entity in grid_query.iter() {
        commands.entity(entity).despawn();
    }
    spawn_grid(&mut commands, &mut meshes, &mut materials, &world_settings);
    world_settings.mark_grid_regenerated();
}

fn update_lighting(
    world_settings: Res<WorldSettings>,
    mut clear_color: ResMut<ClearColor>,
    mut lights: Query<&mut DirectionalLight, With<MainDirectionalLight>>,
) {
    if !world_settings.is_changed() {
        return;
    }

    let background = world_settings.background.color();
    if clear_color.0 != background {
        clear_color.0 = background;
    }
    for mut light in lights.iter_mut() {
        light.illuminance = world_settings.light_intensity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Background;

    #[test]
    fn test_grid_major_every_tenth_line() {
        let (minor, major) = grid_lines(0.5);
        // 101 lines per direction, two endpoints each, two directions
        assert_eq!(minor.len() + major.len(), 101 * 2 * 2);
        assert_eq!(major.len(), 11 * 2 * 2);
        assert!(major.iter().all(|p| p[1] == 0.0));
        assert_eq!(major[0], [-25.0, 0.0, -25.0]);
    }

    #[test]
    fn test_background_cycle() {
        let start = Background::default();
        assert_eq!(start, Background::Black);
        assert_eq!(start.next(), Background::White);
        assert_eq!(start.next().next(), Background::DarkGray);
        assert_eq!(start.next().next().next(), start);
    }

    #[test]
    fn test_grid_regeneration_tracking() {
        let mut settings = WorldSettings::default();
        assert!(!settings.needs_grid_regeneration());
        settings.grid_spacing = 2.0;
        assert!(settings.needs_grid_regeneration());
        settings.mark_grid_regenerated();
        assert!(!settings.needs_grid_regeneration());
    }
}
