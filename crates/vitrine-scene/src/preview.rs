//! Offscreen preview of the selected mesh for the inspector
//!
//! The selected mesh is mirrored onto its own render layer and framed by a
//! second camera that draws into an image. The mirror shares the mesh and
//! material handles, so color and opacity overrides show up in both views.

use bevy::camera::visibility::RenderLayers;
use bevy::camera::ClearColorConfig;
use bevy::prelude::*;
use bevy::render::render_resource::TextureFormat;
use vitrine_core::view::{self, RESET_POSITION};
use vitrine_core::Aabb;

use crate::camera::perspective;
use crate::models::{spawn_model, ModelMesh};
use crate::types::{SelectedMesh, SpawnedModel};

/// Render layer seen only by the preview camera
pub const PREVIEW_LAYER: usize = 1;

/// Edge length of the square preview image, in pixels
pub const PREVIEW_SIZE: u32 = 256;

const PREVIEW_FOV: f32 = std::f32::consts::FRAC_PI_4;

/// Image the preview camera renders into
#[derive(Debug, Default, Resource)]
pub struct MeshPreview {
    pub image: Handle<Image>,
    /// Mesh index currently mirrored into the preview
    pub shown: Option<usize>,
}

/// Marker for the camera drawing the preview
#[derive(Component)]
pub struct PreviewCamera;

/// Marker for the mirrored mesh
#[derive(Component)]
pub struct PreviewMesh;

/// Plugin for the selected-mesh preview
pub struct PreviewPlugin;

impl Plugin for PreviewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MeshPreview>()
            .add_systems(Startup, create_preview_target)
            .add_systems(Update, update_preview.after(spawn_model));
    }
}

/// Camera placement framing `bounds` from the default viewing direction
pub fn preview_transform(bounds: &Aabb) -> Transform {
    let look = -Vec3::from_array(RESET_POSITION);
    let center = Vec3::from_array(bounds.center());
    let position = Vec3::from_array(view::frame_position(bounds, look.to_array(), PREVIEW_FOV));
    Transform::from_translation(position).looking_at(center, Vec3::Y)
}

fn create_preview_target(mut images: ResMut<Assets<Image>>, mut preview: ResMut<MeshPreview>) {
    preview.image = images.add(Image::new_target_texture(
        PREVIEW_SIZE,
        PREVIEW_SIZE,
        TextureFormat::Bgra8UnormSrgb,
    ));
}

// Spawned on first use, after the egui context has settled on the main camera
fn spawn_preview_camera(commands: &mut Commands, image: Handle<Image>, transform: Transform) {
    commands
        .spawn((
            Camera3d::default(),
            Camera {
                order: -1,
                target: image.into(),
                clear_color: ClearColorConfig::Custom(Color::srgb(0.16, 0.16, 0.18)),
                ..default()
            },
            perspective(PREVIEW_FOV),
            transform,
            RenderLayers::layer(PREVIEW_LAYER),
            PreviewCamera,
        ))
        .with_children(|camera| {
            // Headlight
            camera.spawn((
                DirectionalLight {
                    illuminance: 6000.0,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::default(),
                RenderLayers::layer(PREVIEW_LAYER),
            ));
        });
}

pub(crate) fn update_preview(
    mut commands: Commands,
    selected: Res<SelectedMesh>,
    spawned: Res<SpawnedModel>,
    mut preview: ResMut<MeshPreview>,
    model_meshes: Query<(&ModelMesh, &Mesh3d, &MeshMaterial3d<StandardMaterial>)>,
    mirrored: Query<Entity, With<PreviewMesh>>,
    mut cameras: Query<(&mut Camera, &mut Transform), With<PreviewCamera>>,
) {
    if !selected.is_changed() && !spawned.is_changed() {
        return;
    }

    for entity in mirrored.iter() {
        commands.entity(entity).despawn();
    }
    preview.shown = None;

    let source = selected.0.and_then(|index| {
        let bounds = spawned.mesh_bounds.get(index)?;
        let (_, mesh, material) = model_meshes.iter().find(|(m, ..)| m.index == index)?;
        Some((index, bounds, mesh.0.clone(), material.0.clone()))
    });
    let Some((index, bounds, mesh, material)) = source else {
        for (mut camera, _) in cameras.iter_mut() {
            camera.is_active = false;
        }
        return;
    };

    commands.spawn((
        Mesh3d(mesh),
        MeshMaterial3d(material),
        Transform::default(),
        RenderLayers::layer(PREVIEW_LAYER),
        PreviewMesh,
    ));

    let framing = preview_transform(bounds);
    match cameras.single_mut() {
        Ok((mut camera, mut transform)) => {
            camera.is_active = true;
            *transform = framing;
        }
        Err(_) => spawn_preview_camera(&mut commands, preview.image.clone(), framing),
    }
    preview.shown = Some(index);
    tracing::debug!(mesh = index, "Updated mesh preview");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview_app() -> App {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<SelectedMesh>()
            .init_resource::<MeshPreview>()
            .insert_resource(SpawnedModel {
                mesh_bounds: vec![
                    Aabb::new([0.0; 3], [1.0; 3]),
                    Aabb::new([4.0, 0.0, 0.0], [6.0, 2.0, 2.0]),
                ],
                ..default()
            })
            .add_systems(Update, update_preview);

        for index in 0..2 {
            let mesh = app
                .world_mut()
                .resource_mut::<Assets<Mesh>>()
                .add(Cuboid::default());
            let material = app
                .world_mut()
                .resource_mut::<Assets<StandardMaterial>>()
                .add(StandardMaterial::default());
            app.world_mut()
                .spawn((Mesh3d(mesh), MeshMaterial3d(material), ModelMesh { index }));
        }
        app
    }

    fn mirrored(app: &mut App) -> Vec<(Handle<Mesh>, RenderLayers)> {
        app.world_mut()
            .query_filtered::<(&Mesh3d, &RenderLayers), With<PreviewMesh>>()
            .iter(app.world())
            .map(|(mesh, layers)| (mesh.0.clone(), layers.clone()))
            .collect()
    }

    #[test]
    fn test_preview_transform_looks_at_center() {
        let bounds = Aabb::new([4.0, 0.0, 0.0], [6.0, 2.0, 2.0]);
        let transform = preview_transform(&bounds);
        let center = Vec3::new(5.0, 1.0, 1.0);

        let to_center = (center - transform.translation).normalize();
        assert!(transform.forward().dot(to_center) > 0.999);
        // Same side as the main camera's reset view
        let from_center = (transform.translation - center).normalize();
        assert!(from_center.dot(Vec3::from_array(RESET_POSITION).normalize()) > 0.999);
    }

    #[test]
    fn test_selection_mirrors_mesh_on_preview_layer() {
        let mut app = preview_app();
        app.update();
        assert!(mirrored(&mut app).is_empty());
        assert_eq!(app.world().resource::<MeshPreview>().shown, None);

        app.world_mut().resource_mut::<SelectedMesh>().0 = Some(1);
        app.update();

        let source = app
            .world_mut()
            .query::<(&ModelMesh, &Mesh3d)>()
            .iter(app.world())
            .find(|(m, _)| m.index == 1)
            .map(|(_, mesh)| mesh.0.clone())
            .unwrap();
        let shown = mirrored(&mut app);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].0, source);
        assert_eq!(shown[0].1, RenderLayers::layer(PREVIEW_LAYER));
        assert_eq!(app.world().resource::<MeshPreview>().shown, Some(1));

        let cameras: Vec<Transform> = app
            .world_mut()
            .query_filtered::<&Transform, With<PreviewCamera>>()
            .iter(app.world())
            .copied()
            .collect();
        assert_eq!(cameras, vec![preview_transform(&Aabb::new([4.0, 0.0, 0.0], [6.0, 2.0, 2.0]))]);
    }

    #[test]
    fn test_clearing_selection_empties_preview() {
        let mut app = preview_app();
        app.world_mut().resource_mut::<SelectedMesh>().0 = Some(0);
        app.update();
        app.world_mut().resource_mut::<SelectedMesh>().0 = None;
        app.update();

        assert!(mirrored(&mut app).is_empty());
        assert_eq!(app.world().resource::<MeshPreview>().shown, None);
        let active: Vec<bool> = app
            .world_mut()
            .query_filtered::<&Camera, With<PreviewCamera>>()
            .iter(app.world())
            .map(|camera| camera.is_active)
            .collect();
        assert_eq!(active, vec![false]);
    }

    #[test]
    fn test_out_of_range_selection_shows_nothing() {
        let mut app = preview_app();
        app.world_mut().resource_mut::<SelectedMesh>().0 = Some(9);
        app.update();

        assert!(mirrored(&mut app).is_empty());
        assert_eq!(app.world().resource::<MeshPreview>().shown, None);
    }
}
