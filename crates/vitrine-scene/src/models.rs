//! Spawning converted models, material overrides, overlays and click selection

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use bevy_picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings};
use vitrine_core::{Aabb, RenderGroup, RenderMesh};

use crate::camera::MainCamera;
use crate::scene::line_list_mesh;
use crate::types::{
    CameraCommand, ModelMaterials, SelectedMesh, ShowModel, SpawnedModel, WorldSettings,
};

/// Pointer travel (in pixels) below which a press-release counts as a click
const CLICK_SLOP: f32 = 5.0;

/// Root entity of the displayed model
#[derive(Component)]
pub struct ModelRoot;

/// One rendered mesh, indexed like the inspector list
#[derive(Component)]
pub struct ModelMesh {
    pub index: usize,
}

/// Wireframe around the whole model
#[derive(Component)]
pub struct ModelBoundsBox;

/// Wireframe around the selected mesh
#[derive(Component)]
pub struct SelectionBox;

/// Plugin for model display
pub struct ModelsPlugin;

impl Plugin for ModelsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnedModel>()
            .init_resource::<SelectedMesh>()
            .init_resource::<ModelMaterials>()
            .add_message::<ShowModel>()
            .add_systems(
                Update,
                (
                    spawn_model,
                    apply_material_overrides,
                    update_bounding_box_visibility,
                    update_selection_box,
                    select_on_click,
                )
                    .chain(),
            );
    }
}

/// Build render geometry for one converted mesh
pub fn build_mesh(source: &RenderMesh) -> Mesh {
    let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, source.positions.clone())
        .with_inserted_indices(Indices::U32(source.indices.clone()));

    if let Some(uvs) = &source.uvs {
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs.clone());
    }
    if source.normals.len() == source.positions.len() && !source.normals.is_empty() {
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, source.normals.clone());
    } else {
        mesh.compute_normals();
    }
    mesh
}

fn color_from(rgba: [f32; 4]) -> Color {
    Color::srgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

pub(crate) fn spawn_model(
    mut commands: Commands,
    mut show: MessageReader<ShowModel>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut images: ResMut<Assets<Image>>,
    mut spawned: ResMut<SpawnedModel>,
    mut selected: ResMut<SelectedMesh>,
    mut overrides: ResMut<ModelMaterials>,
    world_settings: Res<WorldSettings>,
    bounds_query: Query<Entity, With<ModelBoundsBox>>,
    mut camera_commands: MessageWriter<CameraCommand>,
) {
    // Only the newest model matters when several arrive in one frame
    let Some(ShowModel(group)) = show.read().last() else {
        return;
    };

    if let Some(root) = spawned.root.take() {
        commands.entity(root).despawn();
    }
    for entity in bounds_query.iter() {
        commands.entity(entity).despawn();
    }

    let image_handles: Vec<Handle<Image>> = group
        .images
        .iter()
        .map(|rgba| {
            images.add(Image::from_dynamic(
                image::DynamicImage::ImageRgba8(rgba.clone()),
                true,
                RenderAssetUsages::default(),
            ))
        })
        .collect();

    let translation = Vec3::from_array(group.translation);
    let root = commands
        .spawn((
            ModelRoot,
            Transform::from_translation(translation),
            Visibility::default(),
        ))
        .id();

    let mut material_handles = Vec::with_capacity(group.meshes.len());
    for (index, source) in group.meshes.iter().enumerate() {
        let material = materials.add(StandardMaterial {
            base_color: color_from(source.material.base_color),
            base_color_texture: source
                .material
                .texture
                .and_then(|i| image_handles.get(i).cloned()),
            double_sided: true,
            cull_mode: None,
            perceptual_roughness: 0.8,
            ..default()
        });
        material_handles.push(material.clone());

        commands.spawn((
            Mesh3d(meshes.add(build_mesh(source))),
            MeshMaterial3d(material),
            Transform::default(),
            ModelMesh { index },
            Name::new(source.name.clone()),
            ChildOf(root),
        ));
    }

    spawn_bounds_box(
        &mut commands,
        &mut meshes,
        &mut materials,
        &group.bounds,
        world_settings.show_bounding_box,
    );

    *spawned = spawned_state(group, root, image_handles, material_handles);
    selected.0 = None;
    overrides.0.reset();
    camera_commands.write(CameraCommand::ZoomExtents);

    tracing::info!(meshes = group.meshes.len(), "Spawned model");
}

fn spawned_state(
    group: &RenderGroup,
    root: Entity,
    images: Vec<Handle<Image>>,
    materials: Vec<Handle<StandardMaterial>>,
) -> SpawnedModel {
    SpawnedModel {
        root: Some(root),
        bounds: group.bounds,
        translation: Vec3::from_array(group.translation),
        mesh_bounds: group.meshes.iter().map(|m| m.bounds).collect(),
        base_materials: group.meshes.iter().map(|m| m.material).collect(),
        images,
        materials,
    }
}

fn spawn_bounds_box(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    bounds: &Aabb,
    visible: bool,
) {
    let edges = bounds.wireframe_edges();
    if edges.is_empty() {
        return;
    }
    commands.spawn((
        Mesh3d(meshes.add(line_list_mesh(edges))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.2, 0.8, 1.0),
            unlit: true,
            ..default()
        })),
        Transform::default(),
        ModelBoundsBox,
        if visible {
            Visibility::Visible
        } else {
            Visibility::Hidden
        },
    ));
}

/// Push opacity and color overrides into the mesh materials
fn apply_material_overrides(
    overrides: Res<ModelMaterials>,
    spawned: Res<SpawnedModel>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !overrides.is_changed() {
        return;
    }

    for (index, (handle, base)) in spawned
        .materials
        .iter()
        .zip(&spawned.base_materials)
        .enumerate()
    {
        let Some(material) = materials.get_mut(handle) else {
            continue;
        };
        let effective = overrides.0.effective(index, base);
        material.base_color = color_from(effective.base_color);
        material.base_color_texture = effective
            .texture
            .and_then(|i| spawned.images.get(i).cloned());
        material.alpha_mode = if effective.blended {
            AlphaMode::Blend
        } else {
            AlphaMode::Opaque
        };
    }
}

fn update_bounding_box_visibility(
    world_settings: Res<WorldSettings>,
    mut query: Query<&mut Visibility, With<ModelBoundsBox>>,
) {
    if !world_settings.is_changed() {
        return;
    }
    for mut visibility in query.iter_mut() {
        *visibility = if world_settings.show_bounding_box {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

/// Rebuild the selection wireframe whenever the selection changes
fn update_selection_box(
    mut commands: Commands,
    selected: Res<SelectedMesh>,
    spawned: Res<SpawnedModel>,
    existing: Query<Entity, With<SelectionBox>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if !selected.is_changed() {
        return;
    }

    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let Some(bounds) = selected.0.and_then(|i| spawned.mesh_world_bounds(i)) else {
        return;
    };
    let edges = bounds.wireframe_edges();
    if edges.is_empty() {
        return;
    }

    commands.spawn((
        Mesh3d(meshes.add(line_list_mesh(edges))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.85, 0.1),
            unlit: true,
            ..default()
        })),
        Transform::default(),
        SelectionBox,
    ));
}

/// Select the mesh under the cursor on a left click (not a drag)
fn select_on_click(
    mut ray_cast: MeshRayCast,
    camera_query: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    model_meshes: Query<&ModelMesh>,
    mut selected: ResMut<SelectedMesh>,
    mut press_position: Local<Option<Vec2>>,
    mut contexts: EguiContexts,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let cursor = window.cursor_position();

    if mouse_button.just_pressed(MouseButton::Left) {
        let over_ui = contexts
            .ctx_mut()
            .map(|ctx| ctx.is_pointer_over_area())
            .unwrap_or(false);
        *press_position = if over_ui { None } else { cursor };
        return;
    }

    if !mouse_button.just_released(MouseButton::Left) {
        return;
    }
    let (Some(start), Some(end)) = (press_position.take(), cursor) else {
        return;
    };
    if start.distance(end) > CLICK_SLOP {
        return;
    }

    let Ok((camera, camera_transform)) = camera_query.single() else {
        return;
    };
    let Ok(ray) = camera.viewport_to_world(camera_transform, end) else {
        return;
    };

    let filter = |entity: Entity| model_meshes.contains(entity);
    let settings = MeshRayCastSettings::default().with_filter(&filter);
    let hit = ray_cast
        .cast_ray(ray, &settings)
        .first()
        .and_then(|(entity, _)| model_meshes.get(*entity).ok())
        .map(|m| m.index);

    if let Some(index) = hit {
        if selected.0 != Some(index) {
            selected.0 = Some(index);
            tracing::debug!(mesh = index, "Selected mesh from viewport");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::{MaterialOverrides, RenderMaterial};

    fn triangle() -> RenderMesh {
        RenderMesh {
            name: "tri".to_string(),
            positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            uvs: Some(vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0]]),
            indices: vec![0, 1, 2],
            material: RenderMaterial::flat_gray(),
            bounds: Aabb::new([0.0; 3], [1.0, 1.0, 0.0]),
        }
    }

    #[test]
    fn test_build_mesh_fills_missing_normals() {
        let mesh = build_mesh(&triangle());
        assert_eq!(mesh.count_vertices(), 3);
        assert!(mesh.attribute(Mesh::ATTRIBUTE_NORMAL).is_some());
        assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
        assert_eq!(mesh.indices().map(|i| i.len()), Some(3));
    }

    #[test]
    fn test_spawned_state_tracks_group() {
        let group = RenderGroup {
            meshes: vec![triangle()],
            images: Vec::new(),
            translation: [1.0, 2.0, 3.0],
            bounds: Aabb::new([-1.0; 3], [1.0; 3]),
        };
        let state = spawned_state(&group, Entity::PLACEHOLDER, Vec::new(), Vec::new());

        assert_eq!(state.base_materials, vec![RenderMaterial::flat_gray()]);
        let world = state.mesh_world_bounds(0).unwrap();
        assert_eq!(world.min, [1.0, 2.0, 3.0]);
        assert!(state.mesh_world_bounds(1).is_none());
    }

    fn display_app() -> App {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<Assets<Image>>()
            .init_resource::<SpawnedModel>()
            .init_resource::<SelectedMesh>()
            .init_resource::<ModelMaterials>()
            .init_resource::<WorldSettings>()
            .add_message::<ShowModel>()
            .add_message::<CameraCommand>()
            .add_systems(Update, (spawn_model, apply_material_overrides).chain());
        app
    }

    fn show(app: &mut App) {
        let group = RenderGroup {
            meshes: vec![triangle(), triangle()],
            images: Vec::new(),
            translation: [0.0; 3],
            bounds: Aabb::new([0.0; 3], [1.0, 1.0, 0.0]),
        };
        app.world_mut().write_message(ShowModel(group));
        app.update();
    }

    fn first_material(app: &App) -> StandardMaterial {
        let handle = app.world().resource::<SpawnedModel>().materials[0].clone();
        app.world()
            .resource::<Assets<StandardMaterial>>()
            .get(&handle)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_import_resets_overrides_and_selection() {
        let mut app = display_app();
        show(&mut app);
        let first_root = app.world().resource::<SpawnedModel>().root.unwrap();

        {
            let mut overrides = app.world_mut().resource_mut::<ModelMaterials>();
            overrides.0.paint(0);
            overrides.0.set_opacity(0.3);
        }
        app.world_mut().resource_mut::<SelectedMesh>().0 = Some(0);
        app.update();
        assert!(matches!(first_material(&app).alpha_mode, AlphaMode::Blend));

        show(&mut app);

        assert_eq!(
            app.world().resource::<ModelMaterials>().0,
            MaterialOverrides::default()
        );
        assert_eq!(*app.world().resource::<SelectedMesh>(), SelectedMesh(None));
        assert!(app.world().get_entity(first_root).is_err());

        let material = first_material(&app);
        assert!(matches!(material.alpha_mode, AlphaMode::Opaque));
        assert_eq!(material.base_color, color_from(RenderMaterial::flat_gray().base_color));
    }
}
