//! Shared UI components for the model inspector

use bevy::prelude::*;
use bevy_egui::egui;
use vitrine_core::{ConvertedModel, MeshNode, TextureNode, Thumbnail};

/// Width of thumbnails drawn in the texture list
const THUMBNAIL_DRAW_WIDTH: f32 = 64.0;

/// GPU handles for texture thumbnails, one slot per texture node
#[derive(Default, Resource)]
pub struct ThumbnailCache {
    handles: Vec<Option<egui::TextureHandle>>,
}

impl ThumbnailCache {
    /// Drop all handles; call when a new model replaces the lists
    pub fn clear(&mut self) {
        self.handles.clear();
    }

    fn get_or_load(
        &mut self,
        ctx: &egui::Context,
        index: usize,
        name: &str,
        thumbnail: &Thumbnail,
    ) -> egui::TextureHandle {
        if self.handles.len() <= index {
            self.handles.resize(index + 1, None);
        }
        self.handles[index]
            .get_or_insert_with(|| {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [thumbnail.width as usize, thumbnail.height as usize],
                    &thumbnail.rgba,
                );
                ctx.load_texture(
                    format!("thumb-{}-{}", index, name),
                    image,
                    egui::TextureOptions::LINEAR,
                )
            })
            .clone()
    }
}

/// Mesh list; returns the index of a newly clicked row
pub fn render_mesh_list(
    ui: &mut egui::Ui,
    meshes: &[MeshNode],
    selected: Option<usize>,
) -> Option<usize> {
    let mut clicked = None;
    for (index, node) in meshes.iter().enumerate() {
        let is_selected = selected == Some(index);
        if ui.selectable_label(is_selected, &node.name).clicked() && !is_selected {
            clicked = Some(index);
        }
    }
    clicked
}

/// Texture list with thumbnails; returns the index of a newly clicked row
pub fn render_texture_list(
    ui: &mut egui::Ui,
    textures: &[TextureNode],
    selected: Option<usize>,
    cache: &mut ThumbnailCache,
) -> Option<usize> {
    let mut clicked = None;
    let ctx = ui.ctx().clone();

    for (index, node) in textures.iter().enumerate() {
        let is_selected = selected == Some(index);
        let response = ui
            .horizontal(|ui| {
                if let Some(thumbnail) = &node.thumbnail {
                    let handle = cache.get_or_load(&ctx, index, &node.name, thumbnail);
                    let aspect = thumbnail.height as f32 / thumbnail.width.max(1) as f32;
                    ui.add(egui::Image::new(&handle).fit_to_exact_size(egui::vec2(
                        THUMBNAIL_DRAW_WIDTH,
                        THUMBNAIL_DRAW_WIDTH * aspect,
                    )));
                }
                ui.vertical(|ui| {
                    let label = ui.selectable_label(is_selected, &node.name);
                    ui.label(
                        egui::RichText::new(&node.format)
                            .small()
                            .color(egui::Color32::GRAY),
                    );
                    label
                })
                .inner
            })
            .inner;

        if response.clicked() && !is_selected {
            clicked = Some(index);
        }
    }
    clicked
}

/// Polygon and vertex counters
pub fn render_stats(ui: &mut egui::Ui, model: &ConvertedModel) {
    ui.horizontal(|ui| {
        ui.label(model.poly_text());
        ui.separator();
        ui.label(model.vertex_text());
    });
}
