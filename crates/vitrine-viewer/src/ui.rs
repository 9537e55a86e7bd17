//! egui menus, panels and dialogs

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass, EguiTextureHandle};
use vitrine_core::{CameraView, Language, Unit};
use vitrine_scene::ui::{render_mesh_list, render_stats, render_texture_list, ThumbnailCache};
use vitrine_scene::preview::PREVIEW_SIZE;
use vitrine_scene::{
    CameraCommand, MeshPreview, ModelMaterials, SelectedMesh, ViewState, WorldSettings,
};

use crate::actions;
use crate::app::{LoadedModel, Notice, OpenModel, Session, Strings, UiState};
use crate::file_picker;

const PANEL_WIDTH: f32 = 260.0;

/// Bundled system parameters for the UI system
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub commands: Commands<'w, 's>,
    pub strings: Res<'w, Strings>,
    pub session: ResMut<'w, Session>,
    pub loaded: Res<'w, LoadedModel>,
    pub notice: ResMut<'w, Notice>,
    pub ui_state: ResMut<'w, UiState>,
    pub world_settings: ResMut<'w, WorldSettings>,
    pub selected: ResMut<'w, SelectedMesh>,
    pub materials: ResMut<'w, ModelMaterials>,
    pub view_state: Res<'w, ViewState>,
    pub thumbnails: ResMut<'w, ThumbnailCache>,
    pub preview: Res<'w, MeshPreview>,
    pub diagnostics: Res<'w, DiagnosticsStore>,
    pub camera_commands: MessageWriter<'w, CameraCommand>,
    pub open: MessageWriter<'w, OpenModel>,
    pub exit: MessageWriter<'w, AppExit>,
}

/// Plugin for the viewer UI
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, ui_system);
    }
}

fn ui_system(mut params: UiParams, mut applied_theme: Local<Option<bool>>) {
    // Get the egui context - early return if not available
    let Ok(ctx) = params.contexts.ctx_mut() else { return };
    let ctx = ctx.clone();

    let dark = params.ui_state.dark_theme;
    if *applied_theme != Some(dark) {
        ctx.set_visuals(if dark {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });
        *applied_theme = Some(dark);
    }

    egui::TopBottomPanel::top("menu_bar").show(&ctx, |ui| {
        egui::MenuBar::new().ui(ui, |ui| menu_bar(ui, &mut params));
    });

    egui::SidePanel::left("inspector_panel")
        .default_width(PANEL_WIDTH)
        .resizable(true)
        .show(&ctx, |ui| inspector_panel(ui, &mut params));

    egui::SidePanel::right("display_panel")
        .default_width(PANEL_WIDTH)
        .resizable(true)
        .show(&ctx, |ui| display_panel(ui, &mut params));

    // Viewport overlays go into whatever space the panels left
    let viewport = ctx.available_rect();
    if params.loaded.0.is_none() {
        egui::Area::new(egui::Id::new("drop_hint"))
            .pivot(egui::Align2::CENTER_CENTER)
            .fixed_pos(viewport.center())
            .interactable(false)
            .show(&ctx, |ui| {
                ui.label(
                    egui::RichText::new(params.strings.get("Lbl_DropHint"))
                        .size(18.0)
                        .color(egui::Color32::GRAY),
                );
            });
    }
    if params.session.settings.show_fps {
        let fps = params
            .diagnostics
            .get(&FrameTimeDiagnosticsPlugin::FPS)
            .and_then(|d| d.smoothed());
        egui::Area::new(egui::Id::new("fps_overlay"))
            .fixed_pos(viewport.left_top() + egui::vec2(8.0, 8.0))
            .interactable(false)
            .show(&ctx, |ui| {
                let text = match fps {
                    Some(fps) => format!("FPS: {:.0}", fps),
                    None => "FPS: -".to_string(),
                };
                ui.label(egui::RichText::new(text).monospace().color(egui::Color32::YELLOW));
            });
    }

    settings_window(&ctx, &mut params);
    model_info_window(&ctx, &mut params);
    about_window(&ctx, &mut params);
    message_window(&ctx, &mut params);
}

fn menu_bar(ui: &mut egui::Ui, params: &mut UiParams) {
    let strings = &*params.strings;
    let model = params.loaded.0.as_ref();

    ui.menu_button(strings.get("Menu_File"), |ui| {
        if ui.button(strings.get("Menu_Open")).clicked() {
            ui.close();
            if let Some(path) = file_picker::pick_model() {
                params.open.write(OpenModel(path));
            }
        }

        let recent = params.session.recent.entries().to_vec();
        ui.add_enabled_ui(!recent.is_empty(), |ui| {
            ui.menu_button(strings.get("Menu_Recent"), |ui| {
                for path in recent {
                    if ui.button(path.display().to_string()).clicked() {
                        ui.close();
                        params.open.write(OpenModel(path));
                    }
                }
            });
        });

        ui.separator();
        if ui.button(strings.get("Menu_Export")).clicked() {
            ui.close();
            actions::export_model_dialog(model, strings, &mut params.notice);
        }
        if ui.button(strings.get("Menu_ExportTextures")).clicked() {
            ui.close();
            actions::export_textures_dialog(model, strings, &mut params.notice);
        }
        if ui.button(strings.get("Menu_Screenshot")).clicked() {
            ui.close();
            actions::screenshot_dialog(&mut params.commands);
        }
        ui.separator();
        if ui.button(strings.get("Menu_Exit")).clicked() {
            params.exit.write(AppExit::Success);
        }
    });

    ui.menu_button(strings.get("Menu_View"), |ui| {
        for preset in CameraView::ALL {
            if ui.button(strings.get(preset.label_key())).clicked() {
                ui.close();
                params.camera_commands.write(CameraCommand::Preset(preset));
            }
        }
        ui.separator();
        if ui.button(strings.get("Btn_CenterModel")).clicked() {
            ui.close();
            params.camera_commands.write(CameraCommand::ZoomExtents);
        }
        if ui.button(strings.get("Btn_ResetView")).clicked() {
            ui.close();
            params.camera_commands.write(CameraCommand::Reset);
        }
    });

    ui.menu_button(strings.get("Menu_Tools"), |ui| {
        if ui.button(strings.get("Menu_Settings")).clicked() {
            ui.close();
            params.ui_state.settings_draft = params.session.settings.clone();
            params.ui_state.show_settings = true;
        }
        if ui.button(strings.get("Menu_ModelInfo")).clicked() {
            ui.close();
            if model.is_some() {
                params.ui_state.show_model_info = true;
            } else {
                params.notice.info(strings.get("Msg_NoModel"));
            }
        }
    });

    ui.menu_button(strings.get("Menu_Help"), |ui| {
        if ui.button(strings.get("Menu_About")).clicked() {
            ui.close();
            params.ui_state.show_about = true;
        }
    });
}

fn inspector_panel(ui: &mut egui::Ui, params: &mut UiParams) {
    let strings = &*params.strings;
    let model = params.loaded.0.as_ref();

    ui.heading(strings.get("Lbl_Model"));
    let Some(model) = model else {
        ui.label(egui::RichText::new(strings.get("Lbl_NoModel")).color(egui::Color32::GRAY));
        return;
    };

    ui.label(egui::RichText::new(&model.report.file_name).strong());
    render_stats(ui, &model.converted);
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::CollapsingHeader::new(format!(
            "{} ({})",
            strings.get("Lbl_Meshes"),
            model.converted.mesh_nodes.len()
        ))
        .default_open(true)
        .show(ui, |ui| {
            if let Some(index) = render_mesh_list(ui, &model.converted.mesh_nodes, params.selected.0)
            {
                params.selected.0 = Some(index);
            }
            ui.horizontal(|ui| {
                if ui.button(strings.get("Btn_SavePart")).clicked() {
                    actions::save_part_dialog(
                        Some(model),
                        params.selected.0,
                        strings,
                        &mut params.notice,
                    );
                }
                if ui.button(strings.get("Btn_ChangeColor")).clicked() {
                    match params.selected.0 {
                        Some(index) => params.materials.0.paint(index),
                        None => params.notice.info(strings.get("Msg_NoSelection")),
                    }
                }
            });

            if params.selected.0.is_some() && params.preview.shown == params.selected.0 {
                let texture = params
                    .contexts
                    .add_image(EguiTextureHandle::Strong(params.preview.image.clone()));
                let side = (ui.available_width().min(PREVIEW_SIZE as f32)).max(32.0);
                ui.add_space(4.0);
                ui.image(egui::load::SizedTexture::new(texture, egui::vec2(side, side)));
            }
        });

        egui::CollapsingHeader::new(format!(
            "{} ({})",
            strings.get("Lbl_Textures"),
            model.converted.texture_nodes.len()
        ))
        .default_open(true)
        .show(ui, |ui| {
            if model.converted.texture_nodes.is_empty() {
                ui.label(egui::RichText::new(strings.get("Msg_NoTexture")).small());
                return;
            }
            if let Some(index) = render_texture_list(
                ui,
                &model.converted.texture_nodes,
                params.ui_state.selected_texture,
                &mut params.thumbnails,
            ) {
                params.ui_state.selected_texture = Some(index);
            }
            if ui.button(strings.get("Btn_SaveTexture")).clicked() {
                actions::save_texture_dialog(
                    Some(model),
                    params.ui_state.selected_texture,
                    strings,
                    &mut params.notice,
                );
            }
        });
    });
}

fn display_panel(ui: &mut egui::Ui, params: &mut UiParams) {
    let strings = &*params.strings;
    ui.heading(strings.get("Lbl_Display"));
    ui.separator();

    egui::ScrollArea::vertical().show(ui, |ui| {
        let mut opacity = params.materials.0.opacity();
        if ui
            .add(egui::Slider::new(&mut opacity, 0.0..=1.0).text(strings.get("Lbl_Opacity")))
            .changed()
        {
            params.materials.0.set_opacity(opacity);
        }
        ui.add(
            egui::Slider::new(&mut params.world_settings.light_intensity, 0.0..=20_000.0)
                .text(strings.get("Lbl_Light")),
        );

        ui.separator();
        ui.checkbox(&mut params.world_settings.show_grid, strings.get("Lbl_Grid"));
        ui.add(
            egui::Slider::new(&mut params.world_settings.grid_spacing, 0.1..=10.0)
                .logarithmic(true)
                .text(strings.get("Lbl_GridSpacing")),
        );
        ui.add(
            egui::Slider::new(&mut params.world_settings.grid_alpha, 0.0..=1.0)
                .text(strings.get("Lbl_GridOpacity")),
        );
        ui.checkbox(&mut params.world_settings.show_axis, strings.get("Lbl_Axis"));
        ui.checkbox(
            &mut params.world_settings.show_bounding_box,
            strings.get("Lbl_BoundingBox"),
        );

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if ui.button(strings.get("Btn_Background")).clicked() {
                params.world_settings.background = params.world_settings.background.next();
            }
            if ui.button(strings.get("Btn_Theme")).clicked() {
                params.ui_state.dark_theme = !params.ui_state.dark_theme;
            }
        });

        ui.separator();
        let projection_label = if params.view_state.orthographic {
            strings.get("Btn_Perspective")
        } else {
            strings.get("Btn_Ortho")
        };
        ui.horizontal_wrapped(|ui| {
            if ui.button(projection_label).clicked() {
                params.camera_commands.write(CameraCommand::ToggleProjection);
            }
            if ui
                .selectable_label(params.view_state.turntable, strings.get("Btn_Turntable"))
                .clicked()
            {
                params.camera_commands.write(CameraCommand::ToggleTurntable);
            }
        });

        egui::Grid::new("view_presets")
            .num_columns(3)
            .spacing([4.0, 4.0])
            .show(ui, |ui| {
                for (i, preset) in CameraView::ALL.into_iter().enumerate() {
                    if ui.button(strings.get(preset.label_key())).clicked() {
                        params.camera_commands.write(CameraCommand::Preset(preset));
                    }
                    if i % 3 == 2 {
                        ui.end_row();
                    }
                }
            });

        ui.horizontal_wrapped(|ui| {
            if ui.button(strings.get("Btn_CenterModel")).clicked() {
                params.camera_commands.write(CameraCommand::ZoomExtents);
            }
            if ui.button(strings.get("Btn_ResetView")).clicked() {
                params.camera_commands.write(CameraCommand::Reset);
            }
        });
    });
}

fn settings_window(ctx: &egui::Context, params: &mut UiParams) {
    if !params.ui_state.show_settings {
        return;
    }
    let strings = &*params.strings;
    let mut open = true;
    let mut save = false;
    let mut close = false;
    let mut picked = None;

    egui::Window::new(strings.get("Title_Settings"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            let draft = &mut params.ui_state.settings_draft;
            let current = Language::from_code(&draft.language).unwrap_or_default();

            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([10.0, 6.0])
                .show(ui, |ui| {
                    ui.label(strings.get("Lbl_Language"));
                    egui::ComboBox::from_id_salt("language")
                        .selected_text(current.native_name())
                        .show_ui(ui, |ui| {
                            for language in Language::ALL {
                                if ui
                                    .selectable_label(language == current, language.native_name())
                                    .clicked()
                                {
                                    picked = Some(language);
                                }
                            }
                        });
                    ui.end_row();

                    ui.label(strings.get("Lbl_ShowFps"));
                    ui.checkbox(&mut draft.show_fps, "");
                    ui.end_row();

                    ui.label(strings.get("Lbl_Sensitivity"));
                    ui.add(egui::Slider::new(&mut draft.camera_sensitivity, 0.1..=5.0));
                    ui.end_row();
                });

            ui.separator();
            ui.horizontal(|ui| {
                save = ui.button(strings.get("Btn_Save")).clicked();
                close = ui.button(strings.get("Btn_Close")).clicked();
            });
        });

    if let Some(language) = picked {
        actions::switch_language(
            &mut params.session,
            &mut params.ui_state.settings_draft,
            language,
        );
    }
    if save {
        let draft = params.ui_state.settings_draft.clone();
        actions::save_settings(&mut params.session, draft, strings, &mut params.notice);
        close = true;
    }
    if !open || close {
        params.ui_state.show_settings = false;
    }
}

fn model_info_window(ctx: &egui::Context, params: &mut UiParams) {
    if !params.ui_state.show_model_info {
        return;
    }
    let strings = &*params.strings;
    let Some(model) = params.loaded.0.as_ref() else {
        params.ui_state.show_model_info = false;
        return;
    };
    let report = &model.report;
    let mut open = true;
    let mut close = false;

    egui::Window::new(strings.get("Title_ModelInfo"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("model_info_grid")
                .num_columns(2)
                .spacing([10.0, 4.0])
                .show(ui, |ui| {
                    ui.label(strings.get("Lbl_Model"));
                    ui.label(&report.file_name);
                    ui.end_row();

                    ui.label(strings.get("Lbl_MeshCount"));
                    ui.label(report.mesh_count.to_string());
                    ui.end_row();

                    ui.label(strings.get("Lbl_MaterialCount"));
                    ui.label(report.material_count.to_string());
                    ui.end_row();

                    ui.label(strings.get("Lbl_TextureCount"));
                    ui.label(report.texture_count.to_string());
                    ui.end_row();

                    ui.label(strings.get("Lbl_Units"));
                    let unit = &mut params.ui_state.unit;
                    egui::ComboBox::from_id_salt("units")
                        .selected_text(unit.label())
                        .show_ui(ui, |ui| {
                            for choice in Unit::ALL {
                                ui.selectable_value(unit, choice, choice.label());
                            }
                        });
                    ui.end_row();
                });

            render_stats(ui, &model.converted);
            ui.separator();

            let unit = params.ui_state.unit;
            ui.label(egui::RichText::new(strings.get("Lbl_Dimensions")).strong());
            for line in report.dimension_lines(unit) {
                ui.label(line);
            }
            ui.label(egui::RichText::new(strings.get("Lbl_Volume")).strong());
            ui.label(report.volume_text(unit));

            ui.separator();
            ui.horizontal(|ui| {
                if ui.button(strings.get("Btn_SaveReport")).clicked() {
                    actions::save_report_dialog(Some(model), unit, strings, &mut params.notice);
                }
                close = ui.button(strings.get("Btn_Close")).clicked();
            });
        });

    if !open || close {
        params.ui_state.show_model_info = false;
    }
}

fn about_window(ctx: &egui::Context, params: &mut UiParams) {
    if !params.ui_state.show_about {
        return;
    }
    let strings = &*params.strings;
    let mut open = true;
    let mut close = false;

    egui::Window::new(strings.get("Title_About"))
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.heading(strings.get("App_Title"));
            ui.label(format!("v{}", env!("CARGO_PKG_VERSION")));
            ui.add_space(6.0);
            ui.label(strings.get("About_Text"));
            ui.label(egui::RichText::new(strings.get("About_License")).small());
            ui.add_space(6.0);
            close = ui.button(strings.get("Btn_Ok")).clicked();
        });

    if !open || close {
        params.ui_state.show_about = false;
    }
}

fn message_window(ctx: &egui::Context, params: &mut UiParams) {
    let Some(text) = params.notice.0.clone() else {
        return;
    };
    let strings = &*params.strings;
    let mut dismissed = false;

    egui::Window::new(strings.get("Title_Message"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(text);
            ui.add_space(6.0);
            dismissed = ui.button(strings.get("Btn_Ok")).clicked();
        });

    if dismissed {
        params.notice.0 = None;
    }
}
