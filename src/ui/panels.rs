use egui::{Color32, Context, RichText, ScrollArea, Ui};
use glam::Vec2;

use crate::geometry::TORUS_PRESETS;
use crate::geometry::torus::MIN_SEGMENTS;
use crate::ui::state::{MAX_SEGMENTS, UiState, ViewerStats};
use crate::ui::theme::*;

#[derive(Default)]
pub struct UiActions {
    pub regenerate: bool,
    pub reset_rotation: bool,
}

pub fn draw_side_panel(
    ctx: &Context,
    state: &mut UiState,
    stats: &ViewerStats,
    last_error: &Option<String>,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(280.0)
        .max_width(380.0)
        .default_width(300.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("Torus 3D").strong());
                ui.add_space(4.0);
                ui.label(RichText::new("Parametric torus with averaged vertex normals").color(TEXT_MUTED).size(11.0));
                ui.add_space(16.0);

                section_header(ui, "PRESET");
                let preset_name = state
                    .selected_preset
                    .and_then(|i| TORUS_PRESETS.get(i))
                    .map_or("Custom", |p| p.name);
                let mut picked = None;
                egui::ComboBox::from_id_salt("torus_presets")
                    .selected_text(preset_name)
                    .width(ui.available_width())
                    .show_ui(ui, |ui| {
                        for (i, preset) in TORUS_PRESETS.iter().enumerate() {
                            if ui.selectable_label(state.selected_preset == Some(i), preset.name).clicked() {
                                picked = Some(i);
                            }
                        }
                    });
                if let Some(i) = picked {
                    if state.apply_preset(i) && state.auto_regenerate {
                        actions.regenerate = true;
                    }
                }
                if let Some(preset) = state.selected_preset.and_then(|i| TORUS_PRESETS.get(i)) {
                    ui.add_space(4.0);
                    ui.label(RichText::new(preset.description).color(TEXT_MUTED).size(11.0).italics());
                }
                ui.add_space(16.0);

                section_header(ui, "GEOMETRY");
                if geometry_controls(ui, state) {
                    state.params_edited();
                    if state.auto_regenerate {
                        actions.regenerate = true;
                    }
                }
                ui.add_space(8.0);
                ui.checkbox(&mut state.auto_regenerate, "Regenerate on change");

                let (btn_text, btn_color, text_color) = if state.mesh_needs_regenerate {
                    ("Regenerate", ACCENT_CYAN, BG_BLACK)
                } else {
                    ("Up to date", BG_WIDGET, ACCENT_CYAN)
                };
                if ui.add(egui::Button::new(RichText::new(btn_text).color(text_color))
                    .fill(btn_color).min_size(egui::vec2(ui.available_width(), 30.0))).clicked()
                {
                    actions.regenerate = true;
                }
                error_box(ui, last_error);
                ui.add_space(16.0);

                ui.separator();
                ui.add_space(12.0);

                section_header(ui, "VIEW");
                ui.horizontal(|ui| {
                    ui.label("Opacity:");
                    ui.add(egui::Slider::new(&mut state.opacity, 0.05..=1.0));
                });
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.vsync_enabled, "VSync");
                    ui.checkbox(&mut state.show_stats, "Stats");
                });
                if ui.button("Reset rotation").clicked() {
                    actions.reset_rotation = true;
                }
                ui.add_space(16.0);

                if state.show_stats {
                    stats_panel(ui, stats);
                }
            });
        });

    actions
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn geometry_controls(ui: &mut Ui, state: &mut UiState) -> bool {
    let params = &mut state.params;
    let mut changed = false;

    egui::Grid::new("geometry").num_columns(2).spacing([8.0, 6.0]).show(ui, |ui| {
        ui.label("Major R");
        changed |= ui.add(egui::Slider::new(&mut params.major_radius, 0.1..=3.0).step_by(0.01)).changed();
        ui.end_row();

        ui.label("Minor r");
        changed |= ui.add(egui::Slider::new(&mut params.minor_radius, 0.01..=2.0).step_by(0.01)).changed();
        ui.end_row();

        ui.label("Major M");
        changed |= ui.add(egui::Slider::new(&mut params.major_segments, MIN_SEGMENTS..=MAX_SEGMENTS)).changed();
        ui.end_row();

        ui.label("Minor N");
        changed |= ui.add(egui::Slider::new(&mut params.minor_segments, MIN_SEGMENTS..=MAX_SEGMENTS)).changed();
        ui.end_row();
    });

    if params.minor_radius >= params.major_radius {
        ui.label(RichText::new("r >= R: self-intersecting surface").color(ACCENT_ORANGE).size(11.0));
    }

    changed
}

fn error_box(ui: &mut Ui, error: &Option<String>) {
    let Some(err) = error else { return };

    ui.add_space(6.0);
    egui::Frame::default()
        .fill(Color32::from_rgb(40, 15, 15))
        .stroke(egui::Stroke::new(1.0, ACCENT_RED))
        .rounding(4.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(err).color(ACCENT_RED).size(11.0));
        });
}

fn stats_panel(ui: &mut Ui, stats: &ViewerStats) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if stats.fps >= 60.0 { ACCENT_GREEN } else if stats.fps >= 30.0 { ACCENT_ORANGE } else { ACCENT_RED };

            egui::Grid::new("stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                ui.label(RichText::new("FPS").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.0}", stats.fps)).color(fps_color));
                ui.end_row();

                ui.label(RichText::new("Vertices").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.vertices)).color(TEXT_PRIMARY));
                ui.end_row();

                ui.label(RichText::new("Triangles").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.triangles)).color(TEXT_PRIMARY));
                ui.end_row();

                ui.label(RichText::new("Build ms").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.2}", stats.generation_time.as_secs_f64() * 1000.0)).color(TEXT_PRIMARY));
                ui.end_row();

                ui.label(RichText::new("Rotation").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.2}, {:.2}", stats.rotation.x, stats.rotation.y)).color(ACCENT_CYAN));
                ui.end_row();
            });
        });
}

pub fn draw_help_overlay(ctx: &Context, rotation: Vec2) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new("LMB+Drag - Rotate").color(TEXT_MUTED));
                    ui.label(RichText::new(format!(
                        "X: {:.0}\u{b0} | Y: {:.0}\u{b0}",
                        rotation.x.to_degrees(),
                        rotation.y.to_degrees()
                    )).color(TEXT_MUTED));
                });
        });
}

fn fmt_num(n: usize) -> String {
    if n >= 1_000_000 {
        format!("{:.2}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{}", n)
    }
}
