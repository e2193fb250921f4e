use egui::{Color32, Context, RichText, ScrollArea, Ui};

use crate::scene::Demo;
use crate::ui::state::{ModelStatus, UiActions, UiState};
use crate::ui::theme::*;

/// Frame statistics shown in the panel.
#[derive(Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f32,
    pub points_rendered: usize,
    pub layer_points: usize,
    pub triangles: usize,
    pub layer_zoom: f32,
    pub layer_size: (f32, f32),
}

pub fn draw_side_panel(ctx: &Context, state: &mut UiState, stats: &FrameStats) -> UiActions {
    let mut actions = UiActions::default();

    egui::SidePanel::right("control_panel")
        .min_width(280.0)
        .max_width(380.0)
        .default_width(300.0)
        .frame(egui::Frame::default().fill(BG_PANEL).inner_margin(16.0))
        .show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.heading(RichText::new("SURFVIEW").strong());
                ui.label(RichText::new("Lattice layers & tangent frames").color(TEXT_MUTED).size(11.0));
                ui.add_space(16.0);

                section_header(ui, "DEMO");
                ui.horizontal(|ui| {
                    for demo in Demo::ALL {
                        let selected = state.demo == demo;
                        let button = egui::Button::new(
                            RichText::new(demo.label()).color(if selected { BG_PURE_BLACK } else { TEXT_PRIMARY }),
                        )
                        .fill(if selected { ACCENT_CYAN } else { BG_WIDGET })
                        .min_size(egui::vec2(76.0, 30.0));

                        if ui.add(button).clicked() && !selected {
                            actions.switch_demo = Some(demo);
                        }
                    }
                });
                ui.add_space(12.0);
                ui.separator();
                ui.add_space(8.0);

                match state.demo {
                    Demo::Lattice => lattice_controls(ui, state, stats),
                    Demo::Sphere => {
                        section_header(ui, "TANGENT POINT");
                        if vec3_row(ui, &mut state.sphere_point) {
                            actions.rebuild_overlay = true;
                        }
                        if length_row(ui, &mut state.sphere_tangent_length) {
                            actions.rebuild_overlay = true;
                        }
                        overlay_error(ui, &state.overlay_error);
                    }
                    Demo::Model => {
                        section_header(ui, "MODEL FILE");
                        ui.add(egui::TextEdit::singleline(&mut state.model_path).desired_width(f32::INFINITY));
                        ui.add_space(4.0);
                        if ui
                            .add_enabled(state.model_status != ModelStatus::Loading, egui::Button::new("Reload"))
                            .clicked()
                        {
                            actions.reload_model = true;
                        }
                        ui.add_space(4.0);
                        model_status(ui, &state.model_status);
                        ui.add_space(12.0);

                        section_header(ui, "TANGENT POINT");
                        if vec3_row(ui, &mut state.model_point) {
                            actions.rebuild_overlay = true;
                        }
                        overlay_error(ui, &state.overlay_error);
                    }
                }

                ui.add_space(16.0);
                section_header(ui, "VIEW");
                ui.horizontal(|ui| {
                    ui.checkbox(&mut state.vsync_enabled, "VSync");
                    ui.checkbox(&mut state.show_stats, "Stats");
                });

                if state.show_stats {
                    ui.add_space(12.0);
                    stats_panel(ui, stats);
                }
            });
        });

    actions
}

fn lattice_controls(ui: &mut Ui, state: &mut UiState, stats: &FrameStats) {
    section_header(ui, "LAYER");
    let max = state.layer_count.saturating_sub(1);
    ui.horizontal(|ui| {
        ui.label("k:");
        ui.add(egui::Slider::new(&mut state.current_layer, 0..=max));
    });
    ui.label(
        RichText::new(format!(
            "{} points | zoom {:.2} | {:.0}x{:.0}",
            stats.layer_points, stats.layer_zoom, stats.layer_size.0, stats.layer_size.1
        ))
        .color(ACCENT_YELLOW)
        .size(11.0),
    );
    ui.label(
        RichText::new("Scroll over the layer view to zoom, drag its corner to resize")
            .color(TEXT_MUTED)
            .size(10.0)
            .italics(),
    );
}

fn section_header(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(TEXT_MUTED).size(11.0).strong());
    ui.add_space(4.0);
}

fn vec3_row(ui: &mut Ui, v: &mut [f32; 3]) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        for (label, c) in ["x", "y", "z"].iter().zip(v.iter_mut()) {
            ui.label(*label);
            changed |= ui.add(egui::DragValue::new(c).speed(0.02)).changed();
        }
    });
    changed
}

fn length_row(ui: &mut Ui, length: &mut f32) -> bool {
    let mut changed = false;
    ui.horizontal(|ui| {
        ui.label("Tangent length:");
        changed = ui
            .add(egui::DragValue::new(length).speed(0.01).range(0.01..=10.0))
            .changed();
    });
    changed
}

fn overlay_error(ui: &mut Ui, error: &Option<String>) {
    if let Some(err) = error {
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
}

fn model_status(ui: &mut Ui, status: &ModelStatus) {
    let (text, color) = match status {
        ModelStatus::Idle => ("Not loaded".to_string(), TEXT_MUTED),
        ModelStatus::Loading => ("Loading...".to_string(), ACCENT_ORANGE),
        ModelStatus::Loaded { triangles } => (format!("Loaded, {} triangles", fmt_num(*triangles)), ACCENT_GREEN),
        ModelStatus::Failed(e) => (format!("Failed: {e}"), ACCENT_RED),
    };
    ui.label(RichText::new(text).color(color).size(11.0));
}

fn stats_panel(ui: &mut Ui, stats: &FrameStats) {
    section_header(ui, "STATISTICS");
    egui::Frame::default()
        .fill(BG_WIDGET)
        .stroke(egui::Stroke::new(1.0, BORDER_SUBTLE))
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));

            let fps_color = if stats.fps >= 60.0 {
                ACCENT_GREEN
            } else if stats.fps >= 30.0 {
                ACCENT_ORANGE
            } else {
                ACCENT_RED
            };

            egui::Grid::new("stats").num_columns(2).spacing([20.0, 4.0]).show(ui, |ui| {
                ui.label(RichText::new("FPS").color(TEXT_MUTED));
                ui.label(RichText::new(format!("{:.0}", stats.fps)).color(fps_color));
                ui.end_row();

                ui.label(RichText::new("Points").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.points_rendered)).color(ACCENT_CYAN));
                ui.end_row();

                ui.label(RichText::new("Layer").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.layer_points)).color(ACCENT_YELLOW));
                ui.end_row();

                ui.label(RichText::new("Triangles").color(TEXT_MUTED));
                ui.label(RichText::new(fmt_num(stats.triangles)).color(TEXT_PRIMARY));
                ui.end_row();
            });
        });
}

pub fn draw_help_overlay(ctx: &Context, demo: Demo) {
    egui::Area::new(egui::Id::new("help_overlay"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .show(ctx, |ui| {
            egui::Frame::default()
                .fill(Color32::from_black_alpha(180))
                .rounding(6.0)
                .inner_margin(10.0)
                .show(ui, |ui| {
                    ui.style_mut().override_font_id = Some(egui::FontId::new(11.0, egui::FontFamily::Monospace));
                    ui.label(RichText::new("LMB+Drag - Orbit | Scroll - Dolly | 1/2/3 - Demo").color(TEXT_MUTED));
                    if demo == Demo::Lattice {
                        ui.label(RichText::new("Up/Down - Layer | Scroll on layer view - Zoom").color(TEXT_MUTED));
                    }
                });
        });
}

/// Outline and resize grip of the layer viewport; `rect` is in points.
pub fn draw_layer_frame(ctx: &Context, rect: egui::Rect, handle_size: f32) {
    let painter = ctx.layer_painter(egui::LayerId::new(egui::Order::Background, egui::Id::new("layer_frame")));
    painter.rect_stroke(rect, 0.0, egui::Stroke::new(1.0, ACCENT_YELLOW.gamma_multiply(0.6)));

    let corner = rect.max;
    painter.add(egui::Shape::convex_polygon(
        vec![
            corner,
            corner - egui::vec2(handle_size, 0.0),
            corner - egui::vec2(0.0, handle_size),
        ],
        ACCENT_YELLOW,
        egui::Stroke::NONE,
    ));
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_num_units() {
        assert_eq!(fmt_num(225), "225");
        assert_eq!(fmt_num(3375), "3.4K");
        assert_eq!(fmt_num(2_500_000), "2.50M");
    }
}
