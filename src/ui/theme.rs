use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Style, TextStyle, Visuals};

pub const BG_BLACK: Color32 = Color32::from_rgb(0, 0, 0);
pub const BG_PANEL: Color32 = Color32::from_rgb(8, 9, 12);
pub const BG_WIDGET: Color32 = Color32::from_rgb(18, 20, 26);
pub const BG_WIDGET_HOVER: Color32 = Color32::from_rgb(28, 32, 42);
pub const BG_WIDGET_ACTIVE: Color32 = Color32::from_rgb(38, 44, 58);

pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(170, 172, 178);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(105, 108, 116);
pub const TEXT_BRIGHT: Color32 = Color32::from_rgb(222, 224, 230);

pub const ACCENT_GREEN: Color32 = Color32::from_rgb(52, 168, 83);
pub const ACCENT_RED: Color32 = Color32::from_rgb(190, 52, 52);
pub const ACCENT_ORANGE: Color32 = Color32::from_rgb(200, 130, 40);
pub const ACCENT_CYAN: Color32 = Color32::from_rgb(96, 170, 230);

pub const BORDER_SUBTLE: Color32 = Color32::from_rgba_premultiplied(60, 70, 100, 80);

pub fn apply_theme(ctx: &egui::Context) {
    let mut style = Style::default();

    let mut visuals = Visuals::dark();
    visuals.override_text_color = Some(TEXT_PRIMARY);
    visuals.panel_fill = BG_PANEL;
    visuals.window_fill = BG_PANEL;
    visuals.window_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    visuals.extreme_bg_color = BG_BLACK;
    visuals.faint_bg_color = BG_PANEL;
    visuals.hyperlink_color = ACCENT_CYAN;
    visuals.warn_fg_color = ACCENT_ORANGE;
    visuals.error_fg_color = ACCENT_RED;
    visuals.slider_trailing_fill = true;
    visuals.selection.bg_fill = ACCENT_CYAN.gamma_multiply(0.35);
    visuals.selection.stroke = Stroke::new(1.0, ACCENT_CYAN);

    let widgets = &mut visuals.widgets;
    for (w, fill) in [
        (&mut widgets.noninteractive, BG_WIDGET),
        (&mut widgets.inactive, BG_WIDGET),
        (&mut widgets.hovered, BG_WIDGET_HOVER),
        (&mut widgets.active, BG_WIDGET_ACTIVE),
        (&mut widgets.open, BG_WIDGET_ACTIVE),
    ] {
        w.bg_fill = fill;
        w.weak_bg_fill = fill;
        w.rounding = Rounding::same(4.0);
    }
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    widgets.inactive.bg_stroke = Stroke::new(1.0, BORDER_SUBTLE);
    widgets.hovered.bg_stroke = Stroke::new(1.0, ACCENT_CYAN);
    widgets.active.bg_stroke = Stroke::new(2.0, ACCENT_CYAN);
    widgets.hovered.fg_stroke = Stroke::new(1.0, TEXT_BRIGHT);
    widgets.active.fg_stroke = Stroke::new(1.0, TEXT_BRIGHT);

    style.visuals = visuals;

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(8.0, 4.0);
    style.spacing.slider_width = 180.0;

    style.text_styles = [
        (TextStyle::Small, FontId::new(11.0, FontFamily::Proportional)),
        (TextStyle::Body, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Button, FontId::new(14.0, FontFamily::Proportional)),
        (TextStyle::Heading, FontId::new(18.0, FontFamily::Proportional)),
        (TextStyle::Monospace, FontId::new(12.0, FontFamily::Monospace)),
    ]
    .into();

    ctx.set_style(style);
}
