//! Reusable UI components
//!
//! Standalone widgets painted with the theme: the drop zone, the staged
//! progress bar, the confidence badge and shortcut hints.

use crate::theme;
use crate::view::ConfidenceLevel;
use eframe::egui;

/// Dashed upload area. Clicking it is reported through the response;
/// `hovering_files` highlights it while files are dragged over the window.
pub fn drop_zone(ui: &mut egui::Ui, hovering_files: bool, enabled: bool) -> egui::Response {
    let size = egui::vec2(ui.available_width(), theme::DROP_ZONE_HEIGHT);
    let sense = if enabled { egui::Sense::click() } else { egui::Sense::hover() };
    let (rect, response) = ui.allocate_exact_size(size, sense);

    if ui.is_rect_visible(rect) {
        let painter = ui.painter();
        let highlight = enabled && (hovering_files || response.hovered());
        let (fill, stroke_color) = if highlight {
            (theme::BG_HOVER, theme::ACCENT)
        } else {
            (theme::BG_INPUT, theme::BORDER_DEFAULT)
        };
        painter.rect_filled(rect, theme::RADIUS_LARGE, fill);

        let r = rect.shrink(1.0);
        let corners = [r.left_top(), r.right_top(), r.right_bottom(), r.left_bottom(), r.left_top()];
        painter.extend(egui::Shape::dashed_line(
            &corners,
            egui::Stroke::new(theme::STROKE_MEDIUM, stroke_color),
            8.0,
            6.0,
        ));

        let center = rect.center();
        painter.text(
            center - egui::vec2(0.0, 36.0),
            egui::Align2::CENTER_CENTER,
            egui_phosphor::regular::UPLOAD_SIMPLE,
            egui::FontId::proportional(44.0),
            if highlight { theme::ACCENT } else { theme::TEXT_DIM },
        );
        painter.text(
            center + egui::vec2(0.0, 12.0),
            egui::Align2::CENTER_CENTER,
            "Drop a sneaker photo here",
            egui::FontId::proportional(theme::FONT_HEADING),
            theme::TEXT_SECONDARY,
        );
        painter.text(
            center + egui::vec2(0.0, 36.0),
            egui::Align2::CENTER_CENTER,
            "or click to browse  •  JPG, PNG, WEBP up to 10 MB",
            egui::FontId::proportional(theme::FONT_LABEL),
            theme::TEXT_DIM,
        );
    }

    if enabled && response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }
    response
}

/// Horizontal progress bar with the stage text and percentage above it
pub fn progress_bar(ui: &mut egui::Ui, percent: u8, text: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(text).color(theme::TEXT_SECONDARY));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(egui::RichText::new(format!("{}%", percent)).color(theme::ACCENT).strong());
        });
    });

    let (rect, _) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), theme::PROGRESS_BAR_HEIGHT),
        egui::Sense::hover(),
    );
    let painter = ui.painter();
    let radius = theme::PROGRESS_BAR_HEIGHT / 2.0;
    painter.rect_filled(rect, radius, theme::BG_SURFACE);
    let fraction = (percent.min(100) as f32) / 100.0;
    if fraction > 0.0 {
        let filled = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width() * fraction, rect.height()));
        painter.rect_filled(filled, radius, theme::ACCENT);
    }
}

/// Colored confidence value with its level icon
pub fn confidence_badge(ui: &mut egui::Ui, level: ConfidenceLevel, text: &str) {
    let color = theme::confidence_color(level);
    ui.label(
        egui::RichText::new(format!("{}  {}", theme::confidence_icon(level), text))
            .color(color)
            .size(theme::FONT_HEADING)
            .strong(),
    );
}

/// One line of the shortcut legend, e.g. "Ctrl+O  Open image"
pub fn key_hint(ui: &mut egui::Ui, keys: &str, label: &str) {
    ui.horizontal(|ui| {
        egui::Frame::new()
            .fill(theme::BG_SURFACE)
            .corner_radius(theme::RADIUS_DEFAULT)
            .inner_margin(egui::Margin::symmetric(6, 2))
            .show(ui, |ui| {
                ui.label(
                    egui::RichText::new(keys)
                        .monospace()
                        .size(theme::FONT_SMALL)
                        .color(theme::TEXT_SECONDARY),
                );
            });
        ui.label(egui::RichText::new(label).size(theme::FONT_LABEL).color(theme::TEXT_MUTED));
    });
}
