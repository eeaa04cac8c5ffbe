//! Transient notification shown at the bottom-right of the canvas area.
//! Visible for a fixed time, then fades out; hovering restarts the timer.

use crate::constants::{TOAST_FADE_SECS, TOAST_VISIBLE_SECS};
use crate::session::ToastKind;
use crate::theme;
use eframe::egui;
use std::time::Instant;

pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    started: Instant,
}

impl Toast {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), started: Instant::now() }
    }

    fn elapsed(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }

    pub fn is_expired(&self) -> bool {
        self.elapsed() >= TOAST_VISIBLE_SECS + TOAST_FADE_SECS
    }

    /// Keep the toast fully visible (hover)
    pub fn hold(&mut self) {
        self.started = Instant::now();
    }

    /// Render the toast. Returns false once it has expired.
    pub fn show(&mut self, ctx: &egui::Context, anchor: egui::Pos2) -> bool {
        if self.is_expired() {
            return false;
        }
        let alpha = alpha_at(self.elapsed());
        let (icon, color) = match self.kind {
            ToastKind::Success => (egui_phosphor::regular::CHECK_CIRCLE, theme::ACCENT),
            ToastKind::Info => (egui_phosphor::regular::INFO, theme::TEXT_MUTED),
            ToastKind::Warning => (egui_phosphor::regular::WARNING, theme::STATUS_WARNING),
        };

        let response = egui::Area::new(egui::Id::new("toast"))
            .fixed_pos(anchor)
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0x1a, 0x1a, 0x1e, (230.0 * alpha) as u8))
                    .stroke(egui::Stroke::new(1.0, theme::with_alpha(color, alpha * 0.4)))
                    .corner_radius(theme::RADIUS_MEDIUM)
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(icon).color(theme::with_alpha(color, alpha)));
                            ui.label(
                                egui::RichText::new(&self.message)
                                    .color(theme::with_alpha(theme::TEXT_PRIMARY, alpha)),
                            );
                        });
                    });
            });

        if response.response.hovered() {
            self.hold();
        }
        ctx.request_repaint();
        true
    }
}

/// Opacity `elapsed` seconds after the toast appeared
pub fn alpha_at(elapsed: f32) -> f32 {
    if elapsed <= TOAST_VISIBLE_SECS {
        1.0
    } else {
        ((TOAST_VISIBLE_SECS + TOAST_FADE_SECS - elapsed) / TOAST_FADE_SECS).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_visible_then_fades() {
        assert_eq!(alpha_at(0.0), 1.0);
        assert_eq!(alpha_at(TOAST_VISIBLE_SECS), 1.0);
        let mid = alpha_at(TOAST_VISIBLE_SECS + TOAST_FADE_SECS / 2.0);
        assert!((mid - 0.5).abs() < 1e-4);
        assert_eq!(alpha_at(TOAST_VISIBLE_SECS + TOAST_FADE_SECS + 1.0), 0.0);
    }

    #[test]
    fn fresh_toast_is_live() {
        let toast = Toast::new(ToastKind::Success, "Image uploaded successfully!");
        assert!(!toast.is_expired());
        assert_eq!(toast.message, "Image uploaded successfully!");
    }
}
