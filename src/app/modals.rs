//! Modal dialogs and the toast overlay

use super::App;
use crate::session::Event;
use crate::theme;
use eframe::egui;

impl App {
    /// Confirmation shown when reset is requested mid-identification
    pub(crate) fn render_reset_modal(&mut self, ctx: &egui::Context) {
        if !self.session.confirm_reset_pending() {
            return;
        }

        let modal_area = egui::Modal::default_area(egui::Id::new("reset_modal"))
            .default_width(340.0 + theme::SPACING_XL * 2.0);
        let modal = egui::Modal::new(egui::Id::new("reset_modal"))
            .area(modal_area)
            .backdrop_color(egui::Color32::from_black_alpha(180))
            .frame(theme::modal_frame());

        let mut decision = None;
        let modal_response = modal.show(ctx, |ui| {
            ui.set_min_width(340.0);
            ui.set_max_width(340.0);

            ui.vertical_centered(|ui| {
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(egui_phosphor::regular::WARNING)
                        .size(32.0)
                        .color(theme::STATUS_WARNING),
                );
                ui.add_space(6.0);
                ui.label(egui::RichText::new("Identification in progress").size(theme::FONT_HEADING).strong());
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new("Are you sure you want to reset? The current result will be discarded.")
                        .color(theme::TEXT_MUTED),
                );
            });
            ui.add_space(16.0);

            ui.horizontal(|ui| {
                ui.set_min_height(28.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let reset_btn = ui.add(theme::button_danger(format!(
                        "{}  Reset",
                        egui_phosphor::regular::ARROW_COUNTER_CLOCKWISE
                    )));
                    if reset_btn.clicked() {
                        decision = Some(Event::ResetConfirmed);
                    }
                    ui.add_space(8.0);
                    if ui.add(theme::button("Keep waiting")).clicked() {
                        decision = Some(Event::ResetDismissed);
                    }
                });
            });
        });

        if decision.is_none() && modal_response.should_close() {
            decision = Some(Event::ResetDismissed);
        }
        if let Some(event) = decision {
            self.dispatch(event);
        }
    }

    /// Bottom-right of the central panel; drops the toast once it has faded
    pub(crate) fn render_toast(&mut self, ctx: &egui::Context) {
        let Some(panel_rect) = self.central_panel_rect else {
            return;
        };
        let anchor = panel_rect.right_bottom() - egui::vec2(theme::SPACING_LG, theme::SPACING_LG);
        let visible = self.toast.as_mut().is_some_and(|t| t.show(ctx, anchor));
        if !visible {
            self.toast = None;
        }
    }
}
