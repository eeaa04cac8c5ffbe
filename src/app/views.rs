//! Panel rendering: sidebar, canvas area and result panel

use super::health::HealthState;
use super::App;
use crate::constants::*;
use crate::session::Event;
use crate::theme;
use crate::types::UiMode;
use crate::ui::components;
use crate::utils::{self, format_bytes};
use crate::view::ResultView;
use eframe::egui;
use egui_phosphor::regular as icons;

impl App {
    // ========================================================================
    // SIDEBAR
    // ========================================================================

    pub(crate) fn render_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("sidebar")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin { left: 16, right: 16, top: 0, bottom: 12 }),
            )
            .show(ctx, |ui| {
                let avail_w = ui.available_width();

                // Header with logo, centered
                ui.add_space(21.0);
                ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
                    if self.logo_texture.is_none() {
                        self.logo_texture = utils::rasterize_logo(avail_w as u32 * 2).map(|(pixels, w, h)| {
                            ctx.load_texture(
                                "logo",
                                egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &pixels),
                                egui::TextureOptions::LINEAR,
                            )
                        });
                    }
                    if let Some(texture) = &self.logo_texture {
                        let aspect = texture.size()[1] as f32 / texture.size()[0] as f32;
                        let logo_w = avail_w * 0.5;
                        ui.image(egui::load::SizedTexture::new(texture.id(), egui::vec2(logo_w, logo_w * aspect)));
                    }
                    ui.add_space(4.0);
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(APP_NAME.to_uppercase())
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );
                });
                ui.add_space(theme::SPACING_LG);

                self.render_health_row(ui);
                ui.add_space(theme::SPACING_LG);

                // Current image
                theme::section_frame().show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(egui::RichText::new("IMAGE").size(theme::FONT_SMALL).color(theme::TEXT_DIM));
                    ui.add_space(theme::SPACING_SM);
                    match (self.session.file_name(), self.session.image()) {
                        (Some(name), Some(image)) => {
                            ui.add(
                                egui::Label::new(egui::RichText::new(name).strong().color(theme::TEXT_PRIMARY))
                                    .truncate(),
                            );
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} × {} px  •  {}  •  {}",
                                    image.width(),
                                    image.height(),
                                    format_bytes(image.size_bytes),
                                    image.mime
                                ))
                                .size(theme::FONT_LABEL)
                                .color(theme::TEXT_MUTED),
                            );
                        }
                        _ => {
                            ui.label(egui::RichText::new("No image selected").color(theme::TEXT_DIM));
                        }
                    }
                });
                ui.add_space(theme::SPACING_LG);

                // Actions
                let busy = self.session.is_processing();
                let full = egui::vec2(ui.available_width(), theme::BUTTON_HEIGHT_LARGE);

                let select_btn = theme::button(format!("{}  Select Image", icons::FOLDER_OPEN)).min_size(full);
                if ui.add_enabled(!busy, select_btn).clicked() {
                    self.open_file_dialog();
                }
                ui.add_space(theme::SPACING_SM);

                let trigger_text = if busy { "Identifying..." } else { self.session.trigger_label().text() };
                let trigger_btn =
                    theme::button_accent(format!("{}  {}", icons::MAGNIFYING_GLASS, trigger_text)).min_size(full);
                let can_trigger = self.session.trigger_enabled() && !self.is_loading_file();
                if ui.add_enabled(can_trigger, trigger_btn).clicked() {
                    self.dispatch(Event::TriggerRequested);
                }
                ui.add_space(theme::SPACING_SM);

                let reset_btn = theme::button(format!("{}  Reset", icons::ARROW_COUNTER_CLOCKWISE)).min_size(full);
                if ui.add_enabled(self.session.mode() != UiMode::Idle, reset_btn).clicked() {
                    self.dispatch(Event::ResetRequested);
                }
                ui.add_space(theme::SPACING_XL);

                ui.label(egui::RichText::new("SETTINGS").size(theme::FONT_SMALL).color(theme::TEXT_DIM));
                ui.add_space(theme::SPACING_SM);
                if theme::settings_checkbox(ui, self.settings.animate_box, "Animate detection box", true) {
                    self.settings.animate_box = !self.settings.animate_box;
                }

                // Footer: shortcut legend and version (bottom-up, so reversed)
                ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
                    ui.label(
                        egui::RichText::new(format!("v{}", APP_VERSION))
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                    ui.add_space(theme::SPACING_MD);
                    let fmt = |key| ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, key));
                    components::key_hint(ui, &fmt(egui::Key::R), "Reset");
                    components::key_hint(ui, &fmt(egui::Key::Enter), "Identify");
                    components::key_hint(ui, &fmt(egui::Key::O), "Open image");
                });
            });
    }

    fn render_health_row(&self, ui: &mut egui::Ui) {
        let (color, text) = match &self.health {
            HealthState::Checking => (theme::TEXT_DIM, "Checking service...".to_string()),
            HealthState::Online(status) if status.model_loaded => {
                let device = status.device.as_deref().map(|d| format!(" ({})", d)).unwrap_or_default();
                (theme::STATUS_SUCCESS, format!("Service online{}", device))
            }
            HealthState::Online(_) => (theme::STATUS_WARNING, "Model not loaded".to_string()),
            HealthState::Offline(_) => (theme::STATUS_ERROR, "Service unreachable".to_string()),
            HealthState::Mock => (theme::STATUS_WARNING, "Mock predictor".to_string()),
        };
        let response = ui
            .horizontal(|ui| {
                ui.label(egui::RichText::new(icons::CIRCLE).size(10.0).color(color));
                ui.label(egui::RichText::new(text).size(theme::FONT_LABEL).color(theme::TEXT_MUTED));
            })
            .response;
        if let HealthState::Offline(err) = &self.health {
            response.on_hover_text(err);
        }
    }

    // ========================================================================
    // CENTRAL AREA
    // ========================================================================

    pub(crate) fn render_central(&mut self, ctx: &egui::Context) {
        let hovering_files = ctx.input(|i| !i.raw.hovered_files.is_empty());

        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme::BG_BASE).inner_margin(egui::Margin::same(20)))
            .show(ctx, |ui| {
                self.central_panel_rect = Some(ui.max_rect());

                ui.label(egui::RichText::new("Sneaker Identification").size(theme::FONT_TITLE).strong());
                ui.label(
                    egui::RichText::new("Upload a photo of a sneaker and let the model name it.")
                        .color(theme::TEXT_MUTED),
                );
                ui.add_space(theme::SPACING_LG);

                if let Some(error) = self.session.error() {
                    ui.scope(|ui| {
                        ui.style_mut().spacing.item_spacing.x = 0.0;
                        theme::error_frame().show(ui, |ui| {
                            ui.set_min_width(ui.available_width());
                            ui.label(
                                egui::RichText::new(format!("{}  {}", icons::WARNING, error.title()))
                                    .strong()
                                    .color(theme::ERROR_TEXT),
                            );
                            ui.add(egui::Label::new(egui::RichText::new(error.to_string()).color(theme::ERROR_TEXT)).wrap());
                        });
                    });
                    ui.add_space(theme::SPACING_LG);
                }

                if self.image_texture.is_some() {
                    theme::card_frame().show(ui, |ui| {
                        ui.set_min_width(ui.available_width());
                        self.render_canvas(ui);
                    });
                } else {
                    let enabled = !self.session.is_processing() && !self.is_loading_file();
                    if components::drop_zone(ui, hovering_files, enabled).clicked() {
                        self.open_file_dialog();
                    }
                }
                ui.add_space(theme::SPACING_LG);

                if self.is_loading_file() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(egui::RichText::new("Loading image...").color(theme::TEXT_MUTED));
                    });
                }

                if let Some(progress) = self.session.progress() {
                    components::progress_bar(ui, progress.percent, &progress.text);
                } else if self.session.mode() == UiMode::ImageLoaded {
                    ui.label(
                        egui::RichText::new(format!(
                            "Image ready. Press \"{}\" to identify it, or drop another photo to replace it.",
                            self.session.trigger_label().text()
                        ))
                        .color(theme::TEXT_DIM),
                    );
                }
            });
    }

    // ========================================================================
    // RESULT PANEL
    // ========================================================================

    pub(crate) fn render_result_panel(&mut self, ctx: &egui::Context) {
        let Some(result) = self.session.renderable_result() else {
            return;
        };
        let view = ResultView::from_result(result);
        let mut print = false;
        let mut share = false;

        egui::SidePanel::right("result_panel")
            .exact_width(theme::RESULT_PANEL_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin { left: 0, right: 16, top: 20, bottom: 12 }),
            )
            .show(ctx, |ui| {
                theme::card_frame().show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(
                        egui::RichText::new("IDENTIFICATION RESULT")
                            .size(theme::FONT_SMALL)
                            .color(theme::TEXT_DIM),
                    );
                    ui.add_space(theme::SPACING_SM);
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(&view.model)
                                .size(theme::FONT_TITLE + 4.0)
                                .strong()
                                .color(theme::TEXT_PRIMARY),
                        )
                        .wrap(),
                    );
                    components::confidence_badge(ui, view.level, &view.confidence_text);
                    ui.add_space(theme::SPACING_MD);
                    ui.label(egui::RichText::new("Detection area").size(theme::FONT_LABEL).color(theme::TEXT_DIM));
                    ui.label(egui::RichText::new(&view.detection_area).color(theme::TEXT_SECONDARY));
                });

                if !view.top5.is_empty() {
                    ui.add_space(theme::SPACING_LG);
                    theme::section_frame().show(ui, |ui| {
                        ui.set_min_width(ui.available_width());
                        ui.label(egui::RichText::new("TOP PREDICTIONS").size(theme::FONT_SMALL).color(theme::TEXT_DIM));
                        ui.add_space(theme::SPACING_SM);
                        render_ranking_table(ui, &view);
                    });
                }

                ui.add_space(theme::SPACING_LG);
                ui.horizontal(|ui| {
                    print = ui.add(theme::button(format!("{}  Print", icons::PRINTER))).clicked();
                    share = ui.add(theme::button(format!("{}  Share", icons::SHARE_NETWORK))).clicked();
                });
            });

        if print {
            self.export_result();
        }
        if share {
            self.share_result(ctx);
        }
    }
}

fn render_ranking_table(ui: &mut egui::Ui, view: &ResultView) {
    use egui_extras::{Column, TableBuilder};

    TableBuilder::new(ui)
        .striped(false)
        .resizable(false)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::exact(24.0))
        .column(Column::remainder().clip(true))
        .column(Column::exact(72.0))
        .header(22.0, |mut header| {
            for title in ["#", "Model", "Confidence"] {
                header.col(|ui| {
                    ui.label(egui::RichText::new(title).size(theme::FONT_SMALL).color(theme::TEXT_DIM));
                });
            }
        })
        .body(|mut body| {
            for row in &view.top5 {
                let color = if row.is_top { theme::ACCENT } else { theme::TEXT_SECONDARY };
                body.row(24.0, |mut cells| {
                    cells.col(|ui| {
                        ui.label(egui::RichText::new(row.rank.to_string()).color(theme::TEXT_DIM));
                    });
                    cells.col(|ui| {
                        let text = egui::RichText::new(&row.label).color(color);
                        ui.add(egui::Label::new(if row.is_top { text.strong() } else { text }).truncate());
                    });
                    cells.col(|ui| {
                        ui.label(egui::RichText::new(&row.confidence_text).color(color));
                    });
                });
            }
        });
}
