//! Image canvas: texture upload, fitting, preprocessing tint and the
//! detection box animation

use super::App;
use crate::animation::BoxGrowth;
use crate::constants::*;
use crate::layout;
use crate::session::Progress;
use crate::theme;
use crate::types::UploadedImage;
use eframe::egui;
use tracing::debug;

// Texture size cap, relative to the canvas box
const TEXTURE_SCALE: f32 = 2.0;

impl App {
    /// Re-upload the texture whenever the session's image changed
    pub(crate) fn sync_texture(&mut self, ctx: &egui::Context) {
        let revision = self.session.image_revision();
        if revision == self.texture_revision {
            return;
        }
        self.texture_revision = revision;
        self.image_texture = self.session.image().map(|image| {
            ctx.load_texture("uploaded_image", texture_image(image), egui::TextureOptions::LINEAR)
        });
        debug!(revision, has_texture = self.image_texture.is_some(), "Canvas texture updated");
    }

    /// Display size of the current image inside the canvas box
    pub(crate) fn display_size(&self) -> Option<(f32, f32)> {
        let image = self.session.image()?;
        Some(layout::fit_within(image.width(), image.height(), CANVAS_MAX_WIDTH, CANVAS_MAX_HEIGHT))
    }

    pub(crate) fn start_box_animation(&mut self) {
        let (Some(result), Some(display)) = (self.session.renderable_result(), self.display_size()) else {
            return;
        };
        let target = layout::to_display(&result.bounding_box, result.source_size, display);
        let growth = BoxGrowth::new(target.width, target.height, BOX_ANIMATION_FRAMES);
        if self.settings.animate_box {
            self.box_frame = None;
            self.animation = Some(growth);
        } else {
            self.box_frame = Some(growth.target());
            self.animation = None;
        }
    }

    /// Step the box animation by one frame
    pub(crate) fn advance_animation(&mut self, ctx: &egui::Context) {
        let Some(growth) = &mut self.animation else {
            return;
        };
        if let Some(frame) = growth.next() {
            self.box_frame = Some(frame);
            ctx.request_repaint();
        }
        if growth.is_done() {
            self.animation = None;
        }
    }

    /// Paint the image, the preprocessing tint and the detection box
    pub(crate) fn render_canvas(&self, ui: &mut egui::Ui) {
        let (Some(texture), Some((w, h))) = (&self.image_texture, self.display_size()) else {
            return;
        };

        ui.vertical_centered(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(w, h), egui::Sense::hover());
            let painter = ui.painter_at(rect);
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            if self.session.is_processing() && tint_visible(self.session.progress()) {
                painter.rect_filled(rect, 0.0, theme::CANVAS_TINT);
            }

            let (Some(frame), Some(result)) = (self.box_frame, self.session.renderable_result()) else {
                return;
            };
            let target = layout::to_display(&result.bounding_box, result.source_size, (w, h));
            let box_rect = egui::Rect::from_min_size(
                rect.min + egui::vec2(target.x, target.y),
                egui::vec2(frame.width, frame.height),
            );

            if !frame.is_final {
                let c = [
                    box_rect.left_top(),
                    box_rect.right_top(),
                    box_rect.right_bottom(),
                    box_rect.left_bottom(),
                    box_rect.left_top(),
                ];
                painter.extend(egui::Shape::dashed_line(
                    &c,
                    egui::Stroke::new(theme::STROKE_BOX_GROWING, theme::CANVAS_BOX),
                    10.0,
                    5.0,
                ));
                return;
            }

            painter.rect_stroke(
                box_rect,
                0.0,
                egui::Stroke::new(theme::STROKE_BOX_FINAL, theme::CANVAS_BOX),
                egui::StrokeKind::Middle,
            );

            // Label plate above the box, or inside it when there is no room
            let label = format!("{} ({:.1}%)", result.shoe_model, result.confidence);
            let galley = painter.layout_no_wrap(
                label,
                egui::FontId::proportional(theme::FONT_BODY),
                theme::TEXT_PRIMARY,
            );
            let plate_size = galley.size() + egui::vec2(12.0, 6.0);
            let mut plate_min = egui::pos2(box_rect.left(), box_rect.top() - plate_size.y);
            if plate_min.y < rect.top() {
                plate_min.y = box_rect.top();
            }
            let plate = egui::Rect::from_min_size(plate_min, plate_size);
            painter.rect_filled(plate, theme::RADIUS_DEFAULT, theme::CANVAS_LABEL_BG);
            painter.galley(plate.min + egui::vec2(6.0, 3.0), galley, theme::TEXT_PRIMARY);
        });
    }
}

/// The canvas stays tinted from the end of preprocessing until the result
/// is drawn
fn tint_visible(progress: Option<&Progress>) -> bool {
    progress.is_some_and(|p| p.percent > PREPROCESS_STAGE_PERCENT)
}

fn texture_image(image: &UploadedImage) -> egui::ColorImage {
    let (w, h) = layout::fit_within(
        image.width(),
        image.height(),
        CANVAS_MAX_WIDTH * TEXTURE_SCALE,
        CANVAS_MAX_HEIGHT * TEXTURE_SCALE,
    );
    let (w, h) = ((w.round() as u32).max(1), (h.round() as u32).max(1));
    if (w, h) == image.dimensions() {
        return egui::ColorImage::from_rgba_unmultiplied(
            [w as usize, h as usize],
            image.pixels.as_raw(),
        );
    }
    let scaled = image::imageops::thumbnail(&*image.pixels, w, h);
    egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], scaled.as_raw())
}
