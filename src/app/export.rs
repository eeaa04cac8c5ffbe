//! Print/Share: export the annotated image with a result summary, or copy
//! the result line to the clipboard

use super::App;
use crate::error::IdentifyError;
use crate::layout;
use crate::session::ToastKind;
use crate::theme;
use crate::types::{BoundingBox, PredictionResult};
use crate::ui::toast::Toast;
use crate::utils::sanitize_file_stem;
use crate::view::ResultView;
use chrono::{DateTime, Local};
use eframe::egui;
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// Thinnest outline drawn into exported images, in source pixels
const STROKE_EXPORT_MIN: f32 = 2.0;

impl App {
    /// Ask for a destination, write the annotated PNG plus a text summary
    /// next to it and open the PNG in the system viewer.
    pub(crate) fn export_result(&mut self) {
        let (Some(result), Some(image)) = (self.session.renderable_result(), self.session.image()) else {
            return;
        };
        let result = result.clone();
        let pixels = image.pixels.clone();
        let file_name = image.name.clone();
        let view = ResultView::from_result(&result);
        let now = Local::now();

        let default_name = format!("{}-{}.png", sanitize_file_stem(&view.model), now.format("%Y%m%d-%H%M%S"));
        let Some(path) = rfd::FileDialog::new()
            .set_title("Export identification result")
            .add_filter("PNG image", &["png"])
            .set_directory(self.settings.last_export_dir_or_default())
            .set_file_name(&default_name)
            .save_file()
        else {
            return;
        };

        let display = self.display_size().unwrap_or((pixels.width() as f32, pixels.height() as f32));
        match write_export(&path, &pixels, &result, display, &view, &file_name, now) {
            Ok(png) => {
                info!(path = %png.display(), "Result exported");
                if let Some(parent) = png.parent() {
                    self.settings.last_export_dir = Some(parent.to_string_lossy().to_string());
                }
                let shown = png.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
                self.toast = Some(Toast::new(ToastKind::Success, format!("Result saved to {}", shown)));
                if let Err(e) = open::that(&png) {
                    warn!(error = %e, "Failed to open exported image");
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Export failed");
                self.toast = Some(Toast::new(ToastKind::Warning, format!("Export failed: {}", e)));
            }
        }
    }

    pub(crate) fn share_result(&mut self, ctx: &egui::Context) {
        let Some(result) = self.session.renderable_result() else {
            return;
        };
        let text = ResultView::from_result(result).share_text;
        info!(text = %text, "Result copied to clipboard");
        ctx.copy_text(text);
        self.toast = Some(Toast::new(ToastKind::Success, "Result copied to clipboard"));
    }
}

fn write_export(
    path: &Path,
    pixels: &RgbaImage,
    result: &PredictionResult,
    display: (f32, f32),
    view: &ResultView,
    file_name: &str,
    when: DateTime<Local>,
) -> Result<PathBuf, IdentifyError> {
    // The bytes are always PNG, whatever extension was typed
    let png = path.with_extension("png");

    // Same on-screen stroke width, expressed in source pixels
    let (sx, _) = layout::scale_factors(result.source_size, display);
    let thickness = if sx > 0.0 {
        (theme::STROKE_BOX_FINAL / sx).round().max(STROKE_EXPORT_MIN) as u32
    } else {
        STROKE_EXPORT_MIN as u32
    };
    let c = theme::CANVAS_BOX;
    let annotated = annotate(pixels, &result.bounding_box, thickness, Rgba([c.r(), c.g(), c.b(), 255]));
    annotated
        .save_with_format(&png, image::ImageFormat::Png)
        .map_err(|e| IdentifyError::Unexpected(format!("Could not write {}: {}", png.display(), e)))?;

    let report = summary_report(view, file_name, when);
    std::fs::write(png.with_extension("txt"), report)
        .map_err(|e| IdentifyError::Unexpected(format!("Could not write summary: {}", e)))?;
    Ok(png)
}

/// Copy of `pixels` with the outline of `bbox` drawn `thickness` pixels wide,
/// clipped to the image
pub fn annotate(pixels: &RgbaImage, bbox: &BoundingBox, thickness: u32, color: Rgba<u8>) -> RgbaImage {
    let mut out = pixels.clone();
    let (w, h) = out.dimensions();
    let left = (bbox.x.max(0.0) as u32).min(w);
    let top = (bbox.y.max(0.0) as u32).min(h);
    let right = ((bbox.x + bbox.width).max(0.0) as u32).min(w);
    let bottom = ((bbox.y + bbox.height).max(0.0) as u32).min(h);
    let t = thickness.max(1);

    for y in top..bottom {
        for x in left..right {
            let on_edge = x < left + t || x + t >= right || y < top + t || y + t >= bottom;
            if on_edge {
                out.put_pixel(x, y, color);
            }
        }
    }
    out
}

/// Plain-text summary written next to the exported image
pub fn summary_report(view: &ResultView, file_name: &str, when: DateTime<Local>) -> String {
    let mut out = String::new();
    out.push_str("Sneaker Identification Result\n");
    out.push_str(&format!("Date: {}\n", when.format("%Y-%m-%d %H:%M:%S")));
    out.push_str(&format!("Image: {}\n\n", file_name));
    out.push_str(&format!("Model: {}\n", view.model));
    out.push_str(&format!("Confidence: {}\n", view.confidence_text));
    out.push_str(&format!("Detection area: {}\n", view.detection_area));
    if !view.top5.is_empty() {
        out.push_str("\nTop predictions:\n");
        for row in &view.top5 {
            out.push_str(&format!("  {}. {} ({})\n", row.rank, row.label, row.confidence_text));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TopPrediction;
    use chrono::TimeZone;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn outline_only_touches_the_border() {
        let blank = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let bbox = BoundingBox { x: 10.0, y: 20.0, width: 50.0, height: 30.0 };
        let out = annotate(&blank, &bbox, 2, RED);

        assert_eq!(*out.get_pixel(10, 20), RED);
        assert_eq!(*out.get_pixel(11, 35), RED);
        assert_eq!(*out.get_pixel(59, 49), RED);
        assert_eq!(*out.get_pixel(35, 35), Rgba([0, 0, 0, 255]));
        assert_eq!(*out.get_pixel(60, 50), Rgba([0, 0, 0, 255]));
        assert_eq!(*out.get_pixel(9, 20), Rgba([0, 0, 0, 255]));
        // source untouched
        assert_eq!(*blank.get_pixel(10, 20), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn outline_is_clipped_to_image() {
        let blank = RgbaImage::new(20, 20);
        let bbox = BoundingBox { x: -5.0, y: 15.0, width: 100.0, height: 100.0 };
        let out = annotate(&blank, &bbox, 1, RED);
        assert_eq!(*out.get_pixel(0, 15), RED);
        assert_eq!(*out.get_pixel(19, 19), RED);
        assert_eq!(*out.get_pixel(10, 15), RED);
        assert_eq!(*out.get_pixel(10, 17), Rgba([0, 0, 0, 0]));
    }

    fn air_max() -> PredictionResult {
        PredictionResult {
            shoe_model: "AirMax90".into(),
            confidence: 92.5,
            bounding_box: BoundingBox::default_for(100, 100),
            top5: vec![
                TopPrediction { label: "AirMax90".into(), confidence: 0.925 },
                TopPrediction { label: "AirForce1".into(), confidence: 0.04 },
            ],
            source_size: (100, 100),
        }
    }

    #[test]
    fn report_lists_result_and_ranking() {
        let result = air_max();
        let view = ResultView::from_result(&result);
        let when = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let report = summary_report(&view, "kick.jpg", when);

        assert!(report.contains("Date: 2024-03-01 12:30:00"));
        assert!(report.contains("Image: kick.jpg"));
        assert!(report.contains("Model: AirMax90"));
        assert!(report.contains("Confidence: 92.50%"));
        assert!(report.contains("  1. AirMax90 (92.5%)"));
        assert!(report.contains("  2. AirForce1 (4.0%)"));
    }

    #[test]
    fn export_is_written_as_png_whatever_the_chosen_extension() {
        let dir = tempfile::tempdir().unwrap();
        let result = air_max();
        let view = ResultView::from_result(&result);
        let pixels = RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255]));
        let when = Local.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

        let png = write_export(&dir.path().join("result.jpg"), &pixels, &result, (100.0, 100.0), &view, "kick.jpg", when)
            .unwrap();

        assert_eq!(png, dir.path().join("result.png"));
        assert!(!dir.path().join("result.jpg").exists());
        assert!(dir.path().join("result.txt").exists());
        let bytes = std::fs::read(&png).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
    }
}
