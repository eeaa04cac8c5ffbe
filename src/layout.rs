//! Canvas geometry: fitting the source image into the display box and
//! mapping source-pixel rectangles onto it.

use crate::types::BoundingBox;

/// Scale `(width, height)` to fit within `(max_w, max_h)`, preserving aspect
/// ratio. Images already inside the box are left at their natural size.
pub fn fit_within(width: u32, height: u32, max_w: f32, max_h: f32) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let (w, h) = (width as f32, height as f32);
    let scale = (max_w / w).min(max_h / h).min(1.0);
    (w * scale, h * scale)
}

/// Per-axis factors from source pixels to display pixels
pub fn scale_factors(source: (u32, u32), display: (f32, f32)) -> (f32, f32) {
    if source.0 == 0 || source.1 == 0 {
        return (0.0, 0.0);
    }
    (display.0 / source.0 as f32, display.1 / source.1 as f32)
}

/// Map a source-pixel box to display coordinates relative to the canvas origin
pub fn to_display(bbox: &BoundingBox, source: (u32, u32), display: (f32, f32)) -> BoundingBox {
    let (sx, sy) = scale_factors(source, display);
    BoundingBox {
        x: bbox.x * sx,
        y: bbox.y * sy,
        width: bbox.width * sx,
        height: bbox.height * sy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_image_is_limited_by_width() {
        let (w, h) = fit_within(1400, 700, 700.0, 460.0);
        assert_eq!((w, h), (700.0, 350.0));
    }

    #[test]
    fn tall_image_is_limited_by_height() {
        let (w, h) = fit_within(920, 1840, 700.0, 460.0);
        assert_eq!((w, h), (230.0, 460.0));
    }

    #[test]
    fn small_image_is_not_upscaled() {
        assert_eq!(fit_within(320, 200, 700.0, 460.0), (320.0, 200.0));
    }

    #[test]
    fn box_maps_with_canvas_scale() {
        let bbox = BoundingBox { x: 150.0, y: 100.0, width: 700.0, height: 300.0 };
        let mapped = to_display(&bbox, (1000, 500), (500.0, 250.0));
        assert_eq!(mapped, BoundingBox { x: 75.0, y: 50.0, width: 350.0, height: 150.0 });
    }

    #[test]
    fn degenerate_source_maps_to_zero() {
        assert_eq!(fit_within(0, 10, 100.0, 100.0), (0.0, 0.0));
        assert_eq!(scale_factors((0, 0), (10.0, 10.0)), (0.0, 0.0));
    }
}
