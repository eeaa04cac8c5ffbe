//! Utility functions

use crate::constants::APP_NAME;
use std::path::PathBuf;

// Sneaker silhouette, wide viewBox; used for the sidebar logo
pub const LOGO_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 256 160"><path fill="#fff" stroke="#09090b" stroke-width="1" d="M22 112V62c0-16 10-30 26-30h34c6 18 22 30 44 32l58 8c28 4 48 18 50 40H22z"/><path fill="none" stroke="#09090b" stroke-width="3" d="M92 60l10-6M104 66l10-6M116 70l10-6"/><path fill="#2dd4bf" stroke="#09090b" stroke-width="1" d="M14 116h228c2 0 4 2 4 4v6c0 12-10 22-22 22H36c-12 0-22-10-22-22v-10z"/></svg>"##;

// Same silhouette centered in a square viewBox; used for window/taskbar icons
pub const ICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 256 256"><g transform="translate(0,48)"><path fill="#fff" d="M22 112V62c0-16 10-30 26-30h34c6 18 22 30 44 32l58 8c28 4 48 18 50 40H22z"/><path fill="#2dd4bf" d="M14 116h228c2 0 4 2 4 4v6c0 12-10 22-22 22H36c-12 0-22-10-22-22v-10z"/></g></svg>"##;

/// Rasterize the logo SVG at the given width, preserving aspect ratio.
pub fn rasterize_logo(width: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(LOGO_SVG, &resvg::usvg::Options::default()).ok()?;
    let svg_size = tree.size();
    let scale = width as f32 / svg_size.width();
    let height = (svg_size.height() * scale).ceil() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), width, height))
}

/// Rasterize the icon SVG to a square image (for window/taskbar icons).
pub fn rasterize_logo_square(size: u32) -> Option<(Vec<u8>, u32, u32)> {
    let tree = resvg::usvg::Tree::from_str(ICON_SVG, &resvg::usvg::Options::default()).ok()?;
    let scale = size as f32 / tree.size().width();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)?;
    resvg::render(
        &tree,
        resvg::usvg::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Some((premul_to_straight(&pixmap), size, size))
}

fn premul_to_straight(pixmap: &resvg::tiny_skia::Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let a = p.alpha();
            if a == 0 {
                [0, 0, 0, 0]
            } else {
                let r = (p.red() as u16 * 255 / a as u16) as u8;
                let g = (p.green() as u16 * 255 / a as u16) as u8;
                let b = (p.blue() as u16 * 255 / a as u16) as u8;
                [r, g, b, a]
            }
        })
        .collect()
}

/// Get the app data directory (settings, logs)
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Format bytes into human-readable string (B, KB, MB)
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Strip characters that are not safe in file names on any platform
pub fn sanitize_file_stem(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "result".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_byte_sizes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(10 * 1024 * 1024), "10.0 MB");
    }

    #[test]
    fn sanitizes_model_names() {
        assert_eq!(sanitize_file_stem("Air Max 90"), "Air_Max_90");
        assert_eq!(sanitize_file_stem("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_file_stem("///"), "result");
    }

    #[test]
    fn logo_rasterizes() {
        let (pixels, w, h) = rasterize_logo(128).unwrap();
        assert_eq!(w, 128);
        assert_eq!(h, 80);
        assert_eq!(pixels.len(), (w * h * 4) as usize);
        let (_, sw, sh) = rasterize_logo_square(64).unwrap();
        assert_eq!((sw, sh), (64, 64));
    }
}
