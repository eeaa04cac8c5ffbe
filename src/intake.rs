//! File intake: validation, decoding and data-URL encoding

use crate::constants::{JPEG_QUALITY, MAX_FILE_BYTES};
use crate::error::IdentifyError;
use crate::types::UploadedImage;
use crate::utils::format_bytes;
use base64::Engine;
use eframe::egui;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Where the candidate's bytes come from
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A file offered by the picker or a drop, not yet validated
#[derive(Debug, Clone)]
pub struct FileCandidate {
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub source: FileSource,
}

impl FileCandidate {
    pub fn from_path(path: &Path) -> Result<Self, IdentifyError> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            name: display_name(path),
            mime: mime_for_path(path),
            size: meta.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Build from a window drop. Native drops usually carry only a path and
    /// an empty MIME string, so the type is guessed from the extension.
    pub fn from_dropped(file: &egui::DroppedFile) -> Option<Self> {
        if let Some(bytes) = &file.bytes {
            let mime = if file.mime.is_empty() {
                mime_for_path(Path::new(&file.name))
            } else {
                file.mime.clone()
            };
            return Some(Self {
                name: file.name.clone(),
                mime,
                size: bytes.len() as u64,
                source: FileSource::Bytes(bytes.clone()),
            });
        }
        let path = file.path.as_ref()?;
        let mut candidate = Self::from_path(path).ok()?;
        if !file.mime.is_empty() {
            candidate.mime = file.mime.clone();
        }
        Some(candidate)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// MIME type from the file extension, `application/octet-stream` if unknown
pub fn mime_for_path(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

/// Type and size checks. The size limit is inclusive.
pub fn validate(candidate: &FileCandidate) -> Result<(), IdentifyError> {
    if !candidate.mime.starts_with("image/") {
        return Err(IdentifyError::InvalidFile(
            "Please upload a valid image file (JPG, JPEG, PNG).".into(),
        ));
    }
    if candidate.size > MAX_FILE_BYTES {
        return Err(IdentifyError::InvalidFile(format!(
            "Image file too large ({}), please select an image less than {}.",
            format_bytes(candidate.size),
            format_bytes(MAX_FILE_BYTES)
        )));
    }
    Ok(())
}

/// Validate, read and decode a candidate into an in-memory image
pub fn load(candidate: FileCandidate) -> Result<UploadedImage, IdentifyError> {
    validate(&candidate)?;

    let bytes: Arc<[u8]> = match &candidate.source {
        FileSource::Path(path) => std::fs::read(path)?.into(),
        FileSource::Bytes(bytes) => bytes.clone(),
    };

    let decoded = image::ImageReader::new(Cursor::new(&bytes[..]))
        .with_guessed_format()?
        .decode()?;
    let pixels = decoded.to_rgba8();
    if pixels.width() == 0 || pixels.height() == 0 {
        return Err(IdentifyError::ReadFailure("Image has no pixels".into()));
    }

    debug!(
        name = %candidate.name,
        width = pixels.width(),
        height = pixels.height(),
        bytes = candidate.size,
        "Image decoded"
    );

    Ok(UploadedImage {
        name: candidate.name,
        mime: candidate.mime,
        size_bytes: candidate.size,
        pixels: Arc::new(pixels),
    })
}

/// Encode the full-resolution image as a JPEG data URL for the predictor
pub fn to_jpeg_data_url(pixels: &image::RgbaImage) -> Result<String, IdentifyError> {
    let rgb = image::DynamicImage::ImageRgba8(pixels.clone()).to_rgb8();
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| IdentifyError::Unexpected(format!("Could not encode image: {}", e)))?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&buf);
    Ok(format!("data:image/jpeg;base64,{}", b64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(mime: &str, size: u64) -> FileCandidate {
        FileCandidate {
            name: "shoe.png".into(),
            mime: mime.into(),
            size,
            source: FileSource::Bytes(Arc::from(Vec::new())),
        }
    }

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([200, 10, 10, 255]));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn rejects_non_image_mime() {
        for mime in ["text/plain", "application/pdf", "application/octet-stream", ""] {
            let err = validate(&candidate(mime, 10)).unwrap_err();
            assert!(matches!(err, IdentifyError::InvalidFile(_)), "{mime}");
        }
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate(&candidate("image/jpeg", MAX_FILE_BYTES)).is_ok());
        assert!(validate(&candidate("image/jpeg", MAX_FILE_BYTES + 1)).is_err());
    }

    #[test]
    fn mime_guessed_from_extension() {
        assert_eq!(mime_for_path(Path::new("a/b/shoe.JPG")), "image/jpeg");
        assert_eq!(mime_for_path(Path::new("shoe.png")), "image/png");
        assert_eq!(mime_for_path(Path::new("notes.txt")), "application/octet-stream");
    }

    #[test]
    fn load_decodes_bytes() {
        let bytes = png_bytes(4, 3);
        let c = FileCandidate {
            name: "shoe.png".into(),
            mime: "image/png".into(),
            size: bytes.len() as u64,
            source: FileSource::Bytes(Arc::from(bytes)),
        };
        let img = load(c).unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(img.name, "shoe.png");
    }

    #[test]
    fn load_reports_undecodable_data() {
        let c = FileCandidate {
            name: "broken.png".into(),
            mime: "image/png".into(),
            size: 4,
            source: FileSource::Bytes(Arc::from(vec![1u8, 2, 3, 4])),
        };
        assert!(matches!(load(c), Err(IdentifyError::ReadFailure(_))));
    }

    #[test]
    fn load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kick.png");
        std::fs::write(&path, png_bytes(8, 8)).unwrap();
        let c = FileCandidate::from_path(&path).unwrap();
        assert_eq!(c.mime, "image/png");
        assert_eq!(load(c).unwrap().dimensions(), (8, 8));
    }

    #[test]
    fn data_url_has_jpeg_prefix() {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
        let url = to_jpeg_data_url(&img).unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert!(url.len() > "data:image/jpeg;base64,".len());
    }
}
