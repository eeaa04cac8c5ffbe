//! Common types and data structures

use crate::constants::DEFAULT_BOX_FRACTIONS;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Visual mode of the identification session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiMode {
    Idle,
    ImageLoaded,
    Processing,
    Result,
    Error,
}

/// Label shown on the trigger button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerLabel {
    Start,
    Rerun,
}

impl TriggerLabel {
    pub fn text(self) -> &'static str {
        match self {
            TriggerLabel::Start => "Start to Identify",
            TriggerLabel::Rerun => "Re-Analyse",
        }
    }
}

/// Decoded upload held for the lifetime of one session
#[derive(Clone)]
pub struct UploadedImage {
    pub name: String,
    pub mime: String,
    pub size_bytes: u64,
    pub pixels: Arc<image::RgbaImage>,
}

impl UploadedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

impl std::fmt::Debug for UploadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadedImage")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("size_bytes", &self.size_bytes)
            .field("dimensions", &self.dimensions())
            .finish()
    }
}

/// Rectangle in source-image pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn from_array([x, y, width, height]: [f32; 4]) -> Self {
        Self { x, y, width, height }
    }

    /// Fixed central region used when the predictor does not locate the shoe
    pub fn default_for(width: u32, height: u32) -> Self {
        let (fx, fy, fw, fh) = DEFAULT_BOX_FRACTIONS;
        let (w, h) = (width as f32, height as f32);
        Self {
            x: w * fx,
            y: h * fy,
            width: w * fw,
            height: h * fh,
        }
    }
}

/// One entry of the ranked alternatives list; confidence is 0..1
#[derive(Debug, Clone, PartialEq)]
pub struct TopPrediction {
    pub label: String,
    pub confidence: f64,
}

/// Prediction as reported by a predictor, before it is tied to an image
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    pub shoe_model: String,
    /// Percent, 0..100
    pub confidence: f64,
    pub top5: Vec<TopPrediction>,
    pub bounding_box: Option<BoundingBox>,
}

impl RawPrediction {
    /// Bind to the image the request was made for, filling in the default box.
    pub fn into_result(self, source_size: (u32, u32)) -> PredictionResult {
        let bounding_box = self
            .bounding_box
            .unwrap_or_else(|| BoundingBox::default_for(source_size.0, source_size.1));
        PredictionResult {
            shoe_model: self.shoe_model,
            confidence: self.confidence,
            bounding_box,
            top5: self.top5,
            source_size,
        }
    }
}

/// Prediction bound to the source image it was computed against
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub shoe_model: String,
    pub confidence: f64,
    pub bounding_box: BoundingBox,
    pub top5: Vec<TopPrediction>,
    pub source_size: (u32, u32),
}

// ============================================================================
// WIRE FORMAT
// ============================================================================

/// Request body for the prediction endpoint
#[derive(Serialize)]
pub struct PredictRequest<'a> {
    pub image: &'a str,
}

/// Response envelope from the prediction endpoint
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: bool,
    pub prediction: Option<WirePrediction>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePrediction {
    pub shoe_model: String,
    pub confidence: f64,
    #[serde(rename = "top5_predictions")]
    pub top5: Option<Vec<WireTopPrediction>>,
    #[serde(alias = "boundingBox")]
    pub bbox: Option<[f32; 4]>,
}

#[derive(Debug, Deserialize)]
pub struct WireTopPrediction {
    #[serde(rename = "class")]
    pub label: String,
    pub confidence: f64,
}

/// Response of the predictor's health endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub device: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_box_covers_central_region() {
        let bbox = BoundingBox::default_for(1000, 500);
        assert_eq!(bbox, BoundingBox { x: 150.0, y: 100.0, width: 700.0, height: 300.0 });
    }

    #[test]
    fn into_result_keeps_reported_box() {
        let raw = RawPrediction {
            shoe_model: "Samba".into(),
            confidence: 80.0,
            top5: vec![],
            bounding_box: Some(BoundingBox::from_array([1.0, 2.0, 3.0, 4.0])),
        };
        let result = raw.into_result((10, 10));
        assert_eq!(result.bounding_box, BoundingBox::from_array([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(result.source_size, (10, 10));
    }

    #[test]
    fn wire_prediction_accepts_minimal_payload() {
        let json = r#"{"success":true,"prediction":{"shoeModel":"AirMax90","confidence":92.5}}"#;
        let resp: PredictResponse = serde_json::from_str(json).unwrap();
        let pred = resp.prediction.unwrap();
        assert!(resp.success);
        assert_eq!(pred.shoe_model, "AirMax90");
        assert!(pred.top5.is_none());
        assert!(pred.bbox.is_none());
    }

    #[test]
    fn trigger_labels() {
        assert_eq!(TriggerLabel::Start.text(), "Start to Identify");
        assert_eq!(TriggerLabel::Rerun.text(), "Re-Analyse");
    }
}
