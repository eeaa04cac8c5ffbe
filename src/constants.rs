//! Application constants and configuration

use std::time::Duration;

pub const APP_NAME: &str = "Sneaker Identifier";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default prediction endpoint, overridable via settings or `SNEAKER_ENDPOINT`
pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000/predict";
pub const ENDPOINT_ENV: &str = "SNEAKER_ENDPOINT";
pub const MOCK_PREDICTION_ENV: &str = "MOCK_PREDICTION";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Largest accepted upload (10 MiB, inclusive)
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;
pub const JPEG_QUALITY: u8 = 90;

/// Canvas box the uploaded image is fitted into (logical pixels)
pub const CANVAS_MAX_WIDTH: f32 = 700.0;
pub const CANVAS_MAX_HEIGHT: f32 = 460.0;

/// Synthetic detection region used when the predictor returns no box,
/// as fractions of the source image: (x, y, width, height)
pub const DEFAULT_BOX_FRACTIONS: (f32, f32, f32, f32) = (0.15, 0.20, 0.70, 0.60);

pub const BOX_ANIMATION_FRAMES: u32 = 20;
pub const TOP_PREDICTIONS: usize = 5;

/// Confidence thresholds (percent) for the result badge
pub const CONFIDENCE_HIGH: f64 = 85.0;
pub const CONFIDENCE_MEDIUM: f64 = 70.0;

pub const TOAST_VISIBLE_SECS: f32 = 3.0;
pub const TOAST_FADE_SECS: f32 = 0.5;

/// One step of the identification progress sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    pub percent: u8,
    pub text: &'static str,
    pub wait: StageWait,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageWait {
    Delay(Duration),
    /// Stage is held open by the prediction request
    Request,
    /// The prediction is handed to the UI here and the sequence ends
    Reveal,
}

pub const PREPROCESS_STAGE_TEXT: &str = "Image Preprocessing...";
pub const PREPROCESS_STAGE_PERCENT: u8 = 25;

pub const STAGES: &[Stage] = &[
    Stage { percent: 10, text: "Initialising AI Model...", wait: StageWait::Delay(Duration::from_millis(800)) },
    Stage { percent: PREPROCESS_STAGE_PERCENT, text: PREPROCESS_STAGE_TEXT, wait: StageWait::Delay(Duration::from_millis(1000)) },
    Stage { percent: 50, text: "Feature Extracting...", wait: StageWait::Delay(Duration::from_millis(1200)) },
    Stage { percent: 75, text: "AI Model Analysing...", wait: StageWait::Request },
    Stage { percent: 90, text: "Generating Results...", wait: StageWait::Delay(Duration::from_millis(500)) },
    Stage { percent: 100, text: "Identification Completed!", wait: StageWait::Reveal },
];
