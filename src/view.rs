//! Result view model: everything the result panel and the canvas label show,
//! already formatted.

use crate::constants::{CONFIDENCE_HIGH, CONFIDENCE_MEDIUM};
use crate::types::PredictionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent < CONFIDENCE_MEDIUM {
            ConfidenceLevel::Low
        } else if percent < CONFIDENCE_HIGH {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::High
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub rank: usize,
    pub label: String,
    pub confidence_text: String,
    pub is_top: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub model: String,
    /// Two decimals, e.g. "92.50%"
    pub confidence_text: String,
    /// One decimal, used on the canvas label and in share text
    pub confidence_short: String,
    pub level: ConfidenceLevel,
    pub top5: Vec<RankedRow>,
    pub detection_area: String,
    pub share_text: String,
}

impl ResultView {
    pub fn from_result(result: &PredictionResult) -> Self {
        let bbox = &result.bounding_box;
        let confidence_short = format!("{:.1}%", result.confidence);
        Self {
            model: result.shoe_model.clone(),
            confidence_text: format!("{:.2}%", result.confidence),
            level: ConfidenceLevel::from_percent(result.confidence),
            top5: result
                .top5
                .iter()
                .enumerate()
                .map(|(i, p)| RankedRow {
                    rank: i + 1,
                    label: p.label.clone(),
                    confidence_text: format!("{:.1}%", p.confidence * 100.0),
                    is_top: i == 0,
                })
                .collect(),
            detection_area: format!(
                "x {:.0}, y {:.0}, {:.0} × {:.0} px",
                bbox.x, bbox.y, bbox.width, bbox.height
            ),
            share_text: format!(
                "Identification Result: {} ({})",
                result.shoe_model, confidence_short
            ),
            confidence_short,
        }
    }
}
