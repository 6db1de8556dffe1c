use image::{GrayImage, imageops};
use serde::Serialize;

/// Probabilities strictly above this are flooded pixels.
pub const PROBABILITY_THRESHOLD: f32 = 0.5;

/// Three-tier classification of flood coverage. Boundaries are
/// inclusive-lower: exactly 10.0% is Medium, exactly 40.0% is High.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_percent(percent: f64) -> Self {
        if percent < 10.0 {
            RiskLevel::Low
        } else if percent < 40.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Threshold a probability map into a 0/1 mask.
pub fn binarize(probabilities: &[f32]) -> Vec<u8> {
    probabilities
        .iter()
        .map(|&p| u8::from(p > PROBABILITY_THRESHOLD))
        .collect()
}

/// Percentage of flooded pixels in a 0/1 mask, rounded to two decimal
/// places. An empty mask has zero coverage rather than being a division
/// error.
pub fn flood_percent(mask: &[u8]) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }

    let flooded = mask.iter().filter(|&&v| v == 1).count();
    let percent = flooded as f64 / mask.len() as f64 * 100.0;

    (percent * 100.0).round() / 100.0
}

/// Render a 0/1 mask as an 8-bit grayscale image (0/255).
pub fn mask_to_image(mask: &[u8], width: u32, height: u32) -> GrayImage {
    let pixels = mask.iter().map(|&v| v * 255).collect();

    GrayImage::from_raw(width, height, pixels)
        .expect("mask length must match the requested dimensions")
}

/// Resize a binary mask image with nearest-neighbor interpolation, which
/// keeps every pixel exactly 0 or 255; any blending filter would invent
/// intermediate values at flood boundaries.
pub fn resize_mask(mask: &GrayImage, width: u32, height: u32) -> GrayImage {
    imageops::resize(mask, width, height, imageops::FilterType::Nearest)
}
