pub mod postprocess;

pub use postprocess::{PROBABILITY_THRESHOLD, RiskLevel};

use std::io::Cursor;
use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use burn::{prelude::*, record::CompactRecorder};
use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, imageops};
use serde::Serialize;
use thiserror::Error;

use crate::model::{INPUT_SIZE, UNet, UNetConfig};

/// Fixed label attached to every structured prediction.
pub const PREDICTION_LABEL: &str = "Flood Detected";

#[derive(Error, Debug)]
pub enum PredictError {
    /// The request payload could not be decoded as a color image. This is a
    /// client-class rejection raised before any tensor work.
    #[error("invalid input image: {0}")]
    InvalidImage(#[from] image::ImageError),

    /// The checkpoint could not be read or its parameter shapes do not match
    /// the configured architecture. Fatal at load time; a service must not
    /// start with a mismatched model.
    #[error("failed to load checkpoint: {0}")]
    Checkpoint(String),

    #[error("failed to encode mask: {0}")]
    MaskEncoding(String),
}

/// Immutable-after-load inference context: the trained network plus its
/// device, loaded once at process start and shared read-only by every call.
pub struct FloodPredictor<B: Backend> {
    model: UNet<B>,
    device: B::Device,
}

/// Result of one inference call, at the original image resolution.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// 0/255 flood mask resized back to the input's width and height.
    pub mask: GrayImage,
    pub flood_percent: f64,
    pub risk_level: RiskLevel,
}

/// Structured boundary payload for the prediction endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub mask_image_base64: String,
    pub flood_percent: f64,
    pub risk_level: RiskLevel,
    pub prediction: String,
}

impl<B: Backend> FloodPredictor<B> {
    pub fn new(model: UNet<B>, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Load a trained network from a checkpoint directory containing the
    /// `model.json` architecture config and the recorded weights saved by
    /// training.
    pub fn from_checkpoint<P: AsRef<Path>>(dir: P, device: &B::Device) -> Result<Self, PredictError> {
        let dir = dir.as_ref();

        let config = UNetConfig::load(dir.join("model.json"))
            .map_err(|e| PredictError::Checkpoint(format!("{}: {e}", dir.display())))?;

        let model = config
            .init::<B>(device)
            .load_file(dir.join("model"), &CompactRecorder::new(), device)
            .map_err(|e| PredictError::Checkpoint(format!("{}: {e}", dir.display())))?;

        tracing::info!(dir = %dir.display(), "loaded model checkpoint");

        Ok(Self::new(model, device.clone()))
    }

    /// Decode an image payload and run inference. Undecodable bytes are
    /// rejected before any tensor is built.
    pub fn predict_bytes(&self, bytes: &[u8]) -> Result<Prediction, PredictError> {
        let image = image::load_from_memory(bytes)?;

        Ok(self.predict(&image))
    }

    /// Run inference on an already-decoded image of arbitrary size.
    pub fn predict(&self, image: &DynamicImage) -> Prediction {
        let (original_width, original_height) = (image.width(), image.height());
        let size = INPUT_SIZE as u32;

        let resized = imageops::resize(
            &image.to_rgb8(),
            size,
            size,
            imageops::FilterType::Triangle,
        );

        let input = self.image_to_tensor(&resized);
        let probabilities = self.model.forward(input);

        let probabilities: Vec<f32> = probabilities
            .flatten::<1>(0, 3)
            .into_data()
            .convert::<f32>()
            .to_vec()
            .expect("probability map must be contiguous f32");

        let mask = postprocess::binarize(&probabilities);
        let flood_percent = postprocess::flood_percent(&mask);
        let risk_level = RiskLevel::from_percent(flood_percent);

        let mask = postprocess::mask_to_image(&mask, size, size);
        let mask = postprocess::resize_mask(&mask, original_width, original_height);

        tracing::debug!(flood_percent, risk = %risk_level, "inference complete");

        Prediction {
            mask,
            flood_percent,
            risk_level,
        }
    }

    fn image_to_tensor(&self, image: &RgbImage) -> Tensor<B, 4> {
        let size = INPUT_SIZE;
        let raw = image.as_raw();

        let mut data = Vec::with_capacity(3 * size * size);

        for c in 0..3 {
            for y in 0..size {
                for x in 0..size {
                    let idx = (y * size + x) * 3 + c;
                    data.push(raw[idx] as f32 / 255.0);
                }
            }
        }

        let tensor = Tensor::<B, 3>::from_data(
            TensorData::new(data, Shape::new([3, size, size])).convert::<B::FloatElem>(),
            &self.device,
        );

        tensor.unsqueeze()
    }
}

impl Prediction {
    /// PNG-encode the mask at the original resolution.
    pub fn mask_png(&self) -> Result<Vec<u8>, PredictError> {
        let mut buffer = Cursor::new(Vec::new());

        self.mask
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| PredictError::MaskEncoding(e.to_string()))?;

        Ok(buffer.into_inner())
    }

    /// Build the structured boundary payload: base64 PNG mask, coverage
    /// percentage, risk tier, and the fixed prediction label.
    pub fn to_response(&self) -> Result<PredictResponse, PredictError> {
        Ok(PredictResponse {
            mask_image_base64: BASE64.encode(self.mask_png()?),
            flood_percent: self.flood_percent,
            risk_level: self.risk_level,
            prediction: PREDICTION_LABEL.to_string(),
        })
    }
}
