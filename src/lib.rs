pub mod inference;
pub mod model;

#[cfg(feature = "dataset")]
pub mod dataset;

#[cfg(feature = "training")]
pub mod training;

pub use model::UNet;
pub use model::UNetConfig;

pub use inference::{FloodPredictor, PredictError, PredictResponse, Prediction, RiskLevel};

#[cfg(feature = "dataset")]
pub use dataset::{DatasetError, FloodBatch, FloodBatcher, FloodDataset};

#[cfg(feature = "training")]
pub use training::{TrainingConfig, TrainingError};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
