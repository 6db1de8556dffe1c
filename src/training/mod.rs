pub mod loss;

pub use loss::{BinaryCrossEntropyLoss, BinaryCrossEntropyLossConfig};

use std::path::Path;

use burn::{
    data::{dataloader::DataLoaderBuilder, dataset::Dataset},
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    record::CompactRecorder,
    tensor::backend::AutodiffBackend,
};
use thiserror::Error;

use crate::UNetConfig;
use crate::dataset::{DatasetError, FloodBatcher, FloodDataset};
use crate::model::UNet;

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("failed to write checkpoint: {0}")]
    Checkpoint(String),
}

/// Hyperparameters for one training run. Defaults match the flood corpus
/// baseline: 20 epochs of Adam at 1e-4 over shuffled batches of 4.
#[derive(Config, Debug)]
pub struct TrainingConfig {
    pub model: UNetConfig,
    #[config(default = "20")]
    pub num_epochs: usize,
    #[config(default = "4")]
    pub batch_size: usize,
    #[config(default = "4")]
    pub num_workers: usize,
    #[config(default = "42")]
    pub seed: u64,
    #[config(default = 1e-4)]
    pub learning_rate: f64,
}

/// Train a fresh network over the paired image/mask directories and persist
/// it to `artifact_dir` (`model.json` + recorder weights) after the final
/// epoch. There is no validation split, no early stopping, and no
/// mid-training checkpoint: a failed batch aborts the whole run and leaves
/// no partial artifact behind.
pub fn train<B: AutodiffBackend>(
    artifact_dir: &Path,
    images_dir: &Path,
    masks_dir: &Path,
    config: &TrainingConfig,
    device: &B::Device,
) -> Result<UNet<B>, TrainingError> {
    B::seed(config.seed);

    let dataset = FloodDataset::from_dirs(images_dir, masks_dir)?;
    tracing::info!(samples = dataset.len(), "loaded training dataset");

    let batcher = FloodBatcher::<B>::new(device.clone());
    let dataloader = DataLoaderBuilder::new(batcher)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(dataset);

    let mut model = config.model.init::<B>(device);
    let mut optim = AdamConfig::new().init();
    let loss_fn = BinaryCrossEntropyLossConfig::new().init::<B>(device);

    for epoch in 1..=config.num_epochs {
        let mut epoch_loss = 0.0;
        let mut num_batches = 0usize;

        for batch in dataloader.iter() {
            let predictions = model.forward(batch.images);
            let loss = loss_fn.forward(predictions, batch.masks);

            epoch_loss += loss.clone().into_scalar().elem::<f64>();
            num_batches += 1;

            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(config.learning_rate, model, grads);
        }

        let avg_loss = if num_batches > 0 {
            epoch_loss / num_batches as f64
        } else {
            0.0
        };

        tracing::info!(
            epoch,
            total_epochs = config.num_epochs,
            avg_loss,
            "epoch complete"
        );
    }

    save_checkpoint(artifact_dir, &config.model, &model)?;

    Ok(model)
}

fn save_checkpoint<B: Backend>(
    artifact_dir: &Path,
    model_config: &UNetConfig,
    model: &UNet<B>,
) -> Result<(), TrainingError> {
    std::fs::create_dir_all(artifact_dir)
        .map_err(|e| TrainingError::Checkpoint(format!("{artifact_dir:?}: {e}")))?;

    model_config
        .save(artifact_dir.join("model.json"))
        .map_err(|e| TrainingError::Checkpoint(e.to_string()))?;

    model
        .clone()
        .save_file(artifact_dir.join("model"), &CompactRecorder::new())
        .map_err(|e| TrainingError::Checkpoint(e.to_string()))?;

    tracing::info!(dir = %artifact_dir.display(), "saved model checkpoint");

    Ok(())
}
