use std::path::PathBuf;

use anyhow::Result;
use burn::backend::{Autodiff, NdArray, ndarray::NdArrayDevice};
use clap::Args;

use floodseg::{TrainingConfig, UNetConfig, training};

#[derive(Args)]
pub struct TrainArgs {
    /// Directory of aerial images (.jpg).
    #[arg(short, long)]
    pub images_dir: PathBuf,

    /// Directory of ground-truth masks (.png), paired with the images by
    /// sorted filename order.
    #[arg(short, long)]
    pub masks_dir: PathBuf,

    #[arg(short, long, default_value_t = 20)]
    pub epochs: usize,

    #[arg(short, long, default_value_t = 4)]
    pub batch_size: usize,

    #[arg(short, long, default_value_t = 1e-4)]
    pub lr: f64,

    #[arg(long, default_value_t = 4)]
    pub num_workers: usize,

    #[arg(short, long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,

    #[arg(long, default_value_t = 64)]
    pub base_channels: usize,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

pub fn run(args: &TrainArgs) -> Result<()> {
    type TrainingBackend = Autodiff<NdArray<f32>>;

    let device = NdArrayDevice::default();

    let config = TrainingConfig::new(UNetConfig::new().with_base_channels(args.base_channels))
        .with_num_epochs(args.epochs)
        .with_batch_size(args.batch_size)
        .with_learning_rate(args.lr)
        .with_num_workers(args.num_workers)
        .with_seed(args.seed);

    println!(
        "Training on {} / {} for {} epochs (batch size {}, lr {})...",
        args.images_dir.display(),
        args.masks_dir.display(),
        args.epochs,
        args.batch_size,
        args.lr
    );

    training::train::<TrainingBackend>(
        &args.artifact_dir,
        &args.images_dir,
        &args.masks_dir,
        &config,
        &device,
    )?;

    println!(
        "Training completed successfully! Checkpoint written to {}",
        args.artifact_dir.display()
    );

    Ok(())
}
