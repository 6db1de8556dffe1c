use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::backend::{NdArray, ndarray::NdArrayDevice};
use clap::Args;

use floodseg::FloodPredictor;

#[derive(Args)]
pub struct PredictArgs {
    /// Checkpoint directory written by the train command.
    #[arg(short, long)]
    pub model_dir: PathBuf,

    /// Aerial image to analyze.
    #[arg(short, long)]
    pub image: PathBuf,

    /// Where to write the predicted mask (PNG, at the input resolution).
    #[arg(short, long, default_value = "mask.png")]
    pub output: PathBuf,
}

pub fn run(args: &PredictArgs) -> Result<()> {
    type InferenceBackend = NdArray<f32>;

    let device = NdArrayDevice::default();

    let predictor = FloodPredictor::<InferenceBackend>::from_checkpoint(&args.model_dir, &device)?;

    let bytes = std::fs::read(&args.image)
        .with_context(|| format!("failed to read {}", args.image.display()))?;

    let prediction = predictor.predict_bytes(&bytes)?;

    std::fs::write(&args.output, prediction.mask_png()?)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!(
        "Flood coverage: {:.2}% (risk: {})",
        prediction.flood_percent, prediction.risk_level
    );
    println!("Mask written to {}", args.output.display());

    Ok(())
}
