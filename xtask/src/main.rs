use anyhow::Result;
use clap::{Parser, Subcommand};

mod tasks;

#[derive(Parser)]
#[command(
    name = "floodseg",
    about = "Flood segmentation toolkit",
    author,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Train(tasks::train::TrainArgs),
    Predict(tasks::predict::PredictArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Train(args) => tasks::train::run(args),
        Commands::Predict(args) => tasks::predict::run(args),
    }
}
