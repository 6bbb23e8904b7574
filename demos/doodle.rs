//! Doodle Recognition Example
//!
//! Loads a doodle classifier once at startup, then either replays a recorded
//! drawing onto a fresh canvas or classifies saved images.
//!
//! Usage:
//! ```
//! cargo run --example doodle -- --model-dir models replay --events strokes.json
//! cargo run --example doodle -- --variant feed_forward classify drawing1.jpg drawing2.png
//! ```
//!
//! An events file is a JSON array such as
//! `[{"event": "press", "x": 100, "y": 400}, {"event": "drag", "x": 700, "y": 400}, {"event": "release"}]`.
//!
//! Set `RUST_LOG=info` (or `debug`) to see progress.

use clap::{Parser, Subcommand};
use doodle_recognizer::models::WeightFormat;
use doodle_recognizer::prelude::*;
use doodle_recognizer::processors::Preprocessor;
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments for the doodle example
#[derive(Parser)]
#[command(name = "doodle")]
#[command(about = "Doodle Recognition Example - classifies freehand drawings")]
struct Args {
    /// JSON configuration file; flags below override its model section
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Model variant: feed_forward or convolutional
    #[arg(short, long)]
    variant: Option<ModelVariant>,

    /// Directory containing one subdirectory of weights per variant
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Device to run on: cpu, cuda or cuda:N
    #[arg(short, long)]
    device: Option<String>,

    /// Load model.onnx instead of model.safetensors
    #[arg(long)]
    onnx: bool,

    /// Number of ranked classes to log per result
    #[arg(long, default_value_t = 3)]
    top: usize,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay recorded pointer events on a blank canvas and classify the drawing
    Replay {
        /// JSON file with press/drag/release events
        #[arg(short, long)]
        events: PathBuf,

        /// Where to write the canvas snapshot (defaults to the configured path)
        #[arg(short, long)]
        save: Option<PathBuf>,
    },
    /// Classify saved images
    Classify {
        /// Image file paths to process
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

fn load_config(args: &Args) -> Result<DoodleConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            DoodleConfig::from_path(path)?
        }
        None => DoodleConfig::default(),
    };

    if let Some(variant) = args.variant {
        config.model.variant = variant;
    }
    if let Some(dir) = &args.model_dir {
        config.model.model_dir = dir.clone();
    }
    if let Some(device) = &args.device {
        config.model.device = device.clone();
    }
    if args.onnx {
        config.model.format = WeightFormat::Onnx;
    }
    Ok(config)
}

/// Logs the top `k` classes of a prediction by name.
fn log_ranked(prediction: &Prediction, categories: &CategoryTable, k: usize) {
    for (rank, (index, probability)) in prediction.ranked(k).into_iter().enumerate() {
        let name = categories.name(index).unwrap_or("?");
        info!("   {}. {} ({:.2}%)", rank + 1, name, probability * 100.0);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!("Doodle Recognition Example");

    // Model load failures are fatal.
    let classifier = match load_classifier(&config.model) {
        Ok(classifier) => classifier,
        Err(e) => {
            error!("Failed to load model: {}", e);
            return Err(e.into());
        }
    };

    match &args.command {
        Command::Replay { events, save } => {
            let events = load_events(events)?;
            info!("Replaying {} pointer events", events.len());

            let mut session = DoodleSession::from_config(&config, classifier)?;
            if let Some(path) = save {
                session = session.with_snapshot_path(path);
            }
            session.extend(events);

            let presentation = session.predict()?.clone();
            for line in &presentation.class_lines {
                info!("   {}", line);
            }
            info!("{}", presentation.headline);
            if let Some(prediction) = session.last_prediction() {
                log_ranked(
                    prediction,
                    session.pipeline().presenter().categories(),
                    args.top,
                );
            }
        }
        Command::Classify { images } => {
            let existing: Vec<&PathBuf> = images
                .iter()
                .filter(|path| {
                    let exists = path.exists();
                    if !exists {
                        error!("Image file not found: {}", path.display());
                    }
                    exists
                })
                .collect();
            if existing.is_empty() {
                error!("No valid image files found");
                return Err("No valid image files found".into());
            }

            let preprocessor = Preprocessor::new(config.preprocess.clone())?;
            let pipeline =
                DoodlePipeline::new(preprocessor, classifier, PredictionPresenter::default());
            info!("Classifying {} images...", existing.len());

            let outputs = pipeline.run_files(&existing)?;
            for (i, (path, output)) in existing.iter().zip(&outputs).enumerate() {
                info!("{}. {}", i + 1, path.display());
                info!("   {}", output.presentation.headline);
                log_ranked(
                    &output.prediction,
                    pipeline.presenter().categories(),
                    args.top,
                );
            }
        }
    }

    Ok(())
}
