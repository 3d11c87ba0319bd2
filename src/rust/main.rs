use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use intent_classifier::{classify, train_from_file, ArtifactStore, TrainingConfig};
use log::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit the vectorizer and model on labeled utterances and persist them
    Train {
        /// JSON array of {"intent": ..., "utterance": ...} objects
        #[arg(short, long)]
        data: PathBuf,
        /// Directory receiving the two artifacts
        #[arg(short, long)]
        artifacts_dir: Option<PathBuf>,
        /// JSON training configuration; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Fraction of examples held out for evaluation
        #[arg(long)]
        test_size: Option<f64>,
        /// Seed for the split and the solver
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Classify one utterance with previously trained artifacts
    Classify {
        utterance: String,
        /// Vectorizer artifact, defaults to the artifacts directory
        #[arg(long)]
        vectorizer: Option<PathBuf>,
        /// Model artifact, defaults to the artifacts directory
        #[arg(long)]
        model: Option<PathBuf>,
    },
}

fn run_train(
    data: PathBuf,
    artifacts_dir: Option<PathBuf>,
    config_path: Option<PathBuf>,
    test_size: Option<f64>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => TrainingConfig::from_file(&path)
            .with_context(|| format!("Failed to load training config from {:?}", path))?,
        None => TrainingConfig::default(),
    };
    if let Some(test_size) = test_size {
        config.split.test_size = test_size;
    }
    if let Some(seed) = seed {
        config.split.seed = seed;
    }

    let store = artifacts_dir.map(ArtifactStore::new).unwrap_or_default();

    let start_time = Instant::now();
    info!("=== Training intent classifier from {:?} ===", data);
    let report = train_from_file(&data, &config, &store)
        .with_context(|| format!("Error training classification model from {:?}", data))?;
    info!("=== Training finished (took {:.2?}) ===", start_time.elapsed());

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_classify(
    utterance: String,
    vectorizer: Option<PathBuf>,
    model: Option<PathBuf>,
) -> anyhow::Result<()> {
    let store = ArtifactStore::new_default();
    let vectorizer = vectorizer.unwrap_or_else(|| store.vectorizer_path());
    let model = model.unwrap_or_else(|| store.model_path());

    info!("Classifying: {}", utterance);
    let prediction = classify(&utterance, &vectorizer, &model)
        .with_context(|| format!("Error classifying {:?}", utterance))?;

    println!("{}", serde_json::to_string(&prediction)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::Train {
            data,
            artifacts_dir,
            config,
            test_size,
            seed,
        } => run_train(data, artifacts_dir, config, test_size, seed),
        Command::Classify {
            utterance,
            vectorizer,
            model,
        } => run_classify(utterance, vectorizer, model),
    }
}
