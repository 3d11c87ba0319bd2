use std::fs;
use std::path::Path;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;
use crate::config::SplitConfig;

/// A single labeled utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub utterance: String,
    pub intent: String,
}

impl TrainingExample {
    pub fn new(utterance: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            utterance: utterance.into(),
            intent: intent.into(),
        }
    }
}

/// Training and held-out partitions produced by [`train_test_split`].
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Vec<TrainingExample>,
    pub test: Vec<TrainingExample>,
}

/// Loads a JSON array of `{"intent": ..., "utterance": ...}` objects.
///
/// Order is preserved and duplicates are kept. Both fields are required;
/// a missing or `null` field fails the whole load.
pub fn load_examples<P: AsRef<Path>>(path: P) -> Result<Vec<TrainingExample>, ClassifierError> {
    let path = path.as_ref();
    info!("Loading training examples from {:?}", path);
    let raw = fs::read_to_string(path).map_err(|e| {
        ClassifierError::InputFormatError(format!("Failed to read {:?}: {}", path, e))
    })?;
    let examples = parse_examples(&raw)?;
    info!("Loaded {} training examples", examples.len());
    Ok(examples)
}

pub fn parse_examples(json: &str) -> Result<Vec<TrainingExample>, ClassifierError> {
    Ok(serde_json::from_str(json)?)
}

/// Shuffles the examples with a seeded RNG and holds out
/// `ceil(test_size * n)` of them.
pub fn train_test_split(
    examples: &[TrainingExample],
    config: &SplitConfig,
) -> Result<DatasetSplit, ClassifierError> {
    if examples.is_empty() {
        return Err(ClassifierError::EmptyDatasetError(
            "No training examples provided".into(),
        ));
    }
    if !(0.0..1.0).contains(&config.test_size) {
        return Err(ClassifierError::ValidationError(format!(
            "test_size must be in [0, 1), got {}",
            config.test_size
        )));
    }

    let n = examples.len();
    let n_test = (config.test_size * n as f64).ceil() as usize;
    let n_train = n - n_test;
    if n_train == 0 {
        return Err(ClassifierError::EmptyDatasetError(format!(
            "test_size {} leaves no training examples out of {}",
            config.test_size, n
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(config.seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    debug!("Split {} examples into {} train / {} held-out", n, n_train, n_test);

    Ok(DatasetSplit {
        train: train_idx.iter().map(|&i| examples[i].clone()).collect(),
        test: test_idx.iter().map(|&i| examples[i].clone()).collect(),
    })
}
