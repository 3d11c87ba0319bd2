use std::path::PathBuf;

mod analyzer;
pub mod builder;
#[allow(clippy::module_inception)]
mod classifier;
mod error;
mod svm;
mod utils;
mod vectorizer;

pub use builder::{ClassifierBuilder, TrainingReport};
pub use classifier::{classify, Classifier, IntentPrediction};
pub use error::ClassifierError;
pub use svm::LinearSvc;
pub use vectorizer::TfidfVectorizer;

/// Information about the current state and configuration of a classifier
#[derive(Debug, Clone)]
pub struct ClassifierInfo {
    /// Path the vectorizer artifact was loaded from
    pub vectorizer_path: Option<PathBuf>,
    /// Path the model artifact was loaded from
    pub model_path: Option<PathBuf>,
    /// Number of intents the classifier can predict
    pub num_classes: usize,
    /// Labels of the intents, sorted
    pub class_labels: Vec<String>,
    /// Number of terms in the fitted vocabulary
    pub vocabulary_size: usize,
}
