//! A small intent classifier: term-count vectorization, TF-IDF weighting and a
//! one-vs-rest linear SVM, with the fitted vectorizer and model persisted as
//! two independent artifacts.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use intent_classifier::{classify, train, ArtifactStore, TrainingConfig, TrainingExample};
//!
//! let examples = vec![
//!     TrainingExample::new("hello there", "greeting"),
//!     TrainingExample::new("hey whats up", "greeting"),
//!     TrainingExample::new("i want to book an appointment", "book_appointment"),
//!     TrainingExample::new("schedule an appointment for monday", "book_appointment"),
//!     TrainingExample::new("what are your business hours", "business_hours"),
//!     TrainingExample::new("when do you open", "business_hours"),
//! ];
//!
//! let dir = tempfile::tempdir()?;
//! let store = ArtifactStore::new(dir.path());
//! let mut config = TrainingConfig::default();
//! config.split.test_size = 0.0;
//! train(&examples, &config, &store)?;
//!
//! let prediction = classify("hey there", store.vectorizer_path(), store.model_path())?;
//! println!("Predicted intent: {}", prediction.intent);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A loaded [`Classifier`] is immutable and can be shared across threads
//! using `Arc`:
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use intent_classifier::{Classifier, TrainingExample};
//! use std::sync::Arc;
//! use std::thread;
//!
//! let classifier = Arc::new(Classifier::builder()
//!     .with_test_size(0.0)
//!     .add_examples(vec![
//!         TrainingExample::new("hello there", "greeting"),
//!         TrainingExample::new("when do you open", "business_hours"),
//!     ])?
//!     .build()?);
//!
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let classifier = Arc::clone(&classifier);
//!     handles.push(thread::spawn(move || {
//!         classifier.classify("hello").unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifact_store;
pub mod classifier;
pub mod config;
pub mod dataset;
mod trainer;

pub use artifact_store::{ArtifactError, ArtifactKind, ArtifactStore, MODEL_FILE_NAME, VECTORIZER_FILE_NAME};
pub use classifier::{
    classify, Classifier, ClassifierBuilder, ClassifierError, ClassifierInfo, IntentPrediction,
    LinearSvc, TfidfVectorizer, TrainingReport,
};
pub use config::{SplitConfig, SvmConfig, TrainingConfig, VectorizerConfig};
pub use dataset::{load_examples, train_test_split, DatasetSplit, TrainingExample};
pub use trainer::{train, train_from_file};

pub fn init_logger() {
    env_logger::init();
}
