use std::path::PathBuf;

use crate::artifact_store::ArtifactError;

/// Represents the different types of errors that can occur while training or
/// running the intent classifier.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The training data could not be read, did not parse as JSON, or an
    /// example is missing a required field
    #[error("Input format error: {0}")]
    InputFormatError(String),
    /// No usable training examples were available
    #[error("Empty dataset: {0}")]
    EmptyDatasetError(String),
    /// Error occurred due to invalid configuration or input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Error occurred while persisting a fitted artifact
    #[error("Failed to write artifact {path:?}: {source}")]
    ArtifactWriteError {
        path: PathBuf,
        #[source]
        source: ArtifactError,
    },
    /// Error occurred while reading a persisted artifact
    #[error("Failed to load artifact {path:?}: {source}")]
    ArtifactLoadError {
        path: PathBuf,
        #[source]
        source: ArtifactError,
    },
    /// Error occurred while making predictions
    #[error("Prediction error: {0}")]
    PredictionError(String),
}

impl From<serde_json::Error> for ClassifierError {
    fn from(err: serde_json::Error) -> Self {
        ClassifierError::InputFormatError(err.to_string())
    }
}
