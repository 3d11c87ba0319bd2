use std::path::Path;

use log::info;

use crate::artifact_store::ArtifactStore;
use crate::classifier::{Classifier, ClassifierError, TrainingReport};
use crate::config::TrainingConfig;
use crate::dataset::{load_examples, TrainingExample};

/// Fits a vectorizer and a model on `examples` and persists both into
/// `store`, overwriting any earlier artifacts.
///
/// Nothing is written unless fitting succeeds.
pub fn train(
    examples: &[TrainingExample],
    config: &TrainingConfig,
    store: &ArtifactStore,
) -> Result<TrainingReport, ClassifierError> {
    let (classifier, mut report) = Classifier::builder()
        .with_config(config.clone())
        .add_examples(examples.iter().cloned())?
        .fit()?;

    classifier.save(store)?;
    report.vectorizer_path = Some(store.vectorizer_path());
    report.model_path = Some(store.model_path());

    info!(
        "Training complete: {} intents, {} terms, artifacts in {:?}",
        report.num_classes,
        report.vocabulary_size,
        store.artifacts_dir()
    );
    Ok(report)
}

/// Loads training examples from a JSON file and runs [`train`].
pub fn train_from_file<P: AsRef<Path>>(
    path: P,
    config: &TrainingConfig,
    store: &ArtifactStore,
) -> Result<TrainingReport, ClassifierError> {
    let examples = load_examples(path)?;
    train(&examples, config, store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_failed_training_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let result = train(&[], &TrainingConfig::default(), &store);
        assert!(matches!(result, Err(ClassifierError::EmptyDatasetError(_))));
        assert!(!store.is_trained());
        assert!(!store.vectorizer_path().exists());
    }

    #[test]
    fn test_train_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("training.json");
        fs::write(
            &data,
            r#"[
                {"intent": "greeting", "utterance": "hello there"},
                {"intent": "greeting", "utterance": "hi friend"},
                {"intent": "business_hours", "utterance": "when do you open"},
                {"intent": "business_hours", "utterance": "what are your hours"}
            ]"#,
        )
        .unwrap();

        let mut config = TrainingConfig::default();
        config.split.test_size = 0.0;
        let store = ArtifactStore::new(dir.path().join("artifacts"));

        let report = train_from_file(&data, &config, &store).unwrap();
        assert_eq!(report.train_size, 4);
        assert_eq!(report.vectorizer_path, Some(store.vectorizer_path()));
        assert!(store.is_trained());
    }

    #[test]
    fn test_train_from_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("training.json");
        fs::write(&data, r#"[{"intent": "greeting"}]"#).unwrap();

        let store = ArtifactStore::new(dir.path());
        let result = train_from_file(&data, &TrainingConfig::default(), &store);
        assert!(matches!(result, Err(ClassifierError::InputFormatError(_))));
        assert!(!store.is_trained());
    }
}
