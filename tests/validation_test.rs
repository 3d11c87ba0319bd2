use intent_classifier::{
    classify, dataset::parse_examples, train, train_from_file, ArtifactError, ArtifactStore,
    Classifier, ClassifierError, TrainingConfig, TrainingExample,
};
use std::fs;

fn small_examples() -> Vec<TrainingExample> {
    vec![
        TrainingExample::new("hello there", "greeting"),
        TrainingExample::new("good evening", "greeting"),
        TrainingExample::new("book an appointment", "book_appointment"),
        TrainingExample::new("schedule a visit", "book_appointment"),
    ]
}

fn no_holdout() -> TrainingConfig {
    let mut config = TrainingConfig::default();
    config.split.test_size = 0.0;
    config
}

#[test]
fn test_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let result = train(&[], &TrainingConfig::default(), &store);
    assert!(matches!(result, Err(ClassifierError::EmptyDatasetError(_))));
}

#[test]
fn test_empty_json_array() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("empty.json");
    fs::write(&data, "[]").unwrap();

    let store = ArtifactStore::new(dir.path());
    let result = train_from_file(&data, &TrainingConfig::default(), &store);
    assert!(matches!(result, Err(ClassifierError::EmptyDatasetError(_))));
}

#[test]
fn test_malformed_input() {
    assert!(matches!(
        parse_examples(r#"{"intent": "greeting"}"#),
        Err(ClassifierError::InputFormatError(_))
    ));
    assert!(matches!(
        parse_examples(r#"[{"intent": null, "utterance": "hello"}]"#),
        Err(ClassifierError::InputFormatError(_))
    ));
}

#[test]
fn test_missing_training_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let result = train_from_file(dir.path().join("nope.json"), &TrainingConfig::default(), &store);
    assert!(matches!(result, Err(ClassifierError::InputFormatError(_))));
}

#[test]
fn test_empty_intent_label() {
    let result = Classifier::builder().add_examples(vec![
        TrainingExample::new("hello", "greeting"),
        TrainingExample::new("hi", ""),
    ]);
    assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
}

#[test]
fn test_missing_vectorizer_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    train(&small_examples(), &no_holdout(), &store).unwrap();

    let result = classify("hello", dir.path().join("missing.pickle"), store.model_path());
    match result {
        Err(ClassifierError::ArtifactLoadError { path, source }) => {
            assert!(path.ends_with("missing.pickle"));
            assert!(matches!(source, ArtifactError::IoError(_)));
        }
        other => panic!("expected ArtifactLoadError, got {:?}", other),
    }
}

#[test]
fn test_corrupt_model_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    train(&small_examples(), &no_holdout(), &store).unwrap();

    fs::write(store.model_path(), b"definitely not a model").unwrap();
    let result = classify("hello", store.vectorizer_path(), store.model_path());
    assert!(matches!(result, Err(ClassifierError::ArtifactLoadError { .. })));
    assert!(!store.verify());
}

#[test]
fn test_swapped_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    train(&small_examples(), &no_holdout(), &store).unwrap();

    let result = classify("hello", store.model_path(), store.vectorizer_path());
    assert!(matches!(
        result,
        Err(ClassifierError::ArtifactLoadError {
            source: ArtifactError::KindMismatch { .. },
            ..
        })
    ));
}

#[test]
fn test_incompatible_artifacts() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let first_store = ArtifactStore::new(first.path());
    let second_store = ArtifactStore::new(second.path());

    train(&small_examples(), &no_holdout(), &first_store).unwrap();
    train(
        &[
            TrainingExample::new("yes", "affirm"),
            TrainingExample::new("no", "deny"),
        ],
        &no_holdout(),
        &second_store,
    )
    .unwrap();

    let result = classify("hello", first_store.vectorizer_path(), second_store.model_path());
    assert!(matches!(result, Err(ClassifierError::PredictionError(_))));
}

#[test]
fn test_unwritable_artifacts_dir() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("artifacts");
    fs::write(&not_a_dir, b"regular file").unwrap();
    let store = ArtifactStore::new(&not_a_dir);

    let result = train(&small_examples(), &no_holdout(), &store);
    match result {
        Err(ClassifierError::ArtifactWriteError { path, source }) => {
            assert_eq!(path, store.vectorizer_path());
            assert!(matches!(source, ArtifactError::IoError(_)));
        }
        other => panic!("expected ArtifactWriteError, got {:?}", other),
    }
}

#[test]
fn test_failed_retrain_keeps_previous_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    train(&small_examples(), &no_holdout(), &store).unwrap();
    let vectorizer_before = fs::read(store.vectorizer_path()).unwrap();
    let model_before = fs::read(store.model_path()).unwrap();

    // Occupy the model's staging file with a non-empty directory
    let blocked = dir.path().join("classification.model.tmp");
    fs::create_dir(&blocked).unwrap();
    fs::write(blocked.join("keep"), b"x").unwrap();

    let swapped: Vec<TrainingExample> = small_examples()
        .into_iter()
        .map(|e| {
            let intent = if e.intent == "greeting" { "book_appointment" } else { "greeting" };
            TrainingExample::new(e.utterance, intent)
        })
        .collect();
    let result = train(&swapped, &no_holdout(), &store);
    assert!(matches!(
        result,
        Err(ClassifierError::ArtifactWriteError {
            source: ArtifactError::IoError(_),
            ..
        })
    ));

    assert_eq!(fs::read(store.vectorizer_path()).unwrap(), vectorizer_before);
    assert_eq!(fs::read(store.model_path()).unwrap(), model_before);
    assert!(!dir.path().join("model_vectorizer.pickle.tmp").exists());

    let prediction = classify("hello there", store.vectorizer_path(), store.model_path()).unwrap();
    assert_eq!(prediction.intent, "greeting");
}

#[test]
fn test_invalid_split_config() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let mut config = TrainingConfig::default();
    config.split.test_size = 1.0;

    let result = train(&small_examples(), &config, &store);
    assert!(matches!(result, Err(ClassifierError::ValidationError(_))));
    assert!(!store.is_trained());
}

#[test]
fn test_error_messages() {
    let err = ClassifierError::EmptyDatasetError("no examples".into());
    assert_eq!(err.to_string(), "Empty dataset: no examples");

    let err = ClassifierError::PredictionError("bad shape".into());
    assert_eq!(err.to_string(), "Prediction error: bad shape");
}
