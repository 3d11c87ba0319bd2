use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::svm::LinearSvc;
use super::vectorizer::TfidfVectorizer;
use crate::artifact_store::{self, ArtifactStore};
use crate::dataset::TrainingExample;

/// The intent assigned to one utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentPrediction {
    pub intent: String,
    pub utterance: String,
}

/// A fitted vectorizer paired with a fitted linear classifier.
///
/// # Thread Safety
///
/// Both fitted objects are immutable after construction and held behind
/// `Arc`, so a `Classifier` is `Send + Sync` and cheap to clone:
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use intent_classifier::Classifier;
/// use std::sync::Arc;
/// use std::thread;
///
/// let classifier = Arc::new(Classifier::load(
///     "model_vectorizer.pickle",
///     "classification.model",
/// )?);
///
/// let classifier_clone = Arc::clone(&classifier);
/// thread::spawn(move || {
///     classifier_clone.classify("what time do you open").unwrap();
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Classifier {
    pub vectorizer_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    vectorizer: Arc<TfidfVectorizer>,
    model: Arc<LinearSvc>,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<Classifier>();
    }
};

impl Classifier {
    /// Creates a new ClassifierBuilder for fluent construction
    pub fn builder() -> super::builder::ClassifierBuilder {
        super::builder::ClassifierBuilder::new()
    }

    /// Pairs a fitted vectorizer with a fitted model.
    ///
    /// # Errors
    /// - `PredictionError` if the model was fitted on a different number of
    ///   features than the vectorizer produces
    pub fn from_parts(vectorizer: TfidfVectorizer, model: LinearSvc) -> Result<Self, ClassifierError> {
        if vectorizer.vocabulary_size() != model.n_features() {
            return Err(ClassifierError::PredictionError(format!(
                "Vectorizer produces {} features but the model expects {}",
                vectorizer.vocabulary_size(),
                model.n_features()
            )));
        }
        Ok(Self {
            vectorizer_path: None,
            model_path: None,
            vectorizer: Arc::new(vectorizer),
            model: Arc::new(model),
        })
    }

    /// Loads both artifacts from explicit paths.
    ///
    /// # Errors
    /// - `ArtifactLoadError` if either file is missing, unreadable or corrupt
    /// - `PredictionError` if the two artifacts do not belong together
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        vectorizer_path: P,
        model_path: Q,
    ) -> Result<Self, ClassifierError> {
        let vectorizer_path = vectorizer_path.as_ref();
        let model_path = model_path.as_ref();

        let vectorizer = artifact_store::load_vectorizer(vectorizer_path)?;
        let model = artifact_store::load_model(model_path)?;
        info!(
            "Loaded classifier ({} classes, {} terms)",
            model.classes().len(),
            vectorizer.vocabulary_size()
        );

        let mut classifier = Self::from_parts(vectorizer, model)?;
        classifier.vectorizer_path = Some(vectorizer_path.to_path_buf());
        classifier.model_path = Some(model_path.to_path_buf());
        Ok(classifier)
    }

    /// Loads both artifacts from a store's well-known locations.
    pub fn load_from_store(store: &ArtifactStore) -> Result<Self, ClassifierError> {
        Self::load(store.vectorizer_path(), store.model_path())
    }

    /// Writes both artifacts into the store, replacing earlier ones.
    pub fn save(&self, store: &ArtifactStore) -> Result<(), ClassifierError> {
        store.save(&self.vectorizer, &self.model)
    }

    /// Returns information about the classifier's current state
    pub fn info(&self) -> super::ClassifierInfo {
        super::ClassifierInfo {
            vectorizer_path: self.vectorizer_path.clone(),
            model_path: self.model_path.clone(),
            num_classes: self.model.classes().len(),
            class_labels: self.model.classes().to_vec(),
            vocabulary_size: self.vectorizer.vocabulary_size(),
        }
    }

    /// Makes a prediction for the given text, returning the winning label
    /// and the decision score of every label.
    pub fn predict(&self, text: &str) -> Result<(String, HashMap<String, f64>), ClassifierError> {
        let features = self.vectorizer.transform(text);
        let (label, scores) = self.model.predict_with_scores(features.view())?;
        let label = label.to_string();
        debug!("Predicted '{}' for {:?}", label, text);
        Ok((label, scores))
    }

    /// Classifies one utterance.
    pub fn classify(&self, utterance: &str) -> Result<IntentPrediction, ClassifierError> {
        let features = self.vectorizer.transform(utterance);
        let intent = self.model.predict(features.view())?;
        Ok(IntentPrediction {
            intent: intent.to_string(),
            utterance: utterance.to_string(),
        })
    }

    /// Classifies several utterances in one pass.
    pub fn classify_batch<S: AsRef<str>>(&self, utterances: &[S]) -> Result<Vec<IntentPrediction>, ClassifierError> {
        let features = self.vectorizer.transform_batch(utterances);
        let intents = self.model.predict_batch(features.view())?;
        Ok(utterances
            .iter()
            .zip(intents)
            .map(|(utterance, intent)| IntentPrediction {
                intent: intent.to_string(),
                utterance: utterance.as_ref().to_string(),
            })
            .collect())
    }

    /// Fraction of examples whose predicted intent matches their label, or
    /// `None` when there is nothing to evaluate.
    pub fn accuracy(&self, examples: &[TrainingExample]) -> Result<Option<f64>, ClassifierError> {
        if examples.is_empty() {
            return Ok(None);
        }
        let utterances: Vec<&str> = examples.iter().map(|e| e.utterance.as_str()).collect();
        let predictions = self.classify_batch(&utterances)?;
        let correct = predictions
            .iter()
            .zip(examples)
            .filter(|(prediction, example)| prediction.intent == example.intent)
            .count();
        Ok(Some(correct as f64 / examples.len() as f64))
    }

    pub fn labels(&self) -> &[String] {
        self.model.classes()
    }

    pub fn vectorizer(&self) -> &TfidfVectorizer {
        &self.vectorizer
    }

    pub fn model(&self) -> &LinearSvc {
        &self.model
    }
}

/// Loads both artifacts and classifies a single utterance.
///
/// Nothing is cached: every call reads both files again.
///
/// # Errors
/// - `ArtifactLoadError` if either artifact is missing, unreadable or corrupt
/// - `PredictionError` if the artifacts have incompatible dimensions
pub fn classify<P: AsRef<Path>, Q: AsRef<Path>>(
    utterance: &str,
    vectorizer_path: P,
    model_path: Q,
) -> Result<IntentPrediction, ClassifierError> {
    Classifier::load(vectorizer_path, model_path)?.classify(utterance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SvmConfig, VectorizerConfig};

    fn fitted(docs: &[&str], labels: &[&str]) -> (TfidfVectorizer, LinearSvc) {
        let (vectorizer, matrix) = TfidfVectorizer::fit_transform(docs, &VectorizerConfig::default()).unwrap();
        let labels: Vec<String> = labels.iter().map(|s| s.to_string()).collect();
        let model = LinearSvc::fit(matrix.view(), &labels, &SvmConfig::default(), 0).unwrap();
        (vectorizer, model)
    }

    fn setup_test_classifier() -> Classifier {
        let (vectorizer, model) = fitted(
            &["hello there", "good morning", "open hours today", "when do you close"],
            &["greeting", "greeting", "hours", "hours"],
        );
        Classifier::from_parts(vectorizer, model).unwrap()
    }

    #[test]
    fn test_class_info() {
        let classifier = setup_test_classifier();
        let info = classifier.info();
        assert_eq!(info.num_classes, 2);
        assert_eq!(info.class_labels, vec!["greeting", "hours"]);
        assert!(info.vectorizer_path.is_none());
        assert!(info.vocabulary_size > 0);
    }

    #[test]
    fn test_predict_scores() {
        let classifier = setup_test_classifier();
        let (label, scores) = classifier.predict("hello good morning").unwrap();
        assert_eq!(label, "greeting");
        assert_eq!(scores.len(), 2);
        assert!(scores["greeting"] > scores["hours"]);
    }

    #[test]
    fn test_classify_batch() {
        let classifier = setup_test_classifier();
        let predictions = classifier
            .classify_batch(&["hello there", "when do you close today"])
            .unwrap();
        assert_eq!(predictions[0].intent, "greeting");
        assert_eq!(predictions[1].intent, "hours");
        assert_eq!(predictions[1].utterance, "when do you close today");
    }

    #[test]
    fn test_accuracy() {
        let classifier = setup_test_classifier();
        assert_eq!(classifier.accuracy(&[]).unwrap(), None);
        let examples = vec![
            TrainingExample::new("hello there", "greeting"),
            TrainingExample::new("hello there", "hours"),
        ];
        assert_eq!(classifier.accuracy(&examples).unwrap(), Some(0.5));
    }

    #[test]
    fn test_mismatched_parts() {
        let (vectorizer, _) = fitted(&["one two", "three four"], &["a", "b"]);
        let (_, model) = fitted(&["alpha", "beta gamma"], &["a", "b"]);
        let result = Classifier::from_parts(vectorizer, model);
        assert!(matches!(result, Err(ClassifierError::PredictionError(_))));
    }
}
