use std::path::PathBuf;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::classifier::Classifier;
use super::error::ClassifierError;
use super::svm::LinearSvc;
use super::vectorizer::TfidfVectorizer;
use crate::config::TrainingConfig;
use crate::dataset::{train_test_split, TrainingExample};

/// Summary of one training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Examples the vectorizer and model were fitted on
    pub train_size: usize,
    /// Examples held out from fitting
    pub test_size: usize,
    pub num_classes: usize,
    pub vocabulary_size: usize,
    /// Accuracy on the held-out examples, `None` when nothing was held out
    pub held_out_accuracy: Option<f64>,
    /// Where the vectorizer artifact was written, if it was persisted
    pub vectorizer_path: Option<PathBuf>,
    /// Where the model artifact was written, if it was persisted
    pub model_path: Option<PathBuf>,
}

/// A builder for training a Classifier with a fluent interface.
#[derive(Default, Debug)]
pub struct ClassifierBuilder {
    examples: Vec<TrainingExample>,
    config: TrainingConfig,
}

impl ClassifierBuilder {
    /// Creates a new empty ClassifierBuilder instance with default configuration
    ///
    /// # Example
    /// ```
    /// use intent_classifier::ClassifierBuilder;
    ///
    /// let builder = ClassifierBuilder::new();
    /// ```
    pub fn new() -> Self {
        Self {
            examples: Vec::new(),
            config: TrainingConfig::default(),
        }
    }

    /// Replaces the whole training configuration
    pub fn with_config(mut self, config: TrainingConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the fraction of examples held out for evaluation
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.config.split.test_size = test_size;
        self
    }

    /// Sets the seed used for the split and the solver
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.split.seed = seed;
        self
    }

    /// Adds one labeled utterance.
    ///
    /// # Errors
    /// - `ValidationError` if the intent label is empty
    pub fn add_example(mut self, example: TrainingExample) -> Result<Self, ClassifierError> {
        if example.intent.trim().is_empty() {
            return Err(ClassifierError::ValidationError(format!(
                "Example {} has an empty intent label",
                self.examples.len() + 1
            )));
        }
        self.examples.push(example);
        Ok(self)
    }

    /// Adds labeled utterances in order, stopping at the first invalid one.
    ///
    /// # Example
    /// ```
    /// use intent_classifier::{ClassifierBuilder, TrainingExample};
    ///
    /// let builder = ClassifierBuilder::new().add_examples(vec![
    ///     TrainingExample::new("hi there", "greeting"),
    ///     TrainingExample::new("are you open on sunday", "business_hours"),
    /// ]);
    /// assert!(builder.is_ok());
    /// ```
    pub fn add_examples<I>(mut self, examples: I) -> Result<Self, ClassifierError>
    where
        I: IntoIterator<Item = TrainingExample>,
    {
        for example in examples {
            self = self.add_example(example)?;
        }
        Ok(self)
    }

    /// Trains and returns the final Classifier instance
    ///
    /// # Example
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use intent_classifier::{Classifier, TrainingExample};
    ///
    /// let classifier = Classifier::builder()
    ///     .with_test_size(0.0)
    ///     .add_examples(vec![
    ///         TrainingExample::new("hello there", "greeting"),
    ///         TrainingExample::new("hi friend", "greeting"),
    ///         TrainingExample::new("what are your opening hours", "business_hours"),
    ///         TrainingExample::new("when do you close", "business_hours"),
    ///     ])?
    ///     .build()?;
    ///
    /// assert_eq!(classifier.classify("hello")?.intent, "greeting");
    /// # Ok(())
    /// # }
    /// ```
    pub fn build(self) -> Result<Classifier, ClassifierError> {
        self.fit().map(|(classifier, _)| classifier)
    }

    /// Splits the examples, fits the vectorizer and the model on the
    /// training partition and scores the held-out partition.
    ///
    /// # Errors
    /// - `ValidationError` if the configuration is invalid or fewer than two
    ///   intents remain in the training partition
    /// - `EmptyDatasetError` if there are no examples, the training partition
    ///   is empty, or the training utterances contain no tokens
    pub fn fit(self) -> Result<(Classifier, TrainingReport), ClassifierError> {
        self.config.validate()?;
        if self.examples.is_empty() {
            return Err(ClassifierError::EmptyDatasetError(
                "At least one training example must be added".into(),
            ));
        }

        let split = train_test_split(&self.examples, &self.config.split)?;
        info!(
            "Training on {} examples, holding out {}",
            split.train.len(),
            split.test.len()
        );

        let utterances: Vec<&str> = split.train.iter().map(|e| e.utterance.as_str()).collect();
        let labels: Vec<String> = split.train.iter().map(|e| e.intent.clone()).collect();

        let (vectorizer, features) = TfidfVectorizer::fit_transform(&utterances, &self.config.vectorizer)?;
        let model = LinearSvc::fit(features.view(), &labels, &self.config.svm, self.config.split.seed)?;
        let classifier = Classifier::from_parts(vectorizer, model)?;

        let held_out_accuracy = classifier.accuracy(&split.test)?;
        match held_out_accuracy {
            Some(accuracy) => info!(
                "Held-out accuracy: {:.1}% ({} examples)",
                accuracy * 100.0,
                split.test.len()
            ),
            None => warn!("No examples held out; skipping evaluation"),
        }

        let report = TrainingReport {
            train_size: split.train.len(),
            test_size: split.test.len(),
            num_classes: classifier.labels().len(),
            vocabulary_size: classifier.vectorizer().vocabulary_size(),
            held_out_accuracy,
            vectorizer_path: None,
            model_path: None,
        };
        Ok((classifier, report))
    }
}
