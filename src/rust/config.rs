use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;

/// How the labeled examples are partitioned before fitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Fraction of examples held out from training, in `[0, 1)`
    pub test_size: f64,
    /// Seed for the shuffle that precedes the split
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.25,
            seed: 42,
        }
    }
}

/// Text analysis and TF-IDF weighting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub lowercase: bool,
    /// Inclusive range of word n-gram sizes
    pub ngram_range: (usize, usize),
    /// Replace raw counts with `1 + ln(tf)`
    pub sublinear_tf: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            lowercase: true,
            ngram_range: (1, 1),
            sublinear_tf: false,
        }
    }
}

/// Linear SVM solver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmConfig {
    /// Inverse regularization strength
    pub c: f64,
    /// Stopping tolerance on the projected gradient spread
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for SvmConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            tol: 1e-4,
            max_iter: 1000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub split: SplitConfig,
    pub vectorizer: VectorizerConfig,
    pub svm: SvmConfig,
}

impl TrainingConfig {
    /// Reads a configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            ClassifierError::InputFormatError(format!("Failed to read config {:?}: {}", path, e))
        })?;
        let config: TrainingConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClassifierError> {
        let test_size = self.split.test_size;
        if !(0.0..1.0).contains(&test_size) {
            return Err(ClassifierError::ValidationError(format!(
                "test_size must be in [0, 1), got {}",
                test_size
            )));
        }

        let (min_n, max_n) = self.vectorizer.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ClassifierError::ValidationError(format!(
                "Invalid ngram_range ({}, {})",
                min_n, max_n
            )));
        }

        if !(self.svm.c > 0.0) {
            return Err(ClassifierError::ValidationError(format!(
                "C must be positive, got {}",
                self.svm.c
            )));
        }
        if !(self.svm.tol > 0.0) {
            return Err(ClassifierError::ValidationError(format!(
                "tol must be positive, got {}",
                self.svm.tol
            )));
        }
        if self.svm.max_iter == 0 {
            return Err(ClassifierError::ValidationError(
                "max_iter must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TrainingConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.split.test_size, 0.25);
        assert_eq!(config.vectorizer.ngram_range, (1, 1));
    }

    #[test]
    fn test_invalid_test_size() {
        let mut config = TrainingConfig::default();
        config.split.test_size = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ClassifierError::ValidationError(_))
        ));

        config.split.test_size = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_ngram_range() {
        let mut config = TrainingConfig::default();
        config.vectorizer.ngram_range = (2, 1);
        assert!(config.validate().is_err());

        config.vectorizer.ngram_range = (0, 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: TrainingConfig =
            serde_json::from_str(r#"{"split": {"seed": 7}, "svm": {"c": 0.5}}"#).unwrap();
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.split.test_size, 0.25);
        assert_eq!(config.svm.c, 0.5);
        assert_eq!(config.svm.max_iter, 1000);
        assert!(config.vectorizer.lowercase);
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"split": {"test_size": 0.0}}"#).unwrap();

        let config = TrainingConfig::from_file(&path).unwrap();
        assert_eq!(config.split.test_size, 0.0);

        fs::write(&path, r#"{"split": {"test_size": 2.0}}"#).unwrap();
        assert!(matches!(
            TrainingConfig::from_file(&path),
            Err(ClassifierError::ValidationError(_))
        ));
    }
}
