use std::collections::{BTreeSet, HashMap};

use log::{debug, info, warn};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::error::ClassifierError;
use super::utils::argmax;
use crate::config::SvmConfig;

/// A linear maximum-margin classifier.
///
/// Two classes are separated by a single hyperplane whose positive side is
/// the second label in sorted order. More than two classes are handled
/// one-vs-rest with one hyperplane per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvc {
    /// Distinct labels in sorted order
    classes: Vec<String>,
    /// `estimators x features`
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

impl LinearSvc {
    /// Fits the classifier on row-wise feature vectors and their labels.
    ///
    /// Each binary problem minimizes the L2-regularized squared hinge loss with
    /// dual coordinate descent. The intercept is learned as the weight of a
    /// constant feature and is therefore regularized like the other weights.
    /// `seed` fixes the coordinate visiting order.
    ///
    /// # Errors
    /// - `ValidationError` if the number of rows and labels differ
    /// - `ValidationError` if fewer than two distinct labels are present
    pub fn fit(
        features: ArrayView2<f64>,
        labels: &[String],
        config: &SvmConfig,
        seed: u64,
    ) -> Result<Self, ClassifierError> {
        if features.nrows() != labels.len() {
            return Err(ClassifierError::ValidationError(format!(
                "Got {} feature rows but {} labels",
                features.nrows(),
                labels.len()
            )));
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.len() < 2 {
            return Err(ClassifierError::ValidationError(format!(
                "At least two distinct intents are required to train, found {}",
                classes.len()
            )));
        }

        let positives: Vec<&String> = if classes.len() == 2 {
            vec![&classes[1]]
        } else {
            classes.iter().collect()
        };

        let mut rng = StdRng::seed_from_u64(seed);
        let mut coef = Array2::zeros((positives.len(), features.ncols()));
        let mut intercept = Array1::zeros(positives.len());

        for (k, positive) in positives.iter().enumerate() {
            let targets: Vec<f64> = labels
                .iter()
                .map(|label| if label == *positive { 1.0 } else { -1.0 })
                .collect();
            let (weights, bias) = solve_dual(features, &targets, config, &mut rng);
            debug!("Fitted hyperplane for '{}' (bias {:.4})", positive, bias);
            coef.row_mut(k).assign(&weights);
            intercept[k] = bias;
        }

        info!(
            "Fitted linear SVM: {} classes, {} features, {} estimator(s)",
            classes.len(),
            features.ncols(),
            positives.len()
        );

        Ok(Self {
            classes,
            coef,
            intercept,
        })
    }

    /// Raw decision scores, one per estimator.
    pub fn decision_function(&self, features: ArrayView1<f64>) -> Result<Array1<f64>, ClassifierError> {
        if features.len() != self.n_features() {
            return Err(ClassifierError::PredictionError(format!(
                "Feature vector has {} dimensions but the model expects {}",
                features.len(),
                self.n_features()
            )));
        }
        Ok(self.coef.dot(&features) + &self.intercept)
    }

    /// Predicts the label of one feature vector.
    ///
    /// With more than two classes the highest score wins and ties go to the
    /// label that sorts first.
    pub fn predict(&self, features: ArrayView1<f64>) -> Result<&str, ClassifierError> {
        let scores = self.decision_function(features)?;
        Ok(self.label_for(&scores))
    }

    /// Predicts the label of every row.
    pub fn predict_batch(&self, features: ArrayView2<f64>) -> Result<Vec<&str>, ClassifierError> {
        features
            .axis_iter(Axis(0))
            .map(|row| self.predict(row))
            .collect()
    }

    /// Decision scores keyed by label. For two classes the negative class
    /// receives the negated score of the single hyperplane.
    pub fn scores(&self, features: ArrayView1<f64>) -> Result<HashMap<String, f64>, ClassifierError> {
        let scores = self.decision_function(features)?;
        Ok(self.scores_by_label(&scores))
    }

    /// Predicted label together with the per-label scores, from a single
    /// evaluation of the decision function.
    pub fn predict_with_scores(
        &self,
        features: ArrayView1<f64>,
    ) -> Result<(&str, HashMap<String, f64>), ClassifierError> {
        let scores = self.decision_function(features)?;
        Ok((self.label_for(&scores), self.scores_by_label(&scores)))
    }

    fn scores_by_label(&self, scores: &Array1<f64>) -> HashMap<String, f64> {
        if self.is_binary() {
            let score = scores[0];
            return HashMap::from([
                (self.classes[0].clone(), -score),
                (self.classes[1].clone(), score),
            ]);
        }
        self.classes
            .iter()
            .cloned()
            .zip(scores.iter().copied())
            .collect()
    }

    fn label_for(&self, scores: &Array1<f64>) -> &str {
        if self.is_binary() {
            return if scores[0] > 0.0 {
                &self.classes[1]
            } else {
                &self.classes[0]
            };
        }

        &self.classes[argmax(scores).unwrap_or(0)]
    }

    fn is_binary(&self) -> bool {
        self.classes.len() == 2
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.coef.ncols()
    }

    pub fn coef(&self) -> &Array2<f64> {
        &self.coef
    }

    pub fn intercept(&self) -> &Array1<f64> {
        &self.intercept
    }
}

/// Dual coordinate descent for one binary problem with targets in `{-1, +1}`.
fn solve_dual(
    features: ArrayView2<f64>,
    targets: &[f64],
    config: &SvmConfig,
    rng: &mut StdRng,
) -> (Array1<f64>, f64) {
    let n_samples = features.nrows();
    let diag = 0.5 / config.c;

    let mut weights = Array1::<f64>::zeros(features.ncols());
    let mut bias = 0.0;
    let mut alpha = vec![0.0; n_samples];

    // Squared norm of each augmented row, plus the loss diagonal
    let q_diag: Vec<f64> = features
        .axis_iter(Axis(0))
        .map(|row| row.dot(&row) + 1.0 + diag)
        .collect();

    let mut order: Vec<usize> = (0..n_samples).collect();
    let mut converged = false;

    for iteration in 0..config.max_iter {
        order.shuffle(rng);
        let mut pg_max = f64::NEG_INFINITY;
        let mut pg_min = f64::INFINITY;

        for &i in &order {
            let row = features.row(i);
            let gradient = targets[i] * (weights.dot(&row) + bias) - 1.0 + diag * alpha[i];
            let projected = if alpha[i] == 0.0 {
                gradient.min(0.0)
            } else {
                gradient
            };
            pg_max = pg_max.max(projected);
            pg_min = pg_min.min(projected);

            if projected.abs() > 1e-12 {
                let previous = alpha[i];
                alpha[i] = (alpha[i] - gradient / q_diag[i]).max(0.0);
                let step = (alpha[i] - previous) * targets[i];
                weights.scaled_add(step, &row);
                bias += step;
            }
        }

        if pg_max - pg_min <= config.tol {
            debug!("Dual coordinate descent converged after {} iterations", iteration + 1);
            converged = true;
            break;
        }
    }

    if !converged {
        warn!(
            "Dual coordinate descent reached max_iter ({}) without converging",
            config.max_iter
        );
    }

    (weights, bias)
}
