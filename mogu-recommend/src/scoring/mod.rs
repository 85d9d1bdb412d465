//! Classifier boundary: anything that can be fitted on a labelled feature
//! matrix and then score rows with a participation probability.

pub mod auc;
pub mod gbdt;
pub mod split;

use serde::Serialize;

use mogu_shared::{AppError, AppResult, ErrorCode};

use crate::candidates::FeatureMatrix;

pub use auc::roc_auc;
pub use gbdt::{GbdtModel, GbdtParams, GradientBoostedTrees};
pub use split::{stratified_split, Split};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    /// Increase in held-out log loss when this column is shuffled.
    pub importance: f64,
}

/// Feature rows with their binary labels.
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    pub features: &'a FeatureMatrix,
    pub labels: &'a [u8],
}

impl<'a> Dataset<'a> {
    pub fn new(features: &'a FeatureMatrix, labels: &'a [u8]) -> AppResult<Self> {
        if features.n_rows() != labels.len() {
            return Err(AppError::bad_request(format!(
                "{} feature rows but {} labels",
                features.n_rows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|l| **l == 1).count()
    }
}

pub trait Scorer {
    /// Column names the model was trained on, in order.
    fn feature_names(&self) -> &[String];

    /// Participation probability in [0, 1] for each row.
    fn predict(&self, features: &FeatureMatrix) -> AppResult<Vec<f64>>;

    fn feature_importance(&self) -> Vec<FeatureImportance>;
}

pub trait Trainer {
    type Model: Scorer;

    fn fit(&self, train: Dataset<'_>, valid: Option<Dataset<'_>>) -> AppResult<Self::Model>;
}

/// A model only scores matrices with exactly its training columns.
pub fn check_schema(expected: &[String], features: &FeatureMatrix) -> AppResult<()> {
    if expected == features.columns() {
        return Ok(());
    }
    let missing: Vec<&String> = expected.iter().filter(|c| !features.columns().contains(c)).collect();
    let unexpected: Vec<&String> = features.columns().iter().filter(|c| !expected.contains(c)).collect();
    Err(AppError::with_details(
        ErrorCode::FeatureSchemaMismatch,
        "feature columns differ from the model's training schema",
        serde_json::json!({ "missing": missing, "unexpected": unexpected }),
    ))
}
