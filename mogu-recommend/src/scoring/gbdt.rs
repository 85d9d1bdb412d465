//! Gradient-boosted trees with binary log-loss, built on smartcore
//! regression trees.
//!
//! Each round fits a `DecisionTreeRegressor` to the logistic residuals of a
//! row subsample and then replaces every leaf's mean residual with a Newton
//! step computed from the same rows. Validation AUC is tracked per round and
//! the ensemble is cut back to its best round.

use ahash::AHashMap;
use rand::seq::{index, SliceRandom};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use smartcore::error::Failed;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_regressor::{DecisionTreeRegressor, DecisionTreeRegressorParameters};

use mogu_shared::{AppError, AppResult, ErrorCode};

use super::{check_schema, roc_auc, Dataset, FeatureImportance, Scorer, Trainer};
use crate::candidates::FeatureMatrix;
use crate::config::ModelConfig;

/// Rows used to measure permutation importance.
const IMPORTANCE_ROWS: usize = 2_000;

type RegressionTree = DecisionTreeRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, PartialEq)]
pub struct GbdtParams {
    pub num_boost_round: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    /// Fraction of training rows each tree is fitted on, in (0, 1].
    pub subsample: f64,
    pub l2_regularization: f64,
    /// Stop after this many rounds without validation AUC improvement; 0 disables.
    pub early_stopping_rounds: usize,
    /// Log validation AUC every this many rounds; 0 disables.
    pub log_period: usize,
    pub seed: u64,
}

impl GbdtParams {
    pub fn from_config(config: &ModelConfig, seed: u64) -> AppResult<Self> {
        let params = Self {
            num_boost_round: config.num_boost_round,
            learning_rate: config.learning_rate,
            max_depth: config.max_depth,
            min_samples_leaf: config.min_samples_leaf,
            subsample: config.subsample,
            l2_regularization: config.l2_regularization,
            early_stopping_rounds: config.early_stopping_rounds,
            log_period: config.log_period,
            seed,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> AppResult<()> {
        let invalid = |message: String| Err(AppError::new(ErrorCode::InvalidModelParams, message));
        if self.num_boost_round == 0 {
            return invalid("num_boost_round must be at least 1".into());
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return invalid(format!("learning_rate must be positive, got {}", self.learning_rate));
        }
        if !(1..=usize::from(u16::MAX)).contains(&self.max_depth) {
            return invalid(format!("max_depth must be in 1..=65535, got {}", self.max_depth));
        }
        if self.min_samples_leaf == 0 {
            return invalid("min_samples_leaf must be at least 1".into());
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return invalid(format!("subsample must be in (0, 1], got {}", self.subsample));
        }
        if !(self.l2_regularization >= 0.0 && self.l2_regularization.is_finite()) {
            return invalid(format!(
                "l2_regularization must be non-negative, got {}",
                self.l2_regularization
            ));
        }
        Ok(())
    }

    fn tree_params(&self) -> DecisionTreeRegressorParameters {
        DecisionTreeRegressorParameters {
            seed: Some(self.seed),
            ..DecisionTreeRegressorParameters::default()
        }
        .with_max_depth(self.max_depth as u16)
        .with_min_samples_leaf(self.min_samples_leaf)
        .with_min_samples_split(2 * self.min_samples_leaf)
    }
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            num_boost_round: 100,
            learning_rate: 0.1,
            max_depth: 5,
            min_samples_leaf: 20,
            subsample: 0.25,
            l2_regularization: 1.0,
            early_stopping_rounds: 10,
            log_period: 20,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    params: GbdtParams,
}

impl GradientBoostedTrees {
    pub fn new(params: GbdtParams) -> Self {
        Self { params }
    }

    /// Fits one round's tree and its per-leaf Newton steps on `rows`.
    fn fit_stage(
        &self,
        features: &FeatureMatrix,
        rows: &[usize],
        residual: &[f64],
        hessian: &[f64],
    ) -> AppResult<Stage> {
        let x = dense(&features.select_rows(rows))?;
        let r: Vec<f64> = rows.iter().map(|&i| residual[i]).collect();
        let tree = RegressionTree::fit(&x, &r, self.params.tree_params()).map_err(model_failed)?;

        // Leaves are keyed by their fitted mean residual.
        let mut sums: AHashMap<u64, (f64, f64)> = AHashMap::new();
        for (leaf, &i) in tree.predict(&x).map_err(model_failed)?.iter().zip(rows) {
            let entry = sums.entry(leaf.to_bits()).or_insert((0.0, 0.0));
            entry.0 += residual[i];
            entry.1 += hessian[i];
        }
        let steps = sums
            .into_iter()
            .map(|(leaf, (g, h))| (leaf, self.params.learning_rate * g / (h + self.params.l2_regularization)))
            .collect();

        Ok(Stage { tree, steps })
    }
}

impl Trainer for GradientBoostedTrees {
    type Model = GbdtModel;

    fn fit(&self, train: Dataset<'_>, valid: Option<Dataset<'_>>) -> AppResult<GbdtModel> {
        self.params.validate()?;
        if train.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyTrainingSet, "training set has no rows"));
        }
        let positives = train.positives();
        if positives == 0 || positives == train.len() {
            return Err(AppError::with_details(
                ErrorCode::SingleClassLabels,
                "training labels contain a single class",
                serde_json::json!({ "rows": train.len(), "positives": positives }),
            ));
        }
        let feature_names = train.features.columns().to_vec();
        if let Some(valid) = &valid {
            check_schema(&feature_names, valid.features)?;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        let train_x = dense(train.features)?;
        let valid_x = valid.as_ref().map(|v| dense(v.features)).transpose()?;

        let prior = positives as f64 / train.len() as f64;
        let base_score = (prior / (1.0 - prior)).ln();

        let n = train.len();
        let sample_size = ((n as f64 * self.params.subsample).round() as usize).clamp(1, n);
        let y: Vec<f64> = train.labels.iter().map(|&l| f64::from(l)).collect();
        let mut raw = vec![base_score; n];
        let mut valid_raw = valid.as_ref().map(|v| vec![base_score; v.len()]);
        let mut residual = vec![0.0; n];
        let mut hessian = vec![0.0; n];

        let mut stages: Vec<Stage> = Vec::new();
        let mut best: Option<(usize, f64)> = None;
        let mut rounds = 0;

        for round in 1..=self.params.num_boost_round {
            residual
                .par_iter_mut()
                .zip(hessian.par_iter_mut())
                .enumerate()
                .for_each(|(i, (r, h))| {
                    let p = sigmoid(raw[i]);
                    *r = y[i] - p;
                    *h = p * (1.0 - p);
                });

            let rows: Vec<usize> = if sample_size == n {
                (0..n).collect()
            } else {
                let mut rows = index::sample(&mut rng, n, sample_size).into_vec();
                rows.sort_unstable();
                rows
            };
            let stage = self.fit_stage(train.features, &rows, &residual, &hessian)?;

            for (r, step) in raw.iter_mut().zip(stage.increments(&train_x)?) {
                *r += step;
            }
            rounds = round;

            let valid_auc = match (&valid, &valid_x, &mut valid_raw) {
                (Some(v), Some(vx), Some(vr)) => {
                    for (r, step) in vr.iter_mut().zip(stage.increments(vx)?) {
                        *r += step;
                    }
                    roc_auc(v.labels, vr)
                }
                _ => None,
            };
            stages.push(stage);

            if self.params.log_period > 0 && round % self.params.log_period == 0 {
                tracing::info!(round, valid_auc = ?valid_auc, "boosting progress");
            }

            let Some(auc) = valid_auc else { continue };
            match best {
                Some((_, best_auc)) if auc <= best_auc => {}
                _ => best = Some((round, auc)),
            }
            if let Some((best_round, _)) = best {
                let patience = self.params.early_stopping_rounds;
                if patience > 0 && round - best_round >= patience {
                    tracing::info!(round, best_round, "early stopping");
                    break;
                }
            }
        }

        let (best_iteration, valid_auc) = match best {
            Some((round, auc)) => (round, Some(auc)),
            None => (rounds, None),
        };
        stages.truncate(best_iteration);

        let mut model = GbdtModel {
            feature_names,
            base_score,
            stages,
            importance: Vec::new(),
            rounds,
            best_iteration,
            valid_auc,
        };
        let held_out = valid.filter(|v| !v.is_empty()).unwrap_or(train);
        model.importance = permutation_importance(&model, held_out, &mut rng)?;

        tracing::info!(
            rounds,
            best_iteration,
            valid_auc = ?valid_auc,
            trees = model.n_trees(),
            leaves = model.stages.iter().map(|s| s.steps.len()).sum::<usize>(),
            "model trained"
        );
        Ok(model)
    }
}

/// One boosting round: a regression tree and the raw-score step for each
/// of its leaves.
#[derive(Debug)]
struct Stage {
    tree: RegressionTree,
    steps: AHashMap<u64, f64>,
}

impl Stage {
    fn increments(&self, x: &DenseMatrix<f64>) -> AppResult<Vec<f64>> {
        let leaves = self.tree.predict(x).map_err(model_failed)?;
        Ok(leaves
            .iter()
            .map(|leaf| self.steps.get(&leaf.to_bits()).copied().unwrap_or(0.0))
            .collect())
    }
}

/// Mean increase in log loss when one column is shuffled, per feature.
fn permutation_importance(
    model: &GbdtModel,
    data: Dataset<'_>,
    rng: &mut ChaCha8Rng,
) -> AppResult<Vec<FeatureImportance>> {
    let rows: Vec<usize> = if data.len() > IMPORTANCE_ROWS {
        let mut rows = index::sample(rng, data.len(), IMPORTANCE_ROWS).into_vec();
        rows.sort_unstable();
        rows
    } else {
        (0..data.len()).collect()
    };
    let sample = data.features.select_rows(&rows);
    let labels: Vec<u8> = rows.iter().map(|&i| data.labels[i]).collect();
    let baseline = log_loss(&labels, &model.predict(&sample)?);

    let width = sample.width();
    let mut importance = Vec::with_capacity(width);
    for (column, feature) in sample.columns().iter().enumerate() {
        let mut shuffled: Vec<f64> = sample.values().iter().skip(column).step_by(width).copied().collect();
        shuffled.shuffle(rng);
        let mut values = sample.values().to_vec();
        for (row, value) in shuffled.into_iter().enumerate() {
            values[row * width + column] = value;
        }
        let permuted = FeatureMatrix::new(sample.columns().to_vec(), values)?;
        importance.push(FeatureImportance {
            feature: feature.clone(),
            importance: log_loss(&labels, &model.predict(&permuted)?) - baseline,
        });
    }
    importance.sort_by(|a, b| {
        b.importance
            .total_cmp(&a.importance)
            .then_with(|| a.feature.cmp(&b.feature))
    });
    Ok(importance)
}

fn log_loss(labels: &[u8], probabilities: &[f64]) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    let total: f64 = labels
        .iter()
        .zip(probabilities)
        .map(|(&y, &p)| {
            let p = p.clamp(1e-15, 1.0 - 1e-15);
            if y == 1 {
                -p.ln()
            } else {
                -(1.0 - p).ln()
            }
        })
        .sum();
    total / labels.len() as f64
}

fn dense(features: &FeatureMatrix) -> AppResult<DenseMatrix<f64>> {
    DenseMatrix::new(features.n_rows(), features.width(), features.values().to_vec(), false).map_err(model_failed)
}

fn model_failed(e: Failed) -> AppError {
    AppError::new(ErrorCode::ModelFitFailed, format!("tree model failed: {e}"))
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Fitted ensemble, truncated to the best validation round.
#[derive(Debug)]
pub struct GbdtModel {
    feature_names: Vec<String>,
    base_score: f64,
    stages: Vec<Stage>,
    importance: Vec<FeatureImportance>,
    rounds: usize,
    best_iteration: usize,
    valid_auc: Option<f64>,
}

impl GbdtModel {
    /// Rounds actually run before stopping.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    pub fn valid_auc(&self) -> Option<f64> {
        self.valid_auc
    }

    pub fn n_trees(&self) -> usize {
        self.stages.len()
    }
}

impl Scorer for GbdtModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &FeatureMatrix) -> AppResult<Vec<f64>> {
        check_schema(&self.feature_names, features)?;
        let x = dense(features)?;
        let mut raw = vec![self.base_score; features.n_rows()];
        for stage in &self.stages {
            for (r, step) in raw.iter_mut().zip(stage.increments(&x)?) {
                *r += step;
            }
        }
        Ok(raw.into_par_iter().map(sigmoid).collect())
    }

    fn feature_importance(&self) -> Vec<FeatureImportance> {
        self.importance.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    /// Two features; the label follows `signal > 0.5` with 10% noise.
    fn synthetic(n: usize, seed: u64) -> (FeatureMatrix, Vec<u8>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut values = Vec::with_capacity(n * 2);
        let mut labels = Vec::with_capacity(n);
        for _ in 0..n {
            let noise: f64 = rng.gen();
            let signal: f64 = rng.gen();
            values.extend([noise, signal]);
            let flip = rng.gen_bool(0.1);
            labels.push(u8::from((signal > 0.5) != flip));
        }
        let m = FeatureMatrix::new(vec!["noise".into(), "signal".into()], values).unwrap();
        (m, labels)
    }

    /// The label equals a binary flag column, so one split separates the
    /// classes exactly.
    fn separable(n: usize, seed: u64) -> (FeatureMatrix, Vec<u8>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut values = Vec::with_capacity(n * 2);
        let mut labels = Vec::with_capacity(n);
        for i in 0..n {
            let flag = (i % 2) as u8;
            values.extend([rng.gen::<f64>(), f64::from(flag)]);
            labels.push(flag);
        }
        let m = FeatureMatrix::new(vec!["noise".into(), "flag".into()], values).unwrap();
        (m, labels)
    }

    fn params() -> GbdtParams {
        GbdtParams {
            num_boost_round: 30,
            min_samples_leaf: 5,
            subsample: 1.0,
            ..GbdtParams::default()
        }
    }

    #[test]
    fn learns_the_signal_feature() {
        let (train_x, train_y) = synthetic(1000, 1);
        let (valid_x, valid_y) = synthetic(300, 2);
        let model = GradientBoostedTrees::new(params())
            .fit(
                Dataset::new(&train_x, &train_y).unwrap(),
                Some(Dataset::new(&valid_x, &valid_y).unwrap()),
            )
            .unwrap();

        assert!(model.valid_auc().unwrap() > 0.8);
        assert_eq!(model.feature_importance()[0].feature, "signal");
        assert_eq!(model.n_trees(), model.best_iteration());
        assert!(model.best_iteration() <= model.rounds());

        let scores = model.predict(&valid_x).unwrap();
        assert_eq!(scores.len(), valid_x.n_rows());
        assert!(scores.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn stops_once_validation_auc_plateaus() {
        let (train_x, train_y) = separable(200, 1);
        let (valid_x, valid_y) = separable(100, 2);
        let params = GbdtParams {
            max_depth: 3,
            ..params()
        };
        let model = GradientBoostedTrees::new(params.clone())
            .fit(
                Dataset::new(&train_x, &train_y).unwrap(),
                Some(Dataset::new(&valid_x, &valid_y).unwrap()),
            )
            .unwrap();

        // The first tree already ranks every positive above every negative.
        assert_eq!(model.valid_auc(), Some(1.0));
        assert!(model.rounds() < params.num_boost_round);
        assert_eq!(model.rounds() - model.best_iteration(), params.early_stopping_rounds);
        assert_eq!(model.best_iteration(), 1);
        assert_eq!(model.n_trees(), model.best_iteration());
    }

    #[test]
    fn disabled_early_stopping_runs_every_round() {
        let (train_x, train_y) = separable(200, 3);
        let (valid_x, valid_y) = separable(100, 4);
        let model = GradientBoostedTrees::new(GbdtParams {
            early_stopping_rounds: 0,
            ..params()
        })
        .fit(
            Dataset::new(&train_x, &train_y).unwrap(),
            Some(Dataset::new(&valid_x, &valid_y).unwrap()),
        )
        .unwrap();

        assert_eq!(model.rounds(), 30);
        assert_eq!(model.best_iteration(), 1);
        assert_eq!(model.n_trees(), 1);
    }

    #[test]
    fn training_is_deterministic() {
        let (x, y) = synthetic(500, 3);
        let fit = || {
            GradientBoostedTrees::new(GbdtParams {
                subsample: 0.5,
                ..params()
            })
            .fit(Dataset::new(&x, &y).unwrap(), None)
            .unwrap()
        };
        let a = fit();
        let b = fit();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
        assert_eq!(a.feature_importance(), b.feature_importance());
        assert_eq!(a.rounds(), 30);
        assert_eq!(a.valid_auc(), None);
    }

    #[test]
    fn single_class_is_rejected() {
        let (x, _) = synthetic(50, 4);
        let y = vec![0u8; 50];
        let err = GradientBoostedTrees::new(params())
            .fit(Dataset::new(&x, &y).unwrap(), None)
            .unwrap_err();
        assert_eq!(err.code(), "E4001");
    }

    #[test]
    fn empty_training_set_is_rejected() {
        let x = FeatureMatrix::new(vec!["a".into()], vec![]).unwrap();
        let err = GradientBoostedTrees::new(params())
            .fit(Dataset::new(&x, &[]).unwrap(), None)
            .unwrap_err();
        assert_eq!(err.code(), "E4002");
    }

    #[test]
    fn predict_rejects_foreign_schema() {
        let (x, y) = synthetic(200, 5);
        let model = GradientBoostedTrees::new(params())
            .fit(Dataset::new(&x, &y).unwrap(), None)
            .unwrap();
        let other = FeatureMatrix::new(vec!["signal".into(), "noise".into()], vec![0.0, 0.0]).unwrap();
        assert_eq!(model.predict(&other).unwrap_err().code(), "E3002");
    }

    #[test]
    fn invalid_params_are_rejected() {
        let config = ModelConfig {
            learning_rate: 0.0,
            ..ModelConfig::default()
        };
        assert_eq!(GbdtParams::from_config(&config, 42).unwrap_err().code(), "E4003");

        let oversampled = ModelConfig {
            subsample: 1.5,
            ..ModelConfig::default()
        };
        assert_eq!(GbdtParams::from_config(&oversampled, 42).unwrap_err().code(), "E4003");

        let flat = ModelConfig {
            max_depth: 0,
            ..ModelConfig::default()
        };
        assert_eq!(GbdtParams::from_config(&flat, 42).unwrap_err().code(), "E4003");
    }

    #[test]
    fn log_loss_rewards_confident_correct_scores() {
        assert!(log_loss(&[1, 0], &[0.9, 0.1]) < log_loss(&[1, 0], &[0.6, 0.4]));
        assert!(log_loss(&[1], &[0.0]).is_finite());
        assert_eq!(log_loss(&[], &[]), 0.0);
    }
}
