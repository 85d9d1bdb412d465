use std::path::PathBuf;

use serde::Deserialize;

use mogu_shared::{AppError, AppResult, ErrorCode};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_jitter_sigma")]
    pub jitter_sigma_deg: f64,
    #[serde(default = "default_validation_fraction")]
    pub validation_fraction: f64,
    #[serde(default)]
    pub exclude_own_posts: bool,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratorConfig {
    #[serde(default = "default_num_users")]
    pub num_users: usize,
    #[serde(default = "default_num_posts")]
    pub num_posts: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_num_boost_round")]
    pub num_boost_round: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    /// Fraction of training rows each tree is fitted on.
    #[serde(default = "default_subsample")]
    pub subsample: f64,
    #[serde(default = "default_l2")]
    pub l2_regularization: f64,
    #[serde(default = "default_early_stopping")]
    pub early_stopping_rounds: usize,
    #[serde(default = "default_log_period")]
    pub log_period: usize,
}

fn default_snapshot_dir() -> PathBuf { PathBuf::from("data/snapshot") }
fn default_output_dir() -> PathBuf { PathBuf::from("data/output") }
fn default_seed() -> u64 { 42 }
fn default_top_k() -> usize { 10 }
fn default_jitter_sigma() -> f64 { 0.005 }
fn default_validation_fraction() -> f64 { 0.2 }
fn default_num_users() -> usize { 2000 }
fn default_num_posts() -> usize { 800 }
fn default_num_boost_round() -> usize { 100 }
fn default_learning_rate() -> f64 { 0.1 }
fn default_max_depth() -> usize { 5 }
fn default_min_samples_leaf() -> usize { 20 }
fn default_subsample() -> f64 { 0.25 }
fn default_l2() -> f64 { 1.0 }
fn default_early_stopping() -> usize { 10 }
fn default_log_period() -> usize { 20 }

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_users: default_num_users(),
            num_posts: default_num_posts(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            num_boost_round: default_num_boost_round(),
            learning_rate: default_learning_rate(),
            max_depth: default_max_depth(),
            min_samples_leaf: default_min_samples_leaf(),
            subsample: default_subsample(),
            l2_regularization: default_l2(),
            early_stopping_rounds: default_early_stopping(),
            log_period: default_log_period(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            output_dir: default_output_dir(),
            seed: default_seed(),
            top_k: default_top_k(),
            jitter_sigma_deg: default_jitter_sigma(),
            validation_fraction: default_validation_fraction(),
            exclude_own_posts: false,
            generator: GeneratorConfig::default(),
            model: ModelConfig::default(),
        }
    }
}

impl AppConfig {
    /// Layered load: optional `mogu.toml`, then `MOGU__*` environment variables.
    pub fn load() -> anyhow::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("mogu").required(false))
            .add_source(
                config::Environment::with_prefix("MOGU")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Self = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if !(self.validation_fraction > 0.0 && self.validation_fraction < 1.0) {
            return Err(AppError::new(
                ErrorCode::ConfigError,
                format!("validation_fraction must be in (0, 1), got {}", self.validation_fraction),
            ));
        }
        if !(self.jitter_sigma_deg >= 0.0 && self.jitter_sigma_deg.is_finite()) {
            return Err(AppError::new(
                ErrorCode::InvalidJitter,
                format!("jitter_sigma_deg must be finite and non-negative, got {}", self.jitter_sigma_deg),
            ));
        }
        if self.top_k == 0 {
            return Err(AppError::new(ErrorCode::ConfigError, "top_k must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_batch_schedule() {
        let config = AppConfig::default();
        assert_eq!(config.seed, 42);
        assert_eq!(config.top_k, 10);
        assert_eq!(config.model.num_boost_round, 100);
        assert_eq!(config.model.early_stopping_rounds, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_source_deserializes_to_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.generator.num_users, 2000);
        assert_eq!(config.generator.num_posts, 800);
        assert!((config.jitter_sigma_deg - 0.005).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_degenerate_split() {
        let config = AppConfig {
            validation_fraction: 1.0,
            ..AppConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().code(), "E0006");
    }

    #[test]
    fn rejects_negative_or_nan_jitter() {
        for sigma in [-0.005, f64::NAN, f64::INFINITY] {
            let config = AppConfig {
                jitter_sigma_deg: sigma,
                ..AppConfig::default()
            };
            assert_eq!(config.validate().unwrap_err().code(), "E2003");
        }

        let exact = AppConfig {
            jitter_sigma_deg: 0.0,
            ..AppConfig::default()
        };
        assert!(exact.validate().is_ok());
    }
}
