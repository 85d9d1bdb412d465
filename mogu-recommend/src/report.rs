//! JSON output documents: per-user recommendations and model diagnostics.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use uuid::Uuid;

use mogu_shared::AppResult;

use crate::recommend::Recommendation;
use crate::scoring::gbdt::GbdtModel;
use crate::scoring::{FeatureImportance, Scorer};

pub const DIAGNOSTICS_FILE: &str = "model_diagnostics.json";
const TOP_IMPORTANCE: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDiagnostics {
    /// Validation ROC-AUC at the best iteration; absent without a usable
    /// validation set.
    pub auc: Option<f64>,
    pub best_iteration: usize,
    pub rounds: usize,
    pub train_rows: usize,
    pub valid_rows: usize,
    pub positive_rate: f64,
    pub feature_importance: Vec<FeatureImportance>,
}

impl ModelDiagnostics {
    pub fn from_model(model: &GbdtModel, train_rows: usize, valid_rows: usize, positive_rate: f64) -> Self {
        let mut feature_importance = model.feature_importance();
        feature_importance.truncate(TOP_IMPORTANCE);
        Self {
            auc: model.valid_auc(),
            best_iteration: model.best_iteration(),
            rounds: model.rounds(),
            train_rows,
            valid_rows,
            positive_rate,
            feature_importance,
        }
    }
}

pub fn recommendations_file(k: usize, user_id: Uuid) -> String {
    format!("recommend_top{k}_{user_id}.json")
}

pub fn write_recommendations(dir: &Path, k: usize, user_id: Uuid, rows: &[Recommendation]) -> AppResult<PathBuf> {
    let path = dir.join(recommendations_file(k, user_id));
    write_json(&path, rows)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "recommendations written");
    Ok(path)
}

pub fn write_diagnostics(dir: &Path, diagnostics: &ModelDiagnostics) -> AppResult<PathBuf> {
    let path = dir.join(DIAGNOSTICS_FILE);
    write_json(&path, diagnostics)?;
    tracing::info!(path = %path.display(), auc = ?diagnostics.auc, "diagnostics written");
    Ok(path)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}
