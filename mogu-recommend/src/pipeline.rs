//! End-to-end batch run: features, candidate matrix, split, training.

use chrono::{DateTime, Utc};
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use mogu_shared::telemetry::timed_stage;
use mogu_shared::AppResult;

use crate::candidates::{CandidateMatrix, ParticipationIndex};
use crate::config::AppConfig;
use crate::features::{FeatureBuilder, FeatureSet};
use crate::recommend::Recommender;
use crate::report::ModelDiagnostics;
use crate::scoring::{stratified_split, Dataset, GbdtModel, GbdtParams, GradientBoostedTrees, Trainer};
use crate::snapshot::Snapshot;

/// Independent random streams derived from the one configured seed.
pub mod streams {
    pub const JITTER: u64 = 0;
    pub const SPLIT: u64 = 1;
    pub const MODEL: u64 = 2;
    pub const USER_PICK: u64 = 3;
    pub const GENERATOR: u64 = 4;
}

pub fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(stream);
    rng
}

pub struct TrainedPipeline {
    pub features: FeatureSet,
    pub index: ParticipationIndex,
    pub matrix: CandidateMatrix,
    pub model: GbdtModel,
    pub diagnostics: ModelDiagnostics,
}

impl TrainedPipeline {
    pub fn recommender<'a>(&'a self, snapshot: &'a Snapshot, exclude_own_posts: bool) -> Recommender<'a, GbdtModel> {
        Recommender::new(snapshot, &self.features, &self.index, &self.model).exclude_own_posts(exclude_own_posts)
    }
}

pub fn train(snapshot: &Snapshot, config: &AppConfig, reference_time: DateTime<Utc>) -> AppResult<TrainedPipeline> {
    let features = timed_stage("features", || {
        FeatureBuilder::new(reference_time, config.jitter_sigma_deg)?
            .build(snapshot, &mut stream_rng(config.seed, streams::JITTER))
    })?;
    let index = ParticipationIndex::new(&snapshot.participations);
    let matrix = timed_stage("candidates", || CandidateMatrix::build(&features, &index))?;

    let split = stratified_split(
        matrix.labels(),
        config.validation_fraction,
        &mut stream_rng(config.seed, streams::SPLIT),
    );
    let train_x = matrix.features().select_rows(&split.train);
    let train_y: Vec<u8> = split.train.iter().map(|&i| matrix.labels()[i]).collect();
    let valid_x = matrix.features().select_rows(&split.valid);
    let valid_y: Vec<u8> = split.valid.iter().map(|&i| matrix.labels()[i]).collect();
    tracing::info!(
        train_rows = train_y.len(),
        valid_rows = valid_y.len(),
        "train/validation split"
    );

    let model_seed = stream_rng(config.seed, streams::MODEL).next_u64();
    let trainer = GradientBoostedTrees::new(GbdtParams::from_config(&config.model, model_seed)?);
    let valid = if valid_y.is_empty() {
        None
    } else {
        Some(Dataset::new(&valid_x, &valid_y)?)
    };
    let model = timed_stage("training", || trainer.fit(Dataset::new(&train_x, &train_y)?, valid))?;

    let positive_rate = if matrix.is_empty() {
        0.0
    } else {
        matrix.positives() as f64 / matrix.len() as f64
    };
    let diagnostics = ModelDiagnostics::from_model(&model, train_y.len(), valid_y.len(), positive_rate);

    Ok(TrainedPipeline {
        features,
        index,
        matrix,
        model,
        diagnostics,
    })
}

/// Deterministic pick of a target user for runs that do not name one.
pub fn pick_user(snapshot: &Snapshot, seed: u64) -> Option<Uuid> {
    if snapshot.users.is_empty() {
        return None;
    }
    let i = stream_rng(seed, streams::USER_PICK).gen_range(0..snapshot.users.len());
    Some(snapshot.users[i].id)
}
