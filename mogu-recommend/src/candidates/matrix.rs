use metrics::counter;
use rayon::prelude::*;

use mogu_shared::{AppError, AppResult, ErrorCode};

use super::labels::ParticipationIndex;
use super::pairs::{CandidateKey, CandidatePairs};
use crate::features::FeatureSet;
use crate::geo::great_circle_km;

/// Dense row-major numeric matrix with named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Vec<f64>,
    n_rows: usize,
}

impl FeatureMatrix {
    pub fn new(columns: Vec<String>, values: Vec<f64>) -> AppResult<Self> {
        let width = columns.len();
        if width == 0 || values.len() % width != 0 {
            return Err(AppError::new(
                ErrorCode::FeatureSchemaMismatch,
                format!("{} values do not fill rows of width {width}", values.len()),
            ));
        }
        let n_rows = values.len() / width;
        Ok(Self {
            columns,
            values,
            n_rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.width();
        &self.values[row * width..(row + 1) * width]
    }

    pub fn get(&self, row: usize, column: usize) -> f64 {
        self.values[row * self.width() + column]
    }

    pub fn select_rows(&self, rows: &[usize]) -> FeatureMatrix {
        let mut values = Vec::with_capacity(rows.len() * self.width());
        for &r in rows {
            values.extend_from_slice(self.row(r));
        }
        FeatureMatrix {
            columns: self.columns.clone(),
            values,
            n_rows: rows.len(),
        }
    }
}

/// Copies user and post features for one pair into `out` and appends the
/// great-circle distance. Returns the distance.
pub(crate) fn write_row(features: &FeatureSet, user: usize, post: usize, out: &mut [f64]) -> f64 {
    let uw = features.users.width();
    let pw = features.posts.width();
    out[..uw].copy_from_slice(features.users.row(user));
    out[uw..uw + pw].copy_from_slice(features.posts.row(post));

    let distance = great_circle_km(features.users.coordinate(user), features.posts.coordinate(post));
    out[uw + pw] = distance;
    distance
}

/// Materialized candidate rows with labels.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateMatrix {
    keys: Vec<CandidateKey>,
    features: FeatureMatrix,
    labels: Vec<u8>,
}

impl CandidateMatrix {
    /// Full cross product. Each user's block of rows is filled in parallel at
    /// a fixed offset, so row order is deterministic.
    pub fn build(features: &FeatureSet, index: &ParticipationIndex) -> AppResult<Self> {
        let n_users = features.users.len();
        let n_posts = features.posts.len();
        let width = features.width();

        let rows = n_users
            .checked_mul(n_posts)
            .filter(|rows| rows.checked_mul(width).is_some())
            .ok_or_else(|| {
                AppError::with_details(
                    ErrorCode::CandidateMatrixTooLarge,
                    format!("{n_users} users x {n_posts} posts does not fit in memory"),
                    serde_json::json!({ "users": n_users, "posts": n_posts, "width": width }),
                )
            })?;

        let mut values = vec![0.0; rows * width];
        if rows > 0 {
            values
                .par_chunks_mut(n_posts * width)
                .enumerate()
                .for_each(|(user, block)| {
                    for (post, row) in block.chunks_mut(width).enumerate() {
                        write_row(features, user, post, row);
                    }
                });
        }

        let keys: Vec<CandidateKey> = CandidatePairs::new(n_users, n_posts).collect();
        let labels = Self::label_keys(features, index, &keys);

        let matrix = Self {
            keys,
            features: FeatureMatrix {
                columns: features.schema(),
                values,
                n_rows: rows,
            },
            labels,
        };

        let positives = matrix.positives();
        counter!("mogu_candidate_rows_total").increment(rows as u64);
        counter!("mogu_positive_labels_total").increment(positives as u64);
        tracing::info!(rows, positives, width, "candidate matrix built");

        Ok(matrix)
    }

    /// One user's slice of the cross product, identical to the matching rows
    /// of [`CandidateMatrix::build`].
    pub fn for_user(features: &FeatureSet, index: &ParticipationIndex, user: usize) -> Self {
        let n_posts = features.posts.len();
        let width = features.width();

        let mut values = vec![0.0; n_posts * width];
        for (post, row) in values.chunks_mut(width).enumerate() {
            write_row(features, user, post, row);
        }

        let keys: Vec<CandidateKey> = (0..n_posts)
            .map(|post| CandidateKey {
                user: user as u32,
                post: post as u32,
            })
            .collect();
        let labels = Self::label_keys(features, index, &keys);

        Self {
            keys,
            features: FeatureMatrix {
                columns: features.schema(),
                values,
                n_rows: n_posts,
            },
            labels,
        }
    }

    fn label_keys(features: &FeatureSet, index: &ParticipationIndex, keys: &[CandidateKey]) -> Vec<u8> {
        let user_ids = features.users.ids();
        let post_ids = features.posts.ids();
        keys.par_iter()
            .map(|k| index.label(&user_ids[k.user as usize], &post_ids[k.post as usize]))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[CandidateKey] {
        &self.keys
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|l| **l == 1).count()
    }

    /// Full-precision distance of one row (the last feature column).
    pub fn distance_km(&self, row: usize) -> f64 {
        self.features.get(row, self.features.width() - 1)
    }
}
