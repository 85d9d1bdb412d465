use std::iter::FusedIterator;

use uuid::Uuid;

use super::labels::ParticipationIndex;
use super::matrix::write_row;
use crate::features::FeatureSet;

/// Row position of one (user, post) pair inside the feature tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateKey {
    pub user: u32,
    pub post: u32,
}

/// Lazy user-major walk over the cross product, the same order the
/// materialized matrix uses.
#[derive(Debug, Clone)]
pub struct CandidatePairs {
    n_users: usize,
    n_posts: usize,
    next: usize,
}

impl CandidatePairs {
    pub fn new(n_users: usize, n_posts: usize) -> Self {
        Self {
            n_users,
            n_posts,
            next: 0,
        }
    }

    fn total(&self) -> usize {
        self.n_users.saturating_mul(self.n_posts)
    }
}

impl Iterator for CandidatePairs {
    type Item = CandidateKey;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total() {
            return None;
        }
        let key = CandidateKey {
            user: (self.next / self.n_posts) as u32,
            post: (self.next % self.n_posts) as u32,
        };
        self.next += 1;
        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CandidatePairs {}
impl FusedIterator for CandidatePairs {}

/// One fully built candidate row.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub features: Vec<f64>,
    pub distance_km: f64,
    pub label: u8,
}

/// Streams candidate rows one at a time instead of materializing the matrix.
/// Row content and order match [`super::CandidateMatrix::build`].
pub struct CandidateRows<'a> {
    features: &'a FeatureSet,
    labels: &'a ParticipationIndex,
    pairs: CandidatePairs,
}

impl<'a> CandidateRows<'a> {
    pub fn new(features: &'a FeatureSet, labels: &'a ParticipationIndex) -> Self {
        Self {
            features,
            labels,
            pairs: CandidatePairs::new(features.users.len(), features.posts.len()),
        }
    }
}

impl Iterator for CandidateRows<'_> {
    type Item = CandidateRow;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.pairs.next()?;
        let (u, p) = (key.user as usize, key.post as usize);
        let mut row = vec![0.0; self.features.width()];
        let distance_km = write_row(self.features, u, p, &mut row);
        let user_id = self.features.users.ids()[u];
        let post_id = self.features.posts.ids()[p];
        Some(CandidateRow {
            user_id,
            post_id,
            features: row,
            distance_km,
            label: self.labels.label(&user_id, &post_id),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pairs.size_hint()
    }
}

impl ExactSizeIterator for CandidateRows<'_> {}
