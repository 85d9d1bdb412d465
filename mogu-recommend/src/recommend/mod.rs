//! Per-user top-K ranking over the scored candidate slice.

use std::cmp::Ordering;

use ahash::AHashMap;
use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mogu_shared::{AppError, AppResult, ErrorCode, Post};

use crate::candidates::{CandidateMatrix, ParticipationIndex};
use crate::features::FeatureSet;
use crate::geo::round_km;
use crate::scoring::Scorer;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub user_id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub category: String,
    pub author_nickname: Option<String>,
    /// Rounded to 2 decimals for display.
    pub distance_km: f64,
    pub score: f64,
}

pub struct Recommender<'a, S: Scorer> {
    features: &'a FeatureSet,
    index: &'a ParticipationIndex,
    scorer: &'a S,
    posts: AHashMap<Uuid, &'a Post>,
    nicknames: AHashMap<Uuid, &'a str>,
    exclude_own_posts: bool,
}

impl<'a, S: Scorer> Recommender<'a, S> {
    pub fn new(
        snapshot: &'a Snapshot,
        features: &'a FeatureSet,
        index: &'a ParticipationIndex,
        scorer: &'a S,
    ) -> Self {
        Self {
            features,
            index,
            scorer,
            posts: snapshot.posts.iter().map(|p| (p.id, p)).collect(),
            nicknames: snapshot
                .users
                .iter()
                .map(|u| (u.id, u.nickname.as_str()))
                .collect(),
            exclude_own_posts: false,
        }
    }

    pub fn exclude_own_posts(mut self, exclude: bool) -> Self {
        self.exclude_own_posts = exclude;
        self
    }

    /// Highest-scoring posts the user has not joined, best first. Equal
    /// scores are ordered by post id.
    pub fn recommend(&self, user_id: Uuid, k: usize) -> AppResult<Vec<Recommendation>> {
        let user = self.features.users.position(&user_id).ok_or_else(|| {
            AppError::with_details(
                ErrorCode::UserNotFound,
                format!("user {user_id} is not in the snapshot"),
                serde_json::json!({ "user_id": user_id }),
            )
        })?;

        let slice = CandidateMatrix::for_user(self.features, self.index, user);
        let scores = self.scorer.predict(slice.features())?;

        let post_ids = self.features.posts.ids();
        let mut ranked: Vec<(usize, f64)> = slice
            .keys()
            .iter()
            .enumerate()
            .filter(|(row, _)| slice.labels()[*row] == 0)
            .filter(|(_, key)| !self.exclude_own_posts || !self.is_author(user_id, post_ids[key.post as usize]))
            .map(|(row, _)| (row, scores[row]))
            .collect();

        let post_of = |row: usize| post_ids[slice.keys()[row].post as usize];
        ranked.sort_by(|a, b| rank_order((a.1, post_of(a.0)), (b.1, post_of(b.0))));
        ranked.truncate(k);

        let recommendations: Vec<Recommendation> = ranked
            .into_iter()
            .map(|(row, score)| {
                let post_id = post_ids[slice.keys()[row].post as usize];
                self.enrich(user_id, post_id, slice.distance_km(row), score)
            })
            .collect::<AppResult<_>>()?;

        counter!("mogu_recommendations_total").increment(recommendations.len() as u64);
        if recommendations.is_empty() {
            tracing::warn!(%user_id, "no unjoined posts left to recommend");
        } else {
            tracing::info!(%user_id, k, returned = recommendations.len(), "recommendations ranked");
        }
        Ok(recommendations)
    }

    fn is_author(&self, user_id: Uuid, post_id: Uuid) -> bool {
        self.posts.get(&post_id).map_or(false, |p| p.author_id == user_id)
    }

    fn enrich(&self, user_id: Uuid, post_id: Uuid, distance_km: f64, score: f64) -> AppResult<Recommendation> {
        let post = self
            .posts
            .get(&post_id)
            .ok_or_else(|| AppError::internal(format!("post {post_id} missing from snapshot")))?;
        Ok(Recommendation {
            user_id,
            post_id,
            post_title: post.title.clone(),
            category: post.category.label().to_string(),
            author_nickname: self.nicknames.get(&post.author_id).map(|n| n.to_string()),
            distance_km: round_km(distance_km),
            score,
        })
    }
}

/// Descending score, then ascending post id.
fn rank_order(a: (f64, Uuid), b: (f64, Uuid)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1))
}
