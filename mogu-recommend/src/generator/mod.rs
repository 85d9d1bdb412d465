//! Seeded synthetic marketplace: users, posts and persona-weighted
//! participations.

pub mod catalog;
pub mod persona;

use chrono::{DateTime, Duration, Utc};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use uuid::Uuid;

use mogu_shared::{AgeGroup, AppError, AppResult, Gender, HouseholdSize, Participation, Post, User};

use self::catalog::{CATALOG, GIVEN_NAMES, NICKNAME_WORDS, SURNAMES};
use crate::config::GeneratorConfig;
use crate::geo::geocoder::NEIGHBORHOODS;
use crate::geo::{format_point, Coordinate};
use crate::snapshot::Snapshot;

pub use persona::{persona_weight, sample_weighted};

const AGE_RANGE: std::ops::RangeInclusive<u32> = 20..=55;
const HOUSEHOLD_WEIGHTS: [f64; 3] = [0.6, 0.25, 0.15];
const POST_WINDOW_DAYS: i64 = 60;
const TARGET_COUNT_RANGE: std::ops::RangeInclusive<u32> = 3..=8;
const MIN_PARTICIPANTS: u32 = 2;

const SEOUL_LAT: (f64, f64) = (37.43, 37.70);
const SEOUL_LON: (f64, f64) = (126.73, 127.18);

#[derive(Debug, Clone)]
pub struct SnapshotGenerator {
    num_users: usize,
    num_posts: usize,
    now: DateTime<Utc>,
}

impl SnapshotGenerator {
    pub fn new(config: &GeneratorConfig, now: DateTime<Utc>) -> Self {
        Self {
            num_users: config.num_users,
            num_posts: config.num_posts,
            now,
        }
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> AppResult<Snapshot> {
        if self.num_users == 0 && self.num_posts > 0 {
            return Err(AppError::bad_request("posts need at least one user to author them"));
        }

        let users = self.users(rng)?;
        let posts = self.posts(&users, rng);
        let participations = participations(&users, &posts, rng);

        tracing::info!(
            users = users.len(),
            posts = posts.len(),
            participations = participations.len(),
            "synthetic snapshot generated"
        );
        Ok(Snapshot::new(users, posts, participations))
    }

    fn users<R: Rng + ?Sized>(&self, rng: &mut R) -> AppResult<Vec<User>> {
        let households = WeightedIndex::new(HOUSEHOLD_WEIGHTS).map_err(|e| AppError::internal(e.to_string()))?;

        Ok((0..self.num_users)
            .map(|i| {
                let name = format!(
                    "{}{}",
                    SURNAMES[rng.gen_range(0..SURNAMES.len())],
                    GIVEN_NAMES[rng.gen_range(0..GIVEN_NAMES.len())]
                );
                let nickname = format!("{}_{i}", NICKNAME_WORDS[rng.gen_range(0..NICKNAME_WORDS.len())]);
                let age_group = AgeGroup::from_age(rng.gen_range(AGE_RANGE));
                let gender = Gender::ALL[rng.gen_range(0..Gender::ALL.len())];
                let household_size = HouseholdSize::ALL[households.sample(rng)];
                let (neighborhood, _) = NEIGHBORHOODS[rng.gen_range(0..NEIGHBORHOODS.len())];

                User {
                    id: random_uuid(rng),
                    name,
                    nickname,
                    age_group,
                    gender,
                    household_size,
                    neighborhood: neighborhood.to_string(),
                }
            })
            .collect())
    }

    fn posts<R: Rng + ?Sized>(&self, users: &[User], rng: &mut R) -> Vec<Post> {
        let window = Duration::days(POST_WINDOW_DAYS).num_seconds();
        (0..self.num_posts)
            .map(|_| {
                let (title, category) = CATALOG[rng.gen_range(0..CATALOG.len())];
                let author = &users[rng.gen_range(0..users.len())];
                let created_at = self.now - Duration::seconds(rng.gen_range(0..window));
                let spot = Coordinate::new(
                    rng.gen_range(SEOUL_LAT.0..SEOUL_LAT.1),
                    rng.gen_range(SEOUL_LON.0..SEOUL_LON.1),
                );

                Post {
                    id: random_uuid(rng),
                    author_id: author.id,
                    title: title.to_string(),
                    category,
                    target_count: rng.gen_range(TARGET_COUNT_RANGE),
                    created_at,
                    spot: format_point(spot),
                }
            })
            .collect()
    }
}

/// For each post, draw between 2 and `target_count` participants from
/// everyone but the author, weighted by persona affinity.
pub fn participations<R: Rng + ?Sized>(users: &[User], posts: &[Post], rng: &mut R) -> Vec<Participation> {
    let mut out = Vec::new();
    for post in posts {
        let n = rng.gen_range(MIN_PARTICIPANTS..=post.target_count.max(MIN_PARTICIPANTS)) as usize;
        let pool: Vec<&User> = users.iter().filter(|u| u.id != post.author_id).collect();
        if pool.len() < n {
            tracing::debug!(post_id = %post.id, pool = pool.len(), wanted = n, "pool too small, skipping post");
            continue;
        }

        let weights: Vec<f64> = pool.iter().map(|u| persona_weight(u, post.category)).collect();
        if weights.iter().sum::<f64>() <= 0.0 {
            tracing::debug!(post_id = %post.id, "all participant weights are zero, skipping post");
            continue;
        }

        match sample_weighted(&weights, n, rng) {
            Some(picked) => out.extend(picked.into_iter().map(|i| Participation::new(pool[i].id, post.id))),
            None => tracing::debug!(post_id = %post.id, wanted = n, "too few weighted users, skipping post"),
        }
    }
    out
}

fn random_uuid<R: Rng + ?Sized>(rng: &mut R) -> Uuid {
    uuid::Builder::from_random_bytes(rng.gen()).into_uuid()
}
