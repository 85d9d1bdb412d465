use ahash::AHashMap;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use mogu_shared::{AppError, AppResult, ErrorCode, Post, User};

use super::aggregates::{left_join_counts, participations_per_post, participations_per_user};
use super::encoding::OneHotEncoder;
use super::DISTANCE_COLUMN;
use crate::geo::{parse_point, Coordinate, Geocoder};
use crate::snapshot::Snapshot;

const SECONDS_PER_DAY: i64 = 86_400;

pub const USER_PARTICIPATIONS_COLUMN: &str = "user_total_participations";
pub const POST_POPULARITY_COLUMN: &str = "post_popularity";
pub const POST_ELAPSED_DAYS_COLUMN: &str = "post_elapsed_days";

/// Whole days between `created_at` and `now`, floored.
pub fn elapsed_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Encoders fitted on one snapshot. Their column names define the model's
/// feature schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureEncoders {
    pub age_group: OneHotEncoder,
    pub gender: OneHotEncoder,
    pub household_size: OneHotEncoder,
    pub neighborhood: OneHotEncoder,
    pub category: OneHotEncoder,
}

/// User-keyed feature table. Coordinates are held beside the model columns;
/// they only feed the pairwise distance.
#[derive(Debug, Clone)]
pub struct UserFeatureTable {
    ids: Vec<Uuid>,
    index: AHashMap<Uuid, usize>,
    coordinates: Vec<Coordinate>,
    participation_counts: Vec<u32>,
    columns: Vec<String>,
    values: Vec<f64>,
}

impl UserFeatureTable {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn position(&self, id: &Uuid) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn coordinate(&self, row: usize) -> Coordinate {
        self.coordinates[row]
    }

    pub fn participation_count(&self, row: usize) -> u32 {
        self.participation_counts[row]
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.width();
        &self.values[row * width..(row + 1) * width]
    }
}

/// Post-keyed feature table.
#[derive(Debug, Clone)]
pub struct PostFeatureTable {
    ids: Vec<Uuid>,
    index: AHashMap<Uuid, usize>,
    coordinates: Vec<Coordinate>,
    popularity: Vec<u32>,
    elapsed_days: Vec<i64>,
    columns: Vec<String>,
    values: Vec<f64>,
}

impl PostFeatureTable {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn position(&self, id: &Uuid) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn coordinate(&self, row: usize) -> Coordinate {
        self.coordinates[row]
    }

    pub fn popularity(&self, row: usize) -> u32 {
        self.popularity[row]
    }

    pub fn elapsed_days(&self, row: usize) -> i64 {
        self.elapsed_days[row]
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn row(&self, row: usize) -> &[f64] {
        let width = self.width();
        &self.values[row * width..(row + 1) * width]
    }
}

#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub users: UserFeatureTable,
    pub posts: PostFeatureTable,
    pub encoders: FeatureEncoders,
    pub reference_time: DateTime<Utc>,
}

impl FeatureSet {
    /// Column names of a candidate row: user columns, post columns, distance.
    pub fn schema(&self) -> Vec<String> {
        self.users
            .columns()
            .iter()
            .chain(self.posts.columns())
            .cloned()
            .chain(std::iter::once(DISTANCE_COLUMN.to_string()))
            .collect()
    }

    pub fn width(&self) -> usize {
        self.users.width() + self.posts.width() + 1
    }
}

pub struct FeatureBuilder {
    reference_time: DateTime<Utc>,
    geocoder: Geocoder,
}

impl FeatureBuilder {
    /// `reference_time` is "now" for elapsed-day features; pass the wall
    /// clock at query time.
    pub fn new(reference_time: DateTime<Utc>, jitter_sigma_deg: f64) -> AppResult<Self> {
        Ok(Self {
            reference_time,
            geocoder: Geocoder::new(jitter_sigma_deg)?,
        })
    }

    pub fn build<R: Rng + ?Sized>(&self, snapshot: &Snapshot, rng: &mut R) -> AppResult<FeatureSet> {
        let encoders = FeatureEncoders {
            age_group: OneHotEncoder::fit("age_group", snapshot.users.iter().map(|u| u.age_group.label())),
            gender: OneHotEncoder::fit("gender", snapshot.users.iter().map(|u| u.gender.label())),
            household_size: OneHotEncoder::fit(
                "household_size",
                snapshot.users.iter().map(|u| u.household_size.label()),
            ),
            neighborhood: OneHotEncoder::fit(
                "neighborhood",
                snapshot.users.iter().map(|u| u.neighborhood.as_str()),
            ),
            category: OneHotEncoder::fit("category", snapshot.posts.iter().map(|p| p.category.label())),
        };

        let users = self.build_users(snapshot, &encoders, rng)?;
        let posts = self.build_posts(snapshot, &encoders)?;

        tracing::info!(
            users = users.len(),
            user_columns = users.width(),
            posts = posts.len(),
            post_columns = posts.width(),
            reference_time = %self.reference_time,
            "feature tables built"
        );

        Ok(FeatureSet {
            users,
            posts,
            encoders,
            reference_time: self.reference_time,
        })
    }

    fn build_users<R: Rng + ?Sized>(
        &self,
        snapshot: &Snapshot,
        encoders: &FeatureEncoders,
        rng: &mut R,
    ) -> AppResult<UserFeatureTable> {
        let users: &[User] = &snapshot.users;
        let coordinates = self.geocoder.locate_users(users, rng)?;
        let per_user = participations_per_user(&snapshot.participations);
        let participation_counts = left_join_counts(users.iter().map(|u| &u.id), &per_user);

        let groups = [
            &encoders.age_group,
            &encoders.gender,
            &encoders.household_size,
            &encoders.neighborhood,
        ];
        let mut columns = vec![USER_PARTICIPATIONS_COLUMN.to_string()];
        for enc in groups {
            columns.extend(enc.column_names());
        }

        let width = columns.len();
        let mut values = vec![0.0; users.len() * width];
        for (i, (user, row)) in users.iter().zip(values.chunks_mut(width)).enumerate() {
            row[0] = f64::from(participation_counts[i]);
            let labels = [
                user.age_group.label(),
                user.gender.label(),
                user.household_size.label(),
                user.neighborhood.as_str(),
            ];
            let mut offset = 1;
            for (enc, label) in groups.iter().zip(labels) {
                enc.encode_into(label, &mut row[offset..offset + enc.width()])?;
                offset += enc.width();
            }
        }

        let index = users.iter().enumerate().map(|(i, u)| (u.id, i)).collect();
        Ok(UserFeatureTable {
            ids: users.iter().map(|u| u.id).collect(),
            index,
            coordinates,
            participation_counts,
            columns,
            values,
        })
    }

    fn build_posts(&self, snapshot: &Snapshot, encoders: &FeatureEncoders) -> AppResult<PostFeatureTable> {
        let posts: &[Post] = &snapshot.posts;
        let coordinates = posts
            .iter()
            .map(|post| {
                parse_point(&post.spot).map_err(|e| {
                    AppError::with_details(
                        ErrorCode::MalformedSpot,
                        format!("post {}: {e}", post.id),
                        serde_json::json!({ "post_id": post.id, "spot": post.spot }),
                    )
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let per_post = participations_per_post(&snapshot.participations);
        let popularity = left_join_counts(posts.iter().map(|p| &p.id), &per_post);
        let elapsed: Vec<i64> = posts
            .iter()
            .map(|p| elapsed_days(p.created_at, self.reference_time))
            .collect();

        let mut columns = vec![
            POST_POPULARITY_COLUMN.to_string(),
            POST_ELAPSED_DAYS_COLUMN.to_string(),
        ];
        columns.extend(encoders.category.column_names());

        let width = columns.len();
        let mut values = vec![0.0; posts.len() * width];
        for (i, (post, row)) in posts.iter().zip(values.chunks_mut(width)).enumerate() {
            row[0] = f64::from(popularity[i]);
            row[1] = elapsed[i] as f64;
            encoders.category.encode_into(post.category.label(), &mut row[2..])?;
        }

        let index = posts.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        Ok(PostFeatureTable {
            ids: posts.iter().map(|p| p.id).collect(),
            index,
            coordinates,
            popularity,
            elapsed_days: elapsed,
            columns,
            values,
        })
    }
}
