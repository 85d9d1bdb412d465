//! Persistent snapshot of the three source tables as UTF-8 JSON documents.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use ahash::AHashSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use mogu_shared::{AppError, AppResult, ErrorCode, Participation, Post, User};

pub const USERS_FILE: &str = "users.json";
pub const POSTS_FILE: &str = "posts.json";
pub const PARTICIPATIONS_FILE: &str = "participations.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub users: Vec<User>,
    pub posts: Vec<Post>,
    pub participations: Vec<Participation>,
}

impl Snapshot {
    pub fn new(users: Vec<User>, posts: Vec<Post>, participations: Vec<Participation>) -> Self {
        Self {
            users,
            posts,
            participations,
        }
    }

    pub fn load(dir: &Path) -> AppResult<Self> {
        let snapshot = Self {
            users: read_table(&dir.join(USERS_FILE))?,
            posts: read_table(&dir.join(POSTS_FILE))?,
            participations: read_table(&dir.join(PARTICIPATIONS_FILE))?,
        };
        snapshot.validate()?;

        tracing::info!(
            dir = %dir.display(),
            users = snapshot.users.len(),
            posts = snapshot.posts.len(),
            participations = snapshot.participations.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    pub fn save(&self, dir: &Path) -> AppResult<()> {
        fs::create_dir_all(dir)?;
        write_table(&dir.join(USERS_FILE), &self.users)?;
        write_table(&dir.join(POSTS_FILE), &self.posts)?;
        write_table(&dir.join(PARTICIPATIONS_FILE), &self.participations)?;

        tracing::info!(
            dir = %dir.display(),
            users = self.users.len(),
            posts = self.posts.len(),
            participations = self.participations.len(),
            "snapshot saved"
        );
        Ok(())
    }

    /// Record-level checks. Duplicate participation pairs are accepted and
    /// only reported.
    pub fn validate(&self) -> AppResult<()> {
        for user in &self.users {
            user.validate()?;
        }
        for post in &self.posts {
            post.validate()?;
        }

        ensure_unique("user", self.users.iter().map(|u| u.id))?;
        ensure_unique("post", self.posts.iter().map(|p| p.id))?;

        let duplicates = self.duplicate_participations();
        if duplicates > 0 {
            tracing::warn!(
                duplicates,
                "participation table contains repeated (user, post) pairs; counts will include them"
            );
        }
        Ok(())
    }

    pub fn duplicate_participations(&self) -> usize {
        let mut seen = AHashSet::with_capacity(self.participations.len());
        self.participations
            .iter()
            .filter(|p| !seen.insert((p.user_id, p.post_id)))
            .count()
    }
}

fn ensure_unique(entity: &str, ids: impl Iterator<Item = Uuid>) -> AppResult<()> {
    let mut seen = AHashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::with_details(
                ErrorCode::DuplicateId,
                format!("duplicate {entity} id {id}"),
                serde_json::json!({ "entity": entity, "id": id }),
            ));
        }
    }
    Ok(())
}

fn read_table<T: DeserializeOwned>(path: &Path) -> AppResult<Vec<T>> {
    let file = fs::File::open(path).map_err(|e| {
        AppError::new(
            ErrorCode::SnapshotMissing,
            format!("cannot open {}: {e}", path.display()),
        )
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        AppError::new(
            ErrorCode::SnapshotCorrupt,
            format!("cannot parse {}: {e}", path.display()),
        )
    })
}

fn write_table<T: Serialize>(path: &Path, rows: &[T]) -> AppResult<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer.flush()?;
    Ok(())
}
