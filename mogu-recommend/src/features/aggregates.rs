use ahash::AHashMap;
use uuid::Uuid;

use mogu_shared::Participation;

/// Participation rows per user id. Duplicate rows count twice.
pub fn participations_per_user(participations: &[Participation]) -> AHashMap<Uuid, u32> {
    let mut counts = AHashMap::new();
    for p in participations {
        *counts.entry(p.user_id).or_insert(0) += 1;
    }
    counts
}

/// Participation rows per post id. Duplicate rows count twice.
pub fn participations_per_post(participations: &[Participation]) -> AHashMap<Uuid, u32> {
    let mut counts = AHashMap::new();
    for p in participations {
        *counts.entry(p.post_id).or_insert(0) += 1;
    }
    counts
}

/// Left join of `ids` against `counts`; ids with no rows get 0.
pub fn left_join_counts<'a>(
    ids: impl IntoIterator<Item = &'a Uuid>,
    counts: &AHashMap<Uuid, u32>,
) -> Vec<u32> {
    ids.into_iter()
        .map(|id| counts.get(id).copied().unwrap_or(0))
        .collect()
}
