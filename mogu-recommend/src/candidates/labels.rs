use ahash::{AHashMap, AHashSet};
use uuid::Uuid;

use mogu_shared::Participation;

/// Hash index over observed (user, post) participation pairs.
#[derive(Debug, Clone, Default)]
pub struct ParticipationIndex {
    pairs: AHashSet<(Uuid, Uuid)>,
    by_user: AHashMap<Uuid, AHashSet<Uuid>>,
}

impl ParticipationIndex {
    pub fn new(participations: &[Participation]) -> Self {
        let mut index = Self::default();
        for p in participations {
            index.pairs.insert((p.user_id, p.post_id));
            index.by_user.entry(p.user_id).or_default().insert(p.post_id);
        }
        index
    }

    pub fn contains(&self, user_id: &Uuid, post_id: &Uuid) -> bool {
        self.pairs.contains(&(*user_id, *post_id))
    }

    pub fn label(&self, user_id: &Uuid, post_id: &Uuid) -> u8 {
        u8::from(self.contains(user_id, post_id))
    }

    pub fn joined_by(&self, user_id: &Uuid) -> Option<&AHashSet<Uuid>> {
        self.by_user.get(user_id)
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
