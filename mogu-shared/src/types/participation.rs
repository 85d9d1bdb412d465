use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's enrollment in one post's group-buy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participation {
    pub user_id: Uuid,
    pub post_id: Uuid,
}

impl Participation {
    pub fn new(user_id: Uuid, post_id: Uuid) -> Self {
        Self { user_id, post_id }
    }
}
