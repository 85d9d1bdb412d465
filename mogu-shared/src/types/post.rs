use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A group-buy listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    #[validate(length(min = 1))]
    pub title: String,
    pub category: Category,
    #[validate(range(min = 1))]
    pub target_count: u32,
    pub created_at: DateTime<Utc>,
    /// WKT point, longitude first: `POINT(<lon> <lat>)`.
    pub spot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "식품/간식")]
    Food,
    #[serde(rename = "생활용품")]
    Household,
    #[serde(rename = "패션/잡화")]
    Fashion,
    #[serde(rename = "뷰티/헬스케어")]
    Beauty,
}

impl Category {
    pub const ALL: [Category; 4] = [Self::Food, Self::Household, Self::Fashion, Self::Beauty];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Food => "식품/간식",
            Self::Household => "생활용품",
            Self::Fashion => "패션/잡화",
            Self::Beauty => "뷰티/헬스케어",
        }
    }
}
