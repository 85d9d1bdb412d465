//! Feature building: per-user and per-post feature tables.

pub mod aggregates;
pub mod builder;
pub mod encoding;

pub use builder::{elapsed_days, FeatureBuilder, FeatureSet, PostFeatureTable, UserFeatureTable};
pub use encoding::OneHotEncoder;

pub const DISTANCE_COLUMN: &str = "distance_km";
