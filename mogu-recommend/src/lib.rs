pub mod candidates;
pub mod config;
pub mod features;
pub mod generator;
pub mod geo;
pub mod pipeline;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod snapshot;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use recommend::{Recommendation, Recommender};
pub use snapshot::Snapshot;
