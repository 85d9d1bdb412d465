//! The scoring universe: every user paired with every post.
//!
//! Candidate generation is exhaustive, not sampled. Cost and memory grow as
//! O(users x posts); 2000 users x 800 posts is 1.6M rows.

pub mod labels;
pub mod matrix;
pub mod pairs;

pub use labels::ParticipationIndex;
pub use matrix::{CandidateMatrix, FeatureMatrix};
pub use pairs::{CandidateKey, CandidatePairs, CandidateRow, CandidateRows};
