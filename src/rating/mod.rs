//! Rating engine: Elo expected score with a fixed or RD-scaled K-factor
//!
//! This module provides the rating calculations, rating-deviation handling
//! and the profile storage interface the ladder persists through.

pub mod calculator;
pub mod deviation;
pub mod elo;
pub mod engine;
pub mod storage;

// Re-export commonly used types
pub use calculator::RatingCalculator;
pub use deviation::{apply_inactivity_penalty, rd_after_match, rd_with_inactivity, InactivityPolicy};
pub use elo::{
    dynamic_k_factor, expected_score, process_bulk_match_results,
    process_bulk_match_results_in_order, win_probability, RatingPolicy,
};
pub use engine::{EloRatingCalculator, ExtendedEloConfig};
pub use storage::{InMemoryProfileStorage, ProfileStorage};
