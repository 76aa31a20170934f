//! Pong Ladder - Elo ratings for office ping-pong
//!
//! This crate provides the rating engine (expected score, fixed or RD-scaled
//! K-factor, single-match and bulk updates, rating deviation) and a small
//! match-request ladder that applies confirmed results to player profiles.

pub mod config;
pub mod error;
pub mod ladder;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LadderError, Result};
pub use types::*;

// Re-export key components
pub use ladder::LadderManager;
pub use rating::{EloRatingCalculator, RatingCalculator, RatingPolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
