//! Rating calculator trait
//!
//! The ladder talks to the rating engine through this trait so the model in
//! use (fixed K or RD-scaled K) is chosen once, when the calculator is built.

use crate::types::{BulkMatchOutcome, BulkReplayOrder, MatchUpdate, PlayerRating};

/// Trait for calculating rating changes after games
pub trait RatingCalculator: Send + Sync {
    /// Update both players after `winner` beat `loser` in a single game
    fn update_ratings(&self, winner: &PlayerRating, loser: &PlayerRating) -> MatchUpdate;

    /// Replay a batch of `wins_a + wins_b` games between A and B
    ///
    /// # Arguments
    /// * `rating_a`, `rating_b` - Ratings before the batch
    /// * `wins_a`, `wins_b` - Games won by each side
    /// * `order` - Replay order; the ladder always uses the default
    fn process_bulk_match_results(
        &self,
        rating_a: f64,
        rating_b: f64,
        wins_a: u32,
        wins_b: u32,
        order: BulkReplayOrder,
    ) -> BulkMatchOutcome;

    /// Probability, as a whole percentage, that `rating_self` wins
    fn win_probability(&self, rating_self: f64, rating_opponent: f64) -> u8;

    /// Get the initial rating for new players
    fn get_initial_rating(&self) -> PlayerRating;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()>;
}
