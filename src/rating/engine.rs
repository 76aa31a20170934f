//! Elo rating engine
//!
//! Concrete [`RatingCalculator`] built on the primitives in
//! [`crate::rating::elo`], configured with a [`RatingPolicy`].

use crate::rating::calculator::RatingCalculator;
use crate::rating::elo::{self, RatingPolicy};
use crate::types::{BulkMatchOutcome, BulkReplayOrder, MatchUpdate, PlayerRating, DEFAULT_RATING};
use crate::utils::round_half_up;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Engine configuration: the K-factor policy plus new-player defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedEloConfig {
    pub policy: RatingPolicy,
    /// Initial rating for new players
    pub initial_rating: f64,
}

impl Default for ExtendedEloConfig {
    fn default() -> Self {
        Self {
            policy: RatingPolicy::rd_scaled(),
            initial_rating: DEFAULT_RATING,
        }
    }
}

impl ExtendedEloConfig {
    /// Fixed K of 32, no RD tracking
    pub fn fixed() -> Self {
        Self {
            policy: RatingPolicy::fixed(),
            initial_rating: DEFAULT_RATING,
        }
    }

    /// Fixed K with a custom value
    pub fn fixed_k(k: f64) -> Self {
        Self {
            policy: RatingPolicy::Fixed { k },
            initial_rating: DEFAULT_RATING,
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        let invalid = |message: &str| -> crate::error::Result<()> {
            Err(crate::error::LadderError::ConfigurationError {
                message: message.to_string(),
            }
            .into())
        };

        if !self.initial_rating.is_finite() || self.initial_rating <= 0.0 {
            return invalid("Initial rating must be a positive number");
        }

        match self.policy {
            RatingPolicy::Fixed { k } => {
                if !k.is_finite() || k <= 0.0 {
                    return invalid("K-factor must be positive");
                }
            }
            RatingPolicy::RdScaled {
                base_k,
                decay_per_match,
                min_rd,
                max_rd,
                default_rd,
            } => {
                if !base_k.is_finite() || base_k <= 0.0 {
                    return invalid("Base K-factor must be positive");
                }
                if !decay_per_match.is_finite() || decay_per_match < 0.0 {
                    return invalid("RD decay per match must be non-negative");
                }
                if !min_rd.is_finite() || !max_rd.is_finite() || min_rd <= 0.0 || min_rd > max_rd
                {
                    return invalid("RD bounds must satisfy 0 < min_rd <= max_rd");
                }
                if !(min_rd..=max_rd).contains(&default_rd) {
                    return invalid("Default RD must lie within the RD bounds");
                }
            }
        }

        Ok(())
    }
}

/// Elo rating calculator implementation
#[derive(Debug, Clone)]
pub struct EloRatingCalculator {
    config: ExtendedEloConfig,
}

impl Default for EloRatingCalculator {
    fn default() -> Self {
        Self {
            config: ExtendedEloConfig::default(),
        }
    }
}

impl EloRatingCalculator {
    /// Create a new Elo rating calculator
    pub fn new(config: ExtendedEloConfig) -> crate::error::Result<Self> {
        config.validate()?;

        Ok(Self { config })
    }

    pub fn policy(&self) -> RatingPolicy {
        self.config.policy
    }

    /// Expected score of `rating_self` against `rating_opponent`
    pub fn expected_score(&self, rating_self: f64, rating_opponent: f64) -> f64 {
        elo::expected_score(rating_self, rating_opponent)
    }

    /// Single-game update with optional RDs, mirroring the plain numeric call
    /// surface callers persist from.
    pub fn update_ratings_with_rd(
        &self,
        winner_rating: f64,
        loser_rating: f64,
        winner_rd: Option<f64>,
        loser_rd: Option<f64>,
    ) -> MatchUpdate {
        self.update_ratings(
            &PlayerRating {
                rating: winner_rating,
                rd: winner_rd,
            },
            &PlayerRating {
                rating: loser_rating,
                rd: loser_rd,
            },
        )
    }
}

impl RatingCalculator for EloRatingCalculator {
    fn update_ratings(&self, winner: &PlayerRating, loser: &PlayerRating) -> MatchUpdate {
        let policy = self.config.policy;
        let winner_k = policy.k_factor(winner);
        let loser_k = policy.k_factor(loser);

        let (winner_new, loser_new) =
            elo::replay_game(winner.rating, loser.rating, winner_k, loser_k);

        MatchUpdate {
            winner_new_rating: round_half_up(winner_new),
            loser_new_rating: round_half_up(loser_new),
            winner_new_rd: policy.next_rd(winner),
            loser_new_rd: policy.next_rd(loser),
            rating_change: round_half_up(winner_new - winner.rating),
            winner_k,
            loser_k,
        }
    }

    fn process_bulk_match_results(
        &self,
        rating_a: f64,
        rating_b: f64,
        wins_a: u32,
        wins_b: u32,
        order: BulkReplayOrder,
    ) -> BulkMatchOutcome {
        let k = self.config.policy.bulk_k_factor();
        debug!(
            "Replaying bulk batch {}-{} with K={} ({})",
            wins_a, wins_b, k, order
        );

        elo::process_bulk_match_results_in_order(rating_a, rating_b, wins_a, wins_b, k, order)
    }

    fn win_probability(&self, rating_self: f64, rating_opponent: f64) -> u8 {
        elo::win_probability(rating_self, rating_opponent)
    }

    fn get_initial_rating(&self) -> PlayerRating {
        match self.config.policy {
            RatingPolicy::Fixed { .. } => PlayerRating::new(self.config.initial_rating),
            RatingPolicy::RdScaled { default_rd, .. } => {
                PlayerRating::with_rd(self.config.initial_rating, default_rd)
            }
        }
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or(serde_json::Value::Null)
    }

    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()> {
        let new_config: ExtendedEloConfig = serde_json::from_value(config).map_err(|e| {
            crate::error::LadderError::ConfigurationError {
                message: format!("Invalid Elo configuration: {}", e),
            }
        })?;

        new_config.validate()?;
        self.config = new_config;
        Ok(())
    }
}
