//! Elo primitives: expected score, K-factor policy and game replay
//!
//! Everything in here is a pure function of its inputs. Rounding only happens
//! on values that are reported back to callers; intermediate game results in
//! a bulk replay stay unrounded.

use crate::rating::deviation::rd_after_match;
use crate::types::{BulkMatchOutcome, BulkReplayOrder, PlayerRating, DEFAULT_RD};
use crate::utils::round_half_up;
use serde::{Deserialize, Serialize};
use skillratings::elo::EloRating;

/// K-factor used by the fixed model
pub const DEFAULT_K_FACTOR: f64 = 32.0;

/// Base K-factor of the RD-scaled model, multiplied by `rd / 200`
pub const BASE_K_FACTOR: f64 = 20.0;

/// RD lost by each participant of a match
pub const RD_DECAY_PER_MATCH: f64 = 5.0;

pub const MIN_RD: f64 = 50.0;
pub const MAX_RD: f64 = 350.0;

/// How the K-factor of a match is chosen.
///
/// Both players of a single update always go through the same variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RatingPolicy {
    /// Constant K, RD is not tracked
    Fixed { k: f64 },
    /// `K = round(base_k * rd / 200)`, RD decays after each match
    RdScaled {
        base_k: f64,
        decay_per_match: f64,
        min_rd: f64,
        max_rd: f64,
        /// RD assumed for a player whose RD is unknown
        default_rd: f64,
    },
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self::rd_scaled()
    }
}

impl RatingPolicy {
    /// Fixed K of 32
    pub fn fixed() -> Self {
        Self::Fixed {
            k: DEFAULT_K_FACTOR,
        }
    }

    /// RD-scaled K with the stock constants (base 20, decay 5, RD in [50, 350])
    pub fn rd_scaled() -> Self {
        Self::RdScaled {
            base_k: BASE_K_FACTOR,
            decay_per_match: RD_DECAY_PER_MATCH,
            min_rd: MIN_RD,
            max_rd: MAX_RD,
            default_rd: DEFAULT_RD,
        }
    }

    pub fn tracks_rd(&self) -> bool {
        matches!(self, Self::RdScaled { .. })
    }

    /// K-factor for one side of a match
    pub fn k_factor(&self, player: &PlayerRating) -> f64 {
        match *self {
            Self::Fixed { k } => k,
            Self::RdScaled {
                base_k, default_rd, ..
            } => dynamic_k_factor(player.rd.unwrap_or(default_rd), base_k),
        }
    }

    /// RD after one match, `None` when the policy does not track RD
    pub fn next_rd(&self, player: &PlayerRating) -> Option<f64> {
        match *self {
            Self::Fixed { .. } => None,
            Self::RdScaled {
                decay_per_match,
                min_rd,
                max_rd,
                default_rd,
                ..
            } => Some(rd_after_match(
                player.rd.unwrap_or(default_rd),
                decay_per_match,
                min_rd,
                max_rd,
            )),
        }
    }

    /// K used when replaying a bulk batch, which never scales with RD
    pub fn bulk_k_factor(&self) -> f64 {
        match *self {
            Self::Fixed { k } => k,
            Self::RdScaled { .. } => DEFAULT_K_FACTOR,
        }
    }
}

/// Probability that `rating_self` beats `rating_opponent`.
///
/// A 400 point gap is a 10:1 expected outcome.
pub fn expected_score(rating_self: f64, rating_opponent: f64) -> f64 {
    let (expected, _) = skillratings::elo::expected_score(
        &EloRating {
            rating: rating_self,
        },
        &EloRating {
            rating: rating_opponent,
        },
    );
    expected
}

/// Win probability as a whole percentage
pub fn win_probability(rating_self: f64, rating_opponent: f64) -> u8 {
    round_half_up(expected_score(rating_self, rating_opponent) * 100.0).clamp(0.0, 100.0) as u8
}

/// `round(base_k * rd / 200)`; 5 at RD 50 and 35 at RD 350 with base 20
pub fn dynamic_k_factor(rd: f64, base_k: f64) -> f64 {
    round_half_up(base_k * (rd / 200.0))
}

/// One game between `winner` and `loser`, unrounded
pub fn replay_game(winner: f64, loser: f64, winner_k: f64, loser_k: f64) -> (f64, f64) {
    let expected_winner = expected_score(winner, loser);
    let expected_loser = expected_score(loser, winner);

    (
        winner + winner_k * (1.0 - expected_winner),
        loser + loser_k * (0.0 - expected_loser),
    )
}

/// Replay `wins_a` games won by A and then `wins_b` games won by B with a
/// fixed K, feeding each game the ratings produced by the previous one.
pub fn process_bulk_match_results(
    rating_a: f64,
    rating_b: f64,
    wins_a: u32,
    wins_b: u32,
    k: f64,
) -> BulkMatchOutcome {
    process_bulk_match_results_in_order(
        rating_a,
        rating_b,
        wins_a,
        wins_b,
        k,
        BulkReplayOrder::WinsAFirst,
    )
}

/// Same as [`process_bulk_match_results`] with an explicit replay order
pub fn process_bulk_match_results_in_order(
    rating_a: f64,
    rating_b: f64,
    wins_a: u32,
    wins_b: u32,
    k: f64,
    order: BulkReplayOrder,
) -> BulkMatchOutcome {
    let mut a = rating_a;
    let mut b = rating_b;

    let a_wins = |a: &mut f64, b: &mut f64| {
        let (new_a, new_b) = replay_game(*a, *b, k, k);
        *a = new_a;
        *b = new_b;
    };
    let b_wins = |a: &mut f64, b: &mut f64| {
        let (new_b, new_a) = replay_game(*b, *a, k, k);
        *a = new_a;
        *b = new_b;
    };

    match order {
        BulkReplayOrder::WinsAFirst => {
            for _ in 0..wins_a {
                a_wins(&mut a, &mut b);
            }
            for _ in 0..wins_b {
                b_wins(&mut a, &mut b);
            }
        }
        BulkReplayOrder::WinsBFirst => {
            for _ in 0..wins_b {
                b_wins(&mut a, &mut b);
            }
            for _ in 0..wins_a {
                a_wins(&mut a, &mut b);
            }
        }
        BulkReplayOrder::Alternating => {
            let (mut left_a, mut left_b) = (wins_a, wins_b);
            while left_a > 0 || left_b > 0 {
                if left_a > 0 {
                    a_wins(&mut a, &mut b);
                    left_a -= 1;
                }
                if left_b > 0 {
                    b_wins(&mut a, &mut b);
                    left_b -= 1;
                }
            }
        }
    }

    let new_rating_a = round_half_up(a);
    let new_rating_b = round_half_up(b);

    BulkMatchOutcome {
        new_rating_a,
        new_rating_b,
        change_a: new_rating_a - rating_a,
        change_b: new_rating_b - rating_b,
    }
}
