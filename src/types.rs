//! Common types used throughout the ladder

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Unique identifier for match requests
pub type RequestId = Uuid;

/// Starting rating for a new player
pub const DEFAULT_RATING: f64 = 1000.0;

/// Starting rating deviation for a new player
pub const DEFAULT_RD: f64 = 300.0;

/// Soft floor callers clamp ratings to before persisting them
pub const MIN_RATING: f64 = 100.0;

/// Soft ceiling callers clamp ratings to before persisting them
pub const MAX_RATING: f64 = 3000.0;

/// Rating information fed to the engine for one side of a match.
///
/// `rd` is `None` when the player's rating deviation is not tracked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerRating {
    pub rating: f64,
    pub rd: Option<f64>,
}

impl PlayerRating {
    /// Rating without a tracked deviation
    pub fn new(rating: f64) -> Self {
        Self { rating, rd: None }
    }

    /// Rating with a tracked deviation
    pub fn with_rd(rating: f64, rd: f64) -> Self {
        Self {
            rating,
            rd: Some(rd),
        }
    }
}

impl Default for PlayerRating {
    fn default() -> Self {
        Self::with_rd(DEFAULT_RATING, DEFAULT_RD)
    }
}

/// Result of a single-match rating update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchUpdate {
    pub winner_new_rating: f64,
    pub loser_new_rating: f64,
    /// Only present when the active policy tracks RD
    pub winner_new_rd: Option<f64>,
    pub loser_new_rd: Option<f64>,
    /// Rounded rating gained by the winner
    pub rating_change: f64,
    pub winner_k: f64,
    pub loser_k: f64,
}

/// Result of replaying a batch of games between two players
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkMatchOutcome {
    pub new_rating_a: f64,
    pub new_rating_b: f64,
    pub change_a: f64,
    pub change_b: f64,
}

/// Order in which the games of a bulk batch are replayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkReplayOrder {
    /// Every win of A, then every win of B
    #[default]
    WinsAFirst,
    /// Every win of B, then every win of A
    WinsBFirst,
    /// A and B take turns winning until one side runs out
    Alternating,
}

impl std::fmt::Display for BulkReplayOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BulkReplayOrder::WinsAFirst => write!(f, "wins_a_first"),
            BulkReplayOrder::WinsBFirst => write!(f, "wins_b_first"),
            BulkReplayOrder::Alternating => write!(f, "alternating"),
        }
    }
}

impl std::str::FromStr for BulkReplayOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "wins_a_first" | "a_first" => Ok(BulkReplayOrder::WinsAFirst),
            "wins_b_first" | "b_first" => Ok(BulkReplayOrder::WinsBFirst),
            "alternating" => Ok(BulkReplayOrder::Alternating),
            other => Err(format!("unknown replay order '{}'", other)),
        }
    }
}

/// A player's profile as the ladder persists it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player_id: PlayerId,
    pub display_name: String,
    pub rating: f64,
    pub rd: Option<f64>,
    pub matches_played: u64,
    pub wins: u64,
    pub losses: u64,
    pub last_played: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PlayerProfile {
    /// Create a profile for a freshly registered player
    pub fn new(player_id: PlayerId, display_name: String, initial: PlayerRating) -> Self {
        Self {
            player_id,
            display_name,
            rating: initial.rating,
            rd: initial.rd,
            matches_played: 0,
            wins: 0,
            losses: 0,
            last_played: None,
            created_at: Utc::now(),
        }
    }

    /// The engine-facing view of this profile
    pub fn player_rating(&self) -> PlayerRating {
        PlayerRating {
            rating: self.rating,
            rd: self.rd,
        }
    }

    /// Record the outcome of `wins + losses` games played at `played_at`
    pub fn record_games(&mut self, wins: u64, losses: u64, played_at: DateTime<Utc>) {
        self.wins += wins;
        self.losses += losses;
        self.matches_played += wins + losses;
        self.last_played = Some(played_at);
    }
}
