//! Rating deviation bookkeeping
//!
//! Playing a match shrinks RD; sitting out grows it. The two rules are kept
//! apart: the match update only ever decays RD, and inactivity growth is
//! applied when profiles are loaded.

use crate::rating::elo::{MAX_RD, MIN_RD};
use crate::types::{PlayerProfile, DEFAULT_RD};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// RD gained for each whole day without a match
pub const RD_INCREASE_PER_DAY: f64 = 2.0;

/// RD after playing one match, clamped to `[min_rd, max_rd]`
pub fn rd_after_match(rd: f64, decay: f64, min_rd: f64, max_rd: f64) -> f64 {
    (rd - decay).min(max_rd).max(min_rd)
}

/// How fast RD grows while a player is inactive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InactivityPolicy {
    pub increase_per_day: f64,
    pub max_rd: f64,
}

impl Default for InactivityPolicy {
    fn default() -> Self {
        Self {
            increase_per_day: RD_INCREASE_PER_DAY,
            max_rd: MAX_RD,
        }
    }
}

impl InactivityPolicy {
    /// Validate policy parameters
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.increase_per_day.is_finite() || self.increase_per_day < 0.0 {
            return Err(crate::error::LadderError::ConfigurationError {
                message: "RD increase per day must be non-negative".to_string(),
            }
            .into());
        }

        if !self.max_rd.is_finite() || self.max_rd < MIN_RD {
            return Err(crate::error::LadderError::ConfigurationError {
                message: format!("Inactivity RD cap must be at least {}", MIN_RD),
            }
            .into());
        }

        Ok(())
    }
}

/// RD of a player who last played at `last_played`, as seen at `now`.
///
/// Only whole days count. A player who never played, or whose last match is
/// in the future, keeps their RD.
pub fn rd_with_inactivity(
    current_rd: f64,
    last_played: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    policy: &InactivityPolicy,
) -> f64 {
    let Some(last_played) = last_played else {
        return current_rd;
    };

    let days_inactive = (now - last_played).num_days();
    if days_inactive <= 0 {
        return current_rd;
    }

    let grown = current_rd + days_inactive as f64 * policy.increase_per_day;
    grown.min(policy.max_rd)
}

/// Apply inactivity growth to every profile, assuming RD 300 where unknown
pub fn apply_inactivity_penalty(
    profiles: Vec<PlayerProfile>,
    now: DateTime<Utc>,
    policy: &InactivityPolicy,
) -> Vec<PlayerProfile> {
    profiles
        .into_iter()
        .map(|profile| {
            let rd = rd_with_inactivity(
                profile.rd.unwrap_or(DEFAULT_RD),
                profile.last_played,
                now,
                policy,
            );
            PlayerProfile {
                rd: Some(rd),
                ..profile
            }
        })
        .collect()
}
