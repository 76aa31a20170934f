//! Rating system configuration

use crate::error::LadderError;
use crate::rating::deviation::{InactivityPolicy, RD_INCREASE_PER_DAY};
use crate::rating::elo::{
    RatingPolicy, BASE_K_FACTOR, DEFAULT_K_FACTOR, MAX_RD, MIN_RD, RD_DECAY_PER_MATCH,
};
use crate::rating::engine::ExtendedEloConfig;
use crate::types::{DEFAULT_RATING, DEFAULT_RD, MAX_RATING, MIN_RATING};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which K-factor model the ladder runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingModel {
    Fixed,
    #[default]
    RdScaled,
}

impl std::fmt::Display for RatingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingModel::Fixed => write!(f, "fixed"),
            RatingModel::RdScaled => write!(f, "rd_scaled"),
        }
    }
}

impl FromStr for RatingModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fixed" => Ok(RatingModel::Fixed),
            "rd_scaled" | "rd" => Ok(RatingModel::RdScaled),
            other => Err(format!(
                "unknown rating model '{}' (expected fixed or rd_scaled)",
                other
            )),
        }
    }
}

/// Rating engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingConfig {
    pub model: RatingModel,
    /// K-factor of the fixed model
    pub fixed_k: f64,
    /// Base K-factor of the RD-scaled model
    pub base_k: f64,
    pub default_rating: f64,
    pub default_rd: f64,
    pub min_rd: f64,
    pub max_rd: f64,
    pub rd_decay_per_match: f64,
    pub rd_increase_per_day: f64,
    /// Soft bounds the ladder clamps persisted ratings to
    pub min_rating: f64,
    pub max_rating: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            model: RatingModel::default(),
            fixed_k: DEFAULT_K_FACTOR,
            base_k: BASE_K_FACTOR,
            default_rating: DEFAULT_RATING,
            default_rd: DEFAULT_RD,
            min_rd: MIN_RD,
            max_rd: MAX_RD,
            rd_decay_per_match: RD_DECAY_PER_MATCH,
            rd_increase_per_day: RD_INCREASE_PER_DAY,
            min_rating: MIN_RATING,
            max_rating: MAX_RATING,
        }
    }
}

impl RatingConfig {
    /// The K-factor policy selected by `model`
    pub fn policy(&self) -> RatingPolicy {
        match self.model {
            RatingModel::Fixed => RatingPolicy::Fixed { k: self.fixed_k },
            RatingModel::RdScaled => RatingPolicy::RdScaled {
                base_k: self.base_k,
                decay_per_match: self.rd_decay_per_match,
                min_rd: self.min_rd,
                max_rd: self.max_rd,
                default_rd: self.default_rd,
            },
        }
    }

    pub fn inactivity(&self) -> InactivityPolicy {
        InactivityPolicy {
            increase_per_day: self.rd_increase_per_day,
            max_rd: self.max_rd,
        }
    }

    /// Configuration for [`crate::rating::EloRatingCalculator`]
    pub fn engine_config(&self) -> ExtendedEloConfig {
        ExtendedEloConfig {
            policy: self.policy(),
            initial_rating: self.default_rating,
        }
    }

    /// Validate rating settings
    pub fn validate(&self) -> crate::error::Result<()> {
        self.engine_config().validate()?;
        self.inactivity().validate()?;

        if !self.fixed_k.is_finite() || self.fixed_k <= 0.0 {
            return Err(LadderError::ConfigurationError {
                message: "Fixed K-factor must be positive".to_string(),
            }
            .into());
        }

        if !self.min_rating.is_finite()
            || !self.max_rating.is_finite()
            || self.min_rating >= self.max_rating
        {
            return Err(LadderError::ConfigurationError {
                message: "min_rating must be below max_rating".to_string(),
            }
            .into());
        }

        if !(self.min_rating..=self.max_rating).contains(&self.default_rating) {
            return Err(LadderError::ConfigurationError {
                message: "default_rating must lie within the rating bounds".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
