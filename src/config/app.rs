//! Main application configuration
//!
//! This module defines the primary configuration structures for the ladder,
//! including TOML file and environment variable loading and validation.

use crate::config::rating::RatingConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub rating: RatingConfig,
    pub ladder: LadderSettings,
}

/// Service-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Ladder settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderSettings {
    /// Maximum number of registered players
    pub max_players: usize,
    /// Entries returned by a leaderboard query without an explicit limit
    pub leaderboard_size: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "pong-ladder".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for LadderSettings {
    fn default() -> Self {
        Self {
            max_players: 10000,
            leaderboard_size: 500,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid {} value: {}", key, value)),
        Err(_) => Ok(None),
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        Ok(config)
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Rating settings
        if let Ok(model) = env::var("RATING_MODEL") {
            self.rating.model = model
                .parse()
                .map_err(|e| anyhow!("Invalid RATING_MODEL value: {}", e))?;
        }
        if let Some(k) = parse_env("FIXED_K_FACTOR")? {
            self.rating.fixed_k = k;
        }
        if let Some(k) = parse_env("BASE_K_FACTOR")? {
            self.rating.base_k = k;
        }
        if let Some(rating) = parse_env("DEFAULT_RATING")? {
            self.rating.default_rating = rating;
        }
        if let Some(rd) = parse_env("DEFAULT_RD")? {
            self.rating.default_rd = rd;
        }
        if let Some(rd) = parse_env("MIN_RD")? {
            self.rating.min_rd = rd;
        }
        if let Some(rd) = parse_env("MAX_RD")? {
            self.rating.max_rd = rd;
        }
        if let Some(decay) = parse_env("RD_DECAY_PER_MATCH")? {
            self.rating.rd_decay_per_match = decay;
        }
        if let Some(increase) = parse_env("RD_INCREASE_PER_DAY")? {
            self.rating.rd_increase_per_day = increase;
        }
        if let Some(rating) = parse_env("MIN_RATING")? {
            self.rating.min_rating = rating;
        }
        if let Some(rating) = parse_env("MAX_RATING")? {
            self.rating.max_rating = rating;
        }

        // Ladder settings
        if let Some(max_players) = parse_env("MAX_PLAYERS")? {
            self.ladder.max_players = max_players;
        }
        if let Some(size) = parse_env("LEADERBOARD_SIZE")? {
            self.ladder.leaderboard_size = size;
        }

        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.rating.validate()?;

    if config.ladder.max_players == 0 {
        return Err(anyhow!("Max players must be greater than 0"));
    }
    if config.ladder.leaderboard_size == 0 {
        return Err(anyhow!("Leaderboard size must be greater than 0"));
    }

    Ok(())
}
