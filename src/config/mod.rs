//! Configuration management for the pong-ladder service
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, LadderSettings, ServiceSettings};
pub use rating::{RatingConfig, RatingModel};
