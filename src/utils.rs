//! Utility functions for the ladder

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique match request ID
pub fn generate_request_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Round to the nearest integer, ties going towards positive infinity.
///
/// `f64::round` sends ties away from zero, which turns a `-0.5` rating
/// change into `-1` instead of `0`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Clamp a rating into the soft bounds callers persist
pub fn clamp_rating(rating: f64, min_rating: f64, max_rating: f64) -> f64 {
    rating.max(min_rating).min(max_rating)
}
