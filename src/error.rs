//! Error types for the ladder
//!
//! The rating engine itself never fails. Everything around it (configuration,
//! profile storage, the match-request workflow) returns `anyhow::Result`
//! carrying a [`LadderError`] so callers can downcast on the kind.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, thiserror::Error)]
pub enum LadderError {
    #[error("Player not found: {player_id}")]
    PlayerNotFound { player_id: String },

    #[error("Player already registered: {player_id}")]
    PlayerAlreadyRegistered { player_id: String },

    #[error("Invalid player: {reason}")]
    InvalidPlayer { reason: String },

    #[error("Match request not found: {request_id}")]
    RequestNotFound { request_id: String },

    #[error("Match request {request_id} has already been processed ({status})")]
    RequestAlreadyProcessed { request_id: String, status: String },

    #[error("Player {player_id} cannot {action} match request {request_id}")]
    NotRequestParticipant {
        request_id: String,
        player_id: String,
        action: String,
    },

    #[error("Invalid match request: {reason}")]
    InvalidMatchRequest { reason: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal ladder error: {message}")]
    InternalError { message: String },
}
