//! Match requests and the records they leave behind
//!
//! A request is created by the player reporting the result and only changes
//! ratings once the opponent accepts it.

use crate::types::{PlayerId, RequestId};
use crate::utils::{current_timestamp, generate_request_id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a request reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchRequestKind {
    /// One game, won by the sender
    Single,
    /// Several games played in one sitting
    Bulk { sender_wins: u32, opponent_wins: u32 },
}

/// Lifecycle of a request. Only `Pending` requests can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    Cancelled,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Accepted => write!(f, "accepted"),
            RequestStatus::Declined => write!(f, "declined"),
            RequestStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub id: RequestId,
    pub sender_id: PlayerId,
    pub opponent_id: PlayerId,
    pub kind: MatchRequestKind,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MatchRequest {
    /// A single game the sender claims to have won
    pub fn single(sender_id: PlayerId, opponent_id: PlayerId) -> Self {
        Self::new(sender_id, opponent_id, MatchRequestKind::Single)
    }

    /// A batch of games between sender and opponent
    pub fn bulk(
        sender_id: PlayerId,
        opponent_id: PlayerId,
        sender_wins: u32,
        opponent_wins: u32,
    ) -> Self {
        Self::new(
            sender_id,
            opponent_id,
            MatchRequestKind::Bulk {
                sender_wins,
                opponent_wins,
            },
        )
    }

    fn new(sender_id: PlayerId, opponent_id: PlayerId, kind: MatchRequestKind) -> Self {
        let now = current_timestamp();
        Self {
            id: generate_request_id(),
            sender_id,
            opponent_id,
            kind,
            status: RequestStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    pub fn is_bulk(&self) -> bool {
        matches!(self.kind, MatchRequestKind::Bulk { .. })
    }

    /// Games won by (sender, opponent)
    pub fn wins(&self) -> (u32, u32) {
        match self.kind {
            MatchRequestKind::Single => (1, 0),
            MatchRequestKind::Bulk {
                sender_wins,
                opponent_wins,
            } => (sender_wins, opponent_wins),
        }
    }

    pub fn involves(&self, player_id: &str) -> bool {
        self.sender_id == player_id || self.opponent_id == player_id
    }

    pub(crate) fn set_status(&mut self, status: RequestStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}

/// History entry written when a request is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub request_id: RequestId,
    pub sender_id: PlayerId,
    pub opponent_id: PlayerId,
    /// `None` when a bulk session ended level
    pub winner_id: Option<PlayerId>,
    pub sender_rating_before: f64,
    pub sender_rating_after: f64,
    pub opponent_rating_before: f64,
    pub opponent_rating_after: f64,
    pub sender_wins: u32,
    pub opponent_wins: u32,
    pub is_bulk: bool,
    pub recorded_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn sender_change(&self) -> f64 {
        self.sender_rating_after - self.sender_rating_before
    }

    pub fn opponent_change(&self) -> f64 {
        self.opponent_rating_after - self.opponent_rating_before
    }
}
