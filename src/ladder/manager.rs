//! Ladder manager
//!
//! Owns the match-request workflow: players report results, opponents
//! confirm them, and only then does the rating engine run and the new
//! profiles get stored. The manager is an explicit context object; nothing
//! in here is global.

use crate::config::AppConfig;
use crate::error::{LadderError, Result};
use crate::ladder::request::{MatchRecord, MatchRequest, MatchRequestKind, RequestStatus};
use crate::rating::calculator::RatingCalculator;
use crate::rating::deviation::{apply_inactivity_penalty, rd_with_inactivity, InactivityPolicy};
use crate::rating::engine::EloRatingCalculator;
use crate::rating::storage::{InMemoryProfileStorage, ProfileStorage};
use crate::types::{BulkReplayOrder, PlayerId, PlayerProfile, RequestId, MAX_RATING, MIN_RATING};
use crate::utils::{clamp_rating, current_timestamp};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

/// Default number of leaderboard entries
const DEFAULT_LEADERBOARD_SIZE: usize = 500;

pub struct LadderManager {
    storage: Arc<dyn ProfileStorage>,
    calculator: Arc<dyn RatingCalculator>,
    inactivity: InactivityPolicy,
    min_rating: f64,
    max_rating: f64,
    leaderboard_size: usize,
    requests: RwLock<RequestBook>,
    history: RwLock<Vec<MatchRecord>>,
}

impl std::fmt::Debug for LadderManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LadderManager")
            .field("calculator", &self.calculator.config())
            .field("inactivity", &self.inactivity)
            .field("min_rating", &self.min_rating)
            .field("max_rating", &self.max_rating)
            .finish_non_exhaustive()
    }
}

/// Requests keyed by id, each tagged with its creation sequence number
#[derive(Debug, Default)]
struct RequestBook {
    next_seq: u64,
    entries: HashMap<RequestId, (u64, MatchRequest)>,
}

impl RequestBook {
    fn insert(&mut self, request: MatchRequest) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(request.id, (seq, request));
    }

    fn get(&self, request_id: &RequestId) -> Option<&MatchRequest> {
        self.entries.get(request_id).map(|(_, request)| request)
    }

    fn get_mut(&mut self, request_id: &RequestId) -> Option<&mut MatchRequest> {
        self.entries.get_mut(request_id).map(|(_, request)| request)
    }

    /// Requests matching `filter`, newest first
    fn newest_first(&self, filter: impl Fn(&MatchRequest) -> bool) -> Vec<MatchRequest> {
        let mut matching: Vec<_> = self
            .entries
            .values()
            .filter(|(_, request)| filter(request))
            .collect();
        matching.sort_by_key(|(seq, _)| Reverse(*seq));

        matching
            .into_iter()
            .map(|(_, request)| request.clone())
            .collect()
    }
}

fn lock_error(what: &str) -> LadderError {
    LadderError::InternalError {
        message: format!("Failed to acquire {} lock", what),
    }
}

impl LadderManager {
    /// Create a ladder with the stock inactivity policy and rating bounds
    pub fn new(storage: Arc<dyn ProfileStorage>, calculator: Arc<dyn RatingCalculator>) -> Self {
        Self {
            storage,
            calculator,
            inactivity: InactivityPolicy::default(),
            min_rating: MIN_RATING,
            max_rating: MAX_RATING,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            requests: RwLock::new(RequestBook::default()),
            history: RwLock::new(Vec::new()),
        }
    }

    /// Build an in-memory ladder from application configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let calculator = EloRatingCalculator::new(config.rating.engine_config())?;
        let storage = InMemoryProfileStorage::new(config.ladder.max_players);

        let mut manager = Self::new(Arc::new(storage), Arc::new(calculator))
            .with_inactivity_policy(config.rating.inactivity())
            .with_rating_bounds(config.rating.min_rating, config.rating.max_rating);
        manager.leaderboard_size = config.ladder.leaderboard_size;

        Ok(manager)
    }

    pub fn with_inactivity_policy(mut self, policy: InactivityPolicy) -> Self {
        self.inactivity = policy;
        self
    }

    /// Soft bounds applied to every rating before it is stored
    pub fn with_rating_bounds(mut self, min_rating: f64, max_rating: f64) -> Self {
        self.min_rating = min_rating;
        self.max_rating = max_rating;
        self
    }

    pub fn calculator(&self) -> &dyn RatingCalculator {
        self.calculator.as_ref()
    }

    /// Register a new player with the engine's starting rating
    pub fn register_player(&self, player_id: &str, display_name: &str) -> Result<PlayerProfile> {
        if player_id.trim().is_empty() {
            return Err(LadderError::InvalidPlayer {
                reason: "Player id cannot be empty".to_string(),
            }
            .into());
        }

        let player_id = player_id.to_string();
        let display_name = match display_name.trim() {
            "" => player_id.clone(),
            name => name.to_string(),
        };

        let profile = PlayerProfile::new(
            player_id.clone(),
            display_name,
            self.calculator.get_initial_rating(),
        );

        // Check and insert happen under one storage lock
        if !self.storage.insert_profile(profile.clone())? {
            warn!("Rejected duplicate registration for {}", player_id);
            return Err(LadderError::PlayerAlreadyRegistered { player_id }.into());
        }

        info!(
            "Registered player {} at rating {}",
            player_id, profile.rating
        );
        Ok(profile)
    }

    /// Look up a registered player
    pub fn get_player(&self, player_id: &str) -> Result<PlayerProfile> {
        self.storage
            .get_profile(&player_id.to_string())?
            .ok_or_else(|| {
                LadderError::PlayerNotFound {
                    player_id: player_id.to_string(),
                }
                .into()
            })
    }

    /// Report a single game won by `sender_id`
    pub fn create_match_request(&self, sender_id: &str, opponent_id: &str) -> Result<RequestId> {
        self.validate_participants(sender_id, opponent_id)?;

        let request = MatchRequest::single(sender_id.to_string(), opponent_id.to_string());
        self.push_request(request)
    }

    /// Report a session of several games
    pub fn create_bulk_match_request(
        &self,
        sender_id: &str,
        opponent_id: &str,
        sender_wins: u32,
        opponent_wins: u32,
    ) -> Result<RequestId> {
        self.validate_participants(sender_id, opponent_id)?;

        if u64::from(sender_wins) + u64::from(opponent_wins) == 0 {
            return Err(LadderError::InvalidMatchRequest {
                reason: "A bulk match needs at least one game".to_string(),
            }
            .into());
        }

        let request = MatchRequest::bulk(
            sender_id.to_string(),
            opponent_id.to_string(),
            sender_wins,
            opponent_wins,
        );
        self.push_request(request)
    }

    fn validate_participants(&self, sender_id: &str, opponent_id: &str) -> Result<()> {
        if sender_id == opponent_id {
            return Err(LadderError::InvalidMatchRequest {
                reason: "Players cannot play against themselves".to_string(),
            }
            .into());
        }

        self.get_player(sender_id)?;
        self.get_player(opponent_id)?;
        Ok(())
    }

    fn push_request(&self, request: MatchRequest) -> Result<RequestId> {
        let id = request.id;
        debug!(
            "Match request {} created: {} vs {} ({:?})",
            id, request.sender_id, request.opponent_id, request.kind
        );

        self.requests
            .write()
            .map_err(|_| lock_error("requests write"))?
            .insert(request);

        Ok(id)
    }

    /// Fetch a request by id
    pub fn get_request(&self, request_id: RequestId) -> Result<MatchRequest> {
        let requests = self.requests.read().map_err(|_| lock_error("requests read"))?;

        requests
            .get(&request_id)
            .cloned()
            .ok_or_else(|| {
                LadderError::RequestNotFound {
                    request_id: request_id.to_string(),
                }
                .into()
            })
    }

    /// Accept a request as its opponent, applying the result now
    pub fn accept_match_request(
        &self,
        request_id: RequestId,
        accepting_player: &str,
    ) -> Result<MatchRecord> {
        self.accept_match_request_at(request_id, accepting_player, current_timestamp())
    }

    /// Accept a request as its opponent, applying the result at `now`.
    ///
    /// The requests lock is held for the whole update so a request can only
    /// ever be applied once.
    pub fn accept_match_request_at(
        &self,
        request_id: RequestId,
        accepting_player: &str,
        now: DateTime<Utc>,
    ) -> Result<MatchRecord> {
        let mut requests = self
            .requests
            .write()
            .map_err(|_| lock_error("requests write"))?;

        let request = requests
            .get_mut(&request_id)
            .ok_or_else(|| LadderError::RequestNotFound {
                request_id: request_id.to_string(),
            })?;

        Self::check_transition(request, accepting_player, false, "accept")?;

        let sender = self.load_for_match(&request.sender_id, now)?;
        let opponent = self.load_for_match(&request.opponent_id, now)?;

        let (record, sender, opponent) = match request.kind {
            MatchRequestKind::Single => self.apply_single(request, sender, opponent, now),
            MatchRequestKind::Bulk {
                sender_wins,
                opponent_wins,
            } => self.apply_bulk(request, sender, opponent, sender_wins, opponent_wins, now),
        };

        // Nothing is marked accepted unless both profiles made it to storage
        self.storage.store_profiles(vec![sender, opponent])?;
        request.set_status(RequestStatus::Accepted, now);

        self.history
            .write()
            .map_err(|_| lock_error("history write"))?
            .push(record.clone());

        info!(
            "Match request {} accepted: {} {} -> {}, {} {} -> {}",
            request_id,
            record.sender_id,
            record.sender_rating_before,
            record.sender_rating_after,
            record.opponent_id,
            record.opponent_rating_before,
            record.opponent_rating_after
        );

        Ok(record)
    }

    /// Profile with inactivity growth applied to its RD
    fn load_for_match(&self, player_id: &PlayerId, now: DateTime<Utc>) -> Result<PlayerProfile> {
        let mut profile = self.get_player(player_id)?;
        profile.rd = profile
            .rd
            .map(|rd| rd_with_inactivity(rd, profile.last_played, now, &self.inactivity));
        Ok(profile)
    }

    fn apply_single(
        &self,
        request: &MatchRequest,
        mut sender: PlayerProfile,
        mut opponent: PlayerProfile,
        now: DateTime<Utc>,
    ) -> (MatchRecord, PlayerProfile, PlayerProfile) {
        let update = self
            .calculator
            .update_ratings(&sender.player_rating(), &opponent.player_rating());

        let sender_before = sender.rating;
        let opponent_before = opponent.rating;

        sender.rating = clamp_rating(update.winner_new_rating, self.min_rating, self.max_rating);
        sender.rd = update.winner_new_rd.or(sender.rd);
        sender.record_games(1, 0, now);

        opponent.rating = clamp_rating(update.loser_new_rating, self.min_rating, self.max_rating);
        opponent.rd = update.loser_new_rd.or(opponent.rd);
        opponent.record_games(0, 1, now);

        let record = MatchRecord {
            request_id: request.id,
            sender_id: sender.player_id.clone(),
            opponent_id: opponent.player_id.clone(),
            winner_id: Some(sender.player_id.clone()),
            sender_rating_before: sender_before,
            sender_rating_after: sender.rating,
            opponent_rating_before: opponent_before,
            opponent_rating_after: opponent.rating,
            sender_wins: 1,
            opponent_wins: 0,
            is_bulk: false,
            recorded_at: now,
        };

        (record, sender, opponent)
    }

    fn apply_bulk(
        &self,
        request: &MatchRequest,
        mut sender: PlayerProfile,
        mut opponent: PlayerProfile,
        sender_wins: u32,
        opponent_wins: u32,
        now: DateTime<Utc>,
    ) -> (MatchRecord, PlayerProfile, PlayerProfile) {
        let outcome = self.calculator.process_bulk_match_results(
            sender.rating,
            opponent.rating,
            sender_wins,
            opponent_wins,
            BulkReplayOrder::WinsAFirst,
        );

        let sender_before = sender.rating;
        let opponent_before = opponent.rating;

        sender.rating = clamp_rating(outcome.new_rating_a, self.min_rating, self.max_rating);
        sender.record_games(u64::from(sender_wins), u64::from(opponent_wins), now);

        opponent.rating = clamp_rating(outcome.new_rating_b, self.min_rating, self.max_rating);
        opponent.record_games(u64::from(opponent_wins), u64::from(sender_wins), now);

        let winner_id = match sender_wins.cmp(&opponent_wins) {
            std::cmp::Ordering::Greater => Some(sender.player_id.clone()),
            std::cmp::Ordering::Less => Some(opponent.player_id.clone()),
            std::cmp::Ordering::Equal => None,
        };

        let record = MatchRecord {
            request_id: request.id,
            sender_id: sender.player_id.clone(),
            opponent_id: opponent.player_id.clone(),
            winner_id,
            sender_rating_before: sender_before,
            sender_rating_after: sender.rating,
            opponent_rating_before: opponent_before,
            opponent_rating_after: opponent.rating,
            sender_wins,
            opponent_wins,
            is_bulk: true,
            recorded_at: now,
        };

        (record, sender, opponent)
    }

    /// Decline a request as its opponent
    pub fn decline_match_request(&self, request_id: RequestId, opponent_id: &str) -> Result<()> {
        self.close_request(request_id, opponent_id, false, RequestStatus::Declined)
    }

    /// Withdraw a request as its sender
    pub fn cancel_match_request(&self, request_id: RequestId, sender_id: &str) -> Result<()> {
        self.close_request(request_id, sender_id, true, RequestStatus::Cancelled)
    }

    fn close_request(
        &self,
        request_id: RequestId,
        player_id: &str,
        as_sender: bool,
        status: RequestStatus,
    ) -> Result<()> {
        let mut requests = self
            .requests
            .write()
            .map_err(|_| lock_error("requests write"))?;

        let request = requests
            .get_mut(&request_id)
            .ok_or_else(|| LadderError::RequestNotFound {
                request_id: request_id.to_string(),
            })?;

        let action = if as_sender { "cancel" } else { "decline" };
        Self::check_transition(request, player_id, as_sender, action)?;

        request.set_status(status, current_timestamp());
        debug!("Match request {} {}", request_id, status);
        Ok(())
    }

    fn check_transition(
        request: &MatchRequest,
        player_id: &str,
        as_sender: bool,
        action: &str,
    ) -> Result<()> {
        let allowed = if as_sender {
            &request.sender_id
        } else {
            &request.opponent_id
        };

        if allowed != player_id {
            warn!(
                "{} tried to {} match request {}",
                player_id, action, request.id
            );
            return Err(LadderError::NotRequestParticipant {
                request_id: request.id.to_string(),
                player_id: player_id.to_string(),
                action: action.to_string(),
            }
            .into());
        }

        if !request.is_pending() {
            return Err(LadderError::RequestAlreadyProcessed {
                request_id: request.id.to_string(),
                status: request.status.to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Pending requests waiting on `player_id`, newest first
    pub fn pending_requests_for(&self, player_id: &str) -> Result<Vec<MatchRequest>> {
        let requests = self.requests.read().map_err(|_| lock_error("requests read"))?;

        Ok(requests
            .newest_first(|request| request.is_pending() && request.opponent_id == player_id))
    }

    /// Every request `player_id` sent or received, newest first
    pub fn requests_for(&self, player_id: &str) -> Result<Vec<MatchRequest>> {
        let requests = self.requests.read().map_err(|_| lock_error("requests read"))?;

        Ok(requests.newest_first(|request| request.involves(player_id)))
    }

    /// Accepted matches involving `player_id`, newest first
    pub fn match_history(&self, player_id: &str) -> Result<Vec<MatchRecord>> {
        let history = self.history.read().map_err(|_| lock_error("history read"))?;

        Ok(history
            .iter()
            .rev()
            .filter(|record| record.sender_id == player_id || record.opponent_id == player_id)
            .cloned()
            .collect())
    }

    /// Top players by rating, with inactivity growth applied to their RD
    pub fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<PlayerProfile>> {
        self.leaderboard_at(limit, current_timestamp())
    }

    pub fn leaderboard_at(
        &self,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<Vec<PlayerProfile>> {
        let ranked = self
            .storage
            .leaderboard(Some(limit.unwrap_or(self.leaderboard_size)))?;

        // Growth only means something when the engine tracks RD
        if self.calculator.get_initial_rating().rd.is_none() {
            return Ok(ranked);
        }

        Ok(apply_inactivity_penalty(ranked, now, &self.inactivity))
    }

    /// Win probability of one registered player against another
    pub fn win_probability(&self, player_id: &str, opponent_id: &str) -> Result<u8> {
        let player = self.get_player(player_id)?;
        let opponent = self.get_player(opponent_id)?;

        Ok(self
            .calculator
            .win_probability(player.rating, opponent.rating))
    }
}
