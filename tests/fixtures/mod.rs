//! Test fixtures and storage implementations for integration testing

use chrono::{DateTime, TimeZone, Utc};
use pong_ladder::error::{LadderError, Result};
use pong_ladder::rating::{
    EloRatingCalculator, ExtendedEloConfig, InMemoryProfileStorage, ProfileStorage,
};
use pong_ladder::types::{PlayerId, PlayerProfile};
use pong_ladder::LadderManager;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Storage that delegates to memory until told to reject writes
#[derive(Debug, Default)]
pub struct FlakyProfileStorage {
    inner: InMemoryProfileStorage,
    reject_writes: AtomicBool,
}

impl FlakyProfileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(LadderError::InternalError {
                message: "storage unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

impl ProfileStorage for FlakyProfileStorage {
    fn get_profile(&self, player_id: &PlayerId) -> Result<Option<PlayerProfile>> {
        self.inner.get_profile(player_id)
    }

    fn store_profile(&self, profile: PlayerProfile) -> Result<()> {
        self.check_writable()?;
        self.inner.store_profile(profile)
    }

    fn insert_profile(&self, profile: PlayerProfile) -> Result<bool> {
        self.check_writable()?;
        self.inner.insert_profile(profile)
    }

    fn get_profiles(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, PlayerProfile>> {
        self.inner.get_profiles(player_ids)
    }

    fn store_profiles(&self, profiles: Vec<PlayerProfile>) -> Result<()> {
        self.check_writable()?;
        self.inner.store_profiles(profiles)
    }

    fn get_all_profiles(&self) -> Result<Vec<PlayerProfile>> {
        self.inner.get_all_profiles()
    }

    fn remove_profile(&self, player_id: &PlayerId) -> Result<bool> {
        self.check_writable()?;
        self.inner.remove_profile(player_id)
    }

    fn leaderboard(&self, limit: Option<usize>) -> Result<Vec<PlayerProfile>> {
        self.inner.leaderboard(limit)
    }

    fn get_player_count(&self) -> Result<usize> {
        self.inner.get_player_count()
    }
}

/// A fixed point in time so day arithmetic is deterministic
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Ladder over in-memory storage with the given players registered
pub fn create_ladder(config: ExtendedEloConfig, players: &[&str]) -> LadderManager {
    let storage = Arc::new(InMemoryProfileStorage::default());
    create_ladder_with_storage(config, storage, players)
}

pub fn create_ladder_with_storage(
    config: ExtendedEloConfig,
    storage: Arc<dyn ProfileStorage>,
    players: &[&str],
) -> LadderManager {
    let calculator = Arc::new(EloRatingCalculator::new(config).unwrap());
    let manager = LadderManager::new(storage, calculator);

    for player in players {
        manager.register_player(player, &capitalize(player)).unwrap();
    }

    manager
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Downcast an error to the ladder error it carries
pub fn ladder_error(err: &anyhow::Error) -> &LadderError {
    err.downcast_ref::<LadderError>()
        .expect("error should carry a LadderError")
}
