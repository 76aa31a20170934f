//! Player profile storage interface and implementations
//!
//! The ladder only ever talks to [`ProfileStorage`]; durable backends can be
//! plugged in behind it. [`InMemoryProfileStorage`] is what the binary and the
//! tests use.

use crate::error::LadderError;
use crate::types::{PlayerId, PlayerProfile};
use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for profile storage operations
#[cfg_attr(test, mockall::automock)]
pub trait ProfileStorage: Send + Sync {
    /// Get a player's profile
    fn get_profile(&self, player_id: &PlayerId) -> crate::error::Result<Option<PlayerProfile>>;

    /// Store or update a player's profile
    fn store_profile(&self, profile: PlayerProfile) -> crate::error::Result<()>;

    /// Store a profile unless the player already has one.
    ///
    /// Returns `false` and leaves storage unchanged when the player exists.
    fn insert_profile(&self, profile: PlayerProfile) -> crate::error::Result<bool>;

    /// Get profiles for multiple players, skipping unknown ids
    fn get_profiles(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, PlayerProfile>>;

    /// Store multiple profile updates atomically
    fn store_profiles(&self, profiles: Vec<PlayerProfile>) -> crate::error::Result<()>;

    /// Get every stored profile
    fn get_all_profiles(&self) -> crate::error::Result<Vec<PlayerProfile>>;

    /// Remove a player's profile
    fn remove_profile(&self, player_id: &PlayerId) -> crate::error::Result<bool>;

    /// Profiles ordered by rating, highest first
    fn leaderboard(&self, limit: Option<usize>) -> crate::error::Result<Vec<PlayerProfile>>;

    /// Get total number of registered players
    fn get_player_count(&self) -> crate::error::Result<usize>;
}

/// In-memory profile storage implementation
#[derive(Debug)]
pub struct InMemoryProfileStorage {
    profiles: RwLock<HashMap<PlayerId, PlayerProfile>>,
    max_entries: usize,
}

impl InMemoryProfileStorage {
    /// Create a new in-memory profile storage
    pub fn new(max_entries: usize) -> Self {
        Self {
            profiles: RwLock::new(HashMap::new()),
            max_entries,
        }
    }

    fn read_lock_error() -> LadderError {
        LadderError::InternalError {
            message: "Failed to acquire profiles read lock".to_string(),
        }
    }

    fn write_lock_error() -> LadderError {
        LadderError::InternalError {
            message: "Failed to acquire profiles write lock".to_string(),
        }
    }

    fn check_capacity(
        &self,
        profiles: &HashMap<PlayerId, PlayerProfile>,
        incoming: &[&PlayerProfile],
    ) -> crate::error::Result<()> {
        let new_players = incoming
            .iter()
            .filter(|profile| !profiles.contains_key(&profile.player_id))
            .count();

        if profiles.len() + new_players > self.max_entries {
            return Err(LadderError::InternalError {
                message: format!(
                    "Profile storage is full ({} players)",
                    self.max_entries
                ),
            }
            .into());
        }

        Ok(())
    }
}

impl Default for InMemoryProfileStorage {
    fn default() -> Self {
        Self::new(10000) // Default to 10,000 max entries
    }
}

impl ProfileStorage for InMemoryProfileStorage {
    fn get_profile(&self, player_id: &PlayerId) -> crate::error::Result<Option<PlayerProfile>> {
        let profiles = self.profiles.read().map_err(|_| Self::read_lock_error())?;

        Ok(profiles.get(player_id).cloned())
    }

    fn store_profile(&self, profile: PlayerProfile) -> crate::error::Result<()> {
        let mut profiles = self.profiles.write().map_err(|_| Self::write_lock_error())?;

        self.check_capacity(&profiles, &[&profile])?;
        profiles.insert(profile.player_id.clone(), profile);

        Ok(())
    }

    fn insert_profile(&self, profile: PlayerProfile) -> crate::error::Result<bool> {
        let mut profiles = self.profiles.write().map_err(|_| Self::write_lock_error())?;

        if profiles.contains_key(&profile.player_id) {
            return Ok(false);
        }

        self.check_capacity(&profiles, &[&profile])?;
        profiles.insert(profile.player_id.clone(), profile);

        Ok(true)
    }

    fn get_profiles(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, PlayerProfile>> {
        let profiles = self.profiles.read().map_err(|_| Self::read_lock_error())?;

        let mut result = HashMap::new();
        for player_id in player_ids {
            if let Some(profile) = profiles.get(player_id) {
                result.insert(player_id.clone(), profile.clone());
            }
        }

        Ok(result)
    }

    fn store_profiles(&self, entries: Vec<PlayerProfile>) -> crate::error::Result<()> {
        let mut profiles = self.profiles.write().map_err(|_| Self::write_lock_error())?;

        // All or nothing
        self.check_capacity(&profiles, &entries.iter().collect::<Vec<_>>())?;
        for profile in entries {
            profiles.insert(profile.player_id.clone(), profile);
        }

        Ok(())
    }

    fn get_all_profiles(&self) -> crate::error::Result<Vec<PlayerProfile>> {
        let profiles = self.profiles.read().map_err(|_| Self::read_lock_error())?;

        Ok(profiles.values().cloned().collect())
    }

    fn remove_profile(&self, player_id: &PlayerId) -> crate::error::Result<bool> {
        let mut profiles = self.profiles.write().map_err(|_| Self::write_lock_error())?;

        Ok(profiles.remove(player_id).is_some())
    }

    fn leaderboard(&self, limit: Option<usize>) -> crate::error::Result<Vec<PlayerProfile>> {
        let profiles = self.profiles.read().map_err(|_| Self::read_lock_error())?;

        let mut ranked: Vec<PlayerProfile> = profiles.values().cloned().collect();

        // Sort by rating (descending), ties by id so the order is stable
        ranked.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.player_id.cmp(&b.player_id))
        });

        if let Some(limit) = limit {
            ranked.truncate(limit);
        }

        Ok(ranked)
    }

    fn get_player_count(&self) -> crate::error::Result<usize> {
        let profiles = self.profiles.read().map_err(|_| Self::read_lock_error())?;

        Ok(profiles.len())
    }
}
