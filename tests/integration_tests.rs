//! Integration tests for the pong-ladder crate
//!
//! These tests drive the public API end to end:
//! - Registering players and reporting single and bulk results
//! - Fixed and RD-scaled rating models
//! - Inactivity growth of rating deviation
//! - Request lifecycle errors and concurrent acceptance
//! - Configuration loading

// Modules for organizing tests
mod fixtures;

use chrono::Duration;
use pong_ladder::config::{AppConfig, RatingModel};
use pong_ladder::rating::{ExtendedEloConfig, RatingCalculator};
use pong_ladder::types::DEFAULT_RATING;
use pong_ladder::{LadderError, LadderManager};
use std::sync::Arc;

use fixtures::{
    base_time, create_ladder, create_ladder_with_storage, ladder_error, FlakyProfileStorage,
};

#[test]
fn test_single_match_workflow_rd_scaled() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &["alice", "bob"]);
    let now = base_time();

    // Alice reports a win, Bob confirms it
    let request_id = ladder.create_match_request("alice", "bob").unwrap();
    assert_eq!(ladder.pending_requests_for("bob").unwrap().len(), 1);

    let record = ladder
        .accept_match_request_at(request_id, "bob", now)
        .unwrap();

    assert_eq!(record.winner_id.as_deref(), Some("alice"));
    assert_eq!(record.sender_rating_after, 1015.0);
    assert_eq!(record.opponent_rating_after, 985.0);
    assert_eq!(record.sender_change(), 15.0);
    assert_eq!(record.opponent_change(), -15.0);

    let alice = ladder.get_player("alice").unwrap();
    let bob = ladder.get_player("bob").unwrap();
    assert_eq!(alice.rating, 1015.0);
    assert_eq!(alice.rd, Some(295.0));
    assert_eq!((alice.wins, alice.losses, alice.matches_played), (1, 0, 1));
    assert_eq!(bob.rating, 985.0);
    assert_eq!(bob.rd, Some(295.0));
    assert_eq!((bob.wins, bob.losses, bob.matches_played), (0, 1, 1));
    assert_eq!(alice.last_played, Some(now));

    assert!(ladder.pending_requests_for("bob").unwrap().is_empty());
    assert_eq!(ladder.match_history("alice").unwrap(), vec![record]);
}

#[test]
fn test_single_match_workflow_fixed() {
    let ladder = create_ladder(ExtendedEloConfig::fixed(), &["alice", "bob"]);

    let alice = ladder.get_player("alice").unwrap();
    assert_eq!(alice.rating, DEFAULT_RATING);
    assert_eq!(alice.rd, None);

    let request_id = ladder.create_match_request("alice", "bob").unwrap();
    let record = ladder.accept_match_request(request_id, "bob").unwrap();

    assert_eq!(record.sender_rating_after, 1016.0);
    assert_eq!(record.opponent_rating_after, 984.0);
    assert_eq!(ladder.get_player("bob").unwrap().rd, None);
}

#[test]
fn test_bulk_session_workflow() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &["alice", "bob"]);

    let request_id = ladder.create_bulk_match_request("alice", "bob", 3, 1).unwrap();
    let record = ladder.accept_match_request(request_id, "bob").unwrap();

    // Bulk batches replay every game with K=32, Alice's wins first
    assert!(record.is_bulk);
    assert_eq!(record.winner_id.as_deref(), Some("alice"));
    assert_eq!(record.sender_rating_after, 1024.0);
    assert_eq!(record.opponent_rating_after, 976.0);

    let alice = ladder.get_player("alice").unwrap();
    let bob = ladder.get_player("bob").unwrap();
    assert_eq!((alice.wins, alice.losses, alice.matches_played), (3, 1, 4));
    assert_eq!((bob.wins, bob.losses, bob.matches_played), (1, 3, 4));

    // Bulk sessions leave RD untouched
    assert_eq!(alice.rd, Some(300.0));
    assert_eq!(bob.rd, Some(300.0));
}

#[test]
fn test_tied_bulk_session_has_no_winner() {
    let ladder = create_ladder(ExtendedEloConfig::fixed(), &["alice", "bob"]);

    let request_id = ladder.create_bulk_match_request("alice", "bob", 1, 1).unwrap();
    let record = ladder.accept_match_request(request_id, "bob").unwrap();

    assert_eq!(record.winner_id, None);
    assert_eq!(record.sender_rating_after, 999.0);
    assert_eq!(record.opponent_rating_after, 1001.0);
}

#[test]
fn test_empty_bulk_session_rejected() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &["alice", "bob"]);

    let err = ladder
        .create_bulk_match_request("alice", "bob", 0, 0)
        .unwrap_err();
    assert!(matches!(
        ladder_error(&err),
        LadderError::InvalidMatchRequest { .. }
    ));
}

#[test]
fn test_request_cannot_be_applied_twice() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &["alice", "bob"]);

    let request_id = ladder.create_match_request("alice", "bob").unwrap();
    ladder.accept_match_request(request_id, "bob").unwrap();

    let err = ladder.accept_match_request(request_id, "bob").unwrap_err();
    assert!(matches!(
        ladder_error(&err),
        LadderError::RequestAlreadyProcessed { .. }
    ));

    // Ratings moved exactly once
    assert_eq!(ladder.get_player("alice").unwrap().rating, 1015.0);
    assert_eq!(ladder.match_history("alice").unwrap().len(), 1);
}

#[test]
fn test_only_opponent_can_accept() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &["alice", "bob", "carol"]);
    let request_id = ladder.create_match_request("alice", "bob").unwrap();

    for player in ["alice", "carol"] {
        let err = ladder.accept_match_request(request_id, player).unwrap_err();
        assert!(matches!(
            ladder_error(&err),
            LadderError::NotRequestParticipant { .. }
        ));
    }

    assert!(ladder.get_request(request_id).unwrap().is_pending());
}

#[test]
fn test_declined_and_cancelled_requests_leave_ratings_alone() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &["alice", "bob"]);

    let declined = ladder.create_match_request("alice", "bob").unwrap();
    ladder.decline_match_request(declined, "bob").unwrap();

    let cancelled = ladder.create_match_request("alice", "bob").unwrap();
    assert!(ladder.cancel_match_request(cancelled, "bob").is_err());
    ladder.cancel_match_request(cancelled, "alice").unwrap();

    for request_id in [declined, cancelled] {
        let err = ladder.accept_match_request(request_id, "bob").unwrap_err();
        assert!(matches!(
            ladder_error(&err),
            LadderError::RequestAlreadyProcessed { .. }
        ));
    }

    assert_eq!(ladder.get_player("alice").unwrap().rating, DEFAULT_RATING);
    assert!(ladder.match_history("bob").unwrap().is_empty());
    assert_eq!(ladder.requests_for("alice").unwrap().len(), 2);
}

#[test]
fn test_concurrent_accepts_apply_once() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &["alice", "bob"]);
    let request_id = ladder.create_match_request("alice", "bob").unwrap();

    let successes = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| ladder.accept_match_request(request_id, "bob").is_ok()))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|accepted| *accepted)
            .count()
    });

    assert_eq!(successes, 1);
    assert_eq!(ladder.get_player("alice").unwrap().rating, 1015.0);
    assert_eq!(ladder.get_player("bob").unwrap().matches_played, 1);
}

#[test]
fn test_concurrent_registrations_keep_first_profile() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &[]);

    let registered: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let ladder = &ladder;
                scope.spawn(move || ladder.register_player("alice", &format!("Alice {}", i)))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });

    let winners: Vec<_> = registered.iter().filter_map(|result| result.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);

    for result in registered.iter().filter(|result| result.is_err()) {
        let err = result.as_ref().unwrap_err();
        assert!(matches!(
            ladder_error(err),
            LadderError::PlayerAlreadyRegistered { .. }
        ));
    }

    // Later registrations never overwrite the stored profile
    let stored = ladder.get_player("alice").unwrap();
    assert_eq!(stored.display_name, winners[0].display_name);
}

#[test]
fn test_inactivity_grows_rd_before_next_match() {
    let ladder = create_ladder(ExtendedEloConfig::default(), &["alice", "bob"]);
    let start = base_time();

    let first = ladder.create_match_request("alice", "bob").unwrap();
    ladder.accept_match_request_at(first, "bob", start).unwrap();
    assert_eq!(ladder.get_player("alice").unwrap().rd, Some(295.0));

    // Ten idle days add 20 to the RD shown on the leaderboard
    let later = start + Duration::days(10);
    let board = ladder.leaderboard_at(None, later).unwrap();
    assert_eq!(board[0].player_id, "alice");
    assert_eq!(board[0].rd, Some(315.0));
    assert_eq!(board[1].rd, Some(315.0));

    // Storage still holds the post-match RD
    assert_eq!(ladder.get_player("alice").unwrap().rd, Some(295.0));

    // The next match starts from the grown RD and decays it by one step
    let second = ladder.create_match_request("bob", "alice").unwrap();
    ladder.accept_match_request_at(second, "alice", later).unwrap();
    assert_eq!(ladder.get_player("alice").unwrap().rd, Some(310.0));
    assert_eq!(ladder.get_player("bob").unwrap().rd, Some(310.0));
}

#[test]
fn test_leaderboard_ordering_and_limit() {
    let ladder = create_ladder(
        ExtendedEloConfig::fixed(),
        &["alice", "bob", "carol", "dave"],
    );

    let first = ladder.create_match_request("carol", "alice").unwrap();
    ladder.accept_match_request(first, "alice").unwrap();
    let second = ladder.create_match_request("dave", "bob").unwrap();
    ladder.accept_match_request(second, "bob").unwrap();

    let board = ladder.leaderboard(Some(3)).unwrap();
    let ids: Vec<_> = board.iter().map(|p| p.player_id.as_str()).collect();

    // Equal ratings fall back to player id
    assert_eq!(ids, vec!["carol", "dave", "alice"]);
}

#[test]
fn test_storage_failure_leaves_request_pending() {
    let storage = Arc::new(FlakyProfileStorage::new());
    let ladder = create_ladder_with_storage(
        ExtendedEloConfig::default(),
        storage.clone(),
        &["alice", "bob"],
    );
    let request_id = ladder.create_match_request("alice", "bob").unwrap();

    storage.set_reject_writes(true);
    assert!(ladder.accept_match_request(request_id, "bob").is_err());
    assert!(ladder.get_request(request_id).unwrap().is_pending());
    assert_eq!(ladder.get_player("alice").unwrap().rating, DEFAULT_RATING);
    assert!(ladder.match_history("alice").unwrap().is_empty());

    // Once storage recovers the same request can still be applied
    storage.set_reject_writes(false);
    let record = ladder.accept_match_request(request_id, "bob").unwrap();
    assert_eq!(record.sender_rating_after, 1015.0);
}

#[test]
fn test_ratings_respect_configured_bounds() {
    let ladder = create_ladder(ExtendedEloConfig::fixed(), &["alice", "bob"])
        .with_rating_bounds(990.0, 1010.0);

    let request_id = ladder.create_match_request("alice", "bob").unwrap();
    let record = ladder.accept_match_request(request_id, "bob").unwrap();

    // Unclamped the result would be 1016 / 984
    assert_eq!(record.sender_rating_after, 1010.0);
    assert_eq!(record.opponent_rating_after, 990.0);
    assert_eq!(ladder.get_player("bob").unwrap().rating, 990.0);
}

#[test]
fn test_win_probability_between_players() {
    let ladder = create_ladder(ExtendedEloConfig::fixed(), &["alice", "bob"]);
    assert_eq!(ladder.win_probability("alice", "bob").unwrap(), 50);

    let request_id = ladder.create_match_request("alice", "bob").unwrap();
    ladder.accept_match_request(request_id, "bob").unwrap();

    let alice_chance = ladder.win_probability("alice", "bob").unwrap();
    let bob_chance = ladder.win_probability("bob", "alice").unwrap();
    assert!(alice_chance > 50);
    assert_eq!(u32::from(alice_chance) + u32::from(bob_chance), 100);

    let err = ladder.win_probability("alice", "nobody").unwrap_err();
    assert!(matches!(
        ladder_error(&err),
        LadderError::PlayerNotFound { .. }
    ));
}

#[test]
fn test_ladder_from_toml_config() {
    let config = AppConfig::from_toml_str(
        r#"
        [service]
        name = "office-ladder"

        [rating]
        model = "fixed"
        fixed_k = 16.0

        [ladder]
        leaderboard_size = 2
        "#,
    )
    .unwrap();

    assert_eq!(config.rating.model, RatingModel::Fixed);
    assert_eq!(config.ladder.max_players, 10000);

    let ladder = LadderManager::from_config(&config).unwrap();
    assert_eq!(ladder.calculator().get_initial_rating().rd, None);

    for player in ["alice", "bob", "carol"] {
        ladder.register_player(player, "").unwrap();
    }

    let request_id = ladder.create_match_request("alice", "bob").unwrap();
    let record = ladder.accept_match_request(request_id, "bob").unwrap();
    assert_eq!(record.sender_rating_after, 1008.0);
    assert_eq!(record.opponent_rating_after, 992.0);

    assert_eq!(ladder.leaderboard(None).unwrap().len(), 2);
    assert_eq!(ladder.get_player("carol").unwrap().display_name, "carol");
}
