use guesswho::auth::Identity;
use guesswho::events::RoomEventKind;
use guesswho::state::AppState;
use guesswho::types::{GameOutcome, Role, RoomConfig, RoomStatus, RoundPhase, WordPair};
use std::sync::Arc;

fn identity(account: &str, name: &str) -> Identity {
    Identity {
        account_id: account.to_string(),
        username: Some(name.to_string()),
    }
}

/// End-to-end integration test for a complete classic game
#[tokio::test]
async fn test_full_game_flow() {
    let state = Arc::new(AppState::new());
    let host = identity("acct_host", "Hanna");

    // 1. Host creates a room
    let (room, host_player) = state
        .create_room(&host, RoomConfig::default())
        .await
        .expect("room creation should succeed");
    assert_eq!(room.status, RoomStatus::Waiting);
    assert_eq!(room.room_code.len(), 6);

    // 2. Three more players join by code
    let mut accounts = vec![("acct_host".to_string(), host_player.clone())];
    for (account, name) in [("acct_a", "Ada"), ("acct_b", "Ben"), ("acct_c", "Cleo")] {
        let player = state
            .join_room(&room.room_code, &identity(account, name))
            .await
            .expect("join should succeed");
        accounts.push((account.to_string(), player));
    }
    assert_eq!(state.players_in_room(&room.id).await.len(), 4);

    // 3. Pick a pack from the public catalog and start
    let packs = state.public_packs().await;
    let general = packs
        .iter()
        .find(|p| p.title == "General")
        .expect("built-in pack should exist");

    let started = state
        .start_game(&room.id, &host, &general.id)
        .await
        .expect("start should succeed");
    assert_eq!(started.status, RoomStatus::Playing);
    assert_eq!(started.phase, Some(RoundPhase::Clue));
    assert_eq!(started.current_round, 1);

    // The recorded words form one pair from the selected pack
    let chosen = WordPair {
        civilian: started.civilian_word.clone().unwrap(),
        undercover: started.undercover_word.clone().unwrap(),
    };
    assert!(general.pairs.contains(&chosen));

    // 4. Every player can read their own role card, and it matches the pair
    let roster = state.players_in_room(&room.id).await;
    assert_eq!(
        roster.iter().filter(|p| p.role == Role::Undercover).count(),
        1,
        "4 players -> exactly one undercover"
    );
    for (account, _) in &accounts {
        let card = state
            .role_card(&room.id, &identity(account, "ignored"))
            .await
            .expect("role card should be readable by its owner");
        match card.role {
            Role::Civilian => assert_eq!(card.word.as_deref(), Some(chosen.civilian.as_str())),
            Role::Undercover => assert_eq!(card.word.as_deref(), Some(chosen.undercover.as_str())),
            Role::MrX => panic!("classic game has no Mr. X"),
        }
    }

    // 5. Clue phase: everyone clues in, the room flips to voting on the last one
    for (account, _) in &accounts {
        state
            .submit_clue(&room.id, &identity(account, "ignored"), "something vague")
            .await
            .expect("clue should be accepted");
    }
    let voting = state.room(&room.id).await.unwrap();
    assert_eq!(voting.phase, Some(RoundPhase::Voting));

    // 6. Voting: the civilians gang up on the undercover
    let roster = state.players_in_room(&room.id).await;
    let undercover = roster
        .iter()
        .find(|p| p.role == Role::Undercover)
        .unwrap()
        .clone();
    let a_civilian = roster.iter().find(|p| p.role == Role::Civilian).unwrap();

    for (account, player) in &accounts {
        let target = if player.id == undercover.id {
            &a_civilian.id
        } else {
            &undercover.id
        };
        state
            .submit_vote(&room.id, &identity(account, "ignored"), target, 1)
            .await
            .expect("vote should be accepted");
    }

    // 7. The undercover is out and the civilians win
    let finished = state.room(&room.id).await.unwrap();
    assert_eq!(finished.status, RoomStatus::Finished);
    assert_eq!(finished.outcome, Some(GameOutcome::CivilianWin));

    let undercover_now = state
        .players_in_room(&room.id)
        .await
        .into_iter()
        .find(|p| p.id == undercover.id)
        .unwrap();
    assert!(!undercover_now.is_alive);

    // 8. The change feed tells the whole story in order
    let events = state.events_after(&room.id, 0).await;
    assert!(events.len() >= 4);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.seq, i as u64 + 1);
    }
    assert!(matches!(
        events.last().unwrap().kind,
        RoomEventKind::GameFinished {
            outcome: GameOutcome::CivilianWin
        }
    ));

    // 9. The game is over; nobody can keep voting
    let late = state
        .submit_vote(
            &room.id,
            &identity("acct_a", "Ada"),
            &undercover.id,
            finished.current_round,
        )
        .await;
    assert!(late.is_err(), "votes after the game ends must be rejected");
}

/// Eight players, a split vote with a strict maximum: only the leader leaves.
#[tokio::test]
async fn test_eight_player_vote_spread() {
    let state = Arc::new(AppState::new());
    let host = identity("acct_host", "Hanna");

    let (room, host_player) = state
        .create_room(&host, RoomConfig::default())
        .await
        .unwrap();
    let mut roster = vec![host_player];
    for i in 0..7 {
        roster.push(
            state
                .join_room(
                    &room.room_code,
                    &identity(&format!("acct_{}", i), &format!("Player{}", i)),
                )
                .await
                .unwrap(),
        );
    }

    let pack = state.public_packs().await[0].id.clone();
    state.start_game(&room.id, &host, &pack).await.unwrap();

    // 8 players -> two undercover by the 1-per-4 ratio
    let undercover = state
        .players_in_room(&room.id)
        .await
        .into_iter()
        .filter(|p| p.role == Role::Undercover)
        .count();
    assert_eq!(undercover, 2);

    for player in &roster {
        state
            .submit_clue(
                &room.id,
                &Identity {
                    account_id: player.account_id.clone(),
                    username: None,
                },
                "clue",
            )
            .await
            .unwrap();
    }

    // Vote spread: 3 on roster[0], 2 on roster[1], 2 on roster[2], 1 on roster[3]
    let targets = [1usize, 2, 3, 0, 0, 0, 1, 2];
    for (voter_idx, target_idx) in targets.iter().enumerate() {
        let voter = &roster[voter_idx];
        let target = &roster[*target_idx];
        state
            .submit_vote(
                &room.id,
                &Identity {
                    account_id: voter.account_id.clone(),
                    username: None,
                },
                &target.id,
                1,
            )
            .await
            .unwrap();
    }

    let after = state.room(&room.id).await.unwrap();
    let alive: Vec<_> = state
        .players_in_room(&room.id)
        .await
        .into_iter()
        .filter(|p| p.is_alive)
        .collect();

    assert_eq!(alive.len(), 7, "exactly one player is eliminated");
    assert!(
        alive.iter().all(|p| p.id != roster[0].id),
        "the strict maximum target is the one eliminated"
    );
    assert_eq!(after.status, RoomStatus::Playing);
    assert_eq!(after.current_round, 2);
    assert_eq!(after.phase, Some(RoundPhase::Clue));
}
