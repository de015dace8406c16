use super::roles::{faction_plan, speaking_order};
use super::AppState;
use crate::auth::Identity;
use crate::error::GameError;
use crate::events::RoomEventKind;
use crate::types::*;

impl AppState {
    /// Submit (or overwrite) the caller's clue for the current round.
    ///
    /// Re-submission before the phase advances is last-write-wins. When the
    /// last alive player clues in, the room moves to the voting phase; the
    /// predicate is evaluated here, on write, not by any timer.
    pub async fn submit_clue(
        &self,
        room_id: &RoomId,
        identity: &Identity,
        text: &str,
    ) -> Result<(), GameError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(GameError::ValidationError("clue must not be empty".to_string()));
        }

        let mut rooms = self.rooms.write().await;
        let mut players = self.players.write().await;

        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| GameError::NotFound(format!("room {}", room_id)))?;

        if room.status != RoomStatus::Playing {
            return Err(GameError::InvalidPhaseTransition(
                "room is not in a running game".to_string(),
            ));
        }
        if room.phase != Some(RoundPhase::Clue) {
            return Err(GameError::InvalidPhaseTransition(
                "clues are closed, the round is in voting".to_string(),
            ));
        }

        let player = players
            .values_mut()
            .find(|p| p.room_id == *room_id && p.account_id == identity.account_id)
            .ok_or_else(|| GameError::NotFound("player in this room".to_string()))?;
        if !player.is_alive {
            return Err(GameError::InvalidPhaseTransition(
                "eliminated players cannot give clues".to_string(),
            ));
        }

        player.clue = Some(text.to_string());
        player.has_given_clue = true;
        let player_id = player.id.clone();

        let mut kinds = vec![RoomEventKind::ClueSubmitted { player_id }];
        if clue_phase_complete(room_id, &players) {
            room.phase = Some(RoundPhase::Voting);
            kinds.push(RoomEventKind::PhaseAdvanced {
                phase: RoundPhase::Voting,
            });
        }

        drop(players);
        drop(rooms);
        self.push_events(room_id, kinds).await;
        Ok(())
    }

    /// Suggested clue order for the current round. Purely advisory; the
    /// server does not enforce turn order.
    pub async fn suggested_speaking_order(
        &self,
        room_id: &RoomId,
    ) -> Result<Vec<PlayerId>, GameError> {
        let room = self.room(room_id).await?;
        if room.status != RoomStatus::Playing {
            return Err(GameError::InvalidPhaseTransition(
                "room is not in a running game".to_string(),
            ));
        }

        let roster = self.players_in_room(room_id).await;
        let plan = faction_plan(&room.config);
        let mut rng = rand::rng();
        Ok(speaking_order(&roster, &plan, &mut rng))
    }
}

/// True when every alive player in the room has a clue on record.
pub(super) fn clue_phase_complete(
    room_id: &RoomId,
    players: &std::collections::HashMap<PlayerId, Player>,
) -> bool {
    players
        .values()
        .filter(|p| p.room_id == *room_id && p.is_alive)
        .all(|p| p.has_given_clue)
}

#[cfg(test)]
mod tests {
    use super::super::tests::{identity, room_with_players};
    use super::*;

    async fn started_room(state: &AppState, extra: usize) -> (Room, Vec<Player>) {
        let (room, roster) = room_with_players(state, extra).await;
        let pack = state.public_packs().await[0].id.clone();
        let room = state
            .start_game(&room.id, &identity("acct_host", "Host"), &pack)
            .await
            .unwrap();
        (room, roster)
    }

    #[tokio::test]
    async fn test_submit_clue_records_text() {
        let state = AppState::new();
        let (room, _) = started_room(&state, 2).await;

        state
            .submit_clue(&room.id, &identity("acct_host", "Host"), "round and red")
            .await
            .unwrap();

        let roster = state.players_in_room(&room.id).await;
        let host = roster.iter().find(|p| p.account_id == "acct_host").unwrap();
        assert!(host.has_given_clue);
        assert_eq!(host.clue.as_deref(), Some("round and red"));
    }

    #[tokio::test]
    async fn test_empty_clue_rejected() {
        let state = AppState::new();
        let (room, _) = started_room(&state, 2).await;

        let result = state
            .submit_clue(&room.id, &identity("acct_host", "Host"), "   ")
            .await;
        assert!(matches!(result, Err(GameError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_clue_before_start_rejected() {
        let state = AppState::new();
        let (room, _) = room_with_players(&state, 2).await;

        let result = state
            .submit_clue(&room.id, &identity("acct_host", "Host"), "too early")
            .await;
        assert!(matches!(result, Err(GameError::InvalidPhaseTransition(_))));
    }

    #[tokio::test]
    async fn test_clue_resubmission_overwrites() {
        let state = AppState::new();
        let (room, _) = started_room(&state, 2).await;
        let host = identity("acct_host", "Host");

        state.submit_clue(&room.id, &host, "first").await.unwrap();
        state.submit_clue(&room.id, &host, "second").await.unwrap();

        let roster = state.players_in_room(&room.id).await;
        let player = roster.iter().find(|p| p.account_id == "acct_host").unwrap();
        assert_eq!(player.clue.as_deref(), Some("second"));
        // Still only one clue slot, so the phase hasn't advanced
        let current = state.room(&room.id).await.unwrap();
        assert_eq!(current.phase, Some(RoundPhase::Clue));
    }

    #[tokio::test]
    async fn test_all_clues_advance_to_voting() {
        let state = AppState::new();
        let (room, _) = started_room(&state, 2).await;

        state
            .submit_clue(&room.id, &identity("acct_host", "Host"), "one")
            .await
            .unwrap();
        state
            .submit_clue(&room.id, &identity("acct_0", "P0"), "two")
            .await
            .unwrap();

        let mid = state.room(&room.id).await.unwrap();
        assert_eq!(mid.phase, Some(RoundPhase::Clue));

        state
            .submit_clue(&room.id, &identity("acct_1", "P1"), "three")
            .await
            .unwrap();

        let done = state.room(&room.id).await.unwrap();
        assert_eq!(done.phase, Some(RoundPhase::Voting));
    }

    #[tokio::test]
    async fn test_clue_during_voting_rejected() {
        let state = AppState::new();
        let (room, _) = started_room(&state, 2).await;

        for account in ["acct_host", "acct_0", "acct_1"] {
            state
                .submit_clue(&room.id, &identity(account, account), "clue")
                .await
                .unwrap();
        }

        let late = state
            .submit_clue(&room.id, &identity("acct_host", "Host"), "again")
            .await;
        assert!(matches!(late, Err(GameError::InvalidPhaseTransition(_))));
    }

    #[tokio::test]
    async fn test_speaking_order_covers_alive_roster() {
        let state = AppState::new();
        let (room, _) = started_room(&state, 3).await;

        let order = state.suggested_speaking_order(&room.id).await.unwrap();
        assert_eq!(order.len(), 4);

        let roster = state.players_in_room(&room.id).await;
        for player in &roster {
            assert!(order.contains(&player.id));
        }
    }
}
