use super::AppState;
use crate::auth::Identity;
use crate::error::GameError;
use crate::events::RoomEventKind;
use crate::types::*;

/// Display name for a new membership: the identity's name, or an
/// auto-generated friendly one when the caller didn't supply any.
pub(crate) fn membership_name(identity: &Identity) -> String {
    identity
        .username
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| petname::petname(2, "-").unwrap_or_else(|| "guest".to_string()))
}

impl AppState {
    /// Join a waiting room by code.
    pub async fn join_room(&self, code: &str, identity: &Identity) -> Result<Player, GameError> {
        // The rooms write lock doubles as the per-room critical-section
        // guard, serializing concurrent joins against the capacity check.
        let rooms = self.rooms.write().await;
        let mut players = self.players.write().await;

        let room = rooms
            .values()
            .filter(|r| r.room_code == code)
            .max_by_key(|r| r.created_at)
            .ok_or_else(|| GameError::NotFound(format!("room with code {}", code)))?;

        if room.status != RoomStatus::Waiting {
            return Err(GameError::InvalidPhaseTransition(
                "room is no longer accepting players".to_string(),
            ));
        }

        let members: Vec<&Player> = players
            .values()
            .filter(|p| p.room_id == room.id)
            .collect();
        if members
            .iter()
            .any(|p| p.account_id == identity.account_id)
        {
            return Err(GameError::AlreadyJoined);
        }
        if members.len() >= room.config.max_players as usize {
            return Err(GameError::CapacityExceeded);
        }

        let player = Player {
            id: ulid::Ulid::new().to_string(),
            room_id: room.id.clone(),
            account_id: identity.account_id.clone(),
            username: membership_name(identity),
            role: Role::Civilian,
            is_alive: true,
            has_given_clue: false,
            clue: None,
            score: 0,
        };
        players.insert(player.id.clone(), player.clone());

        let room_id = room.id.clone();
        drop(players);
        drop(rooms);

        tracing::debug!("Player {} joined room {}", player.id, room_id);
        self.push_events(
            &room_id,
            vec![RoomEventKind::PlayerJoined {
                player_id: player.id.clone(),
                username: player.username.clone(),
            }],
        )
        .await;

        Ok(player)
    }

    /// Roster of a room, ordered by join time (ulid ids sort by creation).
    pub async fn players_in_room(&self, room_id: &RoomId) -> Vec<Player> {
        let mut roster: Vec<Player> = self
            .players
            .read()
            .await
            .values()
            .filter(|p| p.room_id == *room_id)
            .cloned()
            .collect();
        roster.sort_by(|a, b| a.id.cmp(&b.id));
        roster
    }

    /// The caller's own secret assignment for a started game.
    ///
    /// This is the only place roles and words leave the state layer scoped to
    /// a single player; room-wide projections never include them.
    pub async fn role_card(
        &self,
        room_id: &RoomId,
        identity: &Identity,
    ) -> Result<RoleCard, GameError> {
        let rooms = self.rooms.read().await;
        let players = self.players.read().await;

        let room = rooms
            .get(room_id)
            .ok_or_else(|| GameError::NotFound(format!("room {}", room_id)))?;
        if room.status == RoomStatus::Waiting {
            return Err(GameError::InvalidPhaseTransition(
                "roles are not assigned until the game starts".to_string(),
            ));
        }

        let player = players
            .values()
            .find(|p| p.room_id == *room_id && p.account_id == identity.account_id)
            .ok_or_else(|| GameError::NotFound("player in this room".to_string()))?;

        let word = match player.role {
            Role::Civilian => room.civilian_word.clone(),
            Role::Undercover => room.undercover_word.clone(),
            Role::MrX => None,
        };
        Ok(RoleCard {
            role: player.role,
            word,
        })
    }

    /// Overwrite a player's stored score. Point-award policy lives outside
    /// this core, so this is a plain host-gated setter.
    pub async fn set_score(
        &self,
        room_id: &RoomId,
        identity: &Identity,
        player_id: &PlayerId,
        score: i64,
    ) -> Result<Player, GameError> {
        let rooms = self.rooms.write().await;
        let mut players = self.players.write().await;

        let room = rooms
            .get(room_id)
            .ok_or_else(|| GameError::NotFound(format!("room {}", room_id)))?;

        let host_account = players
            .get(&room.host_id)
            .map(|p| p.account_id.clone())
            .ok_or_else(|| GameError::NotFound("host player".to_string()))?;
        if host_account != identity.account_id {
            return Err(GameError::Unauthorized(
                "only the host may set scores".to_string(),
            ));
        }

        let player = players
            .get_mut(player_id)
            .filter(|p| p.room_id == *room_id)
            .ok_or_else(|| GameError::NotFound(format!("player {}", player_id)))?;
        player.score = score;
        let updated = player.clone();

        drop(players);
        drop(rooms);

        self.push_events(
            room_id,
            vec![RoomEventKind::ScoreUpdated {
                player_id: updated.id.clone(),
                score,
            }],
        )
        .await;

        Ok(updated)
    }
}
