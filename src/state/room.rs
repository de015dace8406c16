use chrono::Duration;
use rand::seq::IndexedRandom;
use rand::Rng;

use super::roles::{assign_roles, faction_plan};
use super::AppState;
use crate::auth::Identity;
use crate::error::GameError;
use crate::events::RoomEventKind;
use crate::types::*;

pub(crate) const MIN_PLAYERS: usize = 3;

const CODE_LENGTH: usize = 6;

/// Generate a random numeric room code.
fn generate_room_code(rng: &mut impl Rng) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

impl AppState {
    /// Create a room and its host membership.
    ///
    /// Room codes are unique among rooms created within the recency window;
    /// older rooms may share a code, in which case lookup prefers the newest.
    pub async fn create_room(
        &self,
        identity: &Identity,
        config: RoomConfig,
    ) -> Result<(Room, Player), GameError> {
        if config.max_players < MIN_PLAYERS as u32 {
            return Err(GameError::ValidationError(format!(
                "max_players must be at least {}",
                MIN_PLAYERS
            )));
        }
        if config.round_limit == 0 {
            return Err(GameError::ValidationError(
                "round_limit must be at least 1".to_string(),
            ));
        }
        if config.undercover_count == Some(0) {
            return Err(GameError::ValidationError(
                "explicit undercover count must be at least 1".to_string(),
            ));
        }

        let mut rooms = self.rooms.write().await;
        let mut players = self.players.write().await;

        let now = chrono::Utc::now();
        let window = Duration::hours(self.config.code_recency_hours);

        let room_code = {
            let mut rng = rand::rng();
            let mut found = None;
            for _ in 0..self.config.code_retry_cap {
                let code = generate_room_code(&mut rng);
                let taken = rooms
                    .values()
                    .any(|r| r.room_code == code && now - r.created_at < window);
                if !taken {
                    found = Some(code);
                    break;
                }
            }
            found.ok_or(GameError::RoomCodeExhausted)?
        };

        let host = Player {
            id: ulid::Ulid::new().to_string(),
            room_id: String::new(), // patched below once the room id exists
            account_id: identity.account_id.clone(),
            username: super::roster::membership_name(identity),
            role: Role::Civilian,
            is_alive: true,
            has_given_clue: false,
            clue: None,
            score: 0,
        };

        let room = Room {
            id: ulid::Ulid::new().to_string(),
            room_code,
            host_id: host.id.clone(),
            status: RoomStatus::Waiting,
            phase: None,
            current_round: 1,
            config,
            civilian_word: None,
            undercover_word: None,
            pack_id: None,
            outcome: None,
            created_at: now,
        };

        let host = Player {
            room_id: room.id.clone(),
            ..host
        };

        rooms.insert(room.id.clone(), room.clone());
        players.insert(host.id.clone(), host.clone());
        drop(players);
        drop(rooms);

        tracing::info!("Created room {} (code {})", room.id, room.room_code);
        self.push_events(
            &room.id,
            vec![
                RoomEventKind::RoomCreated,
                RoomEventKind::PlayerJoined {
                    player_id: host.id.clone(),
                    username: host.username.clone(),
                },
            ],
        )
        .await;

        Ok((room, host))
    }

    /// Look up a room by join code, preferring the most recently created one
    /// when an expired code has been reused.
    pub async fn room_by_code(&self, code: &str) -> Result<Room, GameError> {
        self.rooms
            .read()
            .await
            .values()
            .filter(|r| r.room_code == code)
            .max_by_key(|r| r.created_at)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("room with code {}", code)))
    }

    pub async fn room(&self, room_id: &RoomId) -> Result<Room, GameError> {
        self.rooms
            .read()
            .await
            .get(room_id)
            .cloned()
            .ok_or_else(|| GameError::NotFound(format!("room {}", room_id)))
    }

    /// Public projection of a room plus its roster.
    pub async fn room_info(&self, room_id: &RoomId) -> Result<RoomInfo, GameError> {
        let room = self.room(room_id).await?;
        let roster = self.players_in_room(room_id).await;
        Ok(RoomInfo::new(&room, &roster))
    }

    /// Start the game: pick a word pair, assign roles, enter round 1.
    ///
    /// The status check and the transition happen under the rooms write
    /// lock, so a concurrent second start fails instead of re-assigning.
    pub async fn start_game(
        &self,
        room_id: &RoomId,
        identity: &Identity,
        pack_id: &PackId,
    ) -> Result<Room, GameError> {
        let pairs = {
            let packs = self.packs.read().await;
            let pack = packs
                .get(pack_id)
                .ok_or_else(|| GameError::NotFound(format!("word pack {}", pack_id)))?;
            pack.pairs.clone()
        };
        if pairs.is_empty() {
            return Err(GameError::ValidationError(
                "selected word pack has no pairs".to_string(),
            ));
        }

        let mut rooms = self.rooms.write().await;
        let mut players = self.players.write().await;

        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| GameError::NotFound(format!("room {}", room_id)))?;

        let host_account = players
            .get(&room.host_id)
            .map(|p| p.account_id.clone())
            .ok_or_else(|| GameError::NotFound("host player".to_string()))?;
        if host_account != identity.account_id {
            return Err(GameError::Unauthorized(
                "only the host may start the game".to_string(),
            ));
        }

        if room.status != RoomStatus::Waiting {
            return Err(GameError::InvalidPhaseTransition(format!(
                "room is {:?}, not WAITING",
                room.status
            )));
        }

        let mut roster_ids: Vec<PlayerId> = players
            .values()
            .filter(|p| p.room_id == *room_id)
            .map(|p| p.id.clone())
            .collect();
        roster_ids.sort();

        if roster_ids.len() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers {
                min: MIN_PLAYERS,
                have: roster_ids.len(),
            });
        }

        let plan = faction_plan(&room.config);

        let (pair, assignments) = {
            let mut rng = rand::rng();
            let pair = pairs.choose(&mut rng).cloned().ok_or_else(|| {
                GameError::ValidationError("selected word pack has no pairs".to_string())
            })?;
            let assignments = assign_roles(&roster_ids, &plan, &mut rng)?;
            (pair, assignments)
        };

        for (player_id, role) in &assignments {
            if let Some(player) = players.get_mut(player_id) {
                player.role = *role;
                player.is_alive = true;
                player.has_given_clue = false;
                player.clue = None;
            }
        }

        room.status = RoomStatus::Playing;
        room.phase = Some(RoundPhase::Clue);
        room.current_round = 1;
        room.civilian_word = Some(pair.civilian);
        room.undercover_word = Some(pair.undercover);
        room.pack_id = Some(pack_id.clone());

        let started = room.clone();
        drop(players);
        drop(rooms);

        tracing::info!(
            "Room {} started with {} players",
            started.id,
            assignments.len()
        );
        self.push_events(
            room_id,
            vec![
                RoomEventKind::GameStarted,
                RoomEventKind::PhaseAdvanced {
                    phase: RoundPhase::Clue,
                },
            ],
        )
        .await;

        Ok(started)
    }
}
