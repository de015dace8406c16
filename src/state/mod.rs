pub mod export;
mod packs;
mod roles;
mod room;
mod roster;
mod round;
mod vote;
mod win;

pub use packs::NewWordPack;
pub use roles::{assign_roles, speaking_order, FactionCount, FactionSpec};
pub use vote::GuessVerdict;
pub use win::evaluate_winner;

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

use crate::config::ServerConfig;
use crate::events::{RoomEvent, RoomEventKind};
use crate::types::*;

/// Shared application state.
///
/// The maps are the unit of mutual exclusion: every read-check-write
/// operation holds the write guards it needs for the whole critical section.
/// Guards are always acquired in the order rooms -> players -> votes ->
/// events (packs are only snapshotted, never held across another
/// acquisition), so phase-advance decisions for a room are serialized and
/// vote resolution sees a consistent snapshot.
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub rooms: Arc<RwLock<HashMap<RoomId, Room>>>,
    pub players: Arc<RwLock<HashMap<PlayerId, Player>>>,
    pub votes: Arc<RwLock<HashMap<VoteId, Vote>>>,
    pub packs: Arc<RwLock<HashMap<PackId, WordPack>>>,
    /// Per-room change feed, appended on every mutation.
    pub events: Arc<RwLock<HashMap<RoomId, Vec<RoomEvent>>>>,
    /// Push channel mirroring the event log, for WebSocket subscribers.
    pub event_tx: broadcast::Sender<RoomEvent>,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    /// Construct state with an explicit config and the built-in word packs
    /// seeded. Seeding happens here, not as an import-time side effect.
    pub fn with_config(config: ServerConfig) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        let packs = packs::builtin_packs()
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        Self {
            config,
            rooms: Arc::new(RwLock::new(HashMap::new())),
            players: Arc::new(RwLock::new(HashMap::new())),
            votes: Arc::new(RwLock::new(HashMap::new())),
            packs: Arc::new(RwLock::new(packs)),
            events: Arc::new(RwLock::new(HashMap::new())),
            event_tx: tx,
        }
    }

    /// Append events to a room's feed and mirror them onto the push channel.
    pub(crate) async fn push_events(&self, room_id: &RoomId, kinds: Vec<RoomEventKind>) {
        let mut events = self.events.write().await;
        let log = events.entry(room_id.clone()).or_default();

        for kind in kinds {
            let event = RoomEvent {
                room_id: room_id.clone(),
                seq: log.len() as u64 + 1,
                at: chrono::Utc::now(),
                kind,
            };
            log.push(event.clone());
            // No receivers connected is fine
            let _ = self.event_tx.send(event);
        }
    }

    /// Events for a room with `seq > after`.
    pub async fn events_after(&self, room_id: &RoomId, after: u64) -> Vec<RoomEvent> {
        self.events
            .read()
            .await
            .get(room_id)
            .map(|log| {
                log.iter()
                    .filter(|e| e.seq > after)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;

    pub(crate) fn identity(account: &str, name: &str) -> Identity {
        Identity {
            account_id: account.to_string(),
            username: Some(name.to_string()),
        }
    }

    /// Create a room and join `extra` more accounts, returning the room and
    /// the full roster (host first).
    pub(crate) async fn room_with_players(
        state: &AppState,
        extra: usize,
    ) -> (Room, Vec<Player>) {
        let (room, host) = state
            .create_room(&identity("acct_host", "Host"), RoomConfig::default())
            .await
            .unwrap();

        let mut roster = vec![host];
        for i in 0..extra {
            let player = state
                .join_room(
                    &room.room_code,
                    &identity(&format!("acct_{}", i), &format!("Player{}", i)),
                )
                .await
                .unwrap();
            roster.push(player);
        }
        (room, roster)
    }

    #[tokio::test]
    async fn test_builtin_packs_seeded() {
        let state = AppState::new();
        let packs = state.public_packs().await;

        assert_eq!(packs.len(), 3);
        assert!(packs.iter().any(|p| p.title == "General"));
    }

    #[tokio::test]
    async fn test_events_are_sequenced_per_room() {
        let state = AppState::new();
        let room_id = "room_1".to_string();

        state
            .push_events(&room_id, vec![RoomEventKind::RoomCreated])
            .await;
        state
            .push_events(
                &room_id,
                vec![RoomEventKind::GameStarted, RoomEventKind::NoElimination],
            )
            .await;

        let all = state.events_after(&room_id, 0).await;
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].seq, 1);
        assert_eq!(all[2].seq, 3);

        let tail = state.events_after(&room_id, 2).await;
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].kind, RoomEventKind::NoElimination);
    }

    #[tokio::test]
    async fn test_events_unknown_room_is_empty() {
        let state = AppState::new();
        assert!(state.events_after(&"nope".to_string(), 0).await.is_empty());
    }
}
