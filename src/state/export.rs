//! State export/import for backups and migration between processes.
//!
//! The snapshot covers the persistent entities and the per-room event logs.
//! Runtime-only pieces (the broadcast channel, the server config) are
//! recreated at startup and excluded here.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::AppState;
use crate::error::GameError;
use crate::events::RoomEvent;
use crate::types::*;

/// Schema version for export format compatibility.
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateExport {
    pub schema_version: u32,
    pub exported_at: chrono::DateTime<chrono::Utc>,
    pub rooms: HashMap<RoomId, Room>,
    pub players: HashMap<PlayerId, Player>,
    pub votes: HashMap<VoteId, Vote>,
    pub packs: HashMap<PackId, WordPack>,
    #[serde(default)]
    pub events: HashMap<RoomId, Vec<RoomEvent>>,
}

impl StateExport {
    /// Referential sanity checks before an import replaces live state.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(GameError::ValidationError(format!(
                "export schema version {} is newer than supported version {}",
                self.schema_version, EXPORT_SCHEMA_VERSION
            )));
        }

        for (player_id, player) in &self.players {
            if !self.rooms.contains_key(&player.room_id) {
                return Err(GameError::ValidationError(format!(
                    "player '{}' references room '{}' which is not in the export",
                    player_id, player.room_id
                )));
            }
        }

        for (room_id, room) in &self.rooms {
            if !self.players.contains_key(&room.host_id) {
                return Err(GameError::ValidationError(format!(
                    "room '{}' references host '{}' which is not in the export",
                    room_id, room.host_id
                )));
            }
        }

        for (vote_id, vote) in &self.votes {
            if !self.rooms.contains_key(&vote.room_id) {
                return Err(GameError::ValidationError(format!(
                    "vote '{}' references room '{}' which is not in the export",
                    vote_id, vote.room_id
                )));
            }
            if !self.players.contains_key(&vote.voter_id)
                || !self.players.contains_key(&vote.target_id)
            {
                return Err(GameError::ValidationError(format!(
                    "vote '{}' references players missing from the export",
                    vote_id
                )));
            }
        }

        Ok(())
    }
}

impl AppState {
    /// Snapshot the full persistent state.
    pub async fn export_state(&self) -> StateExport {
        StateExport {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: chrono::Utc::now(),
            rooms: self.rooms.read().await.clone(),
            players: self.players.read().await.clone(),
            votes: self.votes.read().await.clone(),
            packs: self.packs.read().await.clone(),
            events: self.events.read().await.clone(),
        }
    }

    /// Replace all persistent state with a validated snapshot.
    pub async fn import_state(&self, export: StateExport) -> Result<(), GameError> {
        export.validate()?;

        *self.rooms.write().await = export.rooms;
        *self.players.write().await = export.players;
        *self.votes.write().await = export.votes;
        *self.packs.write().await = export.packs;
        *self.events.write().await = export.events;

        tracing::info!("Imported state snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::room_with_players;
    use super::*;
    use std::io::Write as _;

    #[tokio::test]
    async fn test_export_import_roundtrip() {
        let state = AppState::new();
        let (room, _) = room_with_players(&state, 2).await;

        let export = state.export_state().await;
        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.rooms.len(), 1);
        assert_eq!(export.players.len(), 3);

        let fresh = AppState::new();
        fresh.import_state(export).await.unwrap();

        let restored = fresh.room(&room.id).await.unwrap();
        assert_eq!(restored.room_code, room.room_code);
        assert_eq!(fresh.players_in_room(&room.id).await.len(), 3);
    }

    #[tokio::test]
    async fn test_import_rejects_dangling_player() {
        let state = AppState::new();
        room_with_players(&state, 1).await;

        let mut export = state.export_state().await;
        export.rooms.clear();

        let fresh = AppState::new();
        let result = fresh.import_state(export).await;
        assert!(matches!(result, Err(GameError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_import_rejects_future_schema() {
        let state = AppState::new();
        let mut export = state.export_state().await;
        export.schema_version = EXPORT_SCHEMA_VERSION + 1;

        let result = state.import_state(export).await;
        assert!(matches!(result, Err(GameError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_snapshot_survives_a_file_roundtrip() {
        let state = AppState::new();
        let (room, _) = room_with_players(&state, 2).await;
        let export = state.export_state().await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&export).unwrap().as_bytes())
            .unwrap();

        let raw = std::fs::read_to_string(file.path()).unwrap();
        let parsed: StateExport = serde_json::from_str(&raw).unwrap();
        parsed.validate().unwrap();
        assert!(parsed.rooms.contains_key(&room.id));
    }
}
