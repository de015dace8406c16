//! Change-feed records for room state mutations.
//!
//! Events are deliberately light: they tell clients *that* something changed,
//! and clients re-fetch the room to see the new state. Payloads never carry
//! secret assignments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GameOutcome, PlayerId, RoomId, RoundPhase};

pub type EventSeq = u64;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomEvent {
    pub room_id: RoomId,
    /// Per-room sequence number, starting at 1. Poll with `?after=seq`.
    pub seq: EventSeq,
    pub at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: RoomEventKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum RoomEventKind {
    RoomCreated,
    PlayerJoined {
        player_id: PlayerId,
        username: String,
    },
    GameStarted,
    ClueSubmitted {
        player_id: PlayerId,
    },
    PhaseAdvanced {
        phase: RoundPhase,
    },
    VoteSubmitted {
        voter_id: PlayerId,
    },
    PlayerEliminated {
        player_id: PlayerId,
    },
    /// Vote tally ended in an exact tie; nobody leaves.
    NoElimination,
    RoundAdvanced {
        round: u32,
    },
    GameFinished {
        outcome: GameOutcome,
    },
    ScoreUpdated {
        player_id: PlayerId,
        score: i64,
    },
}
