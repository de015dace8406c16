use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type RoomId = String;
pub type PlayerId = String;
pub type VoteId = String;
pub type AccountId = String;
pub type PackId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Sub-stage of a round while a room is in `Playing` status.
///
/// Discussion happens client-side between clue collection and voting, so the
/// server only distinguishes the two stages it gates writes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundPhase {
    Clue,
    Voting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Civilian,
    Undercover,
    MrX,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameOutcome {
    CivilianWin,
    UndercoverWin,
    MrXWin,
    /// Round limit reached without any faction meeting its win condition.
    Draw,
}

/// Per-room settings, fixed at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    pub max_players: u32,
    /// Explicit undercover count. `None` falls back to the 1-per-4-players ratio.
    pub undercover_count: Option<usize>,
    /// Adds one wordless "Mr. X" to the minority at game start.
    pub with_mr_x: bool,
    /// Voting cycles before the game ends in a draw.
    pub round_limit: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            max_players: 8,
            undercover_count: None,
            with_mr_x: false,
            round_limit: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    /// 6-digit numeric join code, unique among recently created rooms.
    pub room_code: String,
    pub host_id: PlayerId,
    pub status: RoomStatus,
    /// Set while `status == Playing`, `None` otherwise.
    pub phase: Option<RoundPhase>,
    pub current_round: u32,
    pub config: RoomConfig,
    /// The active word pair, populated exactly once at game start.
    pub civilian_word: Option<String>,
    pub undercover_word: Option<String>,
    pub pack_id: Option<PackId>,
    pub outcome: Option<GameOutcome>,
    pub created_at: DateTime<Utc>,
}

/// A room membership, distinct from the account it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub room_id: RoomId,
    pub account_id: AccountId,
    pub username: String,
    pub role: Role,
    pub is_alive: bool,
    pub has_given_clue: bool,
    pub clue: Option<String>,
    /// Stored value only; point-award policy is left to external callers.
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub room_id: RoomId,
    pub voter_id: PlayerId,
    pub target_id: PlayerId,
    pub round: u32,
    pub ts: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackKind {
    Curated,
    Custom,
    Ai,
    Community,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One civilian/undercover word pairing. Mr. X draws from the same pair by
/// receiving neither word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    pub civilian: String,
    pub undercover: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPack {
    pub id: PackId,
    pub title: String,
    pub description: String,
    pub kind: PackKind,
    pub difficulty: Difficulty,
    pub language: String,
    pub pairs: Vec<WordPair>,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

// ---------- Public projections ----------
//
// Room and Player carry secrets (the word pair, each player's role), so the
// API never serializes them directly. These are the room-wide shapes.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub username: String,
    pub is_alive: bool,
    pub has_given_clue: bool,
    pub clue: Option<String>,
    pub score: i64,
}

impl From<&Player> for PlayerInfo {
    fn from(p: &Player) -> Self {
        Self {
            id: p.id.clone(),
            username: p.username.clone(),
            is_alive: p.is_alive,
            has_given_clue: p.has_given_clue,
            clue: p.clue.clone(),
            score: p.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomInfo {
    pub id: RoomId,
    pub room_code: String,
    pub host_id: PlayerId,
    pub status: RoomStatus,
    pub phase: Option<RoundPhase>,
    pub current_round: u32,
    pub max_players: u32,
    pub round_limit: u32,
    pub outcome: Option<GameOutcome>,
    pub players: Vec<PlayerInfo>,
}

impl RoomInfo {
    pub fn new(room: &Room, players: &[Player]) -> Self {
        Self {
            id: room.id.clone(),
            room_code: room.room_code.clone(),
            host_id: room.host_id.clone(),
            status: room.status,
            phase: room.phase,
            current_round: room.current_round,
            max_players: room.config.max_players,
            round_limit: room.config.round_limit,
            outcome: room.outcome,
            players: players.iter().map(PlayerInfo::from).collect(),
        }
    }
}

/// A single player's secret assignment. Only ever returned from the
/// identity-scoped role query, never from room-wide state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleCard {
    pub role: Role,
    /// `None` for Mr. X, who plays without a word.
    pub word: Option<String>,
}

/// Catalog listing entry. Pair contents stay out of the listing so the active
/// pair cannot be read off the catalog mid-game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPackInfo {
    pub id: PackId,
    pub title: String,
    pub description: String,
    pub kind: PackKind,
    pub difficulty: Difficulty,
    pub language: String,
    pub pair_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&WordPack> for WordPackInfo {
    fn from(p: &WordPack) -> Self {
        Self {
            id: p.id.clone(),
            title: p.title.clone(),
            description: p.description.clone(),
            kind: p.kind,
            difficulty: p.difficulty,
            language: p.language.clone(),
            pair_count: p.pairs.len(),
            created_at: p.created_at,
        }
    }
}
