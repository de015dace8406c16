//! REST handlers for the game's request surface.
//!
//! Handlers stay thin: identity extraction and payload shapes live here,
//! every rule lives in the state layer. Responses use the public projections
//! so role/word secrets never ride along in room-wide payloads.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::Identity;
use crate::error::GameError;
use crate::events::RoomEvent;
use crate::state::export::StateExport;
use crate::state::{AppState, GuessVerdict, NewWordPack};
use crate::types::*;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/by-code/{code}", get(get_room))
        .route("/rooms/by-code/{code}/join", post(join_room))
        .route("/rooms/{room_id}", get(get_room_by_id))
        .route("/rooms/{room_id}/start", post(start_game))
        .route("/rooms/{room_id}/role", get(role_card))
        .route("/rooms/{room_id}/speaking-order", get(speaking_order))
        .route("/rooms/{room_id}/clue", post(submit_clue))
        .route("/rooms/{room_id}/vote", post(submit_vote))
        .route("/rooms/{room_id}/guess", post(submit_guess))
        .route("/rooms/{room_id}/players/{player_id}/score", put(set_score))
        .route("/rooms/{room_id}/events", get(room_events))
        .route("/packs", get(list_packs).post(add_pack))
        .route("/state/export", get(export_state))
        .route("/state/import", post(import_state))
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomBody {
    pub max_players: Option<u32>,
    pub undercover_count: Option<usize>,
    #[serde(default)]
    pub with_mr_x: bool,
    pub round_limit: Option<u32>,
}

/// A room plus the caller's own membership in it.
#[derive(Debug, Serialize)]
pub struct RoomMembershipResponse {
    pub room: RoomInfo,
    pub player: PlayerInfo,
}

async fn create_room(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(body): Json<CreateRoomBody>,
) -> Result<Json<RoomMembershipResponse>, GameError> {
    let defaults = RoomConfig::default();
    let config = RoomConfig {
        max_players: body.max_players.unwrap_or(defaults.max_players),
        undercover_count: body.undercover_count,
        with_mr_x: body.with_mr_x,
        round_limit: body
            .round_limit
            .unwrap_or(state.config.default_round_limit),
    };

    let (room, player) = state.create_room(&identity, config).await?;
    Ok(Json(RoomMembershipResponse {
        room: state.room_info(&room.id).await?,
        player: PlayerInfo::from(&player),
    }))
}

async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Json<RoomInfo>, GameError> {
    let room = state.room_by_code(&code).await?;
    Ok(Json(state.room_info(&room.id).await?))
}

async fn get_room_by_id(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<RoomInfo>, GameError> {
    Ok(Json(state.room_info(&room_id).await?))
}

async fn join_room(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
    identity: Identity,
) -> Result<Json<RoomMembershipResponse>, GameError> {
    let player = state.join_room(&code, &identity).await?;
    Ok(Json(RoomMembershipResponse {
        room: state.room_info(&player.room_id).await?,
        player: PlayerInfo::from(&player),
    }))
}

#[derive(Debug, Deserialize)]
pub struct StartGameBody {
    pub pack_id: PackId,
}

async fn start_game(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
    identity: Identity,
    Json(body): Json<StartGameBody>,
) -> Result<Json<RoomInfo>, GameError> {
    state.start_game(&room_id, &identity, &body.pack_id).await?;
    Ok(Json(state.room_info(&room_id).await?))
}

async fn role_card(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
    identity: Identity,
) -> Result<Json<RoleCard>, GameError> {
    Ok(Json(state.role_card(&room_id, &identity).await?))
}

async fn speaking_order(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
) -> Result<Json<Vec<PlayerId>>, GameError> {
    Ok(Json(state.suggested_speaking_order(&room_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct ClueBody {
    pub text: String,
}

async fn submit_clue(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
    identity: Identity,
    Json(body): Json<ClueBody>,
) -> Result<StatusCode, GameError> {
    state.submit_clue(&room_id, &identity, &body.text).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct VoteBody {
    pub target_id: PlayerId,
    pub round: u32,
}

async fn submit_vote(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
    identity: Identity,
    Json(body): Json<VoteBody>,
) -> Result<StatusCode, GameError> {
    state
        .submit_vote(&room_id, &identity, &body.target_id, body.round)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct GuessBody {
    pub word: String,
}

#[derive(Debug, Serialize)]
pub struct GuessResponse {
    pub verdict: GuessVerdict,
}

async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
    identity: Identity,
    Json(body): Json<GuessBody>,
) -> Result<Json<GuessResponse>, GameError> {
    let verdict = state.submit_guess(&room_id, &identity, &body.word).await?;
    Ok(Json(GuessResponse { verdict }))
}

#[derive(Debug, Deserialize)]
pub struct ScoreBody {
    pub score: i64,
}

async fn set_score(
    State(state): State<Arc<AppState>>,
    Path((room_id, player_id)): Path<(RoomId, PlayerId)>,
    identity: Identity,
    Json(body): Json<ScoreBody>,
) -> Result<Json<PlayerInfo>, GameError> {
    let player = state
        .set_score(&room_id, &identity, &player_id, body.score)
        .await?;
    Ok(Json(PlayerInfo::from(&player)))
}

#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Return only events with a sequence number above this.
    #[serde(default)]
    pub after: u64,
}

async fn room_events(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<RoomId>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<RoomEvent>>, GameError> {
    // Resolve the room first so an unknown id is a 404, not an empty feed.
    state.room(&room_id).await?;
    Ok(Json(state.events_after(&room_id, query.after).await))
}

async fn list_packs(State(state): State<Arc<AppState>>) -> Json<Vec<WordPackInfo>> {
    let packs = state.public_packs().await;
    Json(packs.iter().map(WordPackInfo::from).collect())
}

async fn add_pack(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(body): Json<NewWordPack>,
) -> Result<Json<WordPackInfo>, GameError> {
    tracing::debug!("Pack admission requested by {}", identity.account_id);
    let pack = state.add_pack(body).await?;
    Ok(Json(WordPackInfo::from(&pack)))
}

async fn export_state(State(state): State<Arc<AppState>>) -> Json<StateExport> {
    Json(state.export_state().await)
}

async fn import_state(
    State(state): State<Arc<AppState>>,
    Json(export): Json<StateExport>,
) -> Result<StatusCode, GameError> {
    state.import_state(export).await?;
    Ok(StatusCode::OK)
}
