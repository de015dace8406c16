//! Error taxonomy shared by the state layer and the HTTP surface.
//!
//! Every variant is a caller-visible, synchronous failure: nothing here is
//! retried internally, and a failed operation leaves game state unchanged.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("room is full")]
    CapacityExceeded,

    #[error("account already has a player in this room")]
    AlreadyJoined,

    #[error("invalid phase transition: {0}")]
    InvalidPhaseTransition(String),

    #[error("at least {min} players required, room has {have}")]
    InsufficientPlayers { min: usize, have: usize },

    #[error("validation failed: {0}")]
    ValidationError(String),

    #[error("could not allocate an unused room code")]
    RoomCodeExhausted,

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl GameError {
    /// Short machine-readable kind, stable across message wording changes.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Unauthorized(_) => "UNAUTHORIZED",
            GameError::NotFound(_) => "NOT_FOUND",
            GameError::CapacityExceeded => "CAPACITY_EXCEEDED",
            GameError::AlreadyJoined => "ALREADY_JOINED",
            GameError::InvalidPhaseTransition(_) => "INVALID_PHASE_TRANSITION",
            GameError::InsufficientPlayers { .. } => "INSUFFICIENT_PLAYERS",
            GameError::ValidationError(_) => "VALIDATION_ERROR",
            GameError::RoomCodeExhausted => "ROOM_CODE_EXHAUSTED",
            GameError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GameError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::CapacityExceeded
            | GameError::AlreadyJoined
            | GameError::InvalidPhaseTransition(_) => StatusCode::CONFLICT,
            GameError::InsufficientPlayers { .. } | GameError::ValidationError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            GameError::RoomCodeExhausted | GameError::StorageUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

/// Wire shape for errors: machine-readable code plus human-readable message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

impl IntoResponse for GameError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code().to_string(),
            msg: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
