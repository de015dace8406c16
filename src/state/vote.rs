use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::round::clue_phase_complete;
use super::win::evaluate_winner;
use super::AppState;
use crate::auth::Identity;
use crate::error::GameError;
use crate::events::RoomEventKind;
use crate::types::*;

/// Result of a Mr. X word guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessVerdict {
    Correct,
    Wrong,
}

/// Count votes per target for one room round.
fn tally_votes<'a>(
    votes: impl Iterator<Item = &'a Vote>,
    room_id: &RoomId,
    round: u32,
) -> HashMap<PlayerId, u32> {
    let mut counts: HashMap<PlayerId, u32> = HashMap::new();
    for vote in votes {
        if vote.room_id == *room_id && vote.round == round {
            *counts.entry(vote.target_id.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// The player with the strict maximum vote count. An exact tie for first
/// place eliminates nobody; the policy is explicit rather than whatever a
/// map iteration happens to yield.
fn elimination_target(counts: &HashMap<PlayerId, u32>) -> Option<PlayerId> {
    let top = counts.values().copied().max()?;
    let mut leaders = counts.iter().filter(|(_, c)| **c == top);
    let first = leaders.next()?.0.clone();
    match leaders.next() {
        Some(_) => None,
        None => Some(first),
    }
}

/// Resolve a completed voting round: eliminate (or not), evaluate the win
/// conditions, and either finish the room or advance it to the next round's
/// clue phase. Caller holds the rooms/players/votes write guards.
fn resolve_round(
    room: &mut Room,
    players: &mut HashMap<PlayerId, Player>,
    votes: &HashMap<VoteId, Vote>,
) -> Vec<RoomEventKind> {
    let mut kinds = Vec::new();

    let counts = tally_votes(votes.values(), &room.id, room.current_round);
    match elimination_target(&counts) {
        Some(target_id) => {
            if let Some(target) = players.get_mut(&target_id) {
                target.is_alive = false;
            }
            kinds.push(RoomEventKind::PlayerEliminated {
                player_id: target_id,
            });
        }
        None => kinds.push(RoomEventKind::NoElimination),
    }

    let roster = players.values().filter(|p| p.room_id == room.id);
    if let Some(outcome) = evaluate_winner(roster) {
        finish(room, outcome, &mut kinds);
        return kinds;
    }

    if room.current_round >= room.config.round_limit {
        finish(room, GameOutcome::Draw, &mut kinds);
        return kinds;
    }

    room.current_round += 1;
    room.phase = Some(RoundPhase::Clue);
    for player in players.values_mut().filter(|p| p.room_id == room.id) {
        player.has_given_clue = false;
        player.clue = None;
    }
    kinds.push(RoomEventKind::RoundAdvanced {
        round: room.current_round,
    });
    kinds
}

fn finish(room: &mut Room, outcome: GameOutcome, kinds: &mut Vec<RoomEventKind>) {
    room.status = RoomStatus::Finished;
    room.phase = None;
    room.outcome = Some(outcome);
    kinds.push(RoomEventKind::GameFinished { outcome });
}

impl AppState {
    /// Record the caller's vote for the current round.
    ///
    /// One vote per (room, voter, round); a duplicate is rejected and the
    /// original tally stands. When the last alive player votes, resolution
    /// runs in the same critical section, so two racing "final" votes cannot
    /// both trigger it.
    pub async fn submit_vote(
        &self,
        room_id: &RoomId,
        identity: &Identity,
        target_id: &PlayerId,
        round: u32,
    ) -> Result<(), GameError> {
        let mut rooms = self.rooms.write().await;
        let mut players = self.players.write().await;
        let mut votes = self.votes.write().await;

        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| GameError::NotFound(format!("room {}", room_id)))?;

        if room.status != RoomStatus::Playing {
            return Err(GameError::InvalidPhaseTransition(
                "room is not in a running game".to_string(),
            ));
        }
        if room.phase != Some(RoundPhase::Voting) {
            return Err(GameError::InvalidPhaseTransition(
                "voting has not opened for this round".to_string(),
            ));
        }
        if round != room.current_round {
            return Err(GameError::InvalidPhaseTransition(format!(
                "vote is for round {} but the room is in round {}",
                round, room.current_round
            )));
        }

        let voter = players
            .values()
            .find(|p| p.room_id == *room_id && p.account_id == identity.account_id)
            .ok_or_else(|| GameError::NotFound("player in this room".to_string()))?;
        if !voter.is_alive {
            return Err(GameError::InvalidPhaseTransition(
                "eliminated players cannot vote".to_string(),
            ));
        }
        let voter_id = voter.id.clone();

        if voter_id == *target_id {
            return Err(GameError::ValidationError(
                "players cannot vote for themselves".to_string(),
            ));
        }
        let target = players
            .get(target_id)
            .filter(|p| p.room_id == *room_id)
            .ok_or_else(|| GameError::ValidationError("vote target is not in this room".to_string()))?;
        if !target.is_alive {
            return Err(GameError::ValidationError(
                "vote target is already eliminated".to_string(),
            ));
        }

        let duplicate = votes
            .values()
            .any(|v| v.room_id == *room_id && v.voter_id == voter_id && v.round == round);
        if duplicate {
            return Err(GameError::InvalidPhaseTransition(
                "voter has already voted this round".to_string(),
            ));
        }

        let vote = Vote {
            id: ulid::Ulid::new().to_string(),
            room_id: room_id.clone(),
            voter_id: voter_id.clone(),
            target_id: target_id.clone(),
            round,
            ts: chrono::Utc::now(),
        };
        votes.insert(vote.id.clone(), vote);

        let mut kinds = vec![RoomEventKind::VoteSubmitted { voter_id }];
        if voting_phase_complete(room_id, round, &players, &votes) {
            kinds.extend(resolve_round(room, &mut players, &votes));
        }

        drop(votes);
        drop(players);
        drop(rooms);
        self.push_events(room_id, kinds).await;
        Ok(())
    }

    /// Mr. X's independent win path: name the civilians' word.
    ///
    /// A correct guess (case-insensitive exact match) ends the game on the
    /// spot. A wrong guess eliminates the guesser, after which the normal
    /// win conditions and phase predicates are re-evaluated.
    pub async fn submit_guess(
        &self,
        room_id: &RoomId,
        identity: &Identity,
        word: &str,
    ) -> Result<GuessVerdict, GameError> {
        let mut rooms = self.rooms.write().await;
        let mut players = self.players.write().await;
        let votes = self.votes.write().await;

        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| GameError::NotFound(format!("room {}", room_id)))?;

        if room.status != RoomStatus::Playing {
            return Err(GameError::InvalidPhaseTransition(
                "room is not in a running game".to_string(),
            ));
        }

        let guesser = players
            .values()
            .find(|p| p.room_id == *room_id && p.account_id == identity.account_id)
            .ok_or_else(|| GameError::NotFound("player in this room".to_string()))?;
        if !guesser.is_alive {
            return Err(GameError::InvalidPhaseTransition(
                "eliminated players cannot guess".to_string(),
            ));
        }
        if guesser.role != Role::MrX {
            return Err(GameError::ValidationError(
                "only Mr. X may guess the word".to_string(),
            ));
        }
        let guesser_id = guesser.id.clone();

        let civilian_word = room
            .civilian_word
            .clone()
            .ok_or_else(|| GameError::StorageUnavailable("room has no active word".to_string()))?;

        let correct = word.trim().to_lowercase() == civilian_word.to_lowercase();

        let mut kinds = Vec::new();
        let verdict = if correct {
            finish(room, GameOutcome::MrXWin, &mut kinds);
            GuessVerdict::Correct
        } else {
            if let Some(guesser) = players.get_mut(&guesser_id) {
                guesser.is_alive = false;
            }
            kinds.push(RoomEventKind::PlayerEliminated {
                player_id: guesser_id,
            });

            let roster = players.values().filter(|p| p.room_id == room.id);
            if let Some(outcome) = evaluate_winner(roster) {
                finish(room, outcome, &mut kinds);
            } else {
                // The roster shrank mid-phase; re-run the completion
                // predicates the next write would otherwise have to trip.
                match room.phase {
                    Some(RoundPhase::Clue) if clue_phase_complete(room_id, &players) => {
                        room.phase = Some(RoundPhase::Voting);
                        kinds.push(RoomEventKind::PhaseAdvanced {
                            phase: RoundPhase::Voting,
                        });
                    }
                    Some(RoundPhase::Voting)
                        if voting_phase_complete(
                            room_id,
                            room.current_round,
                            &players,
                            &votes,
                        ) =>
                    {
                        kinds.extend(resolve_round(room, &mut players, &votes));
                    }
                    _ => {}
                }
            }
            GuessVerdict::Wrong
        };

        drop(votes);
        drop(players);
        drop(rooms);
        self.push_events(room_id, kinds).await;
        Ok(verdict)
    }
}

/// True when every alive player in the room has voted in `round`.
fn voting_phase_complete(
    room_id: &RoomId,
    round: u32,
    players: &HashMap<PlayerId, Player>,
    votes: &HashMap<VoteId, Vote>,
) -> bool {
    players
        .values()
        .filter(|p| p.room_id == *room_id && p.is_alive)
        .all(|p| {
            votes
                .values()
                .any(|v| v.room_id == *room_id && v.voter_id == p.id && v.round == round)
        })
}
