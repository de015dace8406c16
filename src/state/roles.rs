//! Role assignment for game start.
//!
//! The assignment is generalized over a *faction plan*: an ordered list of
//! minority factions, each with a role, a count rule, and whether the role
//! holds a secret word. Everyone not claimed by the plan is a civilian. The
//! two shipped configurations (classic undercover, undercover + Mr. X) are
//! just two plans.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::GameError;
use crate::types::{Player, PlayerId, Role, RoomConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactionCount {
    /// Fixed member count.
    Exact(usize),
    /// One member per `d` players, never fewer than one: `max(1, n / d)`.
    PerPlayers(usize),
}

impl FactionCount {
    pub fn resolve(&self, player_count: usize) -> usize {
        match self {
            FactionCount::Exact(k) => *k,
            FactionCount::PerPlayers(d) => (player_count / d).max(1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FactionSpec {
    pub role: Role,
    pub count: FactionCount,
    pub has_word: bool,
}

/// The minority plan implied by a room's settings.
pub(crate) fn faction_plan(config: &RoomConfig) -> Vec<FactionSpec> {
    let mut plan = vec![FactionSpec {
        role: Role::Undercover,
        count: config
            .undercover_count
            .map(FactionCount::Exact)
            .unwrap_or(FactionCount::PerPlayers(4)),
        has_word: true,
    }];
    if config.with_mr_x {
        plan.push(FactionSpec {
            role: Role::MrX,
            count: FactionCount::Exact(1),
            has_word: false,
        });
    }
    plan
}

/// Partition players into factions with a uniform shuffle.
///
/// Every player receives exactly one role. The summed minority counts must
/// leave at least one civilian. Counts are resolved against the roster size
/// at call time and are not meant to be recomputed mid-game.
pub fn assign_roles(
    player_ids: &[PlayerId],
    plan: &[FactionSpec],
    rng: &mut impl Rng,
) -> Result<HashMap<PlayerId, Role>, GameError> {
    let n = player_ids.len();
    let minority_total: usize = plan.iter().map(|spec| spec.count.resolve(n)).sum();
    if minority_total >= n {
        return Err(GameError::ValidationError(format!(
            "faction plan claims {} of {} players, leaving no civilians",
            minority_total, n
        )));
    }

    let mut shuffled = player_ids.to_vec();
    shuffled.shuffle(rng);

    let mut assignments = HashMap::with_capacity(n);
    let mut cursor = 0;
    for spec in plan {
        let take = spec.count.resolve(n);
        for player_id in &shuffled[cursor..cursor + take] {
            assignments.insert(player_id.clone(), spec.role);
        }
        cursor += take;
    }
    for player_id in &shuffled[cursor..] {
        assignments.insert(player_id.clone(), Role::Civilian);
    }

    Ok(assignments)
}

/// Suggested clue-giving order: a shuffle of the alive roster, rotated so a
/// wordless role never opens the round. Cosmetic anti-tell aid for clients,
/// not a server-enforced turn order.
pub fn speaking_order(roster: &[Player], plan: &[FactionSpec], rng: &mut impl Rng) -> Vec<PlayerId> {
    let wordless: HashSet<Role> = plan
        .iter()
        .filter(|spec| !spec.has_word)
        .map(|spec| spec.role)
        .collect();

    let mut alive: Vec<&Player> = roster.iter().filter(|p| p.is_alive).collect();
    alive.shuffle(rng);

    if let Some(pos) = alive.iter().position(|p| !wordless.contains(&p.role)) {
        alive.rotate_left(pos);
    }
    alive.into_iter().map(|p| p.id.clone()).collect()
}
