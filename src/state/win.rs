//! Win-condition evaluation.
//!
//! A pure function of the roster snapshot, evaluated after every elimination.
//! The round-limit draw is decided by the caller, which knows the round
//! counter; this module only looks at who is alive.

use crate::types::{GameOutcome, Player, Role};

/// Decide whether a faction has won, given the current roster.
///
/// Priority follows the game rules: Mr. X survival is checked first, then
/// undercover parity, then the civilian sweep. Returns `None` while the game
/// is still undecided.
pub fn evaluate_winner<'a>(roster: impl IntoIterator<Item = &'a Player>) -> Option<GameOutcome> {
    let mut civilians = 0usize;
    let mut undercover = 0usize;
    let mut mr_x = 0usize;

    for player in roster {
        if !player.is_alive {
            continue;
        }
        match player.role {
            Role::Civilian => civilians += 1,
            Role::Undercover => undercover += 1,
            Role::MrX => mr_x += 1,
        }
    }

    if mr_x > 0 && civilians + undercover <= mr_x {
        return Some(GameOutcome::MrXWin);
    }
    if mr_x == 0 && undercover > 0 && civilians <= undercover {
        return Some(GameOutcome::UndercoverWin);
    }
    if mr_x == 0 && undercover == 0 {
        return Some(GameOutcome::CivilianWin);
    }
    None
}
