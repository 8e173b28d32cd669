//! Turn order and round counting
//!
//! Round boundaries are detected by the turn pointer wrapping around the
//! initiative ordering; there is no separate end-of-round action.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use super::consumables;
use super::roster::{Combatant, ConsumableDef};
use super::state::{InitiativeState, PoolHp};

/// Outcome of moving the turn pointer forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub active: Option<usize>,
    pub round: u32,
    /// Whether the pointer wrapped past the last combatant
    pub round_incremented: bool,
}

/// Outcome of moving the turn pointer backward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rewind {
    pub active: Option<usize>,
    pub round: u32,
}

/// Roster slots ordered by initiative, highest first
///
/// Ties keep roster order. Combatants without a rolled initiative sort as 0.
/// Copies of one combatant share an identity key, so the slot is what tells
/// them apart.
pub fn initiative_order(roster: &[Combatant], initiatives: &BTreeMap<String, i32>) -> Vec<usize> {
    let mut slots: Vec<(i32, usize)> = roster
        .iter()
        .enumerate()
        .map(|(slot, c)| (initiatives.get(&c.key()).copied().unwrap_or(0), slot))
        .collect();
    slots.sort_by_key(|(initiative, _)| Reverse(*initiative));
    slots.into_iter().map(|(_, slot)| slot).collect()
}

/// Roster entries ordered by initiative, highest first
pub fn sort_by_initiative<'a>(
    roster: &'a [Combatant],
    initiatives: &BTreeMap<String, i32>,
) -> Vec<&'a Combatant> {
    initiative_order(roster, initiatives)
        .into_iter()
        .map(|slot| &roster[slot])
        .collect()
}

/// Move to the next combatant in `sorted`
pub fn advance<T>(sorted: &[T], active: Option<usize>, round: u32) -> Advance {
    let round = round.max(1);

    if sorted.is_empty() {
        return Advance {
            active: None,
            round,
            round_incremented: false,
        };
    }

    match active {
        Some(i) if i + 1 < sorted.len() => Advance {
            active: Some(i + 1),
            round,
            round_incremented: false,
        },
        // Last combatant, or a stale index: wrap to the top
        Some(_) => Advance {
            active: Some(0),
            round: round.saturating_add(1),
            round_incremented: true,
        },
        // First turn of the encounter
        None => Advance {
            active: Some(0),
            round,
            round_incremented: false,
        },
    }
}

/// Move to the previous combatant in `sorted`
///
/// Wrapping backward past the first combatant steps the round back by
/// one, never below 1.
pub fn rewind<T>(sorted: &[T], active: Option<usize>, round: u32) -> Rewind {
    let round = round.max(1);

    if sorted.is_empty() {
        return Rewind {
            active: None,
            round,
        };
    }

    let last = sorted.len() - 1;
    match active {
        Some(i) if i > 0 && i <= last => Rewind {
            active: Some(i - 1),
            round,
        },
        Some(_) => Rewind {
            active: Some(last),
            round: round.saturating_sub(1).max(1),
        },
        None => Rewind {
            active: Some(last),
            round,
        },
    }
}

/// Fresh hit points for every roster pool, at maximum
pub fn seed_hp(roster: &[Combatant]) -> BTreeMap<String, PoolHp> {
    roster
        .iter()
        .map(|c| (c.key(), c.hp.pools().into_iter().collect()))
        .collect()
}

/// Return an encounter to its initial state
///
/// Initiatives and consumable counts are zeroed, hit points are reseeded
/// from the roster, the round is 1 and nobody is active.
pub fn reset(roster: &[Combatant], consumable_defs: &[ConsumableDef]) -> InitiativeState {
    InitiativeState {
        initiatives: roster.iter().map(|c| (c.key(), 0)).collect(),
        hp: seed_hp(roster),
        active_index: None,
        round: 1,
        consumables: consumables::zeroed(consumable_defs),
    }
}
