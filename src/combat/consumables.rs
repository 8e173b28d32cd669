//! Consumable resources and their resets
//!
//! Usage counts live in `InitiativeState::consumables`. The turn pointer
//! and the round-reset of flagged consumables are applied together, so a
//! caller never sees a new round with stale usage.

use std::collections::BTreeMap;
use tracing::debug;

use super::roster::{Combatant, ConsumableDef, RestKind};
use super::state::InitiativeState;
use super::toggle::toggle_in_row;
use super::turn::{self, sort_by_initiative};

/// Usage counts with every declared consumable at 0
pub fn zeroed(defs: &[ConsumableDef]) -> BTreeMap<String, u32> {
    defs.iter().map(|d| (d.state_key.clone(), 0)).collect()
}

/// Zero every consumable matching `resets`
fn reset_where(
    defs: &[ConsumableDef],
    counts: &BTreeMap<String, u32>,
    resets: impl Fn(&ConsumableDef) -> bool,
) -> BTreeMap<String, u32> {
    let mut counts = counts.clone();
    for def in defs.iter().filter(|d| resets(d)) {
        counts.insert(def.state_key.clone(), 0);
    }
    counts
}

/// Zero every consumable flagged to reset on a new round
pub fn reset_on_round(
    defs: &[ConsumableDef],
    counts: &BTreeMap<String, u32>,
) -> BTreeMap<String, u32> {
    reset_where(defs, counts, |d| d.resets_on_round)
}

/// Zero every consumable restored by a rest of `kind`
pub fn reset_on_rest(
    defs: &[ConsumableDef],
    counts: &BTreeMap<String, u32>,
    kind: RestKind,
) -> BTreeMap<String, u32> {
    reset_where(defs, counts, |d| d.resets_on(kind))
}

/// Toggle box `index` of a consumable's usage row
///
/// Undeclared keys are left alone.
pub fn toggle_use(
    defs: &[ConsumableDef],
    counts: &BTreeMap<String, u32>,
    key: &str,
    index: u32,
) -> BTreeMap<String, u32> {
    let Some(def) = defs.iter().find(|d| d.state_key == key) else {
        return counts.clone();
    };

    let used = counts.get(key).copied().unwrap_or(0);
    let mut counts = counts.clone();
    counts.insert(key.to_string(), toggle_in_row(used, index, def.uses));
    counts
}

/// Advance the turn pointer, resetting round-scoped consumables on wrap
pub fn advance_turn(
    roster: &[Combatant],
    defs: &[ConsumableDef],
    state: &InitiativeState,
) -> InitiativeState {
    let sorted = sort_by_initiative(roster, &state.initiatives);
    let step = turn::advance(&sorted, state.active_index, state.round);

    let consumables = if step.round_incremented {
        debug!("round {} begins, resetting round consumables", step.round);
        reset_on_round(defs, &state.consumables)
    } else {
        state.consumables.clone()
    };

    InitiativeState {
        active_index: step.active,
        round: step.round,
        consumables,
        ..state.clone()
    }
}

/// Rewind the turn pointer; usage counts are left as they are
pub fn rewind_turn(roster: &[Combatant], state: &InitiativeState) -> InitiativeState {
    let sorted = sort_by_initiative(roster, &state.initiatives);
    let step = turn::rewind(&sorted, state.active_index, state.round);

    if step.round != state.round {
        debug!("rewound to round {}", step.round);
    }

    InitiativeState {
        active_index: step.active,
        round: step.round,
        ..state.clone()
    }
}
