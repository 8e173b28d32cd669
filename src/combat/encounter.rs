//! Encounter reducer
//!
//! `reduce` is the single entry point for tracker actions: it takes the
//! per-encounter context and the current snapshot and returns a complete
//! replacement snapshot. Actions that change nothing return a value equal
//! to the input, so callers can skip persisting.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::consumables;
use super::dice::roll_initiative;
use super::health;
use super::identity::MAIN_POOL;
use super::roster::{Combatant, ConsumableDef, RestKind};
use super::state::InitiativeState;
use super::turn::{self, sort_by_initiative};

/// Static inputs for one encounter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterContext {
    #[serde(default)]
    pub roster: Vec<Combatant>,
    #[serde(default)]
    pub consumables: Vec<ConsumableDef>,
}

impl EncounterContext {
    pub fn new(roster: Vec<Combatant>, consumables: Vec<ConsumableDef>) -> Self {
        Self {
            roster,
            consumables,
        }
    }

    /// A fresh snapshot for this roster
    pub fn initial_state(&self) -> InitiativeState {
        turn::reset(&self.roster, &self.consumables)
    }

    /// Look up a roster entry by identity key
    pub fn combatant(&self, key: &str) -> Option<&Combatant> {
        self.roster.iter().find(|c| c.key() == key)
    }

    /// Roster in turn order for this snapshot
    pub fn turn_order(&self, state: &InitiativeState) -> Vec<&Combatant> {
        sort_by_initiative(&self.roster, &state.initiatives)
    }

    /// The combatant whose turn it is
    pub fn active(&self, state: &InitiativeState) -> Option<&Combatant> {
        let index = state.active_index?;
        self.turn_order(state).get(index).copied()
    }
}

fn main_pool() -> String {
    MAIN_POOL.to_string()
}

/// A user action against the initiative tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    /// Next combatant's turn
    Advance,
    /// Previous combatant's turn
    Rewind,
    /// Back to round 1 with nobody active
    Reset,
    SetInitiative {
        key: String,
        value: i32,
    },
    Damage {
        key: String,
        #[serde(default = "main_pool")]
        pool: String,
        amount: i32,
    },
    Heal {
        key: String,
        #[serde(default = "main_pool")]
        pool: String,
        amount: i32,
    },
    ToggleConsumable {
        key: String,
        index: u32,
    },
    Rest {
        kind: RestKind,
    },
}

/// Apply one action and return the next snapshot
pub fn reduce(ctx: &EncounterContext, state: &InitiativeState, action: &Action) -> InitiativeState {
    match action {
        Action::Advance => consumables::advance_turn(&ctx.roster, &ctx.consumables, state),
        Action::Rewind => consumables::rewind_turn(&ctx.roster, state),
        Action::Reset => ctx.initial_state(),
        Action::SetInitiative { key, value } => set_initiative(ctx, state, key, *value),
        Action::Damage { key, pool, amount } => {
            if *amount <= 0 {
                return state.clone();
            }
            update_pool(ctx, state, key, pool, |current, _| {
                health::damage(current, 0, *amount).current
            })
        }
        Action::Heal { key, pool, amount } => {
            if *amount <= 0 {
                return state.clone();
            }
            update_pool(ctx, state, key, pool, |current, max| {
                health::heal(current, *amount, max).current
            })
        }
        Action::ToggleConsumable { key, index } => InitiativeState {
            consumables: consumables::toggle_use(&ctx.consumables, &state.consumables, key, *index),
            ..state.clone()
        },
        Action::Rest { kind } => {
            debug!("{} taken, resetting consumables", kind);
            InitiativeState {
                consumables: consumables::reset_on_rest(&ctx.consumables, &state.consumables, *kind),
                ..state.clone()
            }
        }
    }
}

/// Roll d20 + modifier initiative for every combatant lacking one
///
/// A combatant lacks an initiative when it has no entry or its entry is 0,
/// which is what `Reset` seeds. Hand-set values are kept. The active
/// combatant keeps the turn even if the ordering changes.
pub fn roll_initiatives<R: Rng>(
    ctx: &EncounterContext,
    state: &InitiativeState,
    rng: &mut R,
) -> InitiativeState {
    let mut initiatives = state.initiatives.clone();
    for combatant in &ctx.roster {
        let key = combatant.key();
        if initiatives.get(&key).is_some_and(|&value| value != 0) {
            continue;
        }
        let roll = roll_initiative(rng, combatant.initiative_modifier);
        debug!("{} rolled {} for initiative", combatant.name, roll);
        initiatives.insert(key, roll);
    }
    reorder(ctx, state, initiatives)
}

fn set_initiative(
    ctx: &EncounterContext,
    state: &InitiativeState,
    key: &str,
    value: i32,
) -> InitiativeState {
    if ctx.combatant(key).is_none() {
        return state.clone();
    }
    let mut initiatives = state.initiatives.clone();
    initiatives.insert(key.to_string(), value);
    reorder(ctx, state, initiatives)
}

/// Install new initiatives, moving the active index to follow the active roster slot
fn reorder(
    ctx: &EncounterContext,
    state: &InitiativeState,
    initiatives: BTreeMap<String, i32>,
) -> InitiativeState {
    let active_slot = state.active_index.and_then(|index| {
        turn::initiative_order(&ctx.roster, &state.initiatives)
            .get(index)
            .copied()
    });
    let mut next = InitiativeState {
        initiatives,
        ..state.clone()
    };
    if let Some(slot) = active_slot {
        next.active_index = turn::initiative_order(&ctx.roster, &next.initiatives)
            .iter()
            .position(|&s| s == slot);
    }
    next
}

/// Rewrite one hit point pool, clamped to `[0, max]`
///
/// Untracked pools start at their maximum. Unknown combatants or pools
/// leave the state untouched.
fn update_pool(
    ctx: &EncounterContext,
    state: &InitiativeState,
    key: &str,
    pool: &str,
    apply: impl FnOnce(i32, i32) -> i32,
) -> InitiativeState {
    let Some(max) = ctx.combatant(key).and_then(|c| c.hp.max_for(pool)) else {
        return state.clone();
    };
    let max = max.max(0);

    let current = state.pool_hp(key, pool).unwrap_or(max).clamp(0, max);
    let updated = apply(current, max).clamp(0, max);
    debug!("{} [{}]: {} -> {} hp", key, pool, current, updated);

    let mut next = state.clone();
    next.hp
        .entry(key.to_string())
        .or_default()
        .insert(pool.to_string(), updated);
    next
}
