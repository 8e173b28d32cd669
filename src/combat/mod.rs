//! Combat state engine
//!
//! Tracks a tabletop encounter as pure state transitions:
//! - Turn order and round counting
//! - Hit points, temporary HP, damage and healing
//! - Hit dice and death saves as cascading checkbox rows
//! - Consumables that reset on new rounds or rests
//!
//! Every transition takes the previous snapshot and returns a new one.

mod consumables;
mod dice;
mod encounter;
mod health;
mod identity;
mod manager;
mod roster;
mod sheet;
mod state;
mod toggle;
mod turn;

pub use consumables::{advance_turn, reset_on_rest, reset_on_round, rewind_turn, toggle_use};
pub use dice::{parse_dice, parse_die_type, roll_initiative, DiceRoll, ParseDiceError};
pub use encounter::{reduce, roll_initiatives, Action, EncounterContext};
pub use health::{apply_temporary, damage, heal, health_percentage, Damaged, Healed};
pub use identity::{identity_key, MAIN_POOL};
pub use manager::{Encounter, EncounterError, EncounterManager};
pub use roster::{Combatant, ConsumableDef, HitDice, HpCapacity, RestKind};
pub use sheet::{reduce_health, HealthAction, HealthBlock};
pub use state::{HealthState, InitiativeState, PoolHp};
pub use toggle::{
    is_complete, is_dead, should_track_death_saves, toggle, toggle_in_row, DeathSave, HitDiceUsed,
    DEATH_SAVE_BOXES,
};
pub use turn::{advance, initiative_order, reset, rewind, sort_by_initiative, Advance, Rewind};
