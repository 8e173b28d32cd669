//! Character health sheet
//!
//! Tracks one character outside the initiative tracker: hit points with
//! temporary HP, hit dice usage, and death saves.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::health;
use super::roster::HitDice;
use super::state::HealthState;
use super::toggle::{self, toggle_in_row, DeathSave, HitDiceUsed, DEATH_SAVE_BOXES};

/// Static definition of a character's health block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBlock {
    pub max_hp: i32,
    #[serde(default)]
    pub hit_dice: Vec<HitDice>,
}

impl HealthBlock {
    pub fn new(max_hp: i32) -> Self {
        Self {
            max_hp,
            hit_dice: Vec::new(),
        }
    }

    pub fn with_hit_dice(mut self, dice: HitDice) -> Self {
        self.hit_dice.push(dice);
        self
    }

    /// Full hit points, nothing spent
    pub fn initial_state(&self) -> HealthState {
        HealthState {
            current: self.max_hp,
            hitdice_used: HitDiceUsed::for_dice(&self.hit_dice),
            ..HealthState::default()
        }
    }

    pub fn percentage(&self, state: &HealthState) -> f64 {
        health::health_percentage(state.current, self.max_hp)
    }
}

impl HealthState {
    /// Dead by failed death saves
    pub fn is_dead(&self) -> bool {
        toggle::is_dead(self.death_save_successes, self.death_save_failures)
    }

    /// Death saves resolved one way or the other
    pub fn death_saves_complete(&self) -> bool {
        toggle::is_complete(self.death_save_successes, self.death_save_failures)
    }

    pub fn should_track_death_saves(&self) -> bool {
        toggle::should_track_death_saves(self.current)
    }
}

/// A user action against a health sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum HealthAction {
    Damage { amount: i32 },
    Heal { amount: i32 },
    AddTemporary { amount: i32 },
    ToggleHitDie { die_type: String, index: u32 },
    ToggleDeathSave { save: DeathSave, index: u32 },
    /// Full hit points, no temporary HP, death saves cleared, hit dice restored
    LongRest,
    Reset,
}

/// Apply one action and return the next health state
pub fn reduce_health(block: &HealthBlock, state: &HealthState, action: &HealthAction) -> HealthState {
    match action {
        HealthAction::Damage { amount } => {
            let result = health::damage(state.current, state.temporary, *amount);
            HealthState {
                current: result.current,
                temporary: result.temporary,
                ..state.clone()
            }
        }
        HealthAction::Heal { amount } => {
            let result = health::heal(state.current, *amount, block.max_hp);
            let mut next = HealthState {
                current: result.current,
                ..state.clone()
            };
            if result.reset_death_saves {
                debug!("back on their feet at {} hp, clearing death saves", result.current);
                next.death_save_successes = 0;
                next.death_save_failures = 0;
            }
            next
        }
        HealthAction::AddTemporary { amount } => HealthState {
            temporary: health::apply_temporary(state.temporary, *amount),
            ..state.clone()
        },
        HealthAction::ToggleHitDie { die_type, index } => HealthState {
            hitdice_used: state.hitdice_used.toggle(&block.hit_dice, die_type, *index),
            ..state.clone()
        },
        HealthAction::ToggleDeathSave { save, index } => {
            let mut next = state.clone();
            let counter = match save {
                DeathSave::Success => &mut next.death_save_successes,
                DeathSave::Failure => &mut next.death_save_failures,
            };
            *counter = toggle_in_row(*counter, *index, DEATH_SAVE_BOXES);
            next
        }
        HealthAction::LongRest => HealthState {
            current: block.max_hp,
            temporary: 0,
            death_save_successes: 0,
            death_save_failures: 0,
            hitdice_used: state.hitdice_used.restored(),
        },
        HealthAction::Reset => block.initial_state(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter() -> HealthBlock {
        HealthBlock::new(10).with_hit_dice(HitDice::new("d10", 3))
    }

    fn at(current: i32) -> HealthState {
        HealthState::new(current)
    }

    #[test]
    fn test_initial_state() {
        let state = fighter().initial_state();
        assert_eq!(state.current, 10);
        assert_eq!(state.hitdice_used, HitDiceUsed::Single(0));

        let multi = HealthBlock::new(30)
            .with_hit_dice(HitDice::new("d8", 2))
            .with_hit_dice(HitDice::new("d6", 3))
            .initial_state();
        assert_eq!(multi.hitdice_used.used("d6"), 0);
        assert!(matches!(multi.hitdice_used, HitDiceUsed::ByDie(_)));
    }

    #[test]
    fn test_damage_spends_temporary_first() {
        let state = HealthState {
            temporary: 3,
            ..at(10)
        };
        let next = reduce_health(&fighter(), &state, &HealthAction::Damage { amount: 5 });
        assert_eq!(next.current, 8);
        assert_eq!(next.temporary, 0);
    }

    #[test]
    fn test_noop_amounts() {
        let state = HealthState {
            temporary: 2,
            death_save_failures: 1,
            ..at(4)
        };
        for amount in [0, -3] {
            for action in [
                HealthAction::Damage { amount },
                HealthAction::Heal { amount },
                HealthAction::AddTemporary { amount },
            ] {
                assert_eq!(reduce_health(&fighter(), &state, &action), state);
            }
        }
    }

    #[test]
    fn test_heal_from_zero_clears_death_saves() {
        let state = HealthState {
            death_save_successes: 2,
            death_save_failures: 1,
            ..at(0)
        };
        let next = reduce_health(&fighter(), &state, &HealthAction::Heal { amount: 5 });
        assert_eq!(next.current, 5);
        assert_eq!(next.death_save_successes, 0);
        assert_eq!(next.death_save_failures, 0);
    }

    #[test]
    fn test_heal_while_conscious_keeps_counters() {
        let state = HealthState {
            death_save_failures: 1,
            ..at(3)
        };
        let next = reduce_health(&fighter(), &state, &HealthAction::Heal { amount: 20 });
        assert_eq!(next.current, 10);
        assert_eq!(next.death_save_failures, 1);
    }

    #[test]
    fn test_temporary_hp() {
        let state = at(10);
        let next = reduce_health(&fighter(), &state, &HealthAction::AddTemporary { amount: 5 });
        assert_eq!(next.temporary, 5);
        let next = reduce_health(&fighter(), &next, &HealthAction::AddTemporary { amount: 3 });
        assert_eq!(next.temporary, 5);
    }

    #[test]
    fn test_death_saves() {
        let block = fighter();
        let mut state = at(0);
        assert!(state.should_track_death_saves());

        for index in 0..3 {
            state = reduce_health(
                &block,
                &state,
                &HealthAction::ToggleDeathSave {
                    save: DeathSave::Failure,
                    index,
                },
            );
        }
        assert_eq!(state.death_save_failures, 3);
        assert!(state.is_dead());
        assert!(state.death_saves_complete());

        // Unchecking the second box clears the second and third
        state = reduce_health(
            &block,
            &state,
            &HealthAction::ToggleDeathSave {
                save: DeathSave::Failure,
                index: 1,
            },
        );
        assert_eq!(state.death_save_failures, 1);
        assert!(!state.is_dead());

        state = reduce_health(
            &block,
            &state,
            &HealthAction::ToggleDeathSave {
                save: DeathSave::Success,
                index: 2,
            },
        );
        assert_eq!(state.death_save_successes, 3);
        assert!(state.death_saves_complete());
        assert!(!state.is_dead());
    }

    #[test]
    fn test_toggles_accepted_while_conscious() {
        let next = reduce_health(
            &fighter(),
            &at(10),
            &HealthAction::ToggleDeathSave {
                save: DeathSave::Success,
                index: 0,
            },
        );
        assert_eq!(next.death_save_successes, 1);
    }

    #[test]
    fn test_hit_dice_toggle() {
        let block = fighter();
        let state = block.initial_state();
        let state = reduce_health(
            &block,
            &state,
            &HealthAction::ToggleHitDie {
                die_type: "d10".into(),
                index: 1,
            },
        );
        assert_eq!(state.hitdice_used, HitDiceUsed::Single(2));
    }

    #[test]
    fn test_long_rest() {
        let block = fighter();
        let state = HealthState {
            temporary: 4,
            death_save_successes: 1,
            death_save_failures: 2,
            hitdice_used: HitDiceUsed::Single(3),
            ..at(0)
        };
        let rested = reduce_health(&block, &state, &HealthAction::LongRest);
        assert_eq!(rested, block.initial_state());
    }

    #[test]
    fn test_percentage() {
        let block = fighter();
        assert_eq!(block.percentage(&at(5)), 50.0);
        assert_eq!(HealthBlock::new(0).percentage(&at(5)), 0.0);
    }

    #[test]
    fn test_health_action_json() {
        let action: HealthAction =
            serde_json::from_str(r#"{"type": "toggle-death-save", "save": "failure", "index": 0}"#)
                .unwrap();
        assert_eq!(
            action,
            HealthAction::ToggleDeathSave {
                save: DeathSave::Failure,
                index: 0
            }
        );
    }
}
