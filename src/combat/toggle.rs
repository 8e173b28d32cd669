//! Checkbox-row tracking for hit dice and death saves
//!
//! A row of boxes is stored as a count of used boxes. Clicking a box
//! toggles a contiguous prefix rather than a single bit:
//! - clicking a used box unchecks it and every box after it
//! - clicking an unused box checks it and every box before it

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::roster::HitDice;
use super::state::lenient;

/// Boxes in each death-save row
pub const DEATH_SAVE_BOXES: u32 = 3;

/// Apply the cascading toggle rule to a used-box count
///
/// Saturates at `u32::MAX`.
pub fn toggle(used: u32, index: u32) -> u32 {
    if index < used {
        index
    } else {
        index.saturating_add(1)
    }
}

/// Toggle within a row of `boxes`; clicks outside the row change nothing
pub fn toggle_in_row(used: u32, index: u32, boxes: u32) -> u32 {
    if index >= boxes {
        return used;
    }
    toggle(used, index).min(boxes)
}

/// Which death-save row a toggle applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathSave {
    Success,
    Failure,
}

/// Three failures before three successes
pub fn is_dead(successes: u32, failures: u32) -> bool {
    failures >= DEATH_SAVE_BOXES && successes < DEATH_SAVE_BOXES
}

/// Either row is full, so the saving-throw sequence is resolved
pub fn is_complete(successes: u32, failures: u32) -> bool {
    successes >= DEATH_SAVE_BOXES || failures >= DEATH_SAVE_BOXES
}

/// Whether death saves are meaningful at this hit point total
pub fn should_track_death_saves(current_hp: i32) -> bool {
    current_hp <= 0
}

/// Used hit dice: one shared counter (legacy) or one counter per die type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HitDiceUsed {
    /// Legacy characters with a single die type
    Single(u32),
    /// Die type -> used count
    ByDie(BTreeMap<String, u32>),
}

impl Default for HitDiceUsed {
    fn default() -> Self {
        HitDiceUsed::Single(0)
    }
}

impl HitDiceUsed {
    /// Fresh counters matching a set of hit dice definitions
    pub fn for_dice(dice: &[HitDice]) -> Self {
        if dice.len() <= 1 {
            HitDiceUsed::Single(0)
        } else {
            HitDiceUsed::ByDie(dice.iter().map(|d| (d.die_type.clone(), 0)).collect())
        }
    }

    /// Used count for a die type (the shared counter for legacy state)
    pub fn used(&self, die_type: &str) -> u32 {
        match self {
            HitDiceUsed::Single(used) => *used,
            HitDiceUsed::ByDie(map) => map.get(die_type).copied().unwrap_or(0),
        }
    }

    /// Total used across all die types
    pub fn total(&self) -> u32 {
        match self {
            HitDiceUsed::Single(used) => *used,
            HitDiceUsed::ByDie(map) => map.values().sum(),
        }
    }

    /// Toggle box `index` of the row for `die_type`
    ///
    /// `dice` supplies the row sizes. Legacy state has a single row sized
    /// by the total die count, whatever `die_type` names.
    pub fn toggle(&self, dice: &[HitDice], die_type: &str, index: u32) -> Self {
        match self {
            HitDiceUsed::Single(used) => {
                let boxes = dice.iter().map(|d| d.count).sum();
                HitDiceUsed::Single(toggle_in_row(*used, index, boxes))
            }
            HitDiceUsed::ByDie(map) => {
                let Some(def) = dice.iter().find(|d| d.die_type == die_type) else {
                    return self.clone();
                };
                let mut map = map.clone();
                let used = map.get(die_type).copied().unwrap_or(0);
                map.insert(die_type.to_string(), toggle_in_row(used, index, def.count));
                HitDiceUsed::ByDie(map)
            }
        }
    }

    /// Every die unused, keeping the representation
    pub fn restored(&self) -> Self {
        match self {
            HitDiceUsed::Single(_) => HitDiceUsed::Single(0),
            HitDiceUsed::ByDie(map) => {
                HitDiceUsed::ByDie(map.keys().map(|k| (k.clone(), 0)).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for HitDiceUsed {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Object(map) => HitDiceUsed::ByDie(
                map.into_iter()
                    .map(|(k, v)| (k, lenient::as_count(&v)))
                    .collect(),
            ),
            other => HitDiceUsed::Single(lenient::as_count(&other)),
        })
    }
}
