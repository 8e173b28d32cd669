//! Static combatant definitions
//!
//! The roster is supplied from outside the engine:
//! - Combatants (name, armor class, hit point capacity, hit dice, link)
//! - Consumable resources and the events that reset them
//!
//! Nothing in here is mutated by a transition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::dice::{parse_die_type, DiceRoll, ParseDiceError};
use super::identity::{identity_key, MAIN_POOL};

/// Hit point capacity of a combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HpCapacity {
    /// A single pool, tracked under the "main" pool key
    Single(i32),
    /// A group of identical sub-entities, one pool per entry
    Group(BTreeMap<String, i32>),
}

impl HpCapacity {
    /// All pools with their maximum hit points
    pub fn pools(&self) -> Vec<(String, i32)> {
        match self {
            HpCapacity::Single(max) => vec![(MAIN_POOL.to_string(), *max)],
            HpCapacity::Group(pools) => pools.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        }
    }

    /// Maximum hit points for one pool
    pub fn max_for(&self, pool: &str) -> Option<i32> {
        match self {
            HpCapacity::Single(max) if pool == MAIN_POOL => Some(*max),
            HpCapacity::Single(_) => None,
            HpCapacity::Group(pools) => pools.get(pool).copied(),
        }
    }
}

/// A hit die definition, e.g. 3 x d8
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HitDice {
    /// Die type in dice notation ("d8", "d10")
    pub die_type: String,
    /// Number of dice of this type
    pub count: u32,
}

impl HitDice {
    pub fn new(die_type: &str, count: u32) -> Self {
        Self {
            die_type: die_type.to_string(),
            count,
        }
    }

    /// The die this entry rolls
    pub fn die(&self) -> Result<DiceRoll, ParseDiceError> {
        parse_die_type(&self.die_type)
    }
}

/// A combatant in the encounter roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub name: String,
    #[serde(default)]
    pub armor_class: i32,
    pub hp: HpCapacity,
    #[serde(default)]
    pub hit_dice: Vec<HitDice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Added to the d20 when initiative is rolled
    #[serde(default)]
    pub initiative_modifier: i32,
}

impl Combatant {
    /// Create a single-pool combatant
    pub fn new(name: &str, armor_class: i32, max_hp: i32) -> Self {
        Self {
            name: name.to_string(),
            armor_class,
            hp: HpCapacity::Single(max_hp),
            hit_dice: Vec::new(),
            link: None,
            initiative_modifier: 0,
        }
    }

    /// Create a grouped combatant with one pool per member
    pub fn group(name: &str, armor_class: i32, members: &[(&str, i32)]) -> Self {
        let pools = members
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        Self {
            hp: HpCapacity::Group(pools),
            ..Self::new(name, armor_class, 0)
        }
    }

    pub fn with_link(mut self, link: &str) -> Self {
        self.link = Some(link.to_string());
        self
    }

    pub fn with_hit_dice(mut self, dice: HitDice) -> Self {
        self.hit_dice.push(dice);
        self
    }

    pub fn with_initiative_modifier(mut self, modifier: i32) -> Self {
        self.initiative_modifier = modifier;
        self
    }

    /// Check every hit die type, returning the first bad one
    pub fn validate_hit_dice(&self) -> Result<(), (String, ParseDiceError)> {
        for dice in &self.hit_dice {
            dice.die().map_err(|err| (dice.die_type.clone(), err))?;
        }
        Ok(())
    }

    /// Stable identity key used by every per-combatant state map
    pub fn key(&self) -> String {
        identity_key(self)
    }
}

/// Kind of rest taken by the party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestKind {
    ShortRest,
    LongRest,
}

impl RestKind {
    /// Whether a rest of this kind also satisfies a `needed` reset
    ///
    /// A long rest covers everything a short rest does.
    pub fn covers(&self, needed: RestKind) -> bool {
        match self {
            RestKind::LongRest => true,
            RestKind::ShortRest => needed == RestKind::ShortRest,
        }
    }
}

impl FromStr for RestKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" | "short-rest" | "short_rest" => Ok(RestKind::ShortRest),
            "long" | "long-rest" | "long_rest" => Ok(RestKind::LongRest),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for RestKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RestKind::ShortRest => "short-rest",
            RestKind::LongRest => "long-rest",
        };
        write!(f, "{}", s)
    }
}

/// A limited-use resource declared alongside the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumableDef {
    /// Key into `InitiativeState::consumables`
    pub state_key: String,
    /// Number of boxes; toggles past this are ignored
    #[serde(default = "default_uses")]
    pub uses: u32,
    /// Zero usage whenever the round counter increments
    #[serde(default)]
    pub resets_on_round: bool,
    /// Zero usage on this kind of rest (a long rest also covers short-rest resources)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resets_on_rest: Option<RestKind>,
}

fn default_uses() -> u32 {
    1
}

impl ConsumableDef {
    pub fn new(state_key: &str, uses: u32) -> Self {
        Self {
            state_key: state_key.to_string(),
            uses,
            resets_on_round: false,
            resets_on_rest: None,
        }
    }

    /// Mark this consumable as reset at every round boundary
    pub fn per_round(mut self) -> Self {
        self.resets_on_round = true;
        self
    }

    pub fn per_rest(mut self, kind: RestKind) -> Self {
        self.resets_on_rest = Some(kind);
        self
    }

    /// Whether a rest of `kind` resets this consumable
    pub fn resets_on(&self, kind: RestKind) -> bool {
        self.resets_on_rest.is_some_and(|needed| kind.covers(needed))
    }
}
