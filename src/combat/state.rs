//! Persisted encounter and character state
//!
//! These are the JSON documents read and written by persistence and
//! rendering collaborators. Decoding is lenient: missing or non-numeric
//! numbers become 0 and the round never decodes below 1.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

use super::toggle::HitDiceUsed;

/// Per-combatant pool -> current hit points
pub type PoolHp = BTreeMap<String, i32>;

/// Dynamic state of an initiative tracker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiativeState {
    /// Identity key -> rolled initiative
    #[serde(default, deserialize_with = "lenient::int_map")]
    pub initiatives: BTreeMap<String, i32>,
    /// Identity key -> pool key -> current hit points
    #[serde(default, deserialize_with = "lenient::pool_map")]
    pub hp: BTreeMap<String, PoolHp>,
    /// Index into the initiative ordering; serialized as -1 when nobody is active
    #[serde(default, with = "active_index")]
    pub active_index: Option<usize>,
    #[serde(default = "first_round", deserialize_with = "lenient::round")]
    pub round: u32,
    /// Consumable key -> usage count
    #[serde(default, deserialize_with = "lenient::count_map")]
    pub consumables: BTreeMap<String, u32>,
}

fn first_round() -> u32 {
    1
}

impl Default for InitiativeState {
    fn default() -> Self {
        Self {
            initiatives: BTreeMap::new(),
            hp: BTreeMap::new(),
            active_index: None,
            round: 1,
            consumables: BTreeMap::new(),
        }
    }
}

impl InitiativeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initiative for a combatant, 0 when never rolled
    pub fn initiative(&self, key: &str) -> i32 {
        self.initiatives.get(key).copied().unwrap_or(0)
    }

    /// Current hit points of one pool, if tracked
    pub fn pool_hp(&self, key: &str, pool: &str) -> Option<i32> {
        self.hp.get(key).and_then(|pools| pools.get(pool)).copied()
    }

    /// Usage count of a consumable, 0 when untracked
    pub fn consumable_used(&self, key: &str) -> u32 {
        self.consumables.get(key).copied().unwrap_or(0)
    }
}

/// Dynamic state of one independently tracked character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthState {
    #[serde(default, deserialize_with = "lenient::int")]
    pub current: i32,
    #[serde(default, deserialize_with = "lenient::int")]
    pub temporary: i32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub death_save_successes: u32,
    #[serde(default, deserialize_with = "lenient::count")]
    pub death_save_failures: u32,
    #[serde(default)]
    pub hitdice_used: HitDiceUsed,
}

impl HealthState {
    /// A fresh character at `current` hit points
    pub fn new(current: i32) -> Self {
        Self {
            current,
            ..Self::default()
        }
    }
}

mod active_index {
    use super::*;

    pub fn serialize<S: Serializer>(index: &Option<usize>, s: S) -> Result<S::Ok, S::Error> {
        match index {
            Some(i) => s.serialize_i64(*i as i64),
            None => s.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<usize>, D::Error> {
        let value = Value::deserialize(d)?;
        let index = super::lenient::as_i64(&value);
        Ok(usize::try_from(index).ok())
    }
}

/// Forgiving numeric decoding for documents edited by hand or by other tools
pub(crate) mod lenient {
    use super::*;

    /// Read a JSON value as an integer; anything unusable is 0
    pub(crate) fn as_i64(value: &Value) -> i64 {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .unwrap_or(0),
            Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
            _ => 0,
        }
    }

    pub(crate) fn as_i32(value: &Value) -> i32 {
        as_i64(value).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }

    pub(crate) fn as_count(value: &Value) -> u32 {
        as_i64(value).clamp(0, u32::MAX as i64) as u32
    }

    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
        Ok(as_i32(&Value::deserialize(d)?))
    }

    pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(as_count(&Value::deserialize(d)?))
    }

    pub fn round<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        Ok(as_count(&Value::deserialize(d)?).max(1))
    }

    fn object<'de, D: Deserializer<'de>>(d: D) -> Result<serde_json::Map<String, Value>, D::Error> {
        match Value::deserialize(d)? {
            Value::Object(map) => Ok(map),
            _ => Ok(serde_json::Map::new()),
        }
    }

    pub fn int_map<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, i32>, D::Error> {
        Ok(object(d)?
            .into_iter()
            .map(|(k, v)| (k, as_i32(&v)))
            .collect())
    }

    pub fn count_map<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, u32>, D::Error> {
        Ok(object(d)?
            .into_iter()
            .map(|(k, v)| (k, as_count(&v)))
            .collect())
    }

    pub fn pool_map<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<BTreeMap<String, PoolHp>, D::Error> {
        Ok(object(d)?
            .into_iter()
            .map(|(key, pools)| {
                let pools: PoolHp = match pools {
                    Value::Object(map) => map.into_iter().map(|(p, v)| (p, as_i32(&v))).collect(),
                    _ => PoolHp::new(),
                };
                (key, pools)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_initiative_state() {
        let state = InitiativeState::new();
        assert_eq!(state.round, 1);
        assert_eq!(state.active_index, None);
        assert!(state.initiatives.is_empty());
        assert_eq!(state.initiative("nobody"), 0);
        assert_eq!(state.consumable_used("nothing"), 0);
    }

    #[test]
    fn test_initiative_state_json_shape() {
        let mut state = InitiativeState::new();
        state.initiatives.insert("Goblin|15|7".into(), 12);
        state
            .hp
            .insert("Goblin|15|7".into(), PoolHp::from([("main".into(), 5)]));
        state.consumables.insert("legendary".into(), 2);

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({
                "initiatives": {"Goblin|15|7": 12},
                "hp": {"Goblin|15|7": {"main": 5}},
                "activeIndex": -1,
                "round": 1,
                "consumables": {"legendary": 2}
            })
        );

        state.active_index = Some(2);
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["activeIndex"], 2);

        let back: InitiativeState = serde_json::from_value(value).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_lenient_initiative_decoding() {
        let state: InitiativeState = serde_json::from_value(json!({
            "initiatives": {"a": "17", "b": null, "c": 9.7},
            "hp": {"a": {"main": "x"}, "b": 4},
            "activeIndex": -1,
            "round": 0,
            "consumables": {"slots": -3}
        }))
        .unwrap();

        assert_eq!(state.initiative("a"), 17);
        assert_eq!(state.initiative("b"), 0);
        assert_eq!(state.initiative("c"), 9);
        assert_eq!(state.pool_hp("a", "main"), Some(0));
        assert!(state.hp["b"].is_empty());
        assert_eq!(state.active_index, None);
        assert_eq!(state.round, 1);
        assert_eq!(state.consumable_used("slots"), 0);
    }

    #[test]
    fn test_missing_fields_default() {
        let state: InitiativeState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, InitiativeState::new());

        let health: HealthState = serde_json::from_str("{}").unwrap();
        assert_eq!(health, HealthState::default());
    }

    #[test]
    fn test_health_state_json_shape() {
        let health: HealthState = serde_json::from_value(json!({
            "current": 0,
            "temporary": 4,
            "deathSaveSuccesses": 1,
            "deathSaveFailures": 2,
            "hitdiceUsed": {"d8": 1, "d6": 0}
        }))
        .unwrap();

        assert_eq!(health.temporary, 4);
        assert_eq!(health.death_save_failures, 2);
        assert_eq!(health.hitdice_used.used("d8"), 1);

        let value = serde_json::to_value(&health).unwrap();
        assert_eq!(value["hitdiceUsed"], json!({"d6": 0, "d8": 1}));
        assert_eq!(value["deathSaveSuccesses"], 1);

        let legacy: HealthState = serde_json::from_value(json!({"current": 12, "hitdiceUsed": 2})).unwrap();
        assert_eq!(legacy.hitdice_used, HitDiceUsed::Single(2));
    }
}
