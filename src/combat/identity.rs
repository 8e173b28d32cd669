//! Combatant identity keys
//!
//! Keys are derived only from static fields, so two roster entries with
//! identical fields share one slot in every state map.

use super::roster::{Combatant, HpCapacity};

/// Pool key used for single-pool combatants
pub const MAIN_POOL: &str = "main";

/// Derive the identity key for a combatant
///
/// Format: `name|armor_class|hp[|link]`, where `hp` is the capacity for
/// single pools or `pool=max` pairs (sorted by pool) for groups.
pub fn identity_key(combatant: &Combatant) -> String {
    let hp = match &combatant.hp {
        HpCapacity::Single(max) => max.to_string(),
        HpCapacity::Group(pools) => pools
            .iter()
            .map(|(pool, max)| format!("{}={}", pool, max))
            .collect::<Vec<_>>()
            .join(","),
    };

    let mut key = format!("{}|{}|{}", combatant.name, combatant.armor_class, hp);
    if let Some(link) = &combatant.link {
        key.push('|');
        key.push_str(link);
    }
    key
}
