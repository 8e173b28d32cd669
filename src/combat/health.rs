//! Hit point arithmetic
//!
//! Pure functions over current, maximum and temporary hit points:
//! - Healing (capped at maximum)
//! - Damage (temporary HP absorbs first, floored at 0)
//! - Temporary HP (never stacks, never lowered here)
//!
//! Non-positive amounts are no-ops and return their inputs unchanged.

/// Result of healing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Healed {
    /// Hit points after healing
    pub current: i32,
    /// Whether the heal brought the character back above 0 HP
    pub reset_death_saves: bool,
}

/// Result of damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Damaged {
    pub current: i32,
    pub temporary: i32,
}

/// Heal `amount` hit points, capped at `max`
pub fn heal(current: i32, amount: i32, max: i32) -> Healed {
    if amount <= 0 {
        return Healed {
            current,
            reset_death_saves: false,
        };
    }

    let healed = current.saturating_add(amount).min(max);
    Healed {
        current: healed,
        reset_death_saves: current <= 0 && healed > 0,
    }
}

/// Apply `amount` damage, spending temporary hit points first
pub fn damage(current: i32, temporary: i32, amount: i32) -> Damaged {
    if amount <= 0 {
        return Damaged { current, temporary };
    }

    if amount <= temporary {
        return Damaged {
            current,
            temporary: temporary - amount,
        };
    }

    let remainder = amount - temporary.max(0);
    Damaged {
        current: current.saturating_sub(remainder).max(0),
        temporary: 0,
    }
}

/// Grant temporary hit points; the larger of old and new is kept
pub fn apply_temporary(temporary: i32, amount: i32) -> i32 {
    if amount <= 0 {
        return temporary;
    }
    temporary.max(amount)
}

/// Current hit points as a display percentage in `[0, 100]`
pub fn health_percentage(current: i32, max: i32) -> f64 {
    if max <= 0 {
        return 0.0;
    }
    (current as f64 / max as f64 * 100.0).clamp(0.0, 100.0)
}
