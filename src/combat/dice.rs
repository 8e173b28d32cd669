//! Dice notation
//!
//! Parses notation like "1d20+3", checks hit die types and rolls initiative.

use rand::Rng;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing dice notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDiceError {
    #[error("missing 'd' in dice notation")]
    MissingSeparator,

    #[error("invalid dice count: {0}")]
    InvalidCount(String),

    #[error("invalid die sides: {0}")]
    InvalidSides(String),

    #[error("invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("not a single die: {0}")]
    NotSingleDie(String),
}

/// A parsed dice roll specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiceRoll {
    /// Number of dice to roll
    pub count: u32,
    /// Number of sides per die
    pub sides: u32,
    /// Modifier to add/subtract
    pub modifier: i32,
}

impl DiceRoll {
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Roll with the given random source
    pub fn roll_with<R: Rng>(&self, rng: &mut R) -> i32 {
        let sum: i32 = (0..self.count)
            .map(|_| rng.random_range(1..=self.sides) as i32)
            .sum();
        sum + self.modifier
    }

    /// One die with no modifier, as a hit die type is written
    pub fn is_single_die(&self) -> bool {
        self.count == 1 && self.modifier == 0
    }
}

impl FromStr for DiceRoll {
    type Err = ParseDiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

/// Parse a dice notation string like "2d6+3"
pub fn parse_dice(notation: &str) -> Result<DiceRoll, ParseDiceError> {
    let notation = notation.trim().to_lowercase();

    let d_pos = notation.find('d').ok_or(ParseDiceError::MissingSeparator)?;

    let count_str = &notation[..d_pos];
    let count: u32 = if count_str.is_empty() {
        1 // "d6" means "1d6"
    } else {
        count_str
            .parse()
            .map_err(|_| ParseDiceError::InvalidCount(count_str.to_string()))?
    };

    if count == 0 {
        return Err(ParseDiceError::InvalidCount(count_str.to_string()));
    }

    let rest = &notation[d_pos + 1..];

    let (sides_str, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
        Some(pos) if pos > 0 => {
            let mod_str = rest[pos..].trim_start_matches('+');
            let modifier: i32 = mod_str
                .parse()
                .map_err(|_| ParseDiceError::InvalidModifier(mod_str.to_string()))?;
            (&rest[..pos], modifier)
        }
        _ => (rest, 0),
    };

    let sides: u32 = sides_str
        .parse()
        .map_err(|_| ParseDiceError::InvalidSides(sides_str.to_string()))?;

    if sides == 0 {
        return Err(ParseDiceError::InvalidSides(sides_str.to_string()));
    }

    Ok(DiceRoll {
        count,
        sides,
        modifier,
    })
}

/// Parse a hit die type such as "d8" or "1d10"
pub fn parse_die_type(die_type: &str) -> Result<DiceRoll, ParseDiceError> {
    let die: DiceRoll = die_type.parse()?;
    if !die.is_single_die() {
        return Err(ParseDiceError::NotSingleDie(die_type.to_string()));
    }
    Ok(die)
}

/// Roll 1d20 plus an initiative modifier
pub fn roll_initiative<R: Rng>(rng: &mut R, modifier: i32) -> i32 {
    DiceRoll::new(1, 20, modifier).roll_with(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_parse_basic() {
        let roll = parse_dice("2d6").unwrap();
        assert_eq!(roll, DiceRoll::new(2, 6, 0));
    }

    #[test]
    fn test_parse_modifiers() {
        assert_eq!(parse_dice("1d20+5").unwrap(), DiceRoll::new(1, 20, 5));
        assert_eq!(parse_dice("3d8-2").unwrap(), DiceRoll::new(3, 8, -2));
        assert_eq!(parse_dice("  2D10+3 ").unwrap(), DiceRoll::new(2, 10, 3));
    }

    #[test]
    fn test_parse_implicit_one() {
        assert_eq!(parse_dice("d6").unwrap(), DiceRoll::new(1, 6, 0));
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(parse_dice("abc"), Err(ParseDiceError::MissingSeparator));
        assert!(matches!(parse_dice("2d"), Err(ParseDiceError::InvalidSides(_))));
        assert!(matches!(parse_dice("0d6"), Err(ParseDiceError::InvalidCount(_))));
        assert!(matches!(parse_dice("2d0"), Err(ParseDiceError::InvalidSides(_))));
        assert!(matches!(parse_dice("1d6+x"), Err(ParseDiceError::InvalidModifier(_))));
    }

    #[test]
    fn test_die_types() {
        assert_eq!(parse_die_type("d8").unwrap().sides, 8);
        assert_eq!(parse_die_type("1D12").unwrap(), DiceRoll::new(1, 12, 0));
        assert!(matches!(parse_die_type("2d6"), Err(ParseDiceError::NotSingleDie(_))));
        assert!(matches!(parse_die_type("d10+1"), Err(ParseDiceError::NotSingleDie(_))));
        assert_eq!(parse_die_type("eight"), Err(ParseDiceError::MissingSeparator));
    }

    #[test]
    fn test_initiative_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let roll = roll_initiative(&mut rng, 3);
            assert!((4..=23).contains(&roll), "initiative {} out of range", roll);
        }
    }

    #[test]
    fn test_seeded_rolls_repeat() {
        let roll = DiceRoll::new(4, 6, 1);
        let a = roll.roll_with(&mut StdRng::seed_from_u64(42));
        let b = roll.roll_with(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!((5..=25).contains(&a));
    }
}
