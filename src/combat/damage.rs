//! Damage formulas and random rolls.
//!
//! These pure functions calculate combat numbers without side effects.
//! Every result truncates toward zero and never goes below zero.

use crate::character::Side;
use crate::core::constants::*;
use rand::Rng;

/// Which formula a hit uses. Selected by the attacking side: party members
/// striking opponents use `Party`, opponents striking party members use
/// `Opponent`, which also counts the defender's armor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageFormula {
    Party,
    Opponent,
}

impl DamageFormula {
    pub fn for_attacker(side: Side) -> Self {
        match side {
            Side::Player => DamageFormula::Party,
            Side::Opponent => DamageFormula::Opponent,
        }
    }
}

/// `floor(sqrt(power * 15 * offense / defense) * 2 * level_diff * affinity)`
pub fn party_formula_damage(
    power: u32,
    offense: u32,
    defense: u32,
    level_diff: f64,
    affinity: f64,
) -> u32 {
    if power == 0 {
        return 0;
    }
    let ratio = power as f64 * PARTY_FORMULA_POWER_FACTOR * offense as f64 / defense.max(1) as f64;
    let damage = ratio.sqrt() * PARTY_FORMULA_SCALE * level_diff * affinity;
    truncate(damage)
}

/// `floor(sqrt(power * 6 * offense / (8 * defense + armor)) * 9 * level_diff * affinity)`,
/// less 10 for anything but a melee attack.
pub fn opponent_formula_damage(
    power: u32,
    offense: u32,
    defense: u32,
    armor: u32,
    level_diff: f64,
    affinity: f64,
    is_melee: bool,
) -> u32 {
    if power == 0 {
        return 0;
    }
    let guard = (OPPONENT_FORMULA_DEFENSE_FACTOR * defense as f64 + armor as f64).max(1.0);
    let ratio = power as f64 * OPPONENT_FORMULA_POWER_FACTOR * offense as f64 / guard;
    let mut damage = ratio.sqrt() * OPPONENT_FORMULA_SCALE * level_diff * affinity;
    if !is_melee {
        damage -= NON_MELEE_PENALTY;
    }
    truncate(damage)
}

/// Luck-based crit chance (percent) of a melee attack.
pub fn melee_crit_chance(attacker_luck: u32, defender_luck: u32, attacker_side: Side) -> u32 {
    let mut chance = (attacker_luck as f64 + CRIT_LUCK_OFFSET) / (defender_luck as f64 + CRIT_LUCK_OFFSET)
        * CRIT_LUCK_SCALE;
    if attacker_side == Side::Opponent {
        chance *= OPPONENT_CRIT_FACTOR;
    }
    truncate(chance)
}

/// Scale a hit by the chain multiplier.
pub fn apply_chain_multiplier(damage: u32, multiplier: f64) -> u32 {
    truncate(damage as f64 * multiplier)
}

pub fn apply_critical(damage: u32) -> u32 {
    truncate(damage as f64 * CRIT_MULTIPLIER)
}

/// Group finishing attack damage against one target. Ignores armor and affinity.
pub fn finisher_damage(power: u32, leader_offense: u32, target_defense: u32, party_size: usize) -> u32 {
    if power == 0 {
        return 0;
    }
    let ratio = power as f64 * PARTY_FORMULA_POWER_FACTOR * leader_offense as f64
        / target_defense.max(1) as f64;
    truncate(ratio.sqrt() * FINISHER_SCALE * LEVEL_DIFFERENCE * party_size as f64)
}

/// Percentage roll: succeeds when a 1..=100 roll is at most `chance`.
pub fn roll_percent(chance: u32, rng: &mut impl Rng) -> bool {
    chance > 0 && rng.gen_range(1..=100) <= chance
}

fn truncate(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u32
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn party_formula_weak_example() {
        // sqrt(40 * 15 * 50 / 30) * 2 * 1.25 = sqrt(1000) * 2.5 = 79.06
        assert_eq!(party_formula_damage(40, 50, 30, 1.0, 1.25), 79);
    }

    #[test]
    fn party_formula_neutral_and_resist() {
        // sqrt(1000) * 2 = 63.24
        assert_eq!(party_formula_damage(40, 50, 30, 1.0, 1.0), 63);
        // sqrt(1000) * 1 = 31.62
        assert_eq!(party_formula_damage(40, 50, 30, 1.0, 0.5), 31);
    }

    #[test]
    fn opponent_formula_counts_armor_and_ranged_penalty() {
        // sqrt(50 * 6 * 40 / (8 * 10 + 40)) * 9 = sqrt(100) * 9 = 90
        assert_eq!(opponent_formula_damage(50, 40, 10, 40, 1.0, 1.0, true), 90);
        assert_eq!(opponent_formula_damage(50, 40, 10, 40, 1.0, 1.0, false), 80);
        // weak: 112.5 - 10 = 102.5
        assert_eq!(opponent_formula_damage(50, 40, 10, 40, 1.0, 1.25, false), 102);
    }

    #[test]
    fn opponent_formula_penalty_never_goes_negative() {
        // sqrt(1 * 6 * 1 / 80) * 9 = 2.46, minus 10
        assert_eq!(opponent_formula_damage(1, 1, 10, 0, 1.0, 1.0, false), 0);
    }

    #[test]
    fn zero_power_deals_nothing() {
        assert_eq!(party_formula_damage(0, 99, 1, 1.0, 1.25), 0);
        assert_eq!(opponent_formula_damage(0, 99, 1, 0, 1.0, 1.25, true), 0);
        assert_eq!(finisher_damage(0, 99, 1, 4), 0);
    }

    #[test]
    fn zero_defense_does_not_divide_by_zero() {
        assert_eq!(party_formula_damage(10, 10, 0, 1.0, 1.0), party_formula_damage(10, 10, 1, 1.0, 1.0));
        assert!(opponent_formula_damage(10, 10, 0, 0, 1.0, 1.0, true) > 0);
    }

    #[test]
    fn melee_crit_chance_by_side() {
        // (50 + 50) / (10 + 50) * 3 = 5.0
        assert_eq!(melee_crit_chance(50, 10, Side::Player), 5);
        // 5.0 * 0.8 = 4.0
        assert_eq!(melee_crit_chance(50, 10, Side::Opponent), 4);
        // equal luck: 3, opponent 2.4
        assert_eq!(melee_crit_chance(20, 20, Side::Player), 3);
        assert_eq!(melee_crit_chance(20, 20, Side::Opponent), 2);
    }

    #[test]
    fn chain_multiplier_and_crit_truncate() {
        assert_eq!(apply_chain_multiplier(63, 1.0), 63);
        assert_eq!(apply_chain_multiplier(63, 1.25), 78);
        assert_eq!(apply_chain_multiplier(63, 1.5625), 98);
        assert_eq!(apply_critical(63), 94);
    }

    #[test]
    fn finisher_scales_with_party_size() {
        // sqrt(20 * 15 * 30 / 10) * 1.6 = 30 * 1.6 = 48 per member
        assert_eq!(finisher_damage(20, 30, 10, 1), 48);
        assert_eq!(finisher_damage(20, 30, 10, 4), 192);
    }

    #[test]
    fn roll_percent_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            assert!(roll_percent(100, &mut rng));
            assert!(!roll_percent(0, &mut rng));
        }
    }

    #[test]
    fn formula_for_attacker_side() {
        assert_eq!(DamageFormula::for_attacker(Side::Player), DamageFormula::Party);
        assert_eq!(DamageFormula::for_attacker(Side::Opponent), DamageFormula::Opponent);
    }
}
