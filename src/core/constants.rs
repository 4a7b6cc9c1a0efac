// Affinity multipliers
pub const WEAK_MULTIPLIER: f64 = 1.25;
pub const RESIST_MULTIPLIER: f64 = 0.5;
pub const NORMAL_MULTIPLIER: f64 = 1.0;

// Damage formulas
pub const LEVEL_DIFFERENCE: f64 = 1.0;
pub const PARTY_FORMULA_POWER_FACTOR: f64 = 15.0;
pub const PARTY_FORMULA_SCALE: f64 = 2.0;
pub const OPPONENT_FORMULA_POWER_FACTOR: f64 = 6.0;
pub const OPPONENT_FORMULA_DEFENSE_FACTOR: f64 = 8.0;
pub const OPPONENT_FORMULA_SCALE: f64 = 9.0;
pub const NON_MELEE_PENALTY: f64 = 10.0;

// Critical hits
pub const CRIT_MULTIPLIER: f64 = 1.5;
pub const CRIT_LUCK_OFFSET: f64 = 50.0;
pub const CRIT_LUCK_SCALE: f64 = 3.0;
pub const OPPONENT_CRIT_FACTOR: f64 = 0.8;

// Basic attack
pub const MELEE_SKILL_NAME: &str = "melee";
pub const OPPONENT_MELEE_POWER: u32 = 1;

// Chains
pub const PASS_MULTIPLIER: f64 = 1.25;
pub const FINISHER_SCALE: f64 = 1.6;

// Battle loop safety
pub const DEFAULT_MAX_ROUNDS: u32 = 999;
pub const DEFAULT_MAX_REJECTIONS_PER_TURN: u32 = 16;
