use crate::affinity::Category;
use crate::character::{Combatant, ResourceKind};
use crate::core::constants::MELEE_SKILL_NAME;
use crate::error::{BattleError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resource cost of a skill, parsed once at load time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CostSpec {
    Flat(u32),
    /// Percentage of the payer's max pool.
    Percent(u32),
}

impl FromStr for CostSpec {
    type Err = BattleError;

    /// Accepts `"12"` or `"15%"`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let malformed = || BattleError::MalformedCost(s.to_string());
        match trimmed.strip_suffix('%') {
            Some(pct) => pct
                .trim()
                .parse::<u32>()
                .map(CostSpec::Percent)
                .map_err(|_| malformed()),
            None => trimmed
                .parse::<u32>()
                .map(CostSpec::Flat)
                .map_err(|_| malformed()),
        }
    }
}

impl fmt::Display for CostSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostSpec::Flat(value) => write!(f, "{}", value),
            CostSpec::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}

/// How many times a skill strikes each target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HitSpec {
    Fixed(u32),
    Range { min: u32, max: u32 },
}

impl HitSpec {
    /// Roll the hit count for one skill use.
    ///
    /// A range always lands `min` hits, then keeps adding bonus hits while
    /// each trial succeeds with probability `1 / (max - min + 1)`, stopping
    /// at the first failure.
    pub fn roll(&self, rng: &mut impl Rng) -> u32 {
        match *self {
            HitSpec::Fixed(count) => count,
            HitSpec::Range { min, max } => {
                let width = max.saturating_sub(min);
                let chance = 1.0 / (width as f64 + 1.0);
                let mut hits = min;
                for _ in 0..width {
                    if rng.gen::<f64>() < chance {
                        hits += 1;
                    } else {
                        break;
                    }
                }
                hits
            }
        }
    }

    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            HitSpec::Fixed(count) => (count, count),
            HitSpec::Range { min, max } => (min, max),
        }
    }
}

impl FromStr for HitSpec {
    type Err = BattleError;

    /// Accepts `"single:3"`, `"fixed:3"` or `"range:2-4"`.
    fn from_str(s: &str) -> Result<Self> {
        let malformed = || BattleError::MalformedHitSpec(s.to_string());
        let (kind, body) = s.trim().split_once(':').ok_or_else(malformed)?;
        match kind.trim().to_lowercase().as_str() {
            "single" | "fixed" => {
                let count: u32 = body.trim().parse().map_err(|_| malformed())?;
                if count == 0 {
                    return Err(malformed());
                }
                Ok(HitSpec::Fixed(count))
            }
            "range" => {
                let (lo, hi) = body.split_once('-').ok_or_else(malformed)?;
                let min: u32 = lo.trim().parse().map_err(|_| malformed())?;
                let max: u32 = hi.trim().parse().map_err(|_| malformed())?;
                if min == 0 || min > max {
                    return Err(malformed());
                }
                Ok(HitSpec::Range { min, max })
            }
            _ => Err(malformed()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    Single,
    All,
}

impl FromStr for TargetMode {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "single-target" | "single" => Ok(TargetMode::Single),
            "multi-target" | "all-targets" | "all" => Ok(TargetMode::All),
            _ => Err(BattleError::MalformedTargetMode(s.to_string())),
        }
    }
}

/// Parse a percentage chance such as `"25%"` into 0..=100.
pub fn parse_chance(s: &str) -> Result<u32> {
    let trimmed = s.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    match digits.parse::<u32>() {
        Ok(value) if value <= 100 => Ok(value),
        _ => Err(BattleError::MalformedChance(s.to_string())),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillDef {
    pub name: String,
    pub category: Category,
    /// Zero for skills that deal no direct damage.
    pub power: u32,
    pub target: TargetMode,
    pub cost_kind: ResourceKind,
    pub cost: CostSpec,
    /// Percent chance per hit; overrides the luck-based melee chance.
    pub crit_chance: Option<u32>,
    /// Percent chance, rolled once per use.
    pub insta_kill_chance: Option<u32>,
    /// None means a single hit.
    pub hits: Option<HitSpec>,
    #[serde(default)]
    pub is_melee: bool,
}

impl SkillDef {
    pub fn new(name: impl Into<String>, category: Category, power: u32) -> Self {
        Self {
            name: name.into().to_lowercase(),
            category,
            power,
            target: TargetMode::Single,
            cost_kind: ResourceKind::Sp,
            cost: CostSpec::Flat(0),
            crit_chance: None,
            insta_kill_chance: None,
            hits: None,
            is_melee: false,
        }
    }

    /// The basic weapon attack of `attacker`: physical, free, single target.
    pub fn melee(attacker: &Combatant) -> Self {
        Self {
            cost_kind: ResourceKind::Hp,
            is_melee: true,
            ..Self::new(MELEE_SKILL_NAME, Category::Phys, attacker.melee_power())
        }
    }

    pub fn with_target(mut self, target: TargetMode) -> Self {
        self.target = target;
        self
    }

    pub fn with_cost(mut self, kind: ResourceKind, cost: CostSpec) -> Self {
        self.cost_kind = kind;
        self.cost = cost;
        self
    }

    pub fn with_crit_chance(mut self, chance: u32) -> Self {
        self.crit_chance = Some(chance);
        self
    }

    pub fn with_insta_kill_chance(mut self, chance: u32) -> Self {
        self.insta_kill_chance = Some(chance);
        self
    }

    pub fn with_hits(mut self, hits: HitSpec) -> Self {
        self.hits = Some(hits);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{Side, Stats};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn cost_spec_parsing() {
        assert_eq!("12".parse::<CostSpec>().unwrap(), CostSpec::Flat(12));
        assert_eq!(" 15% ".parse::<CostSpec>().unwrap(), CostSpec::Percent(15));
        assert!("ten".parse::<CostSpec>().is_err());
        assert!("%".parse::<CostSpec>().is_err());
        assert!("-4".parse::<CostSpec>().is_err());
        assert!(matches!(
            "5 SP".parse::<CostSpec>(),
            Err(BattleError::MalformedCost(_))
        ));
    }

    #[test]
    fn hit_spec_parsing() {
        assert_eq!("single:3".parse::<HitSpec>().unwrap(), HitSpec::Fixed(3));
        assert_eq!(
            "range:2-4".parse::<HitSpec>().unwrap(),
            HitSpec::Range { min: 2, max: 4 }
        );
        assert!("range:4-2".parse::<HitSpec>().is_err());
        assert!("range:0-2".parse::<HitSpec>().is_err());
        assert!("single:0".parse::<HitSpec>().is_err());
        assert!("3".parse::<HitSpec>().is_err());
        assert!(matches!(
            "burst:2".parse::<HitSpec>(),
            Err(BattleError::MalformedHitSpec(_))
        ));
    }

    #[test]
    fn fixed_hits_always_land_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(HitSpec::Fixed(3).roll(&mut rng), 3);
        }
    }

    #[test]
    fn range_hits_stay_in_bounds() {
        let spec = HitSpec::Range { min: 2, max: 4 };
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut seen = [false; 5];
        for _ in 0..500 {
            let hits = spec.roll(&mut rng);
            assert!((2..=4).contains(&hits));
            seen[hits as usize] = true;
        }
        assert!(seen[2] && seen[3]);
    }

    #[test]
    fn bonus_hits_stop_at_first_failed_trial() {
        // each bonus trial is 1 in 3, so 2/3, 2/9 and 1/9 of rolls
        let spec = HitSpec::Range { min: 2, max: 4 };
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut counts = [0u32; 5];
        for _ in 0..90_000 {
            counts[spec.roll(&mut rng) as usize] += 1;
        }
        assert_eq!(counts[0] + counts[1], 0);
        assert!((58_500..=61_500).contains(&counts[2]), "{counts:?}");
        assert!((18_500..=21_500).contains(&counts[3]), "{counts:?}");
        assert!((9_000..=11_000).contains(&counts[4]), "{counts:?}");
    }

    #[test]
    fn inverted_range_lands_min_hits() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        assert_eq!(HitSpec::Range { min: 5, max: 2 }.roll(&mut rng), 5);
        assert_eq!(HitSpec::Range { min: 5, max: 2 }.bounds(), (5, 2));
    }

    #[test]
    fn range_hits_are_reproducible_with_seed() {
        let spec = HitSpec::Range { min: 1, max: 5 };
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let first: Vec<u32> = (0..32).map(|_| spec.roll(&mut a)).collect();
        let second: Vec<u32> = (0..32).map(|_| spec.roll(&mut b)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn degenerate_range_is_fixed() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(HitSpec::Range { min: 3, max: 3 }.roll(&mut rng), 3);
    }

    #[test]
    fn target_mode_parsing() {
        assert_eq!(
            "single-target".parse::<TargetMode>().unwrap(),
            TargetMode::Single
        );
        assert_eq!("multi-target".parse::<TargetMode>().unwrap(), TargetMode::All);
        assert!("everyone".parse::<TargetMode>().is_err());
    }

    #[test]
    fn chance_parsing() {
        assert_eq!(parse_chance("25%").unwrap(), 25);
        assert_eq!(parse_chance("0").unwrap(), 0);
        assert!(parse_chance("150%").is_err());
        assert!(parse_chance("often").is_err());
    }

    #[test]
    fn melee_is_free_physical_single_target() {
        let hero = Combatant::new("Ann", Side::Player, Stats::default(), 90, 60)
            .with_equipment(30, 12);
        let melee = SkillDef::melee(&hero);
        assert!(melee.is_melee);
        assert_eq!(melee.power, 15);
        assert_eq!(melee.category, Category::Phys);
        assert_eq!(melee.cost, CostSpec::Flat(0));
        assert_eq!(melee.target, TargetMode::Single);
    }
}
