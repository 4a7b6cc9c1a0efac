use crate::affinity::{AffinityTable, Category};
use crate::core::constants::OPPONENT_MELEE_POWER;
use crate::error::{BattleError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which roster a combatant fights for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Player => f.write_str("party"),
            Side::Opponent => f.write_str("opponents"),
        }
    }
}

/// Index-based reference into one of the two rosters of a `Battle`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CombatantId {
    pub side: Side,
    pub index: usize,
}

impl CombatantId {
    pub const fn player(index: usize) -> Self {
        Self {
            side: Side::Player,
            index,
        }
    }

    pub const fn opponent(index: usize) -> Self {
        Self {
            side: Side::Opponent,
            index,
        }
    }
}

/// Base stats. Endurance is the defensive stat in every formula.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stats {
    pub strength: u32,
    pub magic: u32,
    pub endurance: u32,
    pub agility: u32,
    pub luck: u32,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            strength: 10,
            magic: 10,
            endurance: 10,
            agility: 10,
            luck: 10,
        }
    }
}

/// Bounded resource. `current` never leaves `[0, max]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "PoolRecord")]
pub struct Pool {
    current: u32,
    max: u32,
}

#[derive(Deserialize)]
struct PoolRecord {
    current: u32,
    max: u32,
}

impl From<PoolRecord> for Pool {
    fn from(record: PoolRecord) -> Self {
        Pool::with_current(record.current, record.max)
    }
}

impl Pool {
    /// Full pool.
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn with_current(current: u32, max: u32) -> Self {
        Self {
            current: current.min(max),
            max,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Remove up to `amount`, returning what was actually removed.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.current);
        self.current -= taken;
        taken
    }

    /// Add up to `amount` without exceeding max, returning what was actually added.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.max.saturating_sub(self.current));
        self.current += added;
        added
    }

    pub fn deplete(&mut self) {
        self.current = 0;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Combatant {
    pub name: String,
    pub side: Side,
    pub stats: Stats,
    pub hp: Pool,
    pub sp: Pool,
    pub affinities: AffinityTable,
    /// Weapon power; feeds melee power and the finishing attack.
    #[serde(default)]
    pub weapon: u32,
    /// Armor rating; added to defense when opponents strike this combatant.
    #[serde(default)]
    pub armor: u32,
    /// Staggered this round.
    #[serde(default)]
    pub is_down: bool,
}

impl Combatant {
    pub fn new(name: impl Into<String>, side: Side, stats: Stats, max_hp: u32, max_sp: u32) -> Self {
        Self {
            name: name.into(),
            side,
            stats,
            hp: Pool::new(max_hp),
            sp: Pool::new(max_sp),
            affinities: AffinityTable::new(),
            weapon: 0,
            armor: 0,
            is_down: false,
        }
    }

    pub fn with_equipment(mut self, weapon: u32, armor: u32) -> Self {
        self.weapon = weapon;
        self.armor = armor;
        self
    }

    pub fn with_affinities(mut self, affinities: AffinityTable) -> Self {
        self.affinities = affinities;
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.hp.is_empty()
    }

    /// Offensive stat used for a skill of this category.
    pub fn offense_for(&self, category: Category) -> u32 {
        if category.is_physical() {
            self.stats.strength
        } else {
            self.stats.magic
        }
    }

    /// Power of this combatant's basic attack.
    pub fn melee_power(&self) -> u32 {
        match self.side {
            Side::Player => self.weapon / 2,
            Side::Opponent => OPPONENT_MELEE_POWER,
        }
    }

    /// Reject definitions the damage formulas cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(BattleError::InvalidCombatant("empty name".to_string()));
        }
        if self.stats.endurance == 0 {
            return Err(BattleError::InvalidCombatant(format!(
                "{} has zero endurance",
                self.name
            )));
        }
        if self.hp.max() == 0 {
            return Err(BattleError::InvalidCombatant(format!(
                "{} has zero max HP",
                self.name
            )));
        }
        Ok(())
    }
}
