//! Resource ledger: skill cost computation and deduction.
//!
//! Costs are resolved against the paying combatant's max pool, checked
//! against its current pool, and only then deducted.

use super::types::{Combatant, Pool};
use crate::error::{BattleError, Result};
use crate::skills::CostSpec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which pool a skill draws from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Hp,
    Sp,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Hp => f.write_str("HP"),
            ResourceKind::Sp => f.write_str("SP"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "hp" => Ok(ResourceKind::Hp),
            "sp" => Ok(ResourceKind::Sp),
            _ => Err(BattleError::MalformedCost(s.to_string())),
        }
    }
}

impl Combatant {
    pub fn pool(&self, kind: ResourceKind) -> &Pool {
        match kind {
            ResourceKind::Hp => &self.hp,
            ResourceKind::Sp => &self.sp,
        }
    }

    pub fn pool_mut(&mut self, kind: ResourceKind) -> &mut Pool {
        match kind {
            ResourceKind::Hp => &mut self.hp,
            ResourceKind::Sp => &mut self.sp,
        }
    }
}

/// Concrete cost of a skill for this combatant.
/// Percentages are taken of the max pool and truncated.
pub fn cost(combatant: &Combatant, kind: ResourceKind, spec: CostSpec) -> u32 {
    match spec {
        CostSpec::Flat(value) => value,
        CostSpec::Percent(pct) => {
            let max = combatant.pool(kind).max() as u64;
            (max * pct as u64 / 100) as u32
        }
    }
}

pub fn can_afford(combatant: &Combatant, kind: ResourceKind, cost: u32) -> bool {
    combatant.pool(kind).current() >= cost
}

/// Deduct an affordable cost. Unaffordable costs are rejected untouched.
pub fn deduct(combatant: &mut Combatant, kind: ResourceKind, cost: u32) -> Result<()> {
    if !can_afford(combatant, kind, cost) {
        return Err(BattleError::InsufficientResource {
            kind,
            cost,
            available: combatant.pool(kind).current(),
        });
    }
    combatant.pool_mut(kind).drain(cost);
    Ok(())
}
