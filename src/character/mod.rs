//! Combatants, their stats and resource pools.

pub mod resources;
pub mod types;

pub use resources::{can_afford, cost, deduct, ResourceKind};
pub use types::{Combatant, CombatantId, Pool, Side, Stats};
