//! Combat resolution: damage model, skill resolver and finishing attack.

pub mod damage;
pub mod finisher;
pub mod logic;
pub mod types;

pub use finisher::{resolve_finishing_attack, FINISHER_ACTION_NAME};
pub use logic::resolve_skill_use;
pub use types::{CombatEvent, ResolutionResult, TargetEffect, TargetOutcome};
