//! Skill definitions and the skill catalog.

pub mod catalog;
pub mod types;

pub use catalog::SkillCatalog;
pub use types::{parse_chance, CostSpec, HitSpec, SkillDef, TargetMode};
