//! Damage categories and per-combatant affinity reactions.

pub mod table;
pub mod types;

pub use table::AffinityTable;
pub use types::{Category, Reaction, NUM_CATEGORIES};
