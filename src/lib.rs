//! Baton - turn-based affinity combat engine.
//!
//! Resolves battles between a player party and an opposing roster:
//! affinity-driven damage, skill costs, multi-hit and critical rolls,
//! "one more" chains with baton passes, and the group finishing attack.
//! Decisions come from a [`battle::DecisionProvider`]; results come back as
//! [`combat::CombatEvent`]s and never get printed by the library.

pub mod affinity;
pub mod battle;
pub mod character;
pub mod combat;
pub mod core;
pub mod data;
pub mod error;
pub mod skills;

pub use battle::{run_battle, Battle, BattleReport, DecisionProvider, Outcome, ScriptedDecisions};
pub use crate::core::BattleConfig;
pub use error::{BattleError, Result};
