//! Battle state, turn order, the per-turn chain machine and the battle loop.

pub mod chain;
pub mod decisions;
pub mod runner;
pub mod state;
pub mod types;

pub use chain::{pass_candidates, run_turn, select_targets, ChainState, TurnContext, TurnEnd, TurnPhase};
pub use decisions::{DecisionProvider, ScriptedDecisions};
pub use runner::{play_round, run_battle, BattleReport, CombatantSummary};
pub use state::{compute_turn_order, is_battle_over, Battle};
pub use types::{Action, Advantage, Outcome, TurnView};
