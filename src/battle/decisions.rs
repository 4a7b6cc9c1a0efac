//! Decision providers: the boundary where choices enter the battle.
//!
//! The core pulls each decision synchronously and never prints or reads
//! input itself. Hosts that are asynchronous should park at these calls and
//! resume with exactly the decision that was requested.

use super::state::Battle;
use super::types::{Action, TurnView};
use crate::character::CombatantId;
use crate::combat::CombatEvent;
use crate::error::{BattleError, Result};
use serde::Deserialize;
use std::collections::VecDeque;

pub trait DecisionProvider {
    /// Skill and target for the acting combatant, or a skip.
    fn choose_action(&mut self, view: &TurnView<'_>) -> Action;

    /// Every opponent is down: perform the group finishing attack?
    fn offer_finisher(&mut self, battle: &Battle) -> bool;

    /// Pick a combatant to pass to, or `None` to end the chain.
    fn offer_pass(&mut self, battle: &Battle, candidates: &[CombatantId]) -> Option<CombatantId>;

    /// Called for every event as it happens.
    fn on_event(&mut self, _event: &CombatEvent) {}

    /// The last action was rejected; `choose_action` is asked again.
    fn on_rejected(&mut self, _error: &BattleError) {}
}

/// Replays prepared answers in order. Once a queue runs dry the provider
/// skips, declines finishers and ends chains.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScriptedDecisions {
    #[serde(default)]
    actions: VecDeque<Action>,
    #[serde(default)]
    finishers: VecDeque<bool>,
    /// Pass recipients by name; `null` declines the pass.
    #[serde(default)]
    passes: VecDeque<Option<String>>,
}

impl ScriptedDecisions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn then(mut self, action: Action) -> Self {
        self.actions.push_back(action);
        self
    }

    pub fn then_use(self, skill: &str, target: Option<usize>) -> Self {
        self.then(Action::use_skill(skill, target))
    }

    pub fn then_skip(self) -> Self {
        self.then(Action::Skip)
    }

    pub fn then_finisher(mut self, accept: bool) -> Self {
        self.finishers.push_back(accept);
        self
    }

    pub fn then_pass(mut self, recipient: Option<&str>) -> Self {
        self.passes.push_back(recipient.map(str::to_string));
        self
    }

    pub fn remaining_actions(&self) -> usize {
        self.actions.len()
    }
}

impl DecisionProvider for ScriptedDecisions {
    fn choose_action(&mut self, _view: &TurnView<'_>) -> Action {
        self.actions.pop_front().unwrap_or(Action::Skip)
    }

    fn offer_finisher(&mut self, _battle: &Battle) -> bool {
        self.finishers.pop_front().unwrap_or(false)
    }

    fn offer_pass(&mut self, battle: &Battle, candidates: &[CombatantId]) -> Option<CombatantId> {
        let name = self.passes.pop_front().flatten()?;
        candidates.iter().copied().find(|id| {
            battle
                .get(*id)
                .is_some_and(|c| c.name.eq_ignore_ascii_case(name.trim()))
        })
    }
}
