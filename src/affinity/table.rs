use super::types::{Category, Reaction};
use crate::error::{BattleError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-combatant mapping from category to reaction. Absent categories are normal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityTable {
    reactions: BTreeMap<Category, Reaction>,
}

impl AffinityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reaction(&self, category: Category) -> Reaction {
        self.reactions.get(&category).copied().unwrap_or_default()
    }

    /// Declare a reaction. Repeating the same declaration is harmless,
    /// declaring two different reactions for one category is an error.
    pub fn declare(&mut self, category: Category, reaction: Reaction) -> Result<()> {
        if reaction == Reaction::Normal {
            return Ok(());
        }
        match self.reactions.get(&category) {
            Some(existing) if *existing != reaction => {
                Err(BattleError::ConflictingAffinity { category })
            }
            _ => {
                self.reactions.insert(category, reaction);
                Ok(())
            }
        }
    }

    /// Declare a comma-separated list of categories, e.g. `"fire, Ice"`.
    pub fn declare_list(&mut self, reaction: Reaction, list: &str) -> Result<()> {
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            self.declare(name.parse()?, reaction)?;
        }
        Ok(())
    }

    pub fn with(mut self, category: Category, reaction: Reaction) -> Result<Self> {
        self.declare(category, reaction)?;
        Ok(self)
    }

    /// Categories declared with the given reaction.
    pub fn categories_with(&self, reaction: Reaction) -> Vec<Category> {
        self.reactions
            .iter()
            .filter(|(_, r)| **r == reaction)
            .map(|(c, _)| *c)
            .collect()
    }
}
