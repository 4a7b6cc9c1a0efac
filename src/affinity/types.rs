use crate::core::constants::{NORMAL_MULTIPLIER, RESIST_MULTIPLIER, WEAK_MULTIPLIER};
use crate::error::BattleError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NUM_CATEGORIES: usize = 15;

/// Damage category a skill deals and an affinity is keyed on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Phys,
    Gun,
    Slash,
    Strike,
    Pierce,
    Fire,
    Ice,
    Elec,
    Wind,
    Psy,
    Nuke,
    Light,
    Dark,
    Almighty,
    Support,
}

impl Category {
    pub fn all() -> [Category; NUM_CATEGORIES] {
        [
            Category::Phys,
            Category::Gun,
            Category::Slash,
            Category::Strike,
            Category::Pierce,
            Category::Fire,
            Category::Ice,
            Category::Elec,
            Category::Wind,
            Category::Psy,
            Category::Nuke,
            Category::Light,
            Category::Dark,
            Category::Almighty,
            Category::Support,
        ]
    }

    /// Physical categories scale with strength, everything else with magic.
    pub fn is_physical(&self) -> bool {
        matches!(
            self,
            Category::Phys | Category::Gun | Category::Slash | Category::Strike | Category::Pierce
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Phys => "phys",
            Category::Gun => "gun",
            Category::Slash => "slash",
            Category::Strike => "strike",
            Category::Pierce => "pierce",
            Category::Fire => "fire",
            Category::Ice => "ice",
            Category::Elec => "elec",
            Category::Wind => "wind",
            Category::Psy => "psy",
            Category::Nuke => "nuke",
            Category::Light => "light",
            Category::Dark => "dark",
            Category::Almighty => "almighty",
            Category::Support => "support",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = BattleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let category = match normalized.as_str() {
            "phys" | "physical" => Category::Phys,
            "gun" | "ranged" => Category::Gun,
            "slash" => Category::Slash,
            "strike" => Category::Strike,
            "pierce" => Category::Pierce,
            "fire" => Category::Fire,
            "ice" => Category::Ice,
            "elec" | "electric" => Category::Elec,
            "wind" => Category::Wind,
            "psy" | "psychokinesis" => Category::Psy,
            "nuke" | "nuclear" => Category::Nuke,
            "light" | "bless" => Category::Light,
            "dark" | "curse" => Category::Dark,
            "almighty" => Category::Almighty,
            "support" => Category::Support,
            _ => return Err(BattleError::UnknownCategory(s.to_string())),
        };
        Ok(category)
    }
}

/// How a combatant reacts to one category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    #[default]
    Normal,
    Weak,
    Resist,
    Null,
    Reflect,
    Absorb,
}

impl Reaction {
    /// Damage multiplier for reactions that let damage through.
    /// Null, reflect and absorb never reach the damage formula.
    pub fn multiplier(&self) -> f64 {
        match self {
            Reaction::Weak => WEAK_MULTIPLIER,
            Reaction::Resist => RESIST_MULTIPLIER,
            Reaction::Normal => NORMAL_MULTIPLIER,
            Reaction::Null | Reaction::Reflect | Reaction::Absorb => 0.0,
        }
    }

    /// The attack stops at the target without running the damage formula.
    pub fn is_immune(&self) -> bool {
        matches!(self, Reaction::Null | Reaction::Reflect | Reaction::Absorb)
    }

    /// Parse a reaction word, using only the first word (e.g. "Resist (x0.5)").
    /// Unrecognised words (such as "-") mean normal.
    pub fn from_label(label: &str) -> Reaction {
        let first = label.split_whitespace().next().unwrap_or("").to_lowercase();
        match first.as_str() {
            "weak" => Reaction::Weak,
            "resist" | "strong" => Reaction::Resist,
            "null" => Reaction::Null,
            "reflect" | "repel" => Reaction::Reflect,
            "absorb" | "drain" => Reaction::Absorb,
            _ => Reaction::Normal,
        }
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Reaction::Normal => "normal",
            Reaction::Weak => "weak",
            Reaction::Resist => "resist",
            Reaction::Null => "null",
            Reaction::Reflect => "reflect",
            Reaction::Absorb => "absorb",
        };
        f.write_str(label)
    }
}
