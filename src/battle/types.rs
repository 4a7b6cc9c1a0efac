use super::state::Battle;
use crate::character::{Combatant, CombatantId, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which side opens the battle ahead of agility order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Advantage {
    Player,
    Opponent,
    #[default]
    Neutral,
}

impl Advantage {
    pub fn favored_side(&self) -> Option<Side> {
        match self {
            Advantage::Player => Some(Side::Player),
            Advantage::Opponent => Some(Side::Opponent),
            Advantage::Neutral => None,
        }
    }
}

impl FromStr for Advantage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "player" | "party" => Ok(Advantage::Player),
            "opponent" | "opponents" | "shadows" => Ok(Advantage::Opponent),
            "neutral" | "none" => Ok(Advantage::Neutral),
            other => Err(format!("unknown advantage: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ongoing,
    PlayerWins,
    OpponentWins,
}

impl Outcome {
    pub fn is_over(&self) -> bool {
        *self != Outcome::Ongoing
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Outcome::Ongoing => None,
            Outcome::PlayerWins => Some(Side::Player),
            Outcome::OpponentWins => Some(Side::Opponent),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ongoing => f.write_str("The battle continues."),
            Outcome::PlayerWins => f.write_str("Party wins!"),
            Outcome::OpponentWins => f.write_str("Opponents win!"),
        }
    }
}

/// One decision for the acting combatant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Skip,
    /// Skill name (or `melee`) and, for single-target skills, the 0-based
    /// position of the target in the opposing roster.
    Use {
        skill: String,
        #[serde(default)]
        target: Option<usize>,
    },
}

impl Action {
    pub fn use_skill(skill: impl Into<String>, target: Option<usize>) -> Self {
        Action::Use {
            skill: skill.into(),
            target,
        }
    }
}

/// What a decision provider sees when asked for an action.
#[derive(Debug, Clone, Copy)]
pub struct TurnView<'a> {
    pub battle: &'a Battle,
    pub actor: CombatantId,
    pub chain_multiplier: f64,
}

impl<'a> TurnView<'a> {
    pub fn actor(&self) -> Option<&'a Combatant> {
        self.battle.get(self.actor)
    }

    /// Opposing roster, in the order target positions refer to.
    pub fn opponents(&self) -> &'a [Combatant] {
        self.battle.roster(self.actor.side.opposite())
    }
}
