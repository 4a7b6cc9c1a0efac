//! Battle configuration.

use super::constants::{DEFAULT_MAX_REJECTIONS_PER_TURN, DEFAULT_MAX_ROUNDS};
use crate::battle::Advantage;

/// Configuration for a single battle.
#[derive(Debug, Clone)]
pub struct BattleConfig {
    /// Which side (if any) opens the first round ahead of agility order
    pub advantage: Advantage,

    /// Rounds to play before giving up with `RoundLimitReached`
    pub max_rounds: u32,

    /// Rejected decisions tolerated in one turn before it is treated as a skip
    pub max_rejections_per_turn: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            advantage: Advantage::Neutral,
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_rejections_per_turn: DEFAULT_MAX_REJECTIONS_PER_TURN,
        }
    }
}

impl BattleConfig {
    /// Party ambushed the opponents.
    pub fn player_advantage() -> Self {
        Self {
            advantage: Advantage::Player,
            ..Default::default()
        }
    }

    /// Opponents ambushed the party.
    pub fn opponent_advantage() -> Self {
        Self {
            advantage: Advantage::Opponent,
            ..Default::default()
        }
    }

    /// Short cap for tests and scripted runs.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_neutral() {
        let config = BattleConfig::default();
        assert_eq!(config.advantage, Advantage::Neutral);
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
    }

    #[test]
    fn presets_set_advantage() {
        assert_eq!(BattleConfig::player_advantage().advantage, Advantage::Player);
        assert_eq!(
            BattleConfig::opponent_advantage().with_max_rounds(3).max_rounds,
            3
        );
    }
}
