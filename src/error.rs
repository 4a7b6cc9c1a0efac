use crate::affinity::Category;
use crate::character::ResourceKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("Unknown skill: {0}")]
    UnknownSkill(String),

    #[error("Not enough {kind} to pay {cost} (have {available})")]
    InsufficientResource {
        kind: ResourceKind,
        cost: u32,
        available: u32,
    },

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("Malformed cost: {0:?}")]
    MalformedCost(String),

    #[error("Malformed hit specification: {0:?}")]
    MalformedHitSpec(String),

    #[error("Malformed target mode: {0:?}")]
    MalformedTargetMode(String),

    #[error("Malformed chance: {0:?}")]
    MalformedChance(String),

    #[error("Unknown category: {0:?}")]
    UnknownCategory(String),

    #[error("Conflicting affinities declared for {category}")]
    ConflictingAffinity { category: Category },

    #[error("Skill defined twice: {0}")]
    DuplicateSkill(String),

    #[error("Unknown combatant: {0}")]
    UnknownCombatant(String),

    #[error("Invalid combatant: {0}")]
    InvalidCombatant(String),

    #[error("Finishing attack requires every opponent to be down")]
    FinisherUnavailable,

    #[error("Battle still undecided after {0} rounds")]
    RoundLimitReached(u32),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl BattleError {
    /// Rejected decisions: the caller re-prompts and no state was touched.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            BattleError::UnknownSkill(_)
                | BattleError::InsufficientResource { .. }
                | BattleError::InvalidTarget(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BattleError>;
