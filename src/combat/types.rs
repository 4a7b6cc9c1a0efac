use crate::affinity::{Category, Reaction};
use crate::battle::Outcome;
use crate::character::{CombatantId, ResourceKind};
use serde::Serialize;
use std::fmt;

/// What one resolution call did to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetEffect {
    Nullified,
    /// Damage bounced back onto the attacker.
    Reflected { damage: u32 },
    /// HP the target regained.
    Absorbed { healed: u32 },
    InstantKill,
    Damaged {
        amount: u32,
        reaction: Reaction,
        crits: u32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetOutcome {
    pub target: CombatantId,
    pub effect: TargetEffect,
    /// This call set the target's down flag.
    pub downed: bool,
    /// This call brought the target to 0 HP.
    pub defeated: bool,
}

/// Everything a skill use or finishing attack changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub actor: CombatantId,
    pub action: String,
    pub cost_kind: ResourceKind,
    pub cost_paid: u32,
    pub hits: u32,
    pub outcomes: Vec<TargetOutcome>,
    pub events: Vec<CombatEvent>,
}

impl ResolutionResult {
    pub fn new(actor: CombatantId, action: impl Into<String>) -> Self {
        Self {
            actor,
            action: action.into(),
            cost_kind: ResourceKind::Sp,
            cost_paid: 0,
            hits: 0,
            outcomes: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn downed_targets(&self) -> Vec<CombatantId> {
        self.outcomes
            .iter()
            .filter(|o| o.downed)
            .map(|o| o.target)
            .collect()
    }

    pub fn outcome_for(&self, target: CombatantId) -> Option<&TargetOutcome> {
        self.outcomes.iter().find(|o| o.target == target)
    }

    /// Damage dealt to targets (instant kills are not counted).
    pub fn total_damage(&self) -> u32 {
        self.outcomes
            .iter()
            .map(|o| match o.effect {
                TargetEffect::Damaged { amount, .. } => amount,
                _ => 0,
            })
            .sum()
    }

    pub fn reflected_damage(&self) -> u32 {
        self.outcomes
            .iter()
            .map(|o| match o.effect {
                TargetEffect::Reflected { damage } => damage,
                _ => 0,
            })
            .sum()
    }

    pub fn healing(&self) -> u32 {
        self.outcomes
            .iter()
            .map(|o| match o.effect {
                TargetEffect::Absorbed { healed } => healed,
                _ => 0,
            })
            .sum()
    }
}

/// Battle events, rendered for display via `Display`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CombatEvent {
    RoundStarted {
        round: u32,
    },
    TurnStarted {
        name: String,
        hp: u32,
        max_hp: u32,
        sp: u32,
        max_sp: u32,
    },
    TurnSkipped {
        name: String,
    },
    ActionRejected {
        name: String,
        reason: String,
    },
    SkillUsed {
        attacker: String,
        skill: String,
        cost: u32,
        kind: ResourceKind,
    },
    MultiHit {
        hits: u32,
    },
    Nullified {
        target: String,
        category: Category,
    },
    Reflected {
        target: String,
        attacker: String,
        category: Category,
        damage: u32,
    },
    Absorbed {
        target: String,
        category: Category,
        amount: u32,
    },
    InstantKill {
        target: String,
    },
    CriticalHit {
        target: String,
        chance: u32,
    },
    Damaged {
        target: String,
        damage: u32,
        reaction: Reaction,
        remaining_hp: u32,
    },
    Downed {
        target: String,
    },
    Defeated {
        name: String,
    },
    OneMore {
        name: String,
    },
    BatonPass {
        from: String,
        to: String,
        multiplier: f64,
    },
    AllOutAttack {
        leader: String,
        party_size: usize,
    },
    FinisherHit {
        target: String,
        damage: u32,
        remaining_hp: u32,
    },
    RoundEnded {
        round: u32,
    },
    BattleEnded {
        outcome: Outcome,
    },
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEvent::RoundStarted { round } => write!(f, "--- Turn {} ---", round),
            CombatEvent::TurnStarted {
                name,
                hp,
                max_hp,
                sp,
                max_sp,
            } => write!(f, "{}'s turn (HP: {}/{}, SP: {}/{})", name, hp, max_hp, sp, max_sp),
            CombatEvent::TurnSkipped { name } => write!(f, "{} skips their turn.", name),
            CombatEvent::ActionRejected { name, reason } => {
                write!(f, "{} cannot do that: {}", name, reason)
            }
            CombatEvent::SkillUsed {
                attacker,
                skill,
                cost,
                kind,
            } => {
                if *cost > 0 {
                    write!(f, "{} uses {} ({} {})!", attacker, skill, cost, kind)
                } else {
                    write!(f, "{} uses {}!", attacker, skill)
                }
            }
            CombatEvent::MultiHit { hits } => write!(f, "Multi-hit skill: {} hits!", hits),
            CombatEvent::Nullified { target, category } => {
                write!(f, "{} nullified the {} attack!", target, category)
            }
            CombatEvent::Reflected {
                target,
                attacker,
                category,
                damage,
            } => write!(
                f,
                "{} reflected the {} attack! {} took {} reflected damage!",
                target, category, attacker, damage
            ),
            CombatEvent::Absorbed {
                target,
                category,
                amount,
            } => write!(
                f,
                "{} absorbed {} HP from the {} attack!",
                target, amount, category
            ),
            CombatEvent::InstantKill { target } => {
                write!(f, "Instant kill! {} is defeated!", target)
            }
            CombatEvent::CriticalHit { target, chance } => {
                write!(f, "Critical hit on {}! (Crit chance: {}%)", target, chance)
            }
            CombatEvent::Damaged {
                target,
                damage,
                reaction,
                remaining_hp,
            } => {
                match reaction {
                    Reaction::Weak => write!(f, "Weak! {} took {} damage.", target, damage)?,
                    Reaction::Resist => {
                        write!(f, "Resisted. {} took {} damage.", target, damage)?
                    }
                    _ => write!(f, "{} took {} damage.", target, damage)?,
                }
                write!(f, " Remaining HP: {}", remaining_hp)
            }
            CombatEvent::Downed { target } => write!(f, "{} is down!", target),
            CombatEvent::Defeated { name } => write!(f, "{} has fallen.", name),
            CombatEvent::OneMore { name } => write!(f, "One More! ({})", name),
            CombatEvent::BatonPass {
                from,
                to,
                multiplier,
            } => write!(
                f,
                "{} passed the baton to {}! Attack multiplier: x{:.2}",
                from, to, multiplier
            ),
            CombatEvent::AllOutAttack { leader, party_size } => write!(
                f,
                "All-Out Attack led by {} with {} members!",
                leader, party_size
            ),
            CombatEvent::FinisherHit {
                target,
                damage,
                remaining_hp,
            } => write!(
                f,
                "{} took {} damage from the All-Out Attack! Remaining HP: {}",
                target, damage, remaining_hp
            ),
            CombatEvent::RoundEnded { round } => write!(f, "End of turn {}.", round),
            CombatEvent::BattleEnded { outcome } => write!(f, "{}", outcome),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResolutionResult {
        let mut result = ResolutionResult::new(CombatantId::player(0), "agi");
        result.outcomes = vec![
            TargetOutcome {
                target: CombatantId::opponent(0),
                effect: TargetEffect::Damaged {
                    amount: 79,
                    reaction: Reaction::Weak,
                    crits: 0,
                },
                downed: true,
                defeated: false,
            },
            TargetOutcome {
                target: CombatantId::opponent(1),
                effect: TargetEffect::Absorbed { healed: 12 },
                downed: false,
                defeated: false,
            },
            TargetOutcome {
                target: CombatantId::opponent(2),
                effect: TargetEffect::Reflected { damage: 30 },
                downed: false,
                defeated: false,
            },
        ];
        result
    }

    #[test]
    fn result_summaries() {
        let result = sample();
        assert_eq!(result.downed_targets(), vec![CombatantId::opponent(0)]);
        assert_eq!(result.total_damage(), 79);
        assert_eq!(result.healing(), 12);
        assert_eq!(result.reflected_damage(), 30);
        assert!(result.outcome_for(CombatantId::opponent(3)).is_none());
    }

    #[test]
    fn events_render_messages() {
        let weak = CombatEvent::Damaged {
            target: "Pixie".into(),
            damage: 79,
            reaction: Reaction::Weak,
            remaining_hp: 21,
        };
        assert_eq!(weak.to_string(), "Weak! Pixie took 79 damage. Remaining HP: 21");

        let pass = CombatEvent::BatonPass {
            from: "Joker".into(),
            to: "Ann".into(),
            multiplier: 1.25,
        };
        assert_eq!(
            pass.to_string(),
            "Joker passed the baton to Ann! Attack multiplier: x1.25"
        );

        let free = CombatEvent::SkillUsed {
            attacker: "Joker".into(),
            skill: "melee".into(),
            cost: 0,
            kind: ResourceKind::Hp,
        };
        assert_eq!(free.to_string(), "Joker uses melee!");
    }
}
