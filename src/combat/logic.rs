//! Skill resolution: one skill use by one attacker against a list of targets.

use super::damage::*;
use super::types::{CombatEvent, ResolutionResult, TargetEffect, TargetOutcome};
use crate::affinity::Reaction;
use crate::battle::Battle;
use crate::character::{cost, deduct, Combatant, CombatantId};
use crate::core::constants::LEVEL_DIFFERENCE;
use crate::error::{BattleError, Result};
use crate::skills::SkillDef;
use rand::Rng;

/// Resolve one skill use.
///
/// All validation (attacker alive, targets exist, cost affordable) happens
/// before anything is mutated, so a rejected call leaves the battle untouched.
/// Targets already at 0 HP are skipped. Only the attacker and the listed
/// targets are ever modified.
///
/// # Arguments
/// * `battle` - Battle owning both rosters
/// * `attacker_id` - Who uses the skill
/// * `targets` - Targets in resolution order
/// * `skill` - Resolved skill definition (melee included)
/// * `chain_multiplier` - Accumulated pass multiplier, 1.0 outside chains
/// * `rng` - Random number generator
pub fn resolve_skill_use(
    battle: &mut Battle,
    attacker_id: CombatantId,
    targets: &[CombatantId],
    skill: &SkillDef,
    chain_multiplier: f64,
    rng: &mut impl Rng,
) -> Result<ResolutionResult> {
    let attacker = validate(battle, attacker_id, targets)?;

    let price = cost(&attacker, skill.cost_kind, skill.cost);
    let payer = battle
        .get_mut(attacker_id)
        .ok_or_else(|| missing(attacker_id))?;
    deduct(payer, skill.cost_kind, price)?;

    let mut result = ResolutionResult::new(attacker_id, skill.name.clone());
    result.cost_kind = skill.cost_kind;
    result.cost_paid = price;
    result.events.push(CombatEvent::SkillUsed {
        attacker: attacker.name.clone(),
        skill: skill.name.clone(),
        cost: price,
        kind: skill.cost_kind,
    });
    tracing::debug!(
        "{} uses {} for {} {} (multiplier x{:.4})",
        attacker.name,
        skill.name,
        price,
        skill.cost_kind,
        chain_multiplier
    );

    // Both rolled once per use, shared by every target.
    let insta_kill = skill
        .insta_kill_chance
        .is_some_and(|chance| roll_percent(chance, rng));
    let hits = skill.hits.map_or(1, |spec| spec.roll(rng));
    result.hits = hits;
    if skill.hits.is_some() {
        result.events.push(CombatEvent::MultiHit { hits });
    }

    let offense = attacker.offense_for(skill.category);

    for &target_id in targets {
        let target = match battle.get(target_id) {
            Some(t) if t.is_alive() => t.clone(),
            _ => continue,
        };
        let reaction = target.affinities.reaction(skill.category);

        let outcome = match reaction {
            Reaction::Null => {
                result.events.push(CombatEvent::Nullified {
                    target: target.name.clone(),
                    category: skill.category,
                });
                TargetOutcome {
                    target: target_id,
                    effect: TargetEffect::Nullified,
                    downed: false,
                    defeated: false,
                }
            }
            Reaction::Reflect => {
                let bounced = party_formula_damage(
                    skill.power,
                    offense,
                    attacker.stats.endurance,
                    LEVEL_DIFFERENCE,
                    1.0,
                );
                let source = battle
                    .get_mut(attacker_id)
                    .ok_or_else(|| missing(attacker_id))?;
                let dealt = source.hp.drain(bounced);
                let attacker_fell = dealt > 0 && !source.is_alive();
                result.events.push(CombatEvent::Reflected {
                    target: target.name.clone(),
                    attacker: attacker.name.clone(),
                    category: skill.category,
                    damage: dealt,
                });
                if attacker_fell {
                    result.events.push(CombatEvent::Defeated {
                        name: attacker.name.clone(),
                    });
                }
                TargetOutcome {
                    target: target_id,
                    effect: TargetEffect::Reflected { damage: dealt },
                    downed: false,
                    defeated: false,
                }
            }
            Reaction::Absorb => {
                let drained = party_formula_damage(
                    skill.power,
                    offense,
                    target.stats.endurance,
                    LEVEL_DIFFERENCE,
                    1.0,
                );
                let sink = battle
                    .get_mut(target_id)
                    .ok_or_else(|| missing(target_id))?;
                let healed = sink.hp.restore(drained);
                result.events.push(CombatEvent::Absorbed {
                    target: target.name.clone(),
                    category: skill.category,
                    amount: healed,
                });
                TargetOutcome {
                    target: target_id,
                    effect: TargetEffect::Absorbed { healed },
                    downed: false,
                    defeated: false,
                }
            }
            _ if insta_kill => {
                let victim = battle
                    .get_mut(target_id)
                    .ok_or_else(|| missing(target_id))?;
                victim.hp.deplete();
                victim.is_down = true;
                result.events.push(CombatEvent::InstantKill {
                    target: target.name.clone(),
                });
                TargetOutcome {
                    target: target_id,
                    effect: TargetEffect::InstantKill,
                    downed: true,
                    defeated: true,
                }
            }
            _ => {
                let (amount, crits) = strike(
                    &attacker,
                    &target,
                    skill,
                    reaction,
                    hits,
                    chain_multiplier,
                    rng,
                    &mut result.events,
                );
                let victim = battle
                    .get_mut(target_id)
                    .ok_or_else(|| missing(target_id))?;
                victim.hp.drain(amount);
                let downed = reaction == Reaction::Weak || crits > 0;
                if downed {
                    victim.is_down = true;
                }
                let defeated = !victim.is_alive();
                result.events.push(CombatEvent::Damaged {
                    target: target.name.clone(),
                    damage: amount,
                    reaction,
                    remaining_hp: victim.hp.current(),
                });
                if downed {
                    result.events.push(CombatEvent::Downed {
                        target: target.name.clone(),
                    });
                }
                if defeated {
                    result.events.push(CombatEvent::Defeated {
                        name: target.name.clone(),
                    });
                }
                TargetOutcome {
                    target: target_id,
                    effect: TargetEffect::Damaged {
                        amount,
                        reaction,
                        crits,
                    },
                    downed,
                    defeated,
                }
            }
        };

        tracing::debug!("{} -> {}: {:?}", attacker.name, target.name, outcome.effect);
        result.outcomes.push(outcome);
    }

    Ok(result)
}

/// Run every hit of a damaging skill against one target.
/// Returns (total damage, number of critical hits).
#[allow(clippy::too_many_arguments)]
fn strike(
    attacker: &Combatant,
    target: &Combatant,
    skill: &SkillDef,
    reaction: Reaction,
    hits: u32,
    chain_multiplier: f64,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) -> (u32, u32) {
    let offense = attacker.offense_for(skill.category);
    let formula = DamageFormula::for_attacker(attacker.side);
    let crit_chance = if skill.is_melee {
        Some(melee_crit_chance(
            attacker.stats.luck,
            target.stats.luck,
            attacker.side,
        ))
    } else {
        skill.crit_chance
    };

    let mut total: u32 = 0;
    let mut crits = 0;
    for _ in 0..hits {
        let base = match formula {
            DamageFormula::Party => party_formula_damage(
                skill.power,
                offense,
                target.stats.endurance,
                LEVEL_DIFFERENCE,
                reaction.multiplier(),
            ),
            DamageFormula::Opponent => opponent_formula_damage(
                skill.power,
                offense,
                target.stats.endurance,
                target.armor,
                LEVEL_DIFFERENCE,
                reaction.multiplier(),
                skill.is_melee,
            ),
        };
        let mut damage = apply_chain_multiplier(base, chain_multiplier);

        if let Some(chance) = crit_chance {
            if roll_percent(chance, rng) {
                damage = apply_critical(damage);
                crits += 1;
                events.push(CombatEvent::CriticalHit {
                    target: target.name.clone(),
                    chance,
                });
            }
        }

        total = total.saturating_add(damage);
    }
    (total, crits)
}

/// Check the call is well formed and return a snapshot of the attacker.
fn validate(battle: &Battle, attacker_id: CombatantId, targets: &[CombatantId]) -> Result<Combatant> {
    let attacker = battle.get(attacker_id).ok_or_else(|| missing(attacker_id))?;
    if !attacker.is_alive() {
        return Err(BattleError::InvalidTarget(format!(
            "{} is incapacitated",
            attacker.name
        )));
    }
    for (i, &target_id) in targets.iter().enumerate() {
        if battle.get(target_id).is_none() {
            return Err(missing(target_id));
        }
        if target_id == attacker_id {
            return Err(BattleError::InvalidTarget(format!(
                "{} cannot target themselves",
                attacker.name
            )));
        }
        if targets[..i].contains(&target_id) {
            return Err(BattleError::InvalidTarget(format!(
                "{:?} listed twice",
                target_id
            )));
        }
    }
    Ok(attacker.clone())
}

fn missing(id: CombatantId) -> BattleError {
    BattleError::InvalidTarget(format!("no {} combatant at position {}", id.side, id.index + 1))
}
