//! Group finishing attack ("all-out attack").

use super::damage::finisher_damage;
use super::types::{CombatEvent, ResolutionResult, TargetEffect, TargetOutcome};
use crate::affinity::Reaction;
use crate::battle::Battle;
use crate::character::{CombatantId, Side};
use crate::error::{BattleError, Result};

pub const FINISHER_ACTION_NAME: &str = "all-out attack";

/// Whole-roster strike available once every live combatant on the other side is down.
///
/// The first member of the attacking roster leads: power is half their weapon
/// power and offense is their strength. Damage is multiplied by the attacking
/// roster's size, counting fallen members. Bypasses cost, affinity and crits.
pub fn resolve_finishing_attack(battle: &mut Battle, attacking: Side) -> Result<ResolutionResult> {
    let defending = attacking.opposite();
    if !battle.all_live_down(defending) {
        return Err(BattleError::FinisherUnavailable);
    }
    let leader = battle
        .roster(attacking)
        .first()
        .cloned()
        .ok_or(BattleError::FinisherUnavailable)?;
    let party_size = battle.roster(attacking).len();
    let power = leader.weapon / 2;

    let leader_id = CombatantId {
        side: attacking,
        index: 0,
    };
    let mut result = ResolutionResult::new(leader_id, FINISHER_ACTION_NAME);
    result.hits = 1;
    result.events.push(CombatEvent::AllOutAttack {
        leader: leader.name.clone(),
        party_size,
    });
    tracing::info!("{} leads an all-out attack with {} members", leader.name, party_size);

    for target_id in battle.live_ids(defending) {
        let Some(target) = battle.get_mut(target_id) else {
            continue;
        };
        let damage = finisher_damage(power, leader.stats.strength, target.stats.endurance, party_size);
        target.hp.drain(damage);
        let defeated = !target.is_alive();
        result.events.push(CombatEvent::FinisherHit {
            target: target.name.clone(),
            damage,
            remaining_hp: target.hp.current(),
        });
        if defeated {
            result.events.push(CombatEvent::Defeated {
                name: target.name.clone(),
            });
        }
        result.outcomes.push(TargetOutcome {
            target: target_id,
            effect: TargetEffect::Damaged {
                amount: damage,
                reaction: Reaction::Normal,
                crits: 0,
            },
            downed: false,
            defeated,
        });
    }

    Ok(result)
}
