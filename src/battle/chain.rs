//! Per-turn state machine: acting, "one more" chains, passes and finishers.
//!
//! ```text
//! Idle -> Acting -> Resolved -> Idle
//!           |  ^
//!           v  | (pass)
//!         Chained -> Resolved (finisher, declined pass, no candidates)
//! ```
//!
//! `Chained` is only reachable for a party member whose skill downed at
//! least one target. The chain state lives exactly as long as one turn.

use super::decisions::DecisionProvider;
use super::state::Battle;
use super::types::{Action, TurnView};
use crate::character::{CombatantId, Side};
use crate::combat::{resolve_finishing_attack, resolve_skill_use, CombatEvent, ResolutionResult};
use crate::core::constants::PASS_MULTIPLIER;
use crate::core::BattleConfig;
use crate::error::{BattleError, Result};
use crate::skills::{SkillCatalog, TargetMode};
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Idle,
    Acting,
    Chained,
    Resolved,
}

/// How a turn ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnEnd {
    /// Nobody did anything.
    Skipped,
    /// At least one skill resolved.
    Acted,
    /// Ended with a group finishing attack.
    Finished,
}

/// Transient data for one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainState {
    pub actor: CombatantId,
    pub multiplier: f64,
    /// Targets downed by the most recent skill use.
    pub downed: Vec<CombatantId>,
    pub passes: u32,
}

impl ChainState {
    pub fn new(actor: CombatantId) -> Self {
        Self {
            actor,
            multiplier: 1.0,
            downed: Vec::new(),
            passes: 0,
        }
    }

    pub fn pass_to(&mut self, next: CombatantId) {
        self.actor = next;
        self.multiplier *= PASS_MULTIPLIER;
        self.passes += 1;
        self.downed.clear();
    }
}

/// Everything a turn needs besides the battle itself.
pub struct TurnContext<'a, P: DecisionProvider, R: Rng> {
    pub catalog: &'a SkillCatalog,
    pub config: &'a BattleConfig,
    pub decisions: &'a mut P,
    pub rng: &'a mut R,
    pub log: &'a mut Vec<CombatEvent>,
}

impl<P: DecisionProvider, R: Rng> TurnContext<'_, P, R> {
    pub fn emit(&mut self, event: CombatEvent) {
        self.decisions.on_event(&event);
        self.log.push(event);
    }

    fn emit_all(&mut self, events: Vec<CombatEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}

/// Drive one combatant's turn to completion.
///
/// `acted` holds everyone who has already had control this round; the
/// actor and every pass recipient are added to it.
pub fn run_turn<P: DecisionProvider, R: Rng>(
    battle: &mut Battle,
    actor: CombatantId,
    acted: &mut HashSet<CombatantId>,
    ctx: &mut TurnContext<'_, P, R>,
) -> Result<TurnEnd> {
    let mut chain = ChainState::new(actor);
    acted.insert(actor);
    announce(battle, actor, ctx);

    let mut end = TurnEnd::Skipped;
    let mut rejections = 0;
    let mut phase = TurnPhase::Acting;

    while phase != TurnPhase::Idle {
        phase = match phase {
            TurnPhase::Acting => {
                if rejections >= ctx.config.max_rejections_per_turn {
                    tracing::warn!(
                        "{} rejected decisions for {}, skipping",
                        rejections,
                        name_of(battle, chain.actor)
                    );
                    ctx.emit(CombatEvent::TurnSkipped {
                        name: name_of(battle, chain.actor),
                    });
                    TurnPhase::Resolved
                } else {
                    let action = {
                        let view = TurnView {
                            battle: &*battle,
                            actor: chain.actor,
                            chain_multiplier: chain.multiplier,
                        };
                        ctx.decisions.choose_action(&view)
                    };
                    match action {
                        Action::Skip => {
                            ctx.emit(CombatEvent::TurnSkipped {
                                name: name_of(battle, chain.actor),
                            });
                            TurnPhase::Resolved
                        }
                        Action::Use { skill, target } => {
                            match perform(battle, &chain, &skill, target, ctx) {
                                Ok(result) => {
                                    end = TurnEnd::Acted;
                                    chain.downed = result.downed_targets();
                                    ctx.emit_all(result.events);
                                    if chain.actor.side == Side::Player
                                        && !chain.downed.is_empty()
                                        && !battle.outcome().is_over()
                                    {
                                        TurnPhase::Chained
                                    } else {
                                        TurnPhase::Resolved
                                    }
                                }
                                Err(err) if err.is_recoverable() => {
                                    rejections += 1;
                                    tracing::debug!("rejected {}: {}", skill, err);
                                    ctx.emit(CombatEvent::ActionRejected {
                                        name: name_of(battle, chain.actor),
                                        reason: err.to_string(),
                                    });
                                    ctx.decisions.on_rejected(&err);
                                    TurnPhase::Acting
                                }
                                Err(err) => return Err(err),
                            }
                        }
                    }
                }
            }
            TurnPhase::Chained => {
                ctx.emit(CombatEvent::OneMore {
                    name: name_of(battle, chain.actor),
                });
                let foes = chain.actor.side.opposite();
                if battle.all_live_down(foes) && ctx.decisions.offer_finisher(battle) {
                    let result = resolve_finishing_attack(battle, chain.actor.side)?;
                    ctx.emit_all(result.events);
                    end = TurnEnd::Finished;
                    TurnPhase::Resolved
                } else {
                    let candidates = pass_candidates(battle, chain.actor, acted);
                    let choice = if candidates.is_empty() {
                        None
                    } else {
                        ctx.decisions.offer_pass(battle, &candidates)
                    };
                    match choice {
                        Some(next) if candidates.contains(&next) => {
                            let from = name_of(battle, chain.actor);
                            chain.pass_to(next);
                            acted.insert(next);
                            rejections = 0;
                            tracing::info!(
                                "{} passes to {} (x{:.4})",
                                from,
                                name_of(battle, next),
                                chain.multiplier
                            );
                            ctx.emit(CombatEvent::BatonPass {
                                from,
                                to: name_of(battle, next),
                                multiplier: chain.multiplier,
                            });
                            announce(battle, next, ctx);
                            TurnPhase::Acting
                        }
                        _ => TurnPhase::Resolved,
                    }
                }
            }
            TurnPhase::Resolved | TurnPhase::Idle => TurnPhase::Idle,
        };
    }

    Ok(end)
}

/// Live allies of the actor that have not had control this round.
pub fn pass_candidates(
    battle: &Battle,
    actor: CombatantId,
    acted: &HashSet<CombatantId>,
) -> Vec<CombatantId> {
    battle
        .live_ids(actor.side)
        .into_iter()
        .filter(|id| *id != actor && !acted.contains(id))
        .collect()
}

/// Turn a target position into target ids for the given mode.
/// Single-target skills need a live combatant at that position; skills
/// hitting everyone take every live combatant on the side.
pub fn select_targets(
    battle: &Battle,
    side: Side,
    mode: TargetMode,
    position: Option<usize>,
) -> Result<Vec<CombatantId>> {
    match mode {
        TargetMode::All => Ok(battle.live_ids(side)),
        TargetMode::Single => {
            let index = position
                .ok_or_else(|| BattleError::InvalidTarget("no target chosen".to_string()))?;
            let id = CombatantId { side, index };
            match battle.get(id) {
                None => Err(BattleError::InvalidTarget(format!(
                    "no target at position {}",
                    index + 1
                ))),
                Some(target) if !target.is_alive() => Err(BattleError::InvalidTarget(format!(
                    "{} is incapacitated",
                    target.name
                ))),
                Some(_) => Ok(vec![id]),
            }
        }
    }
}

fn perform<P: DecisionProvider, R: Rng>(
    battle: &mut Battle,
    chain: &ChainState,
    skill_name: &str,
    position: Option<usize>,
    ctx: &mut TurnContext<'_, P, R>,
) -> Result<ResolutionResult> {
    let attacker = battle
        .get(chain.actor)
        .ok_or_else(|| BattleError::InvalidTarget("actor left the battle".to_string()))?;
    let skill = ctx.catalog.resolve(skill_name, attacker)?;
    let targets = select_targets(battle, chain.actor.side.opposite(), skill.target, position)?;
    resolve_skill_use(battle, chain.actor, &targets, &skill, chain.multiplier, &mut *ctx.rng)
}

fn announce<P: DecisionProvider, R: Rng>(
    battle: &Battle,
    actor: CombatantId,
    ctx: &mut TurnContext<'_, P, R>,
) {
    if let Some(c) = battle.get(actor) {
        ctx.emit(CombatEvent::TurnStarted {
            name: c.name.clone(),
            hp: c.hp.current(),
            max_hp: c.hp.max(),
            sp: c.sp.current(),
            max_sp: c.sp.max(),
        });
    }
}

fn name_of(battle: &Battle, id: CombatantId) -> String {
    battle
        .get(id)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("{:?}", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::{AffinityTable, Category, Reaction};
    use crate::battle::ScriptedDecisions;
    use crate::character::{Combatant, ResourceKind, Stats};
    use crate::skills::{CostSpec, SkillDef};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn member(name: &str, magic: u32) -> Combatant {
        let stats = Stats {
            strength: 30,
            magic,
            endurance: 20,
            agility: 20,
            luck: 10,
        };
        Combatant::new(name, Side::Player, stats, 200, 100).with_equipment(40, 10)
    }

    fn weak_to_fire(name: &str) -> Combatant {
        let stats = Stats {
            endurance: 30,
            ..Stats::default()
        };
        let table = AffinityTable::new().with(Category::Fire, Reaction::Weak).unwrap();
        Combatant::new(name, Side::Opponent, stats, 1000, 20).with_affinities(table)
    }

    fn catalog() -> SkillCatalog {
        SkillCatalog::from_skills([
            SkillDef::new("agi", Category::Fire, 40).with_cost(ResourceKind::Sp, CostSpec::Flat(4)),
            SkillDef::new("maragi", Category::Fire, 40)
                .with_target(TargetMode::All)
                .with_cost(ResourceKind::Sp, CostSpec::Flat(10)),
            SkillDef::new("bufu", Category::Ice, 40).with_cost(ResourceKind::Sp, CostSpec::Flat(4)),
        ])
        .unwrap()
    }

    fn battle() -> Battle {
        Battle::new(
            vec![member("Joker", 50), member("Ann", 50), member("Morgana", 50)],
            vec![weak_to_fire("Pixie"), weak_to_fire("Jack")],
        )
    }

    fn play(
        battle: &mut Battle,
        script: &mut ScriptedDecisions,
        acted: &mut HashSet<CombatantId>,
    ) -> (TurnEnd, Vec<CombatEvent>) {
        let catalog = catalog();
        let config = BattleConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut log = Vec::new();
        let mut ctx = TurnContext {
            catalog: &catalog,
            config: &config,
            decisions: script,
            rng: &mut rng,
            log: &mut log,
        };
        let end = run_turn(battle, CombatantId::player(0), acted, &mut ctx).unwrap();
        (end, log)
    }

    #[test]
    fn neutral_hit_resolves_without_chain() {
        let mut battle = battle();
        let mut script = ScriptedDecisions::new().then_use("bufu", Some(0));
        let mut acted = HashSet::new();
        let (end, log) = play(&mut battle, &mut script, &mut acted);
        assert_eq!(end, TurnEnd::Acted);
        assert!(!log.iter().any(|e| matches!(e, CombatEvent::OneMore { .. })));
    }

    #[test]
    fn weakness_offers_pass_with_multiplier() {
        let mut battle = battle();
        let mut script = ScriptedDecisions::new()
            .then_use("agi", Some(0))
            .then_pass(Some("Ann"))
            .then_use("agi", Some(0))
            .then_pass(Some("Morgana"))
            .then_use("bufu", Some(1));
        let mut acted = HashSet::new();
        let (end, log) = play(&mut battle, &mut script, &mut acted);
        assert_eq!(end, TurnEnd::Acted);

        let multipliers: Vec<f64> = log
            .iter()
            .filter_map(|e| match e {
                CombatEvent::BatonPass { multiplier, .. } => Some(*multiplier),
                _ => None,
            })
            .collect();
        assert_eq!(multipliers, vec![1.25, 1.5625]);
        assert_eq!(acted.len(), 3);

        // bufu at x1.5625: floor(floor(sqrt(1000) * 2) * 1.5625) = floor(63 * 1.5625) = 98
        let jack = battle.get(CombatantId::opponent(1)).unwrap();
        assert_eq!(jack.hp.current(), 1000 - 98);
    }

    #[test]
    fn finisher_offered_when_everyone_is_down() {
        let mut battle = battle();
        let mut script = ScriptedDecisions::new()
            .then_use("maragi", None)
            .then_finisher(true);
        let mut acted = HashSet::new();
        let (end, log) = play(&mut battle, &mut script, &mut acted);
        assert_eq!(end, TurnEnd::Finished);
        assert!(log
            .iter()
            .any(|e| matches!(e, CombatEvent::AllOutAttack { party_size: 3, .. })));
    }

    #[test]
    fn declined_finisher_falls_back_to_pass() {
        let mut battle = battle();
        let mut script = ScriptedDecisions::new()
            .then_use("maragi", None)
            .then_finisher(false)
            .then_pass(None);
        let mut acted = HashSet::new();
        let (end, _) = play(&mut battle, &mut script, &mut acted);
        assert_eq!(end, TurnEnd::Acted);
        assert_eq!(script.remaining_actions(), 0);
    }

    #[test]
    fn cannot_pass_to_someone_who_already_acted() {
        let mut battle = battle();
        let mut acted = HashSet::from([CombatantId::player(1), CombatantId::player(2)]);
        let mut script = ScriptedDecisions::new()
            .then_use("agi", Some(0))
            .then_pass(Some("Ann"))
            .then_use("agi", Some(1));
        let (_, log) = play(&mut battle, &mut script, &mut acted);
        assert!(!log.iter().any(|e| matches!(e, CombatEvent::BatonPass { .. })));
        // the queued agi was never consumed by a pass recipient
        assert_eq!(script.remaining_actions(), 1);
    }

    #[test]
    fn rejected_actions_are_reprompted() {
        let mut battle = battle();
        let mut script = ScriptedDecisions::new()
            .then_use("garu", Some(0))
            .then_use("bufu", Some(9))
            .then_use("bufu", Some(0));
        let mut acted = HashSet::new();
        let (end, log) = play(&mut battle, &mut script, &mut acted);
        assert_eq!(end, TurnEnd::Acted);
        let rejected = log
            .iter()
            .filter(|e| matches!(e, CombatEvent::ActionRejected { .. }))
            .count();
        assert_eq!(rejected, 2);
        assert_eq!(battle.get(CombatantId::player(0)).unwrap().sp.current(), 96);
    }

    #[test]
    fn rejection_budget_ends_the_turn() {
        let mut battle = battle();
        let mut script = ScriptedDecisions::new();
        for _ in 0..40 {
            script = script.then_use("garu", Some(0));
        }
        let mut acted = HashSet::new();
        let (end, _) = play(&mut battle, &mut script, &mut acted);
        assert_eq!(end, TurnEnd::Skipped);
        assert_eq!(script.remaining_actions(), 40 - 16);
    }

    #[test]
    fn pass_recipient_gets_a_fresh_rejection_budget() {
        let mut battle = battle();
        let mut script = ScriptedDecisions::new();
        for _ in 0..15 {
            script = script.then_use("garu", Some(0));
        }
        script = script.then_use("agi", Some(0)).then_pass(Some("Ann"));
        for _ in 0..3 {
            script = script.then_use("garu", Some(1));
        }
        script = script.then_use("agi", Some(1));

        let mut acted = HashSet::new();
        let (end, log) = play(&mut battle, &mut script, &mut acted);
        assert_eq!(end, TurnEnd::Acted);
        let rejected = log
            .iter()
            .filter(|e| matches!(e, CombatEvent::ActionRejected { .. }))
            .count();
        assert_eq!(rejected, 18);
        assert_eq!(script.remaining_actions(), 0);
        assert_eq!(battle.get(CombatantId::player(1)).unwrap().sp.current(), 96);
        assert!(battle.get(CombatantId::opponent(1)).unwrap().is_down);
    }

        #[test]
    fn select_targets_validates_position() {
        let mut battle = battle();
        assert_eq!(
            select_targets(&battle, Side::Opponent, TargetMode::Single, Some(1)).unwrap(),
            vec![CombatantId::opponent(1)]
        );
        assert!(select_targets(&battle, Side::Opponent, TargetMode::Single, None).is_err());
        battle.get_mut(CombatantId::opponent(1)).unwrap().hp.deplete();
        assert!(select_targets(&battle, Side::Opponent, TargetMode::Single, Some(1)).is_err());
        assert_eq!(
            select_targets(&battle, Side::Opponent, TargetMode::All, Some(1)).unwrap(),
            vec![CombatantId::opponent(0)]
        );
    }

    #[test]
    fn chain_state_pass_multiplies() {
        let mut chain = ChainState::new(CombatantId::player(0));
        chain.downed.push(CombatantId::opponent(0));
        chain.pass_to(CombatantId::player(1));
        chain.pass_to(CombatantId::player(2));
        assert_eq!(chain.multiplier, 1.5625);
        assert_eq!(chain.passes, 2);
        assert!(chain.downed.is_empty());
    }
}
