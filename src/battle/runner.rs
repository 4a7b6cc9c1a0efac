//! Battle loop: rounds of turns until one side is wiped out.

use super::chain::{run_turn, TurnContext};
use super::decisions::DecisionProvider;
use super::state::Battle;
use super::types::Outcome;
use crate::character::{Combatant, Side};
use crate::combat::CombatEvent;
use crate::core::BattleConfig;
use crate::error::{BattleError, Result};
use crate::skills::SkillCatalog;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

/// End-of-battle snapshot of one combatant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CombatantSummary {
    pub name: String,
    pub side: Side,
    pub hp: u32,
    pub max_hp: u32,
    pub sp: u32,
    pub max_sp: u32,
}

impl From<&Combatant> for CombatantSummary {
    fn from(c: &Combatant) -> Self {
        Self {
            name: c.name.clone(),
            side: c.side,
            hp: c.hp.current(),
            max_hp: c.hp.max(),
            sp: c.sp.current(),
            max_sp: c.sp.max(),
        }
    }
}

/// Result of a finished battle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleReport {
    pub outcome: Outcome,
    pub rounds: u32,
    pub combatants: Vec<CombatantSummary>,
    pub events: Vec<CombatEvent>,
}

impl BattleReport {
    fn new(battle: &Battle, events: Vec<CombatEvent>) -> Self {
        Self {
            outcome: battle.outcome(),
            rounds: battle.round,
            combatants: battle
                .party()
                .iter()
                .chain(battle.opponents())
                .map(CombatantSummary::from)
                .collect(),
            events,
        }
    }

    pub fn survivors(&self, side: Side) -> impl Iterator<Item = &CombatantSummary> {
        self.combatants
            .iter()
            .filter(move |c| c.side == side && c.hp > 0)
    }

    pub fn to_text(&self) -> String {
        let mut report = String::new();
        for event in &self.events {
            report.push_str(&event.to_string());
            report.push('\n');
        }

        report.push_str("\n── RESULT ───────────────────────────────────────\n");
        report.push_str(&format!("  {} ({} rounds)\n", self.outcome, self.rounds));
        for c in &self.combatants {
            report.push_str(&format!(
                "  {:<12} {:<9} HP {:>4}/{:<4} SP {:>4}/{:<4}\n",
                c.name, c.side, c.hp, c.max_hp, c.sp, c.max_sp
            ));
        }
        report
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Run rounds until one side has nobody standing.
///
/// Fails with `RoundLimitReached` if `config.max_rounds` rounds pass
/// without a winner.
pub fn run_battle<P: DecisionProvider, R: Rng>(
    battle: &mut Battle,
    catalog: &SkillCatalog,
    config: &BattleConfig,
    decisions: &mut P,
    rng: &mut R,
) -> Result<BattleReport> {
    let mut log = Vec::new();
    tracing::info!(
        "battle begins: {} vs {} ({:?} advantage)",
        battle.party().len(),
        battle.opponents().len(),
        config.advantage
    );

    loop {
        let outcome = battle.outcome();
        if outcome.is_over() {
            let mut ctx = TurnContext {
                catalog,
                config,
                decisions: &mut *decisions,
                rng: &mut *rng,
                log: &mut log,
            };
            ctx.emit(CombatEvent::BattleEnded { outcome });
            tracing::info!("{} after {} rounds", outcome, battle.round);
            return Ok(BattleReport::new(battle, log));
        }
        if battle.round >= config.max_rounds {
            tracing::warn!("no winner after {} rounds", battle.round);
            return Err(BattleError::RoundLimitReached(battle.round));
        }

        let mut ctx = TurnContext {
            catalog,
            config,
            decisions: &mut *decisions,
            rng: &mut *rng,
            log: &mut log,
        };
        play_round(battle, &mut ctx)?;
    }
}

/// Play one round. Stops early once the battle is decided; down flags are
/// cleared at the end either way.
pub fn play_round<P: DecisionProvider, R: Rng>(
    battle: &mut Battle,
    ctx: &mut TurnContext<'_, P, R>,
) -> Result<Outcome> {
    battle.round += 1;
    let round = battle.round;
    ctx.emit(CombatEvent::RoundStarted { round });
    tracing::debug!("round {} begins", round);

    let order = battle.turn_order(ctx.config.advantage);
    let mut acted = HashSet::new();
    for id in order {
        if battle.outcome().is_over() {
            break;
        }
        // pass recipients already had their action this round
        if acted.contains(&id) {
            continue;
        }
        if !battle.get(id).is_some_and(Combatant::is_alive) {
            continue;
        }
        run_turn(battle, id, &mut acted, ctx)?;
    }

    battle.clear_down_flags();
    ctx.emit(CombatEvent::RoundEnded { round });
    Ok(battle.outcome())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::Category;
    use crate::battle::ScriptedDecisions;
    use crate::character::{CombatantId, ResourceKind, Stats};
    use crate::skills::{CostSpec, SkillDef};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog() -> SkillCatalog {
        SkillCatalog::from_skills([
            SkillDef::new("bufu", Category::Ice, 40).with_cost(ResourceKind::Sp, CostSpec::Flat(4))
        ])
        .unwrap()
    }

    fn battle(foe_hp: u32) -> Battle {
        let hero = Stats {
            magic: 50,
            agility: 30,
            ..Stats::default()
        };
        let foe = Stats {
            endurance: 30,
            agility: 1,
            ..Stats::default()
        };
        Battle::new(
            vec![Combatant::new("Joker", Side::Player, hero, 100, 50)],
            vec![Combatant::new("Pixie", Side::Opponent, foe, foe_hp, 10)],
        )
    }

    #[test]
    fn battle_runs_until_opponents_fall() {
        let mut battle = battle(100);
        // 63 damage per bufu; the opponent just skips
        let mut script = ScriptedDecisions::new()
            .then_use("bufu", Some(0))
            .then_skip()
            .then_use("bufu", Some(0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = run_battle(
            &mut battle,
            &catalog(),
            &BattleConfig::default(),
            &mut script,
            &mut rng,
        )
        .unwrap();

        assert_eq!(report.outcome, Outcome::PlayerWins);
        assert_eq!(report.rounds, 2);
        assert_eq!(battle.get(CombatantId::player(0)).unwrap().sp.current(), 42);
        assert!(matches!(
            report.events.last(),
            Some(CombatEvent::BattleEnded {
                outcome: Outcome::PlayerWins
            })
        ));
        assert_eq!(report.survivors(Side::Player).count(), 1);
        assert_eq!(report.survivors(Side::Opponent).count(), 0);
    }

    #[test]
    fn round_limit_is_an_error() {
        let mut battle = battle(100);
        let mut script = ScriptedDecisions::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = BattleConfig::default().with_max_rounds(3);
        let err = run_battle(&mut battle, &catalog(), &config, &mut script, &mut rng).unwrap_err();
        assert!(matches!(err, BattleError::RoundLimitReached(3)));
        assert_eq!(battle.round, 3);
    }

    #[test]
    fn round_clears_down_flags() {
        let mut battle = battle(1000);
        battle.get_mut(CombatantId::opponent(0)).unwrap().is_down = true;
        let catalog = catalog();
        let config = BattleConfig::default();
        let mut script = ScriptedDecisions::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut log = Vec::new();
        let mut ctx = TurnContext {
            catalog: &catalog,
            config: &config,
            decisions: &mut script,
            rng: &mut rng,
            log: &mut log,
        };
        let outcome = play_round(&mut battle, &mut ctx).unwrap();
        assert_eq!(outcome, Outcome::Ongoing);
        assert!(!battle.get(CombatantId::opponent(0)).unwrap().is_down);
        assert_eq!(log.first(), Some(&CombatEvent::RoundStarted { round: 1 }));
        assert_eq!(log.last(), Some(&CombatEvent::RoundEnded { round: 1 }));
    }

    #[test]
    fn report_renders_text_and_json() {
        let mut battle = battle(50);
        let mut script = ScriptedDecisions::new().then_use("bufu", Some(0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let report = run_battle(
            &mut battle,
            &catalog(),
            &BattleConfig::default(),
            &mut script,
            &mut rng,
        )
        .unwrap();
        let text = report.to_text();
        assert!(text.contains("Joker uses bufu (4 SP)!"));
        assert!(text.contains("Party wins! (1 rounds)"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(json["outcome"], "player_wins");
        assert_eq!(json["rounds"], 1);
        assert_eq!(json["events"][0]["event"], "round_started");
    }
}
