use super::types::{Advantage, Outcome};
use crate::character::{Combatant, CombatantId, Side};
use std::cmp::Reverse;

/// Battle aggregate: owns both rosters for the whole battle.
#[derive(Debug, Clone)]
pub struct Battle {
    party: Vec<Combatant>,
    opponents: Vec<Combatant>,
    /// Rounds started so far.
    pub round: u32,
}

impl Battle {
    /// Side tags are taken from the roster each combatant is placed in.
    pub fn new(mut party: Vec<Combatant>, mut opponents: Vec<Combatant>) -> Self {
        for member in &mut party {
            member.side = Side::Player;
        }
        for foe in &mut opponents {
            foe.side = Side::Opponent;
        }
        Self {
            party,
            opponents,
            round: 0,
        }
    }

    pub fn roster(&self, side: Side) -> &[Combatant] {
        match side {
            Side::Player => &self.party,
            Side::Opponent => &self.opponents,
        }
    }

    pub fn party(&self) -> &[Combatant] {
        &self.party
    }

    pub fn opponents(&self) -> &[Combatant] {
        &self.opponents
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.roster(id.side).get(id.index)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        match id.side {
            Side::Player => self.party.get_mut(id.index),
            Side::Opponent => self.opponents.get_mut(id.index),
        }
    }

    pub fn ids(&self, side: Side) -> impl Iterator<Item = CombatantId> + '_ {
        (0..self.roster(side).len()).map(move |index| CombatantId { side, index })
    }

    pub fn live_ids(&self, side: Side) -> Vec<CombatantId> {
        self.ids(side)
            .filter(|id| self.get(*id).is_some_and(Combatant::is_alive))
            .collect()
    }

    /// At least one combatant on `side` is alive and every live one is down.
    pub fn all_live_down(&self, side: Side) -> bool {
        let mut live = self.roster(side).iter().filter(|c| c.is_alive()).peekable();
        live.peek().is_some() && live.all(|c| c.is_down)
    }

    /// Down status only lasts for the round it was inflicted in.
    pub fn clear_down_flags(&mut self) {
        for combatant in self.party.iter_mut().chain(self.opponents.iter_mut()) {
            combatant.is_down = false;
        }
    }

    pub fn outcome(&self) -> Outcome {
        is_battle_over(&self.party, &self.opponents)
    }

    /// Order used for every round. The favored side keeps the front.
    pub fn turn_order(&self, advantage: Advantage) -> Vec<CombatantId> {
        compute_turn_order(&self.party, &self.opponents, advantage)
    }
}

/// Everyone, fastest first; ties keep party before opponents and roster order.
/// With an advantage, the favored side goes first in roster order, followed
/// by the rest in agility order.
pub fn compute_turn_order(
    party: &[Combatant],
    opponents: &[Combatant],
    advantage: Advantage,
) -> Vec<CombatantId> {
    let mut everyone: Vec<(CombatantId, u32)> = party
        .iter()
        .enumerate()
        .map(|(i, c)| (CombatantId::player(i), c.stats.agility))
        .chain(
            opponents
                .iter()
                .enumerate()
                .map(|(i, c)| (CombatantId::opponent(i), c.stats.agility)),
        )
        .collect();
    everyone.sort_by_key(|(_, agility)| Reverse(*agility));
    let by_agility = everyone.into_iter().map(|(id, _)| id);

    match advantage.favored_side() {
        None => by_agility.collect(),
        Some(side) => {
            let len = match side {
                Side::Player => party.len(),
                Side::Opponent => opponents.len(),
            };
            let mut order: Vec<CombatantId> =
                (0..len).map(|index| CombatantId { side, index }).collect();
            order.extend(by_agility.filter(|id| id.side != side));
            order
        }
    }
}

/// A side with nobody standing has lost. If both are wiped out at once,
/// the opponents win.
pub fn is_battle_over(party: &[Combatant], opponents: &[Combatant]) -> Outcome {
    if !party.iter().any(Combatant::is_alive) {
        Outcome::OpponentWins
    } else if !opponents.iter().any(Combatant::is_alive) {
        Outcome::PlayerWins
    } else {
        Outcome::Ongoing
    }
}
