use super::raw::OpponentRecord;
use crate::affinity::{AffinityTable, Category, Reaction};
use crate::character::{Combatant, Side, Stats};
use crate::error::{BattleError, Result};
use std::fs;
use std::path::Path;

/// Every opponent that can be summoned into a battle.
#[derive(Debug, Clone, Default)]
pub struct Bestiary {
    entries: Vec<Combatant>,
}

impl Bestiary {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("loading bestiary from {}", path.display());
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let rows: Vec<OpponentRecord> = serde_json::from_str(json)?;
        let entries = rows
            .into_iter()
            .map(opponent_from_record)
            .collect::<Result<Vec<_>>>()?;
        tracing::info!("loaded {} bestiary entries", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.name.as_str())
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Combatant> {
        let name = name.trim();
        self.entries
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Fresh, independent combatants for the named entries, in the order
    /// given. Naming an entry twice yields two opponents.
    pub fn summon<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Combatant>> {
        names
            .iter()
            .map(|name| {
                self.get(name.as_ref())
                    .cloned()
                    .ok_or_else(|| BattleError::UnknownCombatant(name.as_ref().to_string()))
            })
            .collect()
    }
}

fn opponent_from_record(record: OpponentRecord) -> Result<Combatant> {
    let stats = Stats {
        strength: record.strength,
        magic: record.magic,
        endurance: record.endurance,
        agility: record.agility,
        luck: record.luck,
    };

    let mut affinities = AffinityTable::new();
    for (column, value) in &record.columns {
        let Ok(category) = column.parse::<Category>() else {
            continue;
        };
        let label = value.as_str().and_then(|s| s.split_whitespace().next());
        if let Some(label) = label {
            affinities.declare(category, Reaction::from_label(label))?;
        }
    }

    let opponent = Combatant::new(record.name, Side::Opponent, stats, record.max_hp, record.max_sp)
        .with_affinities(affinities);
    opponent.validate()?;
    Ok(opponent)
}
