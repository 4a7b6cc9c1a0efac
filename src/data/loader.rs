//! Party and skill file loading.

use super::raw::{CostRecord, MemberRecord, PartyFile, SkillFile, SkillRecord};
use crate::affinity::{AffinityTable, Category, Reaction};
use crate::character::{Combatant, ResourceKind, Side, Stats};
use crate::error::{BattleError, Result};
use crate::skills::{parse_chance, CostSpec, HitSpec, SkillCatalog, SkillDef, TargetMode};
use std::fs;
use std::path::Path;

pub fn load_party(path: impl AsRef<Path>) -> Result<Vec<Combatant>> {
    let path = path.as_ref();
    tracing::debug!("loading party from {}", path.display());
    parse_party(&fs::read_to_string(path)?)
}

pub fn parse_party(json: &str) -> Result<Vec<Combatant>> {
    let file: PartyFile = serde_json::from_str(json)?;
    let party = file
        .party_members
        .into_iter()
        .map(member_from_record)
        .collect::<Result<Vec<_>>>()?;
    tracing::info!("loaded {} party members", party.len());
    Ok(party)
}

fn member_from_record(record: MemberRecord) -> Result<Combatant> {
    let stats = Stats {
        strength: record.strength,
        magic: record.magic,
        endurance: record.endurance,
        agility: record.agility,
        luck: record.luck,
    };

    let mut affinities = AffinityTable::new();
    let lists = [
        (Reaction::Weak, &record.weak),
        (Reaction::Resist, &record.strong),
        (Reaction::Null, &record.null),
        (Reaction::Reflect, &record.reflect),
        (Reaction::Absorb, &record.absorb),
    ];
    for (reaction, list) in lists {
        if let Some(list) = list {
            affinities.declare_list(reaction, list)?;
        }
    }

    let member = Combatant::new(record.name, Side::Player, stats, record.hp, record.sp)
        .with_equipment(record.weapon, record.armor)
        .with_affinities(affinities);
    member.validate()?;
    Ok(member)
}

pub fn load_skills(path: impl AsRef<Path>) -> Result<SkillCatalog> {
    let path = path.as_ref();
    tracing::debug!("loading skills from {}", path.display());
    parse_skills(&fs::read_to_string(path)?)
}

pub fn parse_skills(json: &str) -> Result<SkillCatalog> {
    let file: SkillFile = serde_json::from_str(json)?;
    let mut catalog = SkillCatalog::new();
    for (category_name, skills) in file {
        let category: Category = category_name.parse()?;
        for (name, record) in skills {
            catalog.insert(skill_from_record(&name, category, record)?)?;
        }
    }
    tracing::info!("loaded {} skills", catalog.len());
    Ok(catalog)
}

fn skill_from_record(name: &str, category: Category, record: SkillRecord) -> Result<SkillDef> {
    let mut skill = SkillDef::new(name.trim(), category, record.skill_power);

    if let Some(target) = &record.target_type {
        skill = skill.with_target(target.parse::<TargetMode>()?);
    }
    if let Some(cost) = &record.cost {
        let (kind, spec) = cost_from_record(cost)?;
        skill = skill.with_cost(kind, spec);
    }
    if let Some(chance) = &record.crit_chance {
        skill = skill.with_crit_chance(parse_chance(chance)?);
    }
    if let Some(chance) = &record.insta_chance {
        skill = skill.with_insta_kill_chance(parse_chance(chance)?);
    }
    let multi_hit = record
        .multi_hit
        .as_deref()
        .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("y"));
    if multi_hit {
        let spec = record
            .num_hits
            .as_deref()
            .ok_or_else(|| BattleError::MalformedHitSpec(format!("{name}: missing num_hits")))?;
        skill = skill.with_hits(spec.parse::<HitSpec>()?);
    }
    Ok(skill)
}

/// Cost values are either a number or text such as `"12"`, `"15%"` or
/// `"8 SP"`; anything but digits and `%` is dropped from text.
fn cost_from_record(cost: &CostRecord) -> Result<(ResourceKind, CostSpec)> {
    let kind: ResourceKind = cost.kind.parse()?;
    let spec = match &cost.value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .map(CostSpec::Flat)
            .ok_or_else(|| BattleError::MalformedCost(n.to_string()))?,
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '%')
                .collect();
            cleaned
                .parse()
                .map_err(|_| BattleError::MalformedCost(s.clone()))?
        }
        other => return Err(BattleError::MalformedCost(other.to_string())),
    };
    Ok((kind, spec))
}
