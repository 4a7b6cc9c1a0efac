use super::types::SkillDef;
use crate::affinity::Category;
use crate::character::Combatant;
use crate::core::constants::MELEE_SKILL_NAME;
use crate::error::{BattleError, Result};
use std::collections::BTreeMap;

/// Immutable skill lookup built once at load time: category -> name -> definition.
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    by_category: BTreeMap<Category, BTreeMap<String, SkillDef>>,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. Names are unique across all categories.
    pub fn insert(&mut self, skill: SkillDef) -> Result<()> {
        let name = skill.name.to_lowercase();
        if name == MELEE_SKILL_NAME || self.find(&name).is_some() {
            return Err(BattleError::DuplicateSkill(name));
        }
        self.by_category
            .entry(skill.category)
            .or_default()
            .insert(name, skill);
        Ok(())
    }

    pub fn from_skills(skills: impl IntoIterator<Item = SkillDef>) -> Result<Self> {
        let mut catalog = Self::new();
        for skill in skills {
            catalog.insert(skill)?;
        }
        Ok(catalog)
    }

    /// Case-insensitive lookup. Not found is an ordinary outcome.
    pub fn find(&self, name: &str) -> Option<&SkillDef> {
        let key = name.trim().to_lowercase();
        self.by_category.values().find_map(|skills| skills.get(&key))
    }

    pub fn get(&self, category: Category, name: &str) -> Option<&SkillDef> {
        self.by_category
            .get(&category)
            .and_then(|skills| skills.get(&name.trim().to_lowercase()))
    }

    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &SkillDef> {
        self.by_category
            .get(&category)
            .into_iter()
            .flat_map(|skills| skills.values())
    }

    pub fn len(&self) -> usize {
        self.by_category.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Turn an action name into a definition for this attacker,
    /// synthesising the basic melee attack.
    pub fn resolve(&self, name: &str, attacker: &Combatant) -> Result<SkillDef> {
        if name.trim().eq_ignore_ascii_case(MELEE_SKILL_NAME) {
            return Ok(SkillDef::melee(attacker));
        }
        self.find(name)
            .cloned()
            .ok_or_else(|| BattleError::UnknownSkill(name.to_string()))
    }
}
