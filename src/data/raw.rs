//! On-disk record shapes. Field names follow the data files, not the
//! domain types; conversion happens in the loaders.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Accepts `12`, `12.0` or `"12"`.
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u32),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Float(f) if f >= 0.0 && f.is_finite() => Ok(f as u32),
        Raw::Float(f) => Err(de::Error::custom(format!("expected a non-negative number, got {f}"))),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected a number, got {s:?}"))),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartyFile {
    #[serde(rename = "partyMembers")]
    pub party_members: Vec<MemberRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    #[serde(deserialize_with = "lenient_u32")]
    pub strength: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub magic: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub endurance: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub agility: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub luck: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub hp: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub sp: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub weapon: u32,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub armor: u32,
    #[serde(default)]
    pub weak: Option<String>,
    #[serde(default)]
    pub strong: Option<String>,
    #[serde(default)]
    pub null: Option<String>,
    #[serde(default)]
    pub reflect: Option<String>,
    #[serde(default)]
    pub absorb: Option<String>,
}

/// One bestiary row. Any extra column named after a category holds that
/// category's reaction label; other extra columns are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct OpponentRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Strength", deserialize_with = "lenient_u32")]
    pub strength: u32,
    #[serde(rename = "Magic", deserialize_with = "lenient_u32")]
    pub magic: u32,
    #[serde(rename = "Endurance", deserialize_with = "lenient_u32")]
    pub endurance: u32,
    #[serde(rename = "Agility", deserialize_with = "lenient_u32")]
    pub agility: u32,
    #[serde(rename = "Luck", deserialize_with = "lenient_u32")]
    pub luck: u32,
    #[serde(rename = "Max HP", deserialize_with = "lenient_u32")]
    pub max_hp: u32,
    #[serde(rename = "Max SP", deserialize_with = "lenient_u32")]
    pub max_sp: u32,
    #[serde(flatten)]
    pub columns: BTreeMap<String, serde_json::Value>,
}

/// Skills file: category -> skill name -> definition.
pub type SkillFile = BTreeMap<String, BTreeMap<String, SkillRecord>>;

#[derive(Debug, Clone, Deserialize)]
pub struct SkillRecord {
    #[serde(deserialize_with = "lenient_u32")]
    pub skill_power: u32,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub cost: Option<CostRecord>,
    #[serde(default)]
    pub crit_chance: Option<String>,
    #[serde(default)]
    pub insta_chance: Option<String>,
    #[serde(default)]
    pub multi_hit: Option<String>,
    #[serde(default)]
    pub num_hits: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CostRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Probe {
        #[serde(deserialize_with = "lenient_u32")]
        n: u32,
    }

    #[test]
    fn lenient_numbers() {
        let probe: Probe = serde_json::from_str(r#"{"n": "42"}"#).unwrap();
        assert_eq!(probe.n, 42);
        let probe: Probe = serde_json::from_str(r#"{"n": 7}"#).unwrap();
        assert_eq!(probe.n, 7);
        let probe: Probe = serde_json::from_str(r#"{"n": 9.0}"#).unwrap();
        assert_eq!(probe.n, 9);
        assert!(serde_json::from_str::<Probe>(r#"{"n": "lots"}"#).is_err());
        assert!(serde_json::from_str::<Probe>(r#"{"n": -3}"#).is_err());
    }

    #[test]
    fn opponent_row_keeps_extra_columns() {
        let row: OpponentRecord = serde_json::from_str(
            r#"{"Name": "Pixie", "Strength": "3", "Magic": "6", "Endurance": "3",
                "Agility": "5", "Luck": "4", "Max HP": "45", "Max SP": "30",
                "Fire": "Weak", "Arcana": "Lovers"}"#,
        )
        .unwrap();
        assert_eq!(row.max_hp, 45);
        assert_eq!(row.columns["Fire"], "Weak");
        assert!(row.columns.contains_key("Arcana"));
    }
}
