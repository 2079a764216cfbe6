//! Record shapes for the SDE JSON Lines files
//!
//! Each struct mirrors one line of one `*.jsonl` file. Required fields are
//! plain values so a line missing them fails to parse; everything else is
//! optional and encodes as an empty cell downstream.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Number;

/// Text that is either a bare string or keyed by language code
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Localized {
    Plain(String),
    ByLanguage(BTreeMap<String, String>),
}

impl Localized {
    pub fn get(&self, language: &str) -> Option<&str> {
        match self {
            Localized::Plain(text) => Some(text),
            Localized::ByLanguage(map) => map.get(language).map(String::as_str),
        }
    }
}

/// Resolve an optional localized field to one language
pub fn localized<'a>(value: &'a Option<Localized>, language: &str) -> Option<&'a str> {
    value.as_ref().and_then(|v| v.get(language))
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeRecord {
    #[serde(rename = "_key")]
    pub type_id: i64,
    #[serde(rename = "groupID")]
    pub group_id: i64,
    pub name: Option<Localized>,
    pub description: Option<Localized>,
    pub mass: Option<Number>,
    pub volume: Option<Number>,
    pub capacity: Option<Number>,
    #[serde(rename = "portionSize")]
    pub portion_size: Option<Number>,
    #[serde(rename = "raceID")]
    pub race_id: Option<i64>,
    #[serde(rename = "basePrice")]
    pub base_price: Option<Number>,
    pub published: Option<bool>,
    #[serde(rename = "marketGroupID")]
    pub market_group_id: Option<i64>,
    #[serde(rename = "iconID")]
    pub icon_id: Option<i64>,
    #[serde(rename = "soundID")]
    pub sound_id: Option<i64>,
    #[serde(rename = "graphicID")]
    pub graphic_id: Option<i64>,
    #[serde(rename = "metaGroupID")]
    pub meta_group_id: Option<i64>,
    #[serde(rename = "variationParentTypeID")]
    pub variation_parent_type_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupRecord {
    #[serde(rename = "_key")]
    pub group_id: i64,
    #[serde(rename = "categoryID")]
    pub category_id: i64,
    pub name: Option<Localized>,
    #[serde(rename = "iconID")]
    pub icon_id: Option<i64>,
    #[serde(rename = "useBasePrice")]
    pub use_base_price: Option<bool>,
    pub anchored: Option<bool>,
    pub anchorable: Option<bool>,
    #[serde(rename = "fittableNonSingleton")]
    pub fittable_non_singleton: Option<bool>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    #[serde(rename = "_key")]
    pub category_id: i64,
    pub name: Option<Localized>,
    #[serde(rename = "iconID")]
    pub icon_id: Option<i64>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetaGroupRecord {
    #[serde(rename = "_key")]
    pub meta_group_id: i64,
    pub name: Option<Localized>,
    pub description: Option<Localized>,
    #[serde(rename = "iconID")]
    pub icon_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlueprintRecord {
    #[serde(rename = "_key")]
    pub key: i64,
    #[serde(rename = "blueprintTypeID")]
    pub blueprint_type_id: Option<i64>,
    #[serde(rename = "maxProductionLimit")]
    pub max_production_limit: Option<i64>,
    /// `(kind, activity)` pairs in the order the export lists them
    #[serde(default, deserialize_with = "activities_in_order")]
    pub activities: Vec<(String, Activity)>,
}

fn activities_in_order<'de, D>(deserializer: D) -> Result<Vec<(String, Activity)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ActivitiesVisitor;

    impl<'de> Visitor<'de> for ActivitiesVisitor {
        type Value = Vec<(String, Activity)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of activity kind to activity")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut activities = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, Activity>()? {
                activities.push(entry);
            }
            Ok(activities)
        }
    }

    deserializer.deserialize_map(ActivitiesVisitor)
}

impl BlueprintRecord {
    pub fn type_id(&self) -> i64 {
        self.blueprint_type_id.unwrap_or(self.key)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Activity {
    pub time: Option<i64>,
    #[serde(default)]
    pub materials: Vec<ActivityMaterial>,
    #[serde(default)]
    pub products: Vec<ActivityProduct>,
    #[serde(default)]
    pub skills: Vec<ActivitySkill>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityMaterial {
    #[serde(rename = "typeID")]
    pub type_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivityProduct {
    #[serde(rename = "typeID")]
    pub type_id: i64,
    pub quantity: i64,
    pub probability: Option<Number>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivitySkill {
    #[serde(rename = "typeID")]
    pub type_id: i64,
    pub level: i64,
}

/// Any record that only contributes an identifier and a display name
/// (regions, constellations, corporations, factions, NPC characters)
#[derive(Debug, Clone, Deserialize)]
pub struct NamedRecord {
    #[serde(rename = "_key")]
    pub item_id: i64,
    pub name: Option<Localized>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolarSystemRecord {
    #[serde(rename = "_key")]
    pub solar_system_id: i64,
    pub name: Option<Localized>,
    #[serde(rename = "regionID")]
    pub region_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlanetRecord {
    #[serde(rename = "_key")]
    pub planet_id: i64,
    #[serde(rename = "solarSystemID")]
    pub solar_system_id: Option<i64>,
    #[serde(rename = "orbitID")]
    pub orbit_id: Option<i64>,
    #[serde(rename = "celestialIndex", default)]
    pub celestial_index: u32,
    #[serde(rename = "typeID")]
    pub type_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoonRecord {
    #[serde(rename = "_key")]
    pub moon_id: i64,
    #[serde(rename = "solarSystemID")]
    pub solar_system_id: Option<i64>,
    #[serde(rename = "orbitID")]
    pub orbit_id: Option<i64>,
    #[serde(rename = "orbitIndex", default = "first_orbit")]
    pub orbit_index: u32,
    #[serde(rename = "typeID")]
    pub type_id: Option<i64>,
}

fn first_orbit() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct StarRecord {
    #[serde(rename = "_key")]
    pub star_id: i64,
    #[serde(rename = "solarSystemID")]
    pub solar_system_id: Option<i64>,
    #[serde(rename = "typeID")]
    pub type_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationRecord {
    #[serde(rename = "_key")]
    pub station_id: i64,
    #[serde(rename = "solarSystemID")]
    pub solar_system_id: Option<i64>,
    #[serde(rename = "typeID")]
    pub type_id: Option<i64>,
    #[serde(rename = "ownerID")]
    pub owner_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localized_accepts_plain_and_keyed_text() {
        let plain: Localized = serde_json::from_str(r#""Tritanium""#).unwrap();
        assert_eq!(plain.get("de"), Some("Tritanium"));

        let keyed: Localized = serde_json::from_str(r#"{"en": "Rifter", "de": "Rifter DE"}"#).unwrap();
        assert_eq!(keyed.get("en"), Some("Rifter"));
        assert_eq!(keyed.get("de"), Some("Rifter DE"));
        assert_eq!(keyed.get("fr"), None);
    }

    #[test]
    fn type_record_requires_group() {
        let err = serde_json::from_str::<TypeRecord>(r#"{"_key": 34}"#);
        assert!(err.is_err());

        let ok: TypeRecord = serde_json::from_str(r#"{"_key": 34, "groupID": 18, "extra": [1, 2]}"#).unwrap();
        assert_eq!(ok.type_id, 34);
        assert_eq!(ok.meta_group_id, None);
    }

    #[test]
    fn blueprint_falls_back_to_key() {
        let bp: BlueprintRecord = serde_json::from_str(r#"{"_key": 681}"#).unwrap();
        assert_eq!(bp.type_id(), 681);
        assert!(bp.activities.is_empty());

        let bp: BlueprintRecord =
            serde_json::from_str(r#"{"_key": 1, "blueprintTypeID": 681}"#).unwrap();
        assert_eq!(bp.type_id(), 681);
    }

    #[test]
    fn moon_orbit_index_defaults_to_one() {
        let moon: MoonRecord = serde_json::from_str(r#"{"_key": 40000004}"#).unwrap();
        assert_eq!(moon.orbit_index, 1);
    }
}
