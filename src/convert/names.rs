//! invUniqueNames, invNames and invItems
//!
//! Celestials carry no names of their own in the export; planets, moons and
//! stars are named after their solar system the way the legacy dump did
//! ("Jita IV", "Jita IV - Moon 4", "Jita - Star").

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::models::{
    localized, MoonRecord, NamedRecord, PlanetRecord, SolarSystemRecord, StarRecord,
    StationRecord,
};
use crate::table::{Cell, Table};

use super::ConvertOptions;

pub const INV_UNIQUE_NAMES_COLUMNS: &[&str] = &["itemID", "itemName", "groupID"];
pub const INV_NAMES_COLUMNS: &[&str] = &["itemID", "itemName"];
pub const INV_ITEMS_COLUMNS: &[&str] =
    &["itemID", "typeID", "ownerID", "locationID", "flagID", "quantity"];

/// Group of every NPC character in invUniqueNames
const CHARACTER_GROUP_ID: i64 = 1;
/// Type shared by all solar systems
const SOLAR_SYSTEM_TYPE_ID: i64 = 5;
/// Owner of systems and celestials
const SYSTEM_OWNER_ID: i64 = 1;
/// Owner of stations whose record names none
const UNOWNED_STATION_OWNER_ID: i64 = 0;

const ROMAN: [&str; 21] = [
    "", "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV",
    "XV", "XVI", "XVII", "XVIII", "XIX", "XX",
];

fn roman(index: u32) -> String {
    ROMAN
        .get(index as usize)
        .map_or_else(|| index.to_string(), |r| r.to_string())
}

/// Every record stream feeding invNames, in resolution order: when an
/// itemID appears more than once, the later stream (then the later line)
/// supplies the name.
#[derive(Debug, Default)]
pub struct NameSources {
    pub solar_systems: Vec<SolarSystemRecord>,
    pub planets: Vec<PlanetRecord>,
    pub moons: Vec<MoonRecord>,
    pub stars: Vec<StarRecord>,
    pub regions: Vec<NamedRecord>,
    pub constellations: Vec<NamedRecord>,
    pub corporations: Vec<NamedRecord>,
    pub factions: Vec<NamedRecord>,
    pub characters: Vec<NamedRecord>,
}

#[derive(Debug, Default)]
pub struct LocationSources {
    pub solar_systems: Vec<SolarSystemRecord>,
    pub stars: Vec<StarRecord>,
    pub planets: Vec<PlanetRecord>,
    pub moons: Vec<MoonRecord>,
    pub stations: Vec<StationRecord>,
}

pub fn inv_unique_names(characters: &[NamedRecord], opts: &ConvertOptions) -> Table {
    let lang = opts.language.as_str();
    let mut table = Table::new("invUniqueNames", INV_UNIQUE_NAMES_COLUMNS);

    for c in characters {
        table.push(vec![
            Cell::from(c.item_id),
            Cell::from(localized(&c.name, lang)),
            Cell::from(CHARACTER_GROUP_ID),
        ]);
    }

    table
}

/// Collects names keyed by itemID; later inserts replace earlier ones
struct NameIndex {
    names: BTreeMap<i64, Cell>,
}

impl NameIndex {
    fn insert(&mut self, item_id: i64, name: Cell) {
        if let Some(previous) = self.names.insert(item_id, name) {
            debug!(
                "Item {} named twice, replacing '{}'",
                item_id,
                previous.render()
            );
        }
    }
}

/// Merged names across all sources, one row per itemID, ascending
pub fn inv_names(sources: &NameSources, opts: &ConvertOptions) -> Table {
    let lang = opts.language.as_str();
    let mut index = NameIndex {
        names: BTreeMap::new(),
    };

    let mut system_names: HashMap<i64, &str> = HashMap::new();
    for s in &sources.solar_systems {
        let name = localized(&s.name, lang);
        system_names.insert(s.solar_system_id, name.unwrap_or_default());
        index.insert(s.solar_system_id, Cell::from(name));
    }

    let mut planet_indices: HashMap<i64, u32> = HashMap::new();
    for p in &sources.planets {
        planet_indices.insert(p.planet_id, p.celestial_index);
        let system_id = p
            .solar_system_id
            .or_else(|| p.orbit_id.filter(|id| system_names.contains_key(id)));
        let Some(system) = system_id.and_then(|id| system_names.get(&id)) else {
            warn!("Planet {} has no known solar system, skipping name", p.planet_id);
            continue;
        };
        index.insert(
            p.planet_id,
            Cell::from(format!("{} {}", system, roman(p.celestial_index))),
        );
    }

    for m in &sources.moons {
        let Some(system) = m.solar_system_id.and_then(|id| system_names.get(&id)) else {
            warn!("Moon {} has no known solar system, skipping name", m.moon_id);
            continue;
        };
        let name = match m.orbit_id.and_then(|id| planet_indices.get(&id)) {
            Some(&celestial) => format!("{} {} - Moon {}", system, roman(celestial), m.orbit_index),
            None => format!("{} - Moon {}", system, m.orbit_index),
        };
        index.insert(m.moon_id, Cell::from(name));
    }

    for s in &sources.stars {
        let Some(system) = s.solar_system_id.and_then(|id| system_names.get(&id)) else {
            warn!("Star {} has no known solar system, skipping name", s.star_id);
            continue;
        };
        index.insert(s.star_id, Cell::from(format!("{} - Star", system)));
    }

    for named in [
        &sources.regions,
        &sources.constellations,
        &sources.corporations,
        &sources.factions,
        &sources.characters,
    ] {
        for record in named {
            index.insert(record.item_id, Cell::from(localized(&record.name, lang)));
        }
    }

    let mut table = Table::new("invNames", INV_NAMES_COLUMNS);
    for (item_id, name) in index.names {
        table.push(vec![Cell::from(item_id), name]);
    }
    table
}

/// Collects item rows keyed by itemID; later inserts replace earlier ones
struct ItemIndex {
    rows: BTreeMap<i64, Vec<Cell>>,
}

impl ItemIndex {
    fn insert(&mut self, item_id: i64, type_id: i64, owner_id: i64, location_id: i64) {
        let row = vec![
            Cell::from(item_id),
            Cell::from(type_id),
            Cell::from(owner_id),
            Cell::from(location_id),
            Cell::from(0i64),
            Cell::from(1i64),
        ];
        if self.rows.insert(item_id, row).is_some() {
            debug!("Item {} located twice, keeping the later record", item_id);
        }
    }
}

/// Physical entities with a location, one row per itemID, ascending.
/// Systems sit in their region, everything else in its solar system;
/// anything without a location is left out. Sources are merged in the
/// order systems, stars, planets, moons, stations, and the later record
/// wins for a repeated itemID.
pub fn inv_items(sources: &LocationSources) -> Table {
    let mut index = ItemIndex {
        rows: BTreeMap::new(),
    };

    for s in &sources.solar_systems {
        match s.region_id {
            Some(region) => index.insert(
                s.solar_system_id,
                SOLAR_SYSTEM_TYPE_ID,
                SYSTEM_OWNER_ID,
                region,
            ),
            None => debug!("Solar system {} has no region", s.solar_system_id),
        }
    }

    let celestials = sources
        .stars
        .iter()
        .map(|s| (s.star_id, s.type_id, s.solar_system_id))
        .chain(
            sources
                .planets
                .iter()
                .map(|p| (p.planet_id, p.type_id, p.solar_system_id)),
        )
        .chain(
            sources
                .moons
                .iter()
                .map(|m| (m.moon_id, m.type_id, m.solar_system_id)),
        );
    for (item_id, type_id, system) in celestials {
        match system {
            Some(system) => index.insert(
                item_id,
                type_id.unwrap_or_default(),
                SYSTEM_OWNER_ID,
                system,
            ),
            None => debug!("Celestial {} has no solar system", item_id),
        }
    }

    for st in &sources.stations {
        match st.solar_system_id {
            Some(system) => index.insert(
                st.station_id,
                st.type_id.unwrap_or_default(),
                st.owner_id.unwrap_or(UNOWNED_STATION_OWNER_ID),
                system,
            ),
            None => debug!("Station {} has no solar system", st.station_id),
        }
    }

    let mut table = Table::new("invItems", INV_ITEMS_COLUMNS);
    for row in index.rows.into_values() {
        table.push(row);
    }
    table
}
