//! Converter registry and run orchestration

use std::fmt;

use regex::Regex;
use tracing::{error, info, Level};

use crate::convert::names::{LocationSources, NameSources};
use crate::convert::{industry, inventory, meta, names, reference, ConvertOptions};
use crate::error::{ConvertError, Result};
use crate::models::{
    BlueprintRecord, CategoryRecord, GroupRecord, MetaGroupRecord, NamedRecord, TypeRecord,
};
use crate::sink::TableSink;
use crate::source::SdeSource;
use crate::table::Table;

const TYPES: &str = "types.jsonl";
const GROUPS: &str = "groups.jsonl";
const CATEGORIES: &str = "categories.jsonl";
const META_GROUPS: &str = "metaGroups.jsonl";
const BLUEPRINTS: &str = "blueprints.jsonl";
const NPC_CHARACTERS: &str = "npcCharacters.jsonl";
const NPC_CORPORATIONS: &str = "npcCorporations.jsonl";
const NPC_STATIONS: &str = "npcStations.jsonl";
const FACTIONS: &str = "factions.jsonl";
const SOLAR_SYSTEMS: &str = "mapSolarSystems.jsonl";
const PLANETS: &str = "mapPlanets.jsonl";
const MOONS: &str = "mapMoons.jsonl";
const STARS: &str = "mapStars.jsonl";
const REGIONS: &str = "mapRegions.jsonl";
const CONSTELLATIONS: &str = "mapConstellations.jsonl";

type BuildFn = fn(&SdeSource, &ConvertOptions) -> Result<Table>;

/// One named output table and how to build it
pub struct Converter {
    pub name: &'static str,
    /// Export files the table is built from; all are required
    pub inputs: &'static [&'static str],
    build: BuildFn,
}

impl Converter {
    const fn new(name: &'static str, inputs: &'static [&'static str], build: BuildFn) -> Self {
        Self { name, inputs, build }
    }

    /// Check inputs are present, then load them and build the table
    pub fn build(&self, source: &SdeSource, opts: &ConvertOptions) -> Result<Table> {
        if let Some(missing) = self.inputs.iter().find(|f| !source.contains(f)) {
            return Err(ConvertError::MissingInputFile {
                file: missing.to_string(),
                dir: source.root().to_path_buf(),
            });
        }
        (self.build)(source, opts)
    }
}

fn blueprints(source: &SdeSource) -> Result<Vec<BlueprintRecord>> {
    source.read(BLUEPRINTS)
}

fn name_sources(source: &SdeSource) -> Result<NameSources> {
    Ok(NameSources {
        solar_systems: source.read(SOLAR_SYSTEMS)?,
        planets: source.read(PLANETS)?,
        moons: source.read(MOONS)?,
        stars: source.read(STARS)?,
        regions: source.read(REGIONS)?,
        constellations: source.read(CONSTELLATIONS)?,
        corporations: source.read(NPC_CORPORATIONS)?,
        factions: source.read(FACTIONS)?,
        characters: source.read(NPC_CHARACTERS)?,
    })
}

fn location_sources(source: &SdeSource) -> Result<LocationSources> {
    Ok(LocationSources {
        solar_systems: source.read(SOLAR_SYSTEMS)?,
        stars: source.read(STARS)?,
        planets: source.read(PLANETS)?,
        moons: source.read(MOONS)?,
        stations: source.read(NPC_STATIONS)?,
    })
}

/// Table name to converter mapping, in legacy dump order
pub struct Registry {
    converters: Vec<Converter>,
}

impl Registry {
    pub fn standard() -> Self {
        let converters = vec![
            Converter::new("invTypes", &[TYPES], |src, opts| {
                let types: Vec<TypeRecord> = src.read(TYPES)?;
                Ok(inventory::inv_types(&types, opts))
            }),
            Converter::new("invGroups", &[GROUPS], |src, opts| {
                let groups: Vec<GroupRecord> = src.read(GROUPS)?;
                Ok(inventory::inv_groups(&groups, opts))
            }),
            Converter::new("invCategories", &[CATEGORIES], |src, opts| {
                let categories: Vec<CategoryRecord> = src.read(CATEGORIES)?;
                Ok(inventory::inv_categories(&categories, opts))
            }),
            Converter::new("invMetaGroups", &[META_GROUPS], |src, opts| {
                let meta_groups: Vec<MetaGroupRecord> = src.read(META_GROUPS)?;
                Ok(meta::inv_meta_groups(&meta_groups, opts))
            }),
            Converter::new("invMetaTypes", &[TYPES, META_GROUPS], |src, _| {
                let types: Vec<TypeRecord> = src.read(TYPES)?;
                let meta_groups: Vec<MetaGroupRecord> = src.read(META_GROUPS)?;
                Ok(meta::inv_meta_types(&types, &meta_groups))
            }),
            Converter::new("industryActivity", &[BLUEPRINTS], |src, _| {
                Ok(industry::industry_activity(&blueprints(src)?))
            }),
            Converter::new("industryActivityMaterials", &[BLUEPRINTS], |src, _| {
                Ok(industry::industry_activity_materials(&blueprints(src)?))
            }),
            Converter::new("industryActivityProducts", &[BLUEPRINTS], |src, _| {
                Ok(industry::industry_activity_products(&blueprints(src)?))
            }),
            Converter::new("industryActivityProbabilities", &[BLUEPRINTS], |src, _| {
                Ok(industry::industry_activity_probabilities(&blueprints(src)?))
            }),
            Converter::new("industryActivitySkills", &[BLUEPRINTS], |src, _| {
                Ok(industry::industry_activity_skills(&blueprints(src)?))
            }),
            Converter::new("industryBlueprints", &[BLUEPRINTS], |src, _| {
                Ok(industry::industry_blueprints(&blueprints(src)?))
            }),
            Converter::new("ramActivities", &[], |_, _| Ok(reference::ram_activities())),
            Converter::new("invFlags", &[], |_, _| Ok(reference::inv_flags())),
            Converter::new("invUniqueNames", &[NPC_CHARACTERS], |src, opts| {
                let characters: Vec<NamedRecord> = src.read(NPC_CHARACTERS)?;
                Ok(names::inv_unique_names(&characters, opts))
            }),
            Converter::new(
                "invNames",
                &[
                    SOLAR_SYSTEMS,
                    PLANETS,
                    MOONS,
                    STARS,
                    REGIONS,
                    CONSTELLATIONS,
                    NPC_CORPORATIONS,
                    FACTIONS,
                    NPC_CHARACTERS,
                ],
                |src, opts| Ok(names::inv_names(&name_sources(src)?, opts)),
            ),
            Converter::new(
                "invItems",
                &[SOLAR_SYSTEMS, STARS, PLANETS, MOONS, NPC_STATIONS],
                |src, _| Ok(names::inv_items(&location_sources(src)?)),
            ),
        ];
        Self { converters }
    }

    pub fn converters(&self) -> &[Converter] {
        &self.converters
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.converters.iter().map(|c| c.name).collect()
    }

    pub fn get(&self, name: &str) -> Result<&Converter> {
        self.converters
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConvertError::UnknownConverter {
                name: name.to_string(),
                valid: self.names().iter().map(|n| n.to_string()).collect(),
            })
    }

    /// Resolve every requested name up front, so an unknown name fails the
    /// whole request before anything runs. Duplicates are dropped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<&Converter>> {
        let mut selected: Vec<&Converter> = Vec::new();
        for name in names {
            let converter = self.get(name.as_ref())?;
            if !selected.iter().any(|c| c.name == converter.name) {
                selected.push(converter);
            }
        }
        Ok(selected)
    }

    /// Converters whose table name matches `pattern`, in registry order
    pub fn matching(&self, pattern: &Regex) -> Vec<&Converter> {
        self.converters
            .iter()
            .filter(|c| pattern.is_match(c.name))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub name: &'static str,
    pub rows: usize,
}

#[derive(Debug)]
pub struct TableFailure {
    pub name: &'static str,
    pub error: ConvertError,
}

/// Outcome of a multi-table run
#[derive(Debug, Default)]
pub struct Report {
    pub written: Vec<TableSummary>,
    pub failed: Vec<TableFailure>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Failures stay visible under `--quiet`
    pub fn log_level(&self) -> Level {
        if self.is_success() {
            Level::INFO
        } else {
            Level::WARN
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows: usize = self.written.iter().map(|t| t.rows).sum();
        write!(
            f,
            "Converted {} tables ({} rows). Failed: {}",
            self.written.len(),
            rows,
            self.failed.len()
        )?;
        for failure in &self.failed {
            write!(f, "\n  {}: {}", failure.name, failure.error)?;
        }
        Ok(())
    }
}

/// Build and write one table
pub fn convert_one(
    registry: &Registry,
    source: &SdeSource,
    sink: &mut dyn TableSink,
    name: &str,
    opts: &ConvertOptions,
) -> Result<TableSummary> {
    run_converter(registry.get(name)?, source, sink, opts)
}

/// Run the requested tables, or every registered table when `only` is
/// `None`. Unknown names fail before any output is written; per-table
/// failures are collected in the report.
pub fn convert<S: AsRef<str>>(
    registry: &Registry,
    source: &SdeSource,
    sink: &mut dyn TableSink,
    only: Option<&[S]>,
    opts: &ConvertOptions,
) -> Result<Report> {
    let selected = match only {
        Some(names) => registry.select(names)?,
        None => registry.converters().iter().collect(),
    };
    Ok(run_all(&selected, source, sink, opts))
}

pub fn convert_all(
    registry: &Registry,
    source: &SdeSource,
    sink: &mut dyn TableSink,
    opts: &ConvertOptions,
) -> Report {
    let selected: Vec<&Converter> = registry.converters().iter().collect();
    run_all(&selected, source, sink, opts)
}

/// Run an already selected list of converters
pub fn run_all(
    converters: &[&Converter],
    source: &SdeSource,
    sink: &mut dyn TableSink,
    opts: &ConvertOptions,
) -> Report {
    let mut report = Report::default();
    for converter in converters {
        match run_converter(converter, source, sink, opts) {
            Ok(summary) => report.written.push(summary),
            Err(e) => {
                error!("{} failed: {}", converter.name, e);
                report.failed.push(TableFailure {
                    name: converter.name,
                    error: e,
                });
            }
        }
    }
    report
}

fn run_converter(
    converter: &Converter,
    source: &SdeSource,
    sink: &mut dyn TableSink,
    opts: &ConvertOptions,
) -> Result<TableSummary> {
    info!("Converting {}...", converter.name);
    let table = converter.build(source, opts)?;
    sink.write_table(&table)?;
    Ok(TableSummary {
        name: converter.name,
        rows: table.len(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::sink::CsvSink;
    use crate::source::tests::write_jsonl;
    use tempfile::tempdir;

    fn write_full_export(dir: &Path) {
        write_jsonl(dir, TYPES, &[
            r#"{"_key": 34, "groupID": 18, "name": {"en": "Tritanium"}, "mass": 0, "volume": 0.01, "portionSize": 1, "published": true}"#,
            r#"{"_key": 100, "groupID": 25, "name": {"en": "Widget"}, "metaGroupID": 1}"#,
            r#"{"_key": 101, "groupID": 25, "name": {"en": "Widget II"}, "metaGroupID": 2, "variationParentTypeID": 100}"#,
        ]);
        write_jsonl(dir, GROUPS, &[r#"{"_key": 18, "categoryID": 4, "name": {"en": "Mineral"}, "published": true}"#]);
        write_jsonl(dir, CATEGORIES, &[r#"{"_key": 4, "name": {"en": "Material"}, "published": true}"#]);
        write_jsonl(dir, META_GROUPS, &[
            r#"{"_key": 1, "name": {"en": "Tech I"}}"#,
            r#"{"_key": 2, "name": {"en": "Tech II"}}"#,
        ]);
        write_jsonl(dir, BLUEPRINTS, &[
            r#"{"_key": 100, "blueprintTypeID": 100, "activities": {"manufacturing": {"time": 600, "materials": [{"typeID": 34, "quantity": 10}], "products": [{"typeID": 100, "quantity": 1}]}}}"#,
        ]);
        write_jsonl(dir, SOLAR_SYSTEMS, &[r#"{"_key": 30000142, "name": {"en": "Jita"}, "regionID": 10000002}"#]);
        write_jsonl(dir, PLANETS, &[r#"{"_key": 40009081, "solarSystemID": 30000142, "celestialIndex": 4, "typeID": 13}"#]);
        write_jsonl(dir, MOONS, &[r#"{"_key": 40009087, "solarSystemID": 30000142, "orbitID": 40009081, "orbitIndex": 4, "typeID": 14}"#]);
        write_jsonl(dir, STARS, &[r#"{"_key": 40009076, "solarSystemID": 30000142, "typeID": 3802}"#]);
        write_jsonl(dir, REGIONS, &[r#"{"_key": 10000002, "name": {"en": "The Forge"}}"#]);
        write_jsonl(dir, CONSTELLATIONS, &[r#"{"_key": 20000020, "name": {"en": "Kimotoro"}}"#]);
        write_jsonl(dir, NPC_CORPORATIONS, &[r#"{"_key": 1000035, "name": {"en": "Caldari Navy"}}"#]);
        write_jsonl(dir, FACTIONS, &[r#"{"_key": 500001, "name": {"en": "Caldari State"}}"#]);
        write_jsonl(dir, NPC_CHARACTERS, &[r#"{"_key": 3019499, "name": {"en": "Some Agent"}}"#]);
        write_jsonl(dir, NPC_STATIONS, &[r#"{"_key": 60003760, "solarSystemID": 30000142, "typeID": 1529, "ownerID": 1000035}"#]);
    }

    fn read_csv(dir: &Path, table: &str) -> String {
        fs::read_to_string(dir.join(format!("{table}.csv"))).unwrap()
    }

    #[test]
    fn registry_names_are_unique() {
        let registry = Registry::standard();
        let names = registry.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
        assert!(names.contains(&"invTypes"));
        assert!(names.contains(&"invItems"));
    }

    #[test]
    fn unknown_name_fails_and_writes_nothing() {
        let input = tempdir().unwrap();
        write_full_export(input.path());
        let output = tempdir().unwrap();
        let out_dir = output.path().join("csv");

        let registry = Registry::standard();
        let source = SdeSource::open(input.path()).unwrap();
        let mut sink = CsvSink::new(&out_dir);
        let err = convert(
            &registry,
            &source,
            &mut sink,
            Some(&["invTypes", "invMarketHistory"][..]),
            &ConvertOptions::default(),
        )
        .unwrap_err();

        match err {
            ConvertError::UnknownConverter { name, valid } => {
                assert_eq!(name, "invMarketHistory");
                assert!(valid.iter().any(|v| v == "invTypes"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!out_dir.exists());

        let err = convert_one(&registry, &source, &mut sink, "nope", &ConvertOptions::default());
        assert!(matches!(err, Err(ConvertError::UnknownConverter { .. })));
        assert!(!out_dir.exists());
    }

    #[test]
    fn blueprint_tables_end_to_end() {
        let input = tempdir().unwrap();
        write_full_export(input.path());
        let output = tempdir().unwrap();

        let registry = Registry::standard();
        let source = SdeSource::open(input.path()).unwrap();
        let mut sink = CsvSink::new(output.path());
        let report = convert(
            &registry,
            &source,
            &mut sink,
            Some(&["industryActivity", "industryActivityMaterials", "industryActivityProducts"][..]),
            &ConvertOptions::default(),
        )
        .unwrap();
        assert!(report.is_success());

        assert_eq!(read_csv(output.path(), "industryActivity"), "typeID,activityID,time\r\n100,1,600\r\n");
        assert_eq!(
            read_csv(output.path(), "industryActivityMaterials"),
            "typeID,activityID,materialTypeID,quantity\r\n100,1,34,10\r\n"
        );
        assert_eq!(
            read_csv(output.path(), "industryActivityProducts"),
            "typeID,activityID,productTypeID,quantity\r\n100,1,100,1\r\n"
        );
    }

    #[test]
    fn type_without_meta_group_has_no_meta_type_row() {
        let input = tempdir().unwrap();
        write_full_export(input.path());
        let output = tempdir().unwrap();

        let registry = Registry::standard();
        let source = SdeSource::open(input.path()).unwrap();
        let mut sink = CsvSink::new(output.path());
        let report = convert(
            &registry,
            &source,
            &mut sink,
            Some(&["invTypes", "invMetaTypes"][..]),
            &ConvertOptions::default(),
        )
        .unwrap();
        assert!(report.is_success());

        let types = read_csv(output.path(), "invTypes");
        assert!(types.contains("\r\n34,18,Tritanium,,0,0.01,,1,,,1,,,,\r\n"));
        assert_eq!(
            read_csv(output.path(), "invMetaTypes"),
            "typeID,parentTypeID,metaGroupID\r\n100,,1\r\n101,100,2\r\n"
        );
    }

    #[test]
    fn convert_all_is_idempotent() {
        let input = tempdir().unwrap();
        write_full_export(input.path());
        let output = tempdir().unwrap();

        let registry = Registry::standard();
        let source = SdeSource::open(input.path()).unwrap();
        let mut sink = CsvSink::new(output.path());

        let first = convert_all(&registry, &source, &mut sink, &ConvertOptions::default());
        assert!(first.is_success(), "{first}");
        assert_eq!(first.log_level(), Level::INFO);
        assert_eq!(first.written.len(), registry.names().len());
        let snapshot: Vec<Vec<u8>> = registry
            .names()
            .iter()
            .map(|n| fs::read(output.path().join(format!("{n}.csv"))).unwrap())
            .collect();

        let second = convert_all(&registry, &source, &mut sink, &ConvertOptions::default());
        assert_eq!(first.written, second.written);
        for (name, before) in registry.names().iter().zip(snapshot) {
            let after = fs::read(output.path().join(format!("{name}.csv"))).unwrap();
            assert_eq!(before, after, "{name} changed between runs");
        }

        assert_eq!(
            read_csv(output.path(), "invNames"),
            "itemID,itemName\r\n500001,Caldari State\r\n1000035,Caldari Navy\r\n3019499,Some Agent\r\n\
             10000002,The Forge\r\n20000020,Kimotoro\r\n30000142,Jita\r\n40009076,Jita - Star\r\n\
             40009081,Jita IV\r\n40009087,Jita IV - Moon 4\r\n"
        );
    }

    #[test]
    fn bulk_run_reports_every_failure_and_keeps_going() {
        let input = tempdir().unwrap();
        write_jsonl(input.path(), TYPES, &[r#"{"_key": 34, "groupID": 18}"#]);
        write_jsonl(input.path(), GROUPS, &[r#"{"_key": 18, "categoryID": 4}"#, "{not json"]);
        let output = tempdir().unwrap();

        let registry = Registry::standard();
        let source = SdeSource::open(input.path()).unwrap();
        let mut sink = CsvSink::new(output.path());
        let report = convert_all(&registry, &source, &mut sink, &ConvertOptions::default());

        assert!(!report.is_success());
        assert_eq!(report.log_level(), Level::WARN);
        assert!(report.to_string().contains("\n  invGroups: "));
        let written: Vec<&str> = report.written.iter().map(|t| t.name).collect();
        assert_eq!(written, vec!["invTypes", "ramActivities", "invFlags"]);
        assert_eq!(report.failed.len(), registry.names().len() - 3);

        let groups = report.failed.iter().find(|f| f.name == "invGroups").unwrap();
        assert!(matches!(groups.error, ConvertError::MalformedRecord { line: 2, .. }));
        let meta = report.failed.iter().find(|f| f.name == "invMetaTypes").unwrap();
        assert!(matches!(
            meta.error,
            ConvertError::MissingInputFile { ref file, .. } if file == META_GROUPS
        ));

        assert!(output.path().join("invTypes.csv").exists());
        assert!(!output.path().join("invGroups.csv").exists());
        assert!(!output.path().join("invMetaTypes.csv").exists());
    }

    #[test]
    fn matching_selects_by_pattern() {
        let registry = Registry::standard();
        let pattern = Regex::new("^industryActivity").unwrap();
        let names: Vec<&str> = registry.matching(&pattern).iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "industryActivity",
                "industryActivityMaterials",
                "industryActivityProducts",
                "industryActivityProbabilities",
                "industryActivitySkills",
            ]
        );
    }

    #[test]
    fn select_drops_duplicates_and_keeps_request_order() {
        let registry = Registry::standard();
        let selected = registry.select(&["invFlags", "invTypes", "invFlags"]).unwrap();
        let names: Vec<&str> = selected.iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["invFlags", "invTypes"]);
    }
}
