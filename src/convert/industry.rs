//! Blueprint expansions: industryActivity and its related tables
//!
//! Activities are visited per blueprint in the order the export lists them.
//! Kinds without a legacy code are dropped.

use tracing::debug;

use crate::models::{Activity, BlueprintRecord};
use crate::table::{Cell, Table};

pub const INDUSTRY_ACTIVITY_COLUMNS: &[&str] = &["typeID", "activityID", "time"];
pub const INDUSTRY_ACTIVITY_MATERIALS_COLUMNS: &[&str] =
    &["typeID", "activityID", "materialTypeID", "quantity"];
pub const INDUSTRY_ACTIVITY_PRODUCTS_COLUMNS: &[&str] =
    &["typeID", "activityID", "productTypeID", "quantity"];
pub const INDUSTRY_ACTIVITY_PROBABILITIES_COLUMNS: &[&str] =
    &["typeID", "activityID", "productTypeID", "probability"];
pub const INDUSTRY_ACTIVITY_SKILLS_COLUMNS: &[&str] = &["typeID", "activityID", "skillID", "level"];
pub const INDUSTRY_BLUEPRINTS_COLUMNS: &[&str] = &["typeID", "maxProductionLimit"];

/// Legacy numeric code for an activity kind
pub fn activity_id(kind: &str) -> Option<i64> {
    match kind {
        "manufacturing" => Some(1),
        "research_time" => Some(3),
        "research_material" => Some(4),
        "copying" => Some(5),
        "invention" => Some(8),
        "reaction" => Some(11),
        _ => None,
    }
}

/// Walk every (blueprint, activity) pair that has a legacy code
fn for_each_activity<F>(blueprints: &[BlueprintRecord], mut f: F)
where
    F: FnMut(i64, i64, &Activity),
{
    for bp in blueprints {
        let type_id = bp.type_id();
        for (kind, activity) in &bp.activities {
            match activity_id(kind) {
                Some(activity_id) => f(type_id, activity_id, activity),
                None => debug!("Blueprint {} has unmapped activity '{}'", type_id, kind),
            }
        }
    }
}

/// One row per activity that declares a duration
pub fn industry_activity(blueprints: &[BlueprintRecord]) -> Table {
    let mut table = Table::new("industryActivity", INDUSTRY_ACTIVITY_COLUMNS);
    for_each_activity(blueprints, |type_id, activity_id, activity| {
        if let Some(time) = activity.time {
            table.push(vec![Cell::from(type_id), Cell::from(activity_id), Cell::from(time)]);
        }
    });
    table
}

pub fn industry_activity_materials(blueprints: &[BlueprintRecord]) -> Table {
    let mut table = Table::new("industryActivityMaterials", INDUSTRY_ACTIVITY_MATERIALS_COLUMNS);
    for_each_activity(blueprints, |type_id, activity_id, activity| {
        for m in &activity.materials {
            table.push(vec![
                Cell::from(type_id),
                Cell::from(activity_id),
                Cell::from(m.type_id),
                Cell::from(m.quantity),
            ]);
        }
    });
    table
}

pub fn industry_activity_products(blueprints: &[BlueprintRecord]) -> Table {
    let mut table = Table::new("industryActivityProducts", INDUSTRY_ACTIVITY_PRODUCTS_COLUMNS);
    for_each_activity(blueprints, |type_id, activity_id, activity| {
        for p in &activity.products {
            table.push(vec![
                Cell::from(type_id),
                Cell::from(activity_id),
                Cell::from(p.type_id),
                Cell::from(p.quantity),
            ]);
        }
    });
    table
}

/// Invention and similar activities give each product a success chance
pub fn industry_activity_probabilities(blueprints: &[BlueprintRecord]) -> Table {
    let mut table = Table::new(
        "industryActivityProbabilities",
        INDUSTRY_ACTIVITY_PROBABILITIES_COLUMNS,
    );
    for_each_activity(blueprints, |type_id, activity_id, activity| {
        for p in &activity.products {
            if let Some(probability) = &p.probability {
                table.push(vec![
                    Cell::from(type_id),
                    Cell::from(activity_id),
                    Cell::from(p.type_id),
                    Cell::from(probability),
                ]);
            }
        }
    });
    table
}

pub fn industry_activity_skills(blueprints: &[BlueprintRecord]) -> Table {
    let mut table = Table::new("industryActivitySkills", INDUSTRY_ACTIVITY_SKILLS_COLUMNS);
    for_each_activity(blueprints, |type_id, activity_id, activity| {
        for s in &activity.skills {
            table.push(vec![
                Cell::from(type_id),
                Cell::from(activity_id),
                Cell::from(s.type_id),
                Cell::from(s.level),
            ]);
        }
    });
    table
}

pub fn industry_blueprints(blueprints: &[BlueprintRecord]) -> Table {
    let mut table = Table::new("industryBlueprints", INDUSTRY_BLUEPRINTS_COLUMNS);
    for bp in blueprints {
        table.push(vec![Cell::from(bp.type_id()), Cell::from(bp.max_production_limit)]);
    }
    table
}
