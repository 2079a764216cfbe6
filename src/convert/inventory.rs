//! invTypes, invGroups and invCategories

use crate::models::{localized, CategoryRecord, GroupRecord, TypeRecord};
use crate::table::{Cell, Table};

use super::ConvertOptions;

pub const INV_TYPES_COLUMNS: &[&str] = &[
    "typeID",
    "groupID",
    "typeName",
    "description",
    "mass",
    "volume",
    "capacity",
    "portionSize",
    "raceID",
    "basePrice",
    "published",
    "marketGroupID",
    "iconID",
    "soundID",
    "graphicID",
];

pub const INV_GROUPS_COLUMNS: &[&str] = &[
    "groupID",
    "categoryID",
    "groupName",
    "iconID",
    "useBasePrice",
    "anchored",
    "anchorable",
    "fittableNonSingleton",
    "published",
];

pub const INV_CATEGORIES_COLUMNS: &[&str] = &["categoryID", "categoryName", "iconID", "published"];

/// One row per type, in input order
pub fn inv_types(types: &[TypeRecord], opts: &ConvertOptions) -> Table {
    let lang = opts.language.as_str();
    let mut table = Table::new("invTypes", INV_TYPES_COLUMNS);

    for t in types {
        table.push(vec![
            Cell::from(t.type_id),
            Cell::from(t.group_id),
            Cell::from(localized(&t.name, lang)),
            Cell::from(localized(&t.description, lang)),
            Cell::from(t.mass.as_ref()),
            Cell::from(t.volume.as_ref()),
            Cell::from(t.capacity.as_ref()),
            Cell::from(t.portion_size.as_ref()),
            Cell::from(t.race_id),
            Cell::from(t.base_price.as_ref()),
            Cell::from(t.published),
            Cell::from(t.market_group_id),
            Cell::from(t.icon_id),
            Cell::from(t.sound_id),
            Cell::from(t.graphic_id),
        ]);
    }

    table
}

pub fn inv_groups(groups: &[GroupRecord], opts: &ConvertOptions) -> Table {
    let lang = opts.language.as_str();
    let mut table = Table::new("invGroups", INV_GROUPS_COLUMNS);

    for g in groups {
        table.push(vec![
            Cell::from(g.group_id),
            Cell::from(g.category_id),
            Cell::from(localized(&g.name, lang)),
            Cell::from(g.icon_id),
            Cell::from(g.use_base_price),
            Cell::from(g.anchored),
            Cell::from(g.anchorable),
            Cell::from(g.fittable_non_singleton),
            Cell::from(g.published),
        ]);
    }

    table
}

pub fn inv_categories(categories: &[CategoryRecord], opts: &ConvertOptions) -> Table {
    let lang = opts.language.as_str();
    let mut table = Table::new("invCategories", INV_CATEGORIES_COLUMNS);

    for c in categories {
        table.push(vec![
            Cell::from(c.category_id),
            Cell::from(localized(&c.name, lang)),
            Cell::from(c.icon_id),
            Cell::from(c.published),
        ]);
    }

    table
}
