//! invMetaGroups and invMetaTypes

use std::collections::HashSet;

use tracing::warn;

use crate::models::{localized, MetaGroupRecord, TypeRecord};
use crate::table::{Cell, Table};

use super::ConvertOptions;

pub const INV_META_GROUPS_COLUMNS: &[&str] = &["metaGroupID", "metaGroupName", "description", "iconID"];

pub const INV_META_TYPES_COLUMNS: &[&str] = &["typeID", "parentTypeID", "metaGroupID"];

pub fn inv_meta_groups(meta_groups: &[MetaGroupRecord], opts: &ConvertOptions) -> Table {
    let lang = opts.language.as_str();
    let mut table = Table::new("invMetaGroups", INV_META_GROUPS_COLUMNS);

    for m in meta_groups {
        table.push(vec![
            Cell::from(m.meta_group_id),
            Cell::from(localized(&m.name, lang)),
            Cell::from(localized(&m.description, lang)),
            Cell::from(m.icon_id),
        ]);
    }

    table
}

/// One row per type that names a meta-group.
///
/// `parentTypeID` is the type's explicit variation parent. Base types carry
/// none and get an empty parent. A meta-group missing from `meta_groups` is
/// an unresolved reference: the type is skipped with a warning.
pub fn inv_meta_types(types: &[TypeRecord], meta_groups: &[MetaGroupRecord]) -> Table {
    let known: HashSet<i64> = meta_groups.iter().map(|m| m.meta_group_id).collect();
    let mut table = Table::new("invMetaTypes", INV_META_TYPES_COLUMNS);

    for t in types {
        let Some(meta_group_id) = t.meta_group_id else {
            continue;
        };
        if !known.contains(&meta_group_id) {
            warn!(
                "Type {} references unknown meta group {}, skipping",
                t.type_id, meta_group_id
            );
            continue;
        }
        table.push(vec![
            Cell::from(t.type_id),
            Cell::from(t.variation_parent_type_id),
            Cell::from(meta_group_id),
        ]);
    }

    table
}
