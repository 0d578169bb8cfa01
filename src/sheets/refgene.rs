//! Sheet with the combined reference gene groups and the variants hitting them.

use serde_json::json;
use strum::IntoEnumIterator;

use crate::{
    process::Table,
    refgene::RefgeneGroup,
    sheets::{
        cell_list, header_row, last_column_letter, sheet_config, write_table,
        config::{CellRef, ConfigKey, ConfigValue, SheetConfig},
        THIN_BORDER,
    },
};

/// Header fill of the columns linked from the processed variants.
const LINKED_FILL: &str = "b686da";

/// Header fill of a reference gene group.
fn group_fill(group: RefgeneGroup) -> &'static str {
    match group {
        RefgeneGroup::Cosmic => "fcba03",
        RefgeneGroup::Paed => "db5a14",
        RefgeneGroup::Sarc => "2c8500",
        RefgeneGroup::Neuro => "008581",
        RefgeneGroup::Ovarian => "024dc7",
        RefgeneGroup::Haem => "ad2323",
    }
}

/// Header fill of `column`, `None` for the gene column.
fn header_fill(index: usize, column: &str) -> Option<&'static str> {
    if index == 0 {
        return None;
    }
    RefgeneGroup::iter()
        .find(|group| column.starts_with(&format!("{}_", group.label())))
        .map(group_fill)
        .or(Some(LINKED_FILL))
}

/// Layout of the combined reference table, entirely data dependent.
pub fn config(table: &Table) -> Result<SheetConfig, anyhow::Error> {
    let last_column = last_column_letter(table)?;

    let mut colours = Vec::new();
    for (index, column) in table.columns.iter().enumerate() {
        if let Some(fill) = header_fill(index, column) {
            colours.push(json!([CellRef::new(index, 1)?, fill]));
        }
    }
    let borders = ConfigValue::Nested(
        [(
            "cell_rows".to_owned(),
            ConfigValue::List(vec![json!([format!("A1:{}1", last_column), THIN_BORDER])]),
        )]
        .into_iter()
        .collect(),
    );

    Ok(sheet_config([
        (ConfigKey::CellsToWrite, ConfigValue::Cells(write_table(table, 1)?)),
        (ConfigKey::CellsToColour, ConfigValue::List(colours)),
        (ConfigKey::ToBold, cell_list(header_row(table)?)),
        (
            ConfigKey::AutoFilter,
            ConfigValue::Scalar(json!(format!("A:{}", last_column))),
        ),
        (ConfigKey::Borders, borders),
    ]))
}
