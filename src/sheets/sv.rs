//! Fusion sheet.

use serde_json::json;

use crate::{
    common::column_letter,
    process::{fusion::PLACEHOLDERS, Table, VARIANT_CLASS},
    sheets::{
        cell_list, cell_range,
        config::{from_json, merge, ConfigKey, ConfigValue, SheetConfig},
        dropdown, fill, header_row, last_column_letter, sheet_config, with_value, write_table,
        ONCOGENICITY_OPTIONS, REFGENE_FILL, REVIEW_FILL, THIN_BORDER,
    },
};

/// Fill of every other annotation group.
const ALTERNATE_FILL: &str = "B8E7E0";

pub fn static_config() -> Result<SheetConfig, anyhow::Error> {
    from_json(json!({
        "col_width": [
            ["B", 18],
            ["C", 22],
            ["D", 22],
            ["E", 20],
            ["H", 16],
            ["I", 12],
            ["J", 14],
            ["M", 18],
        ],
        "freeze_panes": "F1",
        "row_height": [[1, 120]],
    }))
}

/// Layout of the fusion table, whose annotation columns come in `groups`
/// groups of equal width following the reviewer columns.
pub fn dynamic_config(table: &Table, groups: usize) -> Result<SheetConfig, anyhow::Error> {
    let last_row = table.len() as u32 + 1;
    let last_column = last_column_letter(table)?;
    let variant_class = table
        .column_index(VARIANT_CLASS)
        .ok_or_else(|| anyhow::anyhow!("SV table has no {:?} column", VARIANT_CLASS))?;

    let review = variant_class..variant_class + PLACEHOLDERS.len();
    let lookups = review.end..table.columns.len();
    let width = if groups == 0 {
        0
    } else {
        lookups.len() / groups
    };

    let mut colours = fill(cell_range(review, 1..last_row + 1)?, REVIEW_FILL);
    for (i, column) in lookups.clone().enumerate() {
        let group = if width == 0 { 0 } else { i / width };
        let colour = if group % 2 == 0 {
            ALTERNATE_FILL
        } else {
            REFGENE_FILL
        };
        colours.extend(fill(cell_range(column..column + 1, 1..last_row + 1)?, colour));
    }

    let dropdowns = vec![dropdown(
        cell_range(variant_class..variant_class + 1, 2..last_row + 1)?,
        ONCOGENICITY_OPTIONS,
        VARIANT_CLASS,
    )];
    let borders = ConfigValue::Nested(
        [(
            "cell_rows".to_owned(),
            ConfigValue::List(vec![json!([format!("A1:{}1", last_column), THIN_BORDER])]),
        )]
        .into_iter()
        .collect(),
    );
    let first_filtered = column_letter(5)?;

    Ok(sheet_config([
        (ConfigKey::CellsToWrite, ConfigValue::Cells(write_table(table, 1)?)),
        (ConfigKey::CellsToColour, ConfigValue::List(colours)),
        (ConfigKey::ToBold, cell_list(header_row(table)?)),
        (ConfigKey::Borders, borders),
        (
            ConfigKey::TextOrientation,
            ConfigValue::List(with_value(cell_range(lookups, 1..2)?, json!(90))),
        ),
        (ConfigKey::Dropdowns, ConfigValue::List(dropdowns)),
        (
            ConfigKey::AutoFilter,
            ConfigValue::Scalar(json!(format!("{}:{}", first_filtered, last_column))),
        ),
    ]))
}

pub fn config(table: &Table, groups: usize) -> Result<SheetConfig, anyhow::Error> {
    Ok(merge(static_config()?, dynamic_config(table, groups)?)?)
}
