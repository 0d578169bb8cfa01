//! Somatic SNV sheet.

use serde_json::json;

use crate::{
    process::{Table, ACTIONABILITY, COMMENTS, VARIANT_CLASS},
    sheets::{
        cell_list, cell_range, column_letter_of, columns_where,
        config::{from_json, merge, ConfigKey, ConfigValue, SheetConfig},
        dropdown, fill, header_row, is_refgene_column, last_column_letter, sheet_config,
        write_table,
        ACTIONABILITY_OPTIONS, PATHOGENICITY_OPTIONS, REFGENE_FILL, REVIEW_FILL, THIN_BORDER,
    },
};

const HOTSPOT_FILL: &str = "00FFFF";
const MTBP_FILL: &str = "dabcff";

pub fn static_config() -> Result<SheetConfig, anyhow::Error> {
    from_json(json!({
        "col_width": [
            ["B", 12],
            ["C", 28],
            ["D", 14],
            ["E", 20],
            ["F", 28],
            ["G", 18],
            ["J", 14],
            ["M", 20],
            ["N", 20],
            ["O", 20],
            ["P", 22],
        ],
        "freeze_panes": "E1",
    }))
}

pub fn dynamic_config(table: &Table) -> Result<SheetConfig, anyhow::Error> {
    let last_row = table.len() as u32 + 1;
    let last_column = last_column_letter(table)?;

    let mut colours = fill(
        columns_where(table, |c| [VARIANT_CLASS, ACTIONABILITY, COMMENTS].contains(&c))?,
        REVIEW_FILL,
    );
    colours.extend(fill(columns_where(table, is_refgene_column)?, REFGENE_FILL));
    colours.extend(fill(columns_where(table, |c| c.starts_with("HS_"))?, HOTSPOT_FILL));
    colours.extend(fill(columns_where(table, |c| c.starts_with("MTBP"))?, MTBP_FILL));

    let mut dropdowns = Vec::new();
    for (column, options) in [
        (VARIANT_CLASS, PATHOGENICITY_OPTIONS),
        (ACTIONABILITY, ACTIONABILITY_OPTIONS),
    ] {
        let index = table
            .column_index(column)
            .ok_or_else(|| anyhow::anyhow!("SNV table has no {:?} column", column))?;
        dropdowns.push(dropdown(cell_range(index..index + 1, 2..last_row + 1)?, options, column));
    }

    let vaf = column_letter_of(table, "VAF")?;
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
        (ConfigKey::ToBold, cell_list(header_row(table)?)),
        (ConfigKey::CellsToColour, ConfigValue::List(colours)),
        (ConfigKey::Borders, borders),
        (ConfigKey::Dropdowns, ConfigValue::List(dropdowns)),
        (
            ConfigKey::DataBar,
            ConfigValue::Scalar(json!(format!("{}2:{}{}", vaf, vaf, last_row))),
        ),
        (
            ConfigKey::AutoFilter,
            ConfigValue::Scalar(json!(format!("{}:{}", vaf, last_column))),
        ),
    ]))
}

pub fn config(table: &Table) -> Result<SheetConfig, anyhow::Error> {
    Ok(merge(static_config()?, dynamic_config(table)?)?)
}
