//! Germline variants sheet.

use serde_json::json;

use crate::{
    process::{germline, Table, ACTIONABILITY},
    sheets::{
        cell_list, cell_range,
        config::{from_json, merge, ConfigKey, ConfigValue, SheetConfig},
        dropdown, fill, last_column_letter, sheet_config, with_value, write_table,
        ACTIONABILITY_OPTIONS, HEADER_FILL, PATHOGENICITY_OPTIONS, THIN_BORDER,
    },
};

/// Row of the table header.
const HEADER_ROW: u32 = 4;

pub fn static_config() -> Result<SheetConfig, anyhow::Error> {
    from_json(json!({
        "cells_to_write": {
            "A1": "=SOC!A2",
            "A2": "=SOC!A3",
            "C1": "=SOC!A5",
            "C2": "=SOC!A6",
            "E1": "=SOC!A9",
        },
        "to_bold": ["A1"],
        "col_width": [["A", 18], ["B", 22], ["C", 18], ["D", 22], ["E", 22]],
    }))
}

pub fn dynamic_config(table: &Table) -> Result<SheetConfig, anyhow::Error> {
    let columns = 0..table.columns.len();
    let header = cell_range(columns.clone(), HEADER_ROW..HEADER_ROW + 1)?;
    let last_row = HEADER_ROW + table.len() as u32;
    let data_rows = HEADER_ROW + 1..last_row + 1;

    let mut dropdowns = Vec::new();
    for (column, options) in [
        (germline::VARIANT_CLASS, PATHOGENICITY_OPTIONS),
        (ACTIONABILITY, ACTIONABILITY_OPTIONS),
    ] {
        let index = table
            .column_index(column)
            .ok_or_else(|| anyhow::anyhow!("germline table has no {:?} column", column))?;
        dropdowns.push(dropdown(
            cell_range(index..index + 1, data_rows.clone())?,
            options,
            column,
        ));
    }

    let last_column = last_column_letter(table)?;
    let borders = ConfigValue::Nested(
        [(
            "cell_rows".to_owned(),
            ConfigValue::List(
                (HEADER_ROW..last_row + 1)
                    .map(|row| json!([format!("A{}:{}{}", row, last_column, row), THIN_BORDER]))
                    .collect(),
            ),
        )]
        .into_iter()
        .collect(),
    );

    Ok(sheet_config([
        (ConfigKey::CellsToWrite, ConfigValue::Cells(write_table(table, HEADER_ROW)?)),
        (ConfigKey::ToBold, cell_list(header.clone())),
        (ConfigKey::CellsToColour, ConfigValue::List(fill(header.clone(), HEADER_FILL))),
        (ConfigKey::Borders, borders),
        (ConfigKey::Dropdowns, ConfigValue::List(dropdowns)),
        (
            ConfigKey::AlignmentInfo,
            ConfigValue::List(with_value(header, json!({"wrapText": true}))),
        ),
    ]))
}

pub fn config(table: &Table) -> Result<SheetConfig, anyhow::Error> {
    Ok(merge(static_config()?, dynamic_config(table)?)?)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::process::{germline::GermlineRecord, germline::to_table};
    use crate::sheets::config::CellRef;

    fn table() -> Table {
        let record = GermlineRecord {
            gene: "BRCA2".to_owned(),
            coordinates: "13:32340300".to_owned(),
            variant: "c.5946del;p.Ser1982ArgfsTer22".to_owned(),
            clnsigconf: "Pathogenic".to_owned(),
            ..Default::default()
        };
        to_table(&[record.clone(), record], &[])
    }

    #[test]
    fn table_below_soc_references() -> Result<(), anyhow::Error> {
        let config = config(&table())?;

        let ConfigValue::Cells(cells) = &config[&ConfigKey::CellsToWrite] else {
            panic!("cells_to_write is not a cell map");
        };
        assert_eq!(cells[&"A1".parse::<CellRef>()?], json!("=SOC!A2"));
        assert_eq!(cells[&"A4".parse::<CellRef>()?], json!("Gene"));
        assert_eq!(cells[&"A6".parse::<CellRef>()?], json!("BRCA2"));
        assert_eq!(cells[&"I5".parse::<CellRef>()?], json!("Pathogenic"));

        let ConfigValue::List(bold) = &config[&ConfigKey::ToBold] else {
            panic!("to_bold is not a list");
        };
        assert_eq!(bold.len(), 1 + 11);

        Ok(())
    }

    #[test]
    fn dropdowns_cover_data_rows() -> Result<(), anyhow::Error> {
        let config = dynamic_config(&table())?;

        assert_eq!(
            config[&ConfigKey::Dropdowns],
            ConfigValue::List(vec![
                json!({"cells": ["F5", "F6"], "options": PATHOGENICITY_OPTIONS, "title": "Variant Class"}),
                json!({"cells": ["G5", "G6"], "options": ACTIONABILITY_OPTIONS, "title": "Actionability"}),
            ])
        );

        Ok(())
    }
}
