//! Copy number gain and loss sheets.

use serde_json::json;

use crate::{
    common::column_letter,
    process::{cnv::CnvKind, Table, ACTIONABILITY, COMMENTS, VARIANT_CLASS},
    sheets::{
        cell_list, cell_range, columns_where,
        config::{from_json, merge, ConfigKey, ConfigValue, SheetConfig},
        dropdown, fill, header_row, is_refgene_column, last_column_letter, sheet_config,
        with_value, write_table, LEFT_BORDER, ONCOGENICITY_OPTIONS, REFGENE_FILL, REVIEW_FILL,
        THIN_BORDER,
    },
};

pub fn static_config(kind: CnvKind) -> Result<SheetConfig, anyhow::Error> {
    let freeze_panes = match kind {
        CnvKind::Gain => "F1",
        CnvKind::Loss => "H1",
    };

    from_json(json!({
        "col_width": [
            ["B", 12],
            ["C", 16],
            ["D", 16],
            ["E", 22],
            ["H", 14],
            ["I", 10],
            ["J", 10],
            ["K", 22],
        ],
        "row_height": [[1, 80]],
        "freeze_panes": freeze_panes,
    }))
}

pub fn dynamic_config(kind: CnvKind, table: &Table) -> Result<SheetConfig, anyhow::Error> {
    let last_row = table.len() as u32 + 1;
    let last_column = last_column_letter(table)?;

    let mut colours = fill(
        columns_where(table, |c| [VARIANT_CLASS, ACTIONABILITY, COMMENTS].contains(&c))?,
        REVIEW_FILL,
    );
    colours.extend(fill(columns_where(table, is_refgene_column)?, REFGENE_FILL));

    let variant_class = table
        .column_index(VARIANT_CLASS)
        .ok_or_else(|| anyhow::anyhow!("{} table has no {:?} column", kind, VARIANT_CLASS))?;
    let dropdowns = vec![dropdown(
        cell_range(variant_class..variant_class + 1, 2..last_row + 1)?,
        ONCOGENICITY_OPTIONS,
        VARIANT_CLASS,
    )];

    let copy_number = table
        .column_index("Copy Number")
        .ok_or_else(|| anyhow::anyhow!("{} table has no copy number column", kind))?;
    let centred = with_value(
        cell_range(copy_number..copy_number + 1, 2..last_row + 1)?,
        json!({"horizontal": "center"}),
    );

    let rotated = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| is_refgene_column(name))
        .map(|(index, _)| cell_range(index..index + 1, 1..2))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten();

    // each reference group starts with its driver column
    let mut group_borders = Vec::new();
    for (index, _) in table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| name.ends_with(" Driver"))
    {
        let column = column_letter(index)?;
        group_borders.push(json!([format!("{}1:{}{}", column, column, last_row), LEFT_BORDER]));
    }
    let mut cell_rows = vec![json!([format!("A1:{}1", last_column), THIN_BORDER])];
    if kind == CnvKind::Loss {
        cell_rows.extend(group_borders);
    }
    let borders = ConfigValue::Nested(
        [("cell_rows".to_owned(), ConfigValue::List(cell_rows))]
            .into_iter()
            .collect(),
    );

    Ok(sheet_config([
        (ConfigKey::CellsToWrite, ConfigValue::Cells(write_table(table, 1)?)),
        (ConfigKey::ToBold, cell_list(header_row(table)?)),
        (ConfigKey::CellsToColour, ConfigValue::List(colours)),
        (ConfigKey::Borders, borders),
        (ConfigKey::Dropdowns, ConfigValue::List(dropdowns)),
        (ConfigKey::AlignmentInfo, ConfigValue::List(centred)),
        (ConfigKey::TextOrientation, ConfigValue::List(with_value(rotated, json!(90)))),
        (
            ConfigKey::AutoFilter,
            ConfigValue::Scalar(json!(format!("A:{}", last_column))),
        ),
    ]))
}

pub fn config(kind: CnvKind, table: &Table) -> Result<SheetConfig, anyhow::Error> {
    tracing::debug!("{} sheet with {} events", kind, table.len());
    Ok(merge(static_config(kind)?, dynamic_config(kind, table)?)?)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        process::cnv::{to_table, CnvRecord},
        refgene::test::refgene_groups,
    };

    fn table() -> Result<Table, anyhow::Error> {
        let groups = refgene_groups();
        let specs = groups.lookup_specs()?;
        let record = |gene: &str, copy_number: u32| CnvRecord {
            domain: "1".to_owned(),
            gene: gene.to_owned(),
            sv_type: "LOSS".to_owned(),
            copy_number,
            ..Default::default()
        };
        Ok(to_table(&[record("TP53", 0), record("PTEN", 1)], &specs))
    }

    #[test]
    fn gain_layout() -> Result<(), anyhow::Error> {
        let config = config(CnvKind::Gain, &table()?)?;

        assert_eq!(config[&ConfigKey::FreezePanes], ConfigValue::Scalar(json!("F1")));
        assert_eq!(config[&ConfigKey::AutoFilter], ConfigValue::Scalar(json!("A:Z")));
        assert_eq!(
            config[&ConfigKey::Dropdowns],
            ConfigValue::List(vec![json!({
                "cells": ["L2", "L3"],
                "options": ONCOGENICITY_OPTIONS,
                "title": "Variant class",
            })])
        );
        assert_eq!(
            config[&ConfigKey::AlignmentInfo],
            ConfigValue::List(vec![
                json!(["G2", {"horizontal": "center"}]),
                json!(["G3", {"horizontal": "center"}]),
            ])
        );
        let ConfigValue::List(rotated) = &config[&ConfigKey::TextOrientation] else {
            panic!("text_orientation is not a list");
        };
        assert_eq!(rotated.len(), 12);
        assert_eq!(rotated[0], json!(["O1", 90]));

        Ok(())
    }

    #[test]
    fn loss_borders_separate_groups() -> Result<(), anyhow::Error> {
        let config = config(CnvKind::Loss, &table()?)?;

        assert_eq!(config[&ConfigKey::FreezePanes], ConfigValue::Scalar(json!("H1")));
        let ConfigValue::Nested(borders) = &config[&ConfigKey::Borders] else {
            panic!("borders are not nested");
        };
        let ConfigValue::List(rows) = &borders["cell_rows"] else {
            panic!("cell_rows is not a list");
        };
        assert_eq!(rows.len(), 1 + 6);
        assert_eq!(rows[1], json!(["O1:O3", LEFT_BORDER]));

        Ok(())
    }
}
