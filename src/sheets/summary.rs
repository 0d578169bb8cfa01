//! Summary sheet gathering the reportable variants of the other sheets.
//!
//! The summary tables at the top pull their values by formula from the
//! copies of the variant table headers written below them.

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::{
    process::Table,
    sheets::{
        config::{from_json, merge, CellRef, ConfigKey, ConfigValue, SheetConfig},
        image, ACTIONABILITY_OPTIONS, HEADER_FILL, ONCOGENICITY_OPTIONS, THIN_BORDER,
    },
};

const SOMATIC_CNV_FILL: &str = "f2746b";
const SOMATIC_SV_FILL: &str = "7beda3";

/// Columns of the summary tables.
const TABLE_COLUMNS: &str = "ABCDEFGH";

/// First and last header rows of the summary tables.
const HEADER_ROWS: [u32; 4] = [24, 36, 49, 56];

/// Data rows of the summary tables.
const DATA_ROWS: [(u32, u32); 4] = [(25, 34), (37, 47), (50, 54), (57, 61)];

/// Rows receiving the headers of the processed tables.
const SNV_HEADER_ROW: u32 = 63;
const GAIN_HEADER_ROW: u32 = 75;
const SV_HEADER_ROW: u32 = 83;
const GERMLINE_HEADER_ROW: u32 = 91;

fn cell(column: char, row: u32) -> String {
    format!("{}{}", column, row)
}

fn headers(row: u32, names: &[&str]) -> Vec<(String, Value)> {
    TABLE_COLUMNS
        .chars()
        .zip(names)
        .map(|(column, name)| (cell(column, row), Value::from(*name)))
        .collect()
}

/// Formulas of `column` for `rows`, with `{}` replaced by the source row `offset` rows below.
fn formulas(column: char, rows: std::ops::Range<u32>, offset: u32, template: &str) -> Vec<(String, Value)> {
    rows.map(|row| (cell(column, row), Value::from(template.replace("{}", &(row + offset).to_string()))))
        .collect()
}

fn cells_to_write() -> IndexMap<String, Value> {
    let mut cells = IndexMap::new();
    for (key, value) in [
        ("A1", "=SOC!A2"),
        ("A2", "=SOC!A3"),
        ("C1", "=SOC!A5"),
        ("C2", "=SOC!A6"),
        ("E1", "=SOC!A9"),
        ("A23", "Somatic SNV"),
        ("A35", "Somatic CNV_SV"),
        ("A48", "Germline SNV"),
        ("A55", "Germline CNV"),
        ("A62", "Somatic_SNV"),
        ("A74", "Somatic_CNV"),
        ("A82", "Somatic_SV"),
        ("A90", "Germline_SNV"),
        ("A97", "Germline_CNV"),
    ] {
        cells.insert(key.to_owned(), Value::from(value));
    }

    let snv = [
        "Gene",
        "GRCh38 Coordinates",
        "Variant",
        "Consequence",
        "Zygosity",
        "Variant Class",
        "Actionability",
        "Comments",
    ];
    let sv = [
        "Gene/Locus",
        "GRCh38 Coordinates",
        "Cytological Bands",
        "Variant Type",
        "Consequence",
        "Variant Class",
        "Actionability",
        "Comments",
    ];
    cells.extend(headers(24, &snv));
    cells.extend(headers(36, &sv));
    cells.extend(headers(49, &snv[..7]));
    cells.extend(headers(56, &snv));

    cells.extend(formulas('A', 25..34, 39, "=B{}"));
    cells.extend(formulas('B', 25..34, 39, "=SUBSTITUTE(C{},\";\",CHAR(10))"));
    cells.extend(formulas('C', 25..34, 39, "=SUBSTITUTE(F{},\";\",CHAR(10))"));
    cells.extend(formulas('D', 25..34, 39, "=G{}"));
    cells.extend(formulas('E', 25..34, 39, "=CONCATENATE(J{},CHAR(10),K{})"));

    cells.extend(formulas('A', 37..42, 39, "=B{}"));
    cells.extend(formulas('B', 37..42, 39, "=SUBSTITUTE(E{},\";\",CHAR(10))"));
    cells.extend(formulas('C', 37..42, 39, "=CONCATENATE(I{},CHAR(10),J{})"));
    cells.extend(formulas('D', 37..42, 39, "=CONCATENATE(F{},\" (\",G{},\")\")"));

    cells.extend(formulas('A', 42..47, 42, "=C{}"));
    cells.extend(formulas('B', 42..47, 42, "=SUBSTITUTE(E{},\";\",CHAR(10))"));
    cells.extend(formulas('C', 42..47, 42, "=CONCATENATE(I{},CHAR(10),J{})"));
    cells.extend(formulas('D', 42..47, 42, "=CONCATENATE(F{},\" (\",G{},\")\")"));

    cells.extend(formulas('A', 50..54, 41, "=A{}"));
    cells.extend(formulas('A', 57..61, 41, "=A{}"));
    cells
}

fn data_cells(columns: &str) -> Vec<String> {
    DATA_ROWS
        .iter()
        .flat_map(|&(start, end)| (start..end).flat_map(move |row| columns.chars().map(move |c| cell(c, row))))
        .collect()
}

pub fn static_config() -> Result<SheetConfig, anyhow::Error> {
    let to_bold = ["A1", "A23", "A35", "A48", "A55", "A62", "A74", "A82", "A90", "A97"]
        .map(String::from)
        .into_iter()
        .chain(
            HEADER_ROWS
                .iter()
                .flat_map(|&row| TABLE_COLUMNS.chars().map(move |c| cell(c, row))),
        )
        .collect::<Vec<_>>();

    let mut colours = HEADER_ROWS
        .iter()
        .flat_map(|&row| TABLE_COLUMNS.chars().map(move |c| json!([cell(c, row), HEADER_FILL])))
        .collect::<Vec<_>>();
    for (rows, colour) in [(37..42, SOMATIC_CNV_FILL), (42..47, SOMATIC_SV_FILL)] {
        colours.extend(rows.flat_map(|row| TABLE_COLUMNS.chars().map(move |c| json!([cell(c, row), colour]))));
    }

    let cell_rows = [24..34, 36..47, 49..54, 56..61]
        .into_iter()
        .flatten()
        .map(|row| json!([format!("A{}:H{}", row, row), THIN_BORDER]))
        .collect::<Vec<_>>();
    let wrap_text = data_cells("ABCDE");
    let row_height = DATA_ROWS
        .iter()
        .flat_map(|&(start, end)| (start..end).map(|row| json!([row, 30])))
        .collect::<Vec<_>>();
    let dropdowns = vec![
        json!({"cells": data_cells("F"), "options": ONCOGENICITY_OPTIONS, "title": "Variant class"}),
        json!({"cells": data_cells("G"), "options": ACTIONABILITY_OPTIONS, "title": "Actionability"}),
    ];

    from_json(json!({
        "cells_to_write": cells_to_write(),
        "to_bold": to_bold,
        "col_width": [["A", 26], ["B", 20], ["C", 22], ["D", 24], ["F", 24], ["G", 24], ["H", 24]],
        "cells_to_colour": colours,
        "borders": {"cell_rows": cell_rows},
        "wrap_text": wrap_text,
        "row_height": row_height,
        "dropdowns": dropdowns,
    }))
}

/// Headers of the processed tables, each written on its own row below the summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceTables<'a> {
    pub snv: Option<&'a Table>,
    pub gain: Option<&'a Table>,
    pub sv: Option<&'a Table>,
    pub germline: Option<&'a Table>,
}

pub fn dynamic_config(sources: &SourceTables, images: &[String]) -> Result<SheetConfig, anyhow::Error> {
    let mut cells = IndexMap::new();
    for (row, table) in [
        (SNV_HEADER_ROW, sources.snv),
        (GAIN_HEADER_ROW, sources.gain),
        (SV_HEADER_ROW, sources.sv),
        (GERMLINE_HEADER_ROW, sources.germline),
    ] {
        for (i, column) in table.iter().flat_map(|t| t.columns.iter()).enumerate() {
            cells.insert(CellRef::new(i, row)?, Value::from(column.as_str()));
        }
    }
    let images = [
        image(images, 2, "A4", (350, 700)),
        image(images, 1, "G4", (350, 350)),
    ]
    .into_iter()
    .flatten()
    .collect();

    Ok(SheetConfig::from([
        (ConfigKey::CellsToWrite, ConfigValue::Cells(cells)),
        (ConfigKey::Images, ConfigValue::List(images)),
    ]))
}

pub fn config(sources: &SourceTables, images: &[String]) -> Result<SheetConfig, anyhow::Error> {
    Ok(merge(static_config()?, dynamic_config(sources, images)?)?)
}
