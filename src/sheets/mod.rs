//! Layouts of the workbook sheets.
//!
//! Every sheet has a static layout and, where it depends on the data, a
//! dynamic part computed from the processed tables.  Both are merged with
//! [`config::merge`] into the configuration handed to the workbook writer.

use std::ops::Range;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    common::column_letter,
    process::{Cell, Table},
};

use self::config::{CellRef, ConfigKey, ConfigValue, SheetConfig};

pub mod bioinformatics;
pub mod cnv;
pub mod config;
pub mod germline;
pub mod plot;
pub mod qc;
pub mod refgene;
pub mod signatures;
pub mod snv;
pub mod soc;
pub mod summary;
pub mod sv;

/// Border styles understood by the writer.
pub const THIN_BORDER: &str = "thin";
pub const LOWER_BORDER: &str = "bottom";
pub const LEFT_BORDER: &str = "left";

/// Fill of the reviewer columns.
pub const REVIEW_FILL: &str = "FFDBBB";
/// Fill of table headers in the report sheets.
pub const HEADER_FILL: &str = "ADD8E6";
/// Fill of the reference gene group columns.
pub const REFGENE_FILL: &str = "c4d9ef";

pub const ONCOGENICITY_OPTIONS: &str =
    "\"Oncogenic, Likely oncogenic,Uncertain, Likely passenger,Likely artefact\"";
pub const PATHOGENICITY_OPTIONS: &str =
    "\"Pathogenic, Likely pathogenic,Uncertain, Likely passenger,Likely artefact\"";
pub const ACTIONABILITY_OPTIONS: &str = "\"1. Predicts therapeutic response,2. Prognostic, 3. Defines diagnosis group,4. Eligibility for trial, 5. Other\"";
pub const QC_ALERT_OPTIONS: &str = "\"None,<30% tumour purity,SNVs low VAF (<6%),TINC (<5%),Somatic CNV, Germline CNV\"";

/// The sheets of the workbook in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter)]
pub enum SheetName {
    #[serde(rename = "SOC")]
    #[strum(serialize = "SOC")]
    Soc,
    #[serde(rename = "QC")]
    #[strum(serialize = "QC")]
    Qc,
    Plot,
    Signatures,
    Germline,
    #[serde(rename = "SNV")]
    #[strum(serialize = "SNV")]
    Snv,
    Gain,
    Loss,
    #[serde(rename = "SV")]
    #[strum(serialize = "SV")]
    Sv,
    Summary,
    Refgene,
    Bioinformatics,
}

/// A fully resolved sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: SheetName,
    pub config: SheetConfig,
}

/// Letters of column `name` in `table`.
pub fn column_letter_of(table: &Table, name: &str) -> Result<String, anyhow::Error> {
    let index = table
        .column_index(name)
        .ok_or_else(|| anyhow::anyhow!("no column {:?} in table", name))?;
    column_letter(index)
}

/// Letters of the last column of `table`.
pub fn last_column_letter(table: &Table) -> Result<String, anyhow::Error> {
    column_letter(table.columns.len().saturating_sub(1))
}

/// Header on `first_row`, followed by one row per table row.
pub fn write_table(table: &Table, first_row: u32) -> Result<IndexMap<CellRef, Value>, anyhow::Error> {
    let mut cells = IndexMap::new();
    for (i, column) in table.columns.iter().enumerate() {
        cells.insert(CellRef::new(i, first_row)?, Value::from(column.as_str()));
    }
    for (row, values) in (first_row + 1..).zip(table.rows.iter()) {
        for (i, value) in values.iter().enumerate() {
            cells.insert(CellRef::new(i, row)?, cell_value(value));
        }
    }
    Ok(cells)
}

/// JSON value of a table cell.
pub fn cell_value(cell: &Cell) -> Value {
    match cell {
        Cell::Text(value) => Value::from(value.as_str()),
        Cell::Int(value) => Value::from(*value),
        Cell::Float(value) => Value::from(*value),
    }
}

/// All cells of the 0-based `columns` in the 1-based `rows`, column by column.
pub fn cell_range(columns: Range<usize>, rows: Range<u32>) -> Result<Vec<CellRef>, anyhow::Error> {
    let mut cells = Vec::new();
    for column in columns {
        for row in rows.clone() {
            cells.push(CellRef::new(column, row)?);
        }
    }
    Ok(cells)
}

/// Cells of all columns of a table written at row 1 whose name matches `predicate`, header included.
pub fn columns_where(
    table: &Table,
    predicate: impl Fn(&str) -> bool,
) -> Result<Vec<CellRef>, anyhow::Error> {
    let last_row = table.len() as u32 + 1;
    let mut cells = Vec::new();
    for (index, _) in table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| predicate(name))
    {
        cells.extend(cell_range(index..index + 1, 1..last_row + 1)?);
    }
    Ok(cells)
}

/// Whether `column` holds a reference gene group annotation.
pub fn is_refgene_column(column: &str) -> bool {
    column.ends_with(" Driver") || column.ends_with(" Entities")
}

/// Pair each cell with `fill`.
pub fn fill(cells: impl IntoIterator<Item = CellRef>, fill: &str) -> Vec<Value> {
    cells.into_iter().map(|cell| json!([cell, fill])).collect()
}

/// Pair each cell with `value`, e.g., a border or a rotation.
pub fn with_value(cells: impl IntoIterator<Item = CellRef>, value: Value) -> Vec<Value> {
    cells
        .into_iter()
        .map(|cell| json!([cell, value.clone()]))
        .collect()
}

/// List validation on `cells`.
pub fn dropdown(cells: Vec<CellRef>, options: &str, title: &str) -> Value {
    json!({
        "cells": cells,
        "options": options,
        "title": title,
    })
}

/// Image `index` of the report anchored at `cell`, `None` if the report has no such image.
pub fn image(images: &[String], index: usize, cell: &str, size: (u32, u32)) -> Option<Value> {
    match images.get(index) {
        Some(src) => Some(json!({"cell": cell, "src": src, "size": [size.0, size.1]})),
        None => {
            tracing::warn!("report has no image {} to place at {}", index, cell);
            None
        }
    }
}

/// The header row cells of a table written at row 1.
pub fn header_row(table: &Table) -> Result<Vec<CellRef>, anyhow::Error> {
    cell_range(0..table.columns.len(), 1..2)
}

/// Key-value pairs into a configuration, keys in the given order.
pub fn sheet_config(entries: impl IntoIterator<Item = (ConfigKey, ConfigValue)>) -> SheetConfig {
    entries.into_iter().collect()
}

/// Convert cells into a JSON list value.
pub fn cell_list(cells: impl IntoIterator<Item = CellRef>) -> ConfigValue {
    ConfigValue::List(cells.into_iter().map(|cell| json!(cell)).collect())
}
