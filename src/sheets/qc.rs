//! Quality control sheet filled from the tables of the supplementary report.

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::{
    input::html::ReportTables,
    sheets::{
        config::{from_json, merge, CellRef, ConfigKey, ConfigValue, SheetConfig},
        HEADER_FILL, LOWER_BORDER, QC_ALERT_OPTIONS, THIN_BORDER,
    },
};

/// Row of the tumour in the sequencing table.
const TUMOUR_ROW: usize = 1;
/// Row of the germline sample in the sequencing table.
const GERMLINE_ROW: usize = 0;

/// Source of a QC cell: report table, table row and header.
type Source = (&'static str, usize, &'static str);

/// Cells of row 5, describing the tumour.
const TUMOUR_CELLS: &[(&str, Source)] = &[
    ("A5", ("Tumour info", 0, "Tumour Diagnosis Date")),
    ("B5", ("Sample info", 0, "Clinical Sample Date Time")),
    ("C5", ("Tumour info", 0, "Histopathology or SIHMDS LAB ID")),
    ("D5", ("Tumour info", 0, "Presentation")),
    ("E5", ("Patient info", 0, "Clinical Indication")),
    ("F5", ("Tumour info", 0, "Tumour Topography")),
    ("G5", ("Tumour info", 0, "Primary or Metastatic")),
    ("H5", ("Germline info", 0, "Storage Medium")),
];

/// Cells of row 8, describing purity and variant counts.
const PURITY_CELLS: &[(&str, Source)] = &[
    ("A8", ("Sample info", 0, "Tumour Content")),
    ("B8", ("Sample info", 0, "Calculated Tumour Content")),
    ("C8", ("Sample info", 0, "Calculated Overall Ploidy")),
    ("D8", ("Sequencing info", TUMOUR_ROW, "Total somatic SNVs")),
    ("E8", ("Sequencing info", TUMOUR_ROW, "Total somatic indels")),
    ("F8", ("Sequencing info", TUMOUR_ROW, "Total somatic SVs")),
];

/// Headers of the sequencing rows 11 and 12, by column.
const SEQUENCING_HEADERS: &[&str] = &[
    "Sample type",
    "Genome-wide coverage mean, x",
    "Mapped reads, %",
    "Chimeric DNA fragments, %",
    "Insert size median, bp",
    "Unevenness of local genome coverage, x",
];

pub fn static_config() -> Result<SheetConfig, anyhow::Error> {
    let header_cells = ["A4", "B4", "C4", "D4", "E4", "F4", "G4", "H4"]
        .iter()
        .chain(["A7", "B7", "C7", "D7", "E7", "F7", "G7"].iter())
        .chain(["A10", "B10", "C10", "D10", "E10", "F10"].iter())
        .copied()
        .collect::<Vec<_>>();
    let to_bold = ["A1", "A15"]
        .iter()
        .chain(header_cells.iter())
        .collect::<Vec<_>>();
    let col_width = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"]
        .iter()
        .map(|c| json!([c, 22]))
        .collect::<Vec<_>>();

    from_json(json!({
        "cells_to_write": {
            "A1": "=SOC!A2",
            "A2": "=SOC!A3",
            "C1": "=SOC!A5",
            "C2": "=SOC!A6",
            "E1": "=SOC!A9",
            "A4": "Diagnosis Date",
            "B4": "Tumour Received",
            "C4": "Tumour ID",
            "D4": "Presentation",
            "E4": "Diagnosis",
            "F4": "Tumour Site",
            "G4": "Tumour Type",
            "H4": "Germline Sample",
            "A7": "Purity (Histo)",
            "B7": "Purity (Calculated)",
            "C7": "Ploidy",
            "D7": "Total SNVs",
            "E7": "Total Indels",
            "F7": "Total SVs",
            "G7": "TMB",
            "A10": "Sample type",
            "B10": "Mean depth, x",
            "C10": "Mapped reads, %",
            "D10": "Chimeric DNA frag, %",
            "E10": "Insert size, bp",
            "F10": "Unevenness, x",
            "A15": "QC alerts",
            "A16": "None",
        },
        "to_bold": to_bold,
        "col_width": col_width,
        "cells_to_colour": header_cells.iter().map(|c| json!([c, HEADER_FILL])).collect::<Vec<_>>(),
        "borders": {
            "single_cells": [["A15", LOWER_BORDER]],
            "cell_rows": [
                ["A4:H4", THIN_BORDER],
                ["A5:H5", THIN_BORDER],
                ["A7:G7", THIN_BORDER],
                ["A8:G8", THIN_BORDER],
                ["A10:F10", THIN_BORDER],
                ["A11:F11", THIN_BORDER],
                ["A12:F12", THIN_BORDER],
            ],
        },
        "dropdowns": [{"cells": ["A16"], "options": QC_ALERT_OPTIONS, "title": "QC alerts"}],
    }))
}

/// Values taken from the report tables and the tumour mutational burden.
pub fn dynamic_config(tables: &ReportTables, tmb: Option<&str>) -> Result<SheetConfig, anyhow::Error> {
    let value = |(table, row, header): Source| -> Result<Value, anyhow::Error> {
        let table = tables
            .get(table)
            .ok_or_else(|| anyhow::anyhow!("report table {:?} is missing", table))?;
        Ok(Value::from(table.value(row, header)))
    };

    let mut cells = IndexMap::new();
    for (cell, source) in TUMOUR_CELLS.iter().chain(PURITY_CELLS.iter()) {
        cells.insert(cell.parse::<CellRef>()?, value(*source)?);
    }
    cells.insert("G8".parse()?, Value::from(tmb.unwrap_or_default()));
    for (row, sample) in [(11, TUMOUR_ROW), (12, GERMLINE_ROW)] {
        for (column, header) in SEQUENCING_HEADERS.iter().enumerate() {
            cells.insert(
                CellRef::new(column, row)?,
                value(("Sequencing info", sample, *header))?,
            );
        }
    }

    Ok(SheetConfig::from([(ConfigKey::CellsToWrite, ConfigValue::Cells(cells))]))
}

pub fn config(tables: &ReportTables, tmb: Option<&str>) -> Result<SheetConfig, anyhow::Error> {
    Ok(merge(static_config()?, dynamic_config(tables, tmb)?)?)
}
