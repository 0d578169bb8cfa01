//! Sheet recording how and from what the workbook was produced.

use chrono::{DateTime, FixedOffset};
use serde_json::json;

use crate::sheets::{
    config::{from_json, SheetConfig},
    LOWER_BORDER,
};

const DATETIME_FORMAT: &str = "%a %d %b %Y, %H:%M";

/// Job metadata, resolved once from the command line and environment.
#[derive(Debug, Clone, PartialEq)]
pub struct RunMetadata {
    pub project_id: Option<String>,
    pub job_id: Option<String>,
    pub app_version: Option<String>,
    /// Name of the reference gene group directory.
    pub refgene_file: Option<String>,
    pub datetime: DateTime<FixedOffset>,
}

pub fn config(metadata: &RunMetadata) -> Result<SheetConfig, anyhow::Error> {
    let or = |value: &Option<String>, fallback: &str| value.clone().unwrap_or_else(|| fallback.to_owned());

    from_json(json!({
        "cells_to_write": {
            "A1": "Project id",
            "A2": or(&metadata.project_id, "Id not retrievable"),
            "A4": "Job id",
            "A5": or(&metadata.job_id, "Id not retrievable"),
            "A7": "Job datetime",
            "A8": metadata.datetime.format(DATETIME_FORMAT).to_string(),
            "C1": "Refgene file used",
            "C2": or(&metadata.refgene_file, "File not retrievable"),
            "C4": "App version",
            "C5": or(&metadata.app_version, "App not retrievable"),
        },
        "to_bold": ["A1", "A4", "A7", "C1", "C4"],
        "borders": {
            "single_cells": [
                ["A1", LOWER_BORDER],
                ["A4", LOWER_BORDER],
                ["A7", LOWER_BORDER],
                ["C1", LOWER_BORDER],
                ["C4", LOWER_BORDER],
            ],
        },
        "col_width": [["A", 36], ["C", 36]],
    }))
}
