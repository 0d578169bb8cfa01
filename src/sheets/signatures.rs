//! Mutational signatures sheet.

use serde_json::json;

use crate::sheets::{
    config::{from_json, merge, ConfigKey, ConfigValue, SheetConfig},
    image, LOWER_BORDER,
};

pub fn static_config() -> Result<SheetConfig, anyhow::Error> {
    let alignment = ["E", "F"]
        .iter()
        .flat_map(|col| (35..37).map(move |row| json!([format!("{}{}", col, row), {"horizontal": "left"}])))
        .collect::<Vec<_>>();

    from_json(json!({
        "cells_to_write": {
            "A1": "=SOC!A2",
            "A2": "=SOC!A3",
            "C1": "=SOC!A5",
            "C2": "=SOC!A6",
            "E1": "=SOC!A9",
            "A35": "Signature version",
            "C35": "Pertinent signatures",
            "E35": "Total SNVs",
            "E36": "=QC!D8",
            "F35": "TMB",
            "F36": "=QC!G8",
            "A36": "v2 (March 2015)",
            "C36": "None",
        },
        "to_bold": ["A1", "A35", "C35", "E35", "F35"],
        "col_width": [["A", 18], ["B", 22], ["C", 18], ["D", 22], ["E", 22]],
        "borders": {
            "single_cells": [
                ["A35", LOWER_BORDER],
                ["C35", LOWER_BORDER],
                ["E35", LOWER_BORDER],
                ["F35", LOWER_BORDER],
            ],
        },
        "alignment_info": alignment,
    }))
}

pub fn dynamic_config(images: &[String]) -> SheetConfig {
    let images = [
        image(images, 5, "A4", (600, 800)),
        image(images, 6, "H4", (600, 800)),
        image(images, 7, "V4", (600, 1100)),
    ]
    .into_iter()
    .flatten()
    .collect();

    SheetConfig::from([(ConfigKey::Images, ConfigValue::List(images))])
}

pub fn config(images: &[String]) -> Result<SheetConfig, anyhow::Error> {
    Ok(merge(static_config()?, dynamic_config(images))?)
}
