//! Sheet with the genome-wide copy number and circos plots of the report.

use serde_json::json;

use crate::sheets::{
    config::{from_json, merge, ConfigKey, ConfigValue, SheetConfig},
    image, LOWER_BORDER,
};

pub fn static_config() -> Result<SheetConfig, anyhow::Error> {
    from_json(json!({
        "cells_to_write": {
            "A1": "=SOC!A2",
            "A2": "=SOC!A3",
            "C1": "=SOC!A5",
            "C2": "=SOC!A6",
            "E1": "=SOC!A9",
            "A34": "Pertinent chromosomal CNVs",
            "A35": "None",
        },
        "to_bold": ["A1", "A34"],
        "col_width": [["A", 18], ["B", 22], ["C", 18], ["D", 22], ["E", 22]],
        "borders": {"single_cells": [["A34", LOWER_BORDER]]},
    }))
}

/// Place the report images, skipping those the report lacks.
pub fn dynamic_config(images: &[String]) -> SheetConfig {
    let images = [
        image(images, 2, "A4", (550, 950)),
        image(images, 1, "K4", (500, 500)),
    ]
    .into_iter()
    .flatten()
    .collect();

    SheetConfig::from([(ConfigKey::Images, ConfigValue::List(images))])
}

pub fn config(images: &[String]) -> Result<SheetConfig, anyhow::Error> {
    Ok(merge(static_config()?, dynamic_config(images))?)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn images_by_index() -> Result<(), anyhow::Error> {
        let images = ["a.png", "b.png", "c.png"].map(String::from);

        let config = config(&images)?;

        assert_eq!(
            config[&ConfigKey::Images],
            ConfigValue::List(vec![
                json!({"cell": "A4", "src": "c.png", "size": [550, 950]}),
                json!({"cell": "K4", "src": "b.png", "size": [500, 500]}),
            ])
        );

        Ok(())
    }
}
