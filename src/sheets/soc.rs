//! Standard of care sheet with the patient details to be filled in by hand.

use serde_json::json;

use crate::sheets::{config::from_json, config::SheetConfig, LOWER_BORDER, THIN_BORDER};

pub fn static_config() -> Result<SheetConfig, anyhow::Error> {
    from_json(json!({
        "cells_to_write": {
            "A1": "Patient Details (Epic demographics)",
            "C1": "Previous testing",
            "A2": "NAME",
            "A3": "Sex, Age, DOB",
            "A4": "Phone number",
            "A5": "MRN",
            "A6": "NHS Number",
            "A8": "Histological diagnosis",
            "A12": "Comments",
        },
        "to_merge": {
            "start_row": 1,
            "end_row": 1,
            "start_column": 3,
            "end_column": 6,
        },
        "alignment_info": [["C1", {"horizontal": "center", "wrapText": true}]],
        "to_bold": ["A1", "A8", "A12", "C1"],
        "col_width": [["A", 32], ["C", 16], ["E", 16], ["D", 26], ["F", 26]],
        "borders": {
            "single_cells": [
                ["C1", THIN_BORDER],
                ["D1", THIN_BORDER],
                ["E1", THIN_BORDER],
                ["F1", THIN_BORDER],
                ["A1", LOWER_BORDER],
                ["A8", LOWER_BORDER],
                ["A12", LOWER_BORDER],
            ],
        },
    }))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sheets::config::{ConfigKey, ConfigValue};

    #[test]
    fn layout_shapes() -> Result<(), anyhow::Error> {
        let config = static_config()?;

        assert!(matches!(config[&ConfigKey::CellsToWrite], ConfigValue::Cells(_)));
        assert!(matches!(config[&ConfigKey::ToMerge], ConfigValue::Nested(_)));
        assert!(matches!(config[&ConfigKey::Borders], ConfigValue::Nested(_)));
        assert!(matches!(config[&ConfigKey::ToBold], ConfigValue::List(_)));

        Ok(())
    }
}
