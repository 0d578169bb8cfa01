//! Typed sheet configurations and their merge.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    common::{column_index, column_letter},
    err::MergeError,
};

/// Keys of a sheet configuration, one per formatting concern of the writer.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConfigKey {
    CellsToWrite,
    ToMerge,
    AlignmentInfo,
    ToAlign,
    ToBold,
    ColWidth,
    RowHeight,
    CellsToColour,
    Borders,
    Dropdowns,
    Images,
    AutoFilter,
    FreezePanes,
    DataBar,
    TextOrientation,
    WrapText,
}

/// A spreadsheet cell reference like `B12`.
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub struct CellRef {
    /// Column letters, `A` to `ZZ`.
    pub column: String,
    /// 1-based row.
    pub row: u32,
}

impl CellRef {
    /// Reference from a 0-based column index and a 1-based row.
    pub fn new(column: usize, row: u32) -> Result<Self, anyhow::Error> {
        Ok(Self {
            column: column_letter(column)?,
            row,
        })
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl FromStr for CellRef {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| anyhow::anyhow!("cell reference {:?} has no row", s))?;
        let (column, row) = s.split_at(split);
        column_index(column)?;
        let row = row
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("invalid row in cell reference {:?}: {}", s, e))?;
        if row == 0 {
            anyhow::bail!("rows of cell reference {:?} start at 1", s);
        }

        Ok(Self {
            column: column.to_owned(),
            row,
        })
    }
}

/// A configuration value.
///
/// Maps whose keys all parse as cell references are [`ConfigValue::Cells`],
/// other maps are [`ConfigValue::Nested`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    List(Vec<Value>),
    Cells(IndexMap<CellRef, Value>),
    Nested(IndexMap<String, ConfigValue>),
    Scalar(Value),
}

impl ConfigValue {
    /// Name of the shape for diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            ConfigValue::List(_) => "list",
            ConfigValue::Cells(_) => "cells",
            ConfigValue::Nested(_) => "nested",
            ConfigValue::Scalar(_) => "scalar",
        }
    }
}

impl From<Vec<Value>> for ConfigValue {
    fn from(value: Vec<Value>) -> Self {
        ConfigValue::List(value)
    }
}

impl From<IndexMap<CellRef, Value>> for ConfigValue {
    fn from(value: IndexMap<CellRef, Value>) -> Self {
        ConfigValue::Cells(value)
    }
}

/// A sheet configuration, ordered by insertion.
pub type SheetConfig = IndexMap<ConfigKey, ConfigValue>;

/// Parse a configuration from JSON, used for the static layouts.
pub fn from_json(value: Value) -> Result<SheetConfig, anyhow::Error> {
    Ok(serde_json::from_value(value)?)
}

/// Shape of a JSON value for diagnostics.
fn json_shape(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "list",
        Value::Object(_) => "map",
        _ => "scalar",
    }
}

fn merge_json(path: String, lhs: Value, rhs: Value) -> Result<Value, MergeError> {
    match (lhs, rhs) {
        (Value::Array(mut lhs), Value::Array(rhs)) => {
            lhs.extend(rhs);
            Ok(Value::Array(lhs))
        }
        (Value::Object(mut lhs), Value::Object(rhs)) => {
            for (key, value) in rhs {
                let path = format!("{}.{}", path, key);
                match lhs.get_mut(&key) {
                    Some(slot) => {
                        let existing = slot.take();
                        *slot = merge_json(path, existing, value)?;
                    }
                    None => {
                        lhs.insert(key, value);
                    }
                }
            }
            Ok(Value::Object(lhs))
        }
        (lhs, rhs) if json_shape(&lhs) == "scalar" && json_shape(&rhs) == "scalar" => Ok(rhs),
        (lhs, rhs) => Err(MergeError::ShapeMismatch {
            path,
            left: json_shape(&lhs),
            right: json_shape(&rhs),
        }),
    }
}

fn merge_cells(
    prefix: &str,
    mut lhs: IndexMap<CellRef, Value>,
    rhs: IndexMap<CellRef, Value>,
) -> Result<IndexMap<CellRef, Value>, MergeError> {
    for (cell, value) in rhs {
        let path = format!("{}.{}", prefix, cell);
        match lhs.get_mut(&cell) {
            Some(slot) => {
                let existing = slot.take();
                *slot = merge_json(path, existing, value)?;
            }
            None => {
                lhs.insert(cell, value);
            }
        }
    }
    Ok(lhs)
}

fn merge_value(path: String, lhs: ConfigValue, rhs: ConfigValue) -> Result<ConfigValue, MergeError> {
    match (lhs, rhs) {
        (ConfigValue::List(mut lhs), ConfigValue::List(rhs)) => {
            lhs.extend(rhs);
            Ok(ConfigValue::List(lhs))
        }
        (ConfigValue::Cells(lhs), ConfigValue::Cells(rhs)) => {
            Ok(ConfigValue::Cells(merge_cells(&path, lhs, rhs)?))
        }
        (ConfigValue::Nested(lhs), ConfigValue::Nested(rhs)) => {
            Ok(ConfigValue::Nested(merge_maps(&path, lhs, rhs)?))
        }
        // An empty map deserializes as cells and merges with either kind of map.
        (ConfigValue::Cells(lhs), rhs @ ConfigValue::Nested(_)) if lhs.is_empty() => Ok(rhs),
        (ConfigValue::Nested(lhs), rhs @ ConfigValue::Cells(_)) if lhs.is_empty() => Ok(rhs),
        (lhs @ ConfigValue::Nested(_), ConfigValue::Cells(rhs)) if rhs.is_empty() => Ok(lhs),
        (lhs @ ConfigValue::Cells(_), ConfigValue::Nested(rhs)) if rhs.is_empty() => Ok(lhs),
        (ConfigValue::Scalar(_), ConfigValue::Scalar(rhs)) => Ok(ConfigValue::Scalar(rhs)),
        (lhs, rhs) => Err(MergeError::ShapeMismatch {
            path,
            left: lhs.shape(),
            right: rhs.shape(),
        }),
    }
}

fn merge_maps<K>(
    prefix: &str,
    mut lhs: IndexMap<K, ConfigValue>,
    rhs: IndexMap<K, ConfigValue>,
) -> Result<IndexMap<K, ConfigValue>, MergeError>
where
    K: std::hash::Hash + Eq + fmt::Display,
{
    for (key, value) in rhs {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        };
        match lhs.get_mut(&key) {
            Some(slot) => {
                let existing = std::mem::replace(slot, ConfigValue::List(Vec::new()));
                *slot = merge_value(path, existing, value)?;
            }
            None => {
                lhs.insert(key, value);
            }
        }
    }
    Ok(lhs)
}

/// Merge the `dynamic` configuration of a sheet into its `static_config`.
///
/// Lists are concatenated with static entries first, cell maps and nested
/// configurations are merged recursively down to the cell values, and dynamic
/// scalars win.  Values of different shape under the same key are rejected.
pub fn merge(static_config: SheetConfig, dynamic: SheetConfig) -> Result<SheetConfig, MergeError> {
    merge_maps("", static_config, dynamic)
}
