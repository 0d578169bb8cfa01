//! Shaping of the reported variants into the canonical output tables.
//!
//! Each processor filters the input records, splits the compound fields,
//! annotates the records from the reference tables and returns typed records,
//! or `None` if no record passes the filter.  Records are only flattened into
//! a rectangular [`Table`] for writing.

use std::{cmp::Ordering, fmt};

use serde::Serialize;

pub mod cnv;
pub mod fusion;
pub mod germline;
pub mod somatic;

/// Columns filled in by reviewers, empty on output.
pub const VARIANT_CLASS: &str = "Variant class";
pub const ACTIONABILITY: &str = "Actionability";
pub const COMMENTS: &str = "Comments";

/// A single cell of an output table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Text(String::new())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(value) => write!(f, "{}", value),
            Cell::Int(value) => write!(f, "{}", value),
            Cell::Float(value) => write!(f, "{}", value),
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }
}

impl From<&String> for Cell {
    fn from(value: &String) -> Self {
        Cell::Text(value.clone())
    }
}

impl From<u32> for Cell {
    fn from(value: u32) -> Self {
        Cell::Int(value as i64)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

/// A rectangular output table with named columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row, which must have one cell per column.
    pub fn push_row(&mut self, row: Vec<Cell>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row width differs from header");
        self.rows.push(row);
    }

    /// 0-based index of column `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All cells of column `name`.
    pub fn column(&self, name: &str) -> Option<Vec<&Cell>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[index]).collect())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Order event domains numerically where possible, else lexicographically.
pub fn compare_domain(lhs: &str, rhs: &str) -> Ordering {
    match (lhs.trim().parse::<f64>(), rhs.trim().parse::<f64>()) {
        (Ok(lhs), Ok(rhs)) => lhs.total_cmp(&rhs),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => lhs.cmp(rhs),
    }
}

#[cfg(test)]
mod test {
    use std::cmp::Ordering;

    use pretty_assertions::assert_eq;

    use super::*;

    #[rstest::rstest]
    #[case("1", "2", Ordering::Less)]
    #[case("2", "10", Ordering::Less)]
    #[case("3", "3", Ordering::Equal)]
    #[case("1", "domain", Ordering::Less)]
    #[case("domain1", "domain3", Ordering::Less)]
    fn domain_order(#[case] lhs: &str, #[case] rhs: &str, #[case] expected: Ordering) {
        assert_eq!(compare_domain(lhs, rhs), expected);
    }

    #[test]
    fn table_columns() {
        let mut table = Table::new(["Gene", "Copy Number"]);
        table.push_row(vec![Cell::from("EGFR"), Cell::from(4u32)]);
        table.push_row(vec![Cell::from("MYC"), Cell::from(3u32)]);

        assert_eq!(table.column_index("Copy Number"), Some(1));
        assert_eq!(
            table.column("Gene"),
            Some(vec![&Cell::from("EGFR"), &Cell::from("MYC")])
        );
        assert_eq!(table.column("Size"), None);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn cell_serialization() -> Result<(), anyhow::Error> {
        let cells = vec![Cell::from("x"), Cell::from(4u32), Cell::from(0.25)];

        assert_eq!(serde_json::to_string(&cells)?, r#"["x",4,0.25]"#);

        Ok(())
    }
}
