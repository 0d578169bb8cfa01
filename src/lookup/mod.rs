//! Keyed lookups of record fields against reference tables.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::{
    common::{GENE_NOT_FOUND, NOT_APPLICABLE},
    err::HeaderError,
    input::tables::TextTable,
};

/// Output column name to annotation value, in specification order.
pub type Annotations = IndexMap<String, String>;

/// A string table indexed by one of its columns.
///
/// When the key column contains duplicates, the last occurrence wins.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupTable {
    table: TextTable,
    key_column: String,
    index: HashMap<String, usize>,
}

impl LookupTable {
    /// Index `table` by `key_column`.
    pub fn new(table: TextTable, key_column: &str) -> Result<Self, HeaderError> {
        let key_index = table.column(key_column)?;
        let index = table
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (row[key_index].clone(), i))
            .collect::<HashMap<_, _>>();
        tracing::trace!(
            "indexed {} keys of {} rows in table {:?}",
            index.len(),
            table.len(),
            &table.name
        );

        Ok(Self {
            table,
            key_column: key_column.to_owned(),
            index,
        })
    }

    pub fn name(&self) -> &str {
        &self.table.name
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn table(&self) -> &TextTable {
        &self.table
    }

    /// Row of the last occurrence of `key`.
    pub fn row(&self, key: &str) -> Option<&[String]> {
        self.index.get(key).map(|&i| self.table.rows[i].as_slice())
    }

    /// Value in column `column` of the row for `key`.
    pub fn get(&self, key: &str, column: usize) -> Option<&str> {
        self.row(key)
            .and_then(|row| row.get(column))
            .map(String::as_str)
    }
}

/// The record field that provides the lookup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum SourceField {
    /// Gene symbol.
    Gene,
    /// Protein change truncated to gene and position, e.g. `KRAS:p.Gly12`.
    HotspotProtein,
}

/// Records exposing their lookup keys.
pub trait Keyed {
    /// The key for `source`, `None` if the record has no such key.
    fn key(&self, source: SourceField) -> Option<&str>;
}

/// A gene symbol on its own, e.g., one slot of a multi-gene event.
impl Keyed for str {
    fn key(&self, source: SourceField) -> Option<&str> {
        match source {
            SourceField::Gene if !self.is_empty() => Some(self),
            _ => None,
        }
    }
}

/// One output column filled from a reference table.
#[derive(Debug, Clone)]
pub struct LookupSpec<'a> {
    /// Name of the output column.
    pub output: String,
    /// Record field providing the key.
    pub source: SourceField,
    /// Reference table, indexed by its key column.
    pub table: &'a LookupTable,
    /// Name of the value column in the reference table.
    pub value_column: String,
    value_index: usize,
}

impl<'a> LookupSpec<'a> {
    /// Construct a spec, failing if `value_column` is not in `table`.
    pub fn new(
        output: &str,
        source: SourceField,
        table: &'a LookupTable,
        value_column: &str,
    ) -> Result<Self, HeaderError> {
        let value_index = table.table().column(value_column)?;
        Ok(Self {
            output: output.to_owned(),
            source,
            table,
            value_column: value_column.to_owned(),
            value_index,
        })
    }

    /// Look up the value for one record.
    ///
    /// Records without a key give [`NOT_APPLICABLE`], keys absent from the
    /// table give [`GENE_NOT_FOUND`] and empty values give [`NOT_APPLICABLE`].
    pub fn lookup<K: Keyed + ?Sized>(&self, record: &K) -> String {
        let Some(key) = record.key(self.source) else {
            return NOT_APPLICABLE.to_owned();
        };
        match self.table.get(key, self.value_index) {
            None => GENE_NOT_FOUND.to_owned(),
            Some("") => NOT_APPLICABLE.to_owned(),
            Some(value) => value.to_owned(),
        }
    }
}

/// Annotate `record` with one value per spec.
pub fn annotate<K: Keyed + ?Sized>(record: &K, specs: &[LookupSpec]) -> Annotations {
    specs
        .iter()
        .map(|spec| (spec.output.clone(), spec.lookup(record)))
        .collect()
}
