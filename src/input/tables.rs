//! Plain string tables and resolution of alternative header names.

use std::path::Path;

use indexmap::IndexMap;

use crate::{common::io::open_csv, err::HeaderError};

/// A rectangular table of strings with named columns.
///
/// Rows are padded with empty strings to the number of headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextTable {
    /// Name of the table used in diagnostics.
    pub name: String,
    /// Column headers in file order.
    pub headers: Vec<String>,
    /// Rows of cells.
    pub rows: Vec<Vec<String>>,
}

impl TextTable {
    /// Construct from headers and rows, padding short rows.
    pub fn new(name: &str, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, String::new());
                }
                row
            })
            .collect();
        Self {
            name: name.to_owned(),
            headers,
            rows,
        }
    }

    /// Read a comma- or tab-separated file, the table is named after the file stem.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let name = table_name(path.as_ref());
        let mut reader = open_csv(path.as_ref())?;
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect::<Vec<_>>();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|s| s.trim().to_owned()).collect());
        }
        tracing::trace!("read {} rows from table {:?}", rows.len(), &name);

        Ok(Self::new(&name, headers, rows))
    }

    /// Index of the column `header`.
    pub fn column(&self, header: &str) -> Result<usize, HeaderError> {
        self.headers
            .iter()
            .position(|h| h == header)
            .ok_or_else(|| HeaderError::MissingHeader {
                table: self.name.clone(),
                header: header.to_owned(),
            })
    }

    /// Value of column `header` in row `row`, if both exist.
    pub fn get(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.headers.iter().position(|h| h == header)?;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Name of a table file: the file name without `.gz` and table extension.
pub fn table_name(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let name = name.strip_suffix(".gz").unwrap_or(name);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_owned(),
        _ => name.to_owned(),
    }
}

/// Check that all `expected` headers are present in `headers`.
///
/// Each entry of `alternatives` is a set of interchangeable names.  When an
/// expected header is absent, the first present member of its alternative set
/// is used instead.  The result maps each replaced expected header to the
/// header actually present.
pub fn find_alternative_headers<S: AsRef<str>>(
    table: &str,
    headers: &[S],
    expected: &[&str],
    alternatives: &[&[&str]],
) -> Result<IndexMap<String, String>, HeaderError> {
    let present = |name: &str| headers.iter().any(|h| h.as_ref() == name);
    let mut result = IndexMap::new();

    for header in expected {
        if present(header) {
            continue;
        }

        let replacement = alternatives
            .iter()
            .filter(|set| set.contains(header))
            .flat_map(|set| set.iter())
            .find(|alternative| present(alternative));

        match replacement {
            Some(alternative) => {
                tracing::debug!(
                    "using {:?} in place of {:?} in table {:?}",
                    alternative,
                    header,
                    table
                );
                result.insert((*header).to_owned(), (*alternative).to_owned());
            }
            None => {
                return Err(HeaderError::MissingHeader {
                    table: table.to_owned(),
                    header: (*header).to_owned(),
                })
            }
        }
    }

    Ok(result)
}

/// Resolve the present name of a single `expected` header.
pub fn resolve_header<S: AsRef<str>>(
    table: &str,
    headers: &[S],
    expected: &str,
    alternatives: &[&str],
) -> Result<String, HeaderError> {
    let renames = find_alternative_headers(table, headers, &[expected], &[alternatives])?;
    Ok(renames
        .get(expected)
        .cloned()
        .unwrap_or_else(|| expected.to_owned()))
}
