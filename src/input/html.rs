//! Extraction of tables, images and the TMB from the supplementary HTML report.

use std::{io::Read, path::Path, sync::OnceLock};

use indexmap::IndexMap;
use regex::Regex;

use crate::{
    common::io::open_input,
    err::HeaderError,
    input::tables::{find_alternative_headers, TextTable},
};

/// Label of the bold element followed by the tumour mutational burden.
const TMB_LABEL: &str = "Total number of somatic non-synonymous small variants per megabase";

/// Expected headers of one table at a fixed position in the report.
#[derive(Debug, Clone, Copy)]
pub struct ExpectedTable {
    pub name: &'static str,
    pub headers: &'static [&'static str],
    pub alternatives: &'static [&'static [&'static str]],
}

/// The tables at the start of the report, in order.
pub const EXPECTED_TABLES: [ExpectedTable; 5] = [
    ExpectedTable {
        name: "Patient info",
        headers: &["Clinical Indication"],
        alternatives: &[],
    },
    ExpectedTable {
        name: "Tumour info",
        headers: &[
            "Tumour Diagnosis Date",
            "Histopathology or SIHMDS LAB ID",
            "Presentation",
            "Primary or Metastatic",
            "Tumour Topography",
        ],
        alternatives: &[],
    },
    ExpectedTable {
        name: "Sample info",
        headers: &[
            "Clinical Sample Date Time",
            "Storage Medium",
            "Source",
            "Tumour Content",
            "Calculated Tumour Content",
            "Calculated Overall Ploidy",
        ],
        alternatives: &[],
    },
    ExpectedTable {
        name: "Germline info",
        headers: &["Storage Medium", "Source"],
        alternatives: &[],
    },
    ExpectedTable {
        name: "Sequencing info",
        headers: &[
            "Total somatic SNVs",
            "Total somatic indels",
            "Total somatic SVs",
            "Sample type",
            "Genome-wide coverage mean, x",
            "Mapped reads, %",
            "Chimeric DNA fragments, %",
            "Insert size median, bp",
            "Unevenness of local genome coverage, x",
        ],
        alternatives: &[&[
            "Unevenness of local genome coverage, x",
            "Genome coverage evenness",
        ]],
    },
];

/// Content extracted from the supplementary report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplementaryReport {
    /// All tables in document order.
    pub tables: Vec<TextTable>,
    /// `src` attributes of all images in document order.
    pub images: Vec<String>,
    /// Tumour mutational burden, if reported.
    pub tmb: Option<String>,
}

/// A validated report table with its header renames.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub table: TextTable,
    pub alternatives: IndexMap<String, String>,
}

impl ReportTable {
    /// Value of `header` in `row`, following header renames; missing cells are empty.
    pub fn value(&self, row: usize, header: &str) -> &str {
        let header = self
            .alternatives
            .get(header)
            .map(String::as_str)
            .unwrap_or(header);
        self.table.get(row, header).unwrap_or_default()
    }
}

/// Validated tables keyed by their name in [`EXPECTED_TABLES`].
pub type ReportTables = IndexMap<&'static str, ReportTable>;

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

/// Remove tags, decode common entities and collapse whitespace.
fn cell_text(html: &str) -> String {
    static TAG: OnceLock<Regex> = OnceLock::new();
    static NUMERIC: OnceLock<Regex> = OnceLock::new();

    let text = regex(&TAG, r"(?s)<[^>]*>").replace_all(html, " ");
    let text = regex(&NUMERIC, r"&#([0-9]+);").replace_all(&text, |caps: &regex::Captures| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract all tables: first row `<th>` headers, following rows `<td>` cells.
fn extract_tables(html: &str) -> Vec<TextTable> {
    static TABLE: OnceLock<Regex> = OnceLock::new();
    static ROW: OnceLock<Regex> = OnceLock::new();
    static CELL: OnceLock<Regex> = OnceLock::new();
    let table_re = regex(&TABLE, r"(?is)<table\b[^>]*>(.*?)</table>");
    let row_re = regex(&ROW, r"(?is)<tr\b[^>]*>(.*?)</tr>");
    let cell_re = regex(&CELL, r"(?is)<t([hd])\b[^>]*>(.*?)</t[hd]>");

    table_re
        .captures_iter(html)
        .enumerate()
        .map(|(i, table)| {
            let mut headers = Vec::new();
            let mut rows = Vec::new();
            for (j, row) in row_re.captures_iter(&table[1]).enumerate() {
                let cells = cell_re
                    .captures_iter(&row[1])
                    .map(|cell| (cell[1].eq_ignore_ascii_case("h"), cell_text(&cell[2])))
                    .collect::<Vec<_>>();
                if j == 0 {
                    headers = cells.into_iter().map(|(_, text)| text).collect();
                } else {
                    let cells = cells
                        .into_iter()
                        .filter(|(is_header, _)| !is_header)
                        .map(|(_, text)| text)
                        .collect::<Vec<_>>();
                    if !cells.is_empty() {
                        rows.push(cells);
                    }
                }
            }
            TextTable::new(&format!("table {}", i + 1), headers, rows)
        })
        .collect()
}

fn extract_images(html: &str) -> Vec<String> {
    static IMG: OnceLock<Regex> = OnceLock::new();
    regex(&IMG, r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']*)["']"#)
        .captures_iter(html)
        .map(|caps| caps[1].to_owned())
        .collect()
}

fn extract_tmb(html: &str) -> Option<String> {
    static TMB: OnceLock<Regex> = OnceLock::new();
    let re = regex(
        &TMB,
        &format!(r"(?is)<b[^>]*>\s*{}\s*:?\s*</b>\s*:?\s*([^<]*)", regex::escape(TMB_LABEL)),
    );
    re.captures(html)
        .map(|caps| cell_text(&caps[1]))
        .filter(|tmb| !tmb.is_empty())
}

impl SupplementaryReport {
    /// Extract report content from HTML text.
    pub fn parse(html: &str) -> Self {
        Self {
            tables: extract_tables(html),
            images: extract_images(html),
            tmb: extract_tmb(html),
        }
    }

    /// Read and parse the report at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let mut html = String::new();
        open_input(path.as_ref())?.read_to_string(&mut html)?;
        let report = Self::parse(&html);
        tracing::debug!(
            "found {} tables and {} images in {:?}",
            report.tables.len(),
            report.images.len(),
            path.as_ref()
        );
        Ok(report)
    }

    /// Check the leading tables against [`EXPECTED_TABLES`].
    pub fn validate(&self) -> Result<ReportTables, HeaderError> {
        if self.tables.len() < EXPECTED_TABLES.len() {
            return Err(HeaderError::MissingTable {
                source_name: "supplementary report".to_owned(),
                expected: EXPECTED_TABLES.len(),
                found: self.tables.len(),
            });
        }

        EXPECTED_TABLES
            .iter()
            .zip(self.tables.iter())
            .map(|(expected, table)| {
                let alternatives = find_alternative_headers(
                    expected.name,
                    &table.headers,
                    expected.headers,
                    expected.alternatives,
                )?;
                let table = TextTable {
                    name: expected.name.to_owned(),
                    ..table.clone()
                };
                Ok((expected.name, ReportTable { table, alternatives }))
            })
            .collect()
    }
}
