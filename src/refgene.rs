//! The six cancer-type reference gene groups.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use strum::IntoEnumIterator;

use crate::{
    common::NOT_APPLICABLE,
    err::HeaderError,
    input::tables::{resolve_header, table_name, TextTable},
    lookup::{LookupSpec, LookupTable, SourceField},
    process::{Cell, Table},
};

pub const GENE: &str = "Gene";
pub const DRIVER: &str = "Driver";
pub const ENTITIES: &str = "Entities";
pub const COMMENTS: &str = "Comments";

/// Names under which the driver annotation appears in the different tables.
pub const DRIVER_ALTERNATIVES: &[&str] = &["Driver", "Alteration", "Driver_SV"];

/// Reference gene group, displayed as the stem of its table file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::EnumIter,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum RefgeneGroup {
    Cosmic,
    Paed,
    Sarc,
    Neuro,
    Ovarian,
    Haem,
}

impl RefgeneGroup {
    /// Label used in annotation column names.
    pub fn label(&self) -> &'static str {
        match self {
            RefgeneGroup::Cosmic => "COSMIC",
            RefgeneGroup::Paed => "Paed",
            RefgeneGroup::Sarc => "Sarc",
            RefgeneGroup::Neuro => "Neuro",
            RefgeneGroup::Ovarian => "Ovary",
            RefgeneGroup::Haem => "Haem",
        }
    }
}

/// Replace empty cells of `columns` by [`NOT_APPLICABLE`].
pub fn normalize(table: &mut TextTable, columns: &[usize]) {
    for row in table.rows.iter_mut() {
        for &column in columns {
            if let Some(cell) = row.get_mut(column) {
                if cell.trim().is_empty() {
                    *cell = NOT_APPLICABLE.to_owned();
                }
            }
        }
    }
}

/// A normalized reference table indexed by gene.
#[derive(Debug, Clone)]
pub struct RefgeneTable {
    pub group: RefgeneGroup,
    pub lookup: LookupTable,
    /// Present name of the driver column.
    pub driver: String,
    /// Whether a comments column is present.
    pub has_comments: bool,
}

impl RefgeneTable {
    /// Resolve the annotation headers, normalize and index `table`.
    pub fn new(group: RefgeneGroup, mut table: TextTable) -> Result<Self, HeaderError> {
        table.name = group.to_string();
        let driver = resolve_header(&table.name, &table.headers, DRIVER, DRIVER_ALTERNATIVES)?;
        let columns = [table.column(&driver)?, table.column(ENTITIES)?];
        normalize(&mut table, &columns);
        let has_comments = table.column(COMMENTS).is_ok();

        Ok(Self {
            group,
            lookup: LookupTable::new(table, GENE)?,
            driver,
            has_comments,
        })
    }
}

/// All six reference gene groups in fixed order.
#[derive(Debug, Clone)]
pub struct RefgeneGroups {
    tables: Vec<RefgeneTable>,
}

/// Find the table file of `group` in `dir`.
fn find_table_file(dir: &Path, group: RefgeneGroup) -> Result<PathBuf, anyhow::Error> {
    let stem = group.to_string();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && table_name(&path).eq_ignore_ascii_case(&stem) {
            return Ok(path);
        }
    }
    anyhow::bail!(
        "no table for reference gene group {:?} found in {:?}",
        stem,
        dir
    )
}

impl RefgeneGroups {
    /// Load the tables `cosmic`, `paed`, `sarc`, `neuro`, `ovarian` and `haem` from `dir`.
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self, anyhow::Error> {
        let mut tables = IndexMap::new();
        for group in RefgeneGroup::iter() {
            let path = find_table_file(dir.as_ref(), group)?;
            tracing::debug!("reading reference gene group {} from {:?}", group, &path);
            tables.insert(group, TextTable::from_path(&path)?);
        }
        Self::from_tables(tables)
    }

    /// Construct from one raw table per group.
    pub fn from_tables(mut tables: IndexMap<RefgeneGroup, TextTable>) -> Result<Self, anyhow::Error> {
        let tables = RefgeneGroup::iter()
            .map(|group| {
                let table = tables.swap_remove(&group).ok_or_else(|| {
                    anyhow::anyhow!("reference gene group {} is missing", group)
                })?;
                Ok(RefgeneTable::new(group, table)?)
            })
            .collect::<Result<Vec<_>, anyhow::Error>>()?;

        Ok(Self { tables })
    }

    pub fn tables(&self) -> &[RefgeneTable] {
        &self.tables
    }

    /// Lookups of driver and entities per group, named `<Label> Driver` and `<Label> Entities`.
    pub fn lookup_specs(&self) -> Result<Vec<LookupSpec<'_>>, HeaderError> {
        let mut specs = Vec::new();
        for table in &self.tables {
            let label = table.group.label();
            specs.push(LookupSpec::new(
                &format!("{} Driver", label),
                SourceField::Gene,
                &table.lookup,
                &table.driver,
            )?);
            specs.push(LookupSpec::new(
                &format!("{} Entities", label),
                SourceField::Gene,
                &table.lookup,
                ENTITIES,
            )?);
        }
        Ok(specs)
    }

    /// Outer join of all groups on the gene, sorted by gene.
    ///
    /// Genes absent from a group have empty cells in its columns.
    pub fn combine(&self) -> Result<Table, HeaderError> {
        let mut genes = BTreeSet::new();
        for table in &self.tables {
            let inner = table.lookup.table();
            let key = inner.column(table.lookup.key_column())?;
            genes.extend(inner.rows.iter().map(|row| row[key].as_str()));
        }

        let mut columns = vec![GENE.to_owned()];
        let mut sources = Vec::new();
        for table in &self.tables {
            let label = table.group.label();
            let inner = table.lookup.table();
            columns.push(format!("{}_Alteration", label));
            sources.push((&table.lookup, inner.column(&table.driver)?));
            columns.push(format!("{}_Entities", label));
            sources.push((&table.lookup, inner.column(ENTITIES)?));
            if table.has_comments {
                columns.push(format!("{}_Comments", label));
                sources.push((&table.lookup, inner.column(COMMENTS)?));
            }
        }

        let mut result = Table::new(columns);
        for gene in genes {
            let mut row = vec![Cell::from(gene)];
            row.extend(sources.iter().map(|(lookup, column)| {
                Cell::from(lookup.get(gene, *column).unwrap_or_default())
            }));
            result.push_row(row);
        }

        Ok(result)
    }
}
