//! Back-annotation of the reference genes with the processed variants hitting them.

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{
    process::{cnv::CnvRecord, fusion::FusionRecord, somatic::SomaticRecord, Cell, Table},
    refgene::GENE,
};

/// Separator of the values of several records hitting the same gene.
pub const SEPARATOR: &str = ", ";

/// Processed records that point to reference genes.
pub trait GeneHits {
    /// Names of the aggregated fields.
    fn fields() -> &'static [&'static str];

    /// Pairs of gene and field values, one per gene hit by the record.
    fn hits(&self) -> Vec<(&str, Vec<String>)>;
}

impl GeneHits for SomaticRecord {
    fn fields() -> &'static [&'static str] {
        &["GRCh38 coordinates", "Variant", "VAF"]
    }

    fn hits(&self) -> Vec<(&str, Vec<String>)> {
        vec![(
            self.gene.as_str(),
            vec![
                self.coordinates.clone(),
                self.variant.clone(),
                self.vaf.map(|vaf| vaf.to_string()).unwrap_or_default(),
            ],
        )]
    }
}

impl GeneHits for CnvRecord {
    fn fields() -> &'static [&'static str] {
        &["Copy Number", "Type", "Size"]
    }

    fn hits(&self) -> Vec<(&str, Vec<String>)> {
        vec![(
            self.gene.as_str(),
            vec![
                self.copy_number.to_string(),
                self.sv_type.clone(),
                self.size.clone(),
            ],
        )]
    }
}

impl GeneHits for FusionRecord {
    fn fields() -> &'static [&'static str] {
        &["GRCh38 coordinates", "Type", "Size"]
    }

    fn hits(&self) -> Vec<(&str, Vec<String>)> {
        self.slots
            .iter()
            .filter(|slot| !slot.gene.is_empty())
            .map(|slot| {
                (
                    slot.gene.as_str(),
                    vec![
                        self.coordinates.clone(),
                        self.sv_type.clone(),
                        self.size.clone(),
                    ],
                )
            })
            .collect()
    }
}

/// Left join the comma-joined fields of `records` per gene onto `reference`.
///
/// The new columns are named `<field>_<suffix>`.  Reference rows are never
/// dropped and genes without hits, as well as all rows for `None`, get empty
/// cells.
pub fn link<R: GeneHits>(
    reference: &mut Table,
    records: Option<&[R]>,
    suffix: &str,
) -> Result<(), anyhow::Error> {
    let gene_column = reference
        .column_index(GENE)
        .ok_or_else(|| anyhow::anyhow!("reference table has no {:?} column", GENE))?;

    let mut by_gene: IndexMap<&str, Vec<Vec<String>>> = IndexMap::new();
    for (gene, values) in records.unwrap_or_default().iter().flat_map(|r| r.hits()) {
        by_gene.entry(gene).or_default().push(values);
    }
    tracing::debug!(
        "{} reference genes hit by {} records",
        by_gene.len(),
        suffix
    );

    let fields = R::fields();
    reference
        .columns
        .extend(fields.iter().map(|field| format!("{}_{}", field, suffix)));
    for row in reference.rows.iter_mut() {
        let hits = by_gene.get(row[gene_column].to_string().as_str());
        row.extend((0..fields.len()).map(|i| match hits {
            Some(hits) => Cell::from(hits.iter().map(|values| &values[i]).join(SEPARATOR)),
            None => Cell::default(),
        }));
    }

    Ok(())
}
