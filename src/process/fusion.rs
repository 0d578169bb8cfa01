//! Fusions and other structural variants that are not copy number events.
//!
//! A fusion carries up to three genes and up to two fusion partners.  Both
//! are kept as sequences on the record and only spread over numbered columns
//! when flattening into a [`Table`].

use crate::{
    common::NOT_APPLICABLE,
    err::HeaderError,
    input::{
        tables::resolve_header,
        variants::{ReportedStructuralVariant, SV_POPULATION_FREQUENCY, SV_POPULATION_FREQUENCY_ALT},
    },
    lookup::{annotate, Annotations, LookupSpec},
    process::{Cell, Table, VARIANT_CLASS},
    split::{format_size, split_confidence_support, split_fusion_type, split_genes},
};

/// Reviewer columns following the variant class.
pub const PLACEHOLDERS: &[&str] = &[VARIANT_CLASS, "OG_Fusion", "OG_IntDup", "OG_IntDel", "Disruptive"];

/// One gene of a fusion with its annotations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusionSlot {
    pub gene: String,
    pub annotations: Annotations,
}

/// A processed fusion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FusionRecord {
    pub domain: String,
    /// One to three genes in input order.
    pub slots: Vec<FusionSlot>,
    pub refseq_ids: String,
    pub transcript_region: String,
    pub coordinates: String,
    pub bands: String,
    pub sv_type: String,
    /// Zero to two fusion partners.
    pub fusions: Vec<String>,
    /// Size with thousands separators, empty if unknown.
    pub size: String,
    pub population_frequency: String,
    pub paired_reads: String,
    pub split_reads: String,
    pub mode_of_action: String,
}

/// Whether the structural variant is neither a gain nor a loss.
pub fn is_fusion(variant: &ReportedStructuralVariant) -> bool {
    let sv_type = variant.sv_type.to_lowercase();
    !["loss", "loh", "gain"].iter().any(|t| sv_type.contains(t))
}

/// Present name of the population frequency column among the structural variant headers.
pub fn population_header<S: AsRef<str>>(headers: &[S]) -> Result<String, HeaderError> {
    resolve_header(
        "reported structural variants",
        headers,
        SV_POPULATION_FREQUENCY,
        &[SV_POPULATION_FREQUENCY, SV_POPULATION_FREQUENCY_ALT],
    )
}

/// Select, split and annotate the fusions; `None` if there are none.
///
/// Every gene slot is annotated with all of `specs`.  Too many genes or
/// fusion partners abort processing.
pub fn process(
    variants: &[ReportedStructuralVariant],
    specs: &[LookupSpec],
) -> Result<Option<Vec<FusionRecord>>, anyhow::Error> {
    let mut records = Vec::new();
    for variant in variants.iter().filter(|v| is_fusion(v)) {
        let (sv_type, fusions) = split_fusion_type(&variant.sv_type)?;
        let slots = split_genes(&variant.gene)?
            .into_iter()
            .map(|gene| FusionSlot {
                annotations: annotate(gene.as_str(), specs),
                gene,
            })
            .collect();
        let (paired_reads, split_reads) = split_confidence_support(&variant.confidence_support);

        records.push(FusionRecord {
            domain: variant.domain.clone(),
            slots,
            refseq_ids: variant.refseq_ids.clone(),
            transcript_region: variant.transcript_region.clone(),
            coordinates: variant.coordinates.clone(),
            bands: variant.bands.clone(),
            sv_type,
            fusions,
            size: format_size(variant.size),
            population_frequency: variant.population_frequency.clone(),
            paired_reads,
            split_reads,
            mode_of_action: variant.mode_of_action.clone(),
        });
    }

    tracing::debug!("selected {} fusions", records.len());
    if records.is_empty() {
        Ok(None)
    } else {
        Ok(Some(records))
    }
}

/// Indices of the gene slots that carry a gene in at least one record.
pub fn used_slots(records: &[FusionRecord]) -> Vec<usize> {
    let width = records.iter().map(|r| r.slots.len()).max().unwrap_or(0);
    (0..width)
        .filter(|&i| {
            records
                .iter()
                .any(|r| r.slots.get(i).is_some_and(|s| !s.gene.is_empty()))
        })
        .collect()
}

/// Number of `Fusion_N` columns, at least one.
pub fn fusion_columns(records: &[FusionRecord]) -> usize {
    records
        .iter()
        .map(|r| r.fusions.len())
        .max()
        .unwrap_or(0)
        .max(1)
}

/// Flatten into the SV output table.
///
/// Genes become `Gene_N`, partners `Fusion_N` and slot annotations
/// `<annotation>_N`, with `-` for slots a record does not fill.
pub fn to_table(records: &[FusionRecord], specs: &[LookupSpec], population_header: &str) -> Table {
    let slots = used_slots(records);
    let n_fusions = fusion_columns(records);

    let mut columns = vec!["Event domain".to_owned()];
    columns.extend(slots.iter().map(|i| format!("Gene_{}", i + 1)));
    columns.extend(
        [
            "RefSeq IDs",
            "Impacted transcript region",
            "GRCh38 coordinates",
            "Chromosomal bands",
            "Type",
        ]
        .map(String::from),
    );
    columns.extend((1..=n_fusions).map(|i| format!("Fusion_{}", i)));
    columns.extend(
        [
            "Size",
            population_header,
            "Paired reads",
            "Split reads",
            "Gene mode of action",
        ]
        .map(String::from),
    );
    columns.extend(PLACEHOLDERS.iter().map(|c| c.to_string()));
    for spec in specs {
        columns.extend(slots.iter().map(|i| format!("{}_{}", spec.output, i + 1)));
    }

    let mut table = Table::new(columns);
    for record in records {
        let slot = |i: usize| record.slots.get(i).filter(|s| !s.gene.is_empty());

        let mut row = vec![Cell::from(&record.domain)];
        row.extend(
            slots
                .iter()
                .map(|&i| Cell::from(slot(i).map_or(NOT_APPLICABLE, |s| s.gene.as_str()))),
        );
        row.extend([
            Cell::from(&record.refseq_ids),
            Cell::from(&record.transcript_region),
            Cell::from(&record.coordinates),
            Cell::from(&record.bands),
            Cell::from(&record.sv_type),
        ]);
        row.extend(
            (0..n_fusions).map(|i| Cell::from(record.fusions.get(i).cloned().unwrap_or_default())),
        );
        row.extend([
            Cell::from(&record.size),
            Cell::from(&record.population_frequency),
            Cell::from(&record.paired_reads),
            Cell::from(&record.split_reads),
            Cell::from(&record.mode_of_action),
        ]);
        row.extend(PLACEHOLDERS.iter().map(|_| Cell::default()));
        for spec in specs {
            row.extend(slots.iter().map(|&i| {
                Cell::from(
                    slot(i)
                        .and_then(|s| s.annotations.get(&spec.output))
                        .map_or(NOT_APPLICABLE, String::as_str),
                )
            }));
        }
        table.push_row(row);
    }
    table
}
