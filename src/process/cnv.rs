//! Copy number gains and losses.

use crate::{
    input::variants::ReportedStructuralVariant,
    lookup::{annotate, Annotations, Keyed, LookupSpec, SourceField},
    process::{compare_domain, Cell, Table, ACTIONABILITY, COMMENTS, VARIANT_CLASS},
    split::{format_size, split_band_range, split_copy_number},
};

/// Direction of a copy number event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumIter)]
pub enum CnvKind {
    Gain,
    Loss,
}

impl CnvKind {
    /// Whether the `Type` field of a structural variant selects this kind.
    pub fn matches(&self, sv_type: &str) -> bool {
        let sv_type = sv_type.to_lowercase();
        match self {
            CnvKind::Gain => sv_type.contains("gain"),
            CnvKind::Loss => sv_type.contains("loss") || sv_type.contains("loh"),
        }
    }
}

/// A processed copy number event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CnvRecord {
    pub domain: String,
    pub gene: String,
    pub refseq_ids: String,
    pub transcript_region: String,
    pub coordinates: String,
    pub bands: String,
    pub band_start: String,
    pub band_end: String,
    pub sv_type: String,
    pub copy_number: u32,
    /// Size with thousands separators, empty if unknown.
    pub size: String,
    pub mode_of_action: String,
    /// The reference group annotations.
    pub annotations: Annotations,
}

impl Keyed for CnvRecord {
    fn key(&self, source: SourceField) -> Option<&str> {
        self.gene.as_str().key(source)
    }
}

pub const COLUMNS: &[&str] = &[
    "Event domain",
    "Gene",
    "RefSeq IDs",
    "Impacted transcript region",
    "GRCh38 coordinates",
    "Type",
    "Copy Number",
    "Size",
    "Cyto 1",
    "Cyto 2",
    "Gene mode of action",
    VARIANT_CLASS,
    ACTIONABILITY,
    COMMENTS,
];

/// Select, split, annotate and sort the events of `kind`; `None` if there are none.
///
/// Gains are ordered by domain and decreasing copy number, losses by domain
/// and increasing copy number.
pub fn process(
    variants: &[ReportedStructuralVariant],
    kind: CnvKind,
    refgene: &[LookupSpec],
) -> Result<Option<Vec<CnvRecord>>, anyhow::Error> {
    let mut records = Vec::new();
    for variant in variants.iter().filter(|v| kind.matches(&v.sv_type)) {
        let (sv_type, copy_number) = split_copy_number(&variant.sv_type)?;
        let (band_start, band_end) = split_band_range(&variant.bands);
        let mut record = CnvRecord {
            domain: variant.domain.clone(),
            gene: variant.gene.trim().to_owned(),
            refseq_ids: variant.refseq_ids.clone(),
            transcript_region: variant.transcript_region.clone(),
            coordinates: variant.coordinates.clone(),
            bands: variant.bands.clone(),
            band_start,
            band_end,
            sv_type,
            copy_number,
            size: format_size(variant.size),
            mode_of_action: variant.mode_of_action.clone(),
            annotations: Annotations::new(),
        };
        record.annotations = annotate(&record, refgene);
        records.push(record);
    }

    tracing::debug!("selected {} copy number {} events", records.len(), kind);
    if records.is_empty() {
        return Ok(None);
    }

    records.sort_by(|a, b| {
        let copy_number = match kind {
            CnvKind::Gain => b.copy_number.cmp(&a.copy_number),
            CnvKind::Loss => a.copy_number.cmp(&b.copy_number),
        };
        compare_domain(&a.domain, &b.domain).then(copy_number)
    });
    Ok(Some(records))
}

/// Flatten into the gain or loss output table.
pub fn to_table(records: &[CnvRecord], refgene: &[LookupSpec]) -> Table {
    let mut table = Table::new(
        COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(refgene.iter().map(|spec| spec.output.clone())),
    );
    for record in records {
        let mut row = vec![
            Cell::from(&record.domain),
            Cell::from(&record.gene),
            Cell::from(&record.refseq_ids),
            Cell::from(&record.transcript_region),
            Cell::from(&record.coordinates),
            Cell::from(&record.sv_type),
            Cell::from(record.copy_number),
            Cell::from(&record.size),
            Cell::from(&record.band_start),
            Cell::from(&record.band_end),
            Cell::from(&record.mode_of_action),
            Cell::default(),
            Cell::default(),
            Cell::default(),
        ];
        row.extend(refgene.iter().map(|spec| {
            Cell::from(record.annotations.get(&spec.output).cloned().unwrap_or_default())
        }));
        table.push_row(row);
    }
    table
}
