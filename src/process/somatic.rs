//! Somatic small variants with reference, hotspot and cytoband annotation.

use itertools::Itertools;

use crate::{
    err::ShapeError,
    input::variants::ReportedVariant,
    lookup::{annotate, Annotations, Keyed, LookupSpec, LookupTable, SourceField},
    process::{compare_domain, Cell, Table, ACTIONABILITY, COMMENTS, VARIANT_CLASS},
    split::{hotspot_protein_key, split_cds_protein, split_optional_pair},
};

/// Key column of the hotspot table.
pub const HS_PROTEIN_ID: &str = "HS_PROTEIN_ID";
/// Key and value columns of the cytological band table.
pub const CYTO_GENE: &str = "Gene";
pub const CYTO: &str = "Cyto";

/// A processed somatic variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SomaticRecord {
    pub domain: String,
    pub gene: String,
    pub coordinates: String,
    pub refseq_ids: String,
    /// The raw `CDS change and protein change` value.
    pub variant: String,
    pub c_dot: String,
    /// Protein change without `p.`, empty if there is none.
    pub p_dot: String,
    pub consequences: String,
    pub error_flag: String,
    pub population_frequency: String,
    /// `None` when the report leaves the VAF empty.
    pub vaf: Option<f64>,
    pub loh: String,
    pub read_depth: String,
    pub mode_of_action: String,
    /// `GENE:p.<protein>` truncated to gene and position.
    pub hotspot_key: String,
    /// Cytoband, reference group, and hotspot annotations.
    pub annotations: Annotations,
}

impl SomaticRecord {
    /// `GENE:c.<change>`
    pub fn mtbp_c_dot(&self) -> String {
        format!("{}:{}", self.gene, self.c_dot)
    }

    /// `GENE:<protein>`, empty when there is no protein change.
    pub fn mtbp_p_dot(&self) -> String {
        if self.p_dot.is_empty() {
            String::new()
        } else {
            format!("{}:{}", self.gene, self.p_dot)
        }
    }
}

impl Keyed for SomaticRecord {
    fn key(&self, source: SourceField) -> Option<&str> {
        match source {
            SourceField::Gene if !self.gene.is_empty() => Some(&self.gene),
            SourceField::HotspotProtein if !self.hotspot_key.is_empty() => {
                Some(&self.hotspot_key)
            }
            _ => None,
        }
    }
}

/// The lookups of the somatic table besides the reference groups.
pub struct SomaticLookups<'a> {
    /// `Cyto` from the cytological bands.
    pub cyto: LookupSpec<'a>,
    /// `<Label> Driver` and `<Label> Entities` for the six groups.
    pub refgene: Vec<LookupSpec<'a>>,
    /// `HS_Sample` and `HS_Tumour`.
    pub hotspots: Vec<LookupSpec<'a>>,
}

impl<'a> SomaticLookups<'a> {
    pub fn new(
        cytobands: &'a LookupTable,
        refgene: Vec<LookupSpec<'a>>,
        hotspots: &'a LookupTable,
    ) -> Result<Self, anyhow::Error> {
        Ok(Self {
            cyto: LookupSpec::new(CYTO, SourceField::Gene, cytobands, CYTO)?,
            refgene,
            hotspots: vec![
                LookupSpec::new("HS_Sample", SourceField::HotspotProtein, hotspots, "HS_Samples")?,
                LookupSpec::new(
                    "HS_Tumour",
                    SourceField::HotspotProtein,
                    hotspots,
                    "HS_Tumor Type Composition",
                )?,
            ],
        })
    }

    /// All specs in output order.
    pub fn specs(&self) -> Vec<LookupSpec<'a>> {
        std::iter::once(self.cyto.clone())
            .chain(self.refgene.iter().cloned())
            .chain(self.hotspots.iter().cloned())
            .collect()
    }
}

/// Whether the `Origin` field selects a somatic variant.
pub fn is_somatic(variant: &ReportedVariant) -> bool {
    variant.origin.to_lowercase().contains("somatic")
}

/// Select, split, annotate and sort the somatic variants; `None` if there are none.
pub fn process(
    variants: &[ReportedVariant],
    lookups: &SomaticLookups,
) -> Result<Option<Vec<SomaticRecord>>, anyhow::Error> {
    let specs = lookups.specs();
    let mut records = Vec::new();
    for variant in variants.iter().filter(|v| is_somatic(v)) {
        let (c_dot, p_dot) = split_cds_protein(&variant.cds_protein);
        let (consequences, error_flag) = split_optional_pair(&variant.consequences);
        let (vaf, loh) = split_optional_pair(&variant.vaf);

        let mut record = SomaticRecord {
            domain: variant.domain.clone(),
            gene: variant.gene.clone(),
            coordinates: variant.coordinates.clone(),
            refseq_ids: variant.refseq_ids.clone(),
            variant: variant.cds_protein.clone(),
            c_dot,
            p_dot,
            consequences,
            error_flag,
            population_frequency: variant.population_frequency.clone(),
            loh,
            read_depth: variant.read_depth.clone(),
            mode_of_action: variant.mode_of_action.clone(),
            ..Default::default()
        };
        if !record.p_dot.is_empty() {
            record.hotspot_key =
                hotspot_protein_key(&format!("{}:p.{}", record.gene, record.p_dot));
        }
        record.annotations = annotate(&record, &specs);
        record.vaf = parse_vaf(&vaf).map_err(|_| ShapeError::InvalidVaf(variant.vaf.clone()))?;
        records.push(record);
    }

    tracing::debug!("selected {} somatic variants", records.len());
    if records.is_empty() {
        return Ok(None);
    }

    records.sort_by(|a, b| {
        compare_domain(&a.domain, &b.domain).then_with(|| compare_vaf_descending(a.vaf, b.vaf))
    });
    Ok(Some(records))
}

/// Numeric VAF, `None` for an empty or `nan` value.
fn parse_vaf(value: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        Ok(None)
    } else {
        value.parse::<f64>().map(Some)
    }
}

/// Higher VAF first, missing VAF last.
fn compare_vaf_descending(lhs: Option<f64>, rhs: Option<f64>) -> std::cmp::Ordering {
    match (lhs, rhs) {
        (Some(lhs), Some(rhs)) => rhs.total_cmp(&lhs),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

/// Output columns preceding the reference group annotations.
fn leading_columns(population_header: &str) -> Vec<String> {
    [
        "Domain",
        "Gene",
        "GRCh38 coordinates",
        CYTO,
        "RefSeq IDs",
        "Variant",
        "Predicted consequences",
        "Error flag",
        population_header,
        "VAF",
        "LOH",
        "Alt allele/total read depth",
        "Gene mode of action",
        VARIANT_CLASS,
        ACTIONABILITY,
        COMMENTS,
    ]
    .iter()
    .map(|c| c.to_string())
    .collect()
}

/// Flatten into the SNV output table.
pub fn to_table(records: &[SomaticRecord], lookups: &SomaticLookups) -> Table {
    let trailing = lookups
        .refgene
        .iter()
        .chain(lookups.hotspots.iter())
        .map(|spec| spec.output.clone())
        .collect_vec();
    let mut table = Table::new(
        leading_columns(crate::input::variants::POPULATION_FREQUENCY)
            .into_iter()
            .chain(trailing.iter().cloned())
            .chain(["MTBP c.".to_owned(), "MTBP p.".to_owned()]),
    );

    for record in records {
        let annotation =
            |name: &str| Cell::from(record.annotations.get(name).cloned().unwrap_or_default());
        let mut row = vec![
            Cell::from(&record.domain),
            Cell::from(&record.gene),
            Cell::from(&record.coordinates),
            annotation(CYTO),
            Cell::from(&record.refseq_ids),
            Cell::from(&record.variant),
            Cell::from(&record.consequences),
            Cell::from(&record.error_flag),
            Cell::from(&record.population_frequency),
            record.vaf.map_or_else(Cell::default, Cell::from),
            Cell::from(&record.loh),
            Cell::from(&record.read_depth),
            Cell::from(&record.mode_of_action),
            Cell::default(),
            Cell::default(),
            Cell::default(),
        ];
        row.extend(trailing.iter().map(|name| annotation(name)));
        row.push(Cell::from(record.mtbp_c_dot()));
        row.push(Cell::from(record.mtbp_p_dot()));
        table.push_row(row);
    }
    table
}

#[cfg(test)]
mod test {
    use float_cmp::approx_eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        common::{GENE_NOT_FOUND, NOT_APPLICABLE},
        lookup::test::text_table,
        refgene::test::refgene_groups,
    };

    fn variant(domain: &str, gene: &str, cds_protein: &str, vaf: &str) -> ReportedVariant {
        ReportedVariant {
            origin: "somatic".to_owned(),
            domain: domain.to_owned(),
            gene: gene.to_owned(),
            coordinates: "12:25245350;C/T".to_owned(),
            cds_protein: cds_protein.to_owned(),
            consequences: "missense_variant".to_owned(),
            vaf: vaf.to_owned(),
            population_frequency: "-|-".to_owned(),
            ..Default::default()
        }
    }

    fn cytobands() -> LookupTable {
        LookupTable::new(
            text_table("cytobands", &["Gene", "Cyto"], &[&["KRAS", "12p12.1"]]),
            CYTO_GENE,
        )
        .unwrap()
    }

    fn hotspots() -> LookupTable {
        LookupTable::new(
            text_table(
                "hotspots",
                &["HS_PROTEIN_ID", "HS_Samples", "HS_Tumor Type Composition"],
                &[&["KRAS:p.Gly12", "3021", "pancreas|1200"]],
            ),
            HS_PROTEIN_ID,
        )
        .unwrap()
    }

    #[test]
    fn kras_gly12asp() -> Result<(), anyhow::Error> {
        let groups = refgene_groups();
        let (cytobands, hotspots) = (cytobands(), hotspots());
        let lookups = SomaticLookups::new(&cytobands, groups.lookup_specs()?, &hotspots)?;
        let variants = vec![variant("1", "KRAS", "c.35G>A;p.Gly12Asp", "0.3")];

        let records = process(&variants, &lookups)?.unwrap();

        let record = &records[0];
        assert_eq!(record.c_dot, "c.35G>A");
        assert_eq!(record.p_dot, "Gly12Asp");
        assert_eq!(record.mtbp_c_dot(), "KRAS:c.35G>A");
        assert_eq!(record.mtbp_p_dot(), "KRAS:Gly12Asp");
        assert_eq!(record.hotspot_key, "KRAS:p.Gly12");
        assert_eq!(record.annotations["HS_Sample"], "3021");
        assert_eq!(record.annotations["HS_Tumour"], "pancreas|1200");
        assert_eq!(record.annotations["Cyto"], "12p12.1");
        assert_eq!(record.annotations["COSMIC Driver"], "OG");
        assert_eq!(record.annotations["Paed Driver"], GENE_NOT_FOUND);
        assert_eq!(record.annotations["COSMIC Entities"], "Lung");
        assert!(record.vaf.is_some_and(|vaf| approx_eq!(f64, vaf, 0.3)));
        assert_eq!(record.loh, "");
        assert_eq!(record.error_flag, "");

        Ok(())
    }

    #[test]
    fn missing_protein_change() -> Result<(), anyhow::Error> {
        let groups = refgene_groups();
        let (cytobands, hotspots) = (cytobands(), hotspots());
        let lookups = SomaticLookups::new(&cytobands, groups.lookup_specs()?, &hotspots)?;
        let variants = vec![variant("1", "TP53", "c.375+1G>A", "0.25")];

        let records = process(&variants, &lookups)?.unwrap();

        assert_eq!(records[0].p_dot, "");
        assert_eq!(records[0].mtbp_p_dot(), "");
        assert_eq!(records[0].annotations["HS_Sample"], NOT_APPLICABLE);
        assert_eq!(records[0].annotations["COSMIC Entities"], NOT_APPLICABLE);

        Ok(())
    }

    #[test]
    fn vaf_loh_and_error_flag() -> Result<(), anyhow::Error> {
        let groups = refgene_groups();
        let (cytobands, hotspots) = (cytobands(), hotspots());
        let lookups = SomaticLookups::new(&cytobands, groups.lookup_specs()?, &hotspots)?;
        let mut with_loh = variant("1", "KRAS", "c.35G>A;p.Gly12Asp", "0.3;0.1");
        with_loh.consequences = "missense_variant;low_quality".to_owned();
        let variants = vec![with_loh, variant("1", "TP53", "c.524G>A;p.Arg175His", "0.5")];

        let records = process(&variants, &lookups)?.unwrap();

        assert_eq!(records[0].gene, "TP53");
        assert_eq!(records[0].loh, "");
        assert_eq!(records[1].loh, "0.1");
        assert_eq!(records[1].consequences, "missense_variant");
        assert_eq!(records[1].error_flag, "low_quality");

        Ok(())
    }

    #[test]
    fn sorted_by_domain_then_vaf_descending() -> Result<(), anyhow::Error> {
        let groups = refgene_groups();
        let (cytobands, hotspots) = (cytobands(), hotspots());
        let lookups = SomaticLookups::new(&cytobands, groups.lookup_specs()?, &hotspots)?;
        let variants = vec![
            variant("2", "A", "c.1A>G", "0.9"),
            variant("1", "B", "c.1A>G", "0.2"),
            variant("1", "C", "c.1A>G", "0.7"),
        ];

        let records = process(&variants, &lookups)?.unwrap();

        assert_eq!(
            records.iter().map(|r| r.gene.as_str()).collect::<Vec<_>>(),
            vec!["C", "B", "A"]
        );

        Ok(())
    }

    #[test]
    fn missing_vaf_is_kept_and_sorted_last() -> Result<(), anyhow::Error> {
        let groups = refgene_groups();
        let (cytobands, hotspots) = (cytobands(), hotspots());
        let lookups = SomaticLookups::new(&cytobands, groups.lookup_specs()?, &hotspots)?;
        let variants = vec![
            variant("1", "A", "c.1A>G", ""),
            variant("1", "B", "c.1A>G", "0.2"),
            variant("2", "C", "c.1A>G", "0.7"),
            variant("1", "D", "c.1A>G", "nan;0.1"),
        ];

        let records = process(&variants, &lookups)?.unwrap();
        let table = to_table(&records, &lookups);

        assert_eq!(
            records.iter().map(|r| r.gene.as_str()).collect::<Vec<_>>(),
            vec!["B", "A", "D", "C"]
        );
        assert_eq!(records[1].vaf, None);
        assert_eq!(records[2].loh, "0.1");
        assert_eq!(table.rows[1][9], Cell::default());

        Ok(())
    }

    #[test]
    fn invalid_vaf_fails() -> Result<(), anyhow::Error> {
        let groups = refgene_groups();
        let (cytobands, hotspots) = (cytobands(), hotspots());
        let lookups = SomaticLookups::new(&cytobands, groups.lookup_specs()?, &hotspots)?;
        let variants = vec![variant("1", "KRAS", "c.35G>A", "high")];

        let err = process(&variants, &lookups).unwrap_err();

        assert_eq!(
            err.downcast_ref::<ShapeError>(),
            Some(&ShapeError::InvalidVaf("high".to_owned()))
        );

        Ok(())
    }

    #[test]
    fn germline_only_is_no_data() -> Result<(), anyhow::Error> {
        let groups = refgene_groups();
        let (cytobands, hotspots) = (cytobands(), hotspots());
        let lookups = SomaticLookups::new(&cytobands, groups.lookup_specs()?, &hotspots)?;
        let mut germline = variant("1", "BRCA1", "c.68_69delAG", "0.5");
        germline.origin = "germline".to_owned();

        assert_eq!(process(&[germline], &lookups)?, None);

        Ok(())
    }

    #[test]
    fn table_columns() -> Result<(), anyhow::Error> {
        let groups = refgene_groups();
        let (cytobands, hotspots) = (cytobands(), hotspots());
        let lookups = SomaticLookups::new(&cytobands, groups.lookup_specs()?, &hotspots)?;
        let variants = vec![variant("1", "KRAS", "c.35G>A;p.Gly12Asp", "0.3")];
        let records = process(&variants, &lookups)?.unwrap();

        let table = to_table(&records, &lookups);

        assert_eq!(table.columns.len(), 16 + 12 + 2 + 2);
        assert_eq!(table.columns[3], "Cyto");
        assert_eq!(table.columns[9], "VAF");
        assert_eq!(table.columns[16], "COSMIC Driver");
        assert_eq!(table.columns[28], "HS_Sample");
        assert_eq!(table.columns[31], "MTBP p.");
        let row = &table.rows[0];
        assert_eq!(row[3], Cell::from("12p12.1"));
        assert_eq!(row[9], Cell::from(0.3));
        assert_eq!(row[30], Cell::from("KRAS:c.35G>A"));
        assert_eq!(row[31], Cell::from("KRAS:Gly12Asp"));

        Ok(())
    }
}
