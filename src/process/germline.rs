//! Germline small variants with ClinVar significance and panel membership.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::{
    input::variants::ReportedVariant,
    lookup::{annotate, Annotations, LookupSpec, LookupTable, SourceField},
    process::{Cell, Table, ACTIONABILITY},
    split::split_population_frequency,
};

/// Key column of PanelApp panel tables.
pub const PANELAPP_GENE: &str = "Gene Symbol";
/// Value column of PanelApp panel tables.
pub const PANELAPP_MODE: &str = "Formatted mode";

pub const CLNSIGCONF: &str = "clnsigconf";
pub const GNOMAD: &str = "gnomAD";
pub const VARIANT_CLASS: &str = "Variant Class";
pub const TUMOUR_VAF: &str = "Tumour VAF";

/// Output columns preceding the PanelApp annotations.
pub const COLUMNS: &[&str] = &[
    "Gene",
    "GRCh38 coordinates",
    "Variant",
    "Predicted consequences",
    "Genotype",
    VARIANT_CLASS,
    ACTIONABILITY,
    "Gene mode of action",
    CLNSIGCONF,
    GNOMAD,
    TUMOUR_VAF,
];

/// A processed germline variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GermlineRecord {
    pub gene: String,
    pub coordinates: String,
    pub variant: String,
    pub consequences: String,
    pub genotype: String,
    pub mode_of_action: String,
    /// Clinical significance, empty when the ID is not in ClinVar.
    pub clnsigconf: String,
    pub gnomad: String,
    /// One `PanelApp <panel>` entry per panel.
    pub panelapp: Annotations,
}

pub fn is_germline(variant: &ReportedVariant) -> bool {
    variant.origin.trim().to_lowercase() == "germline"
}

/// ClinVar IDs of the germline variants, for restricting the ClinVar scan.
pub fn clinvar_ids(variants: &[ReportedVariant]) -> HashSet<String> {
    variants
        .iter()
        .filter(|v| is_germline(v) && !v.clinvar_id.is_empty())
        .map(|v| v.clinvar_id.clone())
        .collect()
}

/// One lookup per PanelApp panel, named `PanelApp <panel>`.
pub fn panelapp_specs(panels: &[LookupTable]) -> Result<Vec<LookupSpec<'_>>, anyhow::Error> {
    panels
        .iter()
        .map(|panel| {
            Ok(LookupSpec::new(
                &format!("PanelApp {}", panel.name()),
                SourceField::Gene,
                panel,
                PANELAPP_MODE,
            )?)
        })
        .collect()
}

/// Select and annotate the germline variants; `None` if there are none.
pub fn process(
    variants: &[ReportedVariant],
    clinvar: &IndexMap<String, String>,
    panelapp: &[LookupSpec],
) -> Option<Vec<GermlineRecord>> {
    let records = variants
        .iter()
        .filter(|v| is_germline(v))
        .map(|v| {
            let (_, gnomad) = split_population_frequency(&v.population_frequency);
            GermlineRecord {
                gene: v.gene.clone(),
                coordinates: v.coordinates.clone(),
                variant: v.cds_protein.clone(),
                consequences: v.consequences.clone(),
                genotype: v.genotype.clone(),
                mode_of_action: v.mode_of_action.clone(),
                clnsigconf: clinvar.get(&v.clinvar_id).cloned().unwrap_or_default(),
                gnomad: gnomad.trim().to_owned(),
                panelapp: annotate(v.gene.as_str(), panelapp),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!("selected {} germline variants", records.len());
    if records.is_empty() {
        None
    } else {
        Some(records)
    }
}

/// Flatten into the germline output table.
pub fn to_table(records: &[GermlineRecord], panelapp: &[LookupSpec]) -> Table {
    let mut table = Table::new(
        COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(panelapp.iter().map(|spec| spec.output.clone())),
    );
    for record in records {
        let mut row = vec![
            Cell::from(&record.gene),
            Cell::from(&record.coordinates),
            Cell::from(&record.variant),
            Cell::from(&record.consequences),
            Cell::from(&record.genotype),
            Cell::default(),
            Cell::default(),
            Cell::from(&record.mode_of_action),
            Cell::from(&record.clnsigconf),
            Cell::from(&record.gnomad),
            Cell::default(),
        ];
        row.extend(
            panelapp
                .iter()
                .map(|spec| Cell::from(record.panelapp.get(&spec.output).cloned().unwrap_or_default())),
        );
        table.push_row(row);
    }
    table
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{common::GENE_NOT_FOUND, lookup::test::text_table};

    fn variant(origin: &str, gene: &str, clinvar_id: &str) -> ReportedVariant {
        ReportedVariant {
            origin: origin.to_owned(),
            gene: gene.to_owned(),
            coordinates: "17:43124027;AG/A".to_owned(),
            cds_protein: "c.68_69delAG".to_owned(),
            population_frequency: "0.01|0.02".to_owned(),
            genotype: "0/1".to_owned(),
            clinvar_id: clinvar_id.to_owned(),
            ..Default::default()
        }
    }

    fn panel() -> LookupTable {
        LookupTable::new(
            text_table(
                "Adult solid tumours",
                &["Gene Symbol", "Formatted mode"],
                &[&["BRCA1", "Monoallelic"]],
            ),
            PANELAPP_GENE,
        )
        .unwrap()
    }

    #[test]
    fn brca1_with_clinvar_significance() -> Result<(), anyhow::Error> {
        let variants = vec![
            variant("Germline", "BRCA1", "12345"),
            variant("somatic", "KRAS", ""),
        ];
        let clinvar = IndexMap::from([("12345".to_owned(), "Pathogenic".to_owned())]);
        let panels = vec![panel()];
        let specs = panelapp_specs(&panels)?;

        let records = process(&variants, &clinvar, &specs).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gene, "BRCA1");
        assert_eq!(records[0].variant, "c.68_69delAG");
        assert_eq!(records[0].gnomad, "0.02");
        assert_eq!(records[0].clnsigconf, "Pathogenic");
        assert_eq!(
            records[0].panelapp["PanelApp Adult solid tumours"],
            "Monoallelic"
        );

        let table = to_table(&records, &specs);
        assert_eq!(
            table.columns,
            vec![
                "Gene",
                "GRCh38 coordinates",
                "Variant",
                "Predicted consequences",
                "Genotype",
                "Variant Class",
                "Actionability",
                "Gene mode of action",
                "clnsigconf",
                "gnomAD",
                "Tumour VAF",
                "PanelApp Adult solid tumours",
            ]
        );
        assert!(table.column_index("GE").is_none());
        assert_eq!(table.rows[0][9], Cell::from("0.02"));

        Ok(())
    }

    #[test]
    fn unknown_clinvar_id_is_empty() -> Result<(), anyhow::Error> {
        let variants = vec![variant("germline", "TP53", "999")];
        let panels = vec![panel()];
        let specs = panelapp_specs(&panels)?;

        let records = process(&variants, &IndexMap::new(), &specs).unwrap();

        assert_eq!(records[0].clnsigconf, "");
        assert_eq!(
            records[0].panelapp["PanelApp Adult solid tumours"],
            GENE_NOT_FOUND
        );

        Ok(())
    }

    #[test]
    fn no_germline_variants_is_no_data() {
        let variants = vec![variant("somatic", "KRAS", "")];

        assert_eq!(process(&variants, &IndexMap::new(), &[]), None);
    }

    #[test]
    fn clinvar_ids_of_germline_only() {
        let variants = vec![
            variant("germline", "BRCA1", "12345"),
            variant("germline", "BRCA2", ""),
            variant("somatic", "KRAS", "777"),
        ];

        assert_eq!(
            clinvar_ids(&variants),
            HashSet::from(["12345".to_owned()])
        );
    }
}
