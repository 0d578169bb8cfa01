//! Consistency checks between the inputs and the composed tables.

use std::{collections::BTreeSet, path::Path, sync::OnceLock};

use itertools::Itertools;
use regex::Regex;

use crate::{
    common::NOT_APPLICABLE,
    err::CheckError,
    input::variants::{ReportedStructuralVariant, ReportedVariant},
    process::{cnv::CnvKind, fusion, germline, somatic, Table},
    sheets::SheetName,
    split::{split_genes, split_optional_pair},
};

use super::Tables;

/// Separator of the fields of a variant key.
const KEY_SEPARATOR: &str = " - ";

/// File name suffixes following the sample ID.
fn input_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"[-_]reported_structural_variants(\..*)?\.csv(\.gz)?$",
            r"[-_]reported_variants(\..*)?\.csv(\.gz)?$",
            r"[-_.](.*\.)?supplementary\.html$",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("valid regex"))
        .collect()
    })
}

/// Sample ID in front of a known input suffix, `None` for other names.
pub fn sample_id<P: AsRef<Path>>(path: P) -> Option<String> {
    let name = path.as_ref().file_name()?.to_str()?;
    input_patterns()
        .iter()
        .find_map(|pattern| pattern.find(name))
        .map(|m| name[..m.start()].to_owned())
        .filter(|id| !id.is_empty())
}

/// The sample ID shared by all inputs that carry one.
///
/// Inputs of more than one sample are rejected.
pub fn check_sample_ids<P: AsRef<Path>>(paths: &[P]) -> Result<Option<String>, CheckError> {
    let ids = paths
        .iter()
        .filter_map(|path| {
            let id = sample_id(path);
            if id.is_none() {
                tracing::debug!("no sample ID in {:?}", path.as_ref());
            }
            id
        })
        .collect::<BTreeSet<_>>();

    match ids.len() {
        0 | 1 => Ok(ids.into_iter().next()),
        _ => Err(CheckError::SampleMismatch(ids.into_iter().collect())),
    }
}

/// Variants found only in the inputs or only in a sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discrepancy {
    pub sheet: String,
    pub input_only: Vec<String>,
    pub output_only: Vec<String>,
}

fn key<S: AsRef<str>>(fields: &[S]) -> String {
    fields.iter().map(AsRef::as_ref).join(KEY_SEPARATOR)
}

/// Keys of the table rows built from `columns`, empty without a table.
fn output_keys(table: Option<&Table>, columns: &[&str]) -> Result<BTreeSet<String>, anyhow::Error> {
    let Some(table) = table else {
        return Ok(BTreeSet::new());
    };
    let indices = columns
        .iter()
        .map(|column| {
            table
                .column_index(column)
                .ok_or_else(|| anyhow::anyhow!("no column {:?} to check in table", column))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(table
        .rows
        .iter()
        .map(|row| key(&indices.iter().map(|&i| row[i].to_string()).collect_vec()))
        .collect())
}

/// Key of a fusion row from its `Gene_N` and coordinate columns.
fn fusion_output_keys(table: Option<&Table>) -> Result<BTreeSet<String>, anyhow::Error> {
    let Some(table) = table else {
        return Ok(BTreeSet::new());
    };
    let gene_columns = table
        .columns
        .iter()
        .positions(|c| {
            c.strip_prefix("Gene_")
                .is_some_and(|n| n.chars().all(|c| c.is_ascii_digit()))
        })
        .collect_vec();
    let coordinates = table
        .column_index("GRCh38 coordinates")
        .ok_or_else(|| anyhow::anyhow!("no column \"GRCh38 coordinates\" to check in table"))?;

    Ok(table
        .rows
        .iter()
        .map(|row| {
            let genes = gene_columns
                .iter()
                .map(|&i| row[i].to_string())
                .filter(|gene| !gene.is_empty() && gene != NOT_APPLICABLE)
                .join(";");
            key(&[genes, row[coordinates].to_string()])
        })
        .collect())
}

fn compare(sheet: &str, input: BTreeSet<String>, output: BTreeSet<String>) -> Option<Discrepancy> {
    let input_only = input.difference(&output).cloned().collect_vec();
    let output_only = output.difference(&input).cloned().collect_vec();
    tracing::debug!(
        "{}: {} input and {} output variants",
        sheet,
        input.len(),
        output.len()
    );
    if input_only.is_empty() && output_only.is_empty() {
        None
    } else {
        Some(Discrepancy {
            sheet: sheet.to_owned(),
            input_only,
            output_only,
        })
    }
}

/// Compare the variants of every table with the input records selected for it.
pub fn compare_tables(
    variants: &[ReportedVariant],
    structural_variants: &[ReportedStructuralVariant],
    tables: &Tables,
) -> Result<Vec<Discrepancy>, anyhow::Error> {
    let mut result = Vec::new();

    let somatic = variants
        .iter()
        .filter(|v| somatic::is_somatic(v))
        .map(|v| {
            let (consequence, _) = split_optional_pair(&v.consequences);
            key(&[v.coordinates.as_str(), v.cds_protein.as_str(), consequence.as_str()])
        })
        .collect();
    result.extend(compare(
        &SheetName::Snv.to_string(),
        somatic,
        output_keys(
            tables.snv.as_ref(),
            &["GRCh38 coordinates", "Variant", "Predicted consequences"],
        )?,
    ));

    let germline = variants
        .iter()
        .filter(|v| germline::is_germline(v))
        .map(|v| key(&[v.coordinates.as_str(), v.cds_protein.as_str()]))
        .collect();
    result.extend(compare(
        &SheetName::Germline.to_string(),
        germline,
        output_keys(tables.germline.as_ref(), &["GRCh38 coordinates", "Variant"])?,
    ));

    for (kind, table) in [
        (CnvKind::Gain, tables.gain.as_ref()),
        (CnvKind::Loss, tables.loss.as_ref()),
    ] {
        let input = structural_variants
            .iter()
            .filter(|v| kind.matches(&v.sv_type))
            .map(|v| key(&[v.gene.trim(), v.coordinates.as_str()]))
            .collect();
        result.extend(compare(
            &kind.to_string(),
            input,
            output_keys(table, &["Gene", "GRCh38 coordinates"])?,
        ));
    }

    let fusions = structural_variants
        .iter()
        .filter(|v| fusion::is_fusion(v))
        .map(|v| -> Result<String, anyhow::Error> {
            let genes = split_genes(&v.gene)?
                .into_iter()
                .filter(|gene| !gene.is_empty() && gene != NOT_APPLICABLE)
                .join(";");
            Ok(key(&[genes, v.coordinates.clone()]))
        })
        .collect::<Result<BTreeSet<_>, _>>()?;
    result.extend(compare(
        &SheetName::Sv.to_string(),
        fusions,
        fusion_output_keys(tables.sv.as_ref())?,
    ));

    Ok(result)
}

/// Fail on any discrepancy between the inputs and the tables, logging the details.
pub fn check_tables(
    variants: &[ReportedVariant],
    structural_variants: &[ReportedStructuralVariant],
    tables: &Tables,
) -> Result<(), anyhow::Error> {
    let discrepancies = compare_tables(variants, structural_variants, tables)?;
    if discrepancies.is_empty() {
        tracing::info!("variants of all sheets match the inputs");
        return Ok(());
    }

    for discrepancy in &discrepancies {
        tracing::error!(
            "unequal variants in {}: input only [{}], output only [{}]",
            discrepancy.sheet,
            discrepancy.input_only.join(" | "),
            discrepancy.output_only.join(" | ")
        );
    }
    Err(CheckError::UnequalVariants(
        discrepancies.into_iter().map(|d| d.sheet).collect(),
    )
    .into())
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::process::Cell;

    #[rstest::rstest]
    #[case("case_1_reported_variants.csv", Some("case_1"))]
    #[case("S1-T-reported_variants.v2.csv", Some("S1-T"))]
    #[case("S1_reported_structural_variants.csv.gz", Some("S1"))]
    #[case("S1.v1.supplementary.html", Some("S1"))]
    #[case("case_1_supplementary.html", Some("case_1"))]
    #[case("clinvar.vcf.gz", None)]
    #[case("_reported_variants.csv", None)]
    fn sample_id_from_name(#[case] name: &str, #[case] expected: Option<&str>) {
        assert_eq!(sample_id(format!("data/{}", name)).as_deref(), expected);
    }

    #[test]
    fn inputs_of_one_sample() -> Result<(), anyhow::Error> {
        let paths = [
            "in/S1_reported_variants.csv",
            "in/S1_reported_structural_variants.csv",
            "in/S1.supplementary.html",
            "in/hotspots.csv",
        ];

        assert_eq!(check_sample_ids(&paths)?, Some("S1".to_owned()));

        Ok(())
    }

    #[test]
    fn inputs_of_two_samples() {
        let paths = ["S1_reported_variants.csv", "S2_reported_structural_variants.csv"];

        assert_eq!(
            check_sample_ids(&paths),
            Err(CheckError::SampleMismatch(vec![
                "S1".to_owned(),
                "S2".to_owned()
            ]))
        );
    }

    fn variants() -> Vec<ReportedVariant> {
        vec![
            ReportedVariant {
                origin: "somatic".to_owned(),
                gene: "KRAS".to_owned(),
                coordinates: "12:25245350;C/T".to_owned(),
                cds_protein: "c.35G>A;p.Gly12Asp".to_owned(),
                consequences: "missense_variant;low_quality".to_owned(),
                ..Default::default()
            },
            ReportedVariant {
                origin: "germline".to_owned(),
                gene: "BRCA2".to_owned(),
                coordinates: "13:32340300;CT/C".to_owned(),
                cds_protein: "c.5946del".to_owned(),
                ..Default::default()
            },
        ]
    }

    fn structural_variants() -> Vec<ReportedStructuralVariant> {
        vec![
            ReportedStructuralVariant {
                gene: "EGFR ".to_owned(),
                coordinates: "7:55019017-55211628".to_owned(),
                sv_type: "GAIN(4)".to_owned(),
                ..Default::default()
            },
            ReportedStructuralVariant {
                gene: "EML4;ALK".to_owned(),
                coordinates: "2:42522656;2:29192774".to_owned(),
                sv_type: "BND;EML4::ALK".to_owned(),
                ..Default::default()
            },
        ]
    }

    fn tables() -> Tables {
        let mut snv = Table::new(["GRCh38 coordinates", "Variant", "Predicted consequences"]);
        snv.push_row(vec![
            Cell::from("12:25245350;C/T"),
            Cell::from("c.35G>A;p.Gly12Asp"),
            Cell::from("missense_variant"),
        ]);
        let mut germline = Table::new(["Gene", "GRCh38 coordinates", "Variant"]);
        germline.push_row(vec![
            Cell::from("BRCA2"),
            Cell::from("13:32340300;CT/C"),
            Cell::from("c.5946del"),
        ]);
        let mut gain = Table::new(["Gene", "GRCh38 coordinates"]);
        gain.push_row(vec![Cell::from("EGFR"), Cell::from("7:55019017-55211628")]);
        let mut sv = Table::new(["Gene_1", "Gene_2", "Gene_3", "GRCh38 coordinates", "Cyto_1"]);
        sv.push_row(vec![
            Cell::from("EML4"),
            Cell::from("ALK"),
            Cell::from("-"),
            Cell::from("2:42522656;2:29192774"),
            Cell::from("2p21"),
        ]);

        Tables {
            germline: Some(germline),
            snv: Some(snv),
            gain: Some(gain),
            sv: Some(sv),
            ..Default::default()
        }
    }

    #[test]
    fn matching_tables() -> Result<(), anyhow::Error> {
        assert!(compare_tables(&variants(), &structural_variants(), &tables())?.is_empty());
        check_tables(&variants(), &structural_variants(), &tables())?;

        Ok(())
    }

    #[test]
    fn dropped_and_altered_rows() -> Result<(), anyhow::Error> {
        let mut tables = tables();
        tables.gain = None;
        if let Some(snv) = tables.snv.as_mut() {
            snv.rows[0][1] = Cell::from("c.35G>A");
        }

        let discrepancies = compare_tables(&variants(), &structural_variants(), &tables)?;

        assert_eq!(
            discrepancies,
            vec![
                Discrepancy {
                    sheet: "SNV".to_owned(),
                    input_only: vec!["12:25245350;C/T - c.35G>A;p.Gly12Asp - missense_variant".to_owned()],
                    output_only: vec!["12:25245350;C/T - c.35G>A - missense_variant".to_owned()],
                },
                Discrepancy {
                    sheet: "Gain".to_owned(),
                    input_only: vec!["EGFR - 7:55019017-55211628".to_owned()],
                    output_only: vec![],
                },
            ]
        );
        let err = check_tables(&variants(), &structural_variants(), &tables).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CheckError>(),
            Some(&CheckError::UnequalVariants(vec![
                "SNV".to_owned(),
                "Gain".to_owned()
            ]))
        );

        Ok(())
    }
}
