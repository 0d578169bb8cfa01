//! Implementation of `workbook build` subcommand.
//!
//! Loads the reported variants, the supplementary report and the reference
//! tables, shapes the variants into output tables and composes the layouts
//! of all sheets into a single JSON document for the workbook writer.
//! Inputs of different samples and tables that lost or altered input
//! variants fail the build before anything is written.

mod check;

use std::{io::Write, path::Path, time::Instant};

use serde::Serialize;
use strum::IntoEnumIterator;
use thousands::Separable;

use crate::{
    common::{io::open_write, output_prefix, worker_version},
    input::{
        clinvar::load_significances,
        html::SupplementaryReport,
        tables::TextTable,
        variants::{load_records, ReportedStructuralVariant, ReportedVariant},
    },
    lookup::LookupTable,
    process::{
        cnv::{self, CnvKind},
        fusion, germline,
        somatic::{self, SomaticLookups, CYTO_GENE, HS_PROTEIN_ID},
        Table,
    },
    refgene::RefgeneGroups,
    sheets::{
        self, bioinformatics::RunMetadata, summary::SourceTables, Sheet, SheetName,
    },
    xlink::link,
};

/// Command line arguments for `workbook build` sub command.
#[derive(clap::Parser, Debug, Clone)]
#[command(author, version, about = "Build the review workbook of a cancer genome report", long_about = None)]
pub struct Args {
    /// Path to the reported variants (CSV).
    #[clap(long)]
    pub path_reported_variants: String,
    /// Path to the reported structural variants (CSV).
    #[clap(long)]
    pub path_reported_structural_variants: String,
    /// Path to the supplementary HTML report.
    #[clap(long)]
    pub path_supplementary_html: String,
    /// Directory with the reference gene group tables.
    #[clap(long)]
    pub path_reference_gene_groups: String,
    /// Path to the hotspots table.
    #[clap(long)]
    pub path_hotspots: String,
    /// Path to the ClinVar VCF, optionally (b)gzip compressed.
    #[clap(long)]
    pub path_clinvar: String,
    /// Path to the cytological bands per gene.
    #[clap(long)]
    pub path_cytological_bands: String,
    /// Path to a PanelApp panel table, may be given more than once.
    #[clap(long, required = true)]
    pub path_panelapp: Vec<String>,
    /// Directory to write the workbook description to.
    #[clap(long, default_value = ".")]
    pub path_output_dir: String,
    /// Project the job runs in.
    #[clap(long, env = "DX_PROJECT_CONTEXT_ID")]
    pub project_id: Option<String>,
    /// Identifier of the job.
    #[clap(long, env = "DX_JOB_ID")]
    pub job_id: Option<String>,
    /// Version of the app running the worker.
    #[clap(long)]
    pub app_version: Option<String>,
}

/// The composed workbook as handed to the writer.
#[derive(Debug, Clone, Serialize)]
pub struct Workbook {
    pub worker_version: String,
    pub sheets: Vec<Sheet>,
}

/// Reference tables the variants are annotated from.
struct References {
    refgene: RefgeneGroups,
    hotspots: LookupTable,
    cytobands: LookupTable,
    panels: Vec<LookupTable>,
}

impl References {
    fn load(args: &Args) -> Result<Self, anyhow::Error> {
        let lookup = |path: &str, key: &str| -> Result<LookupTable, anyhow::Error> {
            let table = TextTable::from_path(path)
                .map_err(|e| anyhow::anyhow!("could not read table {:?}: {}", path, e))?;
            Ok(LookupTable::new(table, key)?)
        };

        Ok(Self {
            refgene: RefgeneGroups::load(&args.path_reference_gene_groups)?,
            hotspots: lookup(&args.path_hotspots, HS_PROTEIN_ID)?,
            cytobands: lookup(&args.path_cytological_bands, CYTO_GENE)?,
            panels: args
                .path_panelapp
                .iter()
                .map(|path| lookup(path, germline::PANELAPP_GENE))
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

/// The processed output tables, `None` for "no data".
#[derive(Debug, Default)]
pub struct Tables {
    pub germline: Option<Table>,
    pub snv: Option<Table>,
    pub gain: Option<Table>,
    pub loss: Option<Table>,
    pub sv: Option<Table>,
    /// Number of annotation groups of the SV table.
    pub sv_groups: usize,
    pub refgene: Table,
}

fn process_tables(
    args: &Args,
    references: &References,
    variants: &[ReportedVariant],
    structural_variants: &[ReportedStructuralVariant],
    sv_headers: &[String],
) -> Result<Tables, anyhow::Error> {
    let refgene_specs = references.refgene.lookup_specs()?;

    tracing::info!("processing germline variants...");
    let clinvar = load_significances(&args.path_clinvar, &germline::clinvar_ids(variants))?;
    let panelapp = germline::panelapp_specs(&references.panels)?;
    let germline = germline::process(variants, &clinvar, &panelapp);

    tracing::info!("processing somatic variants...");
    let somatic_lookups =
        SomaticLookups::new(&references.cytobands, refgene_specs.clone(), &references.hotspots)?;
    let snv = somatic::process(variants, &somatic_lookups)?;

    tracing::info!("processing structural variants...");
    let gain = cnv::process(structural_variants, CnvKind::Gain, &refgene_specs)?;
    let loss = cnv::process(structural_variants, CnvKind::Loss, &refgene_specs)?;
    let mut fusion_specs = refgene_specs.clone();
    fusion_specs.push(somatic_lookups.cyto.clone());
    let fusions = fusion::process(structural_variants, &fusion_specs)?;
    let population_header = fusion::population_header(sv_headers)?;

    tracing::info!("linking reference genes...");
    let mut refgene = references.refgene.combine()?;
    link(&mut refgene, snv.as_deref(), "SNV")?;
    link(&mut refgene, gain.as_deref(), &CnvKind::Gain.to_string())?;
    link(&mut refgene, loss.as_deref(), &CnvKind::Loss.to_string())?;
    link(&mut refgene, fusions.as_deref(), "SV")?;
    tracing::debug!(
        "{} reference genes with {} columns",
        refgene.len().separate_with_commas(),
        refgene.columns.len()
    );

    Ok(Tables {
        germline: germline.map(|records| germline::to_table(&records, &panelapp)),
        snv: snv.map(|records| somatic::to_table(&records, &somatic_lookups)),
        gain: gain.map(|records| cnv::to_table(&records, &refgene_specs)),
        loss: loss.map(|records| cnv::to_table(&records, &refgene_specs)),
        sv: fusions.map(|records| fusion::to_table(&records, &fusion_specs, &population_header)),
        sv_groups: fusion_specs.len(),
        refgene,
    })
}

/// Load all inputs and compose the sheets in output order.
///
/// Sheets of variant tables without data are left out.
pub fn build(args: &Args, metadata: &RunMetadata) -> Result<Workbook, anyhow::Error> {
    tracing::info!("loading inputs...");
    match check::check_sample_ids(&[
        &args.path_reported_variants,
        &args.path_reported_structural_variants,
        &args.path_supplementary_html,
    ])? {
        Some(sample_id) => tracing::info!("building workbook of sample {}", sample_id),
        None => tracing::warn!("no sample ID in the input file names"),
    }
    let variants = load_records::<ReportedVariant, _>(&args.path_reported_variants)?;
    let structural_variants =
        load_records::<ReportedStructuralVariant, _>(&args.path_reported_structural_variants)?;
    let report = SupplementaryReport::load(&args.path_supplementary_html)?;
    let report_tables = report.validate()?;
    let references = References::load(args)?;

    let tables = process_tables(
        args,
        &references,
        &variants.records,
        &structural_variants.records,
        &structural_variants.headers,
    )?;
    check::check_tables(&variants.records, &structural_variants.records, &tables)?;

    tracing::info!("composing sheets...");
    let mut result = Vec::new();
    for name in SheetName::iter() {
        let config = match name {
            SheetName::Soc => Some(sheets::soc::static_config()?),
            SheetName::Qc => Some(sheets::qc::config(&report_tables, report.tmb.as_deref())?),
            SheetName::Plot => Some(sheets::plot::config(&report.images)?),
            SheetName::Signatures => Some(sheets::signatures::config(&report.images)?),
            SheetName::Germline => tables.germline.as_ref().map(sheets::germline::config).transpose()?,
            SheetName::Snv => tables.snv.as_ref().map(sheets::snv::config).transpose()?,
            SheetName::Gain => tables
                .gain
                .as_ref()
                .map(|table| sheets::cnv::config(CnvKind::Gain, table))
                .transpose()?,
            SheetName::Loss => tables
                .loss
                .as_ref()
                .map(|table| sheets::cnv::config(CnvKind::Loss, table))
                .transpose()?,
            SheetName::Sv => tables
                .sv
                .as_ref()
                .map(|table| sheets::sv::config(table, tables.sv_groups))
                .transpose()?,
            SheetName::Summary => {
                let sources = SourceTables {
                    snv: tables.snv.as_ref(),
                    gain: tables.gain.as_ref(),
                    sv: tables.sv.as_ref(),
                    germline: tables.germline.as_ref(),
                };
                Some(sheets::summary::config(&sources, &report.images)?)
            }
            SheetName::Refgene => Some(sheets::refgene::config(&tables.refgene)?),
            SheetName::Bioinformatics => Some(sheets::bioinformatics::config(metadata)?),
        };
        match config {
            Some(config) => result.push(Sheet { name, config }),
            None => tracing::info!("no data for sheet {}, skipping", name),
        }
    }

    Ok(Workbook {
        worker_version: worker_version().to_owned(),
        sheets: result,
    })
}

/// Main entry point for `workbook build` sub command.
pub fn run(args_common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    let before_anything = Instant::now();
    tracing::info!("args_common = {:#?}", &args_common);
    tracing::info!("args = {:#?}", &args);

    let metadata = RunMetadata {
        project_id: args.project_id.clone(),
        job_id: args.job_id.clone(),
        app_version: args.app_version.clone(),
        refgene_file: Path::new(&args.path_reference_gene_groups)
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_owned),
        datetime: chrono::Local::now().fixed_offset(),
    };
    let workbook = build(args, &metadata)?;

    let prefix = output_prefix(&[
        &args.path_reported_variants,
        &args.path_reported_structural_variants,
        &args.path_supplementary_html,
    ]);
    let path_out = Path::new(&args.path_output_dir).join(format!("{}.json", prefix));
    tracing::info!("writing {} sheets to {:?}", workbook.sheets.len(), &path_out);
    let mut writer = open_write(&path_out)
        .map_err(|e| anyhow::anyhow!("could not open output file {:?}: {}", &path_out, e))?;
    serde_json::to_writer_pretty(&mut writer, &workbook)?;
    writer.flush()?;

    tracing::info!(
        "All of `workbook build` completed in {:?}",
        before_anything.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use itertools::Itertools;
    use pretty_assertions::assert_eq;

    use super::*;

    const DATA_DIR: &str = "tests/data/workbook";

    fn copy_dir(from: &Path, to: &Path) -> Result<(), anyhow::Error> {
        std::fs::create_dir_all(to)?;
        for entry in std::fs::read_dir(from)? {
            let entry = entry?;
            let target = to.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                copy_dir(&entry.path(), &target)?;
            } else {
                std::fs::copy(entry.path(), target)?;
            }
        }
        Ok(())
    }

    /// Copy the case inputs to `dir` and return the arguments pointing to them.
    fn case_args(dir: &Path) -> Result<Args, anyhow::Error> {
        copy_dir(Path::new(DATA_DIR), dir)?;
        let path = |name: &str| -> String { dir.join(name).to_string_lossy().into_owned() };

        Ok(Args {
            path_reported_variants: path("case_1_reported_variants.csv"),
            path_reported_structural_variants: path("case_1_reported_structural_variants.csv"),
            path_supplementary_html: path("case_1_supplementary.html"),
            path_reference_gene_groups: path("refgene"),
            path_hotspots: path("hotspots.csv"),
            path_clinvar: path("clinvar.vcf"),
            path_cytological_bands: path("cytobands.csv"),
            path_panelapp: vec![path("cancer_panel.csv")],
            path_output_dir: dir.to_string_lossy().into_owned(),
            project_id: Some("project-1".to_owned()),
            job_id: None,
            app_version: None,
        })
    }

    fn metadata(args: &Args) -> RunMetadata {
        RunMetadata {
            project_id: args.project_id.clone(),
            job_id: None,
            app_version: None,
            refgene_file: Some("refgene".to_owned()),
            datetime: chrono::Local::now().fixed_offset(),
        }
    }

    #[test]
    fn build_all_sheets() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = case_args(&tmp_dir)?;

        let workbook = build(&args, &metadata(&args))?;

        assert_eq!(
            workbook
                .sheets
                .iter()
                .map(|sheet| sheet.name)
                .collect::<Vec<_>>(),
            SheetName::iter().collect::<Vec<_>>()
        );
        assert_eq!(workbook.worker_version, "x.y.z");

        Ok(())
    }

    #[test]
    fn build_skips_sheets_without_data() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = case_args(&tmp_dir)?;
        let variants = std::fs::read_to_string(&args.path_reported_variants)?;
        std::fs::write(
            &args.path_reported_variants,
            variants
                .lines()
                .filter(|line| !line.starts_with("germline"))
                .join("\n"),
        )?;

        let workbook = build(&args, &metadata(&args))?;

        assert!(workbook.sheets.iter().all(|sheet| sheet.name != SheetName::Germline));
        assert_eq!(workbook.sheets.len(), 11);

        Ok(())
    }

    #[test]
    fn run_writes_json_named_after_inputs() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = case_args(&tmp_dir)?;

        run(&crate::common::Args::default(), &args)?;

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(tmp_dir.join("case_1.json"))?)?;
        let sheets = json["sheets"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("sheets is not an array"))?;
        let cells_of = |name: &str| {
            sheets
                .iter()
                .find(|sheet| sheet["name"] == name)
                .map(|sheet| &sheet["config"]["cells_to_write"])
        };
        let mut overview = vec![sheets
            .iter()
            .map(|sheet| sheet["name"].as_str().unwrap_or_default())
            .join(", ")];
        for (sheet, cells) in [
            ("Germline", &["A5", "I5"][..]),
            ("SNV", &["B2", "B3", "B4", "J2", "J3", "J4"][..]),
            ("Gain", &["B2", "B3"][..]),
            ("Loss", &["B2", "B3"][..]),
            ("SV", &["B2", "C2"][..]),
            ("Bioinformatics", &["A2"][..]),
        ] {
            for cell in cells {
                let value = cells_of(sheet).map(|cells| cells[cell].to_string());
                overview.push(format!("{} {} {}", sheet, cell, value.unwrap_or_default()));
            }
        }

        insta::assert_snapshot!(overview.join("\n"), @r###"
        SOC, QC, Plot, Signatures, Germline, SNV, Gain, Loss, SV, Summary, Refgene, Bioinformatics
        Germline A5 "BRCA2"
        Germline I5 "Pathogenic"
        SNV B2 "KRAS"
        SNV B3 "PIK3CA"
        SNV B4 "TP53"
        SNV J2 0.31
        SNV J3 ""
        SNV J4 0.52
        Gain B2 "MYC"
        Gain B3 "EGFR"
        Loss B2 "CDKN2A"
        Loss B3 "RB1"
        SV B2 "EML4"
        SV C2 "ALK"
        Bioinformatics A2 "project-1"
        "###);

        Ok(())
    }

    #[test]
    fn inputs_of_different_samples_fail_without_output() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let mut args = case_args(&tmp_dir)?;
        let renamed: PathBuf = tmp_dir.join("case_2_supplementary.html");
        std::fs::rename(&args.path_supplementary_html, &renamed)?;
        args.path_supplementary_html = renamed.to_string_lossy().into_owned();

        let err = run(&crate::common::Args::default(), &args).unwrap_err();

        assert_eq!(
            err.downcast_ref::<crate::err::CheckError>(),
            Some(&crate::err::CheckError::SampleMismatch(vec![
                "case_1".to_owned(),
                "case_2".to_owned()
            ]))
        );
        assert!(!tmp_dir.join("case.json").exists());

        Ok(())
    }

    #[test]
    fn missing_reference_group_fails_without_output() -> Result<(), anyhow::Error> {
        let tmp_dir = temp_testdir::TempDir::default();
        let args = case_args(&tmp_dir)?;
        std::fs::remove_file(Path::new(&args.path_reference_gene_groups).join("haem.csv"))?;

        assert!(run(&crate::common::Args::default(), &args).is_err());
        assert!(!tmp_dir.join("case_1.json").exists());

        Ok(())
    }
}
