//! Records of the reported (structural) variant tables.

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use thousands::Separable;

use crate::common::io::open_csv;

/// Header of the population frequency column of reported variants.
pub const POPULATION_FREQUENCY: &str = "Population germline allele frequency (GE | gnomAD)";

/// Header of the population frequency column of reported structural variants.
pub const SV_POPULATION_FREQUENCY: &str =
    "Population germline allele frequency (GESG | GECG for somatic SVs or AF | AUC for germline CNVs)";

/// Alternative header of [`SV_POPULATION_FREQUENCY`] in reports of germline CNVs only.
pub const SV_POPULATION_FREQUENCY_ALT: &str =
    "Population germline allele frequency (AF | AUC for germline CNVs)";

/// One row of the reported variants table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportedVariant {
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "Domain", default)]
    pub domain: String,
    #[serde(rename = "Gene")]
    pub gene: String,
    #[serde(rename = "GRCh38 coordinates;ref/alt allele", default)]
    pub coordinates: String,
    #[serde(rename = "RefSeq IDs", default)]
    pub refseq_ids: String,
    #[serde(rename = "CDS change and protein change", default)]
    pub cds_protein: String,
    #[serde(rename = "Predicted consequences", default)]
    pub consequences: String,
    /// Kept as text, may carry the LOH as `"<vaf>;<loh>"`.
    #[serde(rename = "VAF", default)]
    pub vaf: String,
    #[serde(rename = "Population germline allele frequency (GE | gnomAD)", default)]
    pub population_frequency: String,
    #[serde(rename = "Alt allele/total read depth", default)]
    pub read_depth: String,
    #[serde(rename = "Genotype", default)]
    pub genotype: String,
    #[serde(
        rename = "ClinVar ID",
        default,
        deserialize_with = "deserialize_clinvar_id"
    )]
    pub clinvar_id: String,
    #[serde(rename = "Gene mode of action", default)]
    pub mode_of_action: String,
}

/// One row of the reported structural variants table.
///
/// The population frequency column has two possible names and is read as
/// either of them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ReportedStructuralVariant {
    #[serde(rename = "Event domain", default)]
    pub domain: String,
    #[serde(rename = "Impacted transcript region", default)]
    pub transcript_region: String,
    /// `;`-separated list of one to three genes.
    #[serde(rename = "Gene")]
    pub gene: String,
    #[serde(rename = "GRCh38 coordinates", default)]
    pub coordinates: String,
    #[serde(rename = "Chromosomal bands", default)]
    pub bands: String,
    #[serde(rename = "RefSeq IDs", default)]
    pub refseq_ids: String,
    /// Copy number event like `GAIN(3)` or fusion type with partners.
    #[serde(rename = "Type")]
    pub sv_type: String,
    #[serde(rename = "Size", default)]
    pub size: Option<f64>,
    #[serde(rename = "Confidence/support", default)]
    pub confidence_support: String,
    #[serde(
        rename = "Population germline allele frequency (GESG | GECG for somatic SVs or AF | AUC for germline CNVs)",
        alias = "Population germline allele frequency (AF | AUC for germline CNVs)",
        default
    )]
    pub population_frequency: String,
    #[serde(rename = "Gene mode of action", default)]
    pub mode_of_action: String,
}

/// Records read from a table together with the header line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records<T> {
    pub headers: Vec<String>,
    pub records: Vec<T>,
}

/// Normalize ClinVar IDs that went through a floating point conversion upstream.
fn deserialize_clinvar_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    let value = value.trim();
    Ok(value.strip_suffix(".0").unwrap_or(value).to_owned())
}

/// Read all records of a comma- or tab-separated file via serde.
pub fn load_records<T, P>(path: P) -> Result<Records<T>, anyhow::Error>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    tracing::debug!("reading records from {:?}", path.as_ref());
    let mut reader = open_csv(path.as_ref())?;
    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_owned())
        .collect::<Vec<_>>();
    reader.set_headers(csv::StringRecord::from(headers.clone()));

    let mut records = Vec::new();
    for (i, record) in reader.deserialize().enumerate() {
        let record: T = record.map_err(|e| {
            anyhow::anyhow!("problem reading record {} of {:?}: {}", i + 1, path.as_ref(), e)
        })?;
        records.push(record);
    }
    tracing::debug!(
        "read {} records from {:?}",
        records.len().separate_with_commas(),
        path.as_ref()
    );

    Ok(Records { headers, records })
}
