//! Clinical significance from the ClinVar VCF.

use std::{collections::HashSet, path::Path, time::Instant};

use indexmap::IndexMap;
use itertools::Itertools;
use noodles_vcf as vcf;
use thousands::Separable;
use vcf::record::info::field::{value::Array, Key, Value};

use crate::{common::io::open_input, err::ClinvarError};

/// String values of the INFO field `key`, empty if absent.
fn info_strings(record: &vcf::Record, key: &Key) -> Vec<String> {
    match record.info().get(key) {
        Some(Some(Value::String(value))) => vec![value.clone()],
        Some(Some(Value::Array(Array::String(values)))) => {
            values.iter().flatten().cloned().collect()
        }
        _ => Vec::new(),
    }
}

/// Clinical significance of a single ClinVar record.
///
/// `CLNSIGCONF` is preferred over `CLNSIG`; records with neither yield an
/// empty string.
pub fn clinical_significance(
    id: &str,
    clnsigconf: &[String],
    clnsig: &[String],
) -> Result<String, ClinvarError> {
    let present = |values: &[String]| values.iter().any(|v| !v.is_empty());
    let significance = if present(clnsigconf) {
        clnsigconf
    } else if present(clnsig) {
        clnsig
    } else {
        return Ok(String::new());
    };

    match significance {
        [value] => Ok(value.clone()),
        _ => Err(ClinvarError::MultipleSignificances {
            id: id.to_owned(),
            significance: significance.join(","),
        }),
    }
}

/// Load the clinical significance for the given ClinVar IDs.
///
/// IDs not found in the VCF are absent from the result.  A record carrying
/// more than one ID is rejected.
pub fn load_significances<P>(
    path: P,
    ids: &HashSet<String>,
) -> Result<IndexMap<String, String>, anyhow::Error>
where
    P: AsRef<Path>,
{
    tracing::debug!(
        "looking up {} ClinVar IDs in {:?}",
        ids.len(),
        path.as_ref()
    );
    let before_parsing = Instant::now();

    let mut reader = vcf::Reader::new(open_input(path.as_ref())?);
    let header = reader
        .read_header()
        .map_err(|e| anyhow::anyhow!("problem reading header of {:?}: {}", path.as_ref(), e))?;
    let key_clnsig: Key = "CLNSIG".parse()?;
    let key_clnsigconf: Key = "CLNSIGCONF".parse()?;

    let mut result = IndexMap::new();
    let mut count = 0usize;
    for record in reader.records(&header) {
        let record = record.map_err(|e| {
            anyhow::anyhow!("problem reading record {} of {:?}: {}", count + 1, path.as_ref(), e)
        })?;
        count += 1;

        let record_ids = record.ids().iter().map(|id| id.to_string()).collect_vec();
        let id = match record_ids.as_slice() {
            [] => continue,
            [id] => id,
            _ => return Err(ClinvarError::MultipleIds(record_ids.join(";")).into()),
        };
        if ids.contains(id) {
            let significance = clinical_significance(
                id,
                &info_strings(&record, &key_clnsigconf),
                &info_strings(&record, &key_clnsig),
            )?;
            result.insert(id.clone(), significance);
        }
    }

    tracing::debug!(
        "found {} of {} ClinVar IDs in {} records in {:?}",
        result.len(),
        ids.len(),
        count.separate_with_commas(),
        before_parsing.elapsed()
    );

    Ok(result)
}
