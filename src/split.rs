//! Splitting of the compound fields found in the reported (structural) variant tables.
//!
//! All functions here are total on well-formed text except where the field
//! cannot be classified at all (copy number) or carries more entries than the
//! output schema can hold (genes, fusion partners).  These cases are reported
//! as [`ShapeError`] and abort the run.

use std::sync::OnceLock;

use regex::Regex;
use thousands::Separable;

use crate::err::ShapeError;

/// Maximal number of genes in the `Gene` field of a structural variant.
pub const MAX_GENES: usize = 3;

/// Maximal number of fusion partners following the type in the `Type` field.
pub const MAX_FUSION_PARTNERS: usize = 2;

/// Delimiter between sub-values of compound fields.
const DELIMITER: char = ';';

/// Split `"<cds>;p.<protein>"` into c. and p. notation.
///
/// The split happens at the first `;p.`, which is removed.  A value without
/// a non-empty protein change stays whole and gives an empty protein change.
pub fn split_cds_protein(value: &str) -> (String, String) {
    match value.split_once(";p.") {
        Some((cds, protein)) if !protein.is_empty() => (cds.to_owned(), protein.to_owned()),
        _ => (value.to_owned(), String::new()),
    }
}

/// Inverse of [`split_cds_protein`].
pub fn join_cds_protein(c_dot: &str, p_dot: &str) -> String {
    if p_dot.is_empty() {
        c_dot.to_owned()
    } else {
        format!("{}{}p.{}", c_dot, DELIMITER, p_dot)
    }
}

/// Truncate `GENE:p.Leu40Arg` to `GENE:p.Leu40` for keying into the hotspot database.
///
/// Strings not following the pattern are returned unchanged.
pub fn hotspot_protein_key(value: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r":p\.[A-Za-z]+[0-9]+").expect("valid regex"));

    match re.find(value) {
        Some(m) => value[..m.end()].to_owned(),
        None => value.to_owned(),
    }
}

/// Split `"<GE frequency>|<gnomAD frequency>"` at the first `|`.
///
/// Whitespace is kept so that the parts can be joined back; a missing side is
/// an empty string.
pub fn split_population_frequency(value: &str) -> (String, String) {
    match value.split_once('|') {
        Some((ge, gnomad)) => (ge.to_owned(), gnomad.to_owned()),
        None => (value.to_owned(), String::new()),
    }
}

/// Split `"<value>;<extra>"` at the first `;`, used for VAF/LOH and consequence/error flag.
///
/// Values without a delimiter are not exploded: the extra part is empty.
pub fn split_optional_pair(value: &str) -> (String, String) {
    match value.split_once(DELIMITER) {
        Some((value, extra)) => (value.to_owned(), extra.to_owned()),
        None => (value.to_owned(), String::new()),
    }
}

/// Split `"GAIN(3)"` into the event type and the integer copy number.
pub fn split_copy_number(value: &str) -> Result<(String, u32), ShapeError> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\s*([^()]*?)\s*\(\s*(\d+)\s*\)\s*$").expect("valid regex")
    });

    let malformed = || ShapeError::MalformedCopyNumber(value.to_owned());
    let captures = re.captures(value).ok_or_else(malformed)?;
    let sv_type = captures[1].to_owned();
    if sv_type.is_empty() {
        return Err(malformed());
    }
    let copy_number = captures[2].parse::<u32>().map_err(|_| malformed())?;

    Ok((sv_type, copy_number))
}

/// Number of `;`-delimited entries in `value`.
pub fn cardinality(value: &str) -> usize {
    value.matches(DELIMITER).count() + 1
}

/// Split the `;`-delimited gene list of a structural variant.
pub fn split_genes(value: &str) -> Result<Vec<String>, ShapeError> {
    let found = cardinality(value);
    if found > MAX_GENES {
        return Err(ShapeError::TooManyGenes {
            value: value.to_owned(),
            found,
            max: MAX_GENES,
        });
    }

    Ok(value.split(DELIMITER).map(|s| s.trim().to_owned()).collect())
}

/// Split the `Type` field of a fusion into the type and its fusion partners.
pub fn split_fusion_type(value: &str) -> Result<(String, Vec<String>), ShapeError> {
    let found = cardinality(value) - 1;
    if found > MAX_FUSION_PARTNERS {
        return Err(ShapeError::TooManyFusions {
            value: value.to_owned(),
            found,
            max: MAX_FUSION_PARTNERS,
        });
    }

    let mut parts = value.split(DELIMITER).map(|s| s.trim().to_owned());
    let sv_type = parts.next().unwrap_or_default();
    Ok((sv_type, parts.collect()))
}

/// Extract paired (`PR-`) and split (`SR-`) read support from `Confidence/support`.
///
/// The entries are matched by prefix so their order does not matter; absent
/// entries give an empty string.
pub fn split_confidence_support(value: &str) -> (String, String) {
    let mut paired = String::new();
    let mut split = String::new();

    for part in value.split(DELIMITER).map(str::trim) {
        if let Some(counts) = part.strip_prefix("PR-") {
            paired = counts.to_owned();
        } else if let Some(counts) = part.strip_prefix("SR-") {
            split = counts.to_owned();
        }
    }

    (paired, split)
}

/// Inverse of [`split_confidence_support`], paired reads first.
pub fn join_confidence_support(paired: &str, split: &str) -> String {
    let mut parts = Vec::new();
    if !paired.is_empty() {
        parts.push(format!("PR-{}", paired));
    }
    if !split.is_empty() {
        parts.push(format!("SR-{}", split));
    }
    parts.join(&DELIMITER.to_string())
}

/// Split `"<start band>;<end band>"` of an event spanning several bands.
pub fn split_band_range(value: &str) -> (String, String) {
    split_optional_pair(value)
}

/// Render a number with thousands separators, rounded to zero decimals.
pub fn format_thousands(value: f64) -> String {
    (value.round() as i64).separate_with_commas()
}

/// Render a size with [`format_thousands`], missing sizes are empty.
pub fn format_size(size: Option<f64>) -> String {
    match size {
        Some(size) if size.is_finite() => format_thousands(size),
        _ => String::new(),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("c.35G>A;p.Gly12Asp", "c.35G>A", "Gly12Asp")]
    #[case("c.68_69delAG", "c.68_69delAG", "")]
    #[case("c.1;p.Leu40Arg;p.Leu41Arg", "c.1", "Leu40Arg;p.Leu41Arg")]
    #[case("c.1;pX", "c.1;pX", "")]
    #[case("c.1;p.", "c.1;p.", "")]
    #[case("", "", "")]
    fn cds_protein_split_and_rejoin(
        #[case] value: &str,
        #[case] c_dot: &str,
        #[case] p_dot: &str,
    ) {
        let split = split_cds_protein(value);

        assert_eq!(split, (c_dot.to_owned(), p_dot.to_owned()));
        assert_eq!(join_cds_protein(&split.0, &split.1), value);
    }

    #[rstest]
    #[case("NRAS:p.Gln61Arg", "NRAS:p.Gln61")]
    #[case("gene1:p.Leu40Arg", "gene1:p.Leu40")]
    #[case("BRAF:p.Val600_Lys601delinsGlu", "BRAF:p.Val600")]
    #[case("gene1:", "gene1:")]
    #[case("gene1:c.35G>A", "gene1:c.35G>A")]
    fn hotspot_key(#[case] value: &str, #[case] expected: &str) {
        assert_eq!(hotspot_protein_key(value), expected);
    }

    #[rstest]
    #[case("0.01|0.02", "0.01", "0.02")]
    #[case("0.1 | 0.2", "0.1 ", " 0.2")]
    #[case("- | -", "- ", " -")]
    #[case("", "", "")]
    fn population_frequency_split_and_rejoin(
        #[case] value: &str,
        #[case] ge: &str,
        #[case] gnomad: &str,
    ) {
        let (split_ge, split_gnomad) = split_population_frequency(value);

        assert_eq!((split_ge.as_str(), split_gnomad.as_str()), (ge, gnomad));
        if value.contains('|') {
            assert_eq!(format!("{}|{}", split_ge, split_gnomad), value);
        }
    }

    #[rstest]
    #[case("0.3;0.1", "0.3", "0.1")]
    #[case("0.5", "0.5", "")]
    #[case("consequence3;consequence4", "consequence3", "consequence4")]
    #[case("missense_variant", "missense_variant", "")]
    fn optional_pair_split_and_rejoin(#[case] value: &str, #[case] first: &str, #[case] second: &str) {
        let (a, b) = split_optional_pair(value);

        assert_eq!((a.as_str(), b.as_str()), (first, second));
        let rejoined = if b.is_empty() { a } else { format!("{};{}", a, b) };
        assert_eq!(rejoined, value);
    }

    #[rstest]
    #[case("GAIN(4)", "GAIN", 4)]
    #[case("LOSS(1)", "LOSS", 1)]
    #[case("LOH(2)", "LOH", 2)]
    #[case("GAIN (12)", "GAIN", 12)]
    fn copy_number(#[case] value: &str, #[case] sv_type: &str, #[case] expected_copy_number: u32) -> Result<(), anyhow::Error> {
        assert_eq!(split_copy_number(value)?, (sv_type.to_owned(), expected_copy_number));

        Ok(())
    }

    #[rstest]
    #[case("GAIN")]
    #[case("GAIN()")]
    #[case("GAIN(x)")]
    #[case("(3)")]
    #[case("")]
    fn copy_number_malformed(#[case] value: &str) {
        assert_eq!(
            split_copy_number(value),
            Err(ShapeError::MalformedCopyNumber(value.to_owned()))
        );
    }

    #[rstest]
    #[case("gene1", &["gene1"])]
    #[case("gene2;gene3", &["gene2", "gene3"])]
    #[case("gene4;gene5;gene6", &["gene4", "gene5", "gene6"])]
    fn genes_within_bounds(#[case] value: &str, #[case] expected: &[&str]) -> Result<(), anyhow::Error> {
        assert_eq!(split_genes(value)?, expected);

        Ok(())
    }

    #[test]
    fn genes_above_bounds_fail() {
        assert_eq!(
            split_genes("g1;g2;g3;g4"),
            Err(ShapeError::TooManyGenes {
                value: "g1;g2;g3;g4".to_owned(),
                found: 4,
                max: 3,
            })
        );
    }

    #[rstest]
    #[case("BND", "BND", &[])]
    #[case("type1;type2", "type1", &["type2"])]
    #[case("type3;type4;type5", "type3", &["type4", "type5"])]
    fn fusion_type_within_bounds(
        #[case] value: &str,
        #[case] sv_type: &str,
        #[case] partners: &[&str],
    ) -> Result<(), anyhow::Error> {
        let (split_type, split_partners) = split_fusion_type(value)?;

        assert_eq!(split_type, sv_type);
        assert_eq!(split_partners, partners);

        Ok(())
    }

    #[test]
    fn fusion_type_above_bounds_fail() {
        assert_eq!(
            split_fusion_type("t;f1;f2;f3"),
            Err(ShapeError::TooManyFusions {
                value: "t;f1;f2;f3".to_owned(),
                found: 3,
                max: 2,
            })
        );
    }

    #[rstest]
    #[case("PR-1", "1", "")]
    #[case("SR-1", "", "1")]
    #[case("PR-1;SR-2", "1", "2")]
    #[case("SR-2;PR-1", "1", "2")]
    #[case("SR-16/216;PR-0/219", "0/219", "16/216")]
    #[case("", "", "")]
    fn confidence_support(#[case] value: &str, #[case] paired: &str, #[case] split: &str) {
        assert_eq!(
            split_confidence_support(value),
            (paired.to_owned(), split.to_owned())
        );
    }

    #[rstest]
    #[case("PR-0/219;SR-16/216")]
    #[case("PR-7/133")]
    #[case("SR-18/95")]
    fn confidence_support_rejoin(#[case] value: &str) {
        let (paired, split) = split_confidence_support(value);

        assert_eq!(join_confidence_support(&paired, &split), value);
    }

    #[rstest]
    #[case(Some(10.0), "10")]
    #[case(Some(200000.0), "200,000")]
    #[case(Some(1234567.4), "1,234,567")]
    #[case(None, "")]
    #[case(Some(f64::NAN), "")]
    fn size_formatting(#[case] size: Option<f64>, #[case] expected: &str) {
        assert_eq!(format_size(size), expected);
    }
}
