//! Common functionality.

use std::path::Path;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

pub mod io;

/// Commonly used command line arguments.
#[derive(Parser, Debug)]
pub struct Args {
    /// Verbosity of the program
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            verbose: Verbosity::new(0, 0),
        }
    }
}

/// Marker for "gene is known but carries no data here" and for unused gene slots.
pub const NOT_APPLICABLE: &str = "-";

/// Marker for a lookup key that is absent from the reference table.
pub const GENE_NOT_FOUND: &str = "gene_not_found";

/// Number of letters in the spreadsheet column alphabet.
const ALPHABET: usize = 26;

/// Largest supported 0-based column index, i.e., `ZZ`.
pub const MAX_COLUMN_INDEX: usize = ALPHABET * ALPHABET + ALPHABET - 1;

/// Convert a 0-based column index into spreadsheet column letters.
///
/// Only one- and two-letter columns are supported, `0 -> A`, `25 -> Z`,
/// `26 -> AA` up to `701 -> ZZ`.
pub fn column_letter(index: usize) -> Result<String, anyhow::Error> {
    if index > MAX_COLUMN_INDEX {
        anyhow::bail!(
            "column index {} is outside of the supported range (max {})",
            index,
            MAX_COLUMN_INDEX
        );
    }

    let letter = |i: usize| char::from(b'A' + i as u8);
    if index < ALPHABET {
        Ok(letter(index).to_string())
    } else {
        let first = index / ALPHABET - 1;
        let second = index % ALPHABET;
        Ok(format!("{}{}", letter(first), letter(second)))
    }
}

/// Convert one or two spreadsheet column letters into a 0-based column index.
pub fn column_index(letters: &str) -> Result<usize, anyhow::Error> {
    let digits = letters
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() {
                Ok(c as usize - 'A' as usize)
            } else {
                Err(anyhow::anyhow!("invalid column letter {:?} in {:?}", c, letters))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    match digits.as_slice() {
        [single] => Ok(*single),
        [first, second] => Ok((first + 1) * ALPHABET + second),
        _ => anyhow::bail!(
            "only one or two letter columns are supported, got {:?}",
            letters
        ),
    }
}

/// Compute the output file stem from the common prefix of the input file names.
///
/// Trailing separators are trimmed from the prefix; `"output"` is used when
/// the inputs share nothing.
pub fn output_prefix<P: AsRef<Path>>(paths: &[P]) -> String {
    let names = paths
        .iter()
        .filter_map(|p| p.as_ref().file_name().and_then(|s| s.to_str()))
        .collect::<Vec<_>>();

    let prefix = match names.split_first() {
        None => "",
        Some((first, rest)) => {
            let len = rest.iter().fold(first.len(), |len, name| {
                first
                    .char_indices()
                    .zip(name.chars())
                    .take_while(|((_, a), b)| a == b)
                    .map(|((i, a), _)| i + a.len_utf8())
                    .last()
                    .unwrap_or(0)
                    .min(len)
            });
            &first[..len]
        }
    };

    let prefix = prefix.trim_end_matches(['-', '_', '.']);
    if prefix.is_empty() {
        "output".to_owned()
    } else {
        prefix.to_owned()
    }
}

/// Return the version of the `cancer-report-worker` crate and `x.y.z` in tests.
pub fn worker_version() -> &'static str {
    if cfg!(test) {
        "x.y.z"
    } else {
        env!("CARGO_PKG_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[rstest::rstest]
    #[case(0, "A")]
    #[case(6, "G")]
    #[case(25, "Z")]
    #[case(26, "AA")]
    #[case(28, "AC")]
    #[case(399, "OJ")]
    #[case(701, "ZZ")]
    fn column_letter_and_back(#[case] index: usize, #[case] letters: &str) -> Result<(), anyhow::Error> {
        assert_eq!(column_letter(index)?, letters);
        assert_eq!(column_index(letters)?, index);

        Ok(())
    }

    #[test]
    fn column_letter_out_of_range() {
        assert!(column_letter(702).is_err());
        assert!(column_letter(1000).is_err());
    }

    #[rstest::rstest]
    #[case("AAA")]
    #[case("")]
    #[case("a")]
    #[case("A1")]
    fn column_index_invalid(#[case] letters: &str) {
        assert!(column_index(letters).is_err());
    }

    #[rstest::rstest]
    #[case(&["S1-variants.csv", "S1-svs.csv", "S1-supplementary.html"], "S1")]
    #[case(&["dir/abc_1.csv", "other/abc_2.csv"], "abc")]
    #[case(&["x.csv", "y.csv"], "output")]
    #[case(&["sample.csv"], "sample.csv")]
    fn output_prefix_from_inputs(#[case] paths: &[&str], #[case] expected: &str) {
        assert_eq!(output_prefix(paths), expected);
    }
}
