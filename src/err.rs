//! Error types for the failure classes that abort a workbook run.

/// The input violates the shape of a compound field.
///
/// These indicate an upstream data contract change and must be handled by
/// widening the schema, never by dropping data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    #[error("found {found} genes in {value:?} but at most {max} are supported")]
    TooManyGenes {
        value: String,
        found: usize,
        max: usize,
    },
    #[error("found {found} fusion partners in {value:?} but at most {max} are supported")]
    TooManyFusions {
        value: String,
        found: usize,
        max: usize,
    },
    #[error("could not split copy number from type {0:?}, expected e.g. \"GAIN(3)\"")]
    MalformedCopyNumber(String),
    #[error("could not interpret VAF {0:?} as a number")]
    InvalidVaf(String),
}

/// A header required for processing a table is absent.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    #[error("{header:?} is not present in table {table:?} and no alternative header is present")]
    MissingHeader { table: String, header: String },
    #[error("expected at least {expected} tables in {source_name} but found {found}")]
    MissingTable {
        source_name: String,
        expected: usize,
        found: usize,
    },
}

/// Two configuration values of different shape were merged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("cannot merge {left} with {right} at key {path:?}")]
    ShapeMismatch {
        path: String,
        left: &'static str,
        right: &'static str,
    },
}

/// Problems with the ClinVar resource.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClinvarError {
    #[error("multiple IDs {0:?} on a single ClinVar record")]
    MultipleIds(String),
    #[error("multiple clinical significances {significance:?} for ClinVar ID {id}")]
    MultipleSignificances { id: String, significance: String },
}

/// The composed workbook disagrees with its inputs.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error("input files belong to different samples {0:?}")]
    SampleMismatch(Vec<String>),
    #[error("unequal variants between inputs and sheets {0:?}")]
    UnequalVariants(Vec<String>),
}
