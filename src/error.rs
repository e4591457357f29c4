use std::io;
use thiserror::Error;

use crate::column::ColumnType;

/// Error type for the upload pipeline.
#[derive(Error, Debug)]
pub enum PeekError {
    /// IO error while reading or rewinding a stream.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// The input was empty or whitespace-only, so there is nothing to infer.
    #[error("blank input: no CSV content to analyze")]
    BlankInput,

    /// A file header does not exist in the table it is being loaded into.
    #[error("column {column:?} is not part of the table's schema")]
    SchemaMismatch {
        /// The offending header, as it appeared in the file.
        column: String,
    },

    /// The same header appeared more than once in the first row.
    #[error("duplicate header {column:?}")]
    DuplicateHeader {
        /// The repeated header name.
        column: String,
    },

    /// A cell failed authoritative conversion to its column's type.
    #[error("unable to convert {raw:?} to {expected}")]
    UnconvertableValue {
        /// The type the column was inferred (or declared) to hold.
        expected: ColumnType,
        /// The raw cell text that would not parse.
        raw: String,
    },

    /// A keyset failed validation.
    #[error("invalid keyset: {0}")]
    InvalidKeySet(String),

    /// The storage layer rejected an operation.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PeekError>;
