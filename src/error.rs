// Custom error types for the fatal (local) failure class.
//
// External failures (search API down, image URL unreachable) never become an
// AppError: the scraper and images modules swallow them and substitute the
// fallback dataset or a placeholder file. AppError is reserved for conditions
// the operator has to fix locally, like an unwritable CSV path or a corrupted
// file on reload.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("nothing to save: the record list is empty")]
    EmptyInput,

    #[error("unexpected CSV header in {path}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        path: PathBuf,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

pub type AppResult<T> = Result<T, AppError>;
