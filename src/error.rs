use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed catalog {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed exercise log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid date '{value}' on line {line}, expected YYYY-MM-DD")]
    InvalidDate { line: u64, value: String },

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
