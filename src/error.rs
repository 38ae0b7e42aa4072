//! Typed errors for the library layer. The binary wraps these in `anyhow`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("reading settings from {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing settings from {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("writing {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialising report")]
    Json(#[from] serde_json::Error),
    #[error("writing CSV")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("no dataset with id {0}")]
    UnknownDataset(u64),
    #[error("dataset name must not be empty")]
    EmptyName,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("no report with id {0}")]
    UnknownReport(u64),
    #[error("report title must not be empty")]
    EmptyTitle,
}
