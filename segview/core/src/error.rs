//! SPDX-License-Identifier: GPL-3.0-or-later

use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading one (dataset, video) pair at startup.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no file matches pattern {pattern}")]
    NotFound { pattern: String },

    #[error("invalid glob pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} has no `{column}` column", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("malformed csv {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("image root {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("invalid class grid: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

/// Failures answering a read against the loaded registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("unknown dataset `{0}`")]
    UnknownDataset(String),

    #[error("unknown video `{video}` in dataset `{dataset}`")]
    UnknownVideo { dataset: String, video: String },

    #[error("frame {index} out of range (video has {len} frames)")]
    IndexOutOfRange { index: usize, len: usize },
}
