//! SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::LoadError;
use crate::logic::presence::LabelSource;
use csv::{ReaderBuilder, StringRecord};
use log::debug;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// CSV column holding the frame image file name.
pub const IMAGE_COLUMN: &str = "image";
/// CSV column holding the ground-truth label.
pub const GROUND_TRUTH_COLUMN: &str = "gt";
/// CSV column holding the predicted label.
pub const PREDICTED_COLUMN: &str = "predict";

/// One row of per-frame segmentation output.
/// Loaded once at startup and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelRecord {
    pub image: String,
    pub ground_truth: String,
    pub predicted: String,
}

impl LabelRecord {
    pub fn new(
        image: impl Into<String>,
        ground_truth: impl Into<String>,
        predicted: impl Into<String>,
    ) -> Self {
        Self {
            image: image.into(),
            ground_truth: ground_truth.into(),
            predicted: predicted.into(),
        }
    }

    /// Label text for the requested column.
    pub fn label(&self, source: LabelSource) -> &str {
        match source {
            LabelSource::GroundTruth => &self.ground_truth,
            LabelSource::Predicted => &self.predicted,
        }
    }
}

/// Column positions resolved from the header row.
struct Columns {
    image: usize,
    ground_truth: usize,
    predicted: usize,
}

impl Columns {
    fn resolve(headers: &StringRecord, path: &Path) -> Result<Self, LoadError> {
        let find = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| LoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };
        Ok(Self {
            image: find(IMAGE_COLUMN)?,
            ground_truth: find(GROUND_TRUTH_COLUMN)?,
            predicted: find(PREDICTED_COLUMN)?,
        })
    }
}

/// Reads every row of a per-video label CSV, in file order.
///
/// The header must name `image`, `gt` and `predict`; other columns (such as the
/// unnamed index column pandas writes) are ignored.
pub fn read_label_records(path: impl AsRef<Path>) -> Result<Vec<LabelRecord>, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
    let columns = Columns::resolve(reader.headers().map_err(csv_err)?, path)?;

    let mut records = vec![];
    for row in reader.records() {
        let row = row.map_err(csv_err)?;
        let field = |idx: usize| row.get(idx).unwrap_or_default().to_string();
        records.push(LabelRecord {
            image: field(columns.image),
            ground_truth: field(columns.ground_truth),
            predicted: field(columns.predicted),
        });
    }

    debug!("read {} label rows from {}", records.len(), path.display());
    Ok(records)
}
