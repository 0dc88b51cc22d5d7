//! SPDX-License-Identifier: GPL-3.0-or-later

use crate::logic::catalog::{ClassCatalog, grid_rows};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which label column a presence grid is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSource {
    GroundTruth,
    Predicted,
}

impl LabelSource {
    pub fn title(self) -> &'static str {
        match self {
            LabelSource::GroundTruth => "Ground Truth",
            LabelSource::Predicted => "Predicted",
        }
    }

    /// Colours for absent and present cells.
    fn palette(self) -> (&'static str, &'static str) {
        match self {
            LabelSource::GroundTruth => ("#cce5ff", "#1a92c6"),
            LabelSource::Predicted => ("#ffe5cc", "#ff8000"),
        }
    }
}

impl fmt::Display for LabelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabelSource::GroundTruth => write!(f, "ground_truth"),
            LabelSource::Predicted => write!(f, "predicted"),
        }
    }
}

/// How a class name is compared with a frame's label text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Class name occurs anywhere in the label ("take" lights for "take_off").
    #[default]
    Substring,
    /// Class name equals the whole label, ignoring surrounding whitespace.
    Exact,
}

impl MatchMode {
    pub fn matches(self, class: &str, label: &str) -> bool {
        if class.is_empty() {
            return false;
        }
        match self {
            MatchMode::Substring => label.contains(class),
            MatchMode::Exact => label.trim() == class,
        }
    }
}

/// Per-frame presence of every catalog class, laid out like the catalog grid.
#[derive(Clone, Debug, PartialEq)]
pub struct PresenceGrid {
    pub source: LabelSource,
    pub cells: Array2<String>,
    pub present: Array2<bool>,
    pub hover: Array2<String>,
}

impl PresenceGrid {
    pub fn any_present(&self) -> bool {
        self.present.iter().any(|&p| p)
    }

    /// JSON shape handed to the browser heatmap.
    pub fn to_heatmap(&self) -> Heatmap {
        let (absent, present) = self.source.palette();
        Heatmap {
            title: self.source.title(),
            source: self.source,
            z: grid_rows(&self.present.mapv(u8::from)),
            annotation_text: grid_rows(&self.cells),
            hover_text: grid_rows(&self.hover),
            colorscale: [(0, absent), (1, present)],
            font_colors: ["#3c3636", "#efecee"],
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Heatmap {
    pub title: &'static str,
    pub source: LabelSource,
    pub z: Vec<Vec<u8>>,
    pub annotation_text: Vec<Vec<String>>,
    pub hover_text: Vec<Vec<String>>,
    pub colorscale: [(u8, &'static str); 2],
    pub font_colors: [&'static str; 2],
}

/// Hover text for a 0/1 presence score, e.g. "100.00% confidence".
pub fn confidence_text(present: bool) -> String {
    let score = if present { 1.0 } else { 0.0 };
    format!("{:.2}% confidence", score * 100.0)
}

/// Tests each catalog class against one frame label.
pub fn build_presence(
    catalog: &ClassCatalog,
    label: &str,
    source: LabelSource,
    mode: MatchMode,
) -> PresenceGrid {
    let present = catalog.grid().map(|class| mode.matches(class, label));
    let hover = present.map(|&p| confidence_text(p));
    PresenceGrid {
        source,
        cells: catalog.grid().clone(),
        present,
        hover,
    }
}
