//! SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::LoadError;
use ndarray::{Array2, Axis, ShapeError};
use std::fs;
use std::path::Path;

/// Number of rows every class grid is laid out in.
pub const GRID_ROWS: usize = 2;

/// Fills the last cell when the class count is odd. Never matches a label.
pub const PADDING: &str = "";

/// Ordered action classes of one dataset, plus their 2-row display grid.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassCatalog {
    names: Vec<String>,
    grid: Array2<String>,
}

impl ClassCatalog {
    /// Pads `names` to an even length, reshapes row-major into
    /// `GRID_ROWS x ceil(n/2)` and flips the rows for display.
    pub fn new(names: Vec<String>) -> Result<Self, ShapeError> {
        let mut padded = names.clone();
        if padded.len() % GRID_ROWS != 0 {
            padded.push(PADDING.to_string());
        }
        let columns = padded.len() / GRID_ROWS;

        let mut grid = Array2::from_shape_vec((GRID_ROWS, columns), padded)?;
        grid.invert_axis(Axis(0));

        Ok(Self { names, grid })
    }

    /// Class names in mapping-file order, without padding.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn n_classes(&self) -> usize {
        self.names.len()
    }

    pub fn columns(&self) -> usize {
        self.grid.ncols()
    }

    /// Display grid; row 0 holds the second half of the catalog.
    pub fn grid(&self) -> &Array2<String> {
        &self.grid
    }
}

/// Splits a mapping file into alternating `index name` tokens and keeps the names.
pub fn parse_class_mapping(text: &str, path: &Path) -> Result<Vec<String>, LoadError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() % 2 != 0 {
        return Err(LoadError::Parse {
            path: path.to_path_buf(),
            reason: format!("{} tokens, expected `index name` pairs", tokens.len()),
        });
    }

    tokens
        .chunks_exact(2)
        .map(|pair| {
            pair[0].parse::<i64>().map_err(|_| LoadError::Parse {
                path: path.to_path_buf(),
                reason: format!("class index `{}` is not an integer", pair[0]),
            })?;
            Ok(pair[1].to_string())
        })
        .collect()
}

pub fn load_class_catalog(path: impl AsRef<Path>) -> Result<ClassCatalog, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let names = parse_class_mapping(&text, path)?;
    Ok(ClassCatalog::new(names)?)
}

/// Row-major nested vectors, the shape the browser's heatmap expects.
pub fn grid_rows<T: Clone>(grid: &Array2<T>) -> Vec<Vec<T>> {
    grid.rows().into_iter().map(|row| row.to_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> ClassCatalog {
        ClassCatalog::new(names.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn even_count_has_no_padding() {
        let c = catalog(&["take", "open", "pour", "close"]);
        assert_eq!(c.grid().dim(), (2, 2));
        assert_eq!(c.n_classes(), 4);
        assert!(c.grid().iter().all(|cell| cell != PADDING));
    }

    #[test]
    fn odd_count_pads_one_cell() {
        let c = catalog(&["take", "open", "pour"]);
        assert_eq!(c.grid().dim(), (2, 2));
        assert_eq!(c.n_classes(), 3);
        assert_eq!(c.grid().iter().filter(|cell| *cell == PADDING).count(), 1);
    }

    #[test]
    fn rows_are_flipped_for_display() {
        let c = catalog(&["a", "b", "c", "d", "e"]);
        assert_eq!(
            grid_rows(c.grid()),
            vec![vec!["d", "e", ""], vec!["a", "b", "c"]]
        );

        let mut unflipped = c.grid().clone();
        unflipped.invert_axis(Axis(0));
        let flat: Vec<&str> = unflipped.iter().map(String::as_str).collect();
        assert_eq!(flat, vec!["a", "b", "c", "d", "e", ""]);
    }

    #[test]
    fn empty_catalog_has_zero_columns() {
        let c = catalog(&[]);
        assert_eq!(c.grid().dim(), (2, 0));
        assert_eq!(c.columns(), 0);
    }

    #[test]
    fn mapping_keeps_name_tokens_in_order() {
        let names = parse_class_mapping("0 take\n1 open\n2 shake\n", Path::new("m.txt")).unwrap();
        assert_eq!(names, vec!["take", "open", "shake"]);
    }

    #[test]
    fn mapping_rejects_dangling_token() {
        let err = parse_class_mapping("0 take\n1\n", Path::new("m.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn mapping_rejects_non_integer_index() {
        let err = parse_class_mapping("zero take\n", Path::new("m.txt")).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn missing_mapping_file_is_io_error() {
        let err = load_class_catalog("/nonexistent/segview/mapping.txt").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
