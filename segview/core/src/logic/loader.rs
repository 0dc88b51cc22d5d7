//! SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::LoadError;
use crate::frame::{LabelRecord, read_label_records};
use crate::logic::catalog::{ClassCatalog, load_class_catalog};
use crate::logic::registry::VideoEntry;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// First path matching `pattern`, in lexicographic order.
pub fn resolve_first(pattern: &str) -> Result<PathBuf, LoadError> {
    let paths = glob::glob(pattern).map_err(|source| LoadError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    first_match(
        pattern,
        paths.map(|entry| entry.map_err(|e| (e.path().to_path_buf(), e.into_error()))),
    )
}

// Unreadable entries are skipped while anything matches; with no match the
// first of them is the reported error.
fn first_match(
    pattern: &str,
    entries: impl Iterator<Item = Result<PathBuf, (PathBuf, io::Error)>>,
) -> Result<PathBuf, LoadError> {
    let mut first: Option<PathBuf> = None;
    let mut unreadable: Option<(PathBuf, io::Error)> = None;

    for entry in entries {
        match entry {
            Ok(path) => {
                if first.as_ref().is_none_or(|f| path < *f) {
                    first = Some(path);
                }
            }
            Err((path, source)) => {
                debug!("{pattern}: cannot read {}: {source}", path.display());
                unreadable.get_or_insert((path, source));
            }
        }
    }

    match (first, unreadable) {
        (Some(path), _) => Ok(path),
        (None, Some((path, source))) => Err(LoadError::Io { path, source }),
        (None, None) => Err(LoadError::NotFound {
            pattern: pattern.to_string(),
        }),
    }
}

/// Loads one video: its label CSV, the dataset's shared catalog and its image folder.
pub fn load_video(
    labels_pattern: &str,
    images_pattern: &str,
    catalog: Arc<ClassCatalog>,
    base_url: impl Into<String>,
) -> Result<VideoEntry, LoadError> {
    let labels_path = resolve_first(labels_pattern)?;
    let records = read_label_records(&labels_path)?;

    let image_root = resolve_first(images_pattern)?;
    if !image_root.is_dir() {
        return Err(LoadError::NotADirectory { path: image_root });
    }

    let missing = count_missing_images(&records, &image_root);
    if missing > 0 {
        warn!(
            "{missing} of {} frames in {} have no image under {}",
            records.len(),
            labels_path.display(),
            image_root.display()
        );
    }

    info!("{labels_pattern} loaded.");
    Ok(VideoEntry {
        records,
        catalog,
        image_root,
        base_url: base_url.into(),
    })
}

/// Loads a video together with its own copy of the class catalog.
pub fn load_video_with_mapping(
    labels_pattern: &str,
    mapping_path: impl AsRef<Path>,
    images_pattern: &str,
    base_url: impl Into<String>,
) -> Result<VideoEntry, LoadError> {
    let catalog = Arc::new(load_class_catalog(mapping_path)?);
    load_video(labels_pattern, images_pattern, catalog, base_url)
}

// Frames listed in the CSV whose image file is absent from the image root.
fn count_missing_images(records: &[LabelRecord], image_root: &Path) -> usize {
    let present: HashSet<String> = WalkDir::new(image_root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();

    records
        .iter()
        .filter(|r| !present.contains(&r.image))
        .count()
}
