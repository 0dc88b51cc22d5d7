//! SPDX-License-Identifier: GPL-3.0-or-later

use crate::config::DashboardConfig;
use crate::error::{LoadError, LookupError};
use crate::frame::LabelRecord;
use crate::logic::catalog::{ClassCatalog, load_class_catalog};
use crate::logic::loader::load_video;
use crate::logic::presence::{LabelSource, MatchMode, PresenceGrid, build_presence};
use log::{debug, warn};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Everything loaded for one (dataset, video) pair.
#[derive(Debug, Clone)]
pub struct VideoEntry {
    pub records: Vec<LabelRecord>,
    pub catalog: Arc<ClassCatalog>,
    /// Directory the frame images are served from.
    pub image_root: PathBuf,
    /// URL prefix the frame image names are appended to.
    pub base_url: String,
}

impl VideoEntry {
    pub fn frame_count(&self) -> usize {
        self.records.len()
    }

    pub fn record(&self, index: usize) -> Result<&LabelRecord, LookupError> {
        self.records.get(index).ok_or(LookupError::IndexOutOfRange {
            index,
            len: self.records.len(),
        })
    }
}

/// A (dataset, video) pair that was skipped at startup.
#[derive(Debug)]
pub struct LoadFailure {
    pub dataset: String,
    pub video: String,
    pub error: Arc<LoadError>,
}

/// All loaded datasets, keyed dataset -> video. Built once, read-only afterwards.
#[derive(Debug, Default)]
pub struct DatasetRegistry {
    datasets: BTreeMap<String, BTreeMap<String, VideoEntry>>,
    match_mode: MatchMode,
}

/// URL prefix under which a video's frame images are served.
pub fn image_base_url(dataset: &str, video: &str) -> String {
    format!("/images/{dataset}/{video}")
}

impl DatasetRegistry {
    pub fn new(match_mode: MatchMode) -> Self {
        Self {
            datasets: BTreeMap::new(),
            match_mode,
        }
    }

    /// Loads every configured pair. A failing pair is logged and reported back
    /// without stopping the others.
    pub fn load(config: &DashboardConfig) -> (Self, Vec<LoadFailure>) {
        let mut registry = Self::new(config.match_mode);
        let mut failures = vec![];

        for dataset in &config.datasets {
            let catalog = match load_class_catalog(&dataset.mapping) {
                Ok(c) => Arc::new(c),
                Err(e) => {
                    warn!("dataset {}: {e}", dataset.name);
                    let error = Arc::new(e);
                    for video in &dataset.videos {
                        failures.push(LoadFailure {
                            dataset: dataset.name.clone(),
                            video: video.name.clone(),
                            error: Arc::clone(&error),
                        });
                    }
                    continue;
                }
            };

            for video in &dataset.videos {
                let loaded = load_video(
                    &video.labels,
                    &video.images,
                    Arc::clone(&catalog),
                    image_base_url(&dataset.name, &video.name),
                );
                match loaded {
                    Ok(entry) => registry.insert(&dataset.name, &video.name, entry),
                    Err(e) => {
                        warn!("skipping {}/{}: {e}", dataset.name, video.name);
                        failures.push(LoadFailure {
                            dataset: dataset.name.clone(),
                            video: video.name.clone(),
                            error: Arc::new(e),
                        });
                    }
                }
            }
        }

        (registry, failures)
    }

    /// Adds a loaded pair. Only used while the registry is being built.
    pub fn insert(&mut self, dataset: &str, video: &str, entry: VideoEntry) {
        self.datasets
            .entry(dataset.to_string())
            .or_default()
            .insert(video.to_string(), entry);
    }

    pub fn match_mode(&self) -> MatchMode {
        self.match_mode
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty()
    }

    /// Dataset names, sorted.
    pub fn datasets(&self) -> Vec<&str> {
        self.datasets.keys().map(String::as_str).collect()
    }

    /// Video names of one dataset, sorted.
    pub fn videos(&self, dataset: &str) -> Result<Vec<&str>, LookupError> {
        let videos = self
            .datasets
            .get(dataset)
            .ok_or_else(|| LookupError::UnknownDataset(dataset.to_string()))?;
        Ok(videos.keys().map(String::as_str).collect())
    }

    pub fn video(&self, dataset: &str, video: &str) -> Result<&VideoEntry, LookupError> {
        let videos = self
            .datasets
            .get(dataset)
            .ok_or_else(|| LookupError::UnknownDataset(dataset.to_string()))?;
        videos.get(video).ok_or_else(|| LookupError::UnknownVideo {
            dataset: dataset.to_string(),
            video: video.to_string(),
        })
    }

    pub fn get_frame_count(&self, dataset: &str, video: &str) -> Result<usize, LookupError> {
        Ok(self.video(dataset, video)?.frame_count())
    }

    pub fn frame_record(
        &self,
        dataset: &str,
        video: &str,
        frame_index: usize,
    ) -> Result<&LabelRecord, LookupError> {
        self.video(dataset, video)?.record(frame_index)
    }

    /// Browser URL of a frame's image: `<base_url>/<image>`.
    pub fn frame_image_url(
        &self,
        dataset: &str,
        video: &str,
        frame_index: usize,
    ) -> Result<String, LookupError> {
        let entry = self.video(dataset, video)?;
        let record = entry.record(frame_index)?;
        Ok(format!("{}/{}", entry.base_url, record.image))
    }

    pub fn get_frame_presence(
        &self,
        dataset: &str,
        video: &str,
        frame_index: usize,
        source: LabelSource,
    ) -> Result<PresenceGrid, LookupError> {
        let entry = self.video(dataset, video)?;
        let record = entry.record(frame_index)?;
        debug!("{dataset}/{video} frame {frame_index} {source}");
        Ok(build_presence(
            &entry.catalog,
            record.label(source),
            source,
            self.match_mode,
        ))
    }
}
