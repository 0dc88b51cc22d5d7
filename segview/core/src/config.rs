//! SPDX-License-Identifier: GPL-3.0-or-later

use crate::logic::presence::MatchMode;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Datasets offered by the default layout. The menus list loaded datasets sorted by name.
pub const DEFAULT_DATASETS: [&str; 3] = ["gtea", "50salads", "breakfast"];

/// Video name and the `data_*` folder it is read from.
pub const DEFAULT_VIDEOS: [(&str, &str); 2] = [("video_a", "data_a"), ("video_b", "data_b")];

pub const DEFAULT_AUTOPLAY_INTERVAL_MS: u64 = 300;

/// Manual mode keeps the browser timer effectively idle (one day).
pub const MANUAL_INTERVAL_MS: u64 = 24 * 60 * 60 * 1000;

fn default_autoplay_interval() -> u64 {
    DEFAULT_AUTOPLAY_INTERVAL_MS
}

/// Which (dataset, video) pairs to load and how to read them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub match_mode: MatchMode,
    #[serde(default = "default_autoplay_interval")]
    pub autoplay_interval_ms: u64,
    #[serde(default, rename = "dataset")]
    pub datasets: Vec<DatasetConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetConfig {
    pub name: String,
    /// Class mapping file (`index name` pairs).
    pub mapping: PathBuf,
    #[serde(default, rename = "video")]
    pub videos: Vec<VideoConfig>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoConfig {
    pub name: String,
    /// Glob for the label CSV; the first match is used.
    pub labels: String,
    /// Glob for the frame image directory; the first match is used.
    pub images: String,
}

impl DashboardConfig {
    /// The `result/<dataset>/data_x/{label,image}/*` + `mapping/<dataset>.txt`
    /// layout under `data_root`.
    pub fn default_layout(data_root: impl AsRef<Path>) -> Self {
        let root = data_root.as_ref();
        let result = root.join("result");
        let mapping = root.join("mapping");

        let datasets = DEFAULT_DATASETS
            .iter()
            .map(|dataset| DatasetConfig {
                name: dataset.to_string(),
                mapping: mapping.join(format!("{dataset}.txt")),
                videos: DEFAULT_VIDEOS
                    .iter()
                    .map(|(video, folder)| {
                        let dir = result.join(dataset).join(folder);
                        VideoConfig {
                            name: video.to_string(),
                            labels: literal_base_pattern(&dir, "label/*"),
                            images: literal_base_pattern(&dir, "image/*"),
                        }
                    })
                    .collect(),
            })
            .collect();

        Self {
            match_mode: MatchMode::default(),
            autoplay_interval_ms: DEFAULT_AUTOPLAY_INTERVAL_MS,
            datasets,
        }
    }

    /// Parses TOML; relative paths are taken relative to `base_dir`.
    pub fn from_toml_str(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: Self = toml::from_str(text).context("parsing dashboard config")?;
        for dataset in &mut config.datasets {
            if dataset.mapping.is_relative() {
                dataset.mapping = base_dir.join(&dataset.mapping);
            }
            for video in &mut dataset.videos {
                video.labels = anchor_pattern(&video.labels, base_dir);
                video.images = anchor_pattern(&video.images, base_dir);
            }
        }
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&text, base_dir)
            .with_context(|| format!("loading config {}", path.display()))
    }
}

fn anchor_pattern(pattern: &str, base_dir: &Path) -> String {
    if Path::new(pattern).is_relative() {
        literal_base_pattern(base_dir, pattern)
    } else {
        pattern.to_string()
    }
}

// `base` is a real directory, so its glob metacharacters are escaped.
fn literal_base_pattern(base: &Path, pattern: &str) -> String {
    let base = glob::Pattern::escape(&base.to_string_lossy());
    Path::new(&base).join(pattern).to_string_lossy().into_owned()
}

/// Where the HTTP server listens and where it reads its page assets from.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub address: IpAddr,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: IpAddr::from([127, 0, 0, 1]),
            port: 8050,
            static_dir: PathBuf::from("static"),
        }
    }
}

impl ServerSettings {
    /// Defaults overridden by `SEGVIEW_ADDR`, `SEGVIEW_PORT` and `SEGVIEW_STATIC_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerSettings::from_env`] with variables read through `var`.
    /// Unparsable values fall back to the defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let address = var("SEGVIEW_ADDR")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.address);
        let port = var("SEGVIEW_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let static_dir = var("SEGVIEW_STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);
        Self {
            address,
            port,
            static_dir,
        }
    }
}
