//! SPDX-License-Identifier: GPL-3.0-or-later
#![allow(dead_code)]

use segview::DashboardConfig;
use segview::config::{DatasetConfig, VideoConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const GTEA_MAPPING: &str = "0 take\n1 open\n2 pour\n3 close\n4 scoop\n";

pub const VIDEO_A_CSV: &str = ",image,gt,predict
0,img_0000.png,take,take
1,img_0001.png,take,open
2,img_0002.png,pour,pour
3,img_0003.png,background,scoop
";

/// Writes `datas/result/<dataset>/<folder>/{label,image/frames}` and
/// `datas/mapping/<dataset>.txt` in the default layout.
pub fn write_video(root: &Path, dataset: &str, folder: &str, csv: &str) {
    let dir = root.join("result").join(dataset).join(folder);
    fs::create_dir_all(dir.join("label")).unwrap();
    fs::write(dir.join("label").join("result.csv"), csv).unwrap();
    let frames = dir.join("image").join("frames");
    fs::create_dir_all(&frames).unwrap();

    let mut lines = csv.lines();
    let header = lines.next().unwrap_or_default();
    let Some(column) = header.split(',').position(|h| h == "image") else {
        return;
    };
    for line in lines {
        let image = line.split(',').nth(column).unwrap();
        fs::write(frames.join(image), b"\x89PNG").unwrap();
    }
}

pub fn write_mapping(root: &Path, dataset: &str, text: &str) {
    let dir = root.join("mapping");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{dataset}.txt")), text).unwrap();
}

/// A gtea dataset with one loadable video.
pub fn gtea_fixture() -> (TempDir, DashboardConfig) {
    let tmp = tempfile::tempdir().unwrap();
    write_mapping(tmp.path(), "gtea", GTEA_MAPPING);
    write_video(tmp.path(), "gtea", "data_a", VIDEO_A_CSV);
    let config = DashboardConfig::default_layout(tmp.path());
    (tmp, config)
}

pub fn single_video_config(dataset: &str, mapping: &Path, labels: &Path, images: &Path) -> DatasetConfig {
    DatasetConfig {
        name: dataset.to_string(),
        mapping: mapping.to_path_buf(),
        videos: vec![VideoConfig {
            name: "video_a".to_string(),
            labels: labels.to_string_lossy().into_owned(),
            images: images.to_string_lossy().into_owned(),
        }],
    }
}
