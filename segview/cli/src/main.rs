//! Action-segmentation viewer: loads the configured datasets and serves the dashboard.
//!
//! SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, bail};
use docopt::Docopt;
use log::{error, info};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use segview::backend::{AppState, Playback, spawn_dashboard_server};
use segview::{DashboardConfig, DatasetRegistry, LoadFailure, ServerSettings};

const USAGE: &str = "
Serves frame-by-frame action-segmentation results (ground truth vs. prediction) to a browser.

Usage:
  segview-cli [--config FILE] [--data-root DIR] [--address ADDR] [--port PORT] [--static-dir DIR]
  segview-cli --check [--config FILE] [--data-root DIR]
  segview-cli (--version | -v)
  segview-cli (--help | -h)

Options:
    --config FILE       TOML file listing datasets and videos. Without it the
                        default layout under --data-root is used.
    --data-root DIR     Root of the default layout [default: datas].
    --address ADDR      Listen address (overrides SEGVIEW_ADDR).
    --port PORT         Listen port (overrides SEGVIEW_PORT).
    --static-dir DIR    Directory with index.html, styles.css, ui.js (overrides SEGVIEW_STATIC_DIR).
    --check             Load every dataset, report the result and exit.
    --version, -v       Show version
    --help, -h          Show help
";

#[derive(Debug, Deserialize)]
struct Args {
    flag_config: Option<PathBuf>,
    flag_data_root: PathBuf,
    flag_address: Option<String>,
    flag_port: Option<u16>,
    flag_static_dir: Option<PathBuf>,
    flag_check: bool,
}

fn main() -> anyhow::Result<()> {
    let version = env!("CARGO_PKG_NAME").to_string() + ", version: " + env!("CARGO_PKG_VERSION");
    env_logger::init();

    let args: Args = Docopt::new(USAGE)
        .map(|d| d.help(true))
        .map(|d| d.version(Some(version)))
        .and_then(|d| d.deserialize())
        .unwrap_or_else(|e| e.exit());

    let config = match &args.flag_config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default_layout(&args.flag_data_root),
    };

    let (registry, failures) = DatasetRegistry::load(&config);
    report(&registry, &failures);

    if args.flag_check {
        return check(&registry);
    }
    if registry.is_empty() {
        error!("no dataset loaded; the dashboard will show empty menus");
    }

    let settings = server_settings(&args, ServerSettings::from_env())?;
    let state = AppState::new(
        Arc::new(registry),
        settings.static_dir.clone(),
        Playback::from_config(&config),
    );

    let (handle, started) = spawn_dashboard_server(state, settings)?;
    if !started {
        bail!("dashboard server failed to start");
    }
    info!("dashboard running. Ctrl+C to exit.");

    match handle.join() {
        Ok(result) => result,
        Err(_) => bail!("dashboard server thread panicked"),
    }
}

/// `--check` succeeds only when at least one pair loaded.
fn check(registry: &DatasetRegistry) -> anyhow::Result<()> {
    if registry.is_empty() {
        bail!("no dataset could be loaded");
    }
    Ok(())
}

/// Command-line flags take precedence over the environment-derived `settings`.
fn server_settings(args: &Args, mut settings: ServerSettings) -> anyhow::Result<ServerSettings> {
    if let Some(addr) = &args.flag_address {
        settings.address = addr
            .parse()
            .with_context(|| format!("invalid --address {addr}"))?;
    }
    if let Some(port) = args.flag_port {
        settings.port = port;
    }
    if let Some(dir) = &args.flag_static_dir {
        settings.static_dir = dir.clone();
    }
    Ok(settings)
}

fn report(registry: &DatasetRegistry, failures: &[LoadFailure]) {
    for dataset in registry.datasets() {
        for video in registry.videos(dataset).unwrap_or_default() {
            let frames = registry.get_frame_count(dataset, video).unwrap_or(0);
            println!("loaded  {dataset}/{video}: {frames} frames");
        }
    }
    for failure in failures {
        println!(
            "failed  {}/{}: {}",
            failure.dataset, failure.video, failure.error
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use segview::{ClassCatalog, MatchMode, VideoEntry};
    use std::net::IpAddr;

    fn parse(argv: &[&str]) -> Args {
        Docopt::new(USAGE)
            .and_then(|d| d.argv(argv.iter().copied()).deserialize())
            .unwrap()
    }

    fn env_settings() -> ServerSettings {
        ServerSettings::from_lookup(|key| match key {
            "SEGVIEW_ADDR" => Some("0.0.0.0".into()),
            "SEGVIEW_PORT" => Some("9000".into()),
            _ => None,
        })
    }

    #[test]
    fn flags_beat_environment() {
        let args = parse(&["segview-cli", "--port", "8123", "--static-dir", "page"]);
        let settings = server_settings(&args, env_settings()).unwrap();
        assert_eq!(settings.port, 8123);
        assert_eq!(settings.static_dir, PathBuf::from("page"));
        // not given on the command line, so the environment value stays
        assert_eq!(settings.address, IpAddr::from([0, 0, 0, 0]));
    }

    #[test]
    fn environment_applies_without_flags() {
        let args = parse(&["segview-cli"]);
        let settings = server_settings(&args, env_settings()).unwrap();
        assert_eq!(settings, env_settings());
        assert_eq!(args.flag_data_root, PathBuf::from("datas"));
    }

    #[test]
    fn invalid_address_flag_is_an_error() {
        let args = parse(&["segview-cli", "--address", "not-an-ip"]);
        let err = server_settings(&args, env_settings()).unwrap_err();
        assert!(err.to_string().contains("not-an-ip"));
    }

    #[test]
    fn check_fails_when_nothing_loaded() {
        let args = parse(&["segview-cli", "--check"]);
        assert!(args.flag_check);
        assert!(check(&DatasetRegistry::new(MatchMode::Substring)).is_err());
    }

    #[test]
    fn check_passes_with_one_loaded_video() {
        let mut registry = DatasetRegistry::new(MatchMode::Substring);
        registry.insert(
            "gtea",
            "video_a",
            VideoEntry {
                records: vec![],
                catalog: Arc::new(ClassCatalog::new(vec!["take".into()]).unwrap()),
                image_root: PathBuf::from("image"),
                base_url: "/images/gtea/video_a".into(),
            },
        );
        assert!(check(&registry).is_ok());
    }
}
