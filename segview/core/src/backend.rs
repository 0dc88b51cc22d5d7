//! SPDX-License-Identifier: GPL-3.0-or-later

use crate::config::{DashboardConfig, MANUAL_INTERVAL_MS, ServerSettings};
use crate::error::LookupError;
use crate::logic::catalog::grid_rows;
use crate::logic::presence::{Heatmap, LabelSource};
use crate::logic::registry::DatasetRegistry;
use anyhow::{Context, Result};
use include_dir::{Dir, include_dir};
use log::{debug, info, warn};
use rocket::{
    Build, Rocket, State, fairing::AdHoc, fs::NamedFile, get, http::ContentType, http::Status,
    request::FromParam, response::content::RawHtml, routes, serde::json::Json,
};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
    thread,
    thread::JoinHandle,
    time::Duration,
};
use tokio::runtime::Builder as RtBuilder;

/// Page assets compiled in, used when the static dir lacks a file.
static EMBEDDED_STATIC: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

/// Page assets the UI needs.
pub const STATIC_ASSETS: [&str; 3] = ["index.html", "styles.css", "ui.js"];

/// Slider ticks are placed every this many frames.
pub const SLIDER_MARK_STEP: usize = 200;

type ApiResult<T> = std::result::Result<T, (Status, String)>;

impl<'a> FromParam<'a> for LabelSource {
    type Error = &'a str;

    fn from_param(param: &'a str) -> std::result::Result<Self, Self::Error> {
        match param {
            "ground_truth" | "gt" => Ok(LabelSource::GroundTruth),
            "predicted" | "predict" => Ok(LabelSource::Predicted),
            _ => Err(param),
        }
    }
}

/// Browser timer intervals for the two play modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Playback {
    pub autoplay_interval_ms: u64,
    pub manual_interval_ms: u64,
}

impl Playback {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            autoplay_interval_ms: config.autoplay_interval_ms,
            manual_interval_ms: MANUAL_INTERVAL_MS,
        }
    }
}

// Types returned to UI
#[derive(Debug, Clone, Serialize)]
struct VideoListing {
    name: String,
    frame_count: usize,
}

#[derive(Debug, Clone, Serialize)]
struct DatasetListing {
    name: String,
    videos: Vec<VideoListing>,
}

#[derive(Debug, Clone, Serialize)]
struct VideoSummary {
    dataset: String,
    video: String,
    frame_count: usize,
    n_classes: usize,
    class_grid: Vec<Vec<String>>,
    slider_marks: Vec<usize>,
    playback: Playback,
}

#[derive(Debug, Clone, Serialize)]
struct FrameView {
    index: usize,
    frame_count: usize,
    image_url: String,
    ground_truth_label: String,
    predicted_label: String,
    ground_truth: Heatmap,
    predicted: Heatmap,
}

/// Shared App State
#[derive(Clone)]
pub struct AppState {
    registry: Arc<DatasetRegistry>,
    static_dir: PathBuf,
    playback: Playback,
}

impl AppState {
    pub fn new(registry: Arc<DatasetRegistry>, static_dir: impl Into<PathBuf>, playback: Playback) -> Self {
        Self {
            registry,
            static_dir: static_dir.into(),
            playback,
        }
    }
}

/** Public API functions below **/
/// Rocket instance with every dashboard route mounted, not yet launched.
pub fn dashboard_rocket(state: AppState, settings: &ServerSettings) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", settings.address))
        .merge(("port", settings.port));

    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![index_route, styles_route, app_js_route, health])
        .mount(
            "/",
            routes![
                get_datasets,
                get_video_summary,
                get_frame,
                get_frame_heatmap,
                get_frame_image
            ],
        )
}

/// Spawn the Rocket server on a background thread.
pub fn spawn_dashboard_server(
    state: AppState,
    settings: ServerSettings,
) -> Result<(JoinHandle<Result<()>>, bool)> {
    // Used to notify the caller whether the server started successfully.
    let (ready_tx, ready_rx) = mpsc::channel::<std::result::Result<(), String>>();

    for f in STATIC_ASSETS {
        let p = settings.static_dir.join(f);
        if !p.exists() {
            warn!("{} missing; serving the built-in copy", p.display());
        }
    }

    let handle = thread::Builder::new()
        .name("segview-rocket".into())
        .spawn(move || -> Result<()> {
            let rt = RtBuilder::new_multi_thread()
                .enable_all()
                .build()
                .context("building tokio runtime for dashboard server")?;

            rt.block_on(async move {
                // Clone the sender so the fairing can signal liftoff.
                let liftoff_tx = ready_tx.clone();

                let rocket = dashboard_rocket(state, &settings).attach(AdHoc::on_liftoff(
                    "ready-signal",
                    move |rocket| {
                        let liftoff_tx = liftoff_tx.clone();
                        Box::pin(async move {
                            let cfg = rocket.config();
                            let _ = liftoff_tx.send(Ok(()));
                            info!("dashboard listening on http://{}:{}", cfg.address, cfg.port);
                        })
                    },
                ));

                // On failure (e.g., port in use), notify the caller.
                if let Err(e) = rocket.launch().await {
                    let _ = ready_tx.send(Err(format!("Rocket launch error: {e}")));
                    return Err(anyhow::anyhow!(e));
                }

                Ok(())
            })
        })
        .context("spawning dashboard server thread")?;

    // Wait for confirmation that the server is running or failed.
    let started_ok = match ready_rx.recv_timeout(Duration::from_secs(15)) {
        Ok(Ok(())) => true,
        Ok(Err(msg)) => {
            warn!("dashboard server failed: {msg}");
            false
        }
        Err(_timeout) => {
            warn!("dashboard server startup not confirmed (timeout)");
            false
        }
    };

    Ok((handle, started_ok))
}

/**  Routes start here **/
/// GET / to serve index.html
#[get("/")]
async fn index_route(state: &State<AppState>) -> ApiResult<RawHtml<String>> {
    read_asset(&state.static_dir, "index.html").map(RawHtml)
}

/// GET /styles.css
#[get("/styles.css")]
async fn styles_route(state: &State<AppState>) -> ApiResult<(ContentType, String)> {
    read_asset(&state.static_dir, "styles.css").map(|s| (ContentType::CSS, s))
}

/// GET /app.js to serve ui.js
#[get("/app.js")]
async fn app_js_route(state: &State<AppState>) -> ApiResult<(ContentType, String)> {
    read_asset(&state.static_dir, "ui.js").map(|s| (ContentType::JavaScript, s))
}

#[get("/health")]
fn health() -> &'static str {
    "ok"
}

/// GET /datasets to list datasets with their videos
#[get("/datasets")]
async fn get_datasets(state: &State<AppState>) -> Json<Vec<DatasetListing>> {
    let registry = &state.registry;
    let listings = registry
        .datasets()
        .into_iter()
        .map(|dataset| DatasetListing {
            name: dataset.to_string(),
            videos: registry
                .videos(dataset)
                .unwrap_or_default()
                .into_iter()
                .map(|video| VideoListing {
                    name: video.to_string(),
                    frame_count: registry.get_frame_count(dataset, video).unwrap_or(0),
                })
                .collect(),
        })
        .collect();
    Json(listings)
}

/// GET /datasets/<dataset>/<video> to frame count, class grid and slider marks
#[get("/datasets/<dataset>/<video>")]
async fn get_video_summary(
    dataset: &str,
    video: &str,
    state: &State<AppState>,
) -> ApiResult<Json<VideoSummary>> {
    let entry = state.registry.video(dataset, video).map_err(lookup_status)?;
    let frame_count = entry.frame_count();
    Ok(Json(VideoSummary {
        dataset: dataset.to_string(),
        video: video.to_string(),
        frame_count,
        n_classes: entry.catalog.n_classes(),
        class_grid: grid_rows(entry.catalog.grid()),
        slider_marks: slider_marks(frame_count),
        playback: state.playback,
    }))
}

/// GET /datasets/<dataset>/<video>/frames/<index> to image URL plus both heatmaps
#[get("/datasets/<dataset>/<video>/frames/<index>")]
async fn get_frame(
    dataset: &str,
    video: &str,
    index: usize,
    state: &State<AppState>,
) -> ApiResult<Json<FrameView>> {
    let registry = &state.registry;
    let record = registry
        .frame_record(dataset, video, index)
        .map_err(lookup_status)?;
    let heatmap = |source| {
        registry
            .get_frame_presence(dataset, video, index, source)
            .map(|grid| grid.to_heatmap())
            .map_err(lookup_status)
    };

    Ok(Json(FrameView {
        index,
        frame_count: registry
            .get_frame_count(dataset, video)
            .map_err(lookup_status)?,
        image_url: registry
            .frame_image_url(dataset, video, index)
            .map_err(lookup_status)?,
        ground_truth_label: record.ground_truth.clone(),
        predicted_label: record.predicted.clone(),
        ground_truth: heatmap(LabelSource::GroundTruth)?,
        predicted: heatmap(LabelSource::Predicted)?,
    }))
}

/// GET /datasets/<dataset>/<video>/frames/<index>/<source> to a single heatmap
#[get("/datasets/<dataset>/<video>/frames/<index>/<source>")]
async fn get_frame_heatmap(
    dataset: &str,
    video: &str,
    index: usize,
    source: std::result::Result<LabelSource, &str>,
    state: &State<AppState>,
) -> ApiResult<Json<Heatmap>> {
    let source = source.map_err(|s| (Status::NotFound, format!("unknown label source `{s}`")))?;
    state
        .registry
        .get_frame_presence(dataset, video, index, source)
        .map(|grid| Json(grid.to_heatmap()))
        .map_err(lookup_status)
}

/// GET /images/<dataset>/<video>/<file..> to a frame image from the video's image root
#[get("/images/<dataset>/<video>/<file..>")]
async fn get_frame_image(
    dataset: &str,
    video: &str,
    file: PathBuf,
    state: &State<AppState>,
) -> Option<NamedFile> {
    let entry = state.registry.video(dataset, video).ok()?;
    let path = entry.image_root.join(file);
    debug!("serving {}", path.display());
    NamedFile::open(path).await.ok()
}

/** Helper functions below **/
fn lookup_status(e: LookupError) -> (Status, String) {
    let status = match e {
        LookupError::IndexOutOfRange { .. } => Status::RangeNotSatisfiable,
        LookupError::UnknownDataset(_) | LookupError::UnknownVideo { .. } => Status::NotFound,
    };
    (status, e.to_string())
}

/// Frame positions labelled on the slider: 0, 200, ... up to `frame_count`.
pub fn slider_marks(frame_count: usize) -> Vec<usize> {
    (0..=frame_count).step_by(SLIDER_MARK_STEP).collect()
}

/// Reads a page asset from disk, falling back to the embedded copy.
fn read_asset(static_dir: &Path, name: &str) -> ApiResult<String> {
    let path = static_dir.join(name);
    if let Ok(s) = fs::read_to_string(&path) {
        return Ok(s);
    }
    EMBEDDED_STATIC
        .get_file(name)
        .and_then(|f| f.contents_utf8())
        .map(str::to_string)
        .ok_or_else(|| (Status::NotFound, format!("{name} not found")))
}
