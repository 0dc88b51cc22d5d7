//! SPDX-License-Identifier: GPL-3.0-or-later

mod common;

use common::*;
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use segview::backend::{AppState, Playback, dashboard_rocket};
use segview::{DatasetRegistry, ServerSettings};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

fn client() -> (TempDir, Client) {
    let (tmp, config) = gtea_fixture();
    let (registry, _) = DatasetRegistry::load(&config);
    let state = AppState::new(
        Arc::new(registry),
        tmp.path().join("no-static-dir"),
        Playback::from_config(&config),
    );
    let rocket = dashboard_rocket(state, &ServerSettings::default());
    let client = Client::tracked(rocket).expect("valid rocket instance");
    (tmp, client)
}

fn get_json(client: &Client, uri: &str) -> Value {
    let response = client.get(uri).dispatch();
    assert_eq!(response.status(), Status::Ok, "{uri}");
    response.into_json().expect("json body")
}

#[test]
fn lists_loaded_datasets() {
    let (_tmp, client) = client();
    let body = get_json(&client, "/datasets");
    assert_eq!(body[0]["name"], "gtea");
    assert_eq!(body[0]["videos"][0]["name"], "video_a");
    assert_eq!(body[0]["videos"][0]["frame_count"], 4);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[test]
fn video_summary_has_grid_marks_and_playback() {
    let (_tmp, client) = client();
    let body = get_json(&client, "/datasets/gtea/video_a");
    assert_eq!(body["frame_count"], 4);
    assert_eq!(body["n_classes"], 5);
    assert_eq!(body["class_grid"][1][0], "take");
    assert_eq!(body["class_grid"][0][2], "");
    assert_eq!(body["slider_marks"], serde_json::json!([0]));
    assert_eq!(body["playback"]["autoplay_interval_ms"], 300);
    assert_eq!(body["playback"]["manual_interval_ms"], 86_400_000);
}

#[test]
fn frame_view_has_both_heatmaps() {
    let (_tmp, client) = client();
    let body = get_json(&client, "/datasets/gtea/video_a/frames/1");
    assert_eq!(body["image_url"], "/images/gtea/video_a/img_0001.png");
    assert_eq!(body["ground_truth_label"], "take");
    assert_eq!(body["predicted_label"], "open");
    assert_eq!(body["ground_truth"]["title"], "Ground Truth");
    assert_eq!(body["ground_truth"]["z"][1][0], 1);
    assert_eq!(body["predicted"]["z"][1][1], 1);
    assert_eq!(body["predicted"]["hover_text"][1][1], "100.00% confidence");
    assert_eq!(body["predicted"]["colorscale"][1][1], "#ff8000");
}

#[test]
fn single_heatmap_by_source() {
    let (_tmp, client) = client();
    let body = get_json(&client, "/datasets/gtea/video_a/frames/2/ground_truth");
    assert_eq!(body["source"], "ground_truth");
    assert_eq!(body["z"][1][2], 1);

    let response = client.get("/datasets/gtea/video_a/frames/2/both").dispatch();
    assert_eq!(response.status(), Status::NotFound);
}

#[test]
fn out_of_range_frame_is_416() {
    let (_tmp, client) = client();
    let response = client.get("/datasets/gtea/video_a/frames/4").dispatch();
    assert_eq!(response.status(), Status::RangeNotSatisfiable);
    assert!(response.into_string().unwrap().contains("out of range"));
}

#[test]
fn unknown_dataset_or_video_is_404() {
    let (_tmp, client) = client();
    for uri in [
        "/datasets/breakfast/video_a",
        "/datasets/gtea/video_b/frames/0",
        "/images/gtea/video_b/img_0000.png",
    ] {
        assert_eq!(client.get(uri).dispatch().status(), Status::NotFound, "{uri}");
    }
}

#[test]
fn serves_frame_images_from_image_root() {
    let (_tmp, client) = client();
    let response = client.get("/images/gtea/video_a/img_0002.png").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::PNG));
    assert_eq!(response.into_bytes().unwrap(), b"\x89PNG");

    let missing = client.get("/images/gtea/video_a/img_9999.png").dispatch();
    assert_eq!(missing.status(), Status::NotFound);
}

#[test]
fn page_assets_fall_back_to_embedded_copies() {
    let (_tmp, client) = client();
    let index = client.get("/").dispatch();
    assert_eq!(index.status(), Status::Ok);
    assert!(index.into_string().unwrap().contains("Action Segmentation"));

    let js = client.get("/app.js").dispatch();
    assert_eq!(js.content_type(), Some(ContentType::JavaScript));
    assert_eq!(client.get("/styles.css").dispatch().status(), Status::Ok);
    assert_eq!(client.get("/health").dispatch().into_string().unwrap(), "ok");
}
