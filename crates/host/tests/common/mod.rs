//! Common test utilities
#![allow(dead_code)] // Not every test file uses every helper

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use settings_sync_host::api::{self, AppState};
use settings_sync_host::hub::EventHub;
use settings_sync_host::settings::SettingsStore;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SAMPLE_SETTINGS: &str = r#"{
    "ssid": "home",
    "mqttPort": 1883,
    "enableGsm": false,
    "traceJava": true,
    "batteryVoltage": 3.987
}"#;

/// Host router over a settings file living in a temp directory
pub struct TestHarness {
    pub state: AppState,
    pub dir: TempDir,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_settings(SAMPLE_SETTINGS).await
    }

    pub async fn with_settings(json: &str) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        std::fs::write(&path, json).expect("write settings");

        let store = SettingsStore::open(&path).await.expect("open store");
        let state = AppState::new(store, EventHub::new(16));
        Self { state, dir }
    }

    /// Store loaded from disk whose file is then replaced by a directory,
    /// so every later write fails
    pub async fn unwritable() -> Self {
        let harness = Self::new().await;
        let path = harness.settings_path();
        std::fs::remove_file(&path).expect("remove settings");
        std::fs::create_dir(&path).expect("directory in its place");
        harness
    }

    pub fn settings_path(&self) -> std::path::PathBuf {
        self.dir.path().join("settings.json")
    }

    pub fn router(&self) -> Router {
        api::router(self.state.clone())
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send("GET", uri).await
    }

    pub async fn send(&self, method: &str, uri: &str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        self.router().oneshot(request).await.expect("infallible router")
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
