//! HTTP endpoints for settings pages
//!
//! - `GET /settings.json`: the settings document
//! - `GET /events`: server-sent events (`settings`, `info`, `error`, `data`)
//! - `GET /changed/:key/:value`: edit notification from a page (`/changed/:key/` clears text)
//! - `POST /settings/reload`: re-read the settings file and tell pages

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use settings_sync_protocol::{ServerEvent, SettingsMap, EVENTS_PATH, SETTINGS_PATH};
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

use crate::embedded;
use crate::hub::EventHub;
use crate::settings::{SettingsStore, StoreError};

const VERSION: &str = env!("CARGO_PKG_VERSION");

// Shared state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<SettingsStore>>,
    pub hub: EventHub,
}

impl AppState {
    pub fn new(store: SettingsStore, hub: EventHub) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            hub,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            Self::UnknownKey(_) => StatusCode::NOT_FOUND,
            Self::InvalidValue { .. } => StatusCode::BAD_REQUEST,
            Self::Io(_) | Self::Protocol(_) | Self::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

// Routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route(SETTINGS_PATH, get(settings_json))
        .route(EVENTS_PATH, get(events))
        .route("/changed/:key/", get(cleared))
        .route("/changed/:key/:value", get(changed))
        .route("/settings/reload", post(reload))
        .route("/health", get(health_check))
        .route("/*path", get(serve_static))
        .with_state(state)
}

// Handlers

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": VERSION }))
}

async fn settings_json(State(state): State<AppState>) -> Result<Response<Body>, StoreError> {
    let json = state.store.read().await.to_json()?;

    let headers = [
        (header::CONTENT_TYPE, "application/json"),
        (header::CACHE_CONTROL, "no-cache, no-store, max-age=0"),
        (header::EXPIRES, "Tue, 01 Jan 1980 1:00:00 GMT"),
        (header::PRAGMA, "no-cache"),
    ];
    Ok((headers, json).into_response())
}

async fn events(State(state): State<AppState>) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.hub.subscribe();
    info!(subscribers = state.hub.subscriber_count(), "events stream opened");

    let hub = state.hub.clone();

    let stream = async_stream::stream! {
        loop {
            let next = tokio::select! {
                biased;
                received = rx.recv() => received,
                () = hub.stopped() => break,
            };
            match next {
                Ok(event) => yield Ok(to_sse(&event)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // The page only misses live updates; next settings load catches up
                    warn!(skipped, "events subscriber lagging");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_sse(event: &ServerEvent) -> Event {
    Event::default()
        .event(event.kind.to_string())
        .data(&event.payload)
}

async fn changed(
    State(state): State<AppState>,
    Path((key, raw)): Path<(String, String)>,
) -> Result<&'static str, StoreError> {
    apply_edit(&state, &key, &raw).await
}

/// Empty last segment: a text field was cleared
async fn cleared(State(state): State<AppState>, Path(key): Path<String>) -> Result<&'static str, StoreError> {
    apply_edit(&state, &key, "").await
}

async fn apply_edit(state: &AppState, key: &str, raw: &str) -> Result<&'static str, StoreError> {
    let updated = state.store.write().await.commit_change(key, raw).await?;
    info!(%key, value = %updated, "setting changed");

    let mut fragment = SettingsMap::new();
    fragment.insert(key.to_string(), updated.clone());
    state.hub.publish(ServerEvent::data(&fragment)?);
    state.hub.publish(ServerEvent::info(format!("{key} set to {updated}")));

    Ok("OK")
}

async fn reload(State(state): State<AppState>) -> Result<Json<serde_json::Value>, StoreError> {
    let count = state.store.write().await.reload().await?;
    info!(count, "settings reloaded");

    state.hub.publish(ServerEvent::settings());
    Ok(Json(serde_json::json!({ "reloaded": true, "count": count })))
}

/// Serve index.html at root
async fn serve_index() -> Response<Body> {
    serve_asset("/")
}

/// Serve embedded static file
async fn serve_static(Path(path): Path<String>) -> Response<Body> {
    serve_asset(&path)
}

fn serve_asset(path: &str) -> Response<Body> {
    embedded::lookup(path).map_or_else(
        || (StatusCode::NOT_FOUND, "Not Found").into_response(),
        IntoResponse::into_response,
    )
}
