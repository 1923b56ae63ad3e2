#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::{DateTime, NaiveDate, Utc};
use dailystory_core::clock::FixedClock;
use dailystory_core::store::{InsertOutcome, StoryStore};
use dailystory_core::story::{NewStory, Story};
use dailystory_pipeline::testing::ScriptedGenerator;
use dailystory_pipeline::{MemoryStoryStore, RetryPolicy, StoryService};
use http_body_util::BodyExt;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use dailystory_api::config::ServerConfig;
use dailystory_api::router::build_app_router;
use dailystory_api::state::AppState;

/// "Now" for every test service: 2025-04-21 12:00 UTC.
pub const NOW: &str = "2025-04-21T12:00:00Z";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        enable_dev_routes: false,
    }
}

pub fn today() -> NaiveDate {
    now().date_naive()
}

pub fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(NOW).unwrap().with_timezone(&Utc)
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

/// Story service over the given store and generator, pinned to [`NOW`],
/// retrying twice with millisecond backoff.
pub fn test_service(store: Arc<dyn StoryStore>, generator: Arc<ScriptedGenerator>) -> StoryService {
    StoryService::new(store, generator)
        .with_clock(Arc::new(FixedClock(now())))
        .with_retry_policy(RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(1),
            max_delay: None,
        })
}

/// Build the full application router around `service`, with the same
/// middleware stack production uses.
pub fn build_test_app(service: StoryService) -> Router {
    build_test_app_with(service, test_config(), CancellationToken::new())
}

pub fn build_test_app_with(
    service: StoryService,
    config: ServerConfig,
    shutdown: CancellationToken,
) -> Router {
    let state = AppState {
        service: Arc::new(service),
        shutdown,
    };
    build_app_router(state, &config)
}

/// Router over an in-memory store and a generator that always succeeds.
pub fn memory_app() -> (Router, Arc<MemoryStoryStore>, Arc<ScriptedGenerator>) {
    let store = Arc::new(MemoryStoryStore::new());
    let generator = Arc::new(ScriptedGenerator::succeeding());
    let app = build_test_app(test_service(store.clone(), generator.clone()));
    (app, store, generator)
}

pub async fn seed(store: &MemoryStoryStore, raw_date: &str, title: &str) -> Story {
    let outcome = store
        .insert(NewStory {
            title: title.to_string(),
            content: format!("{title} content."),
            date: date(raw_date),
            ai_source: Some("Seed".to_string()),
        })
        .await
        .unwrap();
    match outcome {
        InsertOutcome::Created(story) => story,
        InsertOutcome::AlreadyExists => panic!("{raw_date} already seeded"),
    }
}

pub async fn send(app: Router, method: Method, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
