//! Integration tests for the `/api/v1/stories` and `/api/v1/dev` routes.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{body_json, get, post, seed};
use dailystory_pipeline::testing::ScriptedGenerator;
use dailystory_pipeline::MemoryStoryStore;
use tokio::sync::Barrier;
use tokio_util::sync::CancellationToken;

fn dates(json: &serde_json::Value) -> Vec<String> {
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["date"].as_str().unwrap().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// GET /api/v1/stories
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_on_empty_store_returns_empty_data() {
    let (app, _, _) = common::memory_app();
    let response = get(app, "/api/v1/stories").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn list_is_newest_first() {
    let (app, store, _) = common::memory_app();
    for day in ["2025-04-19", "2025-04-21", "2025-04-20"] {
        seed(&store, day, day).await;
    }

    let json = body_json(get(app, "/api/v1/stories?page_size=2").await).await;

    assert_eq!(dates(&json), vec!["2025-04-21", "2025-04-20"]);
}

#[tokio::test]
async fn list_clamps_out_of_range_paging() {
    let (app, store, _) = common::memory_app();
    for month in 1..=3 {
        for day in 1..=20 {
            seed(&store, &format!("2025-{month:02}-{day:02}"), "Seeded").await;
        }
    }

    let clamped = body_json(get(app.clone(), "/api/v1/stories?page=0&page_size=1000").await).await;
    let explicit = body_json(get(app, "/api/v1/stories?page=1&page_size=50").await).await;

    assert_eq!(clamped, explicit);
    let listed = dates(&clamped);
    assert_eq!(listed.len(), 50);
    assert_eq!(listed[0], "2025-03-20");
}

#[tokio::test]
async fn list_defaults_to_ten_per_page() {
    let (app, store, _) = common::memory_app();
    for day in 1..=12 {
        seed(&store, &format!("2025-04-{day:02}"), "Seeded").await;
    }

    let json = body_json(get(app, "/api/v1/stories").await).await;

    assert_eq!(dates(&json).len(), 10);
}

#[tokio::test]
async fn second_page_of_one_is_older_story() {
    let (app, store, _) = common::memory_app();
    seed(&store, "2025-04-20", "Older").await;
    seed(&store, "2025-04-21", "Newer").await;

    let json = body_json(get(app, "/api/v1/stories?page=2&page_size=1").await).await;

    assert_eq!(dates(&json), vec!["2025-04-20"]);
    assert_eq!(json["data"][0]["title"], "Older");
}

// ---------------------------------------------------------------------------
// GET /api/v1/stories/latest
// ---------------------------------------------------------------------------

#[tokio::test]
async fn latest_returns_newest_story() {
    let (app, store, generator) = common::memory_app();
    seed(&store, "2025-04-18", "Old").await;
    seed(&store, "2025-04-20", "Newest").await;

    let response = get(app, "/api/v1/stories/latest").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["title"], "Newest");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn latest_on_empty_store_is_404() {
    let (app, _, _) = common::memory_app();
    let response = get(app, "/api/v1/stories/latest").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// GET /api/v1/stories/{date}
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_by_date_returns_story_fields() {
    let (app, store, _) = common::memory_app();
    let seeded = seed(&store, "2025-04-20", "The Lighthouse").await;

    let response = get(app, "/api/v1/stories/2025-04-20").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let story = &json["data"];
    assert_eq!(story["id"], seeded.id);
    assert_eq!(story["title"], "The Lighthouse");
    assert_eq!(story["content"], "The Lighthouse content.");
    assert_eq!(story["date"], "2025-04-20");
    assert_eq!(story["ai_source"], "Seed");
    assert!(story["created_at"].is_string());
}

#[tokio::test]
async fn get_by_date_missing_is_404() {
    let (app, _, _) = common::memory_app();
    let response = get(app, "/api/v1/stories/2024-01-01").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Story '2024-01-01' not found");
}

#[tokio::test]
async fn get_by_malformed_date_is_400() {
    let (app, _, generator) = common::memory_app();
    let response = get(app, "/api/v1/stories/not-a-date").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["error"].as_str().unwrap().contains("YYYY-MM-DD"));
    assert_eq!(generator.calls(), 0);
}

// ---------------------------------------------------------------------------
// GET /api/v1/stories/today
// ---------------------------------------------------------------------------

#[tokio::test]
async fn today_generates_once_and_then_reads() {
    let (app, store, generator) = common::memory_app();

    let first = body_json(get(app.clone(), "/api/v1/stories/today").await).await;
    let second = body_json(get(app, "/api/v1/stories/today").await).await;

    assert_eq!(first["data"]["date"], common::today().to_string());
    assert_eq!(first["data"]["title"], "Story #1");
    assert_eq!(first["data"]["ai_source"], "OpenRouter");
    assert_eq!(first, second);
    assert_eq!(generator.calls(), 1);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn today_returns_existing_story_without_generating() {
    let (app, store, generator) = common::memory_app();
    seed(&store, &common::today().to_string(), "Pre-made").await;

    let json = body_json(get(app, "/api/v1/stories/today").await).await;

    assert_eq!(json["data"]["title"], "Pre-made");
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn concurrent_today_requests_share_one_story() {
    const CALLERS: usize = 4;
    let store = Arc::new(MemoryStoryStore::new());
    let generator = Arc::new(
        ScriptedGenerator::succeeding().gated(Arc::new(Barrier::new(CALLERS))),
    );
    let app = common::build_test_app(common::test_service(store.clone(), generator.clone()));

    let responses = futures::future::join_all(
        (0..CALLERS).map(|_| get(app.clone(), "/api/v1/stories/today")),
    )
    .await;

    let mut ids = Vec::new();
    for response in responses {
        assert_eq!(response.status(), StatusCode::OK);
        ids.push(body_json(response).await["data"]["id"].clone());
    }
    assert!(ids.iter().all(|id| *id == ids[0]));
    assert_eq!(store.len(), 1);
    assert_eq!(generator.calls() as usize, CALLERS);
}

#[tokio::test]
async fn today_generation_failure_is_502() {
    let store = Arc::new(MemoryStoryStore::new());
    let generator = Arc::new(ScriptedGenerator::failing());
    let app = common::build_test_app(common::test_service(store.clone(), generator.clone()));

    let response = get(app, "/api/v1/stories/today").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_FAILED");
    assert_eq!(json["error"], "Story generation failed after 2 attempts");
    assert_eq!(generator.calls(), 2);
    assert!(store.is_empty());
}

#[tokio::test]
async fn today_during_shutdown_is_503() {
    let store = Arc::new(MemoryStoryStore::new());
    let generator = Arc::new(ScriptedGenerator::succeeding());
    let shutdown = CancellationToken::new();
    shutdown.cancel();
    let app = common::build_test_app_with(
        common::test_service(store.clone(), generator.clone()),
        common::test_config(),
        shutdown,
    );

    let response = get(app, "/api/v1/stories/today").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "CANCELLED");
    assert_eq!(generator.calls(), 0);
    assert!(store.is_empty());
}

// ---------------------------------------------------------------------------
// POST /api/v1/dev/trigger-daily-generation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dev_trigger_is_not_mounted_by_default() {
    let (app, _, generator) = common::memory_app();
    let response = post(app, "/api/v1/dev/trigger-daily-generation").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn dev_trigger_creates_todays_story_when_enabled() {
    let store = Arc::new(MemoryStoryStore::new());
    let generator = Arc::new(ScriptedGenerator::succeeding());
    let mut config = common::test_config();
    config.enable_dev_routes = true;
    let app = common::build_test_app_with(
        common::test_service(store.clone(), generator.clone()),
        config,
        CancellationToken::new(),
    );

    let response = post(app.clone(), "/api/v1/dev/trigger-daily-generation").await;
    assert_eq!(response.status(), StatusCode::OK);
    let triggered = body_json(response).await;
    assert_eq!(triggered["data"]["date"], common::today().to_string());

    let today = body_json(get(app, "/api/v1/stories/today").await).await;
    assert_eq!(today["data"]["id"], triggered["data"]["id"]);
    assert_eq!(generator.calls(), 1);
}
