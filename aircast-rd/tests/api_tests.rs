//! HTTP API tests against an in-memory metadata store

use aircast_common::events::NowPlayingBus;
use aircast_rd::api::{create_router, AppState};
use aircast_rd::db;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::StreamExt;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn fixture() -> (axum::Router, Arc<NowPlayingBus>) {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    db::create_schema(&pool).await.unwrap();
    sqlx::query("INSERT INTO track_info (artist, title, cover_url, mp3_url) VALUES (?, ?, ?, ?)")
        .bind("Boards of Canada")
        .bind("Roygbiv")
        .bind("roygbiv.jpg")
        .bind("Roygbiv.mp3")
        .execute(&pool)
        .await
        .unwrap();

    let bus = Arc::new(NowPlayingBus::new(16));
    let router = create_router(AppState {
        db: pool,
        bus: Arc::clone(&bus),
        cover_public_url: "http://localhost:9000/image".to_string(),
        port: 8090,
    });
    (router, bus)
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

#[tokio::test]
async fn health_reports_module() {
    let (router, _bus) = fixture().await;
    let (status, json) = get(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "aircast-rd");
}

#[tokio::test]
async fn track_info_is_404_when_nothing_playing() {
    let (router, _bus) = fixture().await;
    let (status, _) = get(router, "/api/v1/track-info").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn track_info_resolves_current_track() {
    let (router, bus) = fixture().await;
    bus.announce("Roygbiv.mp3");

    let (status, json) = get(router, "/api/v1/track-info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["artist"], "Boards of Canada");
    assert_eq!(json["title"], "Roygbiv");
    assert_eq!(json["cover_url"], "http://localhost:9000/image/roygbiv.jpg");
}

#[tokio::test]
async fn track_info_is_404_for_unknown_title() {
    let (router, bus) = fixture().await;
    bus.announce("ghost.mp3");

    let (status, _) = get(router, "/api/v1/track-info").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn track_updates_reaches_a_client_that_connects_mid_track() {
    let (router, bus) = fixture().await;
    // Announced before anyone is listening
    bus.announce("Roygbiv.mp3");

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/track-updates")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The fallback poll runs every 500 ms; the first frame must carry
    // the in-flight track well within a couple of intervals
    let mut body = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(2), body.next())
        .await
        .expect("no SSE frame within the fallback poll window")
        .expect("stream ended before the first frame")
        .unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();
    assert!(text.contains("Roygbiv.mp3"), "frame was: {text}");
}

#[tokio::test]
async fn track_info_follows_the_slot() {
    let (router, bus) = fixture().await;
    bus.announce("ghost.mp3");
    bus.announce("Roygbiv.mp3");

    // Last write wins
    let (status, json) = get(router, "/api/v1/track-info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Roygbiv");
}
