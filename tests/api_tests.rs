//! API integration tests for the jukebox backend
//!
//! Drives the full router against an in-memory database and a mock metadata service.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use jukebox_backend::api;
use jukebox_backend::infrastructure::app_state::AppState;
use jukebox_backend::infrastructure::config::AppConfig;
use jukebox_backend::infrastructure::services::MockMetadataService;

const ROOM: &str = "dj";
const SONG_A: &str = "https://www.youtube.com/watch?v=aaaaaaaaaaa";
const SONG_B: &str = "https://youtu.be/bbbbbbbbbbb";
const SONG_C: &str = "https://youtu.be/ccccccccccc";

struct TestApp {
    router: Router,
    state: Arc<AppState>,
}

impl TestApp {
    fn token(&self, user_id: &str) -> String {
        self.state.jwt_service.sign(user_id, user_id).unwrap()
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        (status, json)
    }

    async fn post(&self, path: &str, body: Value, user_id: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.token(user_id)))
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    async fn get(&self, path: &str, user_id: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .header("Authorization", format!("Bearer {}", self.token(user_id)))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn delete(&self, path: &str, user_id: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("DELETE")
            .uri(path)
            .header("Authorization", format!("Bearer {}", self.token(user_id)))
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    async fn add_song(&self, user_id: &str, url: &str) -> (StatusCode, Value) {
        self.post("/api/streams", json!({ "creatorId": ROOM, "url": url }), user_id)
            .await
    }

    async fn trending(&self) -> Vec<Value> {
        let (status, body) = self
            .get(&format!("/api/analytics/trending?roomId={}", ROOM), "alice")
            .await;
        assert_eq!(status, StatusCode::OK);
        body["songs"].as_array().unwrap().clone()
    }
}

/// Helper to create a test application
async fn create_test_app() -> TestApp {
    let config = AppConfig {
        jwt_secret: "test-secret-key".to_string(),
        ..AppConfig::in_memory()
    };
    let state = AppState::from_config(config, Arc::new(MockMetadataService::new()))
        .await
        .expect("Failed to create app state");
    let state = Arc::new(state);

    TestApp {
        router: api::create_app(state.clone()),
        state,
    }
}

// ============================================================================
// Auth & Health
// ============================================================================

#[tokio::test]
async fn test_health() {
    let app = create_test_app().await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_missing_or_invalid_token_is_unauthenticated() {
    let app = create_test_app().await;

    let request = Request::builder()
        .uri("/api/streams?creatorId=dj")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");

    let request = Request::builder()
        .uri("/api/analytics/stats?roomId=dj")
        .header("Authorization", "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

// ============================================================================
// Queue
// ============================================================================

#[tokio::test]
async fn test_add_song_and_list_queue() {
    let app = create_test_app().await;

    let (status, body) = app.add_song("alice", SONG_A).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["stream"]["videoId"], "aaaaaaaaaaa");
    assert_eq!(body["stream"]["title"], "Video aaaaaaaaaaa");
    assert_eq!(body["stream"]["addedBy"], "alice");

    let (status, body) = app.get("/api/streams?creatorId=dj", "dj").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streams"].as_array().unwrap().len(), 1);
    assert_eq!(body["streams"][0]["upvotes"], 0);
    assert_eq!(body["streams"][0]["haveUpvoted"], false);
    assert_eq!(body["creatorId"], "dj");
    assert_eq!(body["isCreator"], true);
    assert!(body["activeStream"].is_null());
}

#[tokio::test]
async fn test_admission_rejections() {
    let app = create_test_app().await;

    let (status, body) = app.add_song("alice", "https://vimeo.com/12345").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app.add_song("alice", SONG_A).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app.add_song("alice", SONG_B).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.add_song("alice", SONG_C).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMIT_SHORT");

    let (status, body) = app.add_song("bob", SONG_A).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "DUPLICATE_SONG");

    // Rejections leave the queue untouched
    let (_, body) = app.get("/api/streams?creatorId=dj", "dj").await;
    assert_eq!(body["streams"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_upvote_downvote_round_trip_drops_song_from_trending() {
    let app = create_test_app().await;

    let (_, body) = app.add_song("alice", SONG_A).await;
    let stream_id = body["stream"]["id"].as_str().unwrap().to_string();

    let songs = app.trending().await;
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["trendingScore"], 1);
    assert_eq!(songs[0]["title"], "Video aaaaaaaaaaa");

    let (status, _) = app
        .post("/api/streams/upvote", json!({ "streamId": stream_id, "roomId": ROOM }), "bob")
        .await;
    assert_eq!(status, StatusCode::OK);

    let songs = app.trending().await;
    assert_eq!(songs[0]["recentUpvotes"], 1);
    assert_eq!(songs[0]["trendingScore"], 2);

    let (status, body) = app
        .post("/api/streams/upvote", json!({ "streamId": stream_id }), "bob")
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ALREADY_VOTED");

    let (status, _) = app
        .post("/api/streams/downvote", json!({ "streamId": stream_id }), "bob")
        .await;
    assert_eq!(status, StatusCode::OK);

    assert!(app.trending().await.is_empty());

    let (status, body) = app
        .post("/api/streams/downvote", json!({ "streamId": stream_id }), "bob")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_vote_on_unknown_stream_is_not_found() {
    let app = create_test_app().await;

    let (status, body) = app
        .post("/api/streams/upvote", json!({ "streamId": "missing" }), "bob")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_advance_queue() {
    let app = create_test_app().await;

    let (status, body) = app.post("/api/streams/next", json!({}), "dj").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "EMPTY_QUEUE");

    let (_, first) = app.add_song("alice", SONG_A).await;
    let (_, second) = app.add_song("bob", SONG_B).await;
    let second_id = second["stream"]["id"].as_str().unwrap();
    app.post("/api/streams/upvote", json!({ "streamId": second_id }), "alice")
        .await;

    // Advancing only ever touches the caller's own room
    let (status, body) = app.post("/api/streams/next", json!({}), "bob").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "EMPTY_QUEUE");

    let (status, body) = app.post("/api/streams/next", json!({}), "dj").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stream"]["id"], second_id);
    assert_eq!(body["stream"]["played"], true);

    let (_, body) = app.get("/api/streams?creatorId=dj", "alice").await;
    assert_eq!(body["activeStream"]["id"], second_id);
    assert_eq!(body["streams"][0]["id"], first["stream"]["id"]);
    assert_eq!(body["isCreator"], false);

    let (status, _) = app.post("/api/streams/next", json!({}), "dj").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/api/streams/next", json!({}), "dj").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "EMPTY_QUEUE");

    let songs = app.trending().await;
    assert!(songs.iter().all(|s| s["recentPlays"] == 1));
}

#[tokio::test]
async fn test_remove_and_empty_queue_permissions() {
    let app = create_test_app().await;

    let (_, body) = app.add_song("alice", SONG_A).await;
    let stream_id = body["stream"]["id"].as_str().unwrap().to_string();
    app.add_song("bob", SONG_B).await;

    let (status, body) = app.delete(&format!("/api/streams/{}", stream_id), "bob").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = app.delete(&format!("/api/streams/{}", stream_id), "alice").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.post("/api/streams/empty", json!({}), "dj").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deleted"], 1);

    let (_, body) = app.get("/api/streams?creatorId=dj", "dj").await;
    assert!(body["streams"].as_array().unwrap().is_empty());
}

// ============================================================================
// Analytics
// ============================================================================

#[tokio::test]
async fn test_stats_follow_adds_and_votes() {
    let app = create_test_app().await;

    let (_, body) = app.add_song("alice", SONG_A).await;
    let stream_id = body["stream"]["id"].as_str().unwrap().to_string();
    app.post("/api/streams/upvote", json!({ "streamId": stream_id }), "bob")
        .await;

    let (status, body) = app.get("/api/analytics/stats?roomId=dj", "alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalAdded"], 1);
    assert_eq!(body["stats"]["totalLikesGot"], 1);
    assert_eq!(body["stats"]["avgLikes"], 1.0);

    let (_, body) = app.get("/api/analytics/stats?roomId=dj", "bob").await;
    assert_eq!(body["stats"]["totalLikesGiven"], 1);
    assert_eq!(body["stats"]["totalAdded"], 0);

    let (status, body) = app
        .get("/api/analytics/your-top-liked?roomId=dj", "alice")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"][0]["videoId"], "aaaaaaaaaaa");
    assert_eq!(body["songs"][0]["count"], 1);

    let (_, body) = app.get("/api/analytics/you-add-most?roomId=dj", "alice").await;
    assert_eq!(body["songs"][0]["count"], 1);
    assert_eq!(body["songs"][0]["title"], "Video aaaaaaaaaaa");
}

#[tokio::test]
async fn test_weekly_adds() {
    let app = create_test_app().await;
    app.add_song("alice", SONG_A).await;

    let (status, body) = app
        .get("/api/analytics/weekly-adds?roomId=dj&tzOffsetMinutes=0", "alice")
        .await;
    assert_eq!(status, StatusCode::OK);
    let counts = body["counts"].as_array().unwrap();
    assert_eq!(counts.len(), 7);
    assert_eq!(counts.iter().map(|c| c.as_u64().unwrap()).sum::<u64>(), 1);

    let (status, body) = app
        .get("/api/analytics/weekly-adds?roomId=dj&weekStart=last-tuesday", "alice")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_recommendation_excludes_queued_and_recently_played() {
    let app = create_test_app().await;

    let (_, body) = app.add_song("alice", SONG_A).await;
    let stream_id = body["stream"]["id"].as_str().unwrap().to_string();
    app.post("/api/streams/upvote", json!({ "streamId": stream_id }), "bob")
        .await;

    // Queued and unplayed
    let (status, body) = app
        .get("/api/analytics/recommendation?roomId=dj", "alice")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["songs"].as_array().unwrap().is_empty());
    assert!(body["best"].is_null());

    // Just played
    app.post("/api/streams/next", json!({}), "dj").await;
    let (_, body) = app
        .get("/api/analytics/recommendation?roomId=dj", "alice")
        .await;
    assert!(body["songs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_backfill_is_owner_only_and_idempotent() {
    let app = create_test_app().await;

    let (_, body) = app.add_song("alice", SONG_A).await;
    let stream_id = body["stream"]["id"].as_str().unwrap().to_string();
    app.add_song("bob", SONG_B).await;
    app.post("/api/streams/upvote", json!({ "streamId": stream_id }), "bob")
        .await;
    app.post("/api/streams/next", json!({}), "dj").await;

    let (status, body) = app
        .post("/api/analytics/backfill", json!({ "roomId": ROOM }), "alice")
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, first) = app
        .post("/api/analytics/backfill", json!({ "roomId": ROOM }), "dj")
        .await;
    assert_eq!(status, StatusCode::OK);
    let trending_after_first = app.trending().await;
    let (_, stats_after_first) = app.get("/api/analytics/stats?roomId=dj", "alice").await;

    let (status, second) = app
        .post("/api/analytics/backfill", json!({ "roomId": ROOM }), "dj")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["rooms"], second["rooms"]);

    let trending_after_second = app.trending().await;
    let (_, stats_after_second) = app.get("/api/analytics/stats?roomId=dj", "alice").await;

    let scores = |songs: &[Value]| -> Vec<(Value, Value)> {
        songs
            .iter()
            .map(|s| (s["videoId"].clone(), s["trendingScore"].clone()))
            .collect()
    };
    assert_eq!(scores(&trending_after_first), scores(&trending_after_second));
    assert_eq!(
        stats_after_first["stats"]["totalLikesGot"],
        stats_after_second["stats"]["totalLikesGot"]
    );
    assert_eq!(stats_after_second["stats"]["totalAdded"], 1);
    assert_eq!(stats_after_second["stats"]["totalLikesGot"], 1);

    // Played and upvoted song: 1 upvote * 2 + 1 play
    assert_eq!(trending_after_second[0]["videoId"], "aaaaaaaaaaa");
    assert_eq!(trending_after_second[0]["trendingScore"], 3);
}
