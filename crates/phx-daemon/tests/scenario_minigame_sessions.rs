//! Minigame sessions: entry fee settles like a purchase, winnings land
//! straight in the bank, and the score validator is a pluggable policy.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use phx_daemon::ops::minigame::ScoreValidator;
use phx_daemon::{routes, state::AppState};
use phx_db::{Clock, Store};
use phx_schemas::{Minigame, MinigameSession};
use phx_testkit::{seeded_store, ManualClock, MemStore};
use tower::ServiceExt; // oneshot
use uuid::Uuid;

fn fixture(streak_hours: i64) -> (Arc<AppState>, Arc<ManualClock>, Arc<MemStore>) {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let store = Arc::new(seeded_store(start));
    let clock = Arc::new(ManualClock::at(start + Duration::hours(streak_hours)));
    let app = AppState::new(
        Arc::clone(&store) as Arc<dyn Store>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    (Arc::new(app), clock, store)
}

async fn post_json(
    app: &Arc<AppState>,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let router = routes::build_router(Arc::clone(app));
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).expect("body is not valid JSON"))
}

#[tokio::test]
async fn start_settles_and_deducts_the_entry_fee() {
    // 30h streak: 742 available, ash_asteroids costs 50
    let (app, _clock, store) = fixture(30);

    let (status, json) =
        post_json(&app, "/v1/minigame/start", serde_json::json!({"game_id": "ash_asteroids"})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["session_id"].as_str().is_some());
    assert_eq!(json["state"]["banked_coins"], 692);

    let persisted = store.user_state().unwrap();
    assert_eq!(persisted.last_claimed_level, 2);
}

#[tokio::test]
async fn end_converts_score_to_coins_at_ten_to_one() {
    let (app, clock, _store) = fixture(30);

    let (_, started) =
        post_json(&app, "/v1/minigame/start", serde_json::json!({"game_id": "ash_asteroids"})).await;
    let session_id = started["session_id"].as_str().unwrap().to_string();

    clock.advance(Duration::minutes(3));
    let (status, json) = post_json(
        &app,
        "/v1/minigame/end",
        serde_json::json!({"session_id": session_id, "score": 137}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["coins_won"], 13);
    // winnings bypass the settle: banked went 692 → 705, the 30h..30h3m
    // accrual segment stays on the curve
    assert_eq!(json["state"]["banked_coins"], 705);
}

#[tokio::test]
async fn a_session_cannot_be_ended_twice() {
    let (app, _clock, _store) = fixture(30);

    let (_, started) =
        post_json(&app, "/v1/minigame/start", serde_json::json!({"game_id": "ash_asteroids"})).await;
    let session_id = started["session_id"].as_str().unwrap().to_string();

    post_json(&app, "/v1/minigame/end", serde_json::json!({"session_id": session_id, "score": 40})).await;
    let (status, json) =
        post_json(&app, "/v1/minigame/end", serde_json::json!({"session_id": session_id, "score": 400})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "play session already ended");
}

#[tokio::test]
async fn unknown_session_and_inactive_game_are_rejected() {
    let (app, _clock, store) = fixture(30);

    let (status, _) = post_json(
        &app,
        "/v1/minigame/end",
        serde_json::json!({"session_id": Uuid::new_v4(), "score": 10}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    store.add_minigame(Minigame {
        id: "retired_game".into(),
        name: "Retired Game".into(),
        entry_cost: 10,
        is_active: false,
    });
    let (status, json) =
        post_json(&app, "/v1/minigame/start", serde_json::json!({"game_id": "retired_game"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "minigame is not active");
}

#[tokio::test]
async fn negative_score_is_a_validation_error() {
    let (app, _clock, _store) = fixture(30);
    let (status, json) = post_json(
        &app,
        "/v1/minigame/end",
        serde_json::json!({"session_id": Uuid::new_v4(), "score": -1}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "validation");
}

#[tokio::test]
async fn insufficient_coins_blocks_entry() {
    let (app, _clock, _store) = fixture(0);
    let (status, json) =
        post_json(&app, "/v1/minigame/start", serde_json::json!({"game_id": "ember_flight"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("insufficient coins"));
}

struct CapScore(i64);

impl ScoreValidator for CapScore {
    fn accept(&self, _game: &Minigame, _session: &MinigameSession, score: i64) -> bool {
        score <= self.0
    }
}

#[tokio::test]
async fn a_custom_validator_can_reject_scores() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let store = Arc::new(seeded_store(start));
    let clock = Arc::new(ManualClock::at(start + Duration::hours(30)));
    let app = Arc::new(
        AppState::new(
            Arc::clone(&store) as Arc<dyn Store>,
            clock as Arc<dyn Clock>,
        )
        .with_score_validator(Arc::new(CapScore(1000))),
    );

    let (_, started) =
        post_json(&app, "/v1/minigame/start", serde_json::json!({"game_id": "ash_asteroids"})).await;
    let session_id = started["session_id"].as_str().unwrap().to_string();

    let (status, json) = post_json(
        &app,
        "/v1/minigame/end",
        serde_json::json!({"session_id": session_id, "score": 5000}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "score rejected");

    // a rejected report does not consume the session
    let (status, _) = post_json(
        &app,
        "/v1/minigame/end",
        serde_json::json!({"session_id": session_id, "score": 900}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
