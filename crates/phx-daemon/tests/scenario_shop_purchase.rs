//! Purchases settle the reconciled balance, deduct the cost, and leave the
//! streak clock running — with no double-counted accrual on the next read.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use phx_daemon::{routes, state::AppState};
use phx_db::{Clock, Store};
use phx_schemas::TreeStatus;
use phx_testkit::{seeded_store, ManualClock, MemStore};
use tower::ServiceExt; // oneshot

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
async fn purchase_settles_and_deducts_cost() {
    // 30h streak: 592 accrued + 150 rewards = 742 available
    let (app, _clock, store) = fixture(30);

    let (status, json) = post_json(&app, "/v1/shop/buy", serde_json::json!({"item_id": "ember_aura"})).await;
    assert_eq!(status, StatusCode::OK);

    // 742 − 600
    assert_eq!(json["banked_coins"], 142);
    assert_eq!(json["total_available_coins"], 142);
    assert_eq!(json["last_claimed_level"], 2);

    let persisted = store.user_state().unwrap();
    assert!(persisted.owns("ember_aura"));
    // streak clock untouched; baseline clock advanced to the settle instant
    assert_eq!(
        persisted.last_reset_at,
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(persisted.coin_baseline_at, persisted.last_reset_at + Duration::hours(30));
}

#[tokio::test]
async fn purchase_rejects_insufficient_coins_without_mutation() {
    let (app, _clock, store) = fixture(30);

    let (status, json) =
        post_json(&app, "/v1/shop/buy", serde_json::json!({"item_id": "obsidian_phoenix_skin"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["kind"], "precondition");
    assert!(json["error"].as_str().unwrap().contains("insufficient coins"));

    // refused before any write: nothing settled
    let persisted = store.user_state().unwrap();
    assert_eq!(persisted.banked_coins, 0);
    assert_eq!(persisted.last_claimed_level, 0);
}

#[tokio::test]
async fn non_stacking_item_cannot_be_bought_twice() {
    let (app, clock, _store) = fixture(30);

    let (status, _) = post_json(&app, "/v1/shop/buy", serde_json::json!({"item_id": "ember_aura"})).await;
    assert_eq!(status, StatusCode::OK);

    clock.advance(Duration::hours(100));
    let (status, json) = post_json(&app, "/v1/shop/buy", serde_json::json!({"item_id": "ember_aura"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "item already owned");
}

#[tokio::test]
async fn unknown_item_is_404() {
    let (app, _clock, _store) = fixture(30);
    let (status, json) = post_json(&app, "/v1/shop/buy", serde_json::json!({"item_id": "no_such_item"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["kind"], "not_found");
}

#[tokio::test]
async fn sapling_purchase_plants_a_growing_tree_with_clamped_coordinates() {
    let (app, _clock, store) = fixture(30);

    let (status, _) = post_json(
        &app,
        "/v1/shop/buy",
        serde_json::json!({"item_id": "oak_sapling", "x": 1.5, "y": -2.0}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let trees = store.trees();
    assert_eq!(trees.len(), 1);
    let tree = &trees[0];
    assert_eq!(tree.status, TreeStatus::Growing);
    assert_eq!(tree.x, 0.95);
    assert_eq!(tree.y, 0.08);
    // oak matures 48h after purchase
    assert_eq!(tree.mature_date - tree.purchase_date, Duration::hours(48));
}

#[tokio::test]
async fn no_double_count_after_settling_purchase() {
    let (app, clock, _store) = fixture(30);

    let (_, bought) = post_json(&app, "/v1/shop/buy", serde_json::json!({"item_id": "ember_aura"})).await;
    let banked = bought["banked_coins"].as_i64().unwrap();

    // same instant: the already-settled accrual must not be re-added
    let router = routes::build_router(Arc::clone(&app));
    let req = Request::builder()
        .method("GET")
        .uri("/v1/state")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["total_available_coins"].as_i64().unwrap(), banked);

    // later reads only add the post-settle curve segment
    clock.advance(Duration::hours(10));
    let router = routes::build_router(Arc::clone(&app));
    let req = Request::builder()
        .method("GET")
        .uri("/v1/state")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let expected = banked + (phx_reconcile::streak_coins(40.0) - phx_reconcile::streak_coins(30.0));
    assert_eq!(json["total_available_coins"].as_i64().unwrap(), expected);
}
