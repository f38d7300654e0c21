//! Relapse archives the ended streak, banks what it earned, resets the
//! baseline clocks, withers growing trees and strips the relapse-exclusive
//! skin.

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use phx_daemon::{routes, state::AppState};
use phx_db::{Clock, Store};
use phx_schemas::{ForestTree, TreeStatus, UserState};
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

async fn post_empty(app: &Arc<AppState>, uri: &str) -> (StatusCode, serde_json::Value) {
    let router = routes::build_router(Arc::clone(app));
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).expect("body is not valid JSON"))
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
async fn relapse_at_hundred_hours_banks_and_resets() {
    let (app, _clock, store) = fixture(100);

    let (status, json) = post_empty(&app, "/v1/relapse").await;
    assert_eq!(status, StatusCode::OK);

    // 10×100^1.2 = 2511 accrued + 500 in rewards through level 4
    assert_eq!(json["banked_coins"], 3011);
    assert_eq!(json["total_available_coins"], 3011);
    assert_eq!(json["relapse_count"], 1);
    // fresh streak: back to rank zero
    assert_eq!(json["rank_level"], 0);
    assert_eq!(json["streak_hours"].as_f64().unwrap(), 0.0);

    let persisted = store.user_state().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(100);
    assert_eq!(persisted.last_reset_at, now);
    assert_eq!(persisted.coin_baseline_at, now);
    assert_eq!(persisted.last_claimed_level, 0);
    assert_eq!(persisted.longest_streak_ms, Duration::hours(100).num_milliseconds());
}

#[tokio::test]
async fn relapse_archives_the_streak_in_history() {
    let (app, _clock, store) = fixture(100);

    post_empty(&app, "/v1/relapse").await;

    let history = store.history();
    assert_eq!(history.len(), 1);
    let record = &history[0];
    assert_eq!(record.final_rank_name, "Flame Chick");
    assert_eq!(record.final_rank_level, 4);
    assert_eq!(record.streak_duration_ms, Duration::hours(100).num_milliseconds());
    assert!(record.name.starts_with("Phoenix 2024-03-05"));
}

#[tokio::test]
async fn zero_length_streak_leaves_no_history_record() {
    let (app, _clock, store) = fixture(0);

    let (status, _) = post_empty(&app, "/v1/relapse").await;
    assert_eq!(status, StatusCode::OK);
    assert!(store.history().is_empty());
    assert_eq!(store.user_state().unwrap().relapse_count, 1);
}

#[tokio::test]
async fn relapse_withers_growing_trees_but_not_mature_ones() {
    let (app, _clock, store) = fixture(100);
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

    store.add_tree(ForestTree {
        id: Uuid::new_v4(),
        tree_type: "oak_sapling".into(),
        status: TreeStatus::Growing,
        purchase_date: start + Duration::hours(90),
        mature_date: start + Duration::hours(138),
        x: 0.5,
        y: 0.5,
    });
    store.add_tree(ForestTree {
        id: Uuid::new_v4(),
        tree_type: "oak_sapling".into(),
        status: TreeStatus::Matured,
        purchase_date: start,
        mature_date: start + Duration::hours(48),
        x: 0.2,
        y: 0.7,
    });

    post_empty(&app, "/v1/relapse").await;

    let trees = store.trees();
    let withered = trees.iter().filter(|t| t.status == TreeStatus::Withered).count();
    let mature = trees.iter().filter(|t| t.status == TreeStatus::Matured).count();
    assert_eq!(withered, 1);
    assert_eq!(mature, 1);
}

#[tokio::test]
async fn relapse_strips_the_scarlet_skin_and_discounts_it() {
    let (app, _clock, store) = fixture(100);

    // 100h streak affords the 1500-coin skin
    let (status, _) =
        post_json(&app, "/v1/shop/buy", serde_json::json!({"item_id": "scarlet_phoenix_skin"})).await;
    assert_eq!(status, StatusCode::OK);
    post_json(
        &app,
        "/v1/shop/equip",
        serde_json::json!({"item_id": "scarlet_phoenix_skin", "equip": true}),
    )
    .await;

    post_empty(&app, "/v1/relapse").await;

    let persisted = store.user_state().unwrap();
    assert!(!persisted.owns("scarlet_phoenix_skin"));
    assert!(persisted.equipped_slots.is_empty());

    // 1500 − 1500/100 = 1485; the discount survives the reset
    let item = store.shop_item("scarlet_phoenix_skin").unwrap();
    assert_eq!(item.cost, 1485);
}

#[tokio::test]
async fn repeat_relapses_keep_the_longest_streak() {
    let (app, clock, store) = fixture(100);

    post_empty(&app, "/v1/relapse").await;
    clock.advance(Duration::hours(40));
    post_empty(&app, "/v1/relapse").await;

    let persisted = store.user_state().unwrap();
    assert_eq!(persisted.relapse_count, 2);
    // the shorter second streak must not overwrite the record
    assert_eq!(persisted.longest_streak_ms, Duration::hours(100).num_milliseconds());
}

#[tokio::test]
async fn relapse_clears_the_potion_subsystem() {
    let (app, _clock, store) = fixture(100);
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

    let mut state = UserState::fresh(start);
    state.potion_inventory = 2;
    state.potion_purchases_this_streak = 2;
    state.potion_last_purchase_at = Some(start + Duration::hours(50));
    store.set_user_state(state);

    post_empty(&app, "/v1/relapse").await;

    let persisted = store.user_state().unwrap();
    assert_eq!(persisted.potion_inventory, 0);
    assert_eq!(persisted.potion_purchases_this_streak, 0);
    assert!(persisted.potion_last_purchase_at.is_none());
    assert!(persisted.potion_active_until.is_none());
}
