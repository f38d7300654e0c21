//! Axum router and all HTTP handlers for phx-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers. Handlers stay thin: decode, delegate to `ops`, encode.

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::api_types::{
    BuyRequest, EquipRequest, ForestResponse, ForestTreeView, HealthResponse, HistoryResponse,
    MinigameEndRequest, MinigameEndResponse, MinigameStartRequest, MinigameStartResponse,
    ShopItemView, ShopResponse, StateResponse, UrgeClaimResponse, UrgeTaskRequest, UrgeTaskView,
    UrgeTasksResponse,
};
use crate::error::ApiResult;
use crate::ops;
use crate::state::AppState;

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/state", get(state_view))
        .route("/v1/shop", get(shop_catalog))
        .route("/v1/shop/buy", post(shop_buy))
        .route("/v1/shop/equip", post(shop_equip))
        .route("/v1/relapse", post(relapse))
        .route("/v1/potion/activate", post(potion_activate))
        .route("/v1/forest", get(forest))
        .route("/v1/history", get(history))
        .route("/v1/minigame/start", post(minigame_start))
        .route("/v1/minigame/end", post(minigame_end))
        .route("/v1/urge/tasks", get(urge_tasks))
        .route("/v1/urge/start", post(urge_start))
        .route("/v1/urge/end_session", post(urge_end_session))
        .route("/v1/urge/claim", post(urge_claim))
        .route("/v1/urge/cancel", post(urge_cancel))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        service: st.build.service.to_string(),
        version: st.build.version.to_string(),
    })
}

/// Reconciled account view. Pure read: derives the spendable total from the
/// baseline without writing anything back.
pub(crate) async fn state_view(State(st): State<Arc<AppState>>) -> ApiResult<Json<StateResponse>> {
    let now = st.clock.now();
    let state = ops::load_state(&st).await?;
    Ok(Json(ops::view(state, now)))
}

pub(crate) async fn shop_catalog(State(st): State<Arc<AppState>>) -> ApiResult<Json<ShopResponse>> {
    let state = ops::load_state(&st).await?;
    let items = st
        .store
        .list_shop_items()
        .await?
        .into_iter()
        .map(|item| ShopItemView {
            owned: state.owns(&item.id),
            item,
        })
        .collect();
    Ok(Json(ShopResponse { items }))
}

pub(crate) async fn forest(State(st): State<Arc<AppState>>) -> ApiResult<Json<ForestResponse>> {
    let now = st.clock.now();
    let trees = st
        .store
        .list_forest_trees()
        .await?
        .into_iter()
        .map(|tree| ForestTreeView {
            effective_status: tree.status_at(now),
            tree,
        })
        .collect();
    Ok(Json(ForestResponse { trees }))
}

pub(crate) async fn history(State(st): State<Arc<AppState>>) -> ApiResult<Json<HistoryResponse>> {
    let records = st.store.list_history().await?;
    Ok(Json(HistoryResponse { records }))
}

pub(crate) async fn urge_tasks(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<UrgeTasksResponse>> {
    let now = st.clock.now();
    let tasks = st
        .store
        .list_urge_tasks()
        .await?
        .into_iter()
        .map(|task| UrgeTaskView {
            complete: task.is_complete(now),
            task,
        })
        .collect();
    Ok(Json(UrgeTasksResponse { tasks }))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

pub(crate) async fn shop_buy(
    State(st): State<Arc<AppState>>,
    Json(req): Json<BuyRequest>,
) -> ApiResult<Json<StateResponse>> {
    ops::shop::buy(&st, req).await.map(Json)
}

pub(crate) async fn shop_equip(
    State(st): State<Arc<AppState>>,
    Json(req): Json<EquipRequest>,
) -> ApiResult<Json<StateResponse>> {
    ops::shop::equip(&st, req).await.map(Json)
}

pub(crate) async fn relapse(State(st): State<Arc<AppState>>) -> ApiResult<Json<StateResponse>> {
    ops::relapse::relapse(&st).await.map(Json)
}

pub(crate) async fn potion_activate(
    State(st): State<Arc<AppState>>,
) -> ApiResult<Json<StateResponse>> {
    ops::potion::activate(&st).await.map(Json)
}

pub(crate) async fn minigame_start(
    State(st): State<Arc<AppState>>,
    Json(req): Json<MinigameStartRequest>,
) -> ApiResult<Json<MinigameStartResponse>> {
    ops::minigame::start(&st, req).await.map(Json)
}

pub(crate) async fn minigame_end(
    State(st): State<Arc<AppState>>,
    Json(req): Json<MinigameEndRequest>,
) -> ApiResult<Json<MinigameEndResponse>> {
    ops::minigame::end(&st, req).await.map(Json)
}

pub(crate) async fn urge_start(
    State(st): State<Arc<AppState>>,
    Json(req): Json<UrgeTaskRequest>,
) -> ApiResult<Json<StateResponse>> {
    ops::urge::start(&st, req).await.map(Json)
}

pub(crate) async fn urge_end_session(
    State(st): State<Arc<AppState>>,
    Json(req): Json<UrgeTaskRequest>,
) -> ApiResult<Json<StateResponse>> {
    ops::urge::end_session(&st, req).await.map(Json)
}

pub(crate) async fn urge_claim(
    State(st): State<Arc<AppState>>,
    Json(req): Json<UrgeTaskRequest>,
) -> ApiResult<Json<UrgeClaimResponse>> {
    ops::urge::claim(&st, req).await.map(Json)
}

pub(crate) async fn urge_cancel(
    State(st): State<Arc<AppState>>,
    Json(req): Json<UrgeTaskRequest>,
) -> ApiResult<Json<StateResponse>> {
    ops::urge::cancel(&st, req).await.map(Json)
}
