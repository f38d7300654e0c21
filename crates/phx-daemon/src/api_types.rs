//! Request and response types for all phx-daemon HTTP endpoints.
//!
//! `Serialize + Deserialize` so they can be JSON-encoded by Axum and decoded
//! by tests. No business logic lives here.

use chrono::{DateTime, Utc};
use phx_schemas::{
    ForestTree, PhoenixHistoryRecord, ShopItem, TreeStatus, UrgeTask, UserState,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// /v1/health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
}

// ---------------------------------------------------------------------------
// /v1/state — reconciled account view, returned by most mutations too
// ---------------------------------------------------------------------------

/// The persisted baseline plus everything derived from it at request time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    #[serde(flatten)]
    pub state: UserState,
    /// banked + live accrual + unclaimed level rewards, as of `as_of`.
    pub total_available_coins: i64,
    pub rank_name: String,
    pub rank_level: i64,
    pub streak_hours: f64,
    pub potion_active: bool,
    pub as_of: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// /v1/shop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopItemView {
    #[serde(flatten)]
    pub item: ShopItem,
    pub owned: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopResponse {
    pub items: Vec<ShopItemView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyRequest {
    pub item_id: String,
    /// Planting coordinates, only meaningful for tree saplings.
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipRequest {
    pub item_id: String,
    pub equip: bool,
}

// ---------------------------------------------------------------------------
// /v1/forest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestTreeView {
    #[serde(flatten)]
    pub tree: ForestTree,
    /// Lazily derived status as of the request (`growing` past its mature
    /// date reads as `matured`).
    pub effective_status: TreeStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestResponse {
    pub trees: Vec<ForestTreeView>,
}

// ---------------------------------------------------------------------------
// /v1/history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub records: Vec<PhoenixHistoryRecord>,
}

// ---------------------------------------------------------------------------
// /v1/minigame
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinigameStartRequest {
    pub game_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinigameStartResponse {
    pub session_id: Uuid,
    pub state: StateResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinigameEndRequest {
    pub session_id: Uuid,
    /// Client-reported; accepted subject to the configured score validator.
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinigameEndResponse {
    pub coins_won: i64,
    pub state: StateResponse,
}

// ---------------------------------------------------------------------------
// /v1/urge
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgeTaskView {
    #[serde(flatten)]
    pub task: UrgeTask,
    pub complete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgeTasksResponse {
    pub tasks: Vec<UrgeTaskView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgeTaskRequest {
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgeClaimResponse {
    pub reward_coins: i64,
    pub bonus_hours: f64,
    pub state: StateResponse,
}
