//! Storage contract shared by the Postgres adapter and the in-process test
//! store.
//!
//! Every call is strongly consistent on its own, but calls are NOT
//! transactional across each other — the daemon serializes mutating request
//! flows behind a single mutex instead (single-tenant, single row).

use anyhow::Result;
use async_trait::async_trait;
use phx_schemas::{
    ForestTree, Minigame, MinigameSession, PhoenixHistoryRecord, ShopItem, UrgeTask, UserState,
};
use uuid::Uuid;

#[async_trait]
pub trait Store: Send + Sync {
    // -- singleton user state -------------------------------------------

    /// `None` only before first boot; the daemon seeds the row at startup.
    async fn get_user_state(&self) -> Result<Option<UserState>>;

    /// Whole-row upsert. Single-writer under the daemon's mutation mutex.
    async fn put_user_state(&self, state: &UserState) -> Result<()>;

    // -- phoenix history -------------------------------------------------

    async fn insert_history(&self, record: &PhoenixHistoryRecord) -> Result<()>;

    /// Newest first.
    async fn list_history(&self) -> Result<Vec<PhoenixHistoryRecord>>;

    // -- forest ----------------------------------------------------------

    async fn list_forest_trees(&self) -> Result<Vec<ForestTree>>;

    async fn insert_forest_tree(&self, tree: &ForestTree) -> Result<()>;

    /// Bulk transition of all stored-`growing` trees to `withered`
    /// (relapse side effect). Returns the number of rows touched.
    async fn wither_growing_trees(&self) -> Result<u64>;

    // -- shop catalog ----------------------------------------------------

    async fn get_shop_item(&self, id: &str) -> Result<Option<ShopItem>>;

    async fn list_shop_items(&self) -> Result<Vec<ShopItem>>;

    /// Persists the relapse-exclusive discount back into the catalog.
    async fn update_shop_item_cost(&self, id: &str, new_cost: i64) -> Result<()>;

    // -- minigames -------------------------------------------------------

    async fn get_minigame(&self, id: &str) -> Result<Option<Minigame>>;

    async fn insert_minigame_session(&self, session: &MinigameSession) -> Result<()>;

    async fn get_minigame_session(&self, id: Uuid) -> Result<Option<MinigameSession>>;

    async fn update_minigame_session(&self, session: &MinigameSession) -> Result<()>;

    // -- urge tasks ------------------------------------------------------

    async fn list_urge_tasks(&self) -> Result<Vec<UrgeTask>>;

    async fn get_urge_task(&self, id: &str) -> Result<Option<UrgeTask>>;

    async fn update_urge_task(&self, task: &UrgeTask) -> Result<()>;
}
