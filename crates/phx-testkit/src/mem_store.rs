//! In-memory `Store` used by daemon scenario tests.
//!
//! Mirrors the Postgres adapter's semantics: per-call consistency, no
//! cross-call transactions, `None` for absent rows.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use phx_db::Store;
use phx_schemas::{
    ForestTree, Minigame, MinigameSession, PhoenixHistoryRecord, ShopItem, TreeStatus, UrgeTask,
    UserState,
};
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    user_state: Option<UserState>,
    history: Vec<PhoenixHistoryRecord>,
    trees: Vec<ForestTree>,
    shop_items: BTreeMap<String, ShopItem>,
    minigames: BTreeMap<String, Minigame>,
    sessions: BTreeMap<Uuid, MinigameSession>,
    urge_tasks: BTreeMap<String, UrgeTask>,
}

#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_user_state(&self, state: UserState) {
        self.inner.lock().unwrap().user_state = Some(state);
    }

    pub fn add_shop_item(&self, item: ShopItem) {
        self.inner
            .lock()
            .unwrap()
            .shop_items
            .insert(item.id.clone(), item);
    }

    pub fn add_minigame(&self, game: Minigame) {
        self.inner
            .lock()
            .unwrap()
            .minigames
            .insert(game.id.clone(), game);
    }

    pub fn add_urge_task(&self, task: UrgeTask) {
        self.inner
            .lock()
            .unwrap()
            .urge_tasks
            .insert(task.id.clone(), task);
    }

    pub fn add_tree(&self, tree: ForestTree) {
        self.inner.lock().unwrap().trees.push(tree);
    }

    /// Direct peek for assertions that bypass the HTTP surface.
    pub fn user_state(&self) -> Option<UserState> {
        self.inner.lock().unwrap().user_state.clone()
    }

    pub fn history(&self) -> Vec<PhoenixHistoryRecord> {
        self.inner.lock().unwrap().history.clone()
    }

    pub fn trees(&self) -> Vec<ForestTree> {
        self.inner.lock().unwrap().trees.clone()
    }

    pub fn shop_item(&self, id: &str) -> Option<ShopItem> {
        self.inner.lock().unwrap().shop_items.get(id).cloned()
    }
}

#[async_trait]
impl Store for MemStore {
    async fn get_user_state(&self) -> Result<Option<UserState>> {
        Ok(self.inner.lock().unwrap().user_state.clone())
    }

    async fn put_user_state(&self, state: &UserState) -> Result<()> {
        self.inner.lock().unwrap().user_state = Some(state.clone());
        Ok(())
    }

    async fn insert_history(&self, record: &PhoenixHistoryRecord) -> Result<()> {
        self.inner.lock().unwrap().history.push(record.clone());
        Ok(())
    }

    async fn list_history(&self) -> Result<Vec<PhoenixHistoryRecord>> {
        let mut records = self.inner.lock().unwrap().history.clone();
        records.sort_by(|a, b| b.end_date.cmp(&a.end_date));
        Ok(records)
    }

    async fn list_forest_trees(&self) -> Result<Vec<ForestTree>> {
        Ok(self.inner.lock().unwrap().trees.clone())
    }

    async fn insert_forest_tree(&self, tree: &ForestTree) -> Result<()> {
        self.inner.lock().unwrap().trees.push(tree.clone());
        Ok(())
    }

    async fn wither_growing_trees(&self) -> Result<u64> {
        let mut inner = self.inner.lock().unwrap();
        let mut touched = 0u64;
        for tree in inner.trees.iter_mut() {
            if tree.status == TreeStatus::Growing {
                tree.status = TreeStatus::Withered;
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn get_shop_item(&self, id: &str) -> Result<Option<ShopItem>> {
        Ok(self.inner.lock().unwrap().shop_items.get(id).cloned())
    }

    async fn list_shop_items(&self) -> Result<Vec<ShopItem>> {
        Ok(self.inner.lock().unwrap().shop_items.values().cloned().collect())
    }

    async fn update_shop_item_cost(&self, id: &str, new_cost: i64) -> Result<()> {
        if let Some(item) = self.inner.lock().unwrap().shop_items.get_mut(id) {
            item.cost = new_cost;
        }
        Ok(())
    }

    async fn get_minigame(&self, id: &str) -> Result<Option<Minigame>> {
        Ok(self.inner.lock().unwrap().minigames.get(id).cloned())
    }

    async fn insert_minigame_session(&self, session: &MinigameSession) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn get_minigame_session(&self, id: Uuid) -> Result<Option<MinigameSession>> {
        Ok(self.inner.lock().unwrap().sessions.get(&id).cloned())
    }

    async fn update_minigame_session(&self, session: &MinigameSession) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .sessions
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn list_urge_tasks(&self) -> Result<Vec<UrgeTask>> {
        Ok(self.inner.lock().unwrap().urge_tasks.values().cloned().collect())
    }

    async fn get_urge_task(&self, id: &str) -> Result<Option<UrgeTask>> {
        Ok(self.inner.lock().unwrap().urge_tasks.get(id).cloned())
    }

    async fn update_urge_task(&self, task: &UrgeTask) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .urge_tasks
            .insert(task.id.clone(), task.clone());
        Ok(())
    }
}
