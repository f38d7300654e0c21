//! Postgres implementation of [`Store`].
//!
//! All statements are parameterized runtime queries; rows are mapped by
//! hand with `try_get` so the crate compiles without a live database.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use phx_schemas::{
    ForestTree, ItemType, Minigame, MinigameSession, PhoenixHistoryRecord, ShopItem, TreeStatus,
    UrgeTask, UrgeTaskKind, UserState,
};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::store::Store;

/// The user_state table holds exactly one row with this id.
const SINGLETON_ID: i64 = 1;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_state_from_row(row: &sqlx::postgres::PgRow) -> Result<UserState> {
    Ok(UserState {
        last_reset_at: row.try_get("last_reset_at")?,
        coin_baseline_at: row.try_get("coin_baseline_at")?,
        banked_coins: row.try_get("banked_coins")?,
        last_claimed_level: row.try_get("last_claimed_level")?,
        longest_streak_ms: row.try_get("longest_streak_ms")?,
        relapse_count: row.try_get("relapse_count")?,
        owned_upgrades: serde_json::from_value(row.try_get("owned_upgrades")?)?,
        equipped_slots: serde_json::from_value(row.try_get("equipped_slots")?)?,
        potion_inventory: row.try_get("potion_inventory")?,
        potion_active_until: row.try_get("potion_active_until")?,
        potion_relapse_used_at: row.try_get("potion_relapse_used_at")?,
        potion_protected_uses_this_streak: row.try_get("potion_protected_uses")?,
        potion_purchases_this_streak: row.try_get("potion_purchases")?,
        potion_last_purchase_at: row.try_get("potion_last_purchase_at")?,
    })
}

fn shop_item_from_row(row: &sqlx::postgres::PgRow) -> Result<ShopItem> {
    let raw_type: String = row.try_get("item_type")?;
    Ok(ShopItem {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        cost: row.try_get("cost")?,
        item_type: ItemType::parse(&raw_type)
            .ok_or_else(|| anyhow!("invalid item type in catalog: {raw_type}"))?,
        growth_hours: row.try_get("growth_hours")?,
    })
}

fn tree_from_row(row: &sqlx::postgres::PgRow) -> Result<ForestTree> {
    let raw_status: String = row.try_get("status")?;
    Ok(ForestTree {
        id: row.try_get("id")?,
        tree_type: row.try_get("tree_type")?,
        status: TreeStatus::parse(&raw_status)
            .ok_or_else(|| anyhow!("invalid tree status: {raw_status}"))?,
        purchase_date: row.try_get("purchase_date")?,
        mature_date: row.try_get("mature_date")?,
        x: row.try_get("x")?,
        y: row.try_get("y")?,
    })
}

fn task_from_row(row: &sqlx::postgres::PgRow) -> Result<UrgeTask> {
    let raw_kind: String = row.try_get("kind")?;
    Ok(UrgeTask {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: UrgeTaskKind::parse(&raw_kind)
            .ok_or_else(|| anyhow!("invalid urge task kind: {raw_kind}"))?,
        duration_minutes: row.try_get("duration_minutes")?,
        reward_coins: row.try_get("reward_coins")?,
        reward_hours: row.try_get("reward_hours")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        claimed_at: row.try_get("claimed_at")?,
        last_session_seconds: row.try_get("last_session_seconds")?,
    })
}

fn session_from_row(row: &sqlx::postgres::PgRow) -> Result<MinigameSession> {
    Ok(MinigameSession {
        id: row.try_get("id")?,
        game_id: row.try_get("game_id")?,
        started_at: row.try_get("started_at")?,
        ended_at: row.try_get("ended_at")?,
        score: row.try_get("score")?,
        coins_won: row.try_get("coins_won")?,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn get_user_state(&self) -> Result<Option<UserState>> {
        let row = sqlx::query(
            r#"
            select
              last_reset_at, coin_baseline_at, banked_coins, last_claimed_level,
              longest_streak_ms, relapse_count, owned_upgrades, equipped_slots,
              potion_inventory, potion_active_until, potion_relapse_used_at,
              potion_protected_uses, potion_purchases, potion_last_purchase_at
            from user_state
            where id = $1
            "#,
        )
        .bind(SINGLETON_ID)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_state_from_row).transpose()
    }

    async fn put_user_state(&self, state: &UserState) -> Result<()> {
        sqlx::query(
            r#"
            insert into user_state (
              id, last_reset_at, coin_baseline_at, banked_coins, last_claimed_level,
              longest_streak_ms, relapse_count, owned_upgrades, equipped_slots,
              potion_inventory, potion_active_until, potion_relapse_used_at,
              potion_protected_uses, potion_purchases, potion_last_purchase_at
            ) values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            on conflict (id) do update set
              last_reset_at = excluded.last_reset_at,
              coin_baseline_at = excluded.coin_baseline_at,
              banked_coins = excluded.banked_coins,
              last_claimed_level = excluded.last_claimed_level,
              longest_streak_ms = excluded.longest_streak_ms,
              relapse_count = excluded.relapse_count,
              owned_upgrades = excluded.owned_upgrades,
              equipped_slots = excluded.equipped_slots,
              potion_inventory = excluded.potion_inventory,
              potion_active_until = excluded.potion_active_until,
              potion_relapse_used_at = excluded.potion_relapse_used_at,
              potion_protected_uses = excluded.potion_protected_uses,
              potion_purchases = excluded.potion_purchases,
              potion_last_purchase_at = excluded.potion_last_purchase_at
            "#,
        )
        .bind(SINGLETON_ID)
        .bind(state.last_reset_at)
        .bind(state.coin_baseline_at)
        .bind(state.banked_coins)
        .bind(state.last_claimed_level)
        .bind(state.longest_streak_ms)
        .bind(state.relapse_count)
        .bind(serde_json::to_value(&state.owned_upgrades)?)
        .bind(serde_json::to_value(&state.equipped_slots)?)
        .bind(state.potion_inventory)
        .bind(state.potion_active_until)
        .bind(state.potion_relapse_used_at)
        .bind(state.potion_protected_uses_this_streak)
        .bind(state.potion_purchases_this_streak)
        .bind(state.potion_last_purchase_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_history(&self, record: &PhoenixHistoryRecord) -> Result<()> {
        sqlx::query(
            r#"
            insert into phoenix_history (
              id, name, final_rank_name, final_rank_level, streak_duration_ms,
              start_date, end_date, equipped_snapshot
            ) values ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.final_rank_name)
        .bind(record.final_rank_level)
        .bind(record.streak_duration_ms)
        .bind(record.start_date)
        .bind(record.end_date)
        .bind(&record.equipped_snapshot)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_history(&self) -> Result<Vec<PhoenixHistoryRecord>> {
        let rows = sqlx::query(
            r#"
            select id, name, final_rank_name, final_rank_level, streak_duration_ms,
                   start_date, end_date, equipped_snapshot
            from phoenix_history
            order by end_date desc
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(PhoenixHistoryRecord {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    final_rank_name: row.try_get("final_rank_name")?,
                    final_rank_level: row.try_get("final_rank_level")?,
                    streak_duration_ms: row.try_get("streak_duration_ms")?,
                    start_date: row.try_get("start_date")?,
                    end_date: row.try_get("end_date")?,
                    equipped_snapshot: row.try_get("equipped_snapshot")?,
                })
            })
            .collect()
    }

    async fn list_forest_trees(&self) -> Result<Vec<ForestTree>> {
        let rows = sqlx::query(
            r#"
            select id, tree_type, status, purchase_date, mature_date, x, y
            from forest_trees
            order by purchase_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(tree_from_row).collect()
    }

    async fn insert_forest_tree(&self, tree: &ForestTree) -> Result<()> {
        sqlx::query(
            r#"
            insert into forest_trees (id, tree_type, status, purchase_date, mature_date, x, y)
            values ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(tree.id)
        .bind(&tree.tree_type)
        .bind(tree.status.as_str())
        .bind(tree.purchase_date)
        .bind(tree.mature_date)
        .bind(tree.x)
        .bind(tree.y)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn wither_growing_trees(&self) -> Result<u64> {
        let res = sqlx::query("update forest_trees set status = 'withered' where status = 'growing'")
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn get_shop_item(&self, id: &str) -> Result<Option<ShopItem>> {
        let row = sqlx::query(
            "select id, name, cost, item_type, growth_hours from shop_items where id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(shop_item_from_row).transpose()
    }

    async fn list_shop_items(&self) -> Result<Vec<ShopItem>> {
        let rows =
            sqlx::query("select id, name, cost, item_type, growth_hours from shop_items order by id")
                .fetch_all(&self.pool)
                .await?;

        rows.iter().map(shop_item_from_row).collect()
    }

    async fn update_shop_item_cost(&self, id: &str, new_cost: i64) -> Result<()> {
        sqlx::query("update shop_items set cost = $2 where id = $1")
            .bind(id)
            .bind(new_cost)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_minigame(&self, id: &str) -> Result<Option<Minigame>> {
        let row = sqlx::query("select id, name, entry_cost, is_active from minigames where id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| {
            Ok(Minigame {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                entry_cost: row.try_get("entry_cost")?,
                is_active: row.try_get("is_active")?,
            })
        })
        .transpose()
    }

    async fn insert_minigame_session(&self, session: &MinigameSession) -> Result<()> {
        sqlx::query(
            r#"
            insert into minigame_sessions (id, game_id, started_at, ended_at, score, coins_won)
            values ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(session.id)
        .bind(&session.game_id)
        .bind(session.started_at)
        .bind(session.ended_at)
        .bind(session.score)
        .bind(session.coins_won)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_minigame_session(&self, id: Uuid) -> Result<Option<MinigameSession>> {
        let row = sqlx::query(
            "select id, game_id, started_at, ended_at, score, coins_won from minigame_sessions where id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn update_minigame_session(&self, session: &MinigameSession) -> Result<()> {
        sqlx::query(
            r#"
            update minigame_sessions
            set ended_at = $2, score = $3, coins_won = $4
            where id = $1
            "#,
        )
        .bind(session.id)
        .bind(session.ended_at)
        .bind(session.score)
        .bind(session.coins_won)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_urge_tasks(&self) -> Result<Vec<UrgeTask>> {
        let rows = sqlx::query(
            r#"
            select id, name, kind, duration_minutes, reward_coins, reward_hours,
                   started_at, completed_at, claimed_at, last_session_seconds
            from urge_tasks
            order by id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    async fn get_urge_task(&self, id: &str) -> Result<Option<UrgeTask>> {
        let row = sqlx::query(
            r#"
            select id, name, kind, duration_minutes, reward_coins, reward_hours,
                   started_at, completed_at, claimed_at, last_session_seconds
            from urge_tasks
            where id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(task_from_row).transpose()
    }

    async fn update_urge_task(&self, task: &UrgeTask) -> Result<()> {
        sqlx::query(
            r#"
            update urge_tasks
            set started_at = $2, completed_at = $3, claimed_at = $4, last_session_seconds = $5
            where id = $1
            "#,
        )
        .bind(&task.id)
        .bind(task.started_at)
        .bind(task.completed_at)
        .bind(task.claimed_at)
        .bind(task.last_session_seconds)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
