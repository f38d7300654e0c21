//! Canonical test fixtures, kept in lockstep with the seed migration
//! (phx-db/migrations/0002_seed_catalog.sql).

use chrono::{DateTime, Utc};
use phx_schemas::{ItemType, Minigame, ShopItem, UrgeTask, UrgeTaskKind, UserState};

use crate::mem_store::MemStore;

pub fn seed_shop_items() -> Vec<ShopItem> {
    fn item(id: &str, name: &str, cost: i64, item_type: ItemType, growth_hours: Option<f64>) -> ShopItem {
        ShopItem {
            id: id.to_string(),
            name: name.to_string(),
            cost,
            item_type,
            growth_hours,
        }
    }

    vec![
        item("scarlet_phoenix_skin", "Scarlet Phoenix Skin", 1500, ItemType::PhoenixSkin, None),
        item("golden_phoenix_skin", "Golden Phoenix Skin", 2500, ItemType::PhoenixSkin, None),
        item("obsidian_phoenix_skin", "Obsidian Phoenix Skin", 4000, ItemType::PhoenixSkin, None),
        item("night_sky_background", "Night Sky Background", 800, ItemType::BackgroundTheme, None),
        item("volcano_background", "Volcano Background", 1200, ItemType::BackgroundTheme, None),
        item("autumn_forest_theme", "Autumn Forest Theme", 900, ItemType::ForestTheme, None),
        item("crystal_forest_theme", "Crystal Forest Theme", 1800, ItemType::ForestTheme, None),
        item("ember_aura", "Ember Aura", 600, ItemType::PhoenixAura, None),
        item("solar_flare_aura", "Solar Flare Aura", 2200, ItemType::PhoenixAura, None),
        item("shield_potion", "Shield Potion", 500, ItemType::Potion, None),
        item("oak_sapling", "Oak Sapling", 150, ItemType::TreeSapling, Some(48.0)),
        item("willow_sapling", "Willow Sapling", 300, ItemType::TreeSapling, Some(96.0)),
        item("cherry_sapling", "Cherry Blossom Sapling", 500, ItemType::TreeSapling, Some(168.0)),
        item("phoenix_pennant", "Phoenix Pennant", 250, ItemType::Cosmetic, None),
    ]
}

pub fn seed_minigames() -> Vec<Minigame> {
    vec![
        Minigame {
            id: "ash_asteroids".to_string(),
            name: "Ash Asteroids".to_string(),
            entry_cost: 50,
            is_active: true,
        },
        Minigame {
            id: "ember_flight".to_string(),
            name: "Ember Flight".to_string(),
            entry_cost: 75,
            is_active: true,
        },
    ]
}

pub fn seed_urge_tasks() -> Vec<UrgeTask> {
    fn fixed(id: &str, name: &str, minutes: i64, coins: i64, hours: f64) -> UrgeTask {
        UrgeTask {
            id: id.to_string(),
            name: name.to_string(),
            kind: UrgeTaskKind::FixedTimer,
            duration_minutes: Some(minutes),
            reward_coins: coins,
            reward_hours: hours,
            started_at: None,
            completed_at: None,
            claimed_at: None,
            last_session_seconds: None,
        }
    }

    vec![
        fixed("breathing_exercise", "Breathing Exercise", 5, 25, 0.25),
        fixed("cold_shower", "Cold Shower", 10, 60, 0.5),
        fixed("evening_walk", "Evening Walk", 30, 120, 1.0),
        UrgeTask {
            id: "focus_session".to_string(),
            name: "Focus Session".to_string(),
            kind: UrgeTaskKind::LiveSession,
            duration_minutes: None,
            reward_coins: 0,
            reward_hours: 0.0,
            started_at: None,
            completed_at: None,
            claimed_at: None,
            last_session_seconds: None,
        },
    ]
}

/// A `MemStore` loaded with the full seed catalog and a fresh user state
/// whose streak starts at `streak_start`.
pub fn seeded_store(streak_start: DateTime<Utc>) -> MemStore {
    let store = MemStore::new();
    for item in seed_shop_items() {
        store.add_shop_item(item);
    }
    for game in seed_minigames() {
        store.add_minigame(game);
    }
    for task in seed_urge_tasks() {
        store.add_urge_task(task);
    }
    store.set_user_state(UserState::fresh(streak_start));
    store
}
