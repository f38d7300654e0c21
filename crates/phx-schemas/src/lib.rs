//! phx-schemas
//!
//! Shared data types for the phoenix streak tracker. Pure data: serde in,
//! serde out, no IO and no business logic beyond trivial derivations.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Shop catalog
// ---------------------------------------------------------------------------

/// Closed set of shop item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    PhoenixSkin,
    BackgroundTheme,
    ForestTheme,
    PhoenixAura,
    Potion,
    TreeSapling,
    Cosmetic,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::PhoenixSkin => "phoenix_skin",
            ItemType::BackgroundTheme => "background_theme",
            ItemType::ForestTheme => "forest_theme",
            ItemType::PhoenixAura => "phoenix_aura",
            ItemType::Potion => "potion",
            ItemType::TreeSapling => "tree_sapling",
            ItemType::Cosmetic => "cosmetic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "phoenix_skin" => Some(ItemType::PhoenixSkin),
            "background_theme" => Some(ItemType::BackgroundTheme),
            "forest_theme" => Some(ItemType::ForestTheme),
            "phoenix_aura" => Some(ItemType::PhoenixAura),
            "potion" => Some(ItemType::Potion),
            "tree_sapling" => Some(ItemType::TreeSapling),
            "cosmetic" => Some(ItemType::Cosmetic),
            _ => None,
        }
    }

    /// The mutually-exclusive equip slot this category occupies, if any.
    ///
    /// Potions, saplings and generic cosmetics are not equippable.
    pub fn equip_slot(&self) -> Option<EquipSlot> {
        match self {
            ItemType::PhoenixSkin => Some(EquipSlot::PhoenixSkin),
            ItemType::BackgroundTheme => Some(EquipSlot::BackgroundTheme),
            ItemType::ForestTheme => Some(EquipSlot::ForestTheme),
            ItemType::PhoenixAura => Some(EquipSlot::PhoenixAura),
            _ => None,
        }
    }

    /// Stacking items can be purchased repeatedly (no "already owned" check).
    pub fn is_stacking(&self) -> bool {
        matches!(self, ItemType::Potion | ItemType::TreeSapling)
    }
}

/// One cosmetic equip slot per exclusive item category.
///
/// Equipping writes the slot; exclusivity falls out of the map shape instead
/// of a catalog scan.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    PhoenixSkin,
    BackgroundTheme,
    ForestTheme,
    PhoenixAura,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: String,
    pub name: String,
    /// Whole coins.
    pub cost: i64,
    pub item_type: ItemType,
    /// Only set for `tree_sapling` items: hours from purchase to maturity.
    pub growth_hours: Option<f64>,
}

// ---------------------------------------------------------------------------
// UserState — the singleton baseline record
// ---------------------------------------------------------------------------

/// Acquisition metadata for an owned upgrade. Presence in the map means owned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnedUpgrade {
    pub purchased_at: DateTime<Utc>,
}

/// The single persistent baseline record (conceptually row id = 1).
///
/// Coins are never stored as a running total: `banked_coins` is the amount
/// locked in as of `coin_baseline_at`, and everything since is derived on
/// read by the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    /// Start of the current streak. Moves forward on relapse, backward when
    /// an urge-task reward grants bonus hours.
    pub last_reset_at: DateTime<Utc>,
    /// Instant up to which live accrual has already been folded into
    /// `banked_coins`. Advanced on every settle; never behind `last_reset_at`.
    pub coin_baseline_at: DateTime<Utc>,
    pub banked_coins: i64,
    /// Highest rank level whose level-up reward has been folded into
    /// `banked_coins`. Monotone within a streak; reset to 0 on relapse.
    pub last_claimed_level: i64,
    pub longest_streak_ms: i64,
    pub relapse_count: i64,
    pub owned_upgrades: BTreeMap<String, OwnedUpgrade>,
    pub equipped_slots: BTreeMap<EquipSlot, String>,
    pub potion_inventory: i64,
    pub potion_active_until: Option<DateTime<Utc>>,
    pub potion_relapse_used_at: Option<DateTime<Utc>>,
    pub potion_protected_uses_this_streak: i64,
    pub potion_purchases_this_streak: i64,
    pub potion_last_purchase_at: Option<DateTime<Utc>>,
}

impl UserState {
    /// A brand-new account whose streak starts at `now`.
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            last_reset_at: now,
            coin_baseline_at: now,
            banked_coins: 0,
            last_claimed_level: 0,
            longest_streak_ms: 0,
            relapse_count: 0,
            owned_upgrades: BTreeMap::new(),
            equipped_slots: BTreeMap::new(),
            potion_inventory: 0,
            potion_active_until: None,
            potion_relapse_used_at: None,
            potion_protected_uses_this_streak: 0,
            potion_purchases_this_streak: 0,
            potion_last_purchase_at: None,
        }
    }

    pub fn owns(&self, item_id: &str) -> bool {
        self.owned_upgrades.contains_key(item_id)
    }

    /// Whether a potion protection window is open at `now`.
    pub fn potion_active(&self, now: DateTime<Utc>) -> bool {
        matches!(self.potion_active_until, Some(until) if until > now)
    }
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeStatus {
    Growing,
    Matured,
    Withered,
}

impl TreeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreeStatus::Growing => "growing",
            TreeStatus::Matured => "matured",
            TreeStatus::Withered => "withered",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "growing" => Some(TreeStatus::Growing),
            "matured" => Some(TreeStatus::Matured),
            "withered" => Some(TreeStatus::Withered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestTree {
    pub id: Uuid,
    pub tree_type: String,
    /// Stored status. `matured` is usually derived lazily on read via
    /// [`ForestTree::status_at`]; `withered` is only ever written by relapse.
    pub status: TreeStatus,
    pub purchase_date: DateTime<Utc>,
    pub mature_date: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
}

impl ForestTree {
    /// Lazily derived status: a stored `growing` tree whose mature date has
    /// passed reads as `matured`. No background sweep ever rewrites rows.
    pub fn status_at(&self, now: DateTime<Utc>) -> TreeStatus {
        match self.status {
            TreeStatus::Growing if now >= self.mature_date => TreeStatus::Matured,
            other => other,
        }
    }
}

// ---------------------------------------------------------------------------
// Phoenix history
// ---------------------------------------------------------------------------

/// Append-only archive row created whenever a streak ends (or a relapse is
/// absorbed by a potion shield).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoenixHistoryRecord {
    pub id: Uuid,
    pub name: String,
    pub final_rank_name: String,
    pub final_rank_level: i64,
    pub streak_duration_ms: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Snapshot of `equipped_slots` at archive time.
    pub equipped_snapshot: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Minigames
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Minigame {
    pub id: String,
    pub name: String,
    pub entry_cost: i64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinigameSession {
    pub id: Uuid,
    pub game_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub score: Option<i64>,
    pub coins_won: Option<i64>,
}

// ---------------------------------------------------------------------------
// Urge tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgeTaskKind {
    /// Complete once `duration_minutes` of wall clock has elapsed since start.
    FixedTimer,
    /// Complete once `end_session` records the elapsed session seconds.
    LiveSession,
}

impl UrgeTaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgeTaskKind::FixedTimer => "fixed_timer",
            UrgeTaskKind::LiveSession => "live_session",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fixed_timer" => Some(UrgeTaskKind::FixedTimer),
            "live_session" => Some(UrgeTaskKind::LiveSession),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgeTask {
    pub id: String,
    pub name: String,
    pub kind: UrgeTaskKind,
    /// Only set for `fixed_timer` tasks.
    pub duration_minutes: Option<i64>,
    /// Fixed rewards; ignored for the `live_session` task, whose reward is
    /// computed from `last_session_seconds`.
    pub reward_coins: i64,
    pub reward_hours: f64,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub last_session_seconds: Option<i64>,
}

impl UrgeTask {
    /// Lazy completion test against `now` (no timers run server-side).
    pub fn is_complete(&self, now: DateTime<Utc>) -> bool {
        match self.kind {
            UrgeTaskKind::LiveSession => self.completed_at.is_some(),
            UrgeTaskKind::FixedTimer => match (self.started_at, self.duration_minutes) {
                (Some(started), Some(mins)) => {
                    now >= started + chrono::Duration::minutes(mins)
                }
                _ => false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::hours(h)
    }

    #[test]
    fn tree_status_is_derived_lazily() {
        let tree = ForestTree {
            id: Uuid::new_v4(),
            tree_type: "oak".to_string(),
            status: TreeStatus::Growing,
            purchase_date: at(0),
            mature_date: at(24),
            x: 0.5,
            y: 0.5,
        };
        assert_eq!(tree.status_at(at(23)), TreeStatus::Growing);
        assert_eq!(tree.status_at(at(24)), TreeStatus::Matured);
        // withered is sticky regardless of mature_date
        let withered = ForestTree {
            status: TreeStatus::Withered,
            ..tree
        };
        assert_eq!(withered.status_at(at(100)), TreeStatus::Withered);
    }

    #[test]
    fn fixed_timer_task_completes_on_deadline() {
        let task = UrgeTask {
            id: "breathing".to_string(),
            name: "Breathing".to_string(),
            kind: UrgeTaskKind::FixedTimer,
            duration_minutes: Some(60),
            reward_coins: 10,
            reward_hours: 0.0,
            started_at: Some(at(0)),
            completed_at: None,
            claimed_at: None,
            last_session_seconds: None,
        };
        assert!(!task.is_complete(at(0)));
        assert!(task.is_complete(at(1)));
    }

    #[test]
    fn equip_slot_serializes_as_snake_case_map_key() {
        let mut slots: BTreeMap<EquipSlot, String> = BTreeMap::new();
        slots.insert(EquipSlot::PhoenixSkin, "scarlet_phoenix_skin".to_string());
        let json = serde_json::to_value(&slots).unwrap();
        assert_eq!(json["phoenix_skin"], "scarlet_phoenix_skin");
    }
}
