//! Shop purchase and equip handlers.

use chrono::Duration;
use phx_reconcile::{reconcile, settle};
use phx_schemas::{ForestTree, ItemType, OwnedUpgrade, TreeStatus};
use tracing::{error, info};
use uuid::Uuid;

use crate::api_types::{BuyRequest, EquipRequest, StateResponse};
use crate::error::{ApiError, ApiResult};
use crate::ops::{load_state, view};
use crate::state::AppState;

/// Potion purchase policy: at most this many per streak.
const POTION_PURCHASES_PER_STREAK: i64 = 2;
/// Minimum gap between potion purchases.
const POTION_PURCHASE_GAP_HOURS: i64 = 48;

/// Planting coordinates are clamped into the visible forest area.
const TREE_X_RANGE: (f64, f64) = (0.05, 0.95);
const TREE_Y_RANGE: (f64, f64) = (0.08, 0.92);

pub async fn buy(st: &AppState, req: BuyRequest) -> ApiResult<StateResponse> {
    if req.item_id.is_empty() {
        return Err(ApiError::validation("item_id is required"));
    }

    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let item = st
        .store
        .get_shop_item(&req.item_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("unknown shop item: {}", req.item_id)))?;

    let mut state = load_state(st).await?;
    let rec = reconcile(&state, now);

    // action-specific preconditions, checked before any write
    match item.item_type {
        ItemType::Potion => {
            if state.potion_purchases_this_streak >= POTION_PURCHASES_PER_STREAK {
                return Err(ApiError::precondition(
                    "potion purchase limit reached for this streak",
                ));
            }
            if let Some(last) = state.potion_last_purchase_at {
                if now < last + Duration::hours(POTION_PURCHASE_GAP_HOURS) {
                    return Err(ApiError::precondition(
                        "potion purchase cooldown has not elapsed",
                    ));
                }
            }
        }
        _ if !item.item_type.is_stacking() && state.owns(&item.id) => {
            return Err(ApiError::precondition("item already owned"));
        }
        _ => {}
    }

    if rec.total_available < item.cost {
        return Err(ApiError::precondition(format!(
            "insufficient coins: have {}, need {}",
            rec.total_available, item.cost
        )));
    }

    // settle, then spend; the streak clock keeps running
    settle(&mut state, now);
    state.banked_coins -= item.cost;

    match item.item_type {
        ItemType::Potion => {
            state.potion_inventory += 1;
            state.potion_purchases_this_streak += 1;
            state.potion_last_purchase_at = Some(now);
        }
        ItemType::TreeSapling => {
            let growth_hours = item.growth_hours.unwrap_or(48.0);
            let tree = ForestTree {
                id: Uuid::new_v4(),
                tree_type: item.id.clone(),
                status: TreeStatus::Growing,
                purchase_date: now,
                mature_date: now
                    + Duration::milliseconds((growth_hours * 3_600_000.0) as i64),
                x: req.x.unwrap_or(0.5).clamp(TREE_X_RANGE.0, TREE_X_RANGE.1),
                y: req.y.unwrap_or(0.5).clamp(TREE_Y_RANGE.0, TREE_Y_RANGE.1),
            };
            st.store.insert_forest_tree(&tree).await?;
        }
        _ => {
            state
                .owned_upgrades
                .insert(item.id.clone(), OwnedUpgrade { purchased_at: now });
        }
    }

    if let Err(err) = st.store.put_user_state(&state).await {
        // a sapling insert may already have landed; best-effort, not hidden
        error!(item = %item.id, error = %err, "baseline write failed after purchase side effects");
        return Err(err.into());
    }

    info!(item = %item.id, cost = item.cost, "shop purchase");
    Ok(view(state, now))
}

pub async fn equip(st: &AppState, req: EquipRequest) -> ApiResult<StateResponse> {
    if req.item_id.is_empty() {
        return Err(ApiError::validation("item_id is required"));
    }

    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let item = st
        .store
        .get_shop_item(&req.item_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("unknown shop item: {}", req.item_id)))?;

    let slot = item
        .item_type
        .equip_slot()
        .ok_or_else(|| ApiError::validation("item type cannot be equipped"))?;

    let mut state = load_state(st).await?;
    if !state.owns(&item.id) {
        return Err(ApiError::precondition("item not owned"));
    }

    if req.equip {
        // writing the slot displaces any same-category occupant
        state.equipped_slots.insert(slot, item.id.clone());
    } else if state.equipped_slots.get(&slot) == Some(&item.id) {
        state.equipped_slots.remove(&slot);
    }

    st.store.put_user_state(&state).await?;
    Ok(view(state, now))
}
