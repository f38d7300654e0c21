//! Relapse: archive the streak, then either absorb it (potion shield) or
//! reset the baseline.

use phx_reconcile::{reconcile, settle};
use phx_schemas::PhoenixHistoryRecord;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::api_types::StateResponse;
use crate::error::ApiResult;
use crate::ops::{load_state, view};
use crate::state::AppState;

/// The relapse-exclusive skin: stripped on every relapse, with a cumulative
/// 1% catalog discount each time.
const RELAPSE_EXCLUSIVE_ITEM: &str = "scarlet_phoenix_skin";

/// At most this many relapses can be absorbed per streak.
const MAX_SHIELDED_USES_PER_STREAK: i64 = 2;

pub async fn relapse(st: &AppState) -> ApiResult<StateResponse> {
    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let mut state = load_state(st).await?;
    let rec = reconcile(&state, now);
    let elapsed_ms = (now - state.last_reset_at).num_milliseconds().max(0);

    let shielded = state.potion_active(now)
        && state.potion_relapse_used_at.is_none()
        && state.potion_protected_uses_this_streak < MAX_SHIELDED_USES_PER_STREAK;

    // archive first; the baseline write below may still fail, leaving an
    // orphaned history row (accepted best-effort inconsistency, logged)
    if elapsed_ms > 0 {
        let name = if shielded {
            format!("Phoenix {} (shielded)", now.format("%Y-%m-%d %H:%M"))
        } else {
            format!("Phoenix {}", now.format("%Y-%m-%d %H:%M"))
        };
        let record = PhoenixHistoryRecord {
            id: Uuid::new_v4(),
            name,
            final_rank_name: rec.rank.name.to_string(),
            final_rank_level: rec.rank.level as i64,
            streak_duration_ms: elapsed_ms,
            start_date: state.last_reset_at,
            end_date: now,
            equipped_snapshot: serde_json::to_value(&state.equipped_slots)
                .unwrap_or_else(|_| serde_json::json!({})),
        };
        st.store.insert_history(&record).await?;
    }

    if shielded {
        // absorbed: the streak clock and relapse counter are untouched
        state.potion_relapse_used_at = Some(now);
        state.potion_protected_uses_this_streak += 1;

        if let Err(err) = st.store.put_user_state(&state).await {
            error!(error = %err, "shield bookkeeping write failed; history row may be orphaned");
            return Err(err.into());
        }
        warn!(uses = state.potion_protected_uses_this_streak, "relapse absorbed by potion shield");
        return Ok(view(state, now));
    }

    // fold everything earned into the bank before the clocks reset
    settle(&mut state, now);
    state.last_reset_at = now;
    state.coin_baseline_at = now;
    state.last_claimed_level = 0;
    state.relapse_count += 1;
    state.longest_streak_ms = state.longest_streak_ms.max(elapsed_ms);

    // potion subsystem is scoped to the streak
    state.potion_inventory = 0;
    state.potion_active_until = None;
    state.potion_relapse_used_at = None;
    state.potion_protected_uses_this_streak = 0;
    state.potion_purchases_this_streak = 0;
    state.potion_last_purchase_at = None;

    strip_relapse_exclusive(st, &mut state).await?;

    let withered = st.store.wither_growing_trees().await?;

    if let Err(err) = st.store.put_user_state(&state).await {
        error!(error = %err, "baseline reset write failed; history/tree writes may be orphaned");
        return Err(err.into());
    }

    info!(
        relapse_count = state.relapse_count,
        streak_ms = elapsed_ms,
        withered_trees = withered,
        "relapse recorded"
    );
    Ok(view(state, now))
}

/// Remove the scarlet skin (owned + equipped) and rewrite its catalog cost
/// down by 1%, floor division, never below zero. The discount has no reset.
async fn strip_relapse_exclusive(
    st: &AppState,
    state: &mut phx_schemas::UserState,
) -> ApiResult<()> {
    if state.owned_upgrades.remove(RELAPSE_EXCLUSIVE_ITEM).is_none() {
        return Ok(());
    }

    state
        .equipped_slots
        .retain(|_, item_id| item_id != RELAPSE_EXCLUSIVE_ITEM);

    if let Some(item) = st.store.get_shop_item(RELAPSE_EXCLUSIVE_ITEM).await? {
        let new_cost = item.cost - item.cost / 100;
        st.store
            .update_shop_item_cost(RELAPSE_EXCLUSIVE_ITEM, new_cost)
            .await?;
        info!(old_cost = item.cost, new_cost, "relapse-exclusive skin stripped and discounted");
    }

    Ok(())
}
