//! Mutation handlers — each one is the read-reconcile-validate-write
//! sequence from the product's currency model, run under the daemon's
//! write lock. Validation happens before any write so a refused request
//! leaves no partial mutation behind.

pub mod minigame;
pub mod potion;
pub mod relapse;
pub mod shop;
pub mod urge;

use chrono::{DateTime, Utc};
use phx_reconcile::reconcile;
use phx_schemas::UserState;

use crate::api_types::StateResponse;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Fetch the singleton baseline row; absent means the daemon was never
/// seeded, which reads as not-found rather than a storage failure.
pub(crate) async fn load_state(st: &AppState) -> ApiResult<UserState> {
    st.store
        .get_user_state()
        .await?
        .ok_or_else(|| ApiError::not_found("user state is not initialized"))
}

/// The reconciled account view returned by `/v1/state` and by every
/// successful mutation.
pub(crate) fn view(state: UserState, now: DateTime<Utc>) -> StateResponse {
    let rec = reconcile(&state, now);
    let potion_active = state.potion_active(now);
    StateResponse {
        total_available_coins: rec.total_available,
        rank_name: rec.rank.name.to_string(),
        rank_level: rec.rank.level as i64,
        streak_hours: rec.streak_hours,
        potion_active,
        as_of: now,
        state,
    }
}
