//! Potion activation. Shield eligibility itself is evaluated inside the
//! relapse handler; this op only opens the protection window.

use chrono::Duration;
use tracing::info;

use crate::api_types::StateResponse;
use crate::error::{ApiError, ApiResult};
use crate::ops::{load_state, view};
use crate::state::AppState;

/// Length of the protection window opened by one potion.
const POTION_WINDOW_HOURS: i64 = 12;

pub async fn activate(st: &AppState) -> ApiResult<StateResponse> {
    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let mut state = load_state(st).await?;

    if state.potion_inventory <= 0 {
        return Err(ApiError::precondition("no potions in inventory"));
    }
    if state.potion_active(now) {
        return Err(ApiError::precondition("a potion is already active"));
    }

    state.potion_inventory -= 1;
    state.potion_active_until = Some(now + Duration::hours(POTION_WINDOW_HOURS));
    state.potion_relapse_used_at = None;

    st.store.put_user_state(&state).await?;

    info!(until = %state.potion_active_until.map(|t| t.to_rfc3339()).unwrap_or_default(), "potion activated");
    Ok(view(state, now))
}
