//! Urge-task lifecycle: start → (timer or session completion) → claim,
//! with cancel as the escape edge back to idle.

use phx_reconcile::grant_bonus_hours;
use phx_schemas::{UrgeTask, UrgeTaskKind};
use tracing::info;

use crate::api_types::{StateResponse, UrgeClaimResponse, UrgeTaskRequest};
use crate::error::{ApiError, ApiResult};
use crate::ops::{load_state, view};
use crate::state::AppState;

/// Flat penalty for abandoning a live session before claiming.
const SESSION_CANCEL_PENALTY: i64 = 200;

async fn fetch_task(st: &AppState, task_id: &str) -> ApiResult<UrgeTask> {
    if task_id.is_empty() {
        return Err(ApiError::validation("task_id is required"));
    }
    st.store
        .get_urge_task(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("unknown urge task: {task_id}")))
}

/// Begin (or restart) a task cycle. Restarting a claimed task clears its
/// completion, claim and session fields.
pub async fn start(st: &AppState, req: UrgeTaskRequest) -> ApiResult<StateResponse> {
    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let mut task = fetch_task(st, &req.task_id).await?;

    task.started_at = Some(now);
    task.completed_at = None;
    task.claimed_at = None;
    task.last_session_seconds = None;
    st.store.update_urge_task(&task).await?;

    info!(task = %task.id, "urge task started");
    let state = load_state(st).await?;
    Ok(view(state, now))
}

/// Close the live session of the session-variant task, recording elapsed
/// wall-clock seconds. Fixed-timer tasks complete lazily and never call this.
pub async fn end_session(st: &AppState, req: UrgeTaskRequest) -> ApiResult<StateResponse> {
    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let mut task = fetch_task(st, &req.task_id).await?;
    if task.kind != UrgeTaskKind::LiveSession {
        return Err(ApiError::validation("task has no live session"));
    }
    let started = task
        .started_at
        .ok_or_else(|| ApiError::precondition("task not started"))?;
    if task.completed_at.is_some() {
        return Err(ApiError::precondition("session already ended"));
    }

    task.last_session_seconds = Some((now - started).num_seconds().max(0));
    task.completed_at = Some(now);
    st.store.update_urge_task(&task).await?;

    info!(task = %task.id, seconds = task.last_session_seconds, "urge session ended");
    let state = load_state(st).await?;
    Ok(view(state, now))
}

/// Claim a completed task: bank the reward coins and move the streak start
/// earlier by the bonus hours.
pub async fn claim(st: &AppState, req: UrgeTaskRequest) -> ApiResult<UrgeClaimResponse> {
    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let mut task = fetch_task(st, &req.task_id).await?;
    if task.started_at.is_none() {
        return Err(ApiError::precondition("task not started"));
    }
    if task.claimed_at.is_some() {
        return Err(ApiError::precondition("reward already claimed"));
    }
    if !task.is_complete(now) {
        return Err(ApiError::precondition("task not yet complete"));
    }

    let (reward_coins, bonus_hours) = match task.kind {
        UrgeTaskKind::LiveSession => {
            let seconds = task.last_session_seconds.unwrap_or(0);
            (seconds / 2, seconds as f64 * 4.0 / 3600.0)
        }
        UrgeTaskKind::FixedTimer => (task.reward_coins, task.reward_hours),
    };

    let mut state = load_state(st).await?;
    state.banked_coins += reward_coins;
    grant_bonus_hours(&mut state, bonus_hours);

    task.claimed_at = Some(now);
    st.store.update_urge_task(&task).await?;
    st.store.put_user_state(&state).await?;

    info!(task = %task.id, reward_coins, bonus_hours, "urge task claimed");
    Ok(UrgeClaimResponse {
        reward_coins,
        bonus_hours,
        state: view(state, now),
    })
}

/// Abandon a started task. Only the live-session task carries a penalty,
/// and only while unclaimed; the penalty bypasses the settle pattern and
/// floors the bank at zero.
pub async fn cancel(st: &AppState, req: UrgeTaskRequest) -> ApiResult<StateResponse> {
    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let mut task = fetch_task(st, &req.task_id).await?;
    if task.started_at.is_none() {
        return Err(ApiError::precondition("task not started"));
    }

    let penalized = task.kind == UrgeTaskKind::LiveSession && task.claimed_at.is_none();

    task.started_at = None;
    task.completed_at = None;
    task.claimed_at = None;
    task.last_session_seconds = None;
    st.store.update_urge_task(&task).await?;

    let mut state = load_state(st).await?;
    if penalized {
        state.banked_coins = (state.banked_coins - SESSION_CANCEL_PENALTY).max(0);
        st.store.put_user_state(&state).await?;
        info!(task = %task.id, penalty = SESSION_CANCEL_PENALTY, "urge session cancelled with penalty");
    }

    Ok(view(state, now))
}
