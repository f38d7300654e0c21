//! Minigame session handlers and the score trust-boundary hook.

use phx_reconcile::{reconcile, settle};
use phx_schemas::{Minigame, MinigameSession};
use tracing::info;
use uuid::Uuid;

use crate::api_types::{
    MinigameEndRequest, MinigameEndResponse, MinigameStartRequest, MinigameStartResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::ops::{load_state, view};
use crate::state::AppState;

/// One coin per this many score points.
const SCORE_PER_COIN: i64 = 10;

// ---------------------------------------------------------------------------
// ScoreValidator — trust boundary hook
// ---------------------------------------------------------------------------

/// Acceptance policy for client-reported minigame scores.
///
/// The score arrives from the browser with no server-side replay; whether to
/// trust it is a deployment decision, so the policy is a pluggable object on
/// `AppState` instead of a hardcoded assumption.
pub trait ScoreValidator: Send + Sync {
    fn accept(&self, game: &Minigame, session: &MinigameSession, score: i64) -> bool;
}

/// Default policy: accept any non-negative score as reported.
pub struct TrustClientScore;

impl ScoreValidator for TrustClientScore {
    fn accept(&self, _game: &Minigame, _session: &MinigameSession, _score: i64) -> bool {
        true
    }
}

// ---------------------------------------------------------------------------
// start / end
// ---------------------------------------------------------------------------

pub async fn start(st: &AppState, req: MinigameStartRequest) -> ApiResult<MinigameStartResponse> {
    if req.game_id.is_empty() {
        return Err(ApiError::validation("game_id is required"));
    }

    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let game = st
        .store
        .get_minigame(&req.game_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("unknown minigame: {}", req.game_id)))?;
    if !game.is_active {
        return Err(ApiError::precondition("minigame is not active"));
    }

    let mut state = load_state(st).await?;
    let rec = reconcile(&state, now);
    if rec.total_available < game.entry_cost {
        return Err(ApiError::precondition(format!(
            "insufficient coins: have {}, need {}",
            rec.total_available, game.entry_cost
        )));
    }

    // same settle pattern as a purchase: streak clock keeps running
    settle(&mut state, now);
    state.banked_coins -= game.entry_cost;

    let session = MinigameSession {
        id: Uuid::new_v4(),
        game_id: game.id.clone(),
        started_at: now,
        ended_at: None,
        score: None,
        coins_won: None,
    };
    st.store.insert_minigame_session(&session).await?;
    st.store.put_user_state(&state).await?;

    info!(game = %game.id, session = %session.id, "minigame session started");
    Ok(MinigameStartResponse {
        session_id: session.id,
        state: view(state, now),
    })
}

pub async fn end(st: &AppState, req: MinigameEndRequest) -> ApiResult<MinigameEndResponse> {
    if req.score < 0 {
        return Err(ApiError::validation("score must be non-negative"));
    }

    let _guard = st.write_lock.lock().await;
    let now = st.clock.now();

    let mut session = st
        .store
        .get_minigame_session(req.session_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("unknown play session: {}", req.session_id)))?;
    if session.ended_at.is_some() {
        return Err(ApiError::precondition("play session already ended"));
    }

    let game = st
        .store
        .get_minigame(&session.game_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("unknown minigame: {}", session.game_id)))?;

    if !st.score_validator.accept(&game, &session, req.score) {
        return Err(ApiError::validation("score rejected"));
    }

    let coins_won = req.score / SCORE_PER_COIN;

    session.ended_at = Some(now);
    session.score = Some(req.score);
    session.coins_won = Some(coins_won);
    st.store.update_minigame_session(&session).await?;

    // winnings go straight into the bank, no settle involved
    let mut state = load_state(st).await?;
    state.banked_coins += coins_won;
    st.store.put_user_state(&state).await?;

    info!(session = %session.id, score = req.score, coins_won, "minigame session ended");
    Ok(MinigameEndResponse {
        coins_won,
        state: view(state, now),
    })
}
