//! Reward reconciliation engine.
//!
//! Coins are never stored as a running total. The persisted baseline is
//! `(banked_coins, coin_baseline_at, last_reset_at, last_claimed_level)`;
//! everything since `coin_baseline_at` is derived on every read. A settle
//! folds the derived components into `banked_coins` and advances
//! `coin_baseline_at` to the settle instant, so an immediate re-read yields
//! exactly the banked figure (zero double count). `last_reset_at` is only
//! ever advanced by relapse — the streak clock and the coin baseline clock
//! are deliberately distinct.

use chrono::{DateTime, Duration, Utc};
use phx_schemas::UserState;

use crate::accrual::streak_coins;
use crate::ranks::{rank_at, unclaimed_reward, Rank};

const MS_PER_HOUR: f64 = 3_600_000.0;

/// Point-in-time view of the account, derived from the baseline and `now`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciliation {
    /// Hours since `last_reset_at`, clamped to ≥ 0 (clock skew tolerated).
    pub streak_hours: f64,
    pub rank: &'static Rank,
    /// Live accrual since `coin_baseline_at`, not yet banked.
    pub accrued_coins: i64,
    /// Level-up rewards above the claimed-level watermark, not yet banked.
    pub unclaimed_reward: i64,
    /// `banked_coins + accrued_coins + unclaimed_reward` — the spendable total.
    pub total_available: i64,
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_HOUR
}

/// Pure read: derive the spendable total as of `now`. No side effects;
/// idempotent for a fixed `(state, now)`.
pub fn reconcile(state: &UserState, now: DateTime<Utc>) -> Reconciliation {
    let streak_hours = hours_between(state.last_reset_at, now).max(0.0);

    // Accrual already folded into banked_coins ends at the baseline clock.
    // Clamped into [0, streak_hours] so a baseline outside the current streak
    // (clock skew, bonus-hour grants) can never produce negative accrual.
    let baseline_hours = hours_between(state.last_reset_at, state.coin_baseline_at)
        .clamp(0.0, streak_hours);

    let accrued_coins = (streak_coins(streak_hours) - streak_coins(baseline_hours)).max(0);

    let rank = rank_at(streak_hours);
    let claimed = state.last_claimed_level.max(0) as usize;
    let unclaimed = unclaimed_reward(claimed, rank.level);

    Reconciliation {
        streak_hours,
        rank,
        accrued_coins,
        unclaimed_reward: unclaimed,
        total_available: state.banked_coins + accrued_coins + unclaimed,
    }
}

/// Fold the derived components into the baseline as of `now`.
///
/// Required before any balance-changing action. Writes
/// `banked_coins = total_available`, advances the claimed-level watermark to
/// the current rank, and moves `coin_baseline_at` to `now`. `last_reset_at`
/// is untouched — the live streak keeps running.
pub fn settle(state: &mut UserState, now: DateTime<Utc>) -> Reconciliation {
    let rec = reconcile(state, now);
    state.banked_coins = rec.total_available;
    state.last_claimed_level = rec.rank.level as i64;
    state.coin_baseline_at = now;
    rec
}

/// Move the streak start (and the coin baseline with it) earlier by
/// `bonus_hours`, crediting the streak as if it had run that much longer.
///
/// Shifting both clocks by the same amount keeps already-banked accrual
/// banked while the next reconcile picks up the extra curve segment.
pub fn grant_bonus_hours(state: &mut UserState, bonus_hours: f64) {
    if bonus_hours <= 0.0 {
        return;
    }
    let shift = Duration::milliseconds((bonus_hours * MS_PER_HOUR) as i64);
    state.last_reset_at -= shift;
    state.coin_baseline_at -= shift;
}
