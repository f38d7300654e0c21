//! phx-reconcile
//!
//! The derived-currency core of the phoenix streak tracker:
//! - static rank table + lookup
//! - power-law coin accrual curve
//! - reward reconciliation engine (banked baseline + claimed-level watermark)
//!
//! Pure deterministic logic: no IO, no wall clock — `now` is always injected
//! by the caller. Two calls with the same `(state, now)` return the same
//! figures; nothing here mutates state except the explicit [`settle`] /
//! [`grant_bonus_hours`] entry points.

mod accrual;
mod engine;
mod ranks;

pub use accrual::{streak_coins, COIN_EXPONENT, COIN_RATE};
pub use engine::{grant_bonus_hours, reconcile, settle, Reconciliation};
pub use ranks::{rank_at, unclaimed_reward, Rank, RANKS};
