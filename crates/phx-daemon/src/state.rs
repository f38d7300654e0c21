//! Shared runtime state for phx-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The singleton
//! user-state row has no database-level lock, so every mutating request flow
//! serializes on `write_lock` — the whole read-reconcile-validate-write
//! sequence runs under the guard and read-modify-write races cannot lose a
//! coin delta.

use std::sync::Arc;

use phx_db::{Clock, Store, SystemClock};
use tokio::sync::Mutex;

use crate::ops::minigame::{ScoreValidator, TrustClientScore};

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub clock: Arc<dyn Clock>,
    /// Minigame score acceptance policy (trust boundary hook).
    pub score_validator: Arc<dyn ScoreValidator>,
    /// Serializes every mutating request on the singleton state row.
    pub write_lock: Mutex<()>,
    pub build: BuildInfo,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            score_validator: Arc::new(TrustClientScore),
            write_lock: Mutex::new(()),
            build: BuildInfo {
                service: "phx-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }

    pub fn with_system_clock(store: Arc<dyn Store>) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    pub fn with_score_validator(mut self, validator: Arc<dyn ScoreValidator>) -> Self {
        self.score_validator = validator;
        self
    }
}
