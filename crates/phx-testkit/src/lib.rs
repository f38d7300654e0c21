//! phx-testkit
//!
//! In-process test doubles for the daemon's external collaborators:
//! [`MemStore`] (a `Store` over plain maps) and [`ManualClock`] (a `Clock`
//! tests can drive by hand), plus fixtures that mirror the migration seed
//! data so scenario tests and the real schema agree on the catalog.

mod clock;
mod fixtures;
mod mem_store;

pub use clock::ManualClock;
pub use fixtures::{seed_minigames, seed_shop_items, seed_urge_tasks, seeded_store};
pub use mem_store::MemStore;
