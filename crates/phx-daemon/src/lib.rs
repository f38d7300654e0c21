//! phx-daemon
//!
//! HTTP surface of the phoenix streak tracker. Route handlers are thin axum
//! glue; the read-reconcile-validate-write sequences live in [`ops`], the
//! derived-currency arithmetic in `phx-reconcile`, and storage behind the
//! `Store` trait from `phx-db`.

pub mod api_types;
pub mod error;
pub mod ops;
pub mod routes;
pub mod state;
