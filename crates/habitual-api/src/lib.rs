//! JSON REST API for Habitual.
//!
//! Exposes an axum [`Router`] backed by any [`habitual_core::store::HabitStore`].
//! Authentication happens upstream: the caller's user id arrives in the
//! `X-User-Id` header (see [`identity`]). TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", habitual_api::api_router(store.clone()))
//! ```

pub mod confirmations;
pub mod error;
pub mod habits;
pub mod identity;
pub mod wire;


use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use habitual_core::store::HabitStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: HabitStore + 'static,
{
  Router::new()
    // Habits
    .route("/habits", get(habits::list::<S>).post(habits::create::<S>))
    .route(
      "/habits/{id}",
      get(habits::get_one::<S>)
        .put(habits::update::<S>)
        .delete(habits::delete::<S>),
    )
    // Confirmations
    .route("/habits/{id}/confirm", post(confirmations::confirm::<S>))
    .route("/habits/{id}/stats", get(confirmations::stats::<S>))
    .route("/habits/{id}/history", get(confirmations::history::<S>))
    .with_state(store)
}
