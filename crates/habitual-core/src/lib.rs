//! Scheduling and confirmation engine for Habitual.
//!
//! Everything in this crate is a pure function over immutable snapshots: a
//! [`habit::Habit`] plus its ordered [`confirmation::Confirmation`] history.
//! Persistence lives behind [`store::HabitStore`]; HTTP lives in
//! `habitual-api`. Neither is a dependency here.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod clock;
pub mod confirmation;
pub mod error;
pub mod gate;
pub mod habit;
pub mod period;
pub mod schedule;
pub mod service;
pub mod store;
pub mod streak;

pub use error::{Error, Result};
