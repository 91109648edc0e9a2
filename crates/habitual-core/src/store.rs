//! The `HabitStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `habitual-store-sqlite`).
//! The API layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  confirmation::Confirmation,
  habit::{Habit, HabitPatch, NewHabit},
};

/// Result of [`HabitStore::append_confirmation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
  Appended,
  /// A confirmation for the same `(habit_id, confirmed_for_period)` already
  /// exists; nothing was written.
  Duplicate,
}

/// One page of confirmation history, newest first.
#[derive(Debug, Clone)]
pub struct HistoryPage {
  pub confirmations: Vec<Confirmation>,
  /// Total number of confirmations for the habit, ignoring paging.
  pub total_count:   u64,
}

/// Abstraction over a habit store backend.
///
/// Habits are looked up within a caller's scope: a habit owned by another user
/// is reported as absent. Confirmations are append-only.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Habits ────────────────────────────────────────────────────────────

  /// Persist a new, already validated habit. The store assigns the id and
  /// both timestamps.
  fn create_habit(
    &self,
    input: NewHabit,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + '_;

  /// Retrieve a habit owned by `user_id`. Returns `None` if not found.
  fn get_habit(
    &self,
    user_id: Uuid,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// List a user's habits, oldest first.
  fn list_habits(
    &self,
    user_id: Uuid,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  /// Apply an already validated patch and refresh `updated_at`.
  /// Returns `None` if the habit is not found.
  fn update_habit(
    &self,
    user_id: Uuid,
    habit_id: Uuid,
    patch: HabitPatch,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// Soft-delete: clear `is_active`, keep the confirmation history.
  /// Returns `None` if the habit is not found.
  fn deactivate_habit(
    &self,
    user_id: Uuid,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  // ── Confirmations ─────────────────────────────────────────────────────

  /// All confirmations for a habit, ordered by `confirmed_for_period`
  /// ascending.
  fn confirmations(
    &self,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Confirmation>, Self::Error>> + Send + '_;

  /// Atomically append `confirmation` unless one already exists for the same
  /// habit and period, bumping the habit's `updated_at` in the same write.
  ///
  /// This is the single serialisation point for concurrent confirmations.
  fn append_confirmation(
    &self,
    confirmation: Confirmation,
  ) -> impl Future<Output = Result<AppendOutcome, Self::Error>> + Send + '_;

  /// A page of confirmations, newest period first.
  fn history(
    &self,
    habit_id: Uuid,
    limit: usize,
    offset: usize,
  ) -> impl Future<Output = Result<HistoryPage, Self::Error>> + Send + '_;
}
