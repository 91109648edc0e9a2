//! Habit schedule orchestration: the operations the API layer calls.
//!
//! Every function here is a pure projection over a habit and its confirmation
//! history. Loading and persisting are the caller's job (see
//! [`crate::store::HabitStore`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  clock::Clock,
  confirmation::Confirmation,
  gate::{Decision, try_confirm},
  habit::Habit,
  period::{Period, anchor, current_period, periods_since},
  streak::streaks,
};

// ─── Projections ─────────────────────────────────────────────────────────────

/// Derived scheduling state. Recomputed on every read and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleState {
  pub current_period_start:            DateTime<Utc>,
  /// The deadline.
  pub current_period_end:              DateTime<Utc>,
  pub is_confirmed_for_current_period: bool,
  pub current_streak:                  u32,
  pub longest_streak:                  u32,
}

/// Aggregate statistics for a habit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitStats {
  pub current_streak:      u32,
  pub longest_streak:      u32,
  pub total_confirmations: u64,
  /// `total_confirmations / expected periods since creation`, within `[0, 1]`.
  pub completion_rate:     f64,
  pub first_confirmation:  Option<DateTime<Utc>>,
  pub last_confirmation:   Option<DateTime<Utc>>,
}

/// Result of [`confirm`]. A duplicate is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
  Accepted {
    confirmation: Confirmation,
    /// State with `confirmation` already included in the history.
    state:        ScheduleState,
  },
  AlreadyConfirmed {
    state: ScheduleState,
  },
}

// ─── Operations ──────────────────────────────────────────────────────────────

/// Resolve the habit's stored timezone.
///
/// Timezones are validated on the way in, so failure here means the stored
/// value is corrupt; it is reported as [`Error::CorruptTimezone`].
pub fn clock_for(habit: &Habit) -> Result<Clock> {
  Clock::resolve(&habit.timezone).map_err(|_| Error::CorruptTimezone {
    habit_id: habit.id,
    timezone: habit.timezone.clone(),
  })
}

/// Project the current [`ScheduleState`] at `now`.
pub fn compute_state(
  habit: &Habit,
  confirmations: &[Confirmation],
  now: DateTime<Utc>,
) -> Result<ScheduleState> {
  let clock = clock_for(habit)?;
  state_with(habit, &clock, confirmations, now)
}

/// Attempt a confirmation at `now`.
///
/// On acceptance the new [`Confirmation`] is built here, but recording it
/// (and bumping the habit's `updated_at`) is left to the caller.
pub fn confirm(
  habit: &Habit,
  confirmations: &[Confirmation],
  now: DateTime<Utc>,
  notes: Option<String>,
) -> Result<ConfirmOutcome> {
  let clock = clock_for(habit)?;

  match try_confirm(habit, &clock, confirmations, now)? {
    Decision::Inactive => Err(Error::Inactive(habit.id)),
    Decision::AlreadyConfirmed => Ok(ConfirmOutcome::AlreadyConfirmed {
      state: state_with(habit, &clock, confirmations, now)?,
    }),
    Decision::Accepted { confirmed_for_period } => {
      let confirmation = Confirmation {
        id: Uuid::new_v4(),
        habit_id: habit.id,
        user_id: habit.user_id,
        confirmed_at: now,
        confirmed_for_period,
        notes: notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
      };

      let mut history = confirmations.to_vec();
      history.push(confirmation.clone());
      let state = state_with(habit, &clock, &history, now)?;

      Ok(ConfirmOutcome::Accepted { confirmation, state })
    }
  }
}

/// Aggregate statistics at `now`.
pub fn stats(
  habit: &Habit,
  confirmations: &[Confirmation],
  now: DateTime<Utc>,
) -> Result<HabitStats> {
  let clock = clock_for(habit)?;
  let state = state_with(habit, &clock, confirmations, now)?;

  let total = confirmations.len() as u64;
  let expected = periods_since(&habit.schedule, &clock, habit.created_at, now)?;
  let completion_rate = (total as f64 / expected as f64).clamp(0.0, 1.0);

  Ok(HabitStats {
    current_streak: state.current_streak,
    longest_streak: state.longest_streak,
    total_confirmations: total,
    completion_rate,
    first_confirmation: confirmations.iter().map(|c| c.confirmed_at).min(),
    last_confirmation: confirmations.iter().map(|c| c.confirmed_at).max(),
  })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn state_with(
  habit: &Habit,
  clock: &Clock,
  confirmations: &[Confirmation],
  now: DateTime<Utc>,
) -> Result<ScheduleState> {
  let period: Period =
    current_period(&habit.schedule, clock, anchor(habit, confirmations), now)?;
  let streaks = streaks(&habit.schedule, clock, confirmations, &period);

  Ok(ScheduleState {
    current_period_start:            period.start,
    current_period_end:              period.end,
    is_confirmed_for_current_period: confirmations
      .iter()
      .any(|c| c.confirmed_for_period == period.start),
    current_streak:                  streaks.current,
    longest_streak:                  streaks.longest,
  })
}
