//! The confirmation gate: at most one confirmation per period.

use chrono::{DateTime, Utc};

use crate::{
  Result,
  clock::Clock,
  confirmation::Confirmation,
  habit::Habit,
  period::{anchor, current_period},
};

/// Outcome of a confirmation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  /// The attempt may be recorded against the period starting at
  /// `confirmed_for_period`.
  Accepted { confirmed_for_period: DateTime<Utc> },
  /// The current period is already satisfied; nothing changes.
  AlreadyConfirmed,
  /// The habit has been soft-deleted.
  Inactive,
}

/// Decide whether a confirmation at `now` is allowed.
///
/// Pure: the caller records the confirmation and relies on the store's
/// uniqueness of `(habit_id, confirmed_for_period)` to settle races.
pub fn try_confirm(
  habit: &Habit,
  clock: &Clock,
  confirmations: &[Confirmation],
  now: DateTime<Utc>,
) -> Result<Decision> {
  let period = current_period(&habit.schedule, clock, anchor(habit, confirmations), now)?;

  if !habit.is_active {
    return Ok(Decision::Inactive);
  }
  if confirmations.iter().any(|c| c.confirmed_for_period == period.start) {
    return Ok(Decision::AlreadyConfirmed);
  }
  Ok(Decision::Accepted { confirmed_for_period: period.start })
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;
  use crate::schedule::ScheduleRule;

  fn utc(s: &str) -> DateTime<Utc> { s.parse().unwrap() }

  fn habit(schedule: ScheduleRule, created: &str) -> Habit {
    Habit {
      id: Uuid::new_v4(),
      user_id: Uuid::new_v4(),
      name: "Meditate".into(),
      description: None,
      color: None,
      schedule,
      timezone: "UTC".into(),
      is_active: true,
      created_at: utc(created),
      updated_at: utc(created),
    }
  }

  fn confirmed(habit: &Habit, at: &str, period: &str) -> Confirmation {
    Confirmation {
      id: Uuid::new_v4(),
      habit_id: habit.id,
      user_id: habit.user_id,
      confirmed_at: utc(at),
      confirmed_for_period: utc(period),
      notes: None,
    }
  }

  #[test]
  fn first_confirmation_is_accepted_for_creation_period() {
    let h = habit(ScheduleRule::interval(1).unwrap(), "2024-01-01T09:00:00Z");
    let clock = Clock::resolve("UTC").unwrap();
    assert_eq!(
      try_confirm(&h, &clock, &[], utc("2024-01-01T10:00:00Z")).unwrap(),
      Decision::Accepted { confirmed_for_period: utc("2024-01-01T09:00:00Z") }
    );
  }

  #[test]
  fn second_confirmation_in_same_period_is_rejected() {
    let h = habit(ScheduleRule::interval(1).unwrap(), "2024-01-01T09:00:00Z");
    let clock = Clock::resolve("UTC").unwrap();
    let history = [confirmed(&h, "2024-01-01T10:00:00Z", "2024-01-01T09:00:00Z")];
    assert_eq!(
      try_confirm(&h, &clock, &history, utc("2024-01-01T22:00:00Z")).unwrap(),
      Decision::AlreadyConfirmed
    );
  }

  #[test]
  fn next_period_is_accepted() {
    let h = habit(ScheduleRule::interval(1).unwrap(), "2024-01-01T09:00:00Z");
    let clock = Clock::resolve("UTC").unwrap();
    let history = [confirmed(&h, "2024-01-01T10:00:00Z", "2024-01-01T09:00:00Z")];
    assert_eq!(
      try_confirm(&h, &clock, &history, utc("2024-01-02T11:00:00Z")).unwrap(),
      Decision::Accepted { confirmed_for_period: utc("2024-01-02T09:00:00Z") }
    );
  }

  #[test]
  fn inactive_habit_is_rejected() {
    let mut h = habit(ScheduleRule::interval(1).unwrap(), "2024-01-01T09:00:00Z");
    h.is_active = false;
    let clock = Clock::resolve("UTC").unwrap();
    assert_eq!(try_confirm(&h, &clock, &[], utc("2024-01-01T10:00:00Z")).unwrap(), Decision::Inactive);
  }

  #[test]
  fn weekly_slot_accepts_once() {
    let h = habit(ScheduleRule::weekly([1, 3, 5]).unwrap(), "2024-01-01T00:00:00Z");
    let clock = Clock::resolve("UTC").unwrap();
    let now = utc("2024-01-10T08:00:00Z"); // Wednesday
    let Decision::Accepted { confirmed_for_period } = try_confirm(&h, &clock, &[], now).unwrap() else {
      panic!("expected acceptance");
    };
    assert_eq!(confirmed_for_period, utc("2024-01-10T00:00:00Z"));

    let history = [confirmed(&h, "2024-01-10T08:00:00Z", "2024-01-10T00:00:00Z")];
    // Thursday is still inside Wednesday's period.
    assert_eq!(
      try_confirm(&h, &clock, &history, utc("2024-01-11T20:00:00Z")).unwrap(),
      Decision::AlreadyConfirmed
    );
  }
}
