//! Running and longest streaks over a confirmation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  clock::Clock,
  confirmation::Confirmation,
  period::{Period, period_end},
  schedule::ScheduleRule,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
  pub current: u32,
  pub longest: u32,
}

/// Walk the confirmed periods in order, counting runs where each period
/// starts exactly where the previous one ended.
///
/// The trailing run is only current while it is still reachable: its last
/// period is `current` itself, or the one immediately before it (the user
/// has until `current.end` to keep it going). Anything older means a deadline
/// passed unconfirmed.
pub fn streaks(
  rule: &ScheduleRule,
  clock: &Clock,
  confirmations: &[Confirmation],
  current: &Period,
) -> Streaks {
  let mut periods: Vec<DateTime<Utc>> =
    confirmations.iter().map(|c| c.confirmed_for_period).collect();
  periods.sort_unstable();
  periods.dedup();

  let Some((&first, rest)) = periods.split_first() else {
    return Streaks::default();
  };

  let mut run = 1u32;
  let mut longest = 1u32;
  let mut previous = first;
  for &period in rest {
    run = if period_end(rule, clock, previous) == Some(period) { run + 1 } else { 1 };
    longest = longest.max(run);
    previous = period;
  }

  let alive =
    previous == current.start || period_end(rule, clock, previous) == Some(current.start);
  Streaks { current: if alive { run } else { 0 }, longest }
}

#[cfg(test)]
mod tests {
  use uuid::Uuid;

  use super::*;
  use crate::period::current_period;

  fn utc(s: &str) -> DateTime<Utc> { s.parse().unwrap() }

  fn at(period: DateTime<Utc>) -> Confirmation {
    Confirmation {
      id: Uuid::new_v4(),
      habit_id: Uuid::nil(),
      user_id: Uuid::nil(),
      confirmed_at: period,
      confirmed_for_period: period,
      notes: None,
    }
  }

  fn day(n: u32) -> DateTime<Utc> {
    utc("2024-01-01T09:00:00Z") + chrono::TimeDelta::days(i64::from(n) - 1)
  }

  fn daily_at(history: &[Confirmation], now: DateTime<Utc>) -> Streaks {
    let rule = ScheduleRule::interval(1).unwrap();
    let clock = Clock::resolve("UTC").unwrap();
    let anchor = history.iter().map(|c| c.confirmed_for_period).max().unwrap_or(day(1));
    let current = current_period(&rule, &clock, anchor, now).unwrap();
    streaks(&rule, &clock, history, &current)
  }

  #[test]
  fn empty_history_has_no_streak() {
    assert_eq!(daily_at(&[], day(1)), Streaks::default());
  }

  #[test]
  fn gap_resets_run_and_streak_stays_open_until_next_deadline() {
    let history = [at(day(1)), at(day(2)), at(day(4))];

    // P4 is confirmed; while P5 is still open the run can be extended.
    let during_p5 = daily_at(&history, day(5) + chrono::TimeDelta::hours(2));
    assert_eq!(during_p5, Streaks { current: 1, longest: 2 });

    // Once P5's deadline passes without a confirmation, it is broken.
    let after_p5 = daily_at(&history, day(6) + chrono::TimeDelta::hours(2));
    assert_eq!(after_p5, Streaks { current: 0, longest: 2 });
  }

  #[test]
  fn consecutive_confirmation_increments_by_one() {
    let mut history = vec![at(day(1)), at(day(2)), at(day(3))];
    let before = daily_at(&history, day(3) + chrono::TimeDelta::hours(1));
    assert_eq!(before, Streaks { current: 3, longest: 3 });

    history.push(at(day(4)));
    let after = daily_at(&history, day(4) + chrono::TimeDelta::hours(1));
    assert_eq!(after.current, before.current + 1);
    assert!(after.longest >= before.longest);
  }

  #[test]
  fn order_of_input_does_not_matter() {
    let history = [at(day(3)), at(day(1)), at(day(2))];
    let s = daily_at(&history, day(3) + chrono::TimeDelta::hours(1));
    assert_eq!(s, Streaks { current: 3, longest: 3 });
  }

  #[test]
  fn longest_survives_a_later_shorter_run() {
    let history = [at(day(1)), at(day(2)), at(day(3)), at(day(5)), at(day(6))];
    let s = daily_at(&history, day(6) + chrono::TimeDelta::hours(1));
    assert_eq!(s, Streaks { current: 2, longest: 3 });
  }

  #[test]
  fn weekly_slots_chain_across_the_week_boundary() {
    let rule = ScheduleRule::weekly([1, 3, 5]).unwrap();
    let clock = Clock::resolve("UTC").unwrap();
    let history = [
      at(utc("2024-01-10T00:00:00Z")), // Wed
      at(utc("2024-01-12T00:00:00Z")), // Fri
      at(utc("2024-01-15T00:00:00Z")), // Mon
    ];
    let created = utc("2024-01-01T00:00:00Z");
    let current = current_period(&rule, &clock, created, utc("2024-01-16T12:00:00Z")).unwrap();
    assert_eq!(
      streaks(&rule, &clock, &history, &current),
      Streaks { current: 3, longest: 3 }
    );
  }
}
