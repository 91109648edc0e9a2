//! Period arithmetic: where the current confirmation window starts and ends.
//!
//! Periods form a chain: the end of one period is the start of the next, as
//! given by [`period_end`]. [`current_period`] locates the link of that chain
//! that contains `now`.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  clock::{Clock, supports},
  confirmation::Confirmation,
  habit::Habit,
  schedule::{ScheduleRule, WeekdaySet},
};

/// A half-open window `[start, end)`. `end` is the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
  pub start: DateTime<Utc>,
  pub end:   DateTime<Utc>,
}

impl Period {
  pub fn contains(&self, at: DateTime<Utc>) -> bool { self.start <= at && at < self.end }
}

/// The instant period boundaries are computed from.
///
/// Interval rules chain from the period satisfied by the latest confirmation,
/// or from creation when there is none. Weekly rules are pinned to calendar
/// weekdays and only use creation as a lower bound for the first period.
pub fn anchor(habit: &Habit, confirmations: &[Confirmation]) -> DateTime<Utc> {
  match habit.schedule {
    ScheduleRule::Interval { .. } => confirmations
      .iter()
      .map(|c| c.confirmed_for_period)
      .max()
      .map_or(habit.created_at, |latest| latest.max(habit.created_at)),
    ScheduleRule::Weekly { .. } => habit.created_at,
  }
}

/// End of the period starting at `start`, which is also the start of the
/// period after it. `None` past the representable calendar.
pub fn period_end(
  rule: &ScheduleRule,
  clock: &Clock,
  start: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
  match rule {
    ScheduleRule::Interval { days } => clock.add_days(start, u64::from(*days)),
    ScheduleRule::Weekly { weekdays } => {
      next_eligible_after(weekdays, clock.local_date(start)).map(|date| clock.midnight(date))
    }
  }
}

/// The period containing `now`.
///
/// For interval rules, a stale window is never returned: if several deadlines
/// have passed since `anchor`, the period is advanced whole intervals until
/// its end lies after `now`.
pub fn current_period(
  rule: &ScheduleRule,
  clock: &Clock,
  anchor: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Result<Period> {
  check_range(anchor, now)?;
  match rule {
    ScheduleRule::Interval { days } => interval_position(*days, clock, anchor, now)
      .map(|(_, period)| period)
      .ok_or(Error::OutOfRange(now)),
    ScheduleRule::Weekly { weekdays } => {
      let today = clock.local_date(now);
      let latest_slot = (0..=7u64)
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .filter(|date| weekdays.contains(date.weekday()))
        .map(|date| clock.midnight(date))
        .find(|midnight| *midnight <= now);

      // A habit created mid-slot starts its first period at creation.
      let start = match latest_slot {
        Some(slot) if slot >= anchor => slot,
        _ => anchor,
      };
      let end = period_end(rule, clock, start).ok_or(Error::OutOfRange(now))?;
      Ok(Period { start, end })
    }
  }
}

/// How many periods have started between `anchor` and `now`, counting the
/// one starting at `anchor`. Never zero.
pub fn periods_since(
  rule: &ScheduleRule,
  clock: &Clock,
  anchor: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Result<u64> {
  check_range(anchor, now)?;
  if now < anchor {
    return Ok(1);
  }
  match rule {
    ScheduleRule::Interval { days } => interval_position(*days, clock, anchor, now)
      .map(|(index, _)| index + 1)
      .ok_or(Error::OutOfRange(now)),
    ScheduleRule::Weekly { weekdays } => {
      let today = clock.local_date(now);
      let last = if clock.midnight(today) <= now { Some(today) } else { today.pred_opt() };
      let first = clock.local_date(anchor).succ_opt();
      let later = match (first, last) {
        (Some(first), Some(last)) => count_eligible(weekdays, first, last),
        _ => 0,
      };
      Ok(1 + later)
    }
  }
}

fn check_range(anchor: DateTime<Utc>, now: DateTime<Utc>) -> Result<()> {
  for at in [anchor, now] {
    if !supports(at) {
      return Err(Error::OutOfRange(at));
    }
  }
  Ok(())
}

/// The interval period containing `now` and its index counted from `anchor`.
///
/// The first period starts exactly at `anchor`; later starts are the previous
/// end, so a start is never re-resolved through local time.
fn interval_position(
  days: u32,
  clock: &Clock,
  anchor: DateTime<Utc>,
  now: DateTime<Utc>,
) -> Option<(u64, Period)> {
  let days = u64::from(days);
  let elapsed = (clock.local_date(now) - clock.local_date(anchor)).num_days();
  // Jump close to the answer; the loop below settles the last step.
  let mut index = u64::try_from(elapsed).map_or(0, |e| (e / days).saturating_sub(1));
  let mut start = if index == 0 { anchor } else { clock.add_days(anchor, index * days)? };
  loop {
    let end = clock.add_days(anchor, (index + 1) * days)?;
    if end > now {
      return Some((index, Period { start, end }));
    }
    start = end;
    index += 1;
  }
}

/// The first eligible weekday strictly after `date`.
fn next_eligible_after(weekdays: &WeekdaySet, date: NaiveDate) -> Option<NaiveDate> {
  (1..=7u64)
    .filter_map(|ahead| date.checked_add_days(Days::new(ahead)))
    .find(|d| weekdays.contains(d.weekday()))
}

/// Eligible weekdays in `first..=last`.
fn count_eligible(weekdays: &WeekdaySet, first: NaiveDate, last: NaiveDate) -> u64 {
  let span = (last - first).num_days() + 1;
  if span <= 0 {
    return 0;
  }
  let span = span as u64;
  let remainder = (0..span % 7)
    .filter_map(|ahead| first.checked_add_days(Days::new(ahead)))
    .filter(|d| weekdays.contains(d.weekday()))
    .count() as u64;
  (span / 7) * weekdays.len() as u64 + remainder
}
