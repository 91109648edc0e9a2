//! Recurrence rules.
//!
//! A [`ScheduleRule`] is a strict tagged union. Wire formats that carry a raw
//! type code are normalised into it at the API boundary; nothing below that
//! boundary ever branches on an integer.

use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize, Serializer};

use crate::{Error, Result};

/// Upper bound on `Interval.days` (roughly ten years).
pub const MAX_INTERVAL_DAYS: u32 = 3660;

// ─── Weekdays ────────────────────────────────────────────────────────────────

/// A non-empty set of weekdays, numbered `0 = Sunday ..= 6 = Saturday`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
  /// Build a set from day numbers. Duplicates collapse; an empty input or a
  /// number outside `0..=6` is rejected.
  pub fn new(days: impl IntoIterator<Item = i64>) -> Result<Self> {
    let mut bits = 0u8;
    for day in days {
      if !(0..=6).contains(&day) {
        return Err(Error::InvalidWeekday(day));
      }
      bits |= 1 << day;
    }
    if bits == 0 {
      return Err(Error::EmptyWeekdays);
    }
    Ok(Self(bits))
  }

  pub fn contains(&self, day: Weekday) -> bool {
    self.0 & (1 << day.num_days_from_sunday()) != 0
  }

  /// Day numbers in ascending order.
  pub fn days(&self) -> Vec<u8> {
    (0..7u8).filter(|d| self.0 & (1 << d) != 0).collect()
  }

  pub fn len(&self) -> usize { self.0.count_ones() as usize }

  pub fn is_empty(&self) -> bool { self.0 == 0 }
}

impl Serialize for WeekdaySet {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    self.days().serialize(serializer)
  }
}

// ─── Rule ────────────────────────────────────────────────────────────────────

/// How often a habit recurs.
///
/// Deserialisation goes through [`RawScheduleRule`], so every value of this
/// type (including one read back from storage) satisfies its invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
  tag = "type",
  rename_all = "snake_case",
  try_from = "RawScheduleRule"
)]
pub enum ScheduleRule {
  /// A new period every `days` local calendar days from the anchor.
  Interval { days: u32 },
  /// One period per eligible weekday, each ending at the next eligible
  /// weekday's local midnight.
  Weekly { weekdays: WeekdaySet },
}

impl ScheduleRule {
  pub fn interval(days: i64) -> Result<Self> {
    if days < 1 || days > i64::from(MAX_INTERVAL_DAYS) {
      return Err(Error::InvalidInterval(days));
    }
    Ok(Self::Interval { days: days as u32 })
  }

  pub fn weekly(weekdays: impl IntoIterator<Item = i64>) -> Result<Self> {
    Ok(Self::Weekly { weekdays: WeekdaySet::new(weekdays)? })
  }

  pub fn kind(&self) -> ScheduleKind {
    match self {
      Self::Interval { .. } => ScheduleKind::Interval,
      Self::Weekly { .. } => ScheduleKind::Weekly,
    }
  }
}

/// The discriminant of a [`ScheduleRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
  Interval,
  Weekly,
}

impl ScheduleKind {
  /// The string tag emitted to consumers.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Interval => "interval",
      Self::Weekly => "weekly",
    }
  }

  /// Legacy integer code: `1 = interval`, `2 = weekly`.
  pub fn from_code(code: i64) -> Result<Self> {
    match code {
      1 => Ok(Self::Interval),
      2 => Ok(Self::Weekly),
      other => Err(Error::UnknownScheduleType(other.to_string())),
    }
  }

  pub fn from_tag(tag: &str) -> Result<Self> {
    match tag.trim().to_ascii_lowercase().as_str() {
      "interval" => Ok(Self::Interval),
      "weekly" => Ok(Self::Weekly),
      _ => Err(Error::UnknownScheduleType(tag.to_owned())),
    }
  }
}

impl fmt::Display for ScheduleKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Unvalidated shape accepted by [`ScheduleRule`]'s `Deserialize` impl.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawScheduleRule {
  Interval { days: i64 },
  Weekly { weekdays: Vec<i64> },
}

impl TryFrom<RawScheduleRule> for ScheduleRule {
  type Error = Error;

  fn try_from(raw: RawScheduleRule) -> Result<Self> {
    match raw {
      RawScheduleRule::Interval { days } => Self::interval(days),
      RawScheduleRule::Weekly { weekdays } => Self::weekly(weekdays),
    }
  }
}
