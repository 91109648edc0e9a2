//! Error types for `habitual-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("habit not found: {0}")]
  HabitNotFound(Uuid),

  #[error("habit {0} is inactive")]
  Inactive(Uuid),

  #[error("interval must be between 1 and {max} days, got {0}", max = crate::schedule::MAX_INTERVAL_DAYS)]
  InvalidInterval(i64),

  #[error("weekly schedule needs at least one weekday")]
  EmptyWeekdays,

  #[error("weekday must be in 0..=6 (0 = Sunday), got {0}")]
  InvalidWeekday(i64),

  #[error("unknown schedule type: {0:?}")]
  UnknownScheduleType(String),

  #[error("unrecognised timezone: {0:?}")]
  InvalidTimezone(String),

  #[error("instant {0} is outside the supported years {min}..={max}", min = crate::clock::MIN_YEAR, max = crate::clock::MAX_YEAR)]
  OutOfRange(chrono::DateTime<chrono::Utc>),

  #[error("invalid name: {0}")]
  InvalidName(String),

  #[error("description is longer than {max} characters", max = crate::habit::MAX_DESCRIPTION_CHARS)]
  InvalidDescription,

  /// A stored habit carries a timezone that no longer resolves. This is
  /// corrupted data rather than bad input, so it is kept apart from the
  /// validation kinds above.
  #[error("habit {habit_id} has unresolvable timezone {timezone:?}")]
  CorruptTimezone { habit_id: Uuid, timezone: String },
}

impl Error {
  /// `true` for errors caused by malformed caller input.
  pub fn is_validation(&self) -> bool {
    matches!(
      self,
      Self::InvalidInterval(_)
        | Self::EmptyWeekdays
        | Self::InvalidWeekday(_)
        | Self::UnknownScheduleType(_)
        | Self::InvalidTimezone(_)
        | Self::OutOfRange(_)
        | Self::InvalidName(_)
        | Self::InvalidDescription
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
