//! Timezone resolution and local-calendar arithmetic.
//!
//! A [`Clock`] converts UTC instants to local calendar days and back. Offsets
//! are looked up per call, never cached, so DST transitions between two calls
//! are honoured.

use chrono::{
  DateTime, Datelike, Days, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
  Offset, TimeDelta, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::{Error, Result};

/// Earliest calendar year the engine evaluates.
pub const MIN_YEAR: i32 = 1;
/// Latest calendar year the engine evaluates. Periods may end past it, by at
/// most one maximal interval.
pub const MAX_YEAR: i32 = 9999;

/// `true` if `at` falls in `MIN_YEAR..=MAX_YEAR`, where every period
/// computation stays inside chrono's representable range.
pub fn supports(at: DateTime<Utc>) -> bool { (MIN_YEAR..=MAX_YEAR).contains(&at.year()) }

/// A resolved habit timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
  /// An IANA zone, e.g. `Europe/Berlin`.
  Zone(Tz),
  /// A fixed UTC offset, e.g. `+05:30`.
  Fixed(FixedOffset),
}

impl Clock {
  /// Resolve an IANA identifier or a fixed offset (`+05:30`, `-0800`,
  /// `UTC+5`).
  pub fn resolve(timezone: &str) -> Result<Self> {
    let name = timezone.trim();
    if let Ok(tz) = name.parse::<Tz>() {
      return Ok(Self::Zone(tz));
    }
    parse_fixed_offset(name)
      .map(Self::Fixed)
      .ok_or_else(|| Error::InvalidTimezone(timezone.to_owned()))
  }

  /// Wall-clock time in this zone at `at`.
  pub fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
    match self {
      Self::Zone(tz) => at.with_timezone(tz).naive_local(),
      Self::Fixed(offset) => at.with_timezone(offset).naive_local(),
    }
  }

  /// The local calendar day containing `at`.
  pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate { self.local(at).date() }

  /// Map a wall-clock time back to UTC.
  ///
  /// Ambiguous times (clocks falling back) take the earlier instant. Times
  /// inside a gap (clocks springing forward) are shifted past the gap using
  /// the offset in force before the transition.
  pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
    match self {
      Self::Zone(tz) => resolve_local(tz, local),
      Self::Fixed(offset) => resolve_local(offset, local),
    }
  }

  /// The first instant of `date` in this zone.
  pub fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
    self.to_utc(date.and_time(NaiveTime::MIN))
  }

  /// Advance `at` by `days` local calendar days, keeping the wall-clock time.
  /// A day that is 23 or 25 hours long still counts as one day.
  ///
  /// `None` if the result leaves the representable calendar.
  pub fn add_days(&self, at: DateTime<Utc>, days: u64) -> Option<DateTime<Utc>> {
    self
      .local(at)
      .checked_add_days(Days::new(days))
      .map(|local| self.to_utc(local))
  }

  /// Seconds east of UTC in force at `at`.
  pub fn offset_seconds(&self, at: DateTime<Utc>) -> i32 {
    match self {
      Self::Zone(tz) => tz.offset_from_utc_datetime(&at.naive_utc()).fix().local_minus_utc(),
      Self::Fixed(offset) => offset.local_minus_utc(),
    }
  }
}

fn resolve_local<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> DateTime<Utc> {
  match zone.from_local_datetime(&local) {
    LocalResult::Single(dt) => dt.with_timezone(&Utc),
    LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
    LocalResult::None => {
      let day_before = local.checked_sub_signed(TimeDelta::days(1)).unwrap_or(local);
      let before = zone.offset_from_utc_datetime(&day_before).fix();
      let utc = local - TimeDelta::seconds(i64::from(before.local_minus_utc()));
      Utc.from_utc_datetime(&utc)
    }
  }
}

/// Parse `+HH:MM`, `-HHMM`, `+H`, optionally prefixed by `UTC` or `GMT`.
fn parse_fixed_offset(s: &str) -> Option<FixedOffset> {
  let upper = s.to_ascii_uppercase();
  let rest = upper
    .strip_prefix("UTC")
    .or_else(|| upper.strip_prefix("GMT"))
    .unwrap_or(&upper);

  let (sign, digits) = match rest.as_bytes().first()? {
    b'+' => (1, &rest[1..]),
    b'-' => (-1, &rest[1..]),
    _ => return None,
  };

  let (hours, minutes) = match digits.split_once(':') {
    Some((h, m)) => (h, m),
    None if digits.len() == 4 => digits.split_at(2),
    None => (digits, "0"),
  };
  let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
  if hours.is_empty()
    || hours.len() > 2
    || minutes.len() > 2
    || !all_digits(hours)
    || !all_digits(minutes)
  {
    return None;
  }
  let hours: i32 = hours.parse().ok()?;
  let minutes: i32 = minutes.parse().ok()?;
  if hours > 18 || minutes > 59 {
    return None;
  }
  FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
