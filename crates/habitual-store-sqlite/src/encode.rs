//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with nanosecond
//! precision, so lexical order is chronological order and a period start read
//! back compares equal to the one written. Schedule rules are stored as JSON.
//! UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use habitual_core::{confirmation::Confirmation, habit::Habit, schedule::ScheduleRule};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ScheduleRule ─────────────────────────────────────────────────────────────

pub fn encode_schedule(rule: &ScheduleRule) -> Result<String> {
  Ok(serde_json::to_string(rule)?)
}

/// Decoding re-validates the rule.
pub fn decode_schedule(s: &str) -> Result<ScheduleRule> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawHabit::from_row`].
pub const HABIT_COLUMNS: &str = "habit_id, user_id, name, description, color, schedule, \
                                 timezone, is_active, created_at, updated_at";

/// Raw values read directly from a `habits` row.
pub struct RawHabit {
  pub habit_id:    String,
  pub user_id:     String,
  pub name:        String,
  pub description: Option<String>,
  pub color:       Option<String>,
  pub schedule:    String,
  pub timezone:    String,
  pub is_active:   bool,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawHabit {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      habit_id:    row.get(0)?,
      user_id:     row.get(1)?,
      name:        row.get(2)?,
      description: row.get(3)?,
      color:       row.get(4)?,
      schedule:    row.get(5)?,
      timezone:    row.get(6)?,
      is_active:   row.get(7)?,
      created_at:  row.get(8)?,
      updated_at:  row.get(9)?,
    })
  }

  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      id:          decode_uuid(&self.habit_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      name:        self.name,
      description: self.description,
      color:       self.color,
      schedule:    decode_schedule(&self.schedule)?,
      timezone:    self.timezone,
      is_active:   self.is_active,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Column list matching [`RawConfirmation::from_row`].
pub const CONFIRMATION_COLUMNS: &str =
  "confirmation_id, habit_id, user_id, confirmed_at, confirmed_for_period, notes";

/// Raw strings read directly from a `confirmations` row.
pub struct RawConfirmation {
  pub confirmation_id:      String,
  pub habit_id:             String,
  pub user_id:              String,
  pub confirmed_at:         String,
  pub confirmed_for_period: String,
  pub notes:                Option<String>,
}

impl RawConfirmation {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      confirmation_id:      row.get(0)?,
      habit_id:             row.get(1)?,
      user_id:              row.get(2)?,
      confirmed_at:         row.get(3)?,
      confirmed_for_period: row.get(4)?,
      notes:                row.get(5)?,
    })
  }

  pub fn into_confirmation(self) -> Result<Confirmation> {
    Ok(Confirmation {
      id:                   decode_uuid(&self.confirmation_id)?,
      habit_id:             decode_uuid(&self.habit_id)?,
      user_id:              decode_uuid(&self.user_id)?,
      confirmed_at:         decode_dt(&self.confirmed_at)?,
      confirmed_for_period: decode_dt(&self.confirmed_for_period)?,
      notes:                self.notes,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early: DateTime<Utc> = "2024-01-01T09:00:00Z".parse().unwrap();
    let late: DateTime<Utc> = "2024-01-01T09:00:00.5Z".parse().unwrap();
    let (a, b) = (encode_dt(early), encode_dt(late));
    assert_eq!(a.len(), b.len());
    assert!(a < b);
    assert_eq!(decode_dt(&a).unwrap(), early);
  }

  #[test]
  fn corrupt_schedule_is_rejected_on_read() {
    assert!(decode_schedule(r#"{"type":"interval","days":0}"#).is_err());
    assert!(decode_schedule(r#"{"type":"weekly","weekdays":[1,3]}"#).is_ok());
  }
}
