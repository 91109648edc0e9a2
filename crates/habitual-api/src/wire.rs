//! Wire shapes and their normalisation into engine types.
//!
//! Two inputs arrive in more than one shape and are collapsed here, before
//! anything reaches the engine:
//!
//! - the schedule type, sent either as a legacy integer code (`1` interval,
//!   `2` weekly) or as a string tag;
//! - instants, sent as an RFC 3339 string, unix seconds, or a
//!   `{seconds, nanos}` struct.
//!
//! Output always uses the string tag and RFC 3339.

use chrono::{DateTime, Utc};
use habitual_core::{
  clock::{self, MAX_YEAR, MIN_YEAR},
  confirmation::Confirmation,
  habit::Habit,
  schedule::{ScheduleKind, ScheduleRule},
  service::{clock_for, compute_state},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Schedule ─────────────────────────────────────────────────────────────────

/// The schedule type as it may arrive on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScheduleTypeInput {
  Code(i64),
  Tag(String),
}

impl ScheduleTypeInput {
  pub fn normalize(&self) -> Result<ScheduleKind, ApiError> {
    let kind = match self {
      Self::Code(code) => ScheduleKind::from_code(*code)?,
      Self::Tag(tag) => match tag.trim().parse::<i64>() {
        Ok(code) => ScheduleKind::from_code(code)?,
        Err(_) => ScheduleKind::from_tag(tag)?,
      },
    };
    Ok(kind)
  }
}

/// `{"type": "interval", "days": 3}` or `{"type": 2, "weekdays": [1, 3, 5]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleBody {
  #[serde(rename = "type", alias = "schedule_type")]
  pub kind:     ScheduleTypeInput,
  #[serde(alias = "interval_days")]
  pub days:     Option<i64>,
  #[serde(alias = "weekly_days")]
  pub weekdays: Option<Vec<i64>>,
}

impl ScheduleBody {
  /// Build the strict tagged union; the field that matches the type is
  /// required, the other is ignored.
  pub fn normalize(self) -> Result<ScheduleRule, ApiError> {
    let rule = match self.kind.normalize()? {
      ScheduleKind::Interval => {
        let days = self
          .days
          .ok_or_else(|| ApiError::BadRequest("interval schedule requires `days`".into()))?;
        ScheduleRule::interval(days)?
      }
      ScheduleKind::Weekly => {
        let weekdays = self.weekdays.ok_or_else(|| {
          ApiError::BadRequest("weekly schedule requires `weekdays`".into())
        })?;
        ScheduleRule::weekly(weekdays)?
      }
    };
    Ok(rule)
  }
}

// ─── Instants ─────────────────────────────────────────────────────────────────

/// An instant as it may arrive on the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InstantInput {
  Seconds(i64),
  Parts {
    seconds: i64,
    #[serde(default)]
    nanos:   u32,
  },
  Text(String),
}

impl InstantInput {
  /// The canonical instant, limited to the years the engine evaluates.
  pub fn normalize(&self) -> Result<DateTime<Utc>, ApiError> {
    let at = self.parse()?;
    if !clock::supports(at) {
      return Err(ApiError::BadRequest(format!(
        "instant {at} is outside the supported years {MIN_YEAR}..={MAX_YEAR}"
      )));
    }
    Ok(at)
  }

  fn parse(&self) -> Result<DateTime<Utc>, ApiError> {
    let out_of_range = || ApiError::BadRequest("instant out of range".into());
    match self {
      Self::Seconds(secs) => DateTime::from_timestamp(*secs, 0).ok_or_else(out_of_range),
      Self::Parts { seconds, nanos } => {
        DateTime::from_timestamp(*seconds, *nanos).ok_or_else(out_of_range)
      }
      Self::Text(text) => {
        let text = text.trim();
        if let Ok(secs) = text.parse::<i64>() {
          return DateTime::from_timestamp(secs, 0).ok_or_else(out_of_range);
        }
        DateTime::parse_from_rfc3339(text)
          .map(|dt| dt.with_timezone(&Utc))
          .map_err(|e| ApiError::BadRequest(format!("invalid instant {text:?}: {e}")))
      }
    }
  }
}

/// Resolve an optional `as_of` parameter, defaulting to now.
pub fn evaluation_instant(as_of: Option<&InstantInput>) -> Result<DateTime<Utc>, ApiError> {
  as_of.map_or_else(|| Ok(Utc::now()), InstantInput::normalize)
}

// ─── Habit projection ────────────────────────────────────────────────────────

/// A habit as emitted to consumers, annotated with its projected schedule
/// state.
#[derive(Debug, Clone, Serialize)]
pub struct HabitView {
  pub id:                           Uuid,
  pub user_id:                      Uuid,
  pub name:                         String,
  pub description:                  Option<String>,
  pub color:                        Option<String>,
  pub schedule_type:                &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub interval_days:                Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub weekly_days:                  Option<Vec<u8>>,
  pub timezone:                     String,
  pub timezone_offset_hours:        f64,
  pub streak:                       u32,
  pub longest_streak:               u32,
  pub current_period_start:         DateTime<Utc>,
  pub next_deadline_utc:            DateTime<Utc>,
  pub confirmed_for_current_period: bool,
  pub last_confirmed_at:            Option<DateTime<Utc>>,
  pub is_active:                    bool,
  pub created_at:                   DateTime<Utc>,
  pub updated_at:                   DateTime<Utc>,
}

impl HabitView {
  pub fn project(
    habit: &Habit,
    confirmations: &[Confirmation],
    now: DateTime<Utc>,
  ) -> Result<Self, ApiError> {
    let state = compute_state(habit, confirmations, now)?;
    let offset = clock_for(habit)?.offset_seconds(now);

    let (interval_days, weekly_days) = match &habit.schedule {
      ScheduleRule::Interval { days } => (Some(*days), None),
      ScheduleRule::Weekly { weekdays } => (None, Some(weekdays.days())),
    };

    Ok(Self {
      id: habit.id,
      user_id: habit.user_id,
      name: habit.name.clone(),
      description: habit.description.clone(),
      color: habit.color.clone(),
      schedule_type: habit.schedule.kind().as_str(),
      interval_days,
      weekly_days,
      timezone: habit.timezone.clone(),
      timezone_offset_hours: f64::from(offset) / 3600.0,
      streak: state.current_streak,
      longest_streak: state.longest_streak,
      current_period_start: state.current_period_start,
      next_deadline_utc: state.current_period_end,
      confirmed_for_current_period: state.is_confirmed_for_current_period,
      last_confirmed_at: confirmations.iter().map(|c| c.confirmed_at).max(),
      is_active: habit.is_active,
      created_at: habit.created_at,
      updated_at: habit.updated_at,
    })
  }
}
