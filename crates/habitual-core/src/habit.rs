//! Habits and their creation/update inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, clock::Clock, schedule::ScheduleRule};

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// A recurring habit owned by a single user.
///
/// `timezone` is stored as the identifier the user chose and resolved on every
/// evaluation, so no deadline is ever baked in with a stale offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub name:        String,
  pub description: Option<String>,
  /// Presentation only.
  pub color:       Option<String>,
  pub schedule:    ScheduleRule,
  pub timezone:    String,
  /// `false` once soft-deleted; history is kept.
  pub is_active:   bool,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

// ─── NewHabit ────────────────────────────────────────────────────────────────

/// Input to [`crate::store::HabitStore::create_habit`].
/// Identity and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewHabit {
  pub user_id:     Uuid,
  pub name:        String,
  pub description: Option<String>,
  pub color:       Option<String>,
  pub schedule:    ScheduleRule,
  pub timezone:    String,
}

impl NewHabit {
  pub fn new(
    user_id: Uuid,
    name: impl Into<String>,
    schedule: ScheduleRule,
    timezone: impl Into<String>,
  ) -> Self {
    Self {
      user_id,
      name: name.into(),
      description: None,
      color: None,
      schedule,
      timezone: timezone.into(),
    }
  }

  /// Check and normalise the free-text fields; reject unresolvable timezones.
  pub fn validated(mut self) -> Result<Self> {
    self.name = validate_name(&self.name)?;
    self.description = validate_description(self.description)?;
    self.color = blank_to_none(self.color);
    self.timezone = validate_timezone(&self.timezone)?;
    Ok(self)
  }
}

// ─── HabitPatch ──────────────────────────────────────────────────────────────

/// A partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub color:       Option<String>,
  pub schedule:    Option<ScheduleRule>,
  pub timezone:    Option<String>,
}

impl HabitPatch {
  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      name:        self.name.as_deref().map(validate_name).transpose()?,
      description: self
        .description
        .map(|d| validate_description(Some(d)).map(Option::unwrap_or_default))
        .transpose()?,
      color:       self.color.map(|c| c.trim().to_owned()),
      schedule:    self.schedule,
      timezone:    self.timezone.as_deref().map(validate_timezone).transpose()?,
    })
  }

  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.description.is_none()
      && self.color.is_none()
      && self.schedule.is_none()
      && self.timezone.is_none()
  }
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn validate_name(name: &str) -> Result<String> {
  let name = name.trim();
  if name.is_empty() {
    return Err(Error::InvalidName("name is required".into()));
  }
  if name.chars().count() > MAX_NAME_CHARS {
    return Err(Error::InvalidName(format!(
      "name is longer than {MAX_NAME_CHARS} characters"
    )));
  }
  Ok(name.to_owned())
}

fn validate_description(description: Option<String>) -> Result<Option<String>> {
  match blank_to_none(description) {
    Some(d) if d.chars().count() > MAX_DESCRIPTION_CHARS => Err(Error::InvalidDescription),
    other => Ok(other),
  }
}

/// Trim the identifier and make sure it resolves today.
fn validate_timezone(timezone: &str) -> Result<String> {
  Clock::resolve(timezone)?;
  Ok(timezone.trim().to_owned())
}

fn blank_to_none(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}
