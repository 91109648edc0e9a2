//! Confirmation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An accepted confirmation. Once written, no field is ever updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
  pub id:                   Uuid,
  pub habit_id:             Uuid,
  pub user_id:              Uuid,
  /// When the user acted.
  pub confirmed_at:         DateTime<Utc>,
  /// Start of the period this confirmation satisfies; the canonical period
  /// identifier.
  pub confirmed_for_period: DateTime<Utc>,
  pub notes:                Option<String>,
}
