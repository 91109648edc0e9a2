//! [`SqliteStore`]: the SQLite implementation of [`HabitStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use habitual_core::{
  confirmation::Confirmation,
  habit::{Habit, HabitPatch, NewHabit},
  store::{AppendOutcome, HabitStore, HistoryPage},
};

use crate::{
  Result,
  encode::{
    CONFIRMATION_COLUMNS, HABIT_COLUMNS, RawConfirmation, RawHabit, encode_dt,
    encode_schedule, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A habit store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Read one habit row scoped to its owner.
fn select_habit(
  conn: &rusqlite::Connection,
  habit_id: &str,
  user_id: &str,
) -> rusqlite::Result<Option<RawHabit>> {
  conn
    .query_row(
      &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE habit_id = ?1 AND user_id = ?2"),
      rusqlite::params![habit_id, user_id],
      RawHabit::from_row,
    )
    .optional()
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = crate::Error;

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn create_habit(&self, input: NewHabit) -> Result<Habit> {
    let now = Utc::now();
    let habit = Habit {
      id:          Uuid::new_v4(),
      user_id:     input.user_id,
      name:        input.name,
      description: input.description,
      color:       input.color,
      schedule:    input.schedule,
      timezone:    input.timezone,
      is_active:   true,
      created_at:  now,
      updated_at:  now,
    };

    let id_str       = encode_uuid(habit.id);
    let user_str     = encode_uuid(habit.user_id);
    let name         = habit.name.clone();
    let description  = habit.description.clone();
    let color        = habit.color.clone();
    let schedule_str = encode_schedule(&habit.schedule)?;
    let timezone     = habit.timezone.clone();
    let at_str       = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habits (
             habit_id, user_id, name, description, color,
             schedule, timezone, is_active, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 1, ?8, ?8)",
          rusqlite::params![
            id_str,
            user_str,
            name,
            description,
            color,
            schedule_str,
            timezone,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(habit)
  }

  async fn get_habit(&self, user_id: Uuid, habit_id: Uuid) -> Result<Option<Habit>> {
    let id_str   = encode_uuid(habit_id);
    let user_str = encode_uuid(user_id);

    let raw = self
      .conn
      .call(move |conn| Ok(select_habit(conn, &id_str, &user_str)?))
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn list_habits(&self, user_id: Uuid, active_only: bool) -> Result<Vec<Habit>> {
    let user_str = encode_uuid(user_id);
    let sql = format!(
      "SELECT {HABIT_COLUMNS} FROM habits
       WHERE user_id = ?1 AND (?2 = 0 OR is_active = 1)
       ORDER BY created_at, habit_id"
    );

    let raws: Vec<RawHabit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![user_str, active_only], RawHabit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  async fn update_habit(
    &self,
    user_id:  Uuid,
    habit_id: Uuid,
    patch:    HabitPatch,
  ) -> Result<Option<Habit>> {
    let id_str       = encode_uuid(habit_id);
    let user_str     = encode_uuid(user_id);
    let schedule_str = patch.schedule.as_ref().map(encode_schedule).transpose()?;
    let at_str       = encode_dt(Utc::now());
    let HabitPatch { name, description, color, timezone, .. } = patch;

    let raw = self
      .conn
      .call(move |conn| {
        // An empty string in `description` or `color` clears the column.
        let changed = conn.execute(
          "UPDATE habits SET
             name        = COALESCE(?3, name),
             description = CASE WHEN ?4 IS NULL THEN description ELSE NULLIF(?4, '') END,
             color       = CASE WHEN ?5 IS NULL THEN color ELSE NULLIF(?5, '') END,
             schedule    = COALESCE(?6, schedule),
             timezone    = COALESCE(?7, timezone),
             updated_at  = ?8
           WHERE habit_id = ?1 AND user_id = ?2",
          rusqlite::params![
            id_str,
            user_str,
            name,
            description,
            color,
            schedule_str,
            timezone,
            at_str,
          ],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_habit(conn, &id_str, &user_str)?)
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn deactivate_habit(&self, user_id: Uuid, habit_id: Uuid) -> Result<Option<Habit>> {
    let id_str   = encode_uuid(habit_id);
    let user_str = encode_uuid(user_id);
    let at_str   = encode_dt(Utc::now());

    let raw = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE habits SET is_active = 0, updated_at = ?3
           WHERE habit_id = ?1 AND user_id = ?2",
          rusqlite::params![id_str, user_str, at_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(select_habit(conn, &id_str, &user_str)?)
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  // ── Confirmations ─────────────────────────────────────────────────────────

  async fn confirmations(&self, habit_id: Uuid) -> Result<Vec<Confirmation>> {
    let id_str = encode_uuid(habit_id);
    let sql = format!(
      "SELECT {CONFIRMATION_COLUMNS} FROM confirmations
       WHERE habit_id = ?1
       ORDER BY confirmed_for_period ASC"
    );

    let raws: Vec<RawConfirmation> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], RawConfirmation::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawConfirmation::into_confirmation).collect()
  }

  async fn append_confirmation(&self, confirmation: Confirmation) -> Result<AppendOutcome> {
    let id_str     = encode_uuid(confirmation.id);
    let habit_str  = encode_uuid(confirmation.habit_id);
    let user_str   = encode_uuid(confirmation.user_id);
    let at_str     = encode_dt(confirmation.confirmed_at);
    let period_str = encode_dt(confirmation.confirmed_for_period);
    let notes      = confirmation.notes;

    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let inserted = tx.execute(
          "INSERT INTO confirmations (
             confirmation_id, habit_id, user_id, confirmed_at, confirmed_for_period, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
           ON CONFLICT (habit_id, confirmed_for_period) DO NOTHING",
          rusqlite::params![id_str, habit_str, user_str, at_str, period_str, notes],
        )?;
        if inserted > 0 {
          tx.execute(
            "UPDATE habits SET updated_at = ?2 WHERE habit_id = ?1",
            rusqlite::params![habit_str, at_str],
          )?;
        }
        tx.commit()?;
        Ok(inserted > 0)
      })
      .await?;

    if inserted {
      Ok(AppendOutcome::Appended)
    } else {
      tracing::debug!(habit_id = %confirmation.habit_id, "confirmation for period already recorded");
      Ok(AppendOutcome::Duplicate)
    }
  }

  async fn history(&self, habit_id: Uuid, limit: usize, offset: usize) -> Result<HistoryPage> {
    let id_str     = encode_uuid(habit_id);
    let limit_val  = i64::try_from(limit).unwrap_or(i64::MAX);
    let offset_val = i64::try_from(offset).unwrap_or(i64::MAX);
    let sql = format!(
      "SELECT {CONFIRMATION_COLUMNS} FROM confirmations
       WHERE habit_id = ?1
       ORDER BY confirmed_for_period DESC
       LIMIT ?2 OFFSET ?3"
    );

    let (raws, total): (Vec<RawConfirmation>, i64) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM confirmations WHERE habit_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![id_str, limit_val, offset_val],
            RawConfirmation::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((rows, total))
      })
      .await?;

    Ok(HistoryPage {
      confirmations: raws
        .into_iter()
        .map(RawConfirmation::into_confirmation)
        .collect::<Result<_>>()?,
      total_count:   total.max(0) as u64,
    })
  }
}
