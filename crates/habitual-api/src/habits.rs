//! Handlers for `/habits` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/habits` | Optional `active_only`, `as_of`; returns `{habits, total_count}` |
//! | `POST`   | `/habits` | Body: [`CreateHabitBody`]; returns 201 + annotated habit |
//! | `GET`    | `/habits/:id` | Optional `as_of` |
//! | `PUT`    | `/habits/:id` | Body: [`UpdateHabitBody`]; every field optional |
//! | `DELETE` | `/habits/:id` | Soft delete; history is kept |
//!
//! Every route requires the `X-User-Id` header and only sees the caller's
//! own habits.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use habitual_core::{
  habit::{Habit, HabitPatch, NewHabit},
  store::HabitStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{
  error::ApiError,
  identity::Caller,
  wire::{HabitView, InstantInput, ScheduleBody, evaluation_instant},
};

// ─── Shared ───────────────────────────────────────────────────────────────────

/// `?as_of=` as accepted by the read endpoints. Query strings only carry text,
/// so the value is normalised as a string instant.
#[derive(Debug, Default, Deserialize)]
pub struct AsOfParams {
  pub as_of: Option<String>,
}

impl AsOfParams {
  pub fn instant(&self) -> Result<DateTime<Utc>, ApiError> {
    evaluation_instant(self.as_of.clone().map(InstantInput::Text).as_ref())
  }
}

/// Load a habit in the caller's scope or fail with 404.
pub(crate) async fn load_habit<S: HabitStore>(
  store: &S,
  caller: Caller,
  id: Uuid,
) -> Result<Habit, ApiError> {
  store
    .get_habit(caller.0, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))
}

/// Annotate a habit with the state projected from its full history.
pub(crate) async fn view<S: HabitStore>(
  store: &S,
  habit: &Habit,
  now: DateTime<Utc>,
) -> Result<HabitView, ApiError> {
  let confirmations = store.confirmations(habit.id).await.map_err(ApiError::store)?;
  HabitView::project(habit, &confirmations, now)
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true`, soft-deleted habits are left out. Default `false`.
  #[serde(default)]
  pub active_only: bool,
  pub as_of:       Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HabitList {
  pub habits:      Vec<HabitView>,
  pub total_count: usize,
}

/// `GET /habits[?active_only=true][&as_of=...]`
pub async fn list<S: HabitStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<HabitList>, ApiError> {
  let now = AsOfParams { as_of: params.as_of }.instant()?;
  let habits = store
    .list_habits(caller.0, params.active_only)
    .await
    .map_err(ApiError::store)?;

  let mut views = Vec::with_capacity(habits.len());
  for habit in &habits {
    views.push(view(store.as_ref(), habit, now).await?);
  }

  Ok(Json(HabitList { total_count: views.len(), habits: views }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /habits/:id[?as_of=...]`
pub async fn get_one<S: HabitStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AsOfParams>,
) -> Result<Json<HabitView>, ApiError> {
  let now = params.instant()?;
  let habit = load_habit(store.as_ref(), caller, id).await?;
  Ok(Json(view(store.as_ref(), &habit, now).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /habits`.
#[derive(Debug, Deserialize)]
pub struct CreateHabitBody {
  pub name:        String,
  pub description: Option<String>,
  pub color:       Option<String>,
  pub schedule:    ScheduleBody,
  pub timezone:    String,
}

impl CreateHabitBody {
  fn into_new_habit(self, user_id: Uuid) -> Result<NewHabit, ApiError> {
    let mut input = NewHabit::new(user_id, self.name, self.schedule.normalize()?, self.timezone);
    input.description = self.description;
    input.color = self.color;
    Ok(input.validated()?)
  }
}

/// `POST /habits`: returns 201 + the habit with its zeroed state.
pub async fn create<S: HabitStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Json(body): Json<CreateHabitBody>,
) -> Result<impl IntoResponse, ApiError> {
  let input = body.into_new_habit(caller.0)?;
  let habit = store.create_habit(input).await.map_err(ApiError::store)?;
  tracing::info!(habit_id = %habit.id, user_id = %habit.user_id, "habit created");

  let view = HabitView::project(&habit, &[], Utc::now())?;
  Ok((StatusCode::CREATED, Json(view)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `PUT /habits/:id`. Absent fields are left unchanged;
/// an empty `description` or `color` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateHabitBody {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub color:       Option<String>,
  pub schedule:    Option<ScheduleBody>,
  pub timezone:    Option<String>,
}

impl UpdateHabitBody {
  fn into_patch(self) -> Result<HabitPatch, ApiError> {
    let patch = HabitPatch {
      name:        self.name,
      description: self.description,
      color:       self.color,
      schedule:    self.schedule.map(ScheduleBody::normalize).transpose()?,
      timezone:    self.timezone,
    };
    Ok(patch.validated()?)
  }
}

/// `PUT /habits/:id`
pub async fn update<S: HabitStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateHabitBody>,
) -> Result<Json<HabitView>, ApiError> {
  let patch = body.into_patch()?;
  if patch.is_empty() {
    let habit = load_habit(store.as_ref(), caller, id).await?;
    return Ok(Json(view(store.as_ref(), &habit, Utc::now()).await?));
  }

  let habit = store
    .update_habit(caller.0, id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))?;
  tracing::info!(habit_id = %habit.id, "habit updated");

  Ok(Json(view(store.as_ref(), &habit, Utc::now()).await?))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /habits/:id`: clears `is_active`; confirmations stay for stats.
pub async fn delete<S: HabitStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
  let habit = store
    .deactivate_habit(caller.0, id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("habit {id} not found")))?;
  tracing::info!(habit_id = %habit.id, "habit deactivated");

  Ok(Json(json!({ "message": format!("habit '{}' deleted", habit.name) })))
}
