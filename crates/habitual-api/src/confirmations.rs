//! Handlers for confirming habits and reading their history.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/habits/:id/confirm` | Body: `{"notes": "..."}` (optional); 200 even when already confirmed |
//! | `GET`  | `/habits/:id/stats` | Optional `as_of` |
//! | `GET`  | `/habits/:id/history` | `?limit=30&offset=0`, newest first; `limit` capped at 100 |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::Utc;
use habitual_core::{
  confirmation::Confirmation,
  service::{self, ConfirmOutcome, HabitStats},
  store::{AppendOutcome, HabitStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::ApiError,
  habits::{AsOfParams, load_habit},
  identity::Caller,
  wire::HabitView,
};

pub const DEFAULT_HISTORY_LIMIT: usize = 30;
pub const MAX_HISTORY_LIMIT: usize = 100;

// ─── Confirm ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmBody {
  pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
  pub message:           String,
  pub habit:             HabitView,
  pub confirmation:      Option<Confirmation>,
  pub already_confirmed: bool,
}

/// `POST /habits/:id/confirm`
///
/// Confirms for the period containing the server's current time. Confirming a
/// period that is already confirmed is not an error: the response carries the
/// unchanged state with `already_confirmed: true`.
pub async fn confirm<S: HabitStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  body: Option<Json<ConfirmBody>>,
) -> Result<Json<ConfirmResponse>, ApiError> {
  let notes = body.and_then(|Json(b)| b.notes);
  let now = Utc::now();

  let habit = load_habit(store.as_ref(), caller, id).await?;
  let history = store.confirmations(habit.id).await.map_err(ApiError::store)?;

  let confirmation = match service::confirm(&habit, &history, now, notes)? {
    ConfirmOutcome::AlreadyConfirmed { .. } => None,
    ConfirmOutcome::Accepted { confirmation, .. } => {
      match store
        .append_confirmation(confirmation.clone())
        .await
        .map_err(ApiError::store)?
      {
        AppendOutcome::Appended => {
          tracing::info!(
            habit_id = %habit.id,
            period = %confirmation.confirmed_for_period,
            "habit confirmed"
          );
          Some(confirmation)
        }
        // Another request recorded this period between our read and write.
        AppendOutcome::Duplicate => None,
      }
    }
  };

  // Reload so the projection includes whatever was actually written and the
  // bumped `updated_at`.
  let habit = load_habit(store.as_ref(), caller, id).await?;
  let history = store.confirmations(habit.id).await.map_err(ApiError::store)?;
  let view = HabitView::project(&habit, &history, now)?;

  let response = match confirmation {
    Some(confirmation) => ConfirmResponse {
      message: format!("'{}' confirmed", habit.name),
      habit: view,
      confirmation: Some(confirmation),
      already_confirmed: false,
    },
    None => {
      tracing::debug!(habit_id = %habit.id, "habit already confirmed for current period");
      ConfirmResponse {
        message: format!("'{}' is already confirmed for this period", habit.name),
        habit: view,
        confirmation: None,
        already_confirmed: true,
      }
    }
  };
  Ok(Json(response))
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /habits/:id/stats[?as_of=...]`
pub async fn stats<S: HabitStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<AsOfParams>,
) -> Result<Json<HabitStats>, ApiError> {
  let now = params.instant()?;
  let habit = load_habit(store.as_ref(), caller, id).await?;
  let history = store.confirmations(habit.id).await.map_err(ApiError::store)?;
  Ok(Json(service::stats(&habit, &history, now)?))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
  pub limit:  Option<usize>,
  #[serde(default)]
  pub offset: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
  pub confirmations: Vec<Confirmation>,
  pub total_count:   u64,
}

/// `GET /habits/:id/history[?limit=30][&offset=0]`
pub async fn history<S: HabitStore>(
  State(store): State<Arc<S>>,
  caller: Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, ApiError> {
  let habit = load_habit(store.as_ref(), caller, id).await?;
  let limit = params
    .limit
    .unwrap_or(DEFAULT_HISTORY_LIMIT)
    .min(MAX_HISTORY_LIMIT);

  let page = store
    .history(habit.id, limit, params.offset)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(HistoryResponse {
    confirmations: page.confirmations,
    total_count:   page.total_count,
  }))
}
