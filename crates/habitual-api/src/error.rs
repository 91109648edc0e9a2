//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("missing or malformed caller identity")]
  Unauthorized,

  #[error("habit is inactive: {0}")]
  Inactive(String),

  /// A stored timezone failed to resolve. Reported apart from validation
  /// failures so corrupted data is visible to operators.
  #[error("clock error: {0}")]
  Clock(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  pub fn store(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Store(Box::new(e))
  }

  fn kind(&self) -> &'static str {
    match self {
      Self::NotFound(_) => "not_found",
      Self::BadRequest(_) => "validation",
      Self::Unauthorized => "unauthorized",
      Self::Inactive(_) => "inactive",
      Self::Clock(_) => "clock",
      Self::Store(_) => "store",
    }
  }
}

impl From<habitual_core::Error> for ApiError {
  fn from(e: habitual_core::Error) -> Self {
    use habitual_core::Error as E;
    match e {
      e if e.is_validation() => Self::BadRequest(e.to_string()),
      E::HabitNotFound(id) => Self::NotFound(format!("habit {id} not found")),
      E::Inactive(id) => Self::Inactive(format!("habit {id} is inactive")),
      e @ E::CorruptTimezone { .. } => {
        tracing::error!(error = %e, "stored timezone no longer resolves");
        Self::Clock(e.to_string())
      }
      other => Self::BadRequest(other.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Inactive(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Clock(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message, "kind": self.kind() }))).into_response()
  }
}
