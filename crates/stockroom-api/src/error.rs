//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use stockroom_core::session::{HOME_PATH, LOGIN_PATH};
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// No valid session. Rendered with a redirect to the sign-in page.
  #[error("unauthenticated: {0}")]
  Unauthenticated(String),

  /// Signed in, but the role does not permit this. Redirects home.
  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Wrap a backend error. A duplicate email anywhere in its source chain
  /// is a client error rather than a store failure.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::from_boxed(Box::new(e))
  }

  fn from_boxed(e: Box<dyn std::error::Error + Send + Sync>) -> Self {
    let mut cause: Option<&(dyn std::error::Error + 'static)> = Some(&*e);
    while let Some(err) = cause {
      if let Some(stockroom_core::Error::EmailTaken(_)) =
        err.downcast_ref::<stockroom_core::Error>()
      {
        return Self::BadRequest(err.to_string());
      }
      cause = err.source();
    }
    Self::Store(e)
  }
}

impl From<stockroom_core::Error> for ApiError {
  fn from(e: stockroom_core::Error) -> Self {
    use stockroom_core::Error as E;
    match e {
      E::Validation(m) => Self::BadRequest(m),
      E::Forbidden(m) => Self::Forbidden(m),
      e @ (E::EmailTaken(_)
      | E::UnknownRole(_)
      | E::InconsistentTotal { .. }) => Self::BadRequest(e.to_string()),
      E::Store(e) => Self::from_boxed(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, body) = match &self {
      ApiError::Unauthenticated(m) => (
        StatusCode::UNAUTHORIZED,
        json!({ "error": m, "redirect": LOGIN_PATH }),
      ),
      ApiError::Forbidden(m) => (
        StatusCode::FORBIDDEN,
        json!({ "error": m, "redirect": HOME_PATH }),
      ),
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, json!({ "error": m }))
      }
      ApiError::Internal(m) => {
        (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": m }))
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          json!({ "error": e.to_string() }),
        )
      }
    };
    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = ApiError> = std::result::Result<T, E>;
