//! Error types for `stockroom-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required form field is missing or malformed. Nothing was written.
  #[error("{0}")]
  Validation(String),

  /// The actor's role does not permit the requested operation.
  #[error("{0}")]
  Forbidden(String),

  /// The email belongs to a registered user.
  #[error("User already registered")]
  EmailTaken(String),

  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error(
    "sale total {total_amount} does not equal {quantity} × {unit_price}"
  )]
  InconsistentTotal {
    quantity:     i64,
    unit_price:   f64,
    total_amount: f64,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error raised behind the [`crate::store::InventoryStore`]
  /// seam.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
