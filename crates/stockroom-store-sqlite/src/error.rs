//! Error type for `stockroom-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stockroom_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),
}

impl Error {
  pub(crate) fn email_taken(email: String) -> Self {
    Self::Core(stockroom_core::Error::EmailTaken(email))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
