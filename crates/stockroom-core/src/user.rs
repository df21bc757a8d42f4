//! Users, roles, and the per-request actor.
//!
//! A user row is the stored profile. Credentials (the argon2 hash) are owned
//! by the store and never travel inside [`User`].

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Error;

// ─── Role ────────────────────────────────────────────────────────────────────

/// Exactly one of two values; stored as its lowercase name.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  /// Full catalog and report visibility.
  Admin,
  /// Sees and records only their own sales.
  #[default]
  Worker,
}

impl Role {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Worker => "worker",
    }
  }

  pub fn is_admin(self) -> bool { matches!(self, Self::Admin) }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "admin" => Ok(Self::Admin),
      "worker" => Ok(Self::Worker),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// A stored user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub email:      String,
  pub role:       Role,
  pub full_name:  Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  /// Name shown next to a sale: the display name, falling back to the email.
  pub fn display_name(&self) -> &str {
    self.full_name.as_deref().unwrap_or(&self.email)
  }
}

/// Input to [`crate::store::InventoryStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub email:         String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  pub full_name:     Option<String>,
  pub role:          Role,
}

/// A user row together with its stored password hash. Only produced for
/// credential verification at sign-in.
#[derive(Debug, Clone)]
pub struct Credentials {
  pub user:          User,
  pub password_hash: String,
}

// ─── Actor ───────────────────────────────────────────────────────────────────

/// The authenticated identity performing a request, resolved once at the
/// start of the request and passed explicitly to every action and query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
  pub user_id:   Uuid,
  pub email:     String,
  pub role:      Role,
  pub full_name: Option<String>,
}

impl Actor {
  pub fn is_admin(&self) -> bool { self.role.is_admin() }
}

impl From<User> for Actor {
  fn from(u: User) -> Self {
    Self {
      user_id:   u.user_id,
      email:     u.email,
      role:      u.role,
      full_name: u.full_name,
    }
  }
}
