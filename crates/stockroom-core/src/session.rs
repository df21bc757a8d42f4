//! Role gates applied once the session resolver has produced an [`Actor`].
//!
//! An unauthenticated request is sent to [`LOGIN_PATH`]; an authenticated
//! request whose role fails the gate is sent to [`HOME_PATH`].

use crate::{
  Error, Result,
  user::{Actor, Role},
};

/// Where unauthenticated callers are redirected.
pub const LOGIN_PATH: &str = "/auth/login";

/// The safe default for authenticated callers lacking the required role.
pub const HOME_PATH: &str = "/";

/// Which roles may reach an endpoint or perform a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
  /// Any authenticated user with a stored role.
  AnyRole,
  AdminOnly,
}

impl Gate {
  pub fn allows(self, role: Role) -> bool {
    match self {
      Self::AnyRole => matches!(role, Role::Admin | Role::Worker),
      Self::AdminOnly => role.is_admin(),
    }
  }

  /// Reject `actor` with [`Error::Forbidden`] carrying `denial` if the gate
  /// does not allow its role.
  pub fn check(self, actor: &Actor, denial: &str) -> Result<()> {
    if self.allows(actor.role) {
      Ok(())
    } else {
      tracing::warn!(
        user_id = %actor.user_id,
        role = %actor.role,
        gate = ?self,
        "access denied"
      );
      Err(Error::Forbidden(denial.to_owned()))
    }
  }
}
