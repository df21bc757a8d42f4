//! Session-token extractor, password hashing, and token digests.
//!
//! A session token is 32 random bytes, hex-encoded, handed to the client once
//! at sign-in. Only its SHA-256 digest is stored.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, HeaderValue, header, request::Parts},
};
use chrono::Utc;
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};
use stockroom_core::{session::Gate, store::InventoryStore, user::Actor};

use crate::{AppState, error::ApiError};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "stockroom_session";

// ─── Passwords ───────────────────────────────────────────────────────────────

/// Hash `password` into an argon2 PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Internal(format!("argon2 error: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never
/// verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

// ─── Tokens ──────────────────────────────────────────────────────────────────

/// A fresh random token, hex-encoded.
pub fn new_token() -> String {
  let mut bytes = [0u8; 32];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// SHA-256 hex digest under which a token is stored.
pub fn token_digest(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

/// The token from `Authorization: Bearer …`, or failing that from the
/// session cookie.
pub fn request_token(headers: &HeaderMap) -> Option<String> {
  let bearer = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty());
  if let Some(token) = bearer {
    return Some(token.to_owned());
  }

  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
    .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` value installing `token` for `max_age_secs`.
pub fn session_cookie(token: &str, max_age_secs: i64) -> HeaderValue {
  let cookie = format!(
    "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}"
  );
  // Tokens are hex, so the value is always a valid header.
  HeaderValue::from_str(&cookie)
    .unwrap_or_else(|_| HeaderValue::from_static("stockroom_session=; Max-Age=0"))
}

/// `Set-Cookie` value removing the session cookie.
pub fn cleared_cookie() -> HeaderValue {
  HeaderValue::from_static(
    "stockroom_session=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
  )
}

// ─── Extractor ───────────────────────────────────────────────────────────────

/// An authenticated caller. Present in a handler means the request carried
/// an unexpired session; the actor reflects the stored user row as of now.
#[derive(Debug, Clone)]
pub struct Authenticated {
  pub actor:      Actor,
  /// Digest of the presented token, used by sign-out.
  pub token_hash: String,
}

impl Authenticated {
  /// Apply a role gate to the caller.
  pub fn require(&self, gate: Gate, denial: &str) -> Result<(), ApiError> {
    Ok(gate.check(&self.actor, denial)?)
  }
}

impl<S> FromRequestParts<AppState<S>> for Authenticated
where
  S: InventoryStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = request_token(&parts.headers).ok_or_else(|| {
      ApiError::Unauthenticated("Authentication required".into())
    })?;
    let token_hash = token_digest(&token);

    let user = state
      .store
      .resolve_session(token_hash.clone(), Utc::now())
      .await
      .map_err(ApiError::store)?
      .ok_or_else(|| {
        ApiError::Unauthenticated("Session expired or invalid".into())
      })?;

    Ok(Self { actor: Actor::from(user), token_hash })
  }
}
