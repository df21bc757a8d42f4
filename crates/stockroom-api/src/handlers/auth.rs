//! Handlers for `/auth/*`: sign-up, confirmation, sign-in and sign-out.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/auth/signup`  | `email`, `password`, `fullName`, `role` |
//! | `POST` | `/auth/confirm` | `token` |
//! | `POST` | `/auth/login`   | `email`, `password` |
//! | `POST` | `/auth/logout`  | none; requires a session |

use axum::{
  Form, Json,
  extract::State,
  http::{HeaderValue, StatusCode, header},
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use stockroom_core::{
  actions::field,
  store::{InventoryStore, PendingSignup},
  user::{Actor, NewUser, Role, User},
};

use crate::{
  AppState,
  auth::{
    Authenticated, cleared_cookie, hash_password, new_token, session_cookie,
    token_digest, verify_password,
  },
  error::{ApiError, Result},
};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";

#[derive(Debug, Serialize)]
pub struct AuthMessage {
  pub message: &'static str,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user:    Option<User>,
}

// ─── Sign up ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpForm {
  pub email:     Option<String>,
  pub password:  Option<String>,
  pub full_name: Option<String>,
  pub role:      Option<String>,
}

/// `POST /auth/signup`
pub async fn sign_up<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<SignUpForm>,
) -> Result<(StatusCode, Json<AuthMessage>)>
where
  S: InventoryStore + 'static,
{
  let (Some(email), Some(password)) = (field(&form.email), field(&form.password))
  else {
    return Err(ApiError::BadRequest("Email and password are required".into()));
  };
  let role = match field(&form.role) {
    Some(r) => r.parse::<Role>()?,
    None => Role::default(),
  };
  if role.is_admin() && !state.config.allow_admin_signup {
    return Err(ApiError::BadRequest("Admin sign-up is disabled".into()));
  }

  let existing = state
    .store
    .find_credentials(email.to_owned())
    .await
    .map_err(ApiError::store)?;
  if existing.is_some() {
    tracing::warn!(%email, "sign-up for registered email");
    return Err(ApiError::BadRequest("User already registered".into()));
  }

  let password_hash = hash_password(password)?;
  let full_name = field(&form.full_name).map(str::to_owned);

  if state.config.require_email_confirmation {
    let token = new_token();
    state
      .store
      .create_pending_signup(PendingSignup {
        email: email.to_owned(),
        password_hash,
        full_name,
        role,
        token_hash: token_digest(&token),
      })
      .await
      .map_err(ApiError::store)?;
    // No mail transport: the operator relays the token.
    tracing::info!(%email, %token, "confirmation token issued");
    return Ok((
      StatusCode::ACCEPTED,
      Json(AuthMessage {
        message: "Check your email to confirm your account.",
        user:    None,
      }),
    ));
  }

  let user = state
    .store
    .create_user(NewUser {
      email: email.to_owned(),
      password_hash,
      full_name,
      role,
    })
    .await
    .map_err(ApiError::store)?;
  tracing::info!(user_id = %user.user_id, role = %user.role, "user registered");
  Ok((
    StatusCode::CREATED,
    Json(AuthMessage {
      message: "Account created successfully!",
      user:    Some(user),
    }),
  ))
}

// ─── Confirm ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ConfirmForm {
  pub token: Option<String>,
}

/// `POST /auth/confirm`
pub async fn confirm<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<ConfirmForm>,
) -> Result<(StatusCode, Json<AuthMessage>)>
where
  S: InventoryStore + 'static,
{
  let token = field(&form.token)
    .ok_or_else(|| ApiError::BadRequest("Confirmation token is required".into()))?;

  let user = state
    .store
    .confirm_signup(token_digest(token))
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::BadRequest("Invalid or expired confirmation token".into())
    })?;
  tracing::info!(user_id = %user.user_id, "sign-up confirmed");
  Ok((
    StatusCode::CREATED,
    Json(AuthMessage {
      message: "Account created successfully!",
      user:    Some(user),
    }),
  ))
}

// ─── Login ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
  pub email:    Option<String>,
  pub password: Option<String>,
}

/// Returned once at sign-in; the token is not recoverable afterwards.
#[derive(Debug, Serialize)]
pub struct SessionGrant {
  pub token:      String,
  pub expires_at: DateTime<Utc>,
  pub actor:      Actor,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Form(form): Form<LoginForm>,
) -> Result<([(header::HeaderName, HeaderValue); 1], Json<SessionGrant>)>
where
  S: InventoryStore + 'static,
{
  let (Some(email), Some(password)) = (field(&form.email), field(&form.password))
  else {
    return Err(ApiError::BadRequest("Email and password are required".into()));
  };

  let Some(creds) = state
    .store
    .find_credentials(email.to_owned())
    .await
    .map_err(ApiError::store)?
  else {
    let pending = state
      .store
      .has_pending_signup(email.to_owned())
      .await
      .map_err(ApiError::store)?;
    tracing::warn!(%email, pending, "sign-in for unknown user");
    let message = if pending { "Email not confirmed" } else { INVALID_CREDENTIALS };
    return Err(ApiError::BadRequest(message.into()));
  };

  if !verify_password(password, &creds.password_hash) {
    tracing::warn!(user_id = %creds.user.user_id, "sign-in with wrong password");
    return Err(ApiError::BadRequest(INVALID_CREDENTIALS.into()));
  }

  let ttl_hours = i64::from(state.config.session_ttl_hours);
  let token = new_token();
  let expires_at = Utc::now() + Duration::hours(ttl_hours);
  state
    .store
    .create_session(creds.user.user_id, token_digest(&token), expires_at)
    .await
    .map_err(ApiError::store)?;

  tracing::info!(user_id = %creds.user.user_id, role = %creds.user.role, "signed in");
  let cookie = session_cookie(&token, ttl_hours * 3600);
  Ok((
    [(header::SET_COOKIE, cookie)],
    Json(SessionGrant { token, expires_at, actor: Actor::from(creds.user) }),
  ))
}

// ─── Logout ──────────────────────────────────────────────────────────────────

/// `POST /auth/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
) -> Result<(StatusCode, [(header::HeaderName, HeaderValue); 1])>
where
  S: InventoryStore + 'static,
{
  state
    .store
    .delete_session(auth.token_hash)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(user_id = %auth.actor.user_id, "signed out");
  Ok((StatusCode::NO_CONTENT, [(header::SET_COOKIE, cleared_cookie())]))
}
