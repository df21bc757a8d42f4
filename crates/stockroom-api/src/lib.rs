//! JSON HTTP API for Stockroom.
//!
//! Exposes an axum [`Router`] backed by any
//! [`stockroom_core::store::InventoryStore`]. Every route lives under `/api`.
//! Callers authenticate with a session token, either as
//! `Authorization: Bearer <token>` or via the `stockroom_session` cookie set
//! at sign-in. Mutation bodies are `application/x-www-form-urlencoded`.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use stockroom_core::store::InventoryStore;
use tower_http::trace::TraceLayer;

use handlers::{admin, auth as account, home, products, reports, sales};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `STOCKROOM_*` environment variables. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                       String,
  pub port:                       u16,
  pub store_path:                 PathBuf,
  /// Lifetime of a session issued at sign-in.
  pub session_ttl_hours:          u32,
  /// Defer account creation until the emailed token is confirmed.
  pub require_email_confirmation: bool,
  /// Whether sign-up may choose the `admin` role.
  pub allow_admin_signup:         bool,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                       "127.0.0.1".to_string(),
      port:                       3000,
      store_path:                 PathBuf::from("stockroom.db"),
      session_ttl_hours:          168,
      require_email_confirmation: false,
      allow_admin_signup:         true,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), config: Arc::clone(&self.config) }
  }
}

impl<S> AppState<S> {
  pub fn new(store: S, config: ServerConfig) -> Self {
    Self { store: Arc::new(store), config: Arc::new(config) }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: InventoryStore + 'static,
{
  Router::new()
    .route("/api",                get(home::handler))
    .route("/api/health",         get(handlers::health))
    // Session
    .route("/api/auth/signup",    post(account::sign_up::<S>))
    .route("/api/auth/confirm",   post(account::confirm::<S>))
    .route("/api/auth/login",     post(account::login::<S>))
    .route("/api/auth/logout",    post(account::logout::<S>))
    // Admin
    .route("/api/admin",          get(admin::dashboard::<S>))
    .route(
      "/api/admin/products",
      get(products::catalog::<S>).post(products::create::<S>),
    )
    // Any role
    .route("/api/products",       get(products::list::<S>))
    .route("/api/sales",          get(sales::list::<S>).post(sales::create::<S>))
    .route("/api/reports",        get(reports::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests;
