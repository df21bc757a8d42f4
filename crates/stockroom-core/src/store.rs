//! The `InventoryStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `stockroom-store-sqlite`). The HTTP layer and the actions in this crate
//! depend on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  product::{NewProduct, Product},
  query::SaleQuery,
  sale::{NewSale, Sale, SaleRecord},
  user::{Credentials, NewUser, Role, User},
};

/// A sign-up awaiting email confirmation. No user row exists yet.
#[derive(Debug, Clone)]
pub struct PendingSignup {
  pub email:         String,
  pub password_hash: String,
  pub full_name:     Option<String>,
  pub role:          Role,
  /// SHA-256 hex digest of the confirmation token.
  pub token_hash:    String,
}

/// Abstraction over a Stockroom storage backend.
///
/// Products, users and sales are insert-only. Every write is a single-row
/// insert except [`InventoryStore::confirm_signup`], which moves a pending
/// row into `users` atomically.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait InventoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a user. Fails if the email is already registered.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user and their password hash by exact email.
  fn find_credentials(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Credentials>, Self::Error>> + Send + '_;

  fn count_users(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Sign-up confirmation ──────────────────────────────────────────────

  /// Store a sign-up awaiting confirmation, replacing any earlier pending
  /// sign-up for the same email.
  fn create_pending_signup(
    &self,
    pending: PendingSignup,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Whether a sign-up for `email` is still awaiting confirmation.
  fn has_pending_signup(
    &self,
    email: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Turn the pending sign-up with this token digest into a user row.
  /// Returns `None` if no pending sign-up matches.
  fn confirm_signup(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  // ── Sessions ──────────────────────────────────────────────────────────

  /// Persist a session keyed by the SHA-256 hex digest of its token.
  fn create_session(
    &self,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Return the user owning an unexpired session with this digest.
  fn resolve_session(
    &self,
    token_hash: String,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Delete a session. Returns `false` if it did not exist.
  fn delete_session(
    &self,
    token_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Products ──────────────────────────────────────────────────────────

  fn add_product(
    &self,
    input: NewProduct,
  ) -> impl Future<Output = Result<Product, Self::Error>> + Send + '_;

  fn get_product(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + '_;

  /// All products ordered by name.
  fn list_products(
    &self,
  ) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send + '_;

  fn count_products(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Sales ─────────────────────────────────────────────────────────────

  /// Record a sale. The store rejects inputs whose `total_amount` is not
  /// `quantity × unit_price`.
  fn record_sale(
    &self,
    input: NewSale,
  ) -> impl Future<Output = Result<Sale, Self::Error>> + Send + '_;

  /// Sales matching `query`, joined with product and worker, newest first.
  fn list_sales<'a>(
    &'a self,
    query: &'a SaleQuery,
  ) -> impl Future<Output = Result<Vec<SaleRecord>, Self::Error>> + Send + 'a;
}
