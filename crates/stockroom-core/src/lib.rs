//! Core types and trait definitions for the Stockroom inventory service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! Storage backends implement [`store::InventoryStore`]; the HTTP layer
//! resolves an [`user::Actor`] per request and hands it to the actions and
//! queries defined here.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod actions;
pub mod error;
pub mod product;
pub mod query;
pub mod report;
pub mod sale;
pub mod session;
pub mod store;
pub mod user;

pub use error::{Error, Result};
