//! Route handlers, one module per area of the API.

pub mod admin;
pub mod auth;
pub mod home;
pub mod products;
pub mod reports;
pub mod sales;

use axum::Json;
use serde_json::{Value, json};

/// `GET /health`
pub async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
