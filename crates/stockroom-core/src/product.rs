//! Catalog products.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A catalog entry. Products are created once and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub product_id:  Uuid,
  pub name:        String,
  pub description: Option<String>,
  /// List price; always `>= 0`.
  pub price:       f64,
  pub category:    Option<String>,
  pub sku:         Option<String>,
  /// The admin who created the product.
  pub created_by:  Option<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to [`crate::store::InventoryStore::add_product`]. Built by
/// [`crate::actions::create_product`] after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
  pub name:        String,
  pub description: Option<String>,
  pub price:       f64,
  pub category:    Option<String>,
  pub sku:         Option<String>,
  pub created_by:  Uuid,
}

/// Header figures for the catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogSummary {
  pub product_count: usize,
  /// Mean list price; `0.0` for an empty catalog.
  pub average_price: f64,
}

impl CatalogSummary {
  pub fn of(products: &[Product]) -> Self {
    let total: f64 = products.iter().map(|p| p.price).sum();
    let average_price = if products.is_empty() {
      0.0
    } else {
      total / products.len() as f64
    };
    Self { product_count: products.len(), average_price }
  }
}
