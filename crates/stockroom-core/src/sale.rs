//! Sale records: immutable snapshots of one product transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, product::Product, user::User};

/// A recorded sale. Never updated after creation.
///
/// `unit_price` is the price at the time of sale and is independent of the
/// product's current list price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
  pub sale_id:      Uuid,
  pub product_id:   Uuid,
  /// The user who recorded the sale.
  pub worker_id:    Uuid,
  /// Always `> 0`.
  pub quantity:     i64,
  pub unit_price:   f64,
  /// `quantity × unit_price`, checked at write time.
  pub total_amount: f64,
  pub sale_date:    DateTime<Utc>,
  pub notes:        Option<String>,
  pub created_at:   DateTime<Utc>,
}

/// A sale joined at read time with its product and worker snapshots.
///
/// Either join may be absent if the referenced row does not resolve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
  #[serde(flatten)]
  pub sale:    Sale,
  pub product: Option<Product>,
  pub worker:  Option<User>,
}

/// Largest quantity a single sale may record.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Input to [`crate::store::InventoryStore::record_sale`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
  pub product_id:   Uuid,
  pub worker_id:    Uuid,
  pub quantity:     i64,
  pub unit_price:   f64,
  pub total_amount: f64,
  pub notes:        Option<String>,
  /// When the sale happened; the store uses the current time if unset.
  pub sale_date:    Option<DateTime<Utc>>,
}

impl NewSale {
  /// Build a sale input with `total_amount` derived from quantity and unit
  /// price.
  pub fn new(
    product_id: Uuid,
    worker_id: Uuid,
    quantity: i64,
    unit_price: f64,
  ) -> Self {
    Self {
      product_id,
      worker_id,
      quantity,
      unit_price,
      total_amount: quantity as f64 * unit_price,
      notes: None,
      sale_date: None,
    }
  }

  /// Verify `total_amount == quantity × unit_price` (within rounding).
  pub fn check_total(&self) -> Result<()> {
    let expected = self.quantity as f64 * self.unit_price;
    let tolerance = 1e-9 * expected.abs().max(1.0);
    if (self.total_amount - expected).abs() <= tolerance {
      Ok(())
    } else {
      Err(Error::InconsistentTotal {
        quantity:     self.quantity,
        unit_price:   self.unit_price,
        total_amount: self.total_amount,
      })
    }
  }
}
