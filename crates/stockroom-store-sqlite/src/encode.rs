//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings in UTC. UUIDs are
//! stored as hyphenated lowercase strings. Roles are stored as their
//! lowercase names and rejected on read if unknown.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::Row;
use stockroom_core::{
  product::Product,
  sale::{Sale, SaleRecord},
  user::{Role, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Microsecond precision with a `Z` suffix, so every encoded value has the
/// same width and compares lexically in time order.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Role ────────────────────────────────────────────────────────────────────

pub fn encode_role(r: Role) -> &'static str { r.as_str() }

pub fn decode_role(s: &str) -> Result<Role> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub email:      String,
  pub role:       String,
  pub full_name:  Option<String>,
  pub created_at: String,
  pub updated_at: String,
}

/// Column list matching [`RawUser::from_row`].
pub const USER_COLUMNS: &str =
  "user_id, email, role, full_name, created_at, updated_at";

impl RawUser {
  /// Read six user columns starting at `offset`.
  pub fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(offset)?,
      email:      row.get(offset + 1)?,
      role:       row.get(offset + 2)?,
      full_name:  row.get(offset + 3)?,
      created_at: row.get(offset + 4)?,
      updated_at: row.get(offset + 5)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      email:      self.email,
      role:       decode_role(&self.role)?,
      full_name:  self.full_name,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `products` row.
pub struct RawProduct {
  pub product_id:  String,
  pub name:        String,
  pub description: Option<String>,
  pub price:       f64,
  pub category:    Option<String>,
  pub sku:         Option<String>,
  pub created_by:  Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

/// Column list matching [`RawProduct::from_row`].
pub const PRODUCT_COLUMNS: &str = "product_id, name, description, price, \
                                   category, sku, created_by, created_at, \
                                   updated_at";

impl RawProduct {
  /// Read nine product columns starting at `offset`.
  pub fn from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:  row.get(offset)?,
      name:        row.get(offset + 1)?,
      description: row.get(offset + 2)?,
      price:       row.get(offset + 3)?,
      category:    row.get(offset + 4)?,
      sku:         row.get(offset + 5)?,
      created_by:  row.get(offset + 6)?,
      created_at:  row.get(offset + 7)?,
      updated_at:  row.get(offset + 8)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      product_id:  decode_uuid(&self.product_id)?,
      name:        self.name,
      description: self.description,
      price:       self.price,
      category:    self.category,
      sku:         self.sku,
      created_by:  self.created_by.as_deref().map(decode_uuid).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read from a `sales` row.
pub struct RawSale {
  pub sale_id:      String,
  pub product_id:   String,
  pub worker_id:    String,
  pub quantity:     i64,
  pub unit_price:   f64,
  pub total_amount: f64,
  pub sale_date:    String,
  pub notes:        Option<String>,
  pub created_at:   String,
}

impl RawSale {
  /// Read nine sale columns starting at column 0.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      sale_id:      row.get(0)?,
      product_id:   row.get(1)?,
      worker_id:    row.get(2)?,
      quantity:     row.get(3)?,
      unit_price:   row.get(4)?,
      total_amount: row.get(5)?,
      sale_date:    row.get(6)?,
      notes:        row.get(7)?,
      created_at:   row.get(8)?,
    })
  }

  pub fn into_sale(self) -> Result<Sale> {
    Ok(Sale {
      sale_id:      decode_uuid(&self.sale_id)?,
      product_id:   decode_uuid(&self.product_id)?,
      worker_id:    decode_uuid(&self.worker_id)?,
      quantity:     self.quantity,
      unit_price:   self.unit_price,
      total_amount: self.total_amount,
      sale_date:    decode_dt(&self.sale_date)?,
      notes:        self.notes,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// A `sales` row left-joined with `products` and `users`.
pub struct RawSaleRecord {
  pub sale:    RawSale,
  pub product: Option<RawProduct>,
  pub worker:  Option<RawUser>,
}

impl RawSaleRecord {
  /// Columns: 9 sale, 9 product (from 9), 6 user (from 18). A NULL key
  /// column means the join did not resolve.
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    let product = match row.get::<_, Option<String>>(9)? {
      Some(_) => Some(RawProduct::from_row(row, 9)?),
      None => None,
    };
    let worker = match row.get::<_, Option<String>>(18)? {
      Some(_) => Some(RawUser::from_row(row, 18)?),
      None => None,
    };
    Ok(Self { sale: RawSale::from_row(row)?, product, worker })
  }

  pub fn into_record(self) -> Result<SaleRecord> {
    Ok(SaleRecord {
      sale:    self.sale.into_sale()?,
      product: self.product.map(RawProduct::into_product).transpose()?,
      worker:  self.worker.map(RawUser::into_user).transpose()?,
    })
  }
}
