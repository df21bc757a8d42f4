//! [`SqliteStore`], the SQLite implementation of [`InventoryStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, types::Value};
use uuid::Uuid;

use stockroom_core::{
  product::{NewProduct, Product},
  query::{OwnerScope, SaleQuery},
  sale::{NewSale, Sale, SaleRecord},
  store::{InventoryStore, PendingSignup},
  user::{Credentials, NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    PRODUCT_COLUMNS, RawProduct, RawSaleRecord, RawUser, USER_COLUMNS,
    encode_dt, encode_role, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stockroom store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, table: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| {
          r.get(0)
        })?)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or(0))
  }
}

/// Compile `query` into a `WHERE … ORDER BY … LIMIT` tail plus its
/// positional parameters.
fn compile_sale_query(query: &SaleQuery) -> (String, Vec<Value>) {
  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<Value> = Vec::new();

  if let OwnerScope::Worker(id) = query.scope {
    params.push(Value::Text(encode_uuid(id)));
    conds.push(format!("s.worker_id = ?{}", params.len()));
  }
  if let Some(lo) = query.lower_bound() {
    params.push(Value::Text(encode_dt(lo)));
    conds.push(format!("s.sale_date >= ?{}", params.len()));
  }
  if let Some(hi) = query.upper_bound() {
    params.push(Value::Text(encode_dt(hi)));
    conds.push(format!("s.sale_date < ?{}", params.len()));
  }
  if let Some(category) = &query.category {
    params.push(Value::Text(category.clone()));
    conds.push(format!("p.category = ?{}", params.len()));
  }

  let mut tail = if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(" AND "))
  };
  tail.push_str(" ORDER BY s.sale_date DESC, s.created_at DESC");
  if let Some(limit) = query.limit {
    params.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
    tail.push_str(&format!(" LIMIT ?{}", params.len()));
  }

  (tail, params)
}

// ─── InventoryStore impl ─────────────────────────────────────────────────────

impl InventoryStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let now = Utc::now();
    let user = User {
      user_id:    Uuid::new_v4(),
      email:      input.email,
      role:       input.role,
      full_name:  input.full_name,
      created_at: now,
      updated_at: now,
    };

    let id_str    = encode_uuid(user.user_id);
    let email     = user.email.clone();
    let role_str  = encode_role(user.role);
    let full_name = user.full_name.clone();
    let at_str    = encode_dt(now);
    let hash      = input.password_hash;

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO users (
             user_id, email, password_hash, role, full_name, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
          rusqlite::params![id_str, email, hash, role_str, full_name, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::email_taken(user.email));
    }
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            rusqlite::params![id_str],
            |row| RawUser::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_credentials(&self, email: String) -> Result<Option<Credentials>> {
    let raw: Option<(RawUser, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = ?1"
            ),
            rusqlite::params![email],
            |row| Ok((RawUser::from_row(row, 0)?, row.get(6)?)),
          )
          .optional()?)
      })
      .await?;

    raw
      .map(|(user, password_hash)| {
        Ok(Credentials { user: user.into_user()?, password_hash })
      })
      .transpose()
  }

  async fn count_users(&self) -> Result<u64> { self.count("users").await }

  // ── Sign-up confirmation ──────────────────────────────────────────────────

  async fn create_pending_signup(&self, pending: PendingSignup) -> Result<()> {
    let email    = pending.email.clone();
    let role_str = encode_role(pending.role);
    let at_str   = encode_dt(Utc::now());

    let stored: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![pending.email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(false);
        }
        tx.execute(
          "DELETE FROM pending_signups WHERE email = ?1",
          rusqlite::params![pending.email],
        )?;
        tx.execute(
          "INSERT INTO pending_signups (
             token_hash, email, password_hash, role, full_name, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            pending.token_hash,
            pending.email,
            pending.password_hash,
            role_str,
            pending.full_name,
            at_str,
          ],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !stored {
      return Err(Error::email_taken(email));
    }
    Ok(())
  }

  async fn has_pending_signup(&self, email: String) -> Result<bool> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn
            .query_row(
              "SELECT 1 FROM pending_signups WHERE email = ?1",
              rusqlite::params![email],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false))
        })
        .await?,
    )
  }

  async fn confirm_signup(&self, token_hash: String) -> Result<Option<User>> {
    let new_id = encode_uuid(Uuid::new_v4());
    let at_str = encode_dt(Utc::now());

    // Outer `None`: no pending sign-up. `Some(Err(email))`: the email was
    // registered after the sign-up was stored.
    let outcome: Option<std::result::Result<RawUser, String>> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(email) = tx
          .query_row(
            "SELECT email FROM pending_signups WHERE token_hash = ?1",
            rusqlite::params![token_hash],
            |row| row.get::<_, String>(0),
          )
          .optional()?
        else {
          return Ok(None);
        };
        let taken = tx
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if taken {
          return Ok(Some(Err(email)));
        }
        tx.execute(
          "INSERT INTO users (
             user_id, email, password_hash, role, full_name, created_at, updated_at
           )
           SELECT ?2, email, password_hash, role, full_name, ?3, ?3
           FROM pending_signups WHERE token_hash = ?1",
          rusqlite::params![token_hash, new_id, at_str],
        )?;
        tx.execute(
          "DELETE FROM pending_signups WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?;
        let user = tx.query_row(
          &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
          rusqlite::params![new_id],
          |row| RawUser::from_row(row, 0),
        )?;
        tx.commit()?;
        Ok(Some(Ok(user)))
      })
      .await?;

    match outcome {
      None => Ok(None),
      Some(Err(email)) => Err(Error::email_taken(email)),
      Some(Ok(raw)) => raw.into_user().map(Some),
    }
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(
    &self,
    user_id:    Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
  ) -> Result<()> {
    let user_str    = encode_uuid(user_id);
    let created_str = encode_dt(Utc::now());
    let expires_str = encode_dt(expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_hash, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn resolve_session(
    &self,
    token_hash: String,
    now:        DateTime<Utc>,
  ) -> Result<Option<User>> {
    let now_str = encode_dt(now);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT u.user_id, u.email, u.role, u.full_name, u.created_at, u.updated_at
             FROM sessions s
             JOIN users u ON u.user_id = s.user_id
             WHERE s.token_hash = ?1 AND s.expires_at > ?2",
            rusqlite::params![token_hash, now_str],
            |row| RawUser::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn delete_session(&self, token_hash: String) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![token_hash],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  // ── Products ──────────────────────────────────────────────────────────────

  async fn add_product(&self, input: NewProduct) -> Result<Product> {
    let now = Utc::now();
    let product = Product {
      product_id:  Uuid::new_v4(),
      name:        input.name,
      description: input.description,
      price:       input.price,
      category:    input.category,
      sku:         input.sku,
      created_by:  Some(input.created_by),
      created_at:  now,
      updated_at:  now,
    };

    let id_str      = encode_uuid(product.product_id);
    let name        = product.name.clone();
    let description = product.description.clone();
    let price       = product.price;
    let category    = product.category.clone();
    let sku         = product.sku.clone();
    let creator_str = encode_uuid(input.created_by);
    let at_str      = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO products (
             product_id, name, description, price, category, sku,
             created_by, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![
            id_str, name, description, price, category, sku, creator_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(product)
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = ?1"),
            rusqlite::params![id_str],
            |row| RawProduct::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProduct::into_product).transpose()
  }

  async fn list_products(&self) -> Result<Vec<Product>> {
    let raws: Vec<RawProduct> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name ASC, created_at ASC"
        ))?;
        let rows = stmt
          .query_map([], |row| RawProduct::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawProduct::into_product).collect()
  }

  async fn count_products(&self) -> Result<u64> { self.count("products").await }

  // ── Sales ─────────────────────────────────────────────────────────────────

  async fn record_sale(&self, input: NewSale) -> Result<Sale> {
    input.check_total()?;

    let now = Utc::now();
    let sale = Sale {
      sale_id:      Uuid::new_v4(),
      product_id:   input.product_id,
      worker_id:    input.worker_id,
      quantity:     input.quantity,
      unit_price:   input.unit_price,
      total_amount: input.total_amount,
      sale_date:    input.sale_date.unwrap_or(now),
      notes:        input.notes,
      created_at:   now,
    };

    let sale_str    = encode_uuid(sale.sale_id);
    let product_str = encode_uuid(sale.product_id);
    let worker_str  = encode_uuid(sale.worker_id);
    let quantity    = sale.quantity;
    let unit_price  = sale.unit_price;
    let total       = sale.total_amount;
    let date_str    = encode_dt(sale.sale_date);
    let notes       = sale.notes.clone();
    let created_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sales (
             sale_id, product_id, worker_id, quantity, unit_price,
             total_amount, sale_date, notes, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            sale_str,
            product_str,
            worker_str,
            quantity,
            unit_price,
            total,
            date_str,
            notes,
            created_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(sale)
  }

  async fn list_sales<'a>(&'a self, query: &'a SaleQuery) -> Result<Vec<SaleRecord>> {
    let (tail, params) = compile_sale_query(query);
    let sql = format!(
      "SELECT
         s.sale_id, s.product_id, s.worker_id, s.quantity, s.unit_price,
         s.total_amount, s.sale_date, s.notes, s.created_at,
         p.product_id, p.name, p.description, p.price, p.category, p.sku,
         p.created_by, p.created_at, p.updated_at,
         u.user_id, u.email, u.role, u.full_name, u.created_at, u.updated_at
       FROM sales s
       LEFT JOIN products p ON p.product_id = s.product_id
       LEFT JOIN users    u ON u.user_id    = s.worker_id
       {tail}"
    );
    tracing::debug!(%sql, params = params.len(), "listing sales");

    let raws: Vec<RawSaleRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            RawSaleRecord::from_row(row)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSaleRecord::into_record).collect()
  }
}
