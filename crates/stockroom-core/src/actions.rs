//! Product and sale mutation actions.
//!
//! Each action validates the submitted form, re-checks the actor's role
//! against the stored user row, then performs a single insert. Validation
//! failures never reach the store.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  Error, Result,
  product::{NewProduct, Product},
  sale::{MAX_QUANTITY, NewSale, Sale},
  session::Gate,
  store::InventoryStore,
  user::Actor,
};

// ─── Forms ───────────────────────────────────────────────────────────────────

/// Fields submitted by the new-product form. Values arrive as strings; an
/// empty string counts as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub price:       Option<String>,
  pub category:    Option<String>,
  pub sku:         Option<String>,
}

/// Fields submitted by the record-sale form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleForm {
  pub product_id: Option<String>,
  pub quantity:   Option<String>,
  pub unit_price: Option<String>,
  pub notes:      Option<String>,
}

/// Trim and drop empty values.
pub fn field(value: &Option<String>) -> Option<&str> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn owned_field(value: &Option<String>) -> Option<String> {
  field(value).map(str::to_owned)
}

fn parse_amount(raw: &str, what: &str) -> Result<f64> {
  raw
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite() && *v >= 0.0)
    .ok_or_else(|| Error::Validation(format!("{what} must be a non-negative number")))
}

// ─── Validation ──────────────────────────────────────────────────────────────

impl ProductForm {
  /// Check required fields and parse the price. `created_by` is the actor.
  pub fn validate(&self, created_by: Uuid) -> Result<NewProduct> {
    let (Some(name), Some(price)) = (field(&self.name), field(&self.price))
    else {
      return Err(Error::Validation("Name and price are required".into()));
    };
    Ok(NewProduct {
      name: name.to_owned(),
      description: owned_field(&self.description),
      price: parse_amount(price, "Price")?,
      category: owned_field(&self.category),
      sku: owned_field(&self.sku),
      created_by,
    })
  }
}

impl SaleForm {
  /// Check required fields and parse quantity and unit price. The worker is
  /// the actor.
  pub fn validate(&self, worker_id: Uuid) -> Result<NewSale> {
    let (Some(product_id), Some(quantity), Some(unit_price)) = (
      field(&self.product_id),
      field(&self.quantity),
      field(&self.unit_price),
    ) else {
      return Err(Error::Validation(
        "All required fields must be filled".into(),
      ));
    };

    let product_id = Uuid::parse_str(product_id)
      .map_err(|_| Error::Validation("Product id is not valid".into()))?;

    let quantity = quantity
      .parse::<i64>()
      .ok()
      .filter(|q| *q > 0)
      .ok_or_else(|| {
        Error::Validation("Quantity must be a positive whole number".into())
      })?;
    if quantity > MAX_QUANTITY {
      return Err(Error::Validation(format!(
        "Quantity may not exceed {MAX_QUANTITY}"
      )));
    }

    let unit_price = parse_amount(unit_price, "Unit price")?;

    let mut sale = NewSale::new(product_id, worker_id, quantity, unit_price);
    sale.notes = owned_field(&self.notes);
    Ok(sale)
  }
}

// ─── Actions ─────────────────────────────────────────────────────────────────

/// Re-read the actor's stored row and apply `gate` to the stored role, so a
/// role change since sign-in takes effect immediately.
async fn recheck_role<S>(
  store: &S,
  actor: &Actor,
  gate: Gate,
  denial: &str,
) -> Result<()>
where
  S: InventoryStore,
{
  let stored = store
    .get_user(actor.user_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::Forbidden(denial.to_owned()))?;
  gate.check(&Actor::from(stored), denial)
}

/// Create a catalog product. Admin only.
pub async fn create_product<S>(
  store: &S,
  actor: &Actor,
  form: &ProductForm,
) -> Result<Product>
where
  S: InventoryStore,
{
  let input = form.validate(actor.user_id)?;
  recheck_role(store, actor, Gate::AdminOnly, "Unauthorized to create products")
    .await?;

  let product = store.add_product(input).await.map_err(Error::store)?;
  tracing::info!(
    product_id = %product.product_id,
    created_by = %actor.user_id,
    "product created"
  );
  Ok(product)
}

/// Record a sale on behalf of the actor. Admins and workers may record
/// sales.
pub async fn create_sale<S>(
  store: &S,
  actor: &Actor,
  form: &SaleForm,
) -> Result<Sale>
where
  S: InventoryStore,
{
  let input = form.validate(actor.user_id)?;
  recheck_role(
    store,
    actor,
    Gate::AnyRole,
    "Unauthorized to create sales records",
  )
  .await?;

  store
    .get_product(input.product_id)
    .await
    .map_err(Error::store)?
    .ok_or_else(|| Error::Validation("Product not found".into()))?;

  let sale = store.record_sale(input).await.map_err(Error::store)?;
  tracing::info!(
    sale_id = %sale.sale_id,
    worker_id = %sale.worker_id,
    total_amount = sale.total_amount,
    "sale recorded"
  );
  Ok(sale)
}
