//! Catalog handlers.
//!
//! | Method | Path | Gate |
//! |--------|------|------|
//! | `GET`  | `/products`       | any role |
//! | `GET`  | `/admin/products` | admin |
//! | `POST` | `/admin/products` | admin, re-checked against the stored role |

use axum::{Form, Json, extract::State, http::StatusCode};
use serde::Serialize;
use stockroom_core::{
  actions::{self, ProductForm},
  product::{CatalogSummary, Product},
  session::Gate,
  store::InventoryStore,
};

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, Result},
  handlers::admin::ADMIN_ONLY,
};

#[derive(Debug, Serialize)]
pub struct Catalog {
  pub summary:  CatalogSummary,
  pub products: Vec<Product>,
}

/// `GET /products`: the catalog for the sale form's product picker.
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
) -> Result<Json<Vec<Product>>>
where
  S: InventoryStore + 'static,
{
  let products = state.store.list_products().await.map_err(ApiError::store)?;
  Ok(Json(products))
}

/// `GET /admin/products`
pub async fn catalog<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
) -> Result<Json<Catalog>>
where
  S: InventoryStore + 'static,
{
  auth.require(Gate::AdminOnly, ADMIN_ONLY)?;
  let products = state.store.list_products().await.map_err(ApiError::store)?;
  Ok(Json(Catalog { summary: CatalogSummary::of(&products), products }))
}

/// `POST /admin/products`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Form(form): Form<ProductForm>,
) -> Result<(StatusCode, Json<Product>)>
where
  S: InventoryStore + 'static,
{
  let product = actions::create_product(&*state.store, &auth.actor, &form).await?;
  Ok((StatusCode::CREATED, Json(product)))
}
