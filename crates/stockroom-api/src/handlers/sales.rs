//! Sale listing and recording.
//!
//! Admins list every sale; anyone else lists only the sales they recorded.

use axum::{Form, Json, extract::State, http::StatusCode};
use serde::Serialize;
use stockroom_core::{
  actions::{self, SaleForm},
  query::SaleQuery,
  report::{Summary, summarize},
  sale::{Sale, SaleRecord},
  store::InventoryStore,
};

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, Result},
};

#[derive(Debug, Serialize)]
pub struct SalesList {
  pub is_admin: bool,
  pub summary:  Summary,
  pub sales:    Vec<SaleRecord>,
}

/// `GET /sales`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
) -> Result<Json<SalesList>>
where
  S: InventoryStore + 'static,
{
  let query = SaleQuery::for_actor(&auth.actor);
  let sales = state.store.list_sales(&query).await.map_err(ApiError::store)?;
  Ok(Json(SalesList {
    is_admin: auth.actor.is_admin(),
    summary: summarize(&sales),
    sales,
  }))
}

/// `POST /sales`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Form(form): Form<SaleForm>,
) -> Result<(StatusCode, Json<Sale>)>
where
  S: InventoryStore + 'static,
{
  let sale = actions::create_sale(&*state.store, &auth.actor, &form).await?;
  Ok((StatusCode::CREATED, Json(sale)))
}
