//! `GET /admin`: dashboard counts and the most recent sales.

use axum::{Json, extract::State};
use serde::Serialize;
use stockroom_core::{
  query::SaleQuery,
  report::summarize,
  sale::SaleRecord,
  session::Gate,
  store::InventoryStore,
};

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, Result},
};

/// How many sales the dashboard lists.
pub const RECENT_SALES: usize = 5;

pub(crate) const ADMIN_ONLY: &str = "Admin access required";

#[derive(Debug, Serialize)]
pub struct Dashboard {
  pub product_count: u64,
  pub user_count:    u64,
  pub sale_count:    usize,
  pub total_revenue: f64,
  pub recent_sales:  Vec<SaleRecord>,
}

/// `GET /admin`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
) -> Result<Json<Dashboard>>
where
  S: InventoryStore + 'static,
{
  auth.require(Gate::AdminOnly, ADMIN_ONLY)?;
  let store = &state.store;

  let product_count = store.count_products().await.map_err(ApiError::store)?;
  let user_count = store.count_users().await.map_err(ApiError::store)?;

  let all = SaleQuery::all();
  let totals = summarize(&store.list_sales(&all).await.map_err(ApiError::store)?);

  let recent = SaleQuery::all().limit(RECENT_SALES);
  let recent_sales = store.list_sales(&recent).await.map_err(ApiError::store)?;

  Ok(Json(Dashboard {
    product_count,
    user_count,
    sale_count: totals.order_count,
    total_revenue: totals.total_revenue,
    recent_sales,
  }))
}
