//! `GET /reports[?from=YYYY-MM-DD&to=YYYY-MM-DD&category=…]`
//!
//! Builds a [`SalesReport`] over the caller's visible sales narrowed by the
//! optional filters. An empty result is a valid report of zeroes.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use stockroom_core::{
  query::{SaleFilters, SaleQuery},
  report::SalesReport,
  store::InventoryStore,
};

use crate::{
  AppState,
  auth::Authenticated,
  error::{ApiError, Result},
};

#[derive(Debug, Default, Deserialize)]
pub struct ReportParams {
  pub from:     Option<String>,
  pub to:       Option<String>,
  pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportView {
  pub is_admin: bool,
  pub filters:  SaleFilters,
  #[serde(flatten)]
  pub report:   SalesReport,
}

/// `GET /reports`
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  auth: Authenticated,
  Query(params): Query<ReportParams>,
) -> Result<Json<ReportView>>
where
  S: InventoryStore + 'static,
{
  let filters = SaleFilters::parse(
    params.from.as_deref(),
    params.to.as_deref(),
    params.category.as_deref(),
  )?;
  let query = SaleQuery::for_actor(&auth.actor).with_filters(filters.clone());
  tracing::debug!(?query, "building sales report");

  let sales = state.store.list_sales(&query).await.map_err(ApiError::store)?;
  Ok(Json(ReportView {
    is_admin: auth.actor.is_admin(),
    filters,
    report: SalesReport::build(&sales),
  }))
}
