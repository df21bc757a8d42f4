//! Reductions over a filtered list of sale records.
//!
//! Every function here is a pure fold: the result does not depend on input
//! order, except that ties in the product ranking keep first-encounter order.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{product::Product, sale::SaleRecord};

/// How many products [`top_products`] keeps.
pub const TOP_PRODUCTS_LIMIT: usize = 5;

/// Scalar metrics over a set of sales.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  pub total_revenue:       f64,
  pub total_quantity:      i64,
  pub order_count:         usize,
  /// `total_revenue / order_count`, or `0.0` when there are no orders.
  pub average_order_value: f64,
}

/// One point of the daily time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyTotals {
  /// UTC calendar date, serialised as `YYYY-MM-DD`.
  pub date:     NaiveDate,
  pub revenue:  f64,
  pub quantity: i64,
  pub orders:   usize,
}

/// A product's accumulated performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRanking {
  pub product:        Product,
  pub total_revenue:  f64,
  pub total_quantity: i64,
  pub order_count:    usize,
}

/// Everything the reports view needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
  pub summary:      Summary,
  pub daily:        Vec<DailyTotals>,
  pub top_products: Vec<ProductRanking>,
}

impl SalesReport {
  pub fn build(sales: &[SaleRecord]) -> Self {
    Self {
      summary:      summarize(sales),
      daily:        daily_series(sales),
      top_products: top_products(sales, TOP_PRODUCTS_LIMIT),
    }
  }
}

pub fn summarize(sales: &[SaleRecord]) -> Summary {
  let total_revenue: f64 = sales.iter().map(|r| r.sale.total_amount).sum();
  let total_quantity = sales
    .iter()
    .fold(0i64, |acc, r| acc.saturating_add(r.sale.quantity));
  let order_count = sales.len();
  let average_order_value = if order_count == 0 {
    0.0
  } else {
    total_revenue / order_count as f64
  };
  Summary { total_revenue, total_quantity, order_count, average_order_value }
}

/// Group by UTC calendar date, ascending.
pub fn daily_series(sales: &[SaleRecord]) -> Vec<DailyTotals> {
  let mut by_date: BTreeMap<NaiveDate, DailyTotals> = BTreeMap::new();
  for record in sales {
    let date = record.sale.sale_date.date_naive();
    let entry = by_date.entry(date).or_insert(DailyTotals {
      date,
      revenue: 0.0,
      quantity: 0,
      orders: 0,
    });
    entry.revenue += record.sale.total_amount;
    entry.quantity = entry.quantity.saturating_add(record.sale.quantity);
    entry.orders += 1;
  }
  by_date.into_values().collect()
}

/// Rank products by summed revenue, descending, keeping at most `limit`.
///
/// Sales without a resolved product are skipped.
pub fn top_products(sales: &[SaleRecord], limit: usize) -> Vec<ProductRanking> {
  let mut rankings: Vec<ProductRanking> = Vec::new();
  let mut index: HashMap<Uuid, usize> = HashMap::new();

  for record in sales {
    let Some(product) = &record.product else { continue };
    let slot = *index.entry(product.product_id).or_insert_with(|| {
      rankings.push(ProductRanking {
        product:        product.clone(),
        total_revenue:  0.0,
        total_quantity: 0,
        order_count:    0,
      });
      rankings.len() - 1
    });
    let ranking = &mut rankings[slot];
    ranking.total_revenue += record.sale.total_amount;
    ranking.total_quantity =
      ranking.total_quantity.saturating_add(record.sale.quantity);
    ranking.order_count += 1;
  }

  // `sort_by` is stable, so equal revenues keep encounter order.
  rankings.sort_by(|a, b| b.total_revenue.total_cmp(&a.total_revenue));
  rankings.truncate(limit);
  rankings
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, TimeZone, Utc};

  use super::*;
  use crate::sale::Sale;

  fn product(name: &str) -> Product {
    let now = Utc::now();
    Product {
      product_id:  Uuid::new_v4(),
      name:        name.into(),
      description: None,
      price:       0.0,
      category:    None,
      sku:         None,
      created_by:  None,
      created_at:  now,
      updated_at:  now,
    }
  }

  fn sale_on(
    at: DateTime<Utc>,
    total: f64,
    qty: i64,
    product: Option<&Product>,
  ) -> SaleRecord {
    SaleRecord {
      sale:    Sale {
        sale_id:      Uuid::new_v4(),
        product_id:   product.map(|p| p.product_id).unwrap_or_else(Uuid::new_v4),
        worker_id:    Uuid::new_v4(),
        quantity:     qty,
        unit_price:   total / qty as f64,
        total_amount: total,
        sale_date:    at,
        notes:        None,
        created_at:   at,
      },
      product: product.cloned(),
      worker:  None,
    }
  }

  fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
  }

  fn date(s: &str) -> NaiveDate { s.parse().unwrap() }

  #[test]
  fn daily_series_groups_and_sorts_ascending() {
    let sales = vec![
      sale_on(day(2024, 1, 2), 20.0, 3, None),
      sale_on(day(2024, 1, 1), 10.0, 2, None),
      sale_on(day(2024, 1, 1), 5.0, 1, None),
    ];

    let series = daily_series(&sales);
    assert_eq!(series, vec![
      DailyTotals { date: date("2024-01-01"), revenue: 15.0, quantity: 3, orders: 2 },
      DailyTotals { date: date("2024-01-02"), revenue: 20.0, quantity: 3, orders: 1 },
    ]);
  }

  #[test]
  fn daily_series_serialises_plain_dates() {
    let series = daily_series(&[sale_on(day(2024, 1, 1), 10.0, 2, None)]);
    let json = serde_json::to_value(&series).unwrap();
    assert_eq!(json[0]["date"], "2024-01-01");
  }

  #[test]
  fn empty_input_yields_empty_ranking_and_zero_average() {
    assert!(top_products(&[], TOP_PRODUCTS_LIMIT).is_empty());
    assert!(daily_series(&[]).is_empty());
    let summary = summarize(&[]);
    assert_eq!(summary.order_count, 0);
    assert_eq!(summary.total_revenue, 0.0);
    assert_eq!(summary.average_order_value, 0.0);
  }

  #[test]
  fn summary_averages_over_orders() {
    let sales = vec![
      sale_on(day(2024, 1, 1), 10.0, 2, None),
      sale_on(day(2024, 1, 1), 5.0, 1, None),
      sale_on(day(2024, 1, 2), 15.0, 3, None),
    ];
    let summary = summarize(&sales);
    assert_eq!(summary.total_revenue, 30.0);
    assert_eq!(summary.total_quantity, 6);
    assert_eq!(summary.order_count, 3);
    assert_eq!(summary.average_order_value, 10.0);
  }

  #[test]
  fn quantity_totals_saturate_instead_of_overflowing() {
    let p = product("bulk");
    let sales = vec![
      sale_on(day(2024, 1, 1), 0.0, i64::MAX, Some(&p)),
      sale_on(day(2024, 1, 1), 0.0, i64::MAX, Some(&p)),
    ];
    let report = SalesReport::build(&sales);
    assert_eq!(report.summary.total_quantity, i64::MAX);
    assert_eq!(report.daily[0].quantity, i64::MAX);
    assert_eq!(report.top_products[0].total_quantity, i64::MAX);
    assert_eq!(report.summary.order_count, 2);
  }

  #[test]
  fn ranking_truncates_to_five_descending() {
    let products: Vec<Product> =
      (0..7).map(|i| product(&format!("p{i}"))).collect();
    let sales: Vec<SaleRecord> = products
      .iter()
      .enumerate()
      .map(|(i, p)| sale_on(day(2024, 1, 1), (i + 1) as f64, 1, Some(p)))
      .collect();

    let top = top_products(&sales, TOP_PRODUCTS_LIMIT);
    assert_eq!(top.len(), 5);
    let revenues: Vec<f64> = top.iter().map(|r| r.total_revenue).collect();
    assert_eq!(revenues, vec![7.0, 6.0, 5.0, 4.0, 3.0]);
  }

  #[test]
  fn ranking_accumulates_per_product_and_breaks_ties_by_encounter() {
    let a = product("a");
    let b = product("b");
    let c = product("c");
    let sales = vec![
      sale_on(day(2024, 1, 1), 4.0, 1, Some(&b)),
      sale_on(day(2024, 1, 1), 6.0, 2, Some(&a)),
      sale_on(day(2024, 1, 2), 6.0, 3, Some(&b)),
      sale_on(day(2024, 1, 2), 10.0, 1, Some(&c)),
    ];

    let top = top_products(&sales, TOP_PRODUCTS_LIMIT);
    let names: Vec<&str> = top.iter().map(|r| r.product.name.as_str()).collect();
    // b and c both reach 10.0; b was seen first.
    assert_eq!(names, vec!["b", "c", "a"]);
    assert_eq!(top[0].total_quantity, 4);
    assert_eq!(top[0].order_count, 2);
  }

  #[test]
  fn unresolved_products_are_skipped() {
    let a = product("a");
    let sales = vec![
      sale_on(day(2024, 1, 1), 100.0, 1, None),
      sale_on(day(2024, 1, 1), 1.0, 1, Some(&a)),
    ];
    let top = top_products(&sales, TOP_PRODUCTS_LIMIT);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].product.name, "a");
    // The unresolved sale still counts toward the summary.
    assert_eq!(summarize(&sales).total_revenue, 101.0);
  }

  #[test]
  fn report_bundles_all_three_views() {
    let a = product("a");
    let report = SalesReport::build(&[sale_on(day(2024, 1, 1), 8.0, 2, Some(&a))]);
    assert_eq!(report.summary.order_count, 1);
    assert_eq!(report.daily.len(), 1);
    assert_eq!(report.top_products.len(), 1);
  }
}
