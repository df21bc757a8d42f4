//! Role-scoped sale queries.
//!
//! A [`SaleQuery`] describes "all sale records" narrowed by, in order of
//! precedence:
//!
//! 1. ownership scope: non-admins only see sales they recorded,
//! 2. `from`: sale date on or after 00:00 UTC of the given day,
//! 3. `to`: sale date on or before the end of the given day (UTC),
//! 4. `category`: exact, case-sensitive match on the joined product category.
//!
//! Absent predicates impose no restriction; present ones combine with AND.
//! Results are always ordered newest first. Storage backends compile the
//! query to their own language; [`SaleQuery::matches`] evaluates it in memory
//! with the same semantics.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, sale::SaleRecord, user::Actor};

/// Whose sales a query may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerScope {
  /// Every sale, regardless of recorder.
  All,
  /// Only sales recorded by this user.
  Worker(Uuid),
}

/// Optional date/category filters as they arrive from a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SaleFilters {
  pub from:     Option<NaiveDate>,
  pub to:       Option<NaiveDate>,
  pub category: Option<String>,
}

impl SaleFilters {
  /// Parse raw query-string values. Empty strings count as absent; dates
  /// must be `YYYY-MM-DD`.
  pub fn parse(
    from: Option<&str>,
    to: Option<&str>,
    category: Option<&str>,
  ) -> Result<Self> {
    Ok(Self {
      from:     parse_date("from", from)?,
      to:       parse_date("to", to)?,
      category: non_empty(category).map(str::to_owned),
    })
  }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
  non_empty(value)
    .map(|v| {
      NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| {
        Error::Validation(format!("{field} must be a date in YYYY-MM-DD form"))
      })
    })
    .transpose()
}

/// A composable read query over the sales table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleQuery {
  pub scope:    OwnerScope,
  pub from:     Option<NaiveDate>,
  pub to:       Option<NaiveDate>,
  pub category: Option<String>,
  /// Truncate the newest-first result to this many records.
  pub limit:    Option<usize>,
}

impl SaleQuery {
  /// Every sale, no filters.
  pub fn all() -> Self {
    Self {
      scope:    OwnerScope::All,
      from:     None,
      to:       None,
      category: None,
      limit:    None,
    }
  }

  /// The default query for `actor`: admins see everything, anyone else only
  /// their own sales.
  pub fn for_actor(actor: &Actor) -> Self {
    let scope = if actor.is_admin() {
      OwnerScope::All
    } else {
      OwnerScope::Worker(actor.user_id)
    };
    Self { scope, ..Self::all() }
  }

  pub fn with_filters(mut self, filters: SaleFilters) -> Self {
    self.from = filters.from;
    self.to = filters.to;
    self.category = filters.category;
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  /// Inclusive lower bound on `sale_date`.
  pub fn lower_bound(&self) -> Option<DateTime<Utc>> {
    self.from.map(start_of_day)
  }

  /// Exclusive upper bound on `sale_date`: midnight after the `to` day.
  pub fn upper_bound(&self) -> Option<DateTime<Utc>> {
    self
      .to
      .map(|d| d.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX))
      .map(start_of_day)
  }

  /// Whether `record` satisfies every predicate (ignores `limit`).
  pub fn matches(&self, record: &SaleRecord) -> bool {
    if let OwnerScope::Worker(id) = self.scope
      && record.sale.worker_id != id
    {
      return false;
    }
    if let Some(lo) = self.lower_bound()
      && record.sale.sale_date < lo
    {
      return false;
    }
    if let Some(hi) = self.upper_bound()
      && record.sale.sale_date >= hi
    {
      return false;
    }
    if let Some(category) = &self.category {
      let joined = record.product.as_ref().and_then(|p| p.category.as_deref());
      if joined != Some(category.as_str()) {
        return false;
      }
    }
    true
  }

  /// Apply the query to an in-memory list: filter, order newest first,
  /// truncate.
  pub fn apply(&self, records: impl IntoIterator<Item = SaleRecord>) -> Vec<SaleRecord> {
    let mut out: Vec<SaleRecord> =
      records.into_iter().filter(|r| self.matches(r)).collect();
    out.sort_by(|a, b| b.sale.sale_date.cmp(&a.sale.sale_date));
    if let Some(limit) = self.limit {
      out.truncate(limit);
    }
    out
  }
}

fn start_of_day(d: NaiveDate) -> DateTime<Utc> {
  d.and_time(chrono::NaiveTime::MIN).and_utc()
}
