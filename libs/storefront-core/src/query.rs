//! Query builder for reading and writing rows of the hosted tables

use crate::period::UtcBounds;
use serde_json::Value;

/// Comparison applied by a [`Filter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Value is a JSON array of candidates
    In,
}

impl FilterOp {
    /// Operator keyword on the REST wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
        }
    }
}

/// A single column condition; conditions in a query are combined with AND
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Sort key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

/// Builder for table queries
///
/// ```
/// use storefront_core::query::RowQuery;
///
/// let query = RowQuery::table("products")
///     .lte("stock", 5)
///     .eq("status", "active")
///     .order("favorite_count", false)
///     .limit(5);
/// assert_eq!(query.table_name(), "products");
/// assert_eq!(query.filters().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RowQuery {
    table: String,
    columns: Option<Vec<String>>,
    filters: Vec<Filter>,
    order: Vec<OrderBy>,
    limit: Option<usize>,
}

impl RowQuery {
    /// Start a query on a table, selecting every column
    #[must_use]
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Restrict the returned columns
    #[must_use]
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.columns = Some(columns.iter().map(|c| (*c).to_string()).collect());
        self
    }

    #[must_use]
    pub fn filter(mut self, column: &str, op: FilterOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            column: column.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    #[must_use]
    pub fn neq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Neq, value)
    }

    #[must_use]
    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gt, value)
    }

    #[must_use]
    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Gte, value)
    }

    #[must_use]
    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lt, value)
    }

    #[must_use]
    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(column, FilterOp::Lte, value)
    }

    /// Match any of the given values
    #[must_use]
    pub fn in_list<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.filter(column, FilterOp::In, Value::Array(values))
    }

    /// Keep rows whose timestamp column falls inside the window; `None` leaves
    /// the query unfiltered
    #[must_use]
    pub fn within(self, column: &str, window: Option<&UtcBounds>) -> Self {
        match window {
            Some(bounds) => self
                .gte(column, bounds.start_iso())
                .lte(column, bounds.end_iso()),
            None => self,
        }
    }

    /// Add a sort key; later keys break ties of earlier ones
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(OrderBy {
            column: column.to_string(),
            ascending,
        });
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref()
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[must_use]
    pub fn ordering(&self) -> &[OrderBy] {
        &self.order
    }

    #[must_use]
    pub const fn row_limit(&self) -> Option<usize> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{resolve_at, PeriodSelector};
    use chrono::{NaiveDate, Utc};
    use serde_json::json;

    #[test]
    fn test_new_query_is_unfiltered() {
        let query = RowQuery::table("orders");
        assert_eq!(query.table_name(), "orders");
        assert!(query.columns().is_none());
        assert!(query.filters().is_empty());
        assert!(query.ordering().is_empty());
        assert!(query.row_limit().is_none());
    }

    #[test]
    fn test_chaining() {
        let query = RowQuery::table("orders")
            .select(&["id", "total"])
            .eq("status", "COMPLETED")
            .gt("total", 0)
            .order("created_at", false)
            .limit(5);

        assert_eq!(query.columns().unwrap(), ["id", "total"]);
        assert_eq!(query.filters()[0].op, FilterOp::Eq);
        assert_eq!(query.filters()[0].value, json!("COMPLETED"));
        assert_eq!(query.filters()[1].value, json!(0));
        assert_eq!(
            query.ordering(),
            [OrderBy {
                column: "created_at".into(),
                ascending: false
            }]
        );
        assert_eq!(query.row_limit(), Some(5));
    }

    #[test]
    fn test_in_list() {
        let query = RowQuery::table("products").in_list("id", ["PRD-001", "PRD-002"]);
        assert_eq!(query.filters()[0].op, FilterOp::In);
        assert_eq!(query.filters()[0].value, json!(["PRD-001", "PRD-002"]));
    }

    #[test]
    fn test_within_unbounded_adds_nothing() {
        let query = RowQuery::table("returns").within("created_at", None);
        assert!(query.filters().is_empty());
    }

    #[test]
    fn test_within_bounded_adds_inclusive_bounds() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 18)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let bounds = resolve_at(&PeriodSelector::Daily, now)
            .unwrap()
            .to_utc(&Utc)
            .unwrap();
        let query = RowQuery::table("returns").within("created_at", bounds.as_ref());

        assert_eq!(query.filters().len(), 2);
        assert_eq!(query.filters()[0].op, FilterOp::Gte);
        assert_eq!(query.filters()[0].value, json!("2026-01-18T00:00:00.000Z"));
        assert_eq!(query.filters()[1].op, FilterOp::Lte);
        assert_eq!(query.filters()[1].value, json!("2026-01-18T23:59:59.999Z"));
    }

    #[test]
    fn test_filter_op_wire_names() {
        assert_eq!(FilterOp::Gte.as_str(), "gte");
        assert_eq!(FilterOp::In.as_str(), "in");
    }
}
