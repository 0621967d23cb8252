//! In-process row store
//!
//! Evaluates [`RowQuery`] filters the way the hosted API does for the column
//! types the admin screens use: numbers compare numerically, RFC 3339
//! timestamps compare as instants, other strings compare lexically, and
//! `null` never satisfies a range comparison.

use super::{Row, RowStore};
use crate::error::Result;
use crate::query::{Filter, FilterOp, RowQuery};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

/// Tables held in memory behind a read/write lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Row>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace a table's rows wholesale
    pub fn load_table(&self, table: &str, rows: Vec<Row>) {
        self.tables.write().insert(table.to_string(), rows);
    }

    /// Number of rows currently in a table
    #[must_use]
    pub fn table_len(&self, table: &str) -> usize {
        self.tables.read().get(table).map_or(0, Vec::len)
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn select(&self, query: &RowQuery) -> Result<Vec<Row>> {
        let tables = self.tables.read();
        let mut rows: Vec<Row> = tables
            .get(query.table_name())
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches_all(row, query.filters()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        drop(tables);

        for key in query.ordering().iter().rev() {
            rows.sort_by(|a, b| {
                compare_for_sort(a.get(&key.column), b.get(&key.column), key.ascending)
            });
        }
        if let Some(limit) = query.row_limit() {
            rows.truncate(limit);
        }
        if let Some(columns) = query.columns() {
            rows = rows
                .into_iter()
                .map(|row| {
                    row.into_iter()
                        .filter(|(column, _)| columns.iter().any(|c| c == column))
                        .collect()
                })
                .collect();
        }
        debug!(table = query.table_name(), rows = rows.len(), "memory select");
        Ok(rows)
    }

    async fn count(&self, query: &RowQuery) -> Result<usize> {
        let tables = self.tables.read();
        Ok(tables.get(query.table_name()).map_or(0, |rows| {
            rows.iter()
                .filter(|row| matches_all(row, query.filters()))
                .count()
        }))
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Row> {
        row.entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        row.entry("created_at").or_insert_with(|| {
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
        });
        self.tables
            .write()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        debug!(table, "memory insert");
        Ok(row)
    }

    async fn update(&self, query: &RowQuery, patch: Row) -> Result<usize> {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(query.table_name()) else {
            return Ok(0);
        };
        let mut changed = 0;
        for row in rows
            .iter_mut()
            .filter(|row| matches_all(row, query.filters()))
        {
            for (column, value) in &patch {
                row.insert(column.clone(), value.clone());
            }
            changed += 1;
        }
        debug!(table = query.table_name(), changed, "memory update");
        Ok(changed)
    }

    async fn delete(&self, query: &RowQuery) -> Result<usize> {
        let mut tables = self.tables.write();
        let Some(rows) = tables.get_mut(query.table_name()) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| !matches_all(row, query.filters()));
        let removed = before - rows.len();
        debug!(table = query.table_name(), removed, "memory delete");
        Ok(removed)
    }
}

fn matches_all(row: &Row, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| matches(row, filter))
}

fn matches(row: &Row, filter: &Filter) -> bool {
    let cell = row.get(&filter.column).unwrap_or(&Value::Null);
    match filter.op {
        FilterOp::Eq => values_equal(cell, &filter.value),
        FilterOp::Neq => !cell.is_null() && !values_equal(cell, &filter.value),
        FilterOp::In => filter
            .value
            .as_array()
            .is_some_and(|candidates| candidates.iter().any(|c| values_equal(cell, c))),
        FilterOp::Gt => compare_values(cell, &filter.value) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(
            compare_values(cell, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lt => compare_values(cell, &filter.value) == Some(Ordering::Less),
        FilterOp::Lte => matches!(
            compare_values(cell, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, _) | (_, Value::Null) => false,
        _ => compare_values(a, b) == Some(Ordering::Equal) || a == b,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => Some(x.cmp(y)),
        },
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sort order: comparable values by value in the requested direction, nulls last
fn compare_for_sort(a: Option<&Value>, b: Option<&Value>, ascending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (Some(a), Some(b)) => {
            let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
            if ascending {
                ordering
            } else {
                ordering.reverse()
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
