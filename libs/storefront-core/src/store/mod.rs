//! Row storage behind the admin screens
//!
//! The hosted backend exposes plain tables over a request/response API.
//! [`RowStore`] is the seam every service talks through; [`MemoryStore`]
//! keeps tables in process and [`RestStore`] talks to the hosted REST API.

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::{AccessToken, RestStore};

use crate::error::Result;
use crate::query::RowQuery;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A table row as a JSON object
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Table names used by the admin screens
pub mod tables {
    pub const PRODUCTS: &str = "products";
    pub const ORDERS: &str = "orders";
    pub const ORDER_ITEMS: &str = "order_items";
    pub const PROFILES: &str = "profiles";
    pub const RETURNS: &str = "returns";
    pub const FAVORITES: &str = "favorites";
}

/// Request/response access to the hosted tables
#[async_trait]
pub trait RowStore: Send + Sync {
    /// Rows matching the query, in the query's order and up to its limit
    async fn select(&self, query: &RowQuery) -> Result<Vec<Row>>;

    /// Number of rows matching the query's filters, ignoring its limit
    async fn count(&self, query: &RowQuery) -> Result<usize>;

    /// Insert a row and return it as stored
    async fn insert(&self, table: &str, row: Row) -> Result<Row>;

    /// Merge `patch` into every matching row; returns how many rows changed
    async fn update(&self, query: &RowQuery, patch: Row) -> Result<usize>;

    /// Delete every matching row; returns how many rows were removed
    async fn delete(&self, query: &RowQuery) -> Result<usize>;
}

#[async_trait]
impl<T: RowStore + ?Sized> RowStore for Arc<T> {
    async fn select(&self, query: &RowQuery) -> Result<Vec<Row>> {
        (**self).select(query).await
    }

    async fn count(&self, query: &RowQuery) -> Result<usize> {
        (**self).count(query).await
    }

    async fn insert(&self, table: &str, row: Row) -> Result<Row> {
        (**self).insert(table, row).await
    }

    async fn update(&self, query: &RowQuery, patch: Row) -> Result<usize> {
        (**self).update(query, patch).await
    }

    async fn delete(&self, query: &RowQuery) -> Result<usize> {
        (**self).delete(query).await
    }
}

/// Deserialize a row into a model
///
/// # Errors
/// Returns `Serialization` if the row does not have the model's shape
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}

/// Deserialize every row into a model
///
/// # Errors
/// Returns `Serialization` on the first row that does not have the model's shape
pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter().map(from_row).collect()
}

/// Read a string column
#[must_use]
pub fn str_field<'a>(row: &'a Row, column: &str) -> Option<&'a str> {
    row.get(column).and_then(serde_json::Value::as_str)
}

/// Read an integer column, treating missing or non-numeric values as zero
#[must_use]
pub fn int_field(row: &Row, column: &str) -> i64 {
    row.get(column)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64)))
        .unwrap_or(0)
}
